//! Core types shared across scopeboard crates.
//!
//! This crate holds the data model that crosses crate boundaries:
//!
//! - [`Credential`] - the OAuth credential material held in a user session
//! - [`FeatureFlags`] / [`compute_features`] - scope-derived feature gating
//! - [`init_tracing`] - unified logging setup for the server binary

pub mod credential;
pub mod features;
pub mod tracing;

pub use credential::Credential;
pub use features::{
    CALENDAR_READONLY_SCOPE, DRIVE_READONLY_SCOPE, FeatureFlags, compute_features,
};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
