//! Scope-derived feature flags.
//!
//! The application requests two scopes but the user may grant any subset
//! of them on the consent screen. Which API integrations are exercised is
//! decided purely by membership in the granted set.

use serde::{Deserialize, Serialize};

/// Read-only access to Drive file metadata.
pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.metadata.readonly";

/// Read-only access to Calendar.
pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

/// Which integrations the granted scopes enable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub drive: bool,
    pub calendar: bool,
}

/// Derives feature flags from a set of granted scope strings.
///
/// Pure membership test: ordering and duplicates in the input are
/// irrelevant.
pub fn compute_features(granted_scopes: &[String]) -> FeatureFlags {
    let has = |scope: &str| granted_scopes.iter().any(|s| s == scope);
    FeatureFlags {
        drive: has(DRIVE_READONLY_SCOPE),
        calendar: has(CALENDAR_READONLY_SCOPE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scopes(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_grants_nothing() {
        assert_eq!(compute_features(&[]), FeatureFlags::default());
    }

    #[test]
    fn calendar_only() {
        let features = compute_features(&scopes(&[CALENDAR_READONLY_SCOPE]));
        assert!(!features.drive);
        assert!(features.calendar);
    }

    #[test]
    fn drive_only() {
        let features = compute_features(&scopes(&[DRIVE_READONLY_SCOPE]));
        assert!(features.drive);
        assert!(!features.calendar);
    }

    #[test]
    fn both_granted_in_any_order() {
        let forward = compute_features(&scopes(&[DRIVE_READONLY_SCOPE, CALENDAR_READONLY_SCOPE]));
        let reverse = compute_features(&scopes(&[CALENDAR_READONLY_SCOPE, DRIVE_READONLY_SCOPE]));
        assert_eq!(forward, FeatureFlags { drive: true, calendar: true });
        assert_eq!(forward, reverse);
    }

    #[test]
    fn duplicates_are_irrelevant() {
        let features = compute_features(&scopes(&[
            CALENDAR_READONLY_SCOPE,
            CALENDAR_READONLY_SCOPE,
            CALENDAR_READONLY_SCOPE,
        ]));
        assert_eq!(features, FeatureFlags { drive: false, calendar: true });
    }

    #[test]
    fn unknown_scopes_are_ignored() {
        let features = compute_features(&scopes(&[
            "https://www.googleapis.com/auth/userinfo.email",
            "openid",
        ]));
        assert_eq!(features, FeatureFlags::default());
    }
}
