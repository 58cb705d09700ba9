use tracing::info;

use scopeboard_core::{TracingConfig, init_tracing};
use scopeboard_server::{AppState, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A .env file next to the binary is honored but not required.
    let _ = dotenvy::dotenv();

    let config = ServerConfig::from_env()?;

    let tracing_config = if config.debug {
        TracingConfig::debug()
    } else {
        TracingConfig::server()
    };
    init_tracing(tracing_config)?;

    let listen = config.listen;
    let state = AppState::new(config)?;
    let app = scopeboard_server::app(state);

    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!("scopeboard listening on http://{}", listen);
    axum::serve(listener, app).await?;

    Ok(())
}
