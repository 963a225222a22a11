use std::net::SocketAddr;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use statement_ledger_backend::app;
use statement_ledger_backend::config::Settings;
use statement_ledger_backend::logging::{init_logging, LoggingConfig};
use statement_ledger_backend::pipeline::credential::CredentialCipher;
use statement_ledger_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let logging_config = LoggingConfig::from_env();
    init_logging(logging_config)?;

    let settings = Settings::from_env()?;
    settings.validate()?;

    tracing::info!(environment = %settings.environment, "starting statement-ledger-backend");

    if let Some(redis_url) = &settings.redis_url {
        tracing::warn!(redis_url = %redis_url, "REDIS_URL is set but this build's task queue is in-process; the setting is read and logged only");
    }

    let pool = PgPoolOptions::new().max_connections(10).connect(&settings.database_url).await?;

    let cipher = CredentialCipher::new(&settings.fernet_key)?;

    let state = AppState::new(pool, settings, cipher);
    let app = app::create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("statement-ledger-backend listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
