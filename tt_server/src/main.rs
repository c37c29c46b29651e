//! Tennis tournament API server.

use anyhow::{Context, Error};
use log::info;
use pico_args::Arguments;
use tennis_tournament::db::Database;
use tt_server::{
    api,
    config::{Overrides, ServerConfig},
    logging, metrics,
};

const HELP: &str = "\
Run the tennis tournament API server

USAGE:
  tt_server [OPTIONS]

OPTIONS:
  --bind          IP:PORT  Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8000]
  --db-url        URL      Database connection string  [default: env DATABASE_URL or postgres://postgres@localhost/tennis_tournament]
  --metrics-bind  IP:PORT  Prometheus exporter address [default: env METRICS_BIND, disabled when unset]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  JWT_SECRET                      JWT signing secret (required, >= 32 chars)
  PASSWORD_PEPPER                 Password hashing pepper (required, >= 16 chars)
  ACCESS_TOKEN_MINUTES            Access token lifetime [default: 10080]
  REFRESH_TOKEN_DAYS              Refresh token lifetime [default: 30]
  CORS_ORIGINS                    Comma separated allowed origins
  ENFORCE_REGISTRATION_DEADLINE   Reject registrations after the deadline [default: false]
  DB_MAX_CONNECTIONS, DB_MIN_CONNECTIONS, DB_CONNECTION_TIMEOUT,
  DB_IDLE_TIMEOUT, DB_MAX_LIFETIME
                                  Connection pool settings
  RUST_LOG                        Log filter [default: info,sqlx=warn,hyper=warn]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = Overrides {
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        metrics_bind: pargs.opt_value_from_str("--metrics-bind")?,
    };

    let config = ServerConfig::from_env(overrides)?;
    config.validate()?;

    logging::init();
    info!("Starting tennis tournament server at {}", config.bind);

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(Error::msg)?;
        info!("Prometheus metrics exported on http://{}/metrics", addr);
    }

    let db = Database::new(&config.database)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.context("Failed to apply migrations")?;
    info!("Database connected and migrated");

    if config.admission.enforce_deadline {
        info!("Registration deadlines are enforced");
    }

    let state = api::AppState::new(db.pool().clone(), &config.security, config.admission);
    let app = api::create_router(state, &config.cors_origins);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    db.close().await;

    Ok(())
}

/// Resolves on Ctrl+C
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install Ctrl+C handler: {}", err);
        std::future::pending::<()>().await;
    }
}
