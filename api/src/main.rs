use anyhow::Context;
use api::auth::middleware::log_request;
use api::routes::routes;
use api::services::email::EmailService;
use api::state::AppState;
use axum::{
    Router,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    middleware::from_fn,
};
use migration::{Migrator, MigratorTrait};
use services::session_service::SessionService;
use std::{net::SocketAddr, time::Duration};
use tower_http::cors::CorsLayer;
use tracing_appender::rolling;
use util::{config, config::AppConfig, paths};

/// How often expired session rows are purged.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _log_guard = init_logging(&config::log_file(), &config::log_level());

    let problems = AppConfig::global().validate();
    for problem in &problems {
        tracing::warn!("config: {problem}");
    }
    if config::is_production() && config::session_secret().len() < 32 {
        anyhow::bail!("refusing to start in production without a SESSION_SECRET of 32+ characters");
    }

    let db = db::connect().await.context("failed to connect to the database")?;
    Migrator::up(&db, None)
        .await
        .context("failed to apply migrations")?;

    let uploads_root = paths::ensure_dir(paths::upload_root())
        .context("failed to create the upload directory")?;

    let app_state = AppState::with_dispatcher(db, EmailService::from_config(), uploads_root);
    spawn_session_sweeper(app_state.clone());

    let cors = CorsLayer::very_permissive().expose_headers([CONTENT_DISPOSITION, CONTENT_TYPE]);

    let app = Router::new()
        .nest("/api", routes(app_state))
        .layer(from_fn(log_request))
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", config::host(), config::port())
        .parse()
        .context("invalid HOST/PORT")?;

    tracing::info!(
        "Starting {} ({}) on http://{addr}",
        config::project_name(),
        config::env()
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;

    Ok(())
}

fn init_logging(log_file: &str, log_level: &str) -> tracing_appender::non_blocking::WorkerGuard {
    use std::fs;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    fs::create_dir_all("logs").ok();

    let file_appender = rolling::daily("logs", log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    let stdout_layer = config::log_to_stdout().then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(true)
            .with_target(true)
    });

    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("api=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    guard
}

fn spawn_session_sweeper(app_state: AppState) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            match SessionService::purge_expired(app_state.db()).await {
                Ok(0) => {}
                Ok(removed) => tracing::info!(removed, "purged expired sessions"),
                Err(err) => tracing::warn!(error = %err, "failed to purge expired sessions"),
            }
        }
    });
}
