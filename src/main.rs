use anyhow::anyhow;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use remark::app::users::UserService;
use remark::config::AppConfig;
use remark::infra::db::Db;
use remark::{http, jobs, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    match config.app_mode.as_str() {
        "api" => {
            let db = Db::connect(&config).await?;
            check_default_author(&db, &config).await;

            let state = AppState {
                db,
                default_author: config.default_author.clone(),
            };

            let app: Router = http::router(state).layer(TraceLayer::new_for_http());
            let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
            tracing::info!("listening on {}", config.http_addr);

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        "seed" => {
            let db = Db::connect(&config).await?;
            if let Err(err) = jobs::seed::run(&db, &config).await {
                tracing::error!(error = ?err, "seed run failed");
                std::process::exit(1);
            }
        }
        "smoke" => {
            if let Err(err) = jobs::smoke::run(&config).await {
                tracing::error!(error = ?err, "smoke check failed");
                std::process::exit(1);
            }
            tracing::info!("smoke check passed");
        }
        other => return Err(anyhow!("unknown APP_MODE: {}", other)),
    }

    Ok(())
}

/// Startup precondition check: comment creation needs the default author
/// account. Advisory only; the create path re-resolves it per request, so
/// provisioning the account later fixes things without a restart.
async fn check_default_author(db: &Db, config: &AppConfig) {
    let users = UserService::new(db.clone());
    match users.find_by_username(&config.default_author).await {
        Ok(Some(_)) => {}
        Ok(None) => tracing::warn!(
            username = %config.default_author,
            "default author account is missing; comment creation will fail until the seed importer provisions it"
        ),
        Err(err) => tracing::warn!(error = ?err, "could not verify default author account"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
