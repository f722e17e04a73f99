use std::{sync::Arc, time::Duration};

use todo_service::{build_app, config::Config, logging, store::MongoTodoStore, AppState};
use tracing::{error, info, warn};

/// How long in-flight requests get to finish after an interrupt signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let config = Config::from_env()?;
    let store = MongoTodoStore::connect(&config).await?;
    info!(
        database = %config.database_name,
        collection = %config.collection_name,
        "connected to document store"
    );

    let state = AppState::new(Arc::new(store), config.home_template.clone());
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(config.bind_socket()?).await?;

    info!(
        bind_addr = %config.bind_addr,
        bind_port = config.bind_port,
        "server starting"
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            result??;
            warn!("server exited before shutdown signal");
            return Ok(());
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
        }
    }

    info!("shutdown signal received, draining in-flight requests");
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
        Ok(Ok(Ok(()))) => info!("server stopped gracefully"),
        Ok(Ok(Err(err))) => error!(error = %err, "server exited with error"),
        Ok(Err(err)) => error!(error = %err, "server task failed"),
        Err(_) => warn!(
            grace_secs = SHUTDOWN_GRACE.as_secs(),
            "grace period elapsed, abandoning in-flight requests"
        ),
    }

    Ok(())
}
