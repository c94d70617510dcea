use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::storage::StoreHandle;
use crate::task::TaskStore;
use crate::task::web::{BoardState, create_board_router};

mod shutdown;

pub use shutdown::{ShutdownSignal, shutdown_signal};

/// Builds the application router on top of `store`.
pub fn create_app(store: Arc<dyn TaskStore>) -> Router {
    let board_router = create_board_router(Arc::new(BoardState { store }));

    Router::new()
        .route("/health", get(health_check_handler))
        .merge(board_router)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// Serves the board until a termination signal arrives.
///
/// Returns the signal that stopped the server, or `None` if it stopped on its own. The store
/// handle is closed before returning in either case.
#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<Option<ShutdownSignal>> {
    let store_handle = StoreHandle::open(&config).await?;

    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = match tokio::net::TcpListener::bind(&server_address).await {
        Ok(listener) => listener,
        Err(err) => {
            store_handle.close().await;
            return Err(err.into());
        }
    };
    tracing::info!("Web server running on http://{}", server_address);

    let app = create_app(store_handle.task_store());

    let (signal_tx, signal_rx) = oneshot::channel();
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let signal = shutdown_signal().await;
            let _ = signal_tx.send(signal);
        })
        .await;

    store_handle.close().await;
    served?;

    let signal = signal_rx.await.ok();
    tracing::info!("Web server stopped");
    Ok(signal)
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}
