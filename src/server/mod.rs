//! HTTP surface: phrase CRUD, background selection and direct image lookups.

pub mod error;
pub mod handlers;
mod request_tracing;

use axum::middleware::from_fn;
use axum::routing::{get, post, put};
use axum::Router;
use tokio::net::TcpListener;

use crate::context::ServiceContext;
use crate::error::ServiceError;

/// Build the application router.
///
/// Phrase routes are served both at the root and under `/api`.
pub fn build_router(ctx: ServiceContext) -> Router {
    let api = Router::new()
        .route(
            "/phrases",
            get(handlers::list_phrases).post(handlers::create_phrase),
        )
        .route(
            "/phrases/:phrase_id",
            get(handlers::get_phrase).patch(handlers::update_phrase),
        )
        .route(
            "/phrases/:phrase_id/candidates",
            get(handlers::list_candidates),
        )
        .route("/phrases/:phrase_id/image", put(handlers::set_image))
        .route("/images", post(handlers::generate_image));

    Router::new()
        .route("/healthz", get(handlers::healthz))
        .merge(api.clone())
        .nest("/api", api)
        .layer(from_fn(request_tracing::request_tracing_middleware))
        .with_state(ctx)
}

/// Bind `addr` and serve until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(ctx: ServiceContext, addr: &str) -> Result<(), ServiceError> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        backends = ?ctx.images.backend_names(),
        "phrasebook listening"
    );
    axum::serve(listener, build_router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
