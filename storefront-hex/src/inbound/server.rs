//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Json, Router,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use storefront_types::{DocumentStore, PaymentGateway};

use super::handlers::{self, AppState};
use crate::StoreService;
use crate::openapi::ApiDoc;

/// HTTP Server for the Storefront API.
pub struct HttpServer<S: DocumentStore, P: PaymentGateway> {
    state: Arc<AppState<S, P>>,
}

impl<S: DocumentStore, P: PaymentGateway> HttpServer<S, P> {
    /// Creates a new HTTP server with the given service.
    pub fn new(service: StoreService<S, P>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(handlers::health::<S, P>))
            .route("/checkout", post(handlers::checkout::<S, P>))
            .route("/checkout/update", put(handlers::mark_order_paid::<S, P>))
            .route("/users", post(handlers::register_user::<S, P>))
            .route("/admin/{email}", get(handlers::get_user::<S, P>))
            .route("/addAdmin", put(handlers::promote_admin::<S, P>))
            .route("/products", get(handlers::list_products::<S, P>))
            .route(
                "/placeorder/{id}",
                get(handlers::get_product::<S, P>).delete(handlers::delete_order::<S, P>),
            )
            .route("/placeorder", post(handlers::place_order::<S, P>))
            .route("/orders", get(handlers::list_orders::<S, P>))
            .route(
                "/updateOrderStatus",
                put(handlers::update_order_status::<S, P>),
            )
            .route("/updateProduct", put(handlers::update_product::<S, P>))
            .route("/addProduct", post(handlers::add_product::<S, P>))
            .route("/addReview", post(handlers::add_review::<S, P>))
            .route("/reviews", get(handlers::list_reviews::<S, P>))
            .route(
                "/deleteProduct/{id}",
                delete(handlers::delete_product::<S, P>),
            )
            .route("/updateOne/{id}", get(handlers::get_product::<S, P>))
            .route(
                "/api-docs/openapi.json",
                get(|| async { Json(ApiDoc::openapi()) }),
            )
            .fallback(handlers::not_found)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
