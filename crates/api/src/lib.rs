//! HTTP API server for the lab order backend.
//!
//! Exposes the order lifecycle behind bearer-token authentication, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use domain::{OrderRepository, OrderService};
use identity::IdentityProvider;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use middleware::AuthState;
use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
///
/// `/health` and `/metrics` are public; every `/orders` route requires a
/// verified caller identity.
pub fn create_app<R: OrderRepository + 'static>(
    state: Arc<AppState<R>>,
    identity: Arc<dyn IdentityProvider>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let auth_state = AuthState { identity };

    let orders_router = Router::new()
        .route(
            "/orders",
            post(routes::orders::create::<R>).get(routes::orders::list::<R>),
        )
        .route("/orders/{id}", get(routes::orders::get::<R>))
        .route("/orders/{id}/advance", patch(routes::orders::advance::<R>))
        .route(
            "/orders/{id}/services",
            post(routes::orders::add_service::<R>),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::require_identity,
        ))
        .with_state(state);

    let metrics_router = Router::new()
        .route("/metrics", get(routes::system::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(orders_router)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wraps a repository into the shared application state.
pub fn create_state<R: OrderRepository>(repository: R) -> Arc<AppState<R>> {
    Arc::new(AppState {
        order_service: OrderService::new(repository),
    })
}
