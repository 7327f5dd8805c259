//! HTTP route handlers for the production service.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                              - Liveness check
//! GET    /health/ready                        - Store reachability
//!
//! # Board
//! GET    /api/production                      - Reconciled orders + Kanban columns
//! POST   /api/orders                          - Create order with items
//! DELETE /api/orders/{order_id}               - Delete order, items and batches
//! GET    /api/items/{item_id}/batch-draft     - Prefilled batch draft
//! POST   /api/batches                         - Commit batch draft
//! PATCH  /api/batches/{batch_id}/status       - Move batch to another column
//!
//! # Certificates
//! GET    /api/batches/{batch_id}/certificate  - Certificate form (stored or new)
//! PUT    /api/batches/{batch_id}/certificate  - Save certificate form
//! ```

pub mod certificates;
pub mod production;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, patch, post},
};

use crate::db::ProductionStore;
use crate::state::AppState;

/// Create the board API router.
pub fn production_routes<S: ProductionStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/production", get(production::board::<S>))
        .route("/orders", post(production::create_order::<S>))
        .route("/orders/{order_id}", delete(production::delete_order::<S>))
        .route(
            "/items/{item_id}/batch-draft",
            get(production::batch_draft::<S>),
        )
        .route("/batches", post(production::create_batch::<S>))
        .route(
            "/batches/{batch_id}/status",
            patch(production::update_batch_status::<S>),
        )
}

/// Create the certificate API router.
pub fn certificate_routes<S: ProductionStore>() -> Router<AppState<S>> {
    Router::new().route(
        "/batches/{batch_id}/certificate",
        get(certificates::show::<S>).put(certificates::save::<S>),
    )
}

/// Create all routes for the production service.
pub fn routes<S: ProductionStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness::<S>))
        .nest(
            "/api",
            production_routes::<S>().merge(certificate_routes::<S>()),
        )
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness<S: ProductionStore>(State(state): State<AppState<S>>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_support {
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::db::MemoryStore;
    use crate::state::AppState;

    pub fn app(store: &MemoryStore) -> Router {
        super::routes::<MemoryStore>().with_state(AppState::with_store(store.clone()))
    }

    pub async fn send(
        store: &MemoryStore,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app(store).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }
}
