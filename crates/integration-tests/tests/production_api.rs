//! HTTP round trips through the production router.
//!
//! Uses `tower::ServiceExt::oneshot` against the in-memory store, so no
//! server or database is needed.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use proativa_production::db::MemoryStore;
use proativa_production::routes;
use proativa_production::state::AppState;

async fn send(
    store: &MemoryStore,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let app = routes::routes::<MemoryStore>().with_state(AppState::with_store(store.clone()));
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn column<'a>(board: &'a Value, status: &str) -> &'a Vec<Value> {
    board["columns"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["status"] == status)
        .unwrap()["cards"]
        .as_array()
        .unwrap()
}

#[tokio::test]
async fn test_order_to_certificate_flow() {
    let store = MemoryStore::new();

    // Register the order.
    let (status, created) = send(
        &store,
        "POST",
        "/api/orders",
        Some(json!({
            "order_number": "1001",
            "client": "Fazenda X",
            "items": [
                { "product_name": "Bioativo A", "quantity_requested": "100", "unit": "LT" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let item_id = created["items"][0]["id"].as_i64().unwrap();

    // Record two batches from prefilled drafts.
    let mut batch_ids = Vec::new();
    for (number, quantity) in [("L01", "40"), ("L02", "30")] {
        let (status, mut draft) =
            send(&store, "GET", &format!("/api/items/{item_id}/batch-draft"), None).await;
        assert_eq!(status, StatusCode::OK);
        draft["batch_number"] = json!(number);
        draft["quantity"] = json!(quantity);

        let (status, body) = send(&store, "POST", "/api/batches", Some(draft)).await;
        assert_eq!(status, StatusCode::CREATED);
        batch_ids.push(body["batch"]["id"].as_i64().unwrap());
    }

    // L01 to done, L02 to in progress.
    let (_, body) = send(
        &store,
        "PATCH",
        &format!("/api/batches/{}/status", batch_ids[0]),
        Some(json!({ "status": "done" })),
    )
    .await;
    assert_eq!(body["changed"], true);
    let (_, body) = send(
        &store,
        "PATCH",
        &format!("/api/batches/{}/status", batch_ids[1]),
        Some(json!({ "status": "in_progress" })),
    )
    .await;

    let board = &body["board"];
    let item = &board["orders"][0]["items"][0];
    assert_eq!(item["produced_total"], "70");
    assert_eq!(item["produced_completed"], "40");
    assert_eq!(item["remaining"], "60");
    assert_eq!(item["is_complete"], false);
    assert!(column(board, "todo").is_empty());
    assert_eq!(column(board, "in_progress").len(), 1);
    assert_eq!(column(board, "done")[0]["batch_number"], "L01");

    // Issue a certificate for the finished batch.
    let uri = format!("/api/batches/{}/certificate", batch_ids[0]);
    let (status, mut form) = send(&store, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(form["product_name"], "Bioativo A");
    assert_eq!(form["batch_number"], "L01");

    form["physicochemicals"][2]["result_value"] = json!("6,8");
    let (status, _) = send(&store, "PUT", &uri, Some(form)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, reloaded) = send(&store, "GET", &uri, None).await;
    assert!(reloaded["certificate_id"].is_number());
    assert_eq!(reloaded["physicochemicals"][2]["characteristic"], "pH");
    assert_eq!(reloaded["physicochemicals"][2]["result_value"], "6,8");

    // Deleting the order empties the board.
    let order_id = created["order"]["id"].as_i64().unwrap();
    let (status, board) = send(&store, "DELETE", &format!("/api/orders/{order_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(board["orders"].as_array().unwrap().is_empty());
    assert!(column(&board, "done").is_empty());
}

#[tokio::test]
async fn test_store_outage() {
    let store = MemoryStore::new();
    store.set_fail_reads(true);

    let (status, _) = send(&store, "GET", "/health/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, body) = send(&store, "GET", "/api/production", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");

    let (status, _) = send(&store, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}
