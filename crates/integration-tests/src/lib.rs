//! Integration tests for Proativa production.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p proativa-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `production_board` - Board scenarios against the in-memory store
//! - `production_api` - HTTP API round trips through the router
//!
//! The helpers below seed a [`MemoryStore`] with orders, items and batches.

use chrono::Utc;

use proativa_core::{BatchId, BatchStatus, OrderId, OrderItemId, Quantity, Unit};
use proativa_production::db::{MemoryStore, OrderStore, RepositoryError};
use proativa_production::models::{NewBatch, NewOrder, NewOrderItem};

/// Insert an order with one item per `(product, requested, unit)`.
///
/// # Errors
///
/// Returns the store error if an insert fails.
pub async fn seed_order(
    store: &MemoryStore,
    order_number: &str,
    client: &str,
    items: &[(&str, i64, Unit)],
) -> Result<(OrderId, Vec<OrderItemId>), RepositoryError> {
    let order = store
        .insert_order(&NewOrder {
            order_number: order_number.to_string(),
            client: client.to_string(),
            status: "pending".to_string(),
        })
        .await?;
    let new_items: Vec<NewOrderItem> = items
        .iter()
        .map(|(name, requested, unit)| NewOrderItem {
            order_id: order.id,
            product_name: (*name).to_string(),
            quantity_requested: Quantity::from(*requested),
            unit: unit.clone(),
        })
        .collect();
    let inserted = store.insert_items(&new_items).await?;
    Ok((order.id, inserted.into_iter().map(|i| i.id).collect()))
}

/// Insert a batch with the given status.
///
/// # Errors
///
/// Returns the store error if the insert fails.
pub async fn seed_batch(
    store: &MemoryStore,
    order_id: OrderId,
    item_id: OrderItemId,
    batch_number: &str,
    quantity: i64,
    status: BatchStatus,
) -> Result<BatchId, RepositoryError> {
    let batch = store
        .insert_batch(&NewBatch {
            order_id,
            item_id,
            batch_number: batch_number.to_string(),
            quantity_produced: Quantity::from(quantity),
            manufacture_date: Some(Utc::now().date_naive()),
            expiration_date: None,
            status,
        })
        .await?;
    Ok(batch.id)
}
