//! Production order, order item and batch models.
//!
//! These mirror the three flat tables the board is loaded from. They are
//! joined by typed foreign keys in [`crate::services::reconcile`], never by a
//! nested fetch.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use proativa_core::{BatchId, BatchStatus, OrderId, OrderItemId, Quantity, Unit};

/// Status assigned to every newly entered order.
pub const NEW_ORDER_STATUS: &str = "pending";

/// A customer's production request (header record).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Human order number (free text, e.g. "1001").
    pub order_number: String,
    /// Client name.
    pub client: String,
    /// Free-form lifecycle status. Not used for business rules.
    pub status: String,
    /// When the order was entered.
    pub created_at: DateTime<Utc>,
}

/// One product line within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Unique item ID.
    pub id: OrderItemId,
    /// Owning order.
    pub order_id: OrderId,
    /// Product name.
    pub product_name: String,
    /// Requested quantity.
    pub quantity_requested: Quantity,
    /// Unit of measure.
    pub unit: Unit,
}

/// One production run against an order item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// Unique batch ID.
    pub id: BatchId,
    /// Order back-reference, kept for display only.
    pub order_id: OrderId,
    /// Item this batch produces. Canonical join key.
    pub item_id: OrderItemId,
    /// Batch/lot label (not required to be unique).
    pub batch_number: String,
    /// Produced quantity. Never changes after creation.
    pub quantity_produced: Quantity,
    /// Date of manufacture.
    pub manufacture_date: Option<NaiveDate>,
    /// Expiration date.
    pub expiration_date: Option<NaiveDate>,
    /// Kanban column.
    pub status: BatchStatus,
    /// When the batch was recorded.
    pub created_at: DateTime<Utc>,
    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting an order header.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewOrder {
    /// Human order number.
    pub order_number: String,
    /// Client name.
    pub client: String,
    /// Initial status.
    pub status: String,
}

/// Input for inserting an order item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewOrderItem {
    /// Owning order.
    pub order_id: OrderId,
    /// Product name.
    pub product_name: String,
    /// Requested quantity (positive).
    pub quantity_requested: Quantity,
    /// Unit of measure.
    pub unit: Unit,
}

/// Input for inserting a batch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewBatch {
    /// Order back-reference.
    pub order_id: OrderId,
    /// Item being produced.
    pub item_id: OrderItemId,
    /// Batch/lot label.
    pub batch_number: String,
    /// Produced quantity (positive).
    pub quantity_produced: Quantity,
    /// Date of manufacture.
    pub manufacture_date: Option<NaiveDate>,
    /// Expiration date.
    pub expiration_date: Option<NaiveDate>,
    /// Initial status, always `todo` for batches created from a draft.
    pub status: BatchStatus,
}
