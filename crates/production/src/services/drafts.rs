//! Editable drafts for new batches and new orders.
//!
//! Drafts hold raw form text. Validation turns them into store inputs; a draft
//! that fails validation never reaches the store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use proativa_core::{BatchStatus, OrderId, OrderItemId, Quantity, Unit};

use super::reconcile::{ItemView, OrderView};
use crate::models::production::NEW_ORDER_STATUS;
use crate::models::{NewBatch, NewOrder, NewOrderItem};

/// Why a draft was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("batch number is required")]
    MissingBatchNumber,

    #[error("quantity must be a positive number, got {0:?}")]
    InvalidQuantity(String),

    #[error("quantity {0:?} has more than 3 decimal places or is too large")]
    QuantityOutOfRange(String),

    #[error("order number is required")]
    MissingOrderNumber,

    #[error("client is required")]
    MissingClient,

    #[error("order must have at least one item")]
    NoItems,

    #[error("product name is required")]
    MissingProductName,
}

fn storable_quantity(quantity: Quantity, text: &str) -> Result<Quantity, ValidationError> {
    if !quantity.is_positive() {
        return Err(ValidationError::InvalidQuantity(text.to_string()));
    }
    if !quantity.fits_storage() {
        return Err(ValidationError::QuantityOutOfRange(text.to_string()));
    }
    Ok(quantity)
}

fn positive_quantity(text: &str) -> Result<Quantity, ValidationError> {
    let text = text.trim();
    let quantity =
        Quantity::parse(text).ok_or_else(|| ValidationError::InvalidQuantity(text.to_string()))?;
    storable_quantity(quantity, text)
}

/// A batch being recorded against an order item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchDraft {
    pub order_id: OrderId,
    pub item_id: OrderItemId,
    /// Display only.
    #[serde(default)]
    pub product_name: String,
    /// Display only.
    #[serde(default)]
    pub unit: Unit,
    #[serde(default)]
    pub batch_number: String,
    /// Quantity as typed.
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub manufacture_date: Option<NaiveDate>,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
}

impl BatchDraft {
    /// Prefill a draft for an item.
    ///
    /// The quantity starts at the item's remaining amount when that is
    /// positive and is left empty otherwise.
    #[must_use]
    pub fn open(order: &OrderView, item: &ItemView) -> Self {
        let quantity = if item.remaining.is_positive() {
            item.remaining.to_string()
        } else {
            String::new()
        };

        Self {
            order_id: order.id,
            item_id: item.id,
            product_name: item.product_name.clone(),
            unit: item.unit.clone(),
            batch_number: String::new(),
            quantity,
            manufacture_date: None,
            expiration_date: None,
        }
    }

    /// Check the draft and build the batch to insert, always in `todo`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingBatchNumber` for a blank batch number
    /// and `ValidationError::InvalidQuantity` unless the quantity parses to a
    /// positive number.
    pub fn validate(&self) -> Result<NewBatch, ValidationError> {
        let batch_number = self.batch_number.trim();
        if batch_number.is_empty() {
            return Err(ValidationError::MissingBatchNumber);
        }
        let quantity_produced = positive_quantity(&self.quantity)?;

        Ok(NewBatch {
            order_id: self.order_id,
            item_id: self.item_id,
            batch_number: batch_number.to_string(),
            quantity_produced,
            manufacture_date: self.manufacture_date,
            expiration_date: self.expiration_date,
            status: BatchStatus::Todo,
        })
    }
}

/// The item line currently being typed in an order draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingItem {
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub unit: Unit,
}

/// An item line accepted into an order draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedItem {
    pub product_name: String,
    pub quantity_requested: Quantity,
    #[serde(default)]
    pub unit: Unit,
}

impl StagedItem {
    /// Attach the staged line to a stored order.
    #[must_use]
    pub fn into_new_item(self, order_id: OrderId) -> NewOrderItem {
        NewOrderItem {
            order_id,
            product_name: self.product_name,
            quantity_requested: self.quantity_requested,
            unit: self.unit,
        }
    }
}

/// A new order with its item lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub pending: PendingItem,
    #[serde(default)]
    pub items: Vec<StagedItem>,
}

impl OrderDraft {
    /// Stage the pending line and reset it to an empty `UN` line.
    ///
    /// # Errors
    ///
    /// Leaves the draft untouched and returns an error when the product name
    /// is blank or the quantity is not a positive number.
    pub fn add_item(&mut self) -> Result<(), ValidationError> {
        let product_name = self.pending.product_name.trim();
        if product_name.is_empty() {
            return Err(ValidationError::MissingProductName);
        }
        let quantity_requested = positive_quantity(&self.pending.quantity)?;

        let staged = StagedItem {
            product_name: product_name.to_string(),
            quantity_requested,
            unit: std::mem::take(&mut self.pending.unit),
        };
        self.items.push(staged);
        self.pending = PendingItem::default();
        Ok(())
    }

    /// Drop a staged line. Out-of-range indexes are ignored.
    pub fn remove_item(&mut self, index: usize) -> Option<StagedItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Check the draft and split it into the order header and its lines.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for a blank order number or client, for an
    /// order without lines, or for a staged line that is blank or not positive.
    pub fn validate(&self) -> Result<(NewOrder, Vec<StagedItem>), ValidationError> {
        let order_number = self.order_number.trim();
        if order_number.is_empty() {
            return Err(ValidationError::MissingOrderNumber);
        }
        let client = self.client.trim();
        if client.is_empty() {
            return Err(ValidationError::MissingClient);
        }
        if self.items.is_empty() {
            return Err(ValidationError::NoItems);
        }

        let items = self
            .items
            .iter()
            .map(|item| {
                let product_name = item.product_name.trim();
                if product_name.is_empty() {
                    return Err(ValidationError::MissingProductName);
                }
                storable_quantity(
                    item.quantity_requested,
                    &item.quantity_requested.to_string(),
                )?;
                Ok(StagedItem {
                    product_name: product_name.to_string(),
                    ..item.clone()
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let order = NewOrder {
            order_number: order_number.to_string(),
            client: client.to_string(),
            status: NEW_ORDER_STATUS.to_string(),
        };
        Ok((order, items))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::{Batch, Order, OrderItem};
    use crate::services::reconcile::reconcile;
    use proativa_core::BatchId;

    fn views(requested: i64, done: i64) -> (OrderView, ItemView) {
        let now = Utc::now();
        let order = Order {
            id: OrderId::new(1),
            order_number: "1001".to_string(),
            client: "Fazenda X".to_string(),
            status: NEW_ORDER_STATUS.to_string(),
            created_at: now,
        };
        let item = OrderItem {
            id: OrderItemId::new(10),
            order_id: OrderId::new(1),
            product_name: "Bioativo A".to_string(),
            quantity_requested: Quantity::from(requested),
            unit: Unit::Lt,
        };
        let batch = Batch {
            id: BatchId::new(100),
            order_id: OrderId::new(1),
            item_id: OrderItemId::new(10),
            batch_number: "L01".to_string(),
            quantity_produced: Quantity::from(done),
            manufacture_date: None,
            expiration_date: None,
            status: BatchStatus::Done,
            created_at: now,
            updated_at: now,
        };
        let result = reconcile(&[order], &[item], &[batch]);
        let order_view = result.orders[0].clone();
        let item_view = order_view.items[0].clone();
        (order_view, item_view)
    }

    #[test]
    fn test_open_prefills_positive_remaining() {
        let (order, item) = views(100, 40);
        let draft = BatchDraft::open(&order, &item);
        assert_eq!(draft.quantity, "60");
        assert_eq!(draft.product_name, "Bioativo A");
        assert_eq!(draft.unit, Unit::Lt);
        assert!(draft.batch_number.is_empty());
        assert!(draft.manufacture_date.is_none());
    }

    #[test]
    fn test_open_leaves_quantity_empty_when_nothing_remains() {
        let (order, item) = views(100, 100);
        assert!(BatchDraft::open(&order, &item).quantity.is_empty());

        let (order, item) = views(100, 120);
        assert!(BatchDraft::open(&order, &item).quantity.is_empty());
    }

    #[test]
    fn test_batch_validation() {
        let (order, item) = views(100, 40);
        let mut draft = BatchDraft::open(&order, &item);

        assert_eq!(draft.validate(), Err(ValidationError::MissingBatchNumber));

        draft.batch_number = "  L02 ".to_string();
        draft.quantity = "0".to_string();
        assert!(matches!(draft.validate(), Err(ValidationError::InvalidQuantity(_))));

        draft.quantity = "abc".to_string();
        assert!(matches!(draft.validate(), Err(ValidationError::InvalidQuantity(_))));

        draft.quantity = "0.0004".to_string();
        assert_eq!(
            draft.validate(),
            Err(ValidationError::QuantityOutOfRange("0.0004".to_string()))
        );

        draft.quantity = "100000000000".to_string();
        assert!(matches!(draft.validate(), Err(ValidationError::QuantityOutOfRange(_))));

        draft.quantity = "30,5".to_string();
        let batch = draft.validate().unwrap();
        assert_eq!(batch.batch_number, "L02");
        assert_eq!(batch.quantity_produced, Quantity::parse("30.5").unwrap());
        assert_eq!(batch.status, BatchStatus::Todo);
        assert_eq!(batch.item_id, OrderItemId::new(10));
    }

    #[test]
    fn test_add_item_stages_and_resets_pending() {
        let mut draft = OrderDraft::default();
        draft.pending = PendingItem {
            product_name: "Bioativo A".to_string(),
            quantity: "100".to_string(),
            unit: Unit::Lt,
        };
        draft.add_item().unwrap();

        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.items[0].unit, Unit::Lt);
        assert_eq!(draft.pending, PendingItem::default());
        assert_eq!(draft.pending.unit, Unit::Un);
    }

    #[test]
    fn test_add_item_rejects_incomplete_line() {
        let mut draft = OrderDraft::default();
        assert_eq!(draft.add_item(), Err(ValidationError::MissingProductName));

        draft.pending.product_name = "Bioativo A".to_string();
        draft.pending.quantity = "-1".to_string();
        assert!(matches!(draft.add_item(), Err(ValidationError::InvalidQuantity(_))));
        assert!(draft.items.is_empty());
        assert_eq!(draft.pending.product_name, "Bioativo A");
    }

    #[test]
    fn test_remove_item() {
        let mut draft = OrderDraft::default();
        for name in ["A", "B"] {
            draft.pending.product_name = name.to_string();
            draft.pending.quantity = "1".to_string();
            draft.add_item().unwrap();
        }
        assert_eq!(draft.remove_item(0).map(|i| i.product_name), Some("A".to_string()));
        assert!(draft.remove_item(5).is_none());
        assert_eq!(draft.items.len(), 1);
    }

    #[test]
    fn test_order_validation() {
        let mut draft = OrderDraft::default();
        assert_eq!(draft.validate(), Err(ValidationError::MissingOrderNumber));

        draft.order_number = "1001".to_string();
        assert_eq!(draft.validate(), Err(ValidationError::MissingClient));

        draft.client = "Fazenda X".to_string();
        assert_eq!(draft.validate(), Err(ValidationError::NoItems));

        draft.items.push(StagedItem {
            product_name: "Bioativo A".to_string(),
            quantity_requested: Quantity::from(100),
            unit: Unit::Lt,
        });
        let (order, items) = draft.validate().unwrap();
        assert_eq!(order.status, NEW_ORDER_STATUS);
        assert_eq!(items.len(), 1);

        let new_item = items[0].clone().into_new_item(OrderId::new(7));
        assert_eq!(new_item.order_id, OrderId::new(7));
    }

    #[test]
    fn test_order_validation_rejects_bad_staged_line() {
        let draft = OrderDraft {
            order_number: "1".to_string(),
            client: "A".to_string(),
            pending: PendingItem::default(),
            items: vec![StagedItem {
                product_name: "P".to_string(),
                quantity_requested: Quantity::ZERO,
                unit: Unit::Un,
            }],
        };
        assert!(matches!(draft.validate(), Err(ValidationError::InvalidQuantity(_))));
    }

    #[test]
    fn test_order_validation_rejects_unstorable_line() {
        let draft = OrderDraft {
            order_number: "1".to_string(),
            client: "A".to_string(),
            pending: PendingItem::default(),
            items: vec![StagedItem {
                product_name: "P".to_string(),
                quantity_requested: Quantity::parse("1.0005").unwrap(),
                unit: Unit::Un,
            }],
        };
        assert!(matches!(
            draft.validate(),
            Err(ValidationError::QuantityOutOfRange(_))
        ));
    }
}
