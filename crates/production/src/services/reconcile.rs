//! Order/batch reconciliation.
//!
//! Joins the three flat store lists by typed foreign keys and derives, per
//! order item, how much has been produced in any status and how much has
//! reached `done`. The join is total: dangling references resolve to
//! placeholder display values instead of errors, and every input item and
//! batch yields exactly one view row.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use proativa_core::{BatchId, BatchStatus, OrderId, OrderItemId, Quantity, Unit};

use crate::models::{Batch, Order, OrderItem};

/// Product name shown for a batch whose item row is missing.
pub const UNKNOWN_PRODUCT: &str = "Desconhecido";

/// Order number / client shown when the order row is missing.
pub const UNKNOWN_REFERENCE: &str = "?";

/// Produced quantities accumulated for one order item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducedTally {
    /// Sum over batches in any status.
    pub total: Quantity,
    /// Sum over batches in `done`.
    pub completed: Quantity,
}

impl ProducedTally {
    fn record(&mut self, batch: &Batch) {
        self.total += batch.quantity_produced;
        if batch.status.is_done() {
            self.completed += batch.quantity_produced;
        }
    }
}

/// Reconciled view of one order item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemView {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_name: String,
    pub quantity_requested: Quantity,
    pub unit: Unit,
    /// Produced in any status.
    pub produced_total: Quantity,
    /// Produced and `done`.
    pub produced_completed: Quantity,
    /// `quantity_requested - produced_completed`. Negative when over-produced.
    pub remaining: Quantity,
    /// `produced_completed >= quantity_requested`.
    pub is_complete: bool,
}

impl ItemView {
    /// Build the view of an item from its produced tally.
    #[must_use]
    pub fn new(item: &OrderItem, tally: ProducedTally) -> Self {
        Self {
            id: item.id,
            order_id: item.order_id,
            product_name: item.product_name.clone(),
            quantity_requested: item.quantity_requested,
            unit: item.unit.clone(),
            produced_total: tally.total,
            produced_completed: tally.completed,
            remaining: item.quantity_requested - tally.completed,
            is_complete: tally.completed >= item.quantity_requested,
        }
    }
}

/// Reconciled view of one order with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderView {
    pub id: OrderId,
    pub order_number: String,
    pub client: String,
    pub status: String,
    pub items: Vec<ItemView>,
    /// Every item complete. An order without items counts as complete.
    pub is_complete: bool,
    /// The order row is missing; the header fields are placeholders.
    pub is_placeholder: bool,
}

impl OrderView {
    fn new(order: &Order, items: Vec<ItemView>) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number.clone(),
            client: order.client.clone(),
            status: order.status.clone(),
            is_complete: items.iter().all(|i| i.is_complete),
            items,
            is_placeholder: false,
        }
    }

    fn placeholder(id: OrderId, items: Vec<ItemView>) -> Self {
        Self {
            id,
            order_number: UNKNOWN_REFERENCE.to_string(),
            client: UNKNOWN_REFERENCE.to_string(),
            status: String::new(),
            is_complete: items.iter().all(|i| i.is_complete),
            items,
            is_placeholder: true,
        }
    }

    /// Find one of this order's items.
    #[must_use]
    pub fn item(&self, item_id: OrderItemId) -> Option<&ItemView> {
        self.items.iter().find(|i| i.id == item_id)
    }
}

/// A batch as shown on the Kanban board, with display fields joined in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchCard {
    pub id: BatchId,
    pub order_id: OrderId,
    pub item_id: OrderItemId,
    pub batch_number: String,
    pub quantity_produced: Quantity,
    pub manufacture_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub status: BatchStatus,
    pub product_name: String,
    pub unit: Unit,
    pub order_number: String,
    pub client: String,
}

impl BatchCard {
    /// Join a batch with its item and order, tolerating either being absent.
    #[must_use]
    pub fn new(batch: &Batch, item: Option<&OrderItem>, order: Option<&Order>) -> Self {
        Self {
            id: batch.id,
            order_id: batch.order_id,
            item_id: batch.item_id,
            batch_number: batch.batch_number.clone(),
            quantity_produced: batch.quantity_produced,
            manufacture_date: batch.manufacture_date,
            expiration_date: batch.expiration_date,
            status: batch.status,
            product_name: item.map_or_else(
                || UNKNOWN_PRODUCT.to_string(),
                |i| i.product_name.clone(),
            ),
            unit: item.map(|i| i.unit.clone()).unwrap_or_default(),
            order_number: order.map_or_else(
                || UNKNOWN_REFERENCE.to_string(),
                |o| o.order_number.clone(),
            ),
            client: order.map_or_else(|| UNKNOWN_REFERENCE.to_string(), |o| o.client.clone()),
        }
    }
}

/// Result of a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// Orders in input order, followed by placeholder orders for items whose
    /// order row is missing.
    pub orders: Vec<OrderView>,
    /// One card per input batch, in input order.
    pub batches: Vec<BatchCard>,
}

impl Reconciliation {
    /// Find an item and the order view it is listed under.
    #[must_use]
    pub fn find_item(&self, item_id: OrderItemId) -> Option<(&OrderView, &ItemView)> {
        self.orders
            .iter()
            .find_map(|order| order.item(item_id).map(|item| (order, item)))
    }
}

/// Join orders, items and batches into presentation-ready views.
///
/// Pure and total: never fails, never drops an input row. Must be re-run after
/// any batch mutation; there is no incremental update.
#[must_use]
pub fn reconcile(orders: &[Order], items: &[OrderItem], batches: &[Batch]) -> Reconciliation {
    let mut tallies: HashMap<OrderItemId, ProducedTally> = HashMap::new();
    for batch in batches {
        tallies.entry(batch.item_id).or_default().record(batch);
    }

    let known_orders: HashSet<OrderId> = orders.iter().map(|o| o.id).collect();
    let mut items_by_order: HashMap<OrderId, Vec<ItemView>> = HashMap::new();
    let mut orphan_order_ids = Vec::new();

    for item in items {
        let tally = tallies.get(&item.id).copied().unwrap_or_default();
        if !known_orders.contains(&item.order_id) && !items_by_order.contains_key(&item.order_id)
        {
            orphan_order_ids.push(item.order_id);
        }
        items_by_order
            .entry(item.order_id)
            .or_default()
            .push(ItemView::new(item, tally));
    }

    let mut order_views: Vec<OrderView> = orders
        .iter()
        .map(|order| OrderView::new(order, items_by_order.remove(&order.id).unwrap_or_default()))
        .collect();
    order_views.extend(orphan_order_ids.into_iter().map(|id| {
        OrderView::placeholder(id, items_by_order.remove(&id).unwrap_or_default())
    }));

    let order_lookup: HashMap<OrderId, &Order> = orders.iter().map(|o| (o.id, o)).collect();
    let item_lookup: HashMap<OrderItemId, &OrderItem> = items.iter().map(|i| (i.id, i)).collect();
    let cards = batches
        .iter()
        .map(|batch| {
            BatchCard::new(
                batch,
                item_lookup.get(&batch.item_id).copied(),
                order_lookup.get(&batch.order_id).copied(),
            )
        })
        .collect();

    Reconciliation {
        orders: order_views,
        batches: cards,
    }
}
