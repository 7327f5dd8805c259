//! Production board state container.
//!
//! [`ProductionBoard`] owns the reconciled order views and the Kanban cards
//! for one session and is the only place that mutates them. Every operation
//! takes `&mut self`, so at most one drop or commit is in flight per board.
//!
//! Status drops are optimistic: the card moves locally before the store call
//! and is restored from a snapshot if the call fails. A full reload only
//! happens when a batch enters or leaves `done`, since that is the only
//! transition that changes item completion.

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use proativa_core::{BatchId, BatchStatus, OrderId, OrderItemId};

use super::drafts::{BatchDraft, OrderDraft, ValidationError};
use super::kanban::{KanbanBoard, KanbanColumn};
use super::optimistic::OptimisticAction;
use super::reconcile::{OrderView, reconcile};
use crate::db::{OrderStore, RepositoryError};
use crate::models::{Batch, Order, OrderItem};

/// Errors from board operations other than drops.
#[derive(Debug, Error)]
pub enum BoardError {
    /// The draft was rejected before any store call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The item a draft was requested for is not on the board.
    #[error("order item {0} not found")]
    ItemNotFound(OrderItemId),

    /// The store rejected the call.
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

/// What happened when a card was dropped on a column.
#[derive(Debug)]
pub enum DropOutcome {
    /// Nothing was being dragged, or the dragged card is no longer on the board.
    NoDrag,
    /// The card already was in the target column. Nothing was persisted.
    SameColumn,
    /// The status change was persisted.
    Moved {
        id: BatchId,
        from: BatchStatus,
        to: BatchStatus,
        /// The board was reloaded because the move crossed `done`.
        reloaded: bool,
    },
    /// Persisting failed and the card list was restored.
    Reverted { id: BatchId, error: RepositoryError },
}

/// Serializable view of the whole board.
#[derive(Debug, Clone, Serialize)]
pub struct BoardSnapshot {
    pub orders: Vec<OrderView>,
    pub columns: Vec<KanbanColumn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Orders, items and batches of one production session.
#[derive(Debug)]
pub struct ProductionBoard<S> {
    store: S,
    orders: Vec<OrderView>,
    kanban: KanbanBoard,
    notice: Option<String>,
}

impl<S: OrderStore> ProductionBoard<S> {
    /// Create an empty board. Call [`ProductionBoard::load`] to populate it.
    pub fn new(store: S) -> Self {
        Self {
            store,
            orders: Vec::new(),
            kanban: KanbanBoard::default(),
            notice: None,
        }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Reconciled orders, newest first.
    pub fn orders(&self) -> &[OrderView] {
        &self.orders
    }

    /// Kanban cards and drag state.
    pub const fn kanban(&self) -> &KanbanBoard {
        &self.kanban
    }

    /// Last user-visible message, set when a write or reload failed.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Dismiss the current notice.
    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Orders and columns for rendering.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            orders: self.orders.clone(),
            columns: self.kanban.columns(),
            notice: self.notice.clone(),
        }
    }

    /// Fetch the three lists and rebuild every view.
    ///
    /// # Errors
    ///
    /// Returns the first store error. The board keeps its previous contents.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<(), RepositoryError> {
        let orders = self.store.list_orders().await?;
        let items = self.store.list_items().await?;
        let batches = self.store.list_batches().await?;

        let result = reconcile(&orders, &items, &batches);
        tracing::debug!(
            orders = result.orders.len(),
            batches = result.batches.len(),
            "Board reconciled"
        );
        self.orders = result.orders;
        self.kanban.replace_cards(result.batches);
        Ok(())
    }

    /// Start dragging a batch card.
    pub fn begin_drag(&mut self, id: BatchId) {
        self.kanban.begin_drag(id);
    }

    /// Highlight the column under the pointer.
    pub const fn drag_over_column(&mut self, column: BatchStatus) {
        self.kanban.drag_over_column(column);
    }

    /// Clear the column highlight.
    pub const fn drag_leave_column(&mut self) {
        self.kanban.drag_leave_column();
    }

    /// Drop the dragged card on `column` and persist the new status.
    ///
    /// Drag and hover tracking are cleared whatever the outcome. A failed
    /// store call restores the card list and sets a notice instead of
    /// returning an error.
    #[instrument(skip(self), fields(batch_id = tracing::field::Empty))]
    pub async fn drop_on(&mut self, column: BatchStatus) -> DropOutcome {
        let Some(id) = self.kanban.take_drag() else {
            return DropOutcome::NoDrag;
        };
        tracing::Span::current().record("batch_id", tracing::field::display(id));

        let Some(from) = self.kanban.card(id).map(|card| card.status) else {
            tracing::debug!("Dragged batch is no longer on the board");
            return DropOutcome::NoDrag;
        };
        if from == column {
            return DropOutcome::SameColumn;
        }

        let persist = self.store.update_batch_status(id, column, Utc::now());
        let result = OptimisticAction::run(
            self.kanban.cards_mut(),
            |cards| KanbanBoard::set_status(cards, id, column),
            persist,
        )
        .await;

        if let Err(error) = result {
            tracing::warn!(from = %from, to = %column, error = %error, "Status update failed, reverted");
            self.notice = Some(format!("Erro ao atualizar status: {error}"));
            return DropOutcome::Reverted { id, error };
        }

        tracing::info!(from = %from, to = %column, "Batch status updated");
        let reloaded = if from.is_done() || column.is_done() {
            self.reload("status update").await
        } else {
            false
        };

        DropOutcome::Moved {
            id,
            from,
            to: column,
            reloaded,
        }
    }

    /// Prefill a batch draft for an order item on the board.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::ItemNotFound` if the item is not on the board.
    pub fn open_batch_draft(&self, item_id: OrderItemId) -> Result<BatchDraft, BoardError> {
        self.orders
            .iter()
            .find_map(|order| order.item(item_id).map(|item| BatchDraft::open(order, item)))
            .ok_or(BoardError::ItemNotFound(item_id))
    }

    /// Validate a batch draft, insert it as `todo` and reload.
    ///
    /// The board is refreshed first and the batch is attached to the order
    /// that owns the item; the draft's own `order_id` is ignored.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Validation` without calling the store when the
    /// draft is invalid, `BoardError::ItemNotFound` when the item does not
    /// exist, or `BoardError::Store` when a store call fails.
    #[instrument(skip(self, draft), fields(item_id = %draft.item_id))]
    pub async fn commit_batch_draft(&mut self, draft: &BatchDraft) -> Result<Batch, BoardError> {
        let mut new_batch = draft.validate()?;
        self.load().await?;
        new_batch.order_id = self
            .orders
            .iter()
            .find_map(|order| order.item(draft.item_id))
            .map(|item| item.order_id)
            .ok_or(BoardError::ItemNotFound(draft.item_id))?;
        if new_batch.order_id != draft.order_id {
            tracing::debug!(
                draft_order_id = %draft.order_id,
                order_id = %new_batch.order_id,
                "Draft named another order"
            );
        }

        let batch = self.store.insert_batch(&new_batch).await?;
        tracing::info!(batch_id = %batch.id, batch_number = %batch.batch_number, "Batch created");
        self.reload("batch creation").await;
        Ok(batch)
    }

    /// Validate an order draft, insert the order and its items, and reload.
    ///
    /// The two inserts are separate store calls. If the item insert fails the
    /// order header stays in the store without items.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Validation` without calling the store when the
    /// draft is invalid, or `BoardError::Store` when either insert fails.
    #[instrument(skip(self, draft), fields(order_number = %draft.order_number))]
    pub async fn commit_order_draft(
        &mut self,
        draft: &OrderDraft,
    ) -> Result<(Order, Vec<OrderItem>), BoardError> {
        let (new_order, staged) = draft.validate()?;
        let order = self.store.insert_order(&new_order).await?;

        let new_items: Vec<_> = staged
            .into_iter()
            .map(|item| item.into_new_item(order.id))
            .collect();
        let items = match self.store.insert_items(&new_items).await {
            Ok(items) => items,
            Err(e) => {
                tracing::error!(order_id = %order.id, error = %e, "Order saved without its items");
                self.reload("order creation").await;
                return Err(e.into());
            }
        };

        tracing::info!(order_id = %order.id, items = items.len(), "Order created");
        self.reload("order creation").await;
        Ok((order, items))
    }

    /// Delete an order with its batches and items, then reload.
    ///
    /// Returns `false` when the order header did not exist.
    ///
    /// # Errors
    ///
    /// Returns the first failing store call. Rows deleted by earlier calls
    /// stay deleted.
    #[instrument(skip(self))]
    pub async fn delete_order(&mut self, order_id: OrderId) -> Result<bool, BoardError> {
        let batches = self.store.delete_batches_for_order(order_id).await?;
        let items = self.store.delete_items_for_order(order_id).await?;
        let deleted = self.store.delete_order(order_id).await?;
        tracing::info!(batches, items, deleted, "Order deleted");
        self.reload("order deletion").await;
        Ok(deleted)
    }

    /// Reload after a successful write. A failure becomes a notice.
    async fn reload(&mut self, after: &str) -> bool {
        match self.load().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, after, "Reload failed");
                self.notice = Some(format!("Erro ao recarregar dados: {e}"));
                false
            }
        }
    }
}
