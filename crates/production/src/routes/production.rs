//! Board API: orders, batch drafts and batch status.
//!
//! Each request builds a [`ProductionBoard`] over the shared store, so every
//! response carries a freshly reconciled snapshot.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use proativa_core::{BatchId, BatchStatus, OrderId, OrderItemId};

use crate::db::ProductionStore;
use crate::error::{AppError, Result};
use crate::models::{Batch, Order, OrderItem};
use crate::services::{BatchDraft, BoardSnapshot, DropOutcome, OrderDraft, ProductionBoard};
use crate::state::AppState;

async fn loaded_board<S: ProductionStore>(state: &AppState<S>) -> Result<ProductionBoard<S>> {
    let mut board = ProductionBoard::new(state.store().clone());
    board.load().await?;
    Ok(board)
}

/// Reconciled orders and Kanban columns.
///
/// GET /api/production
///
/// # Errors
///
/// Returns `AppError::Database` if any list cannot be read.
pub async fn board<S: ProductionStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<BoardSnapshot>> {
    Ok(Json(loaded_board(&state).await?.snapshot()))
}

/// Response for a created order.
#[derive(Debug, Serialize)]
pub struct CreatedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub board: BoardSnapshot,
}

/// Create an order with its items.
///
/// POST /api/orders
///
/// # Errors
///
/// Returns `AppError::Validation` for an incomplete draft, or
/// `AppError::Database` if an insert fails.
pub async fn create_order<S: ProductionStore>(
    State(state): State<AppState<S>>,
    Json(draft): Json<OrderDraft>,
) -> Result<(StatusCode, Json<CreatedOrder>)> {
    let mut board = ProductionBoard::new(state.store().clone());
    let (order, items) = board.commit_order_draft(&draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedOrder {
            order,
            items,
            board: board.snapshot(),
        }),
    ))
}

/// Delete an order together with its items and batches.
///
/// DELETE /api/orders/{order_id}
///
/// # Errors
///
/// Returns `AppError::NotFound` if the order does not exist.
pub async fn delete_order<S: ProductionStore>(
    State(state): State<AppState<S>>,
    Path(order_id): Path<OrderId>,
) -> Result<Json<BoardSnapshot>> {
    let mut board = ProductionBoard::new(state.store().clone());
    if !board.delete_order(order_id).await? {
        return Err(AppError::NotFound(format!("order {order_id}")));
    }
    Ok(Json(board.snapshot()))
}

/// Batch draft prefilled for an order item.
///
/// GET /api/items/{item_id}/batch-draft
///
/// # Errors
///
/// Returns `AppError::NotFound` if the item is unknown.
pub async fn batch_draft<S: ProductionStore>(
    State(state): State<AppState<S>>,
    Path(item_id): Path<OrderItemId>,
) -> Result<Json<BatchDraft>> {
    let board = loaded_board(&state).await?;
    Ok(Json(board.open_batch_draft(item_id)?))
}

/// Response for a created batch.
#[derive(Debug, Serialize)]
pub struct CreatedBatch {
    pub batch: Batch,
    pub board: BoardSnapshot,
}

/// Record a batch from a draft. New batches always start in `todo`.
///
/// POST /api/batches
///
/// # Errors
///
/// Returns `AppError::Validation` for a blank batch number or a quantity that
/// is not positive or not storable, `AppError::NotFound` for an unknown item,
/// or `AppError::Database` if the insert fails.
pub async fn create_batch<S: ProductionStore>(
    State(state): State<AppState<S>>,
    Json(draft): Json<BatchDraft>,
) -> Result<(StatusCode, Json<CreatedBatch>)> {
    let mut board = ProductionBoard::new(state.store().clone());
    let batch = board.commit_batch_draft(&draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedBatch {
            batch,
            board: board.snapshot(),
        }),
    ))
}

/// Requested status change.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: BatchStatus,
}

/// Result of a status change.
#[derive(Debug, Serialize)]
pub struct StatusChange {
    pub batch_id: BatchId,
    pub status: BatchStatus,
    /// `false` when the batch already had the requested status.
    pub changed: bool,
    pub board: BoardSnapshot,
}

/// Move a batch to another Kanban column.
///
/// PATCH /api/batches/{batch_id}/status
///
/// Runs the same drag-and-drop path as the board: a move into the batch's
/// current column is a no-op and nothing is written.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the batch is unknown, or
/// `AppError::Database` if the update was rejected.
pub async fn update_batch_status<S: ProductionStore>(
    State(state): State<AppState<S>>,
    Path(batch_id): Path<BatchId>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<StatusChange>> {
    let mut board = loaded_board(&state).await?;
    board.begin_drag(batch_id);
    board.drag_over_column(update.status);

    let changed = match board.drop_on(update.status).await {
        DropOutcome::NoDrag => return Err(AppError::NotFound(format!("batch {batch_id}"))),
        DropOutcome::SameColumn => false,
        DropOutcome::Moved { .. } => true,
        DropOutcome::Reverted { error, .. } => return Err(error.into()),
    };

    Ok(Json(StatusChange {
        batch_id,
        status: update.status,
        changed,
        board: board.snapshot(),
    }))
}
