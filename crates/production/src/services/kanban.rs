//! Kanban projection of production batches.
//!
//! Holds the batch cards shown on the board plus the transient drag state
//! (which card is being dragged, which column is hovered). Persisting a drop
//! is the job of [`crate::services::board::ProductionBoard`]; this type only
//! owns the local state the drop mutates and rolls back.

use serde::Serialize;

use proativa_core::{BatchId, BatchStatus};

use super::reconcile::BatchCard;

/// One column of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KanbanColumn {
    /// Status the column represents.
    pub status: BatchStatus,
    /// Column heading.
    pub title: &'static str,
    /// Cards currently in the column, in board order.
    pub cards: Vec<BatchCard>,
}

/// Split cards into the three status columns, in column order.
#[must_use]
pub fn partition(cards: &[BatchCard]) -> Vec<KanbanColumn> {
    BatchStatus::ALL
        .into_iter()
        .map(|status| KanbanColumn {
            status,
            title: status.title(),
            cards: cards.iter().filter(|c| c.status == status).cloned().collect(),
        })
        .collect()
}

/// Batch cards plus drag-and-drop tracking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KanbanBoard {
    cards: Vec<BatchCard>,
    dragged: Option<BatchId>,
    hovered: Option<BatchStatus>,
}

impl KanbanBoard {
    /// Create a board showing `cards`.
    #[must_use]
    pub const fn new(cards: Vec<BatchCard>) -> Self {
        Self {
            cards,
            dragged: None,
            hovered: None,
        }
    }

    /// All cards in board order.
    #[must_use]
    pub fn cards(&self) -> &[BatchCard] {
        &self.cards
    }

    /// Look up a card.
    #[must_use]
    pub fn card(&self, id: BatchId) -> Option<&BatchCard> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Cards grouped by column.
    #[must_use]
    pub fn columns(&self) -> Vec<KanbanColumn> {
        partition(&self.cards)
    }

    /// Replace the cards after a reload. Drag state is left untouched.
    pub fn replace_cards(&mut self, cards: Vec<BatchCard>) {
        self.cards = cards;
    }

    /// Start dragging a card. Replaces any drag already in progress.
    pub fn begin_drag(&mut self, id: BatchId) {
        if let Some(previous) = self.dragged.replace(id)
            && previous != id
        {
            tracing::debug!(batch_id = %id, previous = %previous, "Replacing in-flight drag");
        }
    }

    /// The card being dragged, if it is still on the board.
    #[must_use]
    pub fn dragged(&self) -> Option<&BatchCard> {
        self.dragged.and_then(|id| self.card(id))
    }

    /// Remember the column under the pointer, for highlighting.
    pub const fn drag_over_column(&mut self, column: BatchStatus) {
        self.hovered = Some(column);
    }

    /// Forget the hovered column.
    pub const fn drag_leave_column(&mut self) {
        self.hovered = None;
    }

    /// Column currently hovered during a drag.
    #[must_use]
    pub const fn hovered_column(&self) -> Option<BatchStatus> {
        self.hovered
    }

    /// End the drag gesture, returning the dragged card's ID.
    ///
    /// Clears both the dragged card and the hovered column.
    pub const fn take_drag(&mut self) -> Option<BatchId> {
        self.hovered = None;
        self.dragged.take()
    }

    pub(crate) const fn cards_mut(&mut self) -> &mut Vec<BatchCard> {
        &mut self.cards
    }

    /// Move a card to another column in a card list.
    pub(crate) fn set_status(cards: &mut [BatchCard], id: BatchId, status: BatchStatus) {
        if let Some(card) = cards.iter_mut().find(|c| c.id == id) {
            card.status = status;
        }
    }
}
