//! Production board logic.
//!
//! - [`reconcile`] joins the flat store lists into order and batch views.
//! - [`kanban`] holds batch cards and drag state.
//! - [`optimistic`] applies local changes that are rolled back on failure.
//! - [`board`] ties the above to a store.
//! - [`drafts`] validates new batches and orders.
//! - [`certificate`] loads and saves quality certificates.

pub mod board;
pub mod certificate;
pub mod drafts;
pub mod kanban;
pub mod optimistic;
pub mod reconcile;

pub use board::{BoardError, BoardSnapshot, DropOutcome, ProductionBoard};
pub use certificate::{CertificateForm, format_superscript, save_certificate};
pub use drafts::{BatchDraft, OrderDraft, PendingItem, StagedItem, ValidationError};
pub use kanban::{KanbanBoard, KanbanColumn};
pub use optimistic::OptimisticAction;
pub use reconcile::{BatchCard, ItemView, OrderView, Reconciliation, reconcile};
