//! Integration tests for the production board.
//!
//! These drive `ProductionBoard` against `MemoryStore` through whole
//! sessions: load, drag and drop, record batches, reload.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use proativa_core::{BatchStatus, OrderId, OrderItemId, Quantity, Unit};
use proativa_integration_tests::{seed_batch, seed_order};
use proativa_production::db::{MemoryStore, OrderStore};
use proativa_production::services::{DropOutcome, ProductionBoard, reconcile};

// =============================================================================
// Reconciliation
// =============================================================================

#[tokio::test]
async fn test_order_1001_scenario() {
    let store = MemoryStore::new();
    let (order_id, items) =
        seed_order(&store, "1001", "Fazenda X", &[("Bioativo A", 100, Unit::Lt)])
            .await
            .unwrap();
    let item_id = items[0];
    seed_batch(&store, order_id, item_id, "L01", 40, BatchStatus::Done)
        .await
        .unwrap();
    let l02 = seed_batch(&store, order_id, item_id, "L02", 30, BatchStatus::InProgress)
        .await
        .unwrap();

    let mut board = ProductionBoard::new(store.clone());
    board.load().await.unwrap();

    let item = board.orders()[0].item(item_id).unwrap();
    assert_eq!(item.produced_total, Quantity::from(70));
    assert_eq!(item.produced_completed, Quantity::from(40));
    assert_eq!(item.remaining, Quantity::from(60));
    assert!(!item.is_complete);

    // Move L02 to done: crossing into done reloads the order views.
    board.begin_drag(l02);
    board.drag_over_column(BatchStatus::Done);
    let outcome = board.drop_on(BatchStatus::Done).await;
    assert!(matches!(outcome, DropOutcome::Moved { reloaded: true, .. }));

    let item = board.orders()[0].item(item_id).unwrap();
    assert_eq!(item.produced_completed, Quantity::from(70));
    assert_eq!(item.remaining, Quantity::from(30));
    assert!(board.kanban().dragged().is_none());
    assert!(board.kanban().hovered_column().is_none());

    // Record L03 50 and finish it: over-production is reported as is.
    let mut draft = board.open_batch_draft(item_id).unwrap();
    assert_eq!(draft.quantity, "30");
    draft.batch_number = "L03".to_string();
    draft.quantity = "50".to_string();
    let l03 = board.commit_batch_draft(&draft).await.unwrap().id;

    board.begin_drag(l03);
    board.drop_on(BatchStatus::Done).await;
    let item = board.orders()[0].item(item_id).unwrap();
    assert_eq!(item.produced_completed, Quantity::from(120));
    assert_eq!(item.remaining, Quantity::from(-20));
    assert!(item.is_complete);
    assert!(board.orders()[0].is_complete);
    assert!(board.open_batch_draft(item_id).unwrap().quantity.is_empty());

    // Moving a batch out of done flips completeness back.
    board.begin_drag(l02);
    let outcome = board.drop_on(BatchStatus::Todo).await;
    assert!(matches!(outcome, DropOutcome::Moved { reloaded: true, .. }));
    let item = board.orders()[0].item(item_id).unwrap();
    assert_eq!(item.produced_completed, Quantity::from(90));
    assert_eq!(item.remaining, Quantity::from(10));
    assert!(!item.is_complete);
}

#[tokio::test]
async fn test_over_production_is_not_clamped() {
    let store = MemoryStore::new();
    let (order_id, items) =
        seed_order(&store, "2001", "Sítio Y", &[("Bioativo B", 50, Unit::Kg)])
            .await
            .unwrap();
    seed_batch(&store, order_id, items[0], "L10", 80, BatchStatus::Done)
        .await
        .unwrap();

    let mut board = ProductionBoard::new(store);
    board.load().await.unwrap();

    let order = &board.orders()[0];
    let item = order.item(items[0]).unwrap();
    assert_eq!(item.remaining, Quantity::from(-30));
    assert!(item.is_complete);
    assert!(order.is_complete);
}

#[tokio::test]
async fn test_dangling_references_resolve_to_placeholders() {
    let store = MemoryStore::new();
    // Batch pointing at an item and an order that were never inserted.
    seed_batch(
        &store,
        OrderId::new(9000),
        OrderItemId::new(9001),
        "ORFAO",
        5,
        BatchStatus::Todo,
    )
    .await
    .unwrap();

    let mut board = ProductionBoard::new(store.clone());
    board.load().await.unwrap();

    let cards = board.kanban().cards();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].product_name, "Desconhecido");
    assert_eq!(cards[0].order_number, "?");

    let result = reconcile(
        &store.list_orders().await.unwrap(),
        &store.list_items().await.unwrap(),
        &store.list_batches().await.unwrap(),
    );
    assert_eq!(result.batches.len(), 1);
    assert!(result.orders.is_empty());
}

// =============================================================================
// Drag and drop
// =============================================================================

#[tokio::test]
async fn test_drop_on_same_column_is_idempotent() {
    let store = MemoryStore::new();
    let (order_id, items) = seed_order(&store, "1", "A", &[("P", 10, Unit::Un)])
        .await
        .unwrap();
    let id = seed_batch(&store, order_id, items[0], "L1", 5, BatchStatus::InProgress)
        .await
        .unwrap();

    let mut board = ProductionBoard::new(store.clone());
    board.load().await.unwrap();
    let before = board.snapshot();

    for _ in 0..3 {
        board.begin_drag(id);
        assert!(matches!(
            board.drop_on(BatchStatus::InProgress).await,
            DropOutcome::SameColumn
        ));
    }

    assert_eq!(store.status_update_calls(), 0);
    assert_eq!(
        serde_json::to_value(board.snapshot()).unwrap(),
        serde_json::to_value(before).unwrap()
    );
}

#[tokio::test]
async fn test_failed_drop_restores_every_card() {
    let store = MemoryStore::new();
    let (order_id, items) = seed_order(&store, "1", "A", &[("P", 10, Unit::Un)])
        .await
        .unwrap();
    let first = seed_batch(&store, order_id, items[0], "L1", 5, BatchStatus::Todo)
        .await
        .unwrap();
    seed_batch(&store, order_id, items[0], "L2", 5, BatchStatus::Done)
        .await
        .unwrap();

    let mut board = ProductionBoard::new(store.clone());
    board.load().await.unwrap();
    let cards_before = board.kanban().cards().to_vec();

    store.set_fail_writes(true);
    board.begin_drag(first);
    let outcome = board.drop_on(BatchStatus::Done).await;

    assert!(matches!(outcome, DropOutcome::Reverted { id, .. } if id == first));
    assert_eq!(board.kanban().cards(), cards_before.as_slice());
    assert!(board.notice().unwrap().starts_with("Erro ao atualizar status"));
    assert_eq!(store.status_update_calls(), 1);

    // The store is unchanged too.
    let stored = store.list_batches().await.unwrap();
    assert!(
        stored
            .iter()
            .any(|b| b.id == first && b.status == BatchStatus::Todo)
    );
}

#[tokio::test]
async fn test_drop_without_drag_does_nothing() {
    let store = MemoryStore::new();
    let mut board = ProductionBoard::new(store.clone());
    board.load().await.unwrap();

    assert!(matches!(
        board.drop_on(BatchStatus::Done).await,
        DropOutcome::NoDrag
    ));
    assert_eq!(store.write_calls(), 0);
}

// =============================================================================
// Orders and batches
// =============================================================================

#[tokio::test]
async fn test_recorded_batch_starts_in_todo() {
    let store = MemoryStore::new();
    let (_, items) = seed_order(&store, "1", "A", &[("P", 10, Unit::Lt)])
        .await
        .unwrap();

    let mut board = ProductionBoard::new(store);
    board.load().await.unwrap();

    let mut draft = board.open_batch_draft(items[0]).unwrap();
    assert_eq!(draft.quantity, "10");
    draft.batch_number = "  L07 ".to_string();
    draft.quantity = "2,5".to_string();

    let batch = board.commit_batch_draft(&draft).await.unwrap();
    assert_eq!(batch.status, BatchStatus::Todo);
    assert_eq!(batch.batch_number, "L07");

    let columns = board.kanban().columns();
    assert_eq!(columns[0].cards.len(), 1);
    let item = board.orders()[0].item(items[0]).unwrap();
    assert_eq!(item.produced_total, Quantity::parse("2.5").unwrap());
    assert_eq!(item.produced_completed, Quantity::from(0));
}

#[tokio::test]
async fn test_delete_order_removes_its_batches() {
    let store = MemoryStore::new();
    let (keep, keep_items) = seed_order(&store, "1", "A", &[("P", 10, Unit::Lt)])
        .await
        .unwrap();
    let (gone, gone_items) = seed_order(&store, "2", "B", &[("Q", 10, Unit::Lt)])
        .await
        .unwrap();
    seed_batch(&store, keep, keep_items[0], "K1", 1, BatchStatus::Todo)
        .await
        .unwrap();
    seed_batch(&store, gone, gone_items[0], "G1", 1, BatchStatus::Done)
        .await
        .unwrap();

    let mut board = ProductionBoard::new(store.clone());
    assert!(board.delete_order(gone).await.unwrap());

    assert_eq!(board.orders().len(), 1);
    assert_eq!(board.orders()[0].id, keep);
    assert_eq!(board.kanban().cards().len(), 1);
    assert_eq!(store.list_items().await.unwrap().len(), 1);
}
