//! Seed the production schema with orders and batches from a YAML file.
//!
//! ```yaml
//! orders:
//!   - order_number: "1001"
//!     client: Fazenda X
//!     items:
//!       - product_name: Bioativo A
//!         quantity: "100"
//!         unit: LT
//!         batches:
//!           - batch_number: L01
//!             quantity: "40"
//!             status: done
//!             manufacture_date: 2026-03-01
//! ```
//!
//! Every order and batch goes through the same validation as the board, so a
//! file with a blank batch number or a non-positive quantity is rejected
//! before anything is written.

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use proativa_core::{BatchStatus, OrderId, OrderItemId, Unit};
use proativa_production::db::{self, OrderStore, PgStore, RepositoryError};
use proativa_production::models::{NewBatch, NewOrder};
use proativa_production::services::{
    BatchDraft, OrderDraft, PendingItem, StagedItem, ValidationError,
};

/// Top-level seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub orders: Vec<SeedOrder>,
}

/// One order in a seed file.
#[derive(Debug, Deserialize)]
pub struct SeedOrder {
    pub order_number: String,
    pub client: String,
    #[serde(default)]
    pub items: Vec<SeedItem>,
}

/// One order item and the batches already produced for it.
#[derive(Debug, Deserialize)]
pub struct SeedItem {
    pub product_name: String,
    pub quantity: String,
    #[serde(default)]
    pub unit: Unit,
    #[serde(default)]
    pub batches: Vec<SeedBatch>,
}

/// One batch in a seed file.
#[derive(Debug, Deserialize)]
pub struct SeedBatch {
    pub batch_number: String,
    pub quantity: String,
    #[serde(default)]
    pub status: BatchStatus,
    #[serde(default)]
    pub manufacture_date: Option<NaiveDate>,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
}

/// Errors raised while seeding.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("order {order_number}: {source}")]
    InvalidOrder {
        order_number: String,
        source: ValidationError,
    },

    #[error("order {order_number}, batch {batch_number}: {source}")]
    InvalidBatch {
        order_number: String,
        batch_number: String,
        source: ValidationError,
    },

    #[error("store error: {0}")]
    Store(#[from] RepositoryError),
}

/// Counts of inserted rows.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub orders: usize,
    pub items: usize,
    pub batches: usize,
}

fn validated_order(order: &SeedOrder) -> Result<(NewOrder, Vec<StagedItem>), SeedError> {
    let invalid = |source| SeedError::InvalidOrder {
        order_number: order.order_number.clone(),
        source,
    };

    let mut draft = OrderDraft {
        order_number: order.order_number.clone(),
        client: order.client.clone(),
        ..OrderDraft::default()
    };
    for item in &order.items {
        draft.pending = PendingItem {
            product_name: item.product_name.clone(),
            quantity: item.quantity.clone(),
            unit: item.unit.clone(),
        };
        draft.add_item().map_err(invalid)?;
    }
    draft.validate().map_err(invalid)
}

fn validated_batch(
    order: &SeedOrder,
    batch: &SeedBatch,
    order_id: OrderId,
    item_id: OrderItemId,
) -> Result<NewBatch, SeedError> {
    let draft = BatchDraft {
        order_id,
        item_id,
        product_name: String::new(),
        unit: Unit::default(),
        batch_number: batch.batch_number.clone(),
        quantity: batch.quantity.clone(),
        manufacture_date: batch.manufacture_date,
        expiration_date: batch.expiration_date,
    };
    let mut new_batch = draft.validate().map_err(|source| SeedError::InvalidBatch {
        order_number: order.order_number.clone(),
        batch_number: batch.batch_number.clone(),
        source,
    })?;
    new_batch.status = batch.status;
    Ok(new_batch)
}

/// Check every order and batch without touching the store.
///
/// # Errors
///
/// Returns the first invalid order or batch.
pub fn validate(file: &SeedFile) -> Result<(), SeedError> {
    for order in &file.orders {
        validated_order(order)?;
        for batch in order.items.iter().flat_map(|i| &i.batches) {
            validated_batch(order, batch, OrderId::new(0), OrderItemId::new(0))?;
        }
    }
    Ok(())
}

/// Insert every order, item and batch of a seed file.
///
/// The whole file is validated first; nothing is written if any row is
/// invalid.
///
/// # Errors
///
/// Returns `SeedError` on invalid input or the first failing store call.
/// Rows inserted before a store failure are kept.
pub async fn seed_store<S: OrderStore>(
    store: &S,
    file: &SeedFile,
) -> Result<SeedSummary, SeedError> {
    validate(file)?;
    let mut summary = SeedSummary::default();

    for seed_order in &file.orders {
        let (new_order, staged) = validated_order(seed_order)?;
        let order = store.insert_order(&new_order).await?;
        let new_items: Vec<_> = staged
            .into_iter()
            .map(|item| item.into_new_item(order.id))
            .collect();
        let items = store.insert_items(&new_items).await?;
        summary.orders += 1;
        summary.items += items.len();

        for (item, seed_item) in items.iter().zip(&seed_order.items) {
            for seed_batch in &seed_item.batches {
                let new_batch = validated_batch(seed_order, seed_batch, order.id, item.id)?;
                store.insert_batch(&new_batch).await?;
                summary.batches += 1;
            }
        }
        info!(order_id = %order.id, order_number = %order.order_number, "Seeded order");
    }

    Ok(summary)
}

/// Seed orders and batches from a YAML file.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the file cannot be read
/// or parsed, validation fails, or a database write fails.
pub async fn production(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading seed file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let file: SeedFile = serde_yaml::from_str(&content)?;
    validate(&file)?;
    info!(orders = file.orders.len(), "Seed file validated");

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let summary = seed_store(&PgStore::new(pool), &file).await?;

    info!("Seeding complete!");
    info!("  Orders inserted: {}", summary.orders);
    info!("  Items inserted: {}", summary.items);
    info!("  Batches inserted: {}", summary.batches);
    Ok(())
}
