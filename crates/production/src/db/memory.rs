//! In-memory implementation of the production stores.
//!
//! Used by tests and local demos. It performs no foreign key checks, so
//! dangling references can be inserted on purpose, and it can be told to fail
//! reads or writes to exercise rollback paths.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use proativa_core::{BatchId, BatchStatus, CertificateId, OrderId, OrderItemId};

use super::RepositoryError;
use super::store::{CertificateStore, OrderStore};
use crate::models::{
    Batch, BatchSource, Certificate, CertificateFields, Microorganism, NewBatch, NewOrder,
    NewOrderItem, Order, OrderItem, PhysicochemicalResult,
};

#[derive(Debug, Default)]
struct Tables {
    orders: Vec<Order>,
    items: Vec<OrderItem>,
    batches: Vec<Batch>,
    certificates: Vec<Certificate>,
    microorganisms: Vec<(CertificateId, Microorganism)>,
    physicochemicals: Vec<(CertificateId, PhysicochemicalResult)>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
struct Inner {
    tables: Mutex<Tables>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    status_updates: AtomicUsize,
    writes: AtomicUsize,
}

/// Store that keeps every table in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent read fail with `RepositoryError::Unavailable`.
    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write fail with `RepositoryError::Unavailable`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of `update_batch_status` calls received, including failed ones.
    #[must_use]
    pub fn status_update_calls(&self) -> usize {
        self.inner.status_updates.load(Ordering::SeqCst)
    }

    /// Number of write calls received, including failed ones.
    #[must_use]
    pub fn write_calls(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    fn check_read(&self) -> Result<(), RepositoryError> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("reads disabled".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), RepositoryError> {
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

impl OrderStore for MemoryStore {
    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        self.check_read()?;
        let tables = self.inner.tables.lock().await;
        Ok(tables.orders.iter().rev().cloned().collect())
    }

    async fn list_items(&self) -> Result<Vec<OrderItem>, RepositoryError> {
        self.check_read()?;
        Ok(self.inner.tables.lock().await.items.clone())
    }

    async fn list_batches(&self) -> Result<Vec<Batch>, RepositoryError> {
        self.check_read()?;
        let tables = self.inner.tables.lock().await;
        Ok(tables.batches.iter().rev().cloned().collect())
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        self.check_write()?;
        let mut tables = self.inner.tables.lock().await;
        let order = Order {
            id: OrderId::new(tables.next_id()),
            order_number: order.order_number.clone(),
            client: order.client.clone(),
            status: order.status.clone(),
            created_at: Utc::now(),
        };
        tables.orders.push(order.clone());
        Ok(order)
    }

    async fn insert_items(
        &self,
        items: &[NewOrderItem],
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        self.check_write()?;
        let mut tables = self.inner.tables.lock().await;
        let mut inserted = Vec::with_capacity(items.len());
        for item in items {
            let item = OrderItem {
                id: OrderItemId::new(tables.next_id()),
                order_id: item.order_id,
                product_name: item.product_name.clone(),
                quantity_requested: item.quantity_requested,
                unit: item.unit.clone(),
            };
            tables.items.push(item.clone());
            inserted.push(item);
        }
        Ok(inserted)
    }

    async fn insert_batch(&self, batch: &NewBatch) -> Result<Batch, RepositoryError> {
        self.check_write()?;
        let mut tables = self.inner.tables.lock().await;
        let now = Utc::now();
        let batch = Batch {
            id: BatchId::new(tables.next_id()),
            order_id: batch.order_id,
            item_id: batch.item_id,
            batch_number: batch.batch_number.clone(),
            quantity_produced: batch.quantity_produced,
            manufacture_date: batch.manufacture_date,
            expiration_date: batch.expiration_date,
            status: batch.status,
            created_at: now,
            updated_at: now,
        };
        tables.batches.push(batch.clone());
        Ok(batch)
    }

    async fn update_batch_status(
        &self,
        id: BatchId,
        status: BatchStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.inner.status_updates.fetch_add(1, Ordering::SeqCst);
        self.check_write()?;
        let mut tables = self.inner.tables.lock().await;
        let batch = tables
            .batches
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(RepositoryError::NotFound)?;
        batch.status = status;
        batch.updated_at = updated_at;
        Ok(())
    }

    async fn delete_batches_for_order(&self, order_id: OrderId) -> Result<u64, RepositoryError> {
        self.check_write()?;
        let mut tables = self.inner.tables.lock().await;
        let before = tables.batches.len();
        tables.batches.retain(|b| b.order_id != order_id);
        Ok((before - tables.batches.len()) as u64)
    }

    async fn delete_items_for_order(&self, order_id: OrderId) -> Result<u64, RepositoryError> {
        self.check_write()?;
        let mut tables = self.inner.tables.lock().await;
        let before = tables.items.len();
        tables.items.retain(|i| i.order_id != order_id);
        Ok((before - tables.items.len()) as u64)
    }

    async fn delete_order(&self, order_id: OrderId) -> Result<bool, RepositoryError> {
        self.check_write()?;
        let mut tables = self.inner.tables.lock().await;
        let before = tables.orders.len();
        tables.orders.retain(|o| o.id != order_id);
        Ok(tables.orders.len() < before)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check_read()
    }
}

impl CertificateStore for MemoryStore {
    async fn find_batch_source(
        &self,
        batch_id: BatchId,
    ) -> Result<Option<BatchSource>, RepositoryError> {
        self.check_read()?;
        let tables = self.inner.tables.lock().await;
        Ok(tables
            .batches
            .iter()
            .find(|b| b.id == batch_id)
            .map(|batch| BatchSource {
                batch: batch.clone(),
                item: tables.items.iter().find(|i| i.id == batch.item_id).cloned(),
            }))
    }

    async fn find_certificate_for_batch(
        &self,
        batch_id: BatchId,
    ) -> Result<Option<Certificate>, RepositoryError> {
        self.check_read()?;
        let tables = self.inner.tables.lock().await;
        Ok(tables
            .certificates
            .iter()
            .find(|c| c.batch_id == batch_id)
            .cloned())
    }

    async fn list_microorganisms(
        &self,
        id: CertificateId,
    ) -> Result<Vec<Microorganism>, RepositoryError> {
        self.check_read()?;
        let tables = self.inner.tables.lock().await;
        let mut rows: Vec<Microorganism> = tables
            .microorganisms
            .iter()
            .filter(|(owner, _)| *owner == id)
            .map(|(_, row)| row.clone())
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn list_physicochemicals(
        &self,
        id: CertificateId,
    ) -> Result<Vec<PhysicochemicalResult>, RepositoryError> {
        self.check_read()?;
        let tables = self.inner.tables.lock().await;
        let mut rows: Vec<PhysicochemicalResult> = tables
            .physicochemicals
            .iter()
            .filter(|(owner, _)| *owner == id)
            .map(|(_, row)| row.clone())
            .collect();
        rows.sort_by(|a, b| a.characteristic.cmp(&b.characteristic));
        Ok(rows)
    }

    async fn insert_certificate(
        &self,
        batch_id: BatchId,
        fields: &CertificateFields,
    ) -> Result<Certificate, RepositoryError> {
        self.check_write()?;
        let mut tables = self.inner.tables.lock().await;
        if tables.certificates.iter().any(|c| c.batch_id == batch_id) {
            return Err(RepositoryError::Conflict(
                "a certificate already exists for this batch".to_string(),
            ));
        }
        let certificate = Certificate {
            id: CertificateId::new(tables.next_id()),
            batch_id,
            fields: fields.clone(),
        };
        tables.certificates.push(certificate.clone());
        Ok(certificate)
    }

    async fn update_certificate(
        &self,
        id: CertificateId,
        fields: &CertificateFields,
    ) -> Result<Certificate, RepositoryError> {
        self.check_write()?;
        let mut tables = self.inner.tables.lock().await;
        let certificate = tables
            .certificates
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepositoryError::NotFound)?;
        certificate.fields = fields.clone();
        Ok(certificate.clone())
    }

    async fn replace_certificate_rows(
        &self,
        id: CertificateId,
        microorganisms: &[Microorganism],
        physicochemicals: &[PhysicochemicalResult],
    ) -> Result<(), RepositoryError> {
        self.check_write()?;
        let mut tables = self.inner.tables.lock().await;
        tables.microorganisms.retain(|(owner, _)| *owner != id);
        tables.physicochemicals.retain(|(owner, _)| *owner != id);
        tables
            .microorganisms
            .extend(microorganisms.iter().map(|row| (id, row.clone())));
        tables
            .physicochemicals
            .extend(physicochemicals.iter().map(|row| (id, row.clone())));
        Ok(())
    }
}
