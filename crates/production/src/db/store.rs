//! Store traits the production board and HTTP handlers are written against.
//!
//! Reads are three independent flat lists, never a joined query. Writes are
//! single-row-type calls with no transaction spanning several row types: an
//! order insert followed by a failing item insert leaves an order without
//! items.

use std::future::Future;

use chrono::{DateTime, Utc};

use proativa_core::{BatchId, BatchStatus, CertificateId, OrderId};

use super::RepositoryError;
use crate::models::{
    Batch, BatchSource, Certificate, CertificateFields, Microorganism, NewBatch, NewOrder,
    NewOrderItem, Order, OrderItem, PhysicochemicalResult,
};

/// Orders, order items and batches.
pub trait OrderStore: Send + Sync {
    /// List all orders, newest first.
    fn list_orders(&self) -> impl Future<Output = Result<Vec<Order>, RepositoryError>> + Send;

    /// List all order items.
    fn list_items(&self) -> impl Future<Output = Result<Vec<OrderItem>, RepositoryError>> + Send;

    /// List all batches, newest first.
    fn list_batches(&self) -> impl Future<Output = Result<Vec<Batch>, RepositoryError>> + Send;

    /// Insert an order header.
    fn insert_order(
        &self,
        order: &NewOrder,
    ) -> impl Future<Output = Result<Order, RepositoryError>> + Send;

    /// Insert order items in one call.
    fn insert_items(
        &self,
        items: &[NewOrderItem],
    ) -> impl Future<Output = Result<Vec<OrderItem>, RepositoryError>> + Send;

    /// Insert a batch.
    fn insert_batch(
        &self,
        batch: &NewBatch,
    ) -> impl Future<Output = Result<Batch, RepositoryError>> + Send;

    /// Set a batch's status and its last-updated timestamp.
    ///
    /// Fails with `RepositoryError::NotFound` when the batch does not exist.
    fn update_batch_status(
        &self,
        id: BatchId,
        status: BatchStatus,
        updated_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete every batch recorded against an order. Returns the number deleted.
    fn delete_batches_for_order(
        &self,
        order_id: OrderId,
    ) -> impl Future<Output = Result<u64, RepositoryError>> + Send;

    /// Delete every item of an order. Returns the number deleted.
    fn delete_items_for_order(
        &self,
        order_id: OrderId,
    ) -> impl Future<Output = Result<u64, RepositoryError>> + Send;

    /// Delete an order header. Returns `false` if it did not exist.
    fn delete_order(
        &self,
        order_id: OrderId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Check that the store is reachable.
    fn ping(&self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Production quality certificates.
pub trait CertificateStore: Send + Sync {
    /// Load a batch and its item for prefilling a new certificate.
    fn find_batch_source(
        &self,
        batch_id: BatchId,
    ) -> impl Future<Output = Result<Option<BatchSource>, RepositoryError>> + Send;

    /// Find the certificate issued for a batch, if any.
    fn find_certificate_for_batch(
        &self,
        batch_id: BatchId,
    ) -> impl Future<Output = Result<Option<Certificate>, RepositoryError>> + Send;

    /// List a certificate's microorganism rows ordered by name.
    fn list_microorganisms(
        &self,
        id: CertificateId,
    ) -> impl Future<Output = Result<Vec<Microorganism>, RepositoryError>> + Send;

    /// List a certificate's physicochemical rows ordered by characteristic.
    fn list_physicochemicals(
        &self,
        id: CertificateId,
    ) -> impl Future<Output = Result<Vec<PhysicochemicalResult>, RepositoryError>> + Send;

    /// Insert a certificate header for a batch.
    ///
    /// Fails with `RepositoryError::Conflict` if the batch already has one.
    fn insert_certificate(
        &self,
        batch_id: BatchId,
        fields: &CertificateFields,
    ) -> impl Future<Output = Result<Certificate, RepositoryError>> + Send;

    /// Overwrite a certificate header.
    fn update_certificate(
        &self,
        id: CertificateId,
        fields: &CertificateFields,
    ) -> impl Future<Output = Result<Certificate, RepositoryError>> + Send;

    /// Replace all child rows of a certificate.
    fn replace_certificate_rows(
        &self,
        id: CertificateId,
        microorganisms: &[Microorganism],
        physicochemicals: &[PhysicochemicalResult],
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Everything the HTTP layer needs from a store.
pub trait ProductionStore: OrderStore + CertificateStore + Clone + 'static {}

impl<T> ProductionStore for T where T: OrderStore + CertificateStore + Clone + 'static {}
