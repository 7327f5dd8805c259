//! `PostgreSQL` implementation of the production stores.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use proativa_core::{
    BatchId, BatchStatus, CertificateId, OrderId, OrderItemId, Quantity, Unit,
};

use super::RepositoryError;
use super::store::{CertificateStore, OrderStore};
use crate::models::{
    Batch, BatchSource, Certificate, CertificateFields, Microorganism, NewBatch, NewOrder,
    NewOrderItem, Order, OrderItem, PhysicochemicalResult,
};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_number: String,
    client: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            order_number: row.order_number,
            client: row.client,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_name: String,
    quantity_requested: Decimal,
    unit: String,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: OrderItemId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_name: row.product_name,
            quantity_requested: Quantity::new(row.quantity_requested),
            unit: Unit::from(row.unit),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BatchRow {
    id: i32,
    order_id: i32,
    item_id: i32,
    batch_number: String,
    quantity_produced: Decimal,
    manufacture_date: Option<NaiveDate>,
    expiration_date: Option<NaiveDate>,
    status: BatchStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BatchRow> for Batch {
    fn from(row: BatchRow) -> Self {
        Self {
            id: BatchId::new(row.id),
            order_id: OrderId::new(row.order_id),
            item_id: OrderItemId::new(row.item_id),
            batch_number: row.batch_number,
            quantity_produced: Quantity::new(row.quantity_produced),
            manufacture_date: row.manufacture_date,
            expiration_date: row.expiration_date,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CertificateRow {
    id: i32,
    batch_id: i32,
    certificate_number: String,
    emission_date: Option<NaiveDate>,
    product_name: String,
    product_code: String,
    brand: String,
    batch_number: String,
    manufacture_date: Option<NaiveDate>,
    expiration_date: Option<NaiveDate>,
    batch_volume: String,
    presentation: String,
    storage_conditions: String,
    image_url: String,
}

impl From<CertificateRow> for Certificate {
    fn from(row: CertificateRow) -> Self {
        Self {
            id: CertificateId::new(row.id),
            batch_id: BatchId::new(row.batch_id),
            fields: CertificateFields {
                certificate_number: row.certificate_number,
                emission_date: row.emission_date,
                product_name: row.product_name,
                product_code: row.product_code,
                brand: row.brand,
                batch_number: row.batch_number,
                manufacture_date: row.manufacture_date,
                expiration_date: row.expiration_date,
                batch_volume: row.batch_volume,
                presentation: row.presentation,
                storage_conditions: row.storage_conditions,
                image_url: row.image_url,
            },
        }
    }
}

const BATCH_COLUMNS: &str = "id, order_id, item_id, batch_number, quantity_produced, \
     manufacture_date, expiration_date, status, created_at, updated_at";

const CERTIFICATE_COLUMNS: &str = "id, batch_id, certificate_number, emission_date, \
     product_name, product_code, brand, batch_number, manufacture_date, expiration_date, \
     batch_volume, presentation, storage_conditions, image_url";

// =============================================================================
// Store
// =============================================================================

/// Store backed by the `production` schema.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl OrderStore for PgStore {
    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, order_number, client, status, created_at
            FROM production.orders
            ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_items(&self) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT id, order_id, product_name, quantity_requested, unit
            FROM production.order_items
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_batches(&self) -> Result<Vec<Batch>, RepositoryError> {
        let rows = sqlx::query_as::<_, BatchRow>(&format!(
            "SELECT {BATCH_COLUMNS} FROM production.batches ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO production.orders (order_number, client, status)
            VALUES ($1, $2, $3)
            RETURNING id, order_number, client, status, created_at
            ",
        )
        .bind(&order.order_number)
        .bind(&order.client)
        .bind(&order.status)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn insert_items(
        &self,
        items: &[NewOrderItem],
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(items.len());

        for item in items {
            let row = sqlx::query_as::<_, OrderItemRow>(
                r"
                INSERT INTO production.order_items
                    (order_id, product_name, quantity_requested, unit)
                VALUES ($1, $2, $3, $4)
                RETURNING id, order_id, product_name, quantity_requested, unit
                ",
            )
            .bind(item.order_id)
            .bind(&item.product_name)
            .bind(item.quantity_requested.amount())
            .bind(item.unit.code())
            .fetch_one(&mut *tx)
            .await?;
            inserted.push(row.into());
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn insert_batch(&self, batch: &NewBatch) -> Result<Batch, RepositoryError> {
        let row = sqlx::query_as::<_, BatchRow>(&format!(
            r"
            INSERT INTO production.batches (
                order_id, item_id, batch_number, quantity_produced,
                manufacture_date, expiration_date, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {BATCH_COLUMNS}
            "
        ))
        .bind(batch.order_id)
        .bind(batch.item_id)
        .bind(&batch.batch_number)
        .bind(batch.quantity_produced.amount())
        .bind(batch.manufacture_date)
        .bind(batch.expiration_date)
        .bind(batch.status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::Conflict(
                    "batch references a missing order or item".to_string(),
                );
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    async fn update_batch_status(
        &self,
        id: BatchId,
        status: BatchStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE production.batches
            SET status = $2, updated_at = $3
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(status)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete_batches_for_order(&self, order_id: OrderId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM production.batches WHERE order_id = $1")
            .bind(order_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_items_for_order(&self, order_id: OrderId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM production.order_items WHERE order_id = $1")
            .bind(order_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_order(&self, order_id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM production.orders WHERE id = $1")
            .bind(order_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

impl CertificateStore for PgStore {
    async fn find_batch_source(
        &self,
        batch_id: BatchId,
    ) -> Result<Option<BatchSource>, RepositoryError> {
        let Some(batch) = sqlx::query_as::<_, BatchRow>(&format!(
            "SELECT {BATCH_COLUMNS} FROM production.batches WHERE id = $1"
        ))
        .bind(batch_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let item = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT id, order_id, product_name, quantity_requested, unit
            FROM production.order_items
            WHERE id = $1
            ",
        )
        .bind(batch.item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(Some(BatchSource {
            batch: batch.into(),
            item: item.map(Into::into),
        }))
    }

    async fn find_certificate_for_batch(
        &self,
        batch_id: BatchId,
    ) -> Result<Option<Certificate>, RepositoryError> {
        let row = sqlx::query_as::<_, CertificateRow>(&format!(
            "SELECT {CERTIFICATE_COLUMNS} FROM production.certificates WHERE batch_id = $1"
        ))
        .bind(batch_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_microorganisms(
        &self,
        id: CertificateId,
    ) -> Result<Vec<Microorganism>, RepositoryError> {
        let rows = sqlx::query_as::<_, (String, String)>(
            r"
            SELECT name, exponential_value
            FROM production.certificate_microorganisms
            WHERE certificate_id = $1
            ORDER BY name, id
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, exponential_value)| Microorganism {
                name,
                exponential_value,
            })
            .collect())
    }

    async fn list_physicochemicals(
        &self,
        id: CertificateId,
    ) -> Result<Vec<PhysicochemicalResult>, RepositoryError> {
        let rows = sqlx::query_as::<_, (String, String)>(
            r"
            SELECT characteristic, result_value
            FROM production.certificate_physicochemicals
            WHERE certificate_id = $1
            ORDER BY characteristic, id
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(characteristic, result_value)| PhysicochemicalResult {
                characteristic,
                result_value,
            })
            .collect())
    }

    async fn insert_certificate(
        &self,
        batch_id: BatchId,
        fields: &CertificateFields,
    ) -> Result<Certificate, RepositoryError> {
        let row = sqlx::query_as::<_, CertificateRow>(&format!(
            r"
            INSERT INTO production.certificates (
                batch_id, certificate_number, emission_date, product_name, product_code,
                brand, batch_number, manufacture_date, expiration_date, batch_volume,
                presentation, storage_conditions, image_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {CERTIFICATE_COLUMNS}
            "
        ))
        .bind(batch_id)
        .bind(&fields.certificate_number)
        .bind(fields.emission_date)
        .bind(&fields.product_name)
        .bind(&fields.product_code)
        .bind(&fields.brand)
        .bind(&fields.batch_number)
        .bind(fields.manufacture_date)
        .bind(fields.expiration_date)
        .bind(&fields.batch_volume)
        .bind(&fields.presentation)
        .bind(&fields.storage_conditions)
        .bind(&fields.image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("uq_certificates_batch_id")
            {
                return RepositoryError::Conflict(
                    "a certificate already exists for this batch".to_string(),
                );
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    async fn update_certificate(
        &self,
        id: CertificateId,
        fields: &CertificateFields,
    ) -> Result<Certificate, RepositoryError> {
        let row = sqlx::query_as::<_, CertificateRow>(&format!(
            r"
            UPDATE production.certificates
            SET
                certificate_number = $2,
                emission_date = $3,
                product_name = $4,
                product_code = $5,
                brand = $6,
                batch_number = $7,
                manufacture_date = $8,
                expiration_date = $9,
                batch_volume = $10,
                presentation = $11,
                storage_conditions = $12,
                image_url = $13
            WHERE id = $1
            RETURNING {CERTIFICATE_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&fields.certificate_number)
        .bind(fields.emission_date)
        .bind(&fields.product_name)
        .bind(&fields.product_code)
        .bind(&fields.brand)
        .bind(&fields.batch_number)
        .bind(fields.manufacture_date)
        .bind(fields.expiration_date)
        .bind(&fields.batch_volume)
        .bind(&fields.presentation)
        .bind(&fields.storage_conditions)
        .bind(&fields.image_url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    async fn replace_certificate_rows(
        &self,
        id: CertificateId,
        microorganisms: &[Microorganism],
        physicochemicals: &[PhysicochemicalResult],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM production.certificate_microorganisms WHERE certificate_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM production.certificate_physicochemicals WHERE certificate_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for micro in microorganisms {
            sqlx::query(
                r"
                INSERT INTO production.certificate_microorganisms
                    (certificate_id, name, exponential_value)
                VALUES ($1, $2, $3)
                ",
            )
            .bind(id)
            .bind(&micro.name)
            .bind(&micro.exponential_value)
            .execute(&mut *tx)
            .await?;
        }

        for result in physicochemicals {
            sqlx::query(
                r"
                INSERT INTO production.certificate_physicochemicals
                    (certificate_id, characteristic, result_value)
                VALUES ($1, $2, $3)
                ",
            )
            .bind(id)
            .bind(&result.characteristic)
            .bind(&result.result_value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
