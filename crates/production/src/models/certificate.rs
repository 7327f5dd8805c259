//! Production quality certificate models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use proativa_core::{BatchId, CertificateId};

use super::production::{Batch, OrderItem};

/// A stored quality certificate for one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    /// Unique certificate ID.
    pub id: CertificateId,
    /// Certified batch (one certificate per batch).
    pub batch_id: BatchId,
    /// Header fields.
    #[serde(flatten)]
    pub fields: CertificateFields,
}

/// Editable header fields of a certificate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateFields {
    /// Certificate number, `NNNN/YYYY`.
    #[serde(default)]
    pub certificate_number: String,
    /// Emission date.
    #[serde(default)]
    pub emission_date: Option<NaiveDate>,
    /// Product name.
    #[serde(default)]
    pub product_name: String,
    /// Product code.
    #[serde(default)]
    pub product_code: String,
    /// Brand printed on the certificate.
    #[serde(default)]
    pub brand: String,
    /// Batch/lot label.
    #[serde(default)]
    pub batch_number: String,
    /// Date of manufacture.
    #[serde(default)]
    pub manufacture_date: Option<NaiveDate>,
    /// Expiration date.
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    /// Batch volume, e.g. `"40 LT"`.
    #[serde(default)]
    pub batch_volume: String,
    /// Presentation (packaging).
    #[serde(default)]
    pub presentation: String,
    /// Storage conditions.
    #[serde(default)]
    pub storage_conditions: String,
    /// Product photo URL.
    #[serde(default)]
    pub image_url: String,
}

/// Microorganism concentration row, e.g. `Bacillus subtilis` / `1x10^9`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Microorganism {
    /// Species name.
    pub name: String,
    /// Concentration in exponential notation.
    #[serde(default)]
    pub exponential_value: String,
}

/// Physicochemical analysis row, e.g. `pH` / `6.8`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicochemicalResult {
    /// Characteristic analysed.
    pub characteristic: String,
    /// Measured result.
    #[serde(default)]
    pub result_value: String,
}

/// A batch together with the item it produces, used to prefill a new
/// certificate. The item is absent when the batch's item row is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSource {
    /// The batch.
    pub batch: Batch,
    /// The batch's order item, if it still exists.
    pub item: Option<OrderItem>,
}
