//! Quality certificate forms.
//!
//! A batch has at most one certificate. Opening the form for a batch either
//! loads the stored certificate or builds a new one from the batch and its
//! item. Saving writes the header and replaces every child row.

use chrono::{Datelike, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};

use proativa_core::{BatchId, CertificateId};

use crate::db::{CertificateStore, RepositoryError};
use crate::models::{BatchSource, CertificateFields, Microorganism, PhysicochemicalResult};

/// Brand printed on certificates unless edited.
pub const DEFAULT_BRAND: &str = "Proativa - Soluções Biológicas";

/// Characteristics every certificate reports, in display order.
pub const DEFAULT_CHARACTERISTICS: [&str; 3] = ["Cor", "Estado", "pH"];

const SUPERSCRIPTS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];

/// Replace `^0` through `^9` with superscript digits, e.g. `6,5x10^7` becomes
/// `6,5x10⁷`.
#[must_use]
pub fn format_superscript(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '^'
            && let Some(digit) = chars.peek().and_then(|d| d.to_digit(10))
            && let Some(&sup) = SUPERSCRIPTS.get(digit as usize)
        {
            out.push(sup);
            chars.next();
        } else {
            out.push(c);
        }
    }
    out
}

/// Blank rows for the default characteristics.
#[must_use]
pub fn default_physicochemicals() -> Vec<PhysicochemicalResult> {
    DEFAULT_CHARACTERISTICS
        .iter()
        .map(|c| PhysicochemicalResult {
            characteristic: (*c).to_string(),
            result_value: String::new(),
        })
        .collect()
}

/// Fit stored rows onto the default characteristics.
///
/// For each default, the first stored row with a non-blank value wins, then
/// the first stored row of that characteristic, then a blank row. Stored rows
/// for other characteristics are not shown.
#[must_use]
pub fn map_physicochemicals(stored: &[PhysicochemicalResult]) -> Vec<PhysicochemicalResult> {
    default_physicochemicals()
        .into_iter()
        .map(|default| {
            let matching: Vec<&PhysicochemicalResult> = stored
                .iter()
                .filter(|row| row.characteristic == default.characteristic)
                .collect();
            matching
                .iter()
                .find(|row| !row.result_value.trim().is_empty())
                .or_else(|| matching.first())
                .map_or(default, |row| PhysicochemicalResult::clone(row))
        })
        .collect()
}

/// Generate a certificate number `NNNN/YYYY`.
pub fn generate_certificate_number<R: Rng + ?Sized>(rng: &mut R, year: i32) -> String {
    let serial: u16 = rng.random_range(0..10_000);
    format!("{serial:04}/{year}")
}

/// Certificate editor contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateForm {
    /// Stored certificate, `None` until the first save.
    #[serde(default)]
    pub certificate_id: Option<CertificateId>,
    pub batch_id: BatchId,
    #[serde(flatten)]
    pub fields: CertificateFields,
    #[serde(default)]
    pub microorganisms: Vec<Microorganism>,
    #[serde(default)]
    pub physicochemicals: Vec<PhysicochemicalResult>,
}

impl CertificateForm {
    /// Build a new, unsaved form from a batch and its item.
    #[must_use]
    pub fn from_batch(source: &BatchSource, certificate_number: String, today: NaiveDate) -> Self {
        let (product_name, unit) = source
            .item
            .as_ref()
            .map(|item| (item.product_name.clone(), item.unit.code().to_string()))
            .unwrap_or_default();
        let batch_volume = format!("{} {unit}", source.batch.quantity_produced)
            .trim_end()
            .to_string();

        Self {
            certificate_id: None,
            batch_id: source.batch.id,
            fields: CertificateFields {
                certificate_number,
                emission_date: Some(today),
                product_name,
                brand: DEFAULT_BRAND.to_string(),
                batch_number: source.batch.batch_number.clone(),
                manufacture_date: source.batch.manufacture_date,
                expiration_date: source.batch.expiration_date,
                batch_volume,
                ..CertificateFields::default()
            },
            microorganisms: vec![Microorganism::default()],
            physicochemicals: default_physicochemicals(),
        }
    }

    /// Load the form for a batch: the stored certificate if there is one,
    /// otherwise a new form prefilled from the batch.
    ///
    /// Returns `Ok(None)` when the batch does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if a store read fails.
    pub async fn for_batch<S: CertificateStore>(
        store: &S,
        batch_id: BatchId,
        today: NaiveDate,
    ) -> Result<Option<Self>, RepositoryError> {
        if let Some(certificate) = store.find_certificate_for_batch(batch_id).await? {
            let mut microorganisms = store.list_microorganisms(certificate.id).await?;
            if microorganisms.is_empty() {
                microorganisms.push(Microorganism::default());
            }
            let stored = store.list_physicochemicals(certificate.id).await?;

            let mut fields = certificate.fields;
            if fields.emission_date.is_none() {
                fields.emission_date = Some(today);
            }
            if fields.brand.trim().is_empty() {
                fields.brand = DEFAULT_BRAND.to_string();
            }

            return Ok(Some(Self {
                certificate_id: Some(certificate.id),
                batch_id,
                fields,
                microorganisms,
                physicochemicals: map_physicochemicals(&stored),
            }));
        }

        let Some(source) = store.find_batch_source(batch_id).await? else {
            return Ok(None);
        };
        let number = generate_certificate_number(&mut rand::rng(), today.year());
        Ok(Some(Self::from_batch(&source, number, today)))
    }

    /// Rows that will be stored: blank names and characteristics are dropped.
    fn filled_rows(&self) -> (Vec<Microorganism>, Vec<PhysicochemicalResult>) {
        let microorganisms = self
            .microorganisms
            .iter()
            .filter(|m| !m.name.trim().is_empty())
            .cloned()
            .collect();
        let physicochemicals = self
            .physicochemicals
            .iter()
            .filter(|p| !p.characteristic.trim().is_empty())
            .cloned()
            .collect();
        (microorganisms, physicochemicals)
    }
}

/// Insert or update the certificate header and replace its child rows.
///
/// Returns the certificate ID.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` when updating a certificate that no
/// longer exists, `RepositoryError::Conflict` when inserting a second
/// certificate for the batch, or any other store error.
#[tracing::instrument(skip(store, form), fields(batch_id = %form.batch_id))]
pub async fn save_certificate<S: CertificateStore>(
    store: &S,
    form: &CertificateForm,
) -> Result<CertificateId, RepositoryError> {
    let certificate = match form.certificate_id {
        Some(id) => store.update_certificate(id, &form.fields).await?,
        None => store.insert_certificate(form.batch_id, &form.fields).await?,
    };

    let (microorganisms, physicochemicals) = form.filled_rows();
    store
        .replace_certificate_rows(certificate.id, &microorganisms, &physicochemicals)
        .await?;

    tracing::info!(
        certificate_id = %certificate.id,
        microorganisms = microorganisms.len(),
        physicochemicals = physicochemicals.len(),
        "Certificate saved"
    );
    Ok(certificate.id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use proativa_core::{BatchStatus, Quantity, Unit};

    use super::*;
    use crate::db::{MemoryStore, OrderStore};
    use crate::models::{NewBatch, NewOrder, NewOrderItem};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    fn row(characteristic: &str, value: &str) -> PhysicochemicalResult {
        PhysicochemicalResult {
            characteristic: characteristic.to_string(),
            result_value: value.to_string(),
        }
    }

    async fn seed_batch(store: &MemoryStore) -> BatchId {
        let order = store
            .insert_order(&NewOrder {
                order_number: "1001".to_string(),
                client: "Fazenda X".to_string(),
                status: "pending".to_string(),
            })
            .await
            .unwrap();
        let items = store
            .insert_items(&[NewOrderItem {
                order_id: order.id,
                product_name: "Bioativo A".to_string(),
                quantity_requested: Quantity::from(100),
                unit: Unit::Lt,
            }])
            .await
            .unwrap();
        store
            .insert_batch(&NewBatch {
                order_id: order.id,
                item_id: items[0].id,
                batch_number: "L01".to_string(),
                quantity_produced: Quantity::from(40),
                manufacture_date: Some(today()),
                expiration_date: None,
                status: BatchStatus::Done,
            })
            .await
            .unwrap()
            .id
    }

    #[test]
    fn test_format_superscript() {
        assert_eq!(format_superscript("6,5x10^7 UFC/mL"), "6,5x10⁷ UFC/mL");
        assert_eq!(format_superscript("1x10^1^0"), "1x10¹⁰");
        assert_eq!(format_superscript("a^b ^"), "a^b ^");
        assert_eq!(format_superscript(""), "");
    }

    #[test]
    fn test_certificate_number_format() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let number = generate_certificate_number(&mut rng, 2026);
            let (serial, year) = number.split_once('/').unwrap();
            assert_eq!(serial.len(), 4);
            assert!(serial.chars().all(|c| c.is_ascii_digit()));
            assert_eq!(year, "2026");
        }
    }

    #[test]
    fn test_map_physicochemicals_prefers_filled_rows() {
        let stored = [
            row("Cor", ""),
            row("Cor", "âmbar"),
            row("Estado", ""),
            row("Viscosidade", "alta"),
        ];
        let mapped = map_physicochemicals(&stored);
        assert_eq!(
            mapped,
            vec![row("Cor", "âmbar"), row("Estado", ""), row("pH", "")]
        );
    }

    #[test]
    fn test_map_physicochemicals_without_rows_gives_defaults() {
        assert_eq!(map_physicochemicals(&[]), default_physicochemicals());
    }

    #[tokio::test]
    async fn test_new_form_is_prefilled_from_batch() {
        let store = MemoryStore::new();
        let batch_id = seed_batch(&store).await;

        let form = CertificateForm::for_batch(&store, batch_id, today())
            .await
            .unwrap()
            .unwrap();

        assert!(form.certificate_id.is_none());
        assert!(form.fields.certificate_number.ends_with("/2026"));
        assert_eq!(form.fields.emission_date, Some(today()));
        assert_eq!(form.fields.product_name, "Bioativo A");
        assert_eq!(form.fields.brand, DEFAULT_BRAND);
        assert_eq!(form.fields.batch_number, "L01");
        assert_eq!(form.fields.batch_volume, "40 LT");
        assert_eq!(form.microorganisms, vec![Microorganism::default()]);
        assert_eq!(form.physicochemicals.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_batch() {
        let store = MemoryStore::new();
        let form = CertificateForm::for_batch(&store, BatchId::new(404), today())
            .await
            .unwrap();
        assert!(form.is_none());
    }

    #[tokio::test]
    async fn test_save_then_reload() {
        let store = MemoryStore::new();
        let batch_id = seed_batch(&store).await;
        let mut form = CertificateForm::for_batch(&store, batch_id, today())
            .await
            .unwrap()
            .unwrap();

        form.microorganisms = vec![
            Microorganism {
                name: "Bacillus subtilis".to_string(),
                exponential_value: "1x10^9".to_string(),
            },
            Microorganism::default(),
            Microorganism {
                name: "Azospirillum".to_string(),
                exponential_value: "2x10^8".to_string(),
            },
        ];
        form.physicochemicals[2].result_value = "6.8".to_string();
        form.physicochemicals.push(row("  ", "ignored"));

        let id = save_certificate(&store, &form).await.unwrap();

        let loaded = CertificateForm::for_batch(&store, batch_id, today())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.certificate_id, Some(id));
        assert_eq!(loaded.fields, form.fields);
        assert_eq!(loaded.microorganisms.len(), 2);
        assert_eq!(loaded.microorganisms[0].name, "Azospirillum");
        assert_eq!(loaded.physicochemicals[2], row("pH", "6.8"));

        // Saving again updates in place.
        let mut edited = loaded;
        edited.fields.presentation = "Galão 5L".to_string();
        edited.microorganisms.clear();
        assert_eq!(save_certificate(&store, &edited).await.unwrap(), id);
        let reloaded = CertificateForm::for_batch(&store, batch_id, today())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.fields.presentation, "Galão 5L");
        assert_eq!(reloaded.microorganisms, vec![Microorganism::default()]);
    }
}
