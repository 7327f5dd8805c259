//! Certificate API.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde::Serialize;

use proativa_core::{BatchId, CertificateId};

use crate::db::ProductionStore;
use crate::error::{AppError, Result};
use crate::models::Microorganism;
use crate::services::{CertificateForm, format_superscript, save_certificate};
use crate::state::AppState;

/// Certificate form plus display-ready microorganism rows.
#[derive(Debug, Serialize)]
pub struct CertificateResponse {
    #[serde(flatten)]
    pub form: CertificateForm,
    /// Microorganisms with `^N` exponents rendered as superscripts.
    pub microorganisms_display: Vec<Microorganism>,
}

impl From<CertificateForm> for CertificateResponse {
    fn from(form: CertificateForm) -> Self {
        let microorganisms_display = form
            .microorganisms
            .iter()
            .map(|m| Microorganism {
                name: m.name.clone(),
                exponential_value: format_superscript(&m.exponential_value),
            })
            .collect();
        Self {
            form,
            microorganisms_display,
        }
    }
}

/// Response for a saved certificate.
#[derive(Debug, Serialize)]
pub struct SavedCertificate {
    pub certificate_id: CertificateId,
}

/// Certificate form for a batch: the stored certificate, or a new one
/// prefilled from the batch.
///
/// GET /api/batches/{batch_id}/certificate
///
/// # Errors
///
/// Returns `AppError::NotFound` if the batch does not exist.
pub async fn show<S: ProductionStore>(
    State(state): State<AppState<S>>,
    Path(batch_id): Path<BatchId>,
) -> Result<Json<CertificateResponse>> {
    let today = Utc::now().date_naive();
    let form = CertificateForm::for_batch(state.store(), batch_id, today)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("batch {batch_id}")))?;
    Ok(Json(form.into()))
}

/// Save a certificate form.
///
/// PUT /api/batches/{batch_id}/certificate
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the body names another batch,
/// `AppError::NotFound` if the batch or certificate does not exist, and
/// `AppError::Conflict` when creating a second certificate for the batch.
pub async fn save<S: ProductionStore>(
    State(state): State<AppState<S>>,
    Path(batch_id): Path<BatchId>,
    Json(form): Json<CertificateForm>,
) -> Result<Json<SavedCertificate>> {
    if form.batch_id != batch_id {
        return Err(AppError::BadRequest(format!(
            "form is for batch {}, not {batch_id}",
            form.batch_id
        )));
    }
    if form.certificate_id.is_none() && state.store().find_batch_source(batch_id).await?.is_none()
    {
        return Err(AppError::NotFound(format!("batch {batch_id}")));
    }

    let certificate_id = save_certificate(state.store(), &form).await?;
    Ok(Json(SavedCertificate { certificate_id }))
}
