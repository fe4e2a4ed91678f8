//! Document extraction endpoint.
//!
//! `POST /extract-text` — one parameterized pipeline with an optional
//! persistence step: supplying both `patient_id` and `file_category`
//! form fields stores the result as a report; supplying neither returns
//! the extraction only. The patient lookup happens before any staging or
//! processing, so an unknown patient has no side effects at all.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::NewReport;
use crate::pipeline::{allowed_file, PipelineOutput, StagedUpload};

#[derive(Serialize)]
pub struct ExtractResponse {
    pub raw_text: String,
    /// Completion service output, passed through unparsed and unvalidated.
    pub structured_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
}

/// Parsed multipart form: the file plus the optional persistence fields.
struct ExtractForm {
    file_name: String,
    file_bytes: Vec<u8>,
    patient_id: Option<String>,
    file_category: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<ExtractForm, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut patient_id = None;
    let mut file_category = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::BadRequest("No filename on file field".into()))?;
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {e}")))?;
                file = Some((file_name, bytes.to_vec()));
            }
            Some("patient_id") => {
                patient_id = Some(read_text_field(field).await?).filter(|s: &String| !s.is_empty());
            }
            Some("file_category") => {
                file_category =
                    Some(read_text_field(field).await?).filter(|s: &String| !s.is_empty());
            }
            _ => {} // unknown fields are ignored
        }
    }

    let (file_name, file_bytes) =
        file.ok_or_else(|| ApiError::BadRequest("No file provided".into()))?;

    Ok(ExtractForm {
        file_name,
        file_bytes,
        patient_id,
        file_category,
    })
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map(|s| s.trim().to_string())
        .map_err(|e| ApiError::BadRequest(format!("Malformed form field: {e}")))
}

/// `POST /extract-text` — OCR an upload, structure it, optionally persist.
pub async fn extract_text(
    State(ctx): State<ApiContext>,
    multipart: Multipart,
) -> Result<Json<ExtractResponse>, ApiError> {
    let form = read_form(multipart).await?;

    if !allowed_file(&form.file_name) {
        return Err(ApiError::BadRequest(format!(
            "Unsupported file type: {}",
            form.file_name
        )));
    }

    // Persistence intent requires both fields; the patient must exist
    // before anything touches disk or the OCR engine.
    let persist_to = match (&form.patient_id, &form.file_category) {
        (Some(patient_id), Some(category)) => {
            if !ctx.store.patient_exists(patient_id)? {
                return Err(ApiError::NotFound("Patient not found".into()));
            }
            Some((patient_id.clone(), category.clone()))
        }
        (None, None) => None,
        _ => {
            return Err(ApiError::BadRequest(
                "patient_id and file_category must be supplied together".into(),
            ));
        }
    };

    let staged = StagedUpload::stage(&ctx.staging_dir, &form.file_name, &form.file_bytes)
        .map_err(|e| ApiError::Internal(format!("Failed to stage upload: {e}")))?;

    // The pipeline is synchronous (OCR and the completion call both
    // block); run it off the async worker threads. The staged file is
    // removed when the guard drops inside the task, success or failure.
    let pipeline = ctx.pipeline.clone();
    let output: PipelineOutput = tokio::task::spawn_blocking(move || {
        let result = pipeline.run(&staged);
        drop(staged);
        result
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Pipeline task failed: {e}")))??;

    let (patient_id, report_id) = match persist_to {
        Some((patient_id, file_category)) => {
            let report_id = ctx.store.insert_report(&NewReport {
                patient_id: &patient_id,
                file_category: &file_category,
                raw_text: &output.raw_text,
                structured_data: &output.structured_data,
                source_filename: &form.file_name,
            })?;
            (Some(patient_id), Some(report_id))
        }
        None => (None, None),
    };

    Ok(Json(ExtractResponse {
        raw_text: output.raw_text,
        structured_data: output.structured_data,
        patient_id,
        report_id,
    }))
}
