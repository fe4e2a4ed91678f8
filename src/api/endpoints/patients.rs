//! Patient record CRUD.
//!
//! Patient payloads are schema-flexible: any non-empty JSON object is
//! accepted and stored verbatim. The store assigns the id.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::ReportRecord;

#[derive(Serialize)]
pub struct AddPatientResponse {
    pub message: &'static str,
    pub patient_id: String,
}

/// `POST /add-patient` — insert an arbitrary patient payload.
pub async fn add_patient(
    State(ctx): State<ApiContext>,
    Json(payload): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<AddPatientResponse>), ApiError> {
    let is_empty = match &payload {
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::Null => true,
        _ => false,
    };
    if is_empty {
        return Err(ApiError::BadRequest("No patient data provided".into()));
    }

    let patient_id = ctx.store.insert_patient(&payload)?;
    Ok((
        StatusCode::CREATED,
        Json(AddPatientResponse {
            message: "Patient added successfully",
            patient_id,
        }),
    ))
}

/// `GET /get-patient/:id` — fetch one record, id rendered as a string.
pub async fn get_patient(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let patient = ctx
        .store
        .get_patient(&id)?
        .ok_or_else(|| ApiError::NotFound("Patient not found".into()))?;
    Ok(Json(patient.into_json()))
}

/// `GET /get-all-patients` — every record in the store.
pub async fn get_all_patients(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let patients = ctx
        .store
        .list_patients()?
        .into_iter()
        .map(|p| p.into_json())
        .collect();
    Ok(Json(patients))
}

/// `GET /get-patient-reports/:id` — all extraction reports for a patient.
pub async fn get_patient_reports(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ReportRecord>>, ApiError> {
    if !ctx.store.patient_exists(&id)? {
        return Err(ApiError::NotFound("Patient not found".into()));
    }
    Ok(Json(ctx.store.reports_for_patient(&id)?))
}
