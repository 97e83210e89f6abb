use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{
    api::middleware::{ApiResult, AppState},
    models::{SendRecord, SendStatus},
};

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct SendTemplateRequest {
    pub number: String,
    pub template_name: String,
    #[serde(default)]
    pub variables: HashMap<String, String>,
    /// Re-confirm the template's provider status before sending.
    #[serde(default)]
    pub confirm_remote: bool,
}

#[derive(Debug, Deserialize)]
pub struct SendTextRequest {
    pub number: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct LogFilters {
    pub limit: Option<i64>,
}

// Response DTOs

#[derive(Debug, Serialize)]
pub struct SendRecordResponse {
    pub id: String,
    pub number: String,
    pub template_name: Option<String>,
    pub status: SendStatus,
    pub provider_response: Option<String>,
    pub error_message: Option<String>,
    pub created_at: String,
}

impl From<SendRecord> for SendRecordResponse {
    fn from(record: SendRecord) -> Self {
        Self {
            id: record.id,
            number: record.number,
            template_name: record.template_name,
            status: record.status,
            provider_response: record.provider_response,
            error_message: record.error_message,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SendLogResponse {
    pub records: Vec<SendRecordResponse>,
    pub total: usize,
}

// API Handlers

pub async fn send_template_message(
    State(state): State<AppState>,
    Json(request): Json<SendTemplateRequest>,
) -> ApiResult<impl IntoResponse> {
    let record = state
        .pipeline
        .send_template(
            &request.number,
            &request.template_name,
            &request.variables,
            request.confirm_remote,
        )
        .await?;

    Ok(Json(SendRecordResponse::from(record)))
}

pub async fn send_text_message(
    State(state): State<AppState>,
    Json(request): Json<SendTextRequest>,
) -> ApiResult<impl IntoResponse> {
    let record = state
        .pipeline
        .send_text(&request.number, &request.text)
        .await?;

    Ok(Json(SendRecordResponse::from(record)))
}

pub async fn list_send_log(
    State(state): State<AppState>,
    Query(filters): Query<LogFilters>,
) -> ApiResult<impl IntoResponse> {
    let limit = filters.limit.unwrap_or(100).clamp(1, 1000);
    let records = state.db.list_send_records(limit).await?;
    let records: Vec<SendRecordResponse> = records.into_iter().map(Into::into).collect();
    let total = records.len();

    Ok(Json(SendLogResponse { records, total }))
}
