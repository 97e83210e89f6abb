use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::middleware::{ApiError, ApiResult, AppState},
    database::TemplateFilter,
    models::{
        NewTemplate, Template, TemplateButton, TemplateCategory, TemplatePatch, TemplateStatus,
    },
    services::SyncOutcome,
};

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub language: Option<String>,
    pub category: String,
    pub header: Option<String>,
    pub body: String,
    pub footer: Option<String>,
    #[serde(default)]
    pub buttons: Vec<TemplateButton>,
    pub automation_trigger: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTemplateRequest {
    pub language: Option<String>,
    pub category: Option<String>,
    pub header: Option<String>,
    pub body: Option<String>,
    pub footer: Option<String>,
    pub buttons: Option<Vec<TemplateButton>>,
    pub automation_trigger: Option<String>,
    pub provider_template_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TemplateFilters {
    pub status: Option<String>,
    pub category: Option<String>,
}

// Response DTOs

#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    pub id: String,
    pub name: String,
    pub provider_template_name: Option<String>,
    pub provider_template_id: Option<String>,
    pub language: String,
    pub category: TemplateCategory,
    pub header: Option<String>,
    pub body: String,
    pub footer: Option<String>,
    pub buttons: Vec<TemplateButton>,
    pub variables: Vec<String>,
    pub status: TemplateStatus,
    pub automation_trigger: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Template> for TemplateResponse {
    fn from(template: Template) -> Self {
        Self {
            id: template.id,
            name: template.name,
            provider_template_name: template.provider_template_name,
            provider_template_id: template.provider_template_id,
            language: template.language,
            category: template.category,
            header: template.header,
            body: template.body,
            footer: template.footer,
            buttons: template.buttons,
            variables: template.variables,
            status: template.status,
            automation_trigger: template.automation_trigger,
            created_at: template.created_at,
            updated_at: template.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateTemplateResponse {
    pub template: TemplateResponse,
    /// Set when the local record was created but the provider registration
    /// failed; the template stays pending until a later sync.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateResponse>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteTemplateResponse {
    pub deleted: String,
    pub provider_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub results: Vec<SyncOutcome>,
    pub total: usize,
}

// API Handlers

/// Create a template locally, then attempt provider registration. A remote
/// failure does not roll back the local record; it is reported alongside.
pub async fn create_template(
    State(state): State<AppState>,
    Json(request): Json<CreateTemplateRequest>,
) -> ApiResult<impl IntoResponse> {
    let category = TemplateCategory::parse(&request.category).map_err(ApiError::from)?;

    let spec = NewTemplate {
        name: request.name,
        language: request.language,
        category,
        header: request.header,
        body: request.body,
        footer: request.footer,
        buttons: request.buttons,
        automation_trigger: request.automation_trigger,
    };

    let template = state.db.create_template(spec).await?;
    let (template, provider_error) = state.syncer.register_with_provider(&template.name).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTemplateResponse {
            template: template.into(),
            provider_error: provider_error.map(|e| e.to_string()),
        }),
    ))
}

pub async fn list_templates(
    State(state): State<AppState>,
    Query(filters): Query<TemplateFilters>,
) -> ApiResult<impl IntoResponse> {
    let filter = TemplateFilter {
        status: filters.status.map(TemplateStatus::from),
        category: match filters.category {
            Some(c) => Some(TemplateCategory::parse(&c)?),
            None => None,
        },
    };

    let templates = state.db.list_templates(filter).await?;
    let templates: Vec<TemplateResponse> = templates.into_iter().map(Into::into).collect();
    let total = templates.len();

    Ok(Json(TemplateListResponse { templates, total }))
}

pub async fn get_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let template = state.db.require_template(&name).await?;
    Ok(Json(TemplateResponse::from(template)))
}

pub async fn update_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<UpdateTemplateRequest>,
) -> ApiResult<impl IntoResponse> {
    let patch = TemplatePatch {
        language: request.language,
        category: match request.category {
            Some(c) => Some(TemplateCategory::parse(&c)?),
            None => None,
        },
        header: request.header,
        body: request.body,
        footer: request.footer,
        buttons: request.buttons,
        automation_trigger: request.automation_trigger,
        provider_template_name: request.provider_template_name,
    };

    let template = state.db.update_template(&name, patch).await?;
    Ok(Json(TemplateResponse::from(template)))
}

/// Delete locally, then best-effort remotely. Remote failure is reported
/// but never blocks local deletion.
pub async fn delete_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let template = state.db.delete_template(&name).await?;

    let (provider_deleted, provider_error) = match &template.provider_template_id {
        Some(provider_id) => match state.provider.delete_template(provider_id).await {
            Ok(()) => (true, None),
            Err(e) => {
                tracing::warn!(name = %name, "Remote template deletion failed: {}", e);
                (false, Some(e.to_string()))
            }
        },
        None => (false, None),
    };

    Ok(Json(DeleteTemplateResponse {
        deleted: template.name,
        provider_deleted,
        provider_error,
    }))
}

pub async fn sync_templates(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let results = state.syncer.sync_all().await?;
    let total = results.len();
    Ok(Json(SyncResponse { results, total }))
}

pub async fn repair_templates(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let results = state.syncer.repair_missing_linkage().await?;
    let total = results.len();
    Ok(Json(SyncResponse { results, total }))
}
