use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::api::middleware::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct AutomationSendRequest {
    pub trigger: String,
    pub destination: String,
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct AutomationSendResponse {
    pub success: bool,
    pub template_used: String,
}

/// Event-driven send surface: resolve the trigger key to its template and
/// run the send pipeline.
pub async fn automation_send(
    State(state): State<AppState>,
    Json(request): Json<AutomationSendRequest>,
) -> ApiResult<impl IntoResponse> {
    let (_, template_used) = state
        .triggers
        .send_for_trigger(
            &state.pipeline,
            &request.trigger,
            &request.destination,
            &request.variables,
        )
        .await?;

    Ok(Json(AutomationSendResponse {
        success: true,
        template_used,
    }))
}
