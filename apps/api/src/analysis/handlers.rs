//! Axum route handlers for the Analysis API.

use axum::{extract::State, Json};
use serde_json::Value;

use crate::analysis::analyzer::{analyze_hook, HookAnalysis};
use crate::errors::AnalysisError;
use crate::state::AppState;

/// POST /api/analyze
///
/// Validates the submitted hook, then relays the model's verdict. The body
/// is taken as raw JSON so a missing or non-string `hook` field can be
/// rejected explicitly rather than as a generic deserialization error.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<HookAnalysis>, AnalysisError> {
    let hook = match body.get("hook") {
        Some(Value::String(s)) => s,
        _ => return Err(AnalysisError::InvalidInput),
    };

    if hook.trim().is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let analysis = analyze_hook(hook, state.model.as_ref(), !state.config.is_production()).await?;

    Ok(Json(analysis))
}
