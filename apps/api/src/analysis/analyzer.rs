//! Core of the analysis gateway: one model call, then defensive parsing of
//! the reply against the shape the prompt demands.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::analysis::prompts::HOOK_ANALYSIS_SYSTEM;
use crate::errors::AnalysisError;
use crate::llm_client::ChatModel;

/// The model's verdict on a hook. `score` and `feedback` are relayed
/// exactly as the model produced them (no clamping, no rewriting); any
/// extra fields the model includes ride along via `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookAnalysis {
    pub score: f64,
    pub feedback: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Runs one hook through the remote model and returns its verdict.
///
/// The caller has already validated `hook` as non-empty text. Exactly one
/// remote attempt is made; every failure is terminal for this request.
/// `verbose_errors` controls whether unclassified upstream failures carry
/// raw diagnostics back to the caller.
pub async fn analyze_hook(
    hook: &str,
    model: &dyn ChatModel,
    verbose_errors: bool,
) -> Result<HookAnalysis, AnalysisError> {
    let reply = model
        .complete(HOOK_ANALYSIS_SYSTEM, hook)
        .await
        .map_err(|e| AnalysisError::from_upstream(e, verbose_errors))?;

    parse_reply(&reply)
}

/// Parses the model's message body into a `HookAnalysis`, rejecting
/// replies that are not JSON or that lack a usable score and feedback.
/// The external contract is not assumed stable: a reply with `score: 0`
/// or empty `feedback` is treated as malformed, not relayed.
fn parse_reply(raw: &str) -> Result<HookAnalysis, AnalysisError> {
    let analysis: HookAnalysis = serde_json::from_str(raw).map_err(|e| {
        debug!("Failed to parse model reply as analysis JSON: {e}");
        AnalysisError::unparseable_reply()
    })?;

    if analysis.score == 0.0 || analysis.feedback.is_empty() {
        debug!("Model reply missing usable score/feedback: {raw}");
        return Err(AnalysisError::unparseable_reply());
    }

    Ok(analysis)
}
