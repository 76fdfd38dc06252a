//! The analysis call: build the request, issue it once, validate the reply.
//!
//! This module is the only stage with network I/O. It speaks the
//! generative-language REST surface directly: a single `generateContent`
//! POST carrying the content parts, the system instruction, and the strict
//! response schema from [`crate::prompts`].
//!
//! ## No internal retry
//!
//! Exactly one outbound call per invocation, by contract. Retrying is a
//! user decision made at the session layer (re-submit after reset), so a
//! transient provider failure surfaces immediately as
//! [`DistillError::AnalysisFailed`] instead of silently multiplying
//! traffic.
//!
//! ## Failure taxonomy
//!
//! | Condition                                   | Error                 |
//! |---------------------------------------------|-----------------------|
//! | network error / timeout / non-2xx / bad envelope | `AnalysisFailed` |
//! | envelope ok but no candidate text, or empty | `NoResponse`          |
//! | candidate text violates the schema          | `MalformedResponse`   |
//!
//! Raw provider detail goes to the log; [`DistillError::user_message`]
//! collapses all three into one retryable sentence for display.

use crate::config::AnalysisConfig;
use crate::error::DistillError;
use crate::output::{AnalysisInput, AnalysisResult};
use crate::prompts::{response_schema, system_instruction, DOCUMENT_PROMPT};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Issue the single analysis call and return the validated result.
pub async fn analyze(
    input: &AnalysisInput,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, DistillError> {
    let api_key = config.resolve_api_key()?;
    let url = build_url(config, &api_key);
    let body = build_request_body(input, config);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.api_timeout_secs))
        .build()
        .map_err(|e| DistillError::Internal(format!("http client: {e}")))?;

    let start = Instant::now();
    debug!(model = %config.model, is_document = input.is_document(), "Sending analysis request");

    let response = client.post(&url).json(&body).send().await.map_err(|e| {
        warn!("Analysis request failed: {e}");
        DistillError::AnalysisFailed {
            detail: format!("request error: {e}"),
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        warn!("Provider returned {status}: {error_text}");
        return Err(DistillError::AnalysisFailed {
            detail: format!("provider returned {status}: {error_text}"),
        });
    }

    let envelope: Value = response.json().await.map_err(|e| {
        warn!("Provider response was not JSON: {e}");
        DistillError::AnalysisFailed {
            detail: format!("unreadable response body: {e}"),
        }
    })?;

    let payload = extract_payload_text(&envelope)?;
    let result = parse_result(payload)?;

    debug!(
        "Analysis resolved in {:?}: '{}', {} key points",
        start.elapsed(),
        result.title,
        result.key_points.len()
    );
    Ok(result)
}

/// Build the `generateContent` endpoint URL.
///
/// The key travels as a query parameter per the API convention; never log
/// the returned string.
fn build_url(config: &AnalysisConfig, api_key: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent?key={}",
        config.base_url.trim_end_matches('/'),
        config.model,
        api_key
    )
}

/// Build the JSON request body: content parts, system instruction, and the
/// generation config declaring the structured response schema.
fn build_request_body(input: &AnalysisInput, config: &AnalysisConfig) -> Value {
    let parts = match input {
        AnalysisInput::Document(doc) => json!([
            {
                "inline_data": {
                    "mime_type": doc.mime_type,
                    "data": doc.data
                }
            },
            { "text": DOCUMENT_PROMPT }
        ]),
        AnalysisInput::Text(text) => json!([{ "text": text }]),
    };

    let instruction = config
        .system_instruction
        .clone()
        .unwrap_or_else(|| system_instruction(config.target_language));

    json!({
        "contents": [{ "role": "user", "parts": parts }],
        "systemInstruction": { "parts": [{ "text": instruction }] },
        "generationConfig": {
            "temperature": config.temperature,
            "maxOutputTokens": config.max_output_tokens,
            "responseMimeType": "application/json",
            "responseSchema": response_schema(config.target_language)
        }
    })
}

/// Pull the candidate text out of the response envelope.
///
/// An envelope with no candidate text (including the literal `{}` body) is
/// an empty payload, not a schema violation.
fn extract_payload_text(envelope: &Value) -> Result<&str, DistillError> {
    match envelope
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
    {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(DistillError::NoResponse),
    }
}

/// Deserialize the candidate text against the declared schema.
fn parse_result(payload: &str) -> Result<AnalysisResult, DistillError> {
    let cleaned = strip_code_fences(payload);
    serde_json::from_str::<AnalysisResult>(cleaned).map_err(|e| {
        warn!("Schema violation in model payload: {e}");
        DistillError::MalformedResponse {
            detail: e.to_string(),
        }
    })
}

/// Strip a wrapping markdown fence from the payload, if present.
///
/// The instruction forbids fences, but models occasionally emit
/// ```` ```json … ``` ```` anyway; unwrapping here is cheaper than failing
/// the whole analysis over cosmetic wrapping.
fn strip_code_fences(payload: &str) -> &str {
    let trimmed = payload.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    match body.split_once('\n') {
        Some((_, content)) => content.trim(),
        None => body.trim(),
    }
}
