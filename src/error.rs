//! Error types for the paperdistill library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`DistillError`] — **Fatal**: the analysis cannot produce a result at
//!   all (unreadable document, oversized upload, provider failure, schema
//!   violation). Returned as `Err(DistillError)` from the top-level
//!   `analyze*` functions.
//!
//! * [`RenderError`] — **Non-fatal**: the diagram description returned by
//!   the model could not be parsed or laid out. Contained entirely inside
//!   [`crate::diagram`], which degrades to a fallback graphic instead of
//!   propagating. A render failure never invalidates a completed analysis.
//!
//! The user-facing message policy lives in [`DistillError::user_message`]:
//! anything that happens between "request sent" and "result validated"
//! collapses into one safe, retryable sentence. Raw provider detail is
//! logged via `tracing`, never shown to the user.

use std::path::PathBuf;
use thiserror::Error;

/// Message shown for any failure of the remote analysis call.
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to analyze content. Please try again.";

/// Catch-all message when a failure carries no user-safe text of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong.";

/// All fatal errors returned by the paperdistill library.
///
/// Diagram failures use [`RenderError`] and never appear here.
#[derive(Debug, Error)]
pub enum DistillError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input document was not found at the given path.
    #[error("Document not found: {path:?}\nCheck the path exists and is readable.")]
    DocumentNotFound { path: PathBuf },

    /// Process does not have read permission on the document.
    #[error("Permission denied reading {path:?}\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: {path:?}\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// Document exceeds the configured upload cap.
    ///
    /// Rejected before encoding so an oversized file never reaches the
    /// network call.
    #[error("Document is {size} bytes, exceeding the {limit}-byte limit")]
    DocumentTooLarge { size: u64, limit: u64 },

    /// The document bytes could not be read or encoded.
    #[error("Failed to encode document '{name}': {detail}")]
    EncodingFailed { name: String, detail: String },

    /// Pasted text is too short to analyze (trimmed length must exceed the minimum).
    #[error("Text is too short to analyze ({len} chars; more than {min} required)")]
    TextTooShort { len: usize, min: usize },

    // ── Client errors ─────────────────────────────────────────────────────
    /// No API credential was configured or present in the environment.
    #[error("No API key configured.\nSet GEMINI_API_KEY or supply one via AnalysisConfig.")]
    ApiKeyMissing,

    /// Transport-level or provider-side failure (network error, non-success
    /// status, provider error body). `detail` is for logs only.
    #[error("Analysis request failed: {detail}")]
    AnalysisFailed { detail: String },

    /// The model returned an empty payload (no candidates, or empty text).
    #[error("The model returned an empty response")]
    NoResponse,

    /// The payload was present but does not satisfy the declared response
    /// schema (missing required field, wrong field type, invalid JSON).
    #[error("Response violates the analysis schema: {detail}")]
    MalformedResponse { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DistillError {
    /// The message safe to surface in a UI.
    ///
    /// Every failure of the remote call — transport, empty payload, schema
    /// violation — maps to the same retryable sentence so provider detail
    /// never leaks to the user. Input-side errors are already user-safe and
    /// keep their Display text.
    pub fn user_message(&self) -> String {
        match self {
            DistillError::AnalysisFailed { .. }
            | DistillError::NoResponse
            | DistillError::MalformedResponse { .. } => ANALYSIS_FAILED_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

/// A non-fatal diagram rendering error.
///
/// Produced and consumed inside [`crate::diagram`]; callers of
/// [`crate::diagram::render`] only ever see the fallback graphic.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// The source does not start with a recognized diagram header.
    #[error("Unknown diagram type: {header:?}")]
    UnknownDiagramType { header: String },

    /// A line could not be parsed under the detected diagram type.
    #[error("Syntax error on line {line}: {detail}")]
    Syntax { line: usize, detail: String },

    /// The source parsed but produced nothing to draw.
    #[error("Diagram is empty")]
    Empty,
}
