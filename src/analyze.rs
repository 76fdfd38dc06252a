//! Analysis entry points.
//!
//! Thin orchestration over the pipeline stages: validate the input, encode
//! it if binary, and issue the single analysis call. All validation happens
//! before any network I/O, so a rejected submission costs nothing.

use crate::config::{AnalysisConfig, MIN_TEXT_LEN};
use crate::error::DistillError;
use crate::output::{AnalysisInput, AnalysisResult};
use crate::pipeline::{encode, input, llm};
use std::path::Path;
use tracing::info;

/// Analyze pasted text.
///
/// The trimmed text must exceed [`MIN_TEXT_LEN`] characters — the same rule
/// the submission UI enforces, repeated here for defense in depth.
pub async fn analyze_text(
    text: impl AsRef<str>,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, DistillError> {
    let trimmed = text.as_ref().trim();
    if trimmed.chars().count() <= MIN_TEXT_LEN {
        return Err(DistillError::TextTooShort {
            len: trimmed.chars().count(),
            min: MIN_TEXT_LEN,
        });
    }

    info!("Starting text analysis ({} chars)", trimmed.len());
    llm::analyze(&AnalysisInput::Text(trimmed.to_string()), config).await
}

/// Analyze a PDF document on disk.
///
/// The file is validated (existence, permissions, `%PDF` magic bytes, size
/// cap) and base64-encoded before the call.
pub async fn analyze_document(
    path: impl AsRef<Path>,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, DistillError> {
    let doc = input::resolve_document(path.as_ref(), config)?;
    info!("Starting document analysis: {} ({} bytes)", doc.name, doc.bytes.len());

    let encoded = encode::encode_document(&doc.bytes, &doc.name);
    llm::analyze(&AnalysisInput::Document(encoded), config).await
}

/// Analyze PDF bytes already in memory.
///
/// The recommended API when the document comes from a network stream or
/// buffer rather than a file on disk. The same magic-byte and size-cap
/// validation applies.
pub async fn analyze_document_bytes(
    bytes: &[u8],
    name: &str,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, DistillError> {
    input::validate_document_bytes(bytes, name, config)?;
    info!("Starting in-memory document analysis: {} ({} bytes)", name, bytes.len());

    let encoded = encode::encode_document(bytes, name);
    llm::analyze(&AnalysisInput::Document(encoded), config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn short_text_is_rejected_before_any_network_call() {
        // No API key configured: if validation did not short-circuit, this
        // would fail with ApiKeyMissing or a network error instead.
        let config = AnalysisConfig::default();
        let err = analyze_text("too short", &config).await.unwrap_err();
        assert!(matches!(err, DistillError::TextTooShort { .. }));
    }

    #[tokio::test]
    async fn boundary_length_is_rejected() {
        let config = AnalysisConfig::default();
        // Exactly 10 chars after trim: the rule is strictly greater than 10.
        let err = analyze_text("  abcdefghij  ", &config).await.unwrap_err();
        assert!(matches!(err, DistillError::TextTooShort { len: 10, .. }));
    }

    #[tokio::test]
    async fn oversized_bytes_are_rejected_before_any_network_call() {
        let config = AnalysisConfig::builder()
            .max_document_bytes(16)
            .build()
            .unwrap();
        let bytes = b"%PDF-1.7 well over sixteen bytes of content";
        let err = analyze_document_bytes(bytes, "big.pdf", &config)
            .await
            .unwrap_err();
        assert!(matches!(err, DistillError::DocumentTooLarge { .. }));
    }

    #[tokio::test]
    async fn non_pdf_bytes_are_rejected() {
        let config = AnalysisConfig::default();
        let err = analyze_document_bytes(b"hello", "x.pdf", &config)
            .await
            .unwrap_err();
        assert!(matches!(err, DistillError::NotAPdf { .. }));
    }
}
