//! Document encoding: raw PDF bytes → base64 wrapped in [`DocumentData`].
//!
//! The generative-language API accepts binary attachments as base64
//! `inline_data` parts in the JSON request body. Standard (padded) base64 is
//! used; the encoding is deterministic, so identical input bytes always
//! produce identical request payloads. No partial output exists: encoding
//! either yields a complete `DocumentData` or the caller never sees one.

use crate::output::DocumentData;
use crate::pipeline::input::PDF_MIME_TYPE;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

/// Encode validated document bytes for the API request body.
///
/// The caller must have validated the media type already (the `%PDF` check
/// in [`crate::pipeline::input`]); this stage does not inspect content.
pub fn encode_document(bytes: &[u8], name: &str) -> DocumentData {
    let data = STANDARD.encode(bytes);
    debug!("Encoded document '{}' → {} bytes base64", name, data.len());

    DocumentData {
        data,
        mime_type: PDF_MIME_TYPE.to_string(),
        name: name.to_string(),
    }
}
