//! Input resolution: validate a user-supplied document path and read it.
//!
//! ## Why validate before encoding?
//!
//! The encoder and the API call both happily accept arbitrary bytes, so all
//! gatekeeping happens here: PDF magic bytes (`%PDF`) catch wrong file
//! types with a meaningful error instead of a provider rejection, and the
//! size cap rejects oversized uploads *before* any base64 blow-up or
//! network traffic. The 20 MB default cap is a hard precondition, not
//! advisory.

use crate::config::AnalysisConfig;
use crate::error::DistillError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Media type accepted for document uploads.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// A validated document read into memory, ready for encoding.
#[derive(Debug)]
pub struct ResolvedDocument {
    /// Raw document bytes.
    pub bytes: Vec<u8>,
    /// Display name (file name component of the path).
    pub name: String,
}

/// Validate the document at `path` and read its bytes.
///
/// Checks, in order: existence, read permission, size against
/// `config.max_document_bytes`, and the `%PDF` magic bytes. Only a file
/// passing all four is read fully.
pub fn resolve_document(
    path: impl AsRef<Path>,
    config: &AnalysisConfig,
) -> Result<ResolvedDocument, DistillError> {
    let path = path.as_ref();

    let meta = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(DistillError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(DistillError::DocumentNotFound {
                path: path.to_path_buf(),
            });
        }
    };
    if !meta.is_file() {
        return Err(DistillError::DocumentNotFound {
            path: path.to_path_buf(),
        });
    }

    if meta.len() > config.max_document_bytes {
        return Err(DistillError::DocumentTooLarge {
            size: meta.len(),
            limit: config.max_document_bytes,
        });
    }

    let mut file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(DistillError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(DistillError::DocumentNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    let mut magic = [0u8; 4];
    if file.read_exact(&mut magic).is_err() || &magic != b"%PDF" {
        return Err(DistillError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }

    let mut bytes = magic.to_vec();
    file.read_to_end(&mut bytes)
        .map_err(|e| DistillError::EncodingFailed {
            name: display_name(path),
            detail: format!("read failed: {e}"),
        })?;

    debug!("Resolved document: {} ({} bytes)", path.display(), bytes.len());
    Ok(ResolvedDocument {
        bytes,
        name: display_name(path),
    })
}

/// Size-cap and magic-byte validation for in-memory document bytes.
///
/// Used by [`crate::analyze::analyze_document_bytes`] when the document
/// comes from a buffer rather than a file.
pub fn validate_document_bytes(
    bytes: &[u8],
    name: &str,
    config: &AnalysisConfig,
) -> Result<(), DistillError> {
    if bytes.len() as u64 > config.max_document_bytes {
        return Err(DistillError::DocumentTooLarge {
            size: bytes.len() as u64,
            limit: config.max_document_bytes,
        });
    }
    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        return Err(DistillError::NotAPdf {
            path: PathBuf::from(name),
            magic,
        });
    }
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().expect("temp file");
        f.write_all(content).expect("write");
        f
    }

    #[test]
    fn rejects_missing_file() {
        let config = AnalysisConfig::default();
        let err = resolve_document("/no/such/file.pdf", &config).unwrap_err();
        assert!(matches!(err, DistillError::DocumentNotFound { .. }));
    }

    #[test]
    fn rejects_non_pdf_magic() {
        let config = AnalysisConfig::default();
        let f = write_temp(b"PK\x03\x04 not a pdf");
        let err = resolve_document(f.path(), &config).unwrap_err();
        assert!(matches!(err, DistillError::NotAPdf { .. }));
    }

    #[test]
    fn rejects_oversized_document_before_reading() {
        let config = AnalysisConfig::builder()
            .max_document_bytes(8)
            .build()
            .unwrap();
        let f = write_temp(b"%PDF-1.7 plus quite a lot more");
        let err = resolve_document(f.path(), &config).unwrap_err();
        assert!(matches!(err, DistillError::DocumentTooLarge { .. }));
    }

    #[test]
    fn reads_valid_pdf_bytes_fully() {
        let config = AnalysisConfig::default();
        let content = b"%PDF-1.4\n1 0 obj\nendobj\n%%EOF";
        let f = write_temp(content);
        let doc = resolve_document(f.path(), &config).unwrap();
        assert_eq!(doc.bytes, content);
        assert!(doc.name.ends_with(".pdf") || !doc.name.is_empty());
    }

    #[test]
    fn validates_in_memory_bytes() {
        let config = AnalysisConfig::default();
        assert!(validate_document_bytes(b"%PDF-1.5 ...", "mem.pdf", &config).is_ok());
        assert!(matches!(
            validate_document_bytes(b"oops", "mem.pdf", &config),
            Err(DistillError::NotAPdf { .. })
        ));
        assert!(matches!(
            validate_document_bytes(b"%P", "mem.pdf", &config),
            Err(DistillError::NotAPdf { .. })
        ));
    }
}
