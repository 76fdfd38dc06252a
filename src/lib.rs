//! # paperdistill
//!
//! Distill a document (PDF or pasted text) into a structured analysis —
//! title, summary, key takeaways, a concept map, and a translation — using
//! a hosted large-language model.
//!
//! ## Why this crate?
//!
//! Reading a dense paper end-to-end is slow; skimming it loses structure.
//! This crate sends the whole document to a long-context model under a
//! strict response schema and turns the reply into something scannable: a
//! 2–3 paragraph summary, 5–10 key points, a rendered concept map, and the
//! findings translated into a chosen language. The model's output is never
//! trusted: the payload is validated against the declared schema, and the
//! diagram description it returns is parsed defensively with a fallback
//! graphic.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / text
//!  │
//!  ├─ 1. Input    validate path, magic bytes, 20 MB cap
//!  ├─ 2. Encode   bytes → base64 inline payload
//!  ├─ 3. Analyze  one generateContent call with a strict response schema
//!  ├─ 4. Validate reject empty or schema-violating payloads
//!  └─ 5. Render   diagram description → SVG (fallback on bad syntax)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use paperdistill::{analyze_document, diagram, AnalysisConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credential read from GEMINI_API_KEY
//!     let config = AnalysisConfig::default();
//!     let result = analyze_document("paper.pdf", &config).await?;
//!     println!("{}", result.export_text());
//!     let map = diagram::render(&result.diagram_source);
//!     std::fs::write("diagram.svg", map.svg)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `paperdistill` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! paperdistill = { version = "0.3", default-features = false }
//! ```
//!
//! ## Failure model
//!
//! The single analysis call is never retried internally; retrying is a user
//! decision. Provider failures, empty payloads, and schema violations all
//! surface as typed [`DistillError`] variants whose
//! [`user_message`](DistillError::user_message) is safe to display. Diagram
//! rendering failures are contained in [`diagram`] and never invalidate a
//! completed analysis.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod diagram;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze_document, analyze_document_bytes, analyze_text};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, TargetLanguage};
pub use diagram::{DiagramSlot, RenderedDiagram};
pub use error::{DistillError, RenderError};
pub use output::{AnalysisInput, AnalysisResult, DocumentData};
pub use session::{AnalysisSession, AnalysisStatus, SubmitRejected, Ticket};
