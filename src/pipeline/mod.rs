//! Pipeline stages for content analysis.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap an
//! implementation (e.g. a different provider in [`llm`]) without touching
//! the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ encode ──▶ llm
//! (path)   (base64)   (one generateContent call)
//! ```
//!
//! 1. [`input`]  — validate the user-supplied document path (magic bytes,
//!    size cap) and read its bytes
//! 2. [`encode`] — base64-wrap the bytes for the inline request body
//! 3. [`llm`]    — build the request with the declared response schema,
//!    issue the single network call, and validate the payload; the only
//!    stage with network I/O

pub mod encode;
pub mod input;
pub mod llm;
