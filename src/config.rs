//! Configuration types for content analysis.
//!
//! All analysis behaviour is controlled through [`AnalysisConfig`], built via
//! its [`AnalysisConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across tasks, log them, and diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! Callers set only what they care about and rely on documented defaults for
//! the rest; adding a field later does not break existing call sites.

use crate::error::DistillError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Environment variable consulted when no API key is set on the config.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Minimum trimmed length a text submission must *exceed*.
pub const MIN_TEXT_LEN: usize = 10;

/// Default cap on document uploads: 20 MB.
pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 20 * 1024 * 1024;

/// Language the summary and key points are translated into.
///
/// The set is fixed; "Chinese" is the default, matching the product's
/// primary audience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TargetLanguage {
    #[default]
    Chinese,
    English,
    Spanish,
    Japanese,
    French,
    German,
}

impl TargetLanguage {
    /// All supported languages, in display order.
    pub const ALL: [TargetLanguage; 6] = [
        TargetLanguage::Chinese,
        TargetLanguage::English,
        TargetLanguage::Spanish,
        TargetLanguage::Japanese,
        TargetLanguage::French,
        TargetLanguage::German,
    ];

    /// The name used in prompts and UI labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetLanguage::Chinese => "Chinese",
            TargetLanguage::English => "English",
            TargetLanguage::Spanish => "Spanish",
            TargetLanguage::Japanese => "Japanese",
            TargetLanguage::French => "French",
            TargetLanguage::German => "German",
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetLanguage {
    type Err = DistillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TargetLanguage::ALL
            .iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| {
                DistillError::InvalidConfig(format!(
                    "Unknown target language '{s}' (expected one of: {})",
                    TargetLanguage::ALL.map(|l| l.as_str()).join(", ")
                ))
            })
    }
}

/// Configuration for a content analysis.
///
/// Built via [`AnalysisConfig::builder()`] or [`AnalysisConfig::default()`].
///
/// # Example
/// ```rust
/// use paperdistill::{AnalysisConfig, TargetLanguage};
///
/// let config = AnalysisConfig::builder()
///     .target_language(TargetLanguage::Japanese)
///     .model("gemini-2.5-flash")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AnalysisConfig {
    /// API credential. If `None`, `GEMINI_API_KEY` is read at call time —
    /// the credential comes from the hosting environment, never from a file.
    pub api_key: Option<String>,

    /// Base URL of the generative-language API. Default:
    /// `https://generativelanguage.googleapis.com`. Override for proxies
    /// and tests.
    pub base_url: String,

    /// Model identifier. Default: `gemini-2.5-flash` — efficient for large
    /// contexts such as whole PDFs.
    pub model: String,

    /// Language for the translated summary and key points. Default: Chinese.
    pub target_language: TargetLanguage,

    /// Sampling temperature. Default: 0.3.
    ///
    /// Low temperature keeps the summary faithful to the source; higher
    /// values introduce creativity that hurts factual accuracy.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 8192.
    ///
    /// The response carries a summary, 5–10 key points, a diagram and a full
    /// translation; setting this too low truncates the JSON payload
    /// mid-object and surfaces as a schema violation.
    pub max_output_tokens: usize,

    /// Per-call timeout in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Hard cap on document uploads in bytes. Default: 20 MB.
    ///
    /// Enforced before encoding: an oversized document is rejected
    /// immediately rather than passed to the network call.
    pub max_document_bytes: u64,

    /// Custom system instruction. If `None`, the built-in default from
    /// [`crate::prompts`] is used.
    pub system_instruction: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-flash".to_string(),
            target_language: TargetLanguage::default(),
            temperature: 0.3,
            max_output_tokens: 8192,
            api_timeout_secs: 120,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            system_instruction: None,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("target_language", &self.target_language)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_document_bytes", &self.max_document_bytes)
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }

    /// Resolve the API key: explicit config first, environment second.
    pub fn resolve_api_key(&self) -> Result<String, DistillError> {
        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(DistillError::ApiKeyMissing),
        }
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn target_language(mut self, lang: TargetLanguage) -> Self {
        self.config.target_language = lang;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_output_tokens(mut self, n: usize) -> Self {
        self.config.max_output_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn max_document_bytes(mut self, bytes: u64) -> Self {
        self.config.max_document_bytes = bytes;
        self
    }

    pub fn system_instruction(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_instruction = Some(prompt.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, DistillError> {
        let c = &self.config;
        if c.base_url.trim().is_empty() {
            return Err(DistillError::InvalidConfig("base_url must not be empty".into()));
        }
        if c.model.trim().is_empty() {
            return Err(DistillError::InvalidConfig("model must not be empty".into()));
        }
        if c.max_output_tokens == 0 {
            return Err(DistillError::InvalidConfig(
                "max_output_tokens must be ≥ 1".into(),
            ));
        }
        if c.max_document_bytes == 0 {
            return Err(DistillError::InvalidConfig(
                "max_document_bytes must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_language_is_chinese() {
        assert_eq!(AnalysisConfig::default().target_language, TargetLanguage::Chinese);
    }

    #[test]
    fn language_round_trips_through_str() {
        for lang in TargetLanguage::ALL {
            assert_eq!(lang.as_str().parse::<TargetLanguage>().unwrap(), lang);
        }
    }

    #[test]
    fn language_parse_is_case_insensitive() {
        assert_eq!("japanese".parse::<TargetLanguage>().unwrap(), TargetLanguage::Japanese);
        assert_eq!(" FRENCH ".parse::<TargetLanguage>().unwrap(), TargetLanguage::French);
    }

    #[test]
    fn unknown_language_is_rejected() {
        assert!("Klingon".parse::<TargetLanguage>().is_err());
    }

    #[test]
    fn builder_rejects_empty_model() {
        let err = AnalysisConfig::builder().model("").build();
        assert!(matches!(err, Err(DistillError::InvalidConfig(_))));
    }

    #[test]
    fn builder_clamps_temperature() {
        let config = AnalysisConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(config.temperature, 2.0);
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AnalysisConfig::builder().api_key("sk-secret").build().unwrap();
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("sk-secret"));
    }
}
