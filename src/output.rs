//! Input and result types for a content analysis.
//!
//! [`AnalysisResult`] is the validated form of the model's structured
//! response. It is immutable once constructed: the session stores it as the
//! sole source of truth for the result views and replaces it wholesale on
//! the next analysis.

use serde::{Deserialize, Serialize};

/// A transport-safe encoded document ready for the API request body.
///
/// Produced by [`crate::pipeline::encode`]; `data` is standard base64 of the
/// raw document bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentData {
    /// Base64-encoded document bytes.
    pub data: String,
    /// Declared media type, e.g. `application/pdf`.
    pub mime_type: String,
    /// Display name (file name), used for logging only.
    pub name: String,
}

/// Content submitted for analysis; constructed per submission and discarded
/// once the call resolves.
#[derive(Debug, Clone)]
pub enum AnalysisInput {
    /// Raw pasted text.
    Text(String),
    /// An encoded binary document.
    Document(DocumentData),
}

impl AnalysisInput {
    /// Whether this input carries a binary document payload.
    pub fn is_document(&self) -> bool {
        matches!(self, AnalysisInput::Document(_))
    }
}

/// The validated structured analysis returned by the model.
///
/// Wire field names are camelCase per the declared response schema. All
/// fields except `translation` are required at deserialization time; a
/// payload missing any of them is a
/// [`crate::error::DistillError::MalformedResponse`], never a partial
/// result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// A concise title of the content.
    pub title: String,
    /// TL;DR summary, markdown, 2–3 paragraphs.
    pub summary: String,
    /// Ordered key takeaways; nominally 5–10, but any length must render.
    pub key_points: Vec<String>,
    /// Diagram description in the Mermaid mini-language (mindmap or graph).
    pub diagram_source: String,
    /// Detected language of the source content.
    pub original_language: String,
    /// Summary and key points translated into the target language.
    ///
    /// Required by the schema but tolerated as absent here: a missing
    /// translation degrades one view, not the whole result.
    #[serde(default)]
    pub translation: Option<String>,
}

impl AnalysisResult {
    /// Serialize title, summary and bulleted key points as a plain-text
    /// block.
    ///
    /// This is the "copy to clipboard" export of the original product; the
    /// CLI prints it or writes it to the report file.
    pub fn export_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Title: {}\n\n", self.title));
        out.push_str(&format!("Summary:\n{}\n\n", self.summary));
        out.push_str("Key Points:\n");
        for point in &self.key_points {
            out.push_str(&format!("- {point}\n"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnalysisResult {
        AnalysisResult {
            title: "Attention Is All You Need".into(),
            summary: "The paper introduces the Transformer.".into(),
            key_points: vec!["Self-attention replaces recurrence".into(), "Parallel training".into()],
            diagram_source: "mindmap\n  root((Transformer))".into(),
            original_language: "English".into(),
            translation: Some("论文介绍了 Transformer。".into()),
        }
    }

    #[test]
    fn export_text_contains_bulleted_points() {
        let text = sample().export_text();
        assert!(text.starts_with("Title: Attention"));
        assert!(text.contains("Summary:\n"));
        assert!(text.contains("- Self-attention replaces recurrence"));
        assert!(text.contains("- Parallel training"));
    }

    #[test]
    fn export_text_handles_empty_key_points() {
        let mut result = sample();
        result.key_points.clear();
        let text = result.export_text();
        assert!(text.ends_with("Key Points:\n"));
    }

    #[test]
    fn deserializes_camel_case_wire_names() {
        let json = r#"{
            "title": "T",
            "summary": "S",
            "keyPoints": ["a", "b"],
            "diagramSource": "graph TD\nA-->B",
            "originalLanguage": "English",
            "translation": "t"
        }"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.key_points.len(), 2);
        assert_eq!(result.original_language, "English");
    }

    #[test]
    fn missing_required_field_fails_deserialization() {
        // keyPoints absent
        let json = r#"{
            "title": "T",
            "summary": "S",
            "diagramSource": "graph TD\nA-->B",
            "originalLanguage": "English"
        }"#;
        let err = serde_json::from_str::<AnalysisResult>(json).unwrap_err();
        assert!(err.to_string().contains("keyPoints"));
    }

    #[test]
    fn missing_translation_is_tolerated() {
        let json = r#"{
            "title": "T",
            "summary": "S",
            "keyPoints": [],
            "diagramSource": "mindmap\n  root((x))",
            "originalLanguage": "German"
        }"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert!(result.translation.is_none());
    }
}
