//! System instruction and response schema for the analysis call.
//!
//! Centralising the full model contract here serves two purposes:
//!
//! 1. **Single source of truth** — the instruction text and the declared
//!    response schema must stay in lockstep (the instruction names the same
//!    fields the schema requires); keeping both in one module makes drift
//!    impossible to miss.
//!
//! 2. **Testability** — unit tests can inspect the prompt and schema without
//!    issuing a real API call, so contract regressions are caught cheaply.
//!
//! Callers can override the instruction via
//! [`crate::config::AnalysisConfig::system_instruction`]; the schema is not
//! overridable because [`crate::output::AnalysisResult`] is deserialized
//! against exactly these fields.

use crate::config::TargetLanguage;
use serde_json::{json, Value};

/// Fixed text part accompanying an inline document payload.
pub const DOCUMENT_PROMPT: &str = "Analyze this PDF document.";

/// Build the system instruction for the given target language.
///
/// The instruction mirrors the response schema: structured summary, 5–10 key
/// points, a Mermaid diagram (mindmap for concepts, `graph TD` for
/// processes) with no code fences, and a translation of the main findings.
pub fn system_instruction(target_language: TargetLanguage) -> String {
    format!(
        r#"You are an expert research assistant and content visualizer.
Your goal is to distill complex information into clear, accessible summaries and diagrams.

1. Analyze the input content (PDF or Text).
2. Generate a structured summary (2-3 paragraphs).
3. Extract 5-10 critical takeaways or facts.
4. Create a Mermaid diagram:
   - Use 'mindmap' for hierarchical concepts.
   - Use 'graph TD' for processes or workflows.
   - Ensure the node labels are concise.
   - IMPORTANT: Return ONLY the raw Mermaid code string, no backticks or 'mermaid' labels.
5. Provide a translation of the summary and key points into {target_language}.

Make the tone professional yet easy to understand for a general audience."#
    )
}

/// The strict response schema declared to the model.
///
/// Every field is required; [`crate::pipeline::llm`] rejects any payload
/// that does not deserialize against it. Field descriptions are part of the
/// prompt surface — the model reads them.
pub fn response_schema(target_language: TargetLanguage) -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": {
                "type": "STRING",
                "description": "A concise title of the content."
            },
            "summary": {
                "type": "STRING",
                "description": "A comprehensive TL;DR summary of the content (2-3 paragraphs)."
            },
            "keyPoints": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "A list of 5-10 critical takeaways or facts from the content."
            },
            "diagramSource": {
                "type": "STRING",
                "description": "Valid Mermaid code (either 'mindmap' or 'graph TD') that visualizes the structure or flow of the content. Do not include markdown code fences."
            },
            "originalLanguage": {
                "type": "STRING",
                "description": "The detected language of the source content."
            },
            "translation": {
                "type": "STRING",
                "description": format!(
                    "The 'summary' and 'keyPoints' translated into {target_language}. Format it as a markdown string."
                )
            }
        },
        "required": ["title", "summary", "keyPoints", "diagramSource", "originalLanguage", "translation"]
    })
}
