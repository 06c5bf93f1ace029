//! Request types for the generation backend
//!
//! Provider-agnostic: each backend translates the output contract into its
//! own structured-output mechanism.

use serde_json::{Value, json};
use tracing::debug;

/// How much computation the backend may spend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComputeMode {
    /// No restriction (full-brief generation, translation)
    #[default]
    Full,
    /// Favor speed over depth (suggestions)
    LowLatency,
}

/// Shape the caller expects back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputContract {
    /// Object with title, overall_prompt, total_duration_seconds, aspect_ratio, shots[]
    GeneratedResult,
    /// A single bare string
    PlainText,
    /// Array of {speaker, line} objects
    DialogueLines,
}

impl OutputContract {
    /// Whether the backend should be asked for JSON output
    pub fn expects_json(&self) -> bool {
        !matches!(self, Self::PlainText)
    }

    /// JSON schema describing the contract (lowercase JSON-schema types)
    pub fn response_schema(&self) -> Option<Value> {
        debug!(?self, "OutputContract::response_schema: called");
        match self {
            Self::GeneratedResult => Some(generated_result_schema()),
            Self::DialogueLines => Some(dialogue_schema()),
            Self::PlainText => None,
        }
    }

    /// Short name used when a backend needs to label the schema
    pub fn schema_name(&self) -> &'static str {
        match self {
            Self::GeneratedResult => "video_prompt",
            Self::PlainText => "plain_text",
            Self::DialogueLines => "dialogue_lines",
        }
    }
}

fn generated_result_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string", "description": "A short, catchy title for the video." },
            "overall_prompt": {
                "type": "string",
                "description": "A comprehensive, single-paragraph prompt combining all elements for an AI video generator."
            },
            "total_duration_seconds": { "type": "number", "description": "The total length of the video in seconds." },
            "aspect_ratio": { "type": "string", "description": "The aspect ratio of the video (e.g. \"9:16\")." },
            "shots": {
                "type": "array",
                "description": "The distinct shots that make up the video.",
                "items": {
                    "type": "object",
                    "properties": {
                        "shot_number": { "type": "integer" },
                        "description": {
                            "type": "string",
                            "description": "A detailed description of the action and visuals in this shot."
                        },
                        "camera_angle": { "type": "string", "description": "The camera angle or movement for this shot." },
                        "duration_seconds": { "type": "number", "description": "The duration of this shot in seconds." }
                    },
                    "required": ["shot_number", "description", "camera_angle", "duration_seconds"]
                }
            }
        },
        "required": ["title", "overall_prompt", "total_duration_seconds", "aspect_ratio", "shots"]
    })
}

fn dialogue_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "speaker": { "type": "string" },
                "line": { "type": "string" }
            },
            "required": ["speaker", "line"]
        }
    })
}

/// One call to the generation backend
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Fully composed instruction text
    pub instruction: String,

    /// Expected output shape
    pub contract: OutputContract,

    /// Computation depth
    pub mode: ComputeMode,
}

impl CompletionRequest {
    /// Full-depth request
    pub fn new(instruction: impl Into<String>, contract: OutputContract) -> Self {
        Self {
            instruction: instruction.into(),
            contract,
            mode: ComputeMode::Full,
        }
    }

    /// Low-latency request, used for suggestions
    pub fn low_latency(instruction: impl Into<String>, contract: OutputContract) -> Self {
        Self {
            instruction: instruction.into(),
            contract,
            mode: ComputeMode::LowLatency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_result_schema_required_fields() {
        let schema = OutputContract::GeneratedResult.response_schema().unwrap();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(
            required,
            vec!["title", "overall_prompt", "total_duration_seconds", "aspect_ratio", "shots"]
        );

        let shot_required = schema["properties"]["shots"]["items"]["required"].as_array().unwrap();
        assert_eq!(shot_required.len(), 4);
    }

    #[test]
    fn test_plain_text_has_no_schema() {
        assert!(OutputContract::PlainText.response_schema().is_none());
        assert!(!OutputContract::PlainText.expects_json());
        assert!(OutputContract::DialogueLines.expects_json());
    }

    #[test]
    fn test_request_modes() {
        let full = CompletionRequest::new("x", OutputContract::GeneratedResult);
        assert_eq!(full.mode, ComputeMode::Full);
        let fast = CompletionRequest::low_latency("x", OutputContract::PlainText);
        assert_eq!(fast.mode, ComputeMode::LowLatency);
    }
}
