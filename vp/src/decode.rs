//! Response Decoder
//!
//! Turns raw backend text into typed data. Tolerates one surrounding
//! markdown code fence and prose around a JSON payload; anything else is a
//! `DecodeError::Malformed` carrying the raw text for the logs.

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::domain::{DialogueLine, GeneratedResult};
use crate::llm::OutputContract;

const FENCE: &str = "```";

/// Decode failures
///
/// `Display` never includes the raw text; use [`DecodeError::raw`] for logging.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Malformed response: {reason}")]
    Malformed { reason: String, raw: String },
}

impl DecodeError {
    fn malformed(reason: impl Into<String>, raw: &str) -> Self {
        Self::Malformed {
            reason: reason.into(),
            raw: raw.to_string(),
        }
    }

    /// The backend text that failed to decode
    pub fn raw(&self) -> &str {
        match self {
            Self::Malformed { raw, .. } => raw,
        }
    }
}

/// Typed outcome of a decode
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Result(GeneratedResult),
    Text(String),
    Dialogue(Vec<DialogueLine>),
}

/// Decode raw backend text according to the contract it was requested under
pub fn decode(raw: &str, contract: OutputContract) -> Result<Decoded, DecodeError> {
    debug!(?contract, raw_len = raw.len(), "decode: called");
    match contract {
        OutputContract::GeneratedResult => decode_result(raw).map(Decoded::Result),
        OutputContract::PlainText => decode_text(raw).map(Decoded::Text),
        OutputContract::DialogueLines => decode_dialogue(raw).map(Decoded::Dialogue),
    }
}

/// Decode a full structured result
pub fn decode_result(raw: &str) -> Result<GeneratedResult, DecodeError> {
    parse_json(raw, '{', '}')
}

/// Decode a bare single-field value
pub fn decode_text(raw: &str) -> Result<String, DecodeError> {
    let text = strip_quotes(strip_fences(raw)).trim();
    if text.is_empty() {
        debug!("decode_text: empty after cleanup");
        return Err(DecodeError::malformed("empty text", raw));
    }
    Ok(text.to_string())
}

/// Decode a non-empty list of speaker/line pairs
pub fn decode_dialogue(raw: &str) -> Result<Vec<DialogueLine>, DecodeError> {
    let lines: Vec<DialogueLine> = parse_json(raw, '[', ']')?;
    if lines.is_empty() {
        debug!("decode_dialogue: empty array");
        return Err(DecodeError::malformed("dialogue list is empty", raw));
    }
    Ok(lines)
}

/// Remove surrounding whitespace and one optional code fence on each side
///
/// The opening fence may carry a language tag. Interior content is untouched.
pub fn strip_fences(raw: &str) -> &str {
    let text = raw.trim();
    let text = strip_opening_fence(text);
    let text = text.strip_suffix(FENCE).unwrap_or(text);
    text.trim()
}

fn strip_opening_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix(FENCE) else {
        return text;
    };
    // A tag is only a tag when it sits alone on the fence line
    let Some((first_line, body)) = rest.split_once('\n') else {
        return rest;
    };
    let tag = first_line.trim();
    if tag.chars().all(|c| c.is_ascii_alphanumeric() || "_+.-".contains(c)) {
        body
    } else {
        rest
    }
}

fn strip_quotes(text: &str) -> &str {
    for (open, close) in [('"', '"'), ('\'', '\''), ('\u{201C}', '\u{201D}')] {
        if let Some(inner) = text.strip_prefix(open).and_then(|t| t.strip_suffix(close)) {
            return inner;
        }
    }
    text
}

/// Outermost `open`..`close` span, used when prose surrounds the payload
fn outermost_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (start < end).then(|| &text[start..=end])
}

fn parse_json<T: DeserializeOwned>(raw: &str, open: char, close: char) -> Result<T, DecodeError> {
    let payload = strip_fences(raw);
    let first_error = match serde_json::from_str(payload) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    debug!(error = %first_error, "parse_json: direct parse failed, trying outermost span");
    match outermost_span(payload, open, close) {
        Some(span) if span.len() < payload.len() => {
            serde_json::from_str(span).map_err(|e| DecodeError::malformed(e.to_string(), raw))
        }
        _ => Err(DecodeError::malformed(first_error.to_string(), raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Shot, fixtures::sample_result};
    use proptest::prelude::*;

    const CLEAN: &str = r#"{"title":"X","overall_prompt":"A cat rides.","total_duration_seconds":2,"aspect_ratio":"9:16","shots":[{"shot_number":1,"description":"Roll in","camera_angle":"Wide Shot","duration_seconds":2}]}"#;

    #[test]
    fn test_fenced_and_unfenced_decode_identically() {
        let fenced = format!("```json\n{}\n```", CLEAN);
        let a = decode_result(&fenced).unwrap();
        let b = decode_result(CLEAN).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.title, "X");
        assert_eq!(a.shots.len(), 1);
    }

    #[test]
    fn test_fence_without_tag_or_newline() {
        let fenced = format!("```{}```", CLEAN);
        assert_eq!(decode_result(&fenced).unwrap().title, "X");

        let crlf = format!("  ```JSON \r\n{}\r\n```  ", CLEAN);
        assert_eq!(decode_result(&crlf).unwrap().title, "X");
    }

    #[test]
    fn test_prose_around_payload_is_repaired() {
        let raw = format!("Here is your shot list:\n{}\nEnjoy!", CLEAN);
        assert_eq!(decode_result(&raw).unwrap().title, "X");
    }

    #[test]
    fn test_doubled_fence_still_parses_via_span() {
        let raw = format!("```json\n```json\n{}\n```\n```", CLEAN);
        assert_eq!(decode_result(&raw).unwrap().title, "X");
    }

    #[test]
    fn test_missing_required_field_is_malformed() {
        let raw = r#"{"title":"X","overall_prompt":"p","total_duration_seconds":8,"aspect_ratio":"9:16"}"#;
        let err = decode_result(raw).unwrap_err();
        assert!(err.to_string().contains("shots"));
        assert_eq!(err.raw(), raw);
    }

    #[test]
    fn test_semantic_mismatch_is_not_rejected() {
        // Shot count and duration sum are reported elsewhere, never enforced here
        let mut result = sample_result("Short", 8);
        result.shots.truncate(3);
        let decoded = decode_result(&serde_json::to_string(&result).unwrap()).unwrap();
        assert_eq!(decoded.shots.len(), 3);
    }

    #[test]
    fn test_error_display_hides_raw_text() {
        let raw = "the model says something secret";
        let err = decode_result(raw).unwrap_err();
        assert!(!err.to_string().contains("secret"));
        assert_eq!(err.raw(), raw);
    }

    #[test]
    fn test_decode_text() {
        assert_eq!(decode_text("  Neon cyberpunk blues \n").unwrap(), "Neon cyberpunk blues");
        assert_eq!(decode_text("\"A cat riding a skateboard\"").unwrap(), "A cat riding a skateboard");
        assert_eq!(decode_text("```\nEpic orchestral score\n```").unwrap(), "Epic orchestral score");
        assert_eq!(decode_text("Rain on a \"tin\" roof").unwrap(), "Rain on a \"tin\" roof");
        assert!(decode_text("   ").is_err());
        assert!(decode_text("\"\"").is_err());
    }

    #[test]
    fn test_fenced_text_keeps_first_word() {
        assert_eq!(decode_text("```Epic orchestral score```").unwrap(), "Epic orchestral score");
        assert_eq!(decode_text("```Neon```").unwrap(), "Neon");
        assert_eq!(
            decode_text("```Soft piano, light rain\nfading out\n```").unwrap(),
            "Soft piano, light rain\nfading out"
        );
        assert_eq!(decode_text("```text\nLo-fi beats\n```").unwrap(), "Lo-fi beats");
    }

    #[test]
    fn test_decode_dialogue() {
        let raw = "```json\n[{\"speaker\":\"Mina\",\"line\":\"Ready?\"},{\"speaker\":\"Jun\",\"line\":\"Go!\"}]\n```";
        let lines = decode_dialogue(raw).unwrap();
        assert_eq!(lines, vec![DialogueLine::new("Mina", "Ready?"), DialogueLine::new("Jun", "Go!")]);
    }

    #[test]
    fn test_decode_dialogue_rejects_bad_shapes() {
        assert!(decode_dialogue("[]").is_err());
        assert!(decode_dialogue(r#"{"speaker":"A","line":"B"}"#).is_err());
        assert!(decode_dialogue(r#"[{"who":"A","says":"B"}]"#).is_err());
        assert!(decode_dialogue("no dialogue today").is_err());
    }

    #[test]
    fn test_decode_dispatch() {
        assert!(matches!(
            decode(CLEAN, OutputContract::GeneratedResult),
            Ok(Decoded::Result(_))
        ));
        assert_eq!(
            decode("Cinematic", OutputContract::PlainText).unwrap(),
            Decoded::Text("Cinematic".to_string())
        );
        assert!(matches!(
            decode(r#"[{"speaker":"A","line":"B"}]"#, OutputContract::DialogueLines),
            Ok(Decoded::Dialogue(_))
        ));
    }

    fn arb_shot() -> impl Strategy<Value = Shot> {
        (1u32..=10, "\\PC{0,40}", "\\PC{0,20}", 0u32..=240).prop_map(|(n, description, camera_angle, quarters)| Shot {
            shot_number: n,
            description,
            camera_angle,
            duration_seconds: f64::from(quarters) * 0.25,
        })
    }

    fn arb_result() -> impl Strategy<Value = GeneratedResult> {
        (
            "\\PC{0,30}",
            "\\PC{0,200}",
            3u32..=60,
            prop::sample::select(vec!["9:16", "16:9", "1:1", "4:5"]),
            prop::collection::vec(arb_shot(), 0..12),
        )
            .prop_map(|(title, overall_prompt, total, aspect, shots)| GeneratedResult {
                title,
                overall_prompt,
                total_duration_seconds: f64::from(total),
                aspect_ratio: aspect.to_string(),
                shots,
            })
    }

    proptest! {
        #[test]
        fn prop_clean_json_decodes_to_itself(result in arb_result()) {
            let json = serde_json::to_string(&result).unwrap();
            prop_assert_eq!(decode_result(&json).unwrap(), result);
        }

        #[test]
        fn prop_fence_is_transparent(
            result in arb_result(),
            tag in prop::sample::select(vec!["", "json", "JSON", "json5"]),
            pretty in any::<bool>(),
        ) {
            let json = if pretty {
                serde_json::to_string_pretty(&result).unwrap()
            } else {
                serde_json::to_string(&result).unwrap()
            };
            let fenced = format!("```{}\n{}\n```", tag, json);
            prop_assert_eq!(decode_result(&fenced).unwrap(), decode_result(&json).unwrap());
        }
    }
}
