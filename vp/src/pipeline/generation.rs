//! Compose -> execute -> decode
//!
//! The one path every backend call takes: full-brief generation, single
//! field suggestions and translation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::PipelineError;
use crate::decode::{DecodeError, decode_dialogue, decode_result, decode_text};
use crate::domain::{Brief, GeneratedResult, Language, SuggestionField, SuggestionValue};
use crate::llm::{CompletionRequest, LlmClient, OutputContract};
use crate::prompts::PromptComposer;

/// Generation client plus prompt composer
pub struct Pipeline {
    client: Arc<dyn LlmClient>,
    composer: PromptComposer,
}

impl Pipeline {
    pub fn new(client: Arc<dyn LlmClient>, composer: PromptComposer) -> Self {
        debug!("Pipeline::new: called");
        Self { client, composer }
    }

    pub fn composer(&self) -> &PromptComposer {
        &self.composer
    }

    /// Generate a shot list for a brief
    ///
    /// Shot count and duration sum are reported when they disagree with the
    /// brief, but the result is returned as the backend produced it.
    pub async fn generate(&self, brief: &Brief, language: Language) -> Result<GeneratedResult, PipelineError> {
        debug!(%language, duration = brief.duration_seconds, "generate: called");
        let instruction = self
            .composer
            .compose_brief_instruction(brief, language)
            .map_err(PipelineError::Compose)?;

        let raw = self
            .client
            .execute(CompletionRequest::new(instruction, OutputContract::GeneratedResult))
            .await?;
        let result = decode_result(&raw).map_err(malformed)?;

        let check = result.timing_check(brief.duration_seconds);
        if !check.is_consistent() {
            warn!(
                shot_count = check.shot_count,
                shot_sum_seconds = check.shot_sum_seconds,
                requested_seconds = check.requested_seconds,
                "Generated shot list does not match the requested timing"
            );
        }

        info!(title = %result.title, shots = result.shots.len(), "Generated shot list");
        Ok(result)
    }

    /// Ask for a value for one field, in low-latency mode
    pub async fn suggest(&self, field: SuggestionField, language: Language) -> Result<SuggestionValue, PipelineError> {
        debug!(%field, %language, "suggest: called");
        let instruction = self
            .composer
            .compose_suggestion_instruction(field, language)
            .map_err(PipelineError::Compose)?;

        let contract = if field.is_structured() {
            OutputContract::DialogueLines
        } else {
            OutputContract::PlainText
        };
        let raw = self
            .client
            .execute(CompletionRequest::low_latency(instruction, contract))
            .await?;

        let value = if field.is_structured() {
            SuggestionValue::Dialogue(decode_dialogue(&raw).map_err(malformed)?)
        } else {
            SuggestionValue::Text(decode_text(&raw).map_err(malformed)?)
        };
        debug!(%field, "suggest: decoded");
        Ok(value)
    }

    /// Re-express a result's natural-language fields in another language
    pub async fn translate(&self, result: &GeneratedResult, language: Language) -> Result<GeneratedResult, PipelineError> {
        debug!(%language, title = %result.title, "translate: called");
        let instruction = self
            .composer
            .compose_translation_instruction(result, language)
            .map_err(PipelineError::Compose)?;

        let raw = self
            .client
            .execute(CompletionRequest::new(instruction, OutputContract::GeneratedResult))
            .await?;
        let translated = decode_result(&raw).map_err(malformed)?;

        if translated.shots.len() != result.shots.len() {
            warn!(
                original = result.shots.len(),
                translated = translated.shots.len(),
                "Translation changed the shot count"
            );
        }
        info!(%language, title = %translated.title, "Translated shot list");
        Ok(translated)
    }
}

/// Log the raw text of a decode failure; it is never shown to the user
fn malformed(err: DecodeError) -> PipelineError {
    warn!(reason = %err, raw = %err.raw(), "Malformed backend response");
    PipelineError::Malformed(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DialogueLine, fixtures::sample_result};
    use crate::llm::{ComputeMode, LlmError, ScriptedClient};

    fn pipeline(client: Arc<ScriptedClient>) -> Pipeline {
        Pipeline::new(client, PromptComposer::embedded_only())
    }

    #[tokio::test]
    async fn test_generate_decodes_fenced_result() {
        let result = sample_result("Skate Cat", 8);
        let raw = format!("```json\n{}\n```", serde_json::to_string(&result).unwrap());
        let client = Arc::new(ScriptedClient::texts([raw]));

        let generated = pipeline(client.clone())
            .generate(&Brief::default(), Language::En)
            .await
            .unwrap();

        assert_eq!(generated, result);
        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].contract, OutputContract::GeneratedResult);
        assert_eq!(requests[0].mode, ComputeMode::Full);
        assert!(requests[0].instruction.contains("exactly 10 shots"));
    }

    #[tokio::test]
    async fn test_generate_keeps_inconsistent_timing() {
        let mut result = sample_result("Short", 8);
        result.shots.truncate(4);
        let client = Arc::new(ScriptedClient::texts([serde_json::to_string(&result).unwrap()]));

        let generated = pipeline(client).generate(&Brief::default(), Language::En).await.unwrap();
        assert_eq!(generated.shots.len(), 4);
    }

    #[tokio::test]
    async fn test_generate_surfaces_backend_failure() {
        let client = Arc::new(ScriptedClient::new(vec![Err(LlmError::Backend {
            status: 503,
            message: "overloaded".to_string(),
        })]));
        let err = pipeline(client).generate(&Brief::default(), Language::Ko).await.unwrap_err();
        assert!(matches!(err, PipelineError::Llm(LlmError::Backend { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_generate_malformed() {
        let client = Arc::new(ScriptedClient::texts(["Sorry, I cannot help with that."]));
        let err = pipeline(client).generate(&Brief::default(), Language::En).await.unwrap_err();
        assert!(matches!(err, PipelineError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_suggest_text_uses_low_latency() {
        let client = Arc::new(ScriptedClient::texts(["\"Streets of Neo-Seoul at night\"\n"]));
        let value = pipeline(client.clone())
            .suggest(SuggestionField::Setting, Language::En)
            .await
            .unwrap();

        assert_eq!(value, SuggestionValue::Text("Streets of Neo-Seoul at night".to_string()));
        let request = &client.requests()[0];
        assert_eq!(request.mode, ComputeMode::LowLatency);
        assert_eq!(request.contract, OutputContract::PlainText);
    }

    #[tokio::test]
    async fn test_suggest_dialogue() {
        let client = Arc::new(ScriptedClient::texts([
            r#"[{"speaker":"Mina","line":"Ready?"},{"speaker":"Jun","line":"Go!"}]"#,
        ]));
        let value = pipeline(client.clone())
            .suggest(SuggestionField::Dialogue, Language::En)
            .await
            .unwrap();

        assert_eq!(
            value,
            SuggestionValue::Dialogue(vec![DialogueLine::new("Mina", "Ready?"), DialogueLine::new("Jun", "Go!")])
        );
        assert_eq!(client.requests()[0].contract, OutputContract::DialogueLines);
    }

    #[tokio::test]
    async fn test_translate_reuses_result_contract() {
        let original = sample_result("Skate Cat", 8);
        let mut translated = original.clone();
        translated.title = "스케이트 고양이".to_string();
        let client = Arc::new(ScriptedClient::texts([serde_json::to_string(&translated).unwrap()]));

        let out = pipeline(client.clone()).translate(&original, Language::Ko).await.unwrap();
        assert_eq!(out.title, "스케이트 고양이");
        assert_eq!(out.shots, original.shots);

        let request = &client.requests()[0];
        assert_eq!(request.contract, OutputContract::GeneratedResult);
        assert!(request.instruction.contains("Skate Cat"));
    }
}
