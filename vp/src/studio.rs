//! Studio - presentation-facing facade
//!
//! Owns the generation state a front end renders (current result, error
//! message, loading flag), the suggestion orchestrator, the history and the
//! translation cache. All methods take `&self`; state lives behind short
//! lock sections that are never held across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, error, info, warn};

use crate::clipboard::Clipboard;
use crate::domain::{Brief, GeneratedResult, Language, SuggestionField, SuggestionSink};
use crate::history::{History, HistoryEntry, HistoryError, HistoryRepository};
use crate::pipeline::{
    Pipeline, PipelineError, RefreshError, RefreshReport, RequestTracker, SuggestionOrchestrator, SuggestionOutcome,
    TranslationCache,
};

/// What a front end shows for the generation pipeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationState {
    pub result: Option<GeneratedResult>,
    /// Localized message; never contains backend text
    pub error: Option<String>,
    pub loading: bool,
}

/// Output tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputView {
    /// The overall prompt paragraph
    #[default]
    Prompt,
    /// The full structured result
    Json,
}

impl OutputView {
    pub fn render(&self, result: &GeneratedResult) -> String {
        match self {
            Self::Prompt => result.overall_prompt.clone(),
            Self::Json => result.to_pretty_json(),
        }
    }
}

impl std::fmt::Display for OutputView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prompt => write!(f, "prompt"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prompt" => Ok(Self::Prompt),
            "json" => Ok(Self::Json),
            other => Err(format!("Unknown view: '{}'. Expected prompt or json", other)),
        }
    }
}

/// The result currently on display
#[derive(Debug, Clone)]
struct Current {
    generation: u64,
    language: Language,
    result: GeneratedResult,
}

#[derive(Debug, Default)]
struct StudioState {
    current: Option<Current>,
    error: Option<String>,
    loading: bool,
}

pub struct Studio<R> {
    pipeline: Arc<Pipeline>,
    orchestrator: SuggestionOrchestrator,
    history: Mutex<History<R>>,
    state: Mutex<StudioState>,
    translations: Mutex<TranslationCache>,
    generations: RequestTracker<()>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|p| p.into_inner())
}

impl<R: HistoryRepository> Studio<R> {
    pub fn new(pipeline: Arc<Pipeline>, history: History<R>) -> Self {
        debug!(history = history.len(), "Studio::new: called");
        Self {
            orchestrator: SuggestionOrchestrator::new(pipeline.clone()),
            pipeline,
            history: Mutex::new(history),
            state: Mutex::new(StudioState::default()),
            translations: Mutex::new(TranslationCache::new()),
            generations: RequestTracker::new(),
        }
    }

    pub fn state(&self) -> GenerationState {
        let state = lock(&self.state);
        GenerationState {
            result: state.current.as_ref().map(|c| c.result.clone()),
            error: state.error.clone(),
            loading: state.loading,
        }
    }

    /// Generate a shot list and record it in the history
    ///
    /// A failure leaves no result on display, only the localized message.
    /// A resolution that a newer `generate` has superseded changes nothing.
    pub async fn generate(&self, brief: &Brief, language: Language) -> Result<GeneratedResult, PipelineError> {
        debug!(%language, "Studio::generate: called");
        let token = self.generations.begin(());
        {
            let mut state = lock(&self.state);
            state.loading = true;
            state.error = None;
            state.current = None;
        }
        lock(&self.translations).invalidate();

        let outcome = self.pipeline.generate(brief, language).await;

        if !self.generations.is_current(&token) {
            debug!(seq = token.seq, "Studio::generate: superseded, leaving state alone");
            return outcome;
        }

        match outcome {
            Ok(result) => {
                {
                    let mut state = lock(&self.state);
                    state.current = Some(Current {
                        generation: token.seq,
                        language,
                        result: result.clone(),
                    });
                    state.loading = false;
                }
                lock(&self.translations).reset(token.seq);
                if let Err(e) = lock(&self.history).record(brief.clone(), result.clone(), language) {
                    warn!(error = %e, "Generated result kept but history was not saved");
                }
                info!(title = %result.title, "Generation complete");
                Ok(result)
            }
            Err(e) => {
                error!(error = %e, "Generation failed");
                let mut state = lock(&self.state);
                state.error = Some(e.user_message(language).to_string());
                state.loading = false;
                Err(e)
            }
        }
    }

    /// The current result in `language`
    ///
    /// Translations are requested once per generation and language. When a
    /// translation fails the untranslated result is returned.
    pub async fn view(&self, language: Language) -> Option<GeneratedResult> {
        debug!(%language, "Studio::view: called");
        let current = lock(&self.state).current.clone()?;
        if current.language == language {
            return Some(current.result);
        }

        if let Some(hit) = lock(&self.translations).get(current.generation, language).cloned() {
            debug!(%language, "Studio::view: cached translation");
            return Some(hit);
        }

        match self.pipeline.translate(&current.result, language).await {
            Ok(translated) => {
                lock(&self.translations).insert(current.generation, language, translated.clone());
                Some(translated)
            }
            Err(e) => {
                warn!(error = %e, %language, "Translation failed, showing untranslated result");
                Some(current.result)
            }
        }
    }

    /// Render the current result in one of the output views
    pub async fn render(&self, view: OutputView, language: Language) -> Option<String> {
        self.view(language).await.map(|result| view.render(&result))
    }

    /// Copy a rendered view to the clipboard; false when nothing is on display
    pub async fn copy(&self, view: OutputView, language: Language, clipboard: &dyn Clipboard) -> bool {
        debug!(%view, "Studio::copy: called");
        match self.render(view, language).await {
            Some(text) => {
                clipboard.write(&text);
                true
            }
            None => false,
        }
    }

    /// Single-field suggestion; errors are returned for an inline indicator
    pub async fn suggest<S>(
        &self,
        field: SuggestionField,
        sink: &mut S,
        language: Language,
    ) -> Result<SuggestionOutcome, PipelineError>
    where
        S: SuggestionSink + Send + ?Sized,
    {
        self.orchestrator.suggest_one(field, sink, language).await
    }

    pub async fn refresh_all<S>(&self, sink: &mut S, language: Language) -> Result<RefreshReport, RefreshError>
    where
        S: SuggestionSink + Send + ?Sized,
    {
        self.orchestrator.refresh_all(sink, language).await
    }

    pub fn is_refreshing(&self) -> bool {
        self.orchestrator.is_refreshing()
    }

    /// History entries, newest first
    pub fn history(&self) -> Vec<HistoryEntry> {
        lock(&self.history).entries().to_vec()
    }

    /// Make a history entry current; returns it so its brief can be edited
    pub fn restore(&self, id: &str) -> Result<HistoryEntry, HistoryError> {
        debug!(%id, "Studio::restore: called");
        let entry = lock(&self.history).find(id)?.clone();
        let token = self.generations.begin(());
        {
            let mut state = lock(&self.state);
            state.current = Some(Current {
                generation: token.seq,
                language: entry.language,
                result: entry.result.clone(),
            });
            state.error = None;
            state.loading = false;
        }
        lock(&self.translations).reset(token.seq);
        info!(id = %entry.id, title = %entry.result.title, "Restored history entry");
        Ok(entry)
    }

    pub fn delete_history(&self, id: &str) -> Result<bool, HistoryError> {
        let mut history = lock(&self.history);
        let full_id = match history.find(id) {
            Ok(entry) => entry.id.clone(),
            Err(HistoryError::NotFound(_)) => return Ok(false),
            Err(e) => return Err(e),
        };
        history.remove(&full_id)
    }

    pub fn clear_history(&self) -> Result<(), HistoryError> {
        lock(&self.history).clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::domain::fixtures::sample_result;
    use crate::history::{MemoryStore, StoreHistoryRepository};
    use crate::llm::{LlmError, ScriptedClient};
    use crate::prompts::PromptComposer;
    use std::time::Duration;

    type MemoryStudio = Studio<StoreHistoryRepository<MemoryStore>>;

    fn studio(client: Arc<ScriptedClient>) -> MemoryStudio {
        let pipeline = Arc::new(Pipeline::new(client, PromptComposer::embedded_only()));
        Studio::new(pipeline, History::load(StoreHistoryRepository::new(MemoryStore::new())))
    }

    fn json(result: &GeneratedResult) -> String {
        serde_json::to_string(result).unwrap()
    }

    #[tokio::test]
    async fn test_generate_success_records_history() {
        let result = sample_result("Skate Cat", 8);
        let studio = studio(Arc::new(ScriptedClient::texts([json(&result)])));

        studio.generate(&Brief::default(), Language::En).await.unwrap();

        let state = studio.state();
        assert_eq!(state.result, Some(result.clone()));
        assert_eq!(state.error, None);
        assert!(!state.loading);
        let history = studio.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].result, result);
        assert_eq!(history[0].language, Language::En);
    }

    #[tokio::test]
    async fn test_generate_failure_shows_localized_message_only() {
        let client = Arc::new(ScriptedClient::new(vec![
            Ok(json(&sample_result("first", 8))),
            Err(LlmError::Backend {
                status: 500,
                message: "internal detail".to_string(),
            }),
        ]));
        let studio = studio(client);
        studio.generate(&Brief::default(), Language::Ko).await.unwrap();
        assert!(studio.generate(&Brief::default(), Language::Ko).await.is_err());

        let state = studio.state();
        assert_eq!(state.result, None);
        assert_eq!(state.error.as_deref(), Some(Language::Ko.messages().generation_failed));
        assert!(!state.error.unwrap().contains("internal detail"));
        assert_eq!(studio.history().len(), 1);
    }

    #[tokio::test]
    async fn test_loading_flag_while_in_flight() {
        let client = Arc::new(
            ScriptedClient::texts([json(&sample_result("slow", 8))]).with_delay(Duration::from_millis(20)),
        );
        let studio = studio(client);
        let brief = Brief::default();
        let (outcome, loading) = tokio::join!(studio.generate(&brief, Language::En), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            studio.state().loading
        });
        assert!(outcome.is_ok());
        assert!(loading);
        assert!(!studio.state().loading);
    }

    #[tokio::test]
    async fn test_older_generation_resolving_late_changes_nothing() {
        let client = Arc::new(
            ScriptedClient::texts([json(&sample_result("Older", 8)), json(&sample_result("Newer", 8))])
                .with_delays([Duration::from_millis(60), Duration::from_millis(5)]),
        );
        let studio = studio(client.clone());
        let brief = Brief::default();

        let (older, newer) = tokio::join!(studio.generate(&brief, Language::En), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            studio.generate(&brief, Language::Ko).await
        });

        assert_eq!(older.unwrap().title, "Older");
        assert_eq!(newer.unwrap().title, "Newer");

        let state = studio.state();
        assert_eq!(state.result.map(|r| r.title), Some("Newer".to_string()));
        assert_eq!(state.error, None);
        assert!(!state.loading);

        let history = studio.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].result.title, "Newer");

        // Still served in its own language without a translation call
        assert_eq!(studio.view(Language::Ko).await.unwrap().title, "Newer");
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_translation_cached_per_generation() {
        let original = sample_result("Skate Cat", 8);
        let mut translated = original.clone();
        translated.title = "스케이트 고양이".to_string();
        let client = Arc::new(ScriptedClient::texts([json(&original), json(&translated)]));
        let studio = studio(client.clone());

        studio.generate(&Brief::default(), Language::En).await.unwrap();
        assert_eq!(studio.view(Language::Ko).await.unwrap().title, "스케이트 고양이");
        assert_eq!(studio.view(Language::En).await.unwrap().title, "Skate Cat");
        assert_eq!(studio.view(Language::Ko).await.unwrap().title, "스케이트 고양이");
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_new_generation_invalidates_translation() {
        let first = sample_result("First", 8);
        let mut first_ko = first.clone();
        first_ko.title = "첫번째".to_string();
        let second = sample_result("Second", 8);
        let mut second_ko = second.clone();
        second_ko.title = "두번째".to_string();
        let client = Arc::new(ScriptedClient::texts([
            json(&first),
            json(&first_ko),
            json(&second),
            json(&second_ko),
        ]));
        let studio = studio(client.clone());

        studio.generate(&Brief::default(), Language::En).await.unwrap();
        assert_eq!(studio.view(Language::Ko).await.unwrap().title, "첫번째");
        studio.generate(&Brief::default(), Language::En).await.unwrap();
        assert_eq!(studio.view(Language::Ko).await.unwrap().title, "두번째");
        assert_eq!(client.call_count(), 4);
    }

    #[tokio::test]
    async fn test_translation_failure_keeps_untranslated() {
        let original = sample_result("Skate Cat", 8);
        let client = Arc::new(ScriptedClient::new(vec![
            Ok(json(&original)),
            Err(LlmError::EmptyResponse("blocked".to_string())),
        ]));
        let studio = studio(client);
        studio.generate(&Brief::default(), Language::En).await.unwrap();

        assert_eq!(studio.view(Language::Ko).await, Some(original));
        assert_eq!(studio.state().error, None);
    }

    #[tokio::test]
    async fn test_copy_views() {
        let result = sample_result("Skate Cat", 8);
        let studio = studio(Arc::new(ScriptedClient::texts([json(&result)])));
        let clipboard = MemoryClipboard::new();

        assert!(!studio.copy(OutputView::Prompt, Language::En, &clipboard).await);
        studio.generate(&Brief::default(), Language::En).await.unwrap();

        assert!(studio.copy(OutputView::Prompt, Language::En, &clipboard).await);
        assert_eq!(clipboard.last().unwrap(), result.overall_prompt);
        assert!(studio.copy(OutputView::Json, Language::En, &clipboard).await);
        assert_eq!(clipboard.last().unwrap(), result.to_pretty_json());
    }

    #[tokio::test]
    async fn test_restore_delete_clear() {
        let first = sample_result("First", 8);
        let second = sample_result("Second", 8);
        let studio = studio(Arc::new(ScriptedClient::texts([json(&first), json(&second)])));
        let brief = Brief {
            subject: "remembered".to_string(),
            ..Brief::default()
        };
        studio.generate(&brief, Language::En).await.unwrap();
        studio.generate(&Brief::default(), Language::En).await.unwrap();

        let older_id = studio.history()[1].id.clone();
        let restored = studio.restore(&older_id).unwrap();
        assert_eq!(restored.brief.subject, "remembered");
        assert_eq!(studio.state().result, Some(first));

        assert!(studio.delete_history(&older_id).unwrap());
        assert!(!studio.delete_history(&older_id).unwrap());
        assert_eq!(studio.history().len(), 1);

        studio.clear_history().unwrap();
        assert!(studio.history().is_empty());
        assert!(matches!(studio.restore(&older_id), Err(HistoryError::NotFound(_))));
    }

    #[test]
    fn test_output_view_parse() {
        assert_eq!("JSON".parse::<OutputView>().unwrap(), OutputView::Json);
        assert_eq!("prompt".parse::<OutputView>().unwrap(), OutputView::Prompt);
        assert!("table".parse::<OutputView>().is_err());
    }
}
