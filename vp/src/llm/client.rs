//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, LlmError};

/// Single opaque call boundary to the generative backend
///
/// Each call is independent: no conversation state is kept between calls,
/// and no call is retried here. Retry is a caller policy.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one instruction and return the backend's raw text
    async fn execute(&self, request: CompletionRequest) -> Result<String, LlmError>;
}

/// Scripted client for tests and offline runs
pub mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tracing::debug;

    use super::LlmClient;
    use crate::llm::{CompletionRequest, LlmError};

    /// Returns scripted outcomes in order and records every request
    pub struct ScriptedClient {
        outcomes: Mutex<VecDeque<Result<String, LlmError>>>,
        requests: Mutex<Vec<CompletionRequest>>,
        call_count: AtomicUsize,
        delay: Option<Duration>,
        delays: Vec<Duration>,
    }

    impl ScriptedClient {
        pub fn new(outcomes: Vec<Result<String, LlmError>>) -> Self {
            debug!(outcome_count = %outcomes.len(), "ScriptedClient::new: called");
            Self {
                outcomes: Mutex::new(outcomes.into()),
                requests: Mutex::new(Vec::new()),
                call_count: AtomicUsize::new(0),
                delay: None,
                delays: Vec::new(),
            }
        }

        /// Client that answers every call successfully with the given texts
        pub fn texts<I, S>(texts: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self::new(texts.into_iter().map(|t| Ok(t.into())).collect())
        }

        /// Suspend for `delay` before answering each call
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Suspend call `n` for `delays[n]`; later calls fall back to `with_delay`
        pub fn with_delays(mut self, delays: impl IntoIterator<Item = Duration>) -> Self {
            self.delays = delays.into_iter().collect();
            self
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        /// Every request seen so far, in call order
        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().map(|r| r.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn execute(&self, request: CompletionRequest) -> Result<String, LlmError> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            debug!(%idx, contract = ?request.contract, "ScriptedClient::execute: called");
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request);
            }

            // Outcomes are bound in call order, whenever the call resolves
            let next = self.outcomes.lock().ok().and_then(|mut o| o.pop_front());

            if let Some(delay) = self.delays.get(idx).copied().or(self.delay) {
                tokio::time::sleep(delay).await;
            }

            next.unwrap_or_else(|| {
                debug!("ScriptedClient::execute: no more scripted outcomes");
                Err(LlmError::EmptyResponse("No more scripted outcomes".to_string()))
            })
        }
    }

}
