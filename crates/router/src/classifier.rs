//! The classifier: one non-streaming completion per routing invocation.
//!
//! This is the only place the pipeline waits on the network. Every failure
//! comes back as a [`ProviderError`]; the caller decides to degrade.

use crate::prompt::ClassificationPrompt;
use knowroute_core::error::ProviderError;
use knowroute_core::identity::Identity;
use knowroute_core::provider::{Provider, ProviderRequest};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default upper bound on a classification call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Sends classification prompts to a [`Provider`].
pub struct Classifier {
    provider: Arc<dyn Provider>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout: Duration,
}

impl Classifier {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            temperature: None,
            max_tokens: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Run one completion and return its raw text.
    ///
    /// The requester's id is forwarded on the request for attribution.
    pub async fn complete(
        &self,
        prompt: &ClassificationPrompt,
        model: &str,
        identity: &Identity,
    ) -> Result<String, ProviderError> {
        let request = ProviderRequest {
            model: model.to_string(),
            messages: prompt.to_messages(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
            user: Some(identity.id.clone()),
        };

        debug!(
            provider = %self.provider.name(),
            model,
            timeout_secs = self.timeout.as_secs(),
            "Classifying query"
        );

        let response = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| {
                ProviderError::Timeout(format!(
                    "classification exceeded {}s",
                    self.timeout.as_secs()
                ))
            })??;

        debug!(
            responded_model = %response.model,
            chars = response.message.content.len(),
            "Classifier answered"
        );

        Ok(response.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::PromptBuilder;
    use crate::test_helpers::{FailingProvider, ScriptedProvider, SlowProvider};

    fn prompt() -> ClassificationPrompt {
        PromptBuilder::default().build(&[], &[], "where is the vacation policy?")
    }

    #[tokio::test]
    async fn returns_completion_text() {
        let provider = Arc::new(ScriptedProvider::single(r#"{"id": "kb-1"}"#));
        let classifier = Classifier::new(provider.clone());

        let raw = classifier
            .complete(&prompt(), "gpt-4o-mini", &Identity::user("u-1", "Ada"))
            .await
            .unwrap();
        assert_eq!(raw, r#"{"id": "kb-1"}"#);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn sends_single_non_streaming_request() {
        let provider = Arc::new(ScriptedProvider::single("None"));
        let classifier = Classifier::new(provider.clone())
            .with_temperature(Some(0.0))
            .with_max_tokens(Some(50));

        classifier
            .complete(&prompt(), "llama3.1", &Identity::user("u-7", ""))
            .await
            .unwrap();

        let request = provider.last_request().unwrap();
        assert!(!request.stream);
        assert_eq!(request.model, "llama3.1");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.user.as_deref(), Some("u-7"));
        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.max_tokens, Some(50));
    }

    #[tokio::test]
    async fn transport_failure_is_returned() {
        let classifier = Classifier::new(Arc::new(FailingProvider::network("connection refused")));
        let err = classifier
            .complete(&prompt(), "m", &Identity::user("u-1", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Network(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out() {
        let classifier = Classifier::new(Arc::new(SlowProvider::new(Duration::from_secs(300))))
            .with_timeout(Duration::from_secs(5));
        let err = classifier
            .complete(&prompt(), "m", &Identity::user("u-1", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(_)));
    }
}
