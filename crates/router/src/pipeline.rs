//! The routing orchestrator.

use crate::attacher::ResourceAttacher;
use crate::catalog::CandidateCatalog;
use crate::classifier::{Classifier, DEFAULT_TIMEOUT};
use crate::parser::{HeuristicParser, SelectionParser, SelectionResult};
use crate::prompt::{DEFAULT_HISTORY_WINDOW, PromptBuilder};
use crate::status::{StatusPhase, StatusReporter};
use knowroute_config::{AppConfig, RouterConfig};
use knowroute_core::error::IdentityError;
use knowroute_core::event::EventSink;
use knowroute_core::identity::{Identity, UserDirectory};
use knowroute_core::knowledge::KnowledgeStore;
use knowroute_core::message::{Message, last_user_message};
use knowroute_core::payload::ConversationPayload;
use knowroute_core::provider::Provider;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

/// Per-invocation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RouterOptions {
    /// Emit status events
    pub status: bool,
    pub history_window: usize,
    /// Classify with this model instead of the payload's
    pub classifier_model: Option<String>,
    /// Used when neither `classifier_model` nor the payload names a model
    pub default_model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
    /// Inserted as the first message once routing finishes
    pub context_message: Option<String>,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            status: true,
            history_window: DEFAULT_HISTORY_WINDOW,
            classifier_model: None,
            default_model: None,
            temperature: None,
            max_tokens: None,
            timeout: DEFAULT_TIMEOUT,
            context_message: None,
        }
    }
}

impl From<&RouterConfig> for RouterOptions {
    fn from(config: &RouterConfig) -> Self {
        Self {
            status: config.status,
            history_window: config.history_window,
            classifier_model: config.classifier_model.clone(),
            default_model: None,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.timeout_secs),
            context_message: config.context_message.clone(),
        }
    }
}

/// Router settings plus the configured provider's default model.
impl From<&AppConfig> for RouterOptions {
    fn from(config: &AppConfig) -> Self {
        let default_model = config
            .providers
            .get(&config.default_provider)
            .and_then(|p| p.default_model.clone())
            .unwrap_or_else(|| config.default_model.clone());
        Self {
            default_model: Some(default_model),
            ..Self::from(&config.router)
        }
    }
}

impl RouterOptions {
    /// Model for the classification call: `classifier_model`, then the
    /// payload's model, then `default_model`.
    pub fn classification_model<'a>(&'a self, payload_model: &'a str) -> &'a str {
        if let Some(model) = self.classifier_model.as_deref() {
            return model;
        }
        if !payload_model.trim().is_empty() {
            return payload_model;
        }
        self.default_model.as_deref().unwrap_or(payload_model)
    }
}

/// How a turn was routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Matched { id: String, name: String },
    NoMatch,
    /// A collaborator failed; nothing was attached
    Degraded { reason: String },
}

impl RouteDecision {
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteOutcome {
    pub payload: ConversationPayload,
    pub decision: RouteDecision,
}

/// The only failure that aborts an invocation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RouteError {
    #[error("Cannot route without an identity: {0}")]
    Identity(#[from] IdentityError),
}

/// Routes one conversation turn to at most one knowledge collection.
///
/// Holds only shared handles; one instance serves concurrent invocations.
pub struct KnowledgeRouter {
    provider: Arc<dyn Provider>,
    catalog: CandidateCatalog,
    attacher: ResourceAttacher,
    events: Arc<dyn EventSink>,
    parser: Arc<dyn SelectionParser>,
}

impl KnowledgeRouter {
    pub fn new(
        provider: Arc<dyn Provider>,
        store: Arc<dyn KnowledgeStore>,
        users: Arc<dyn UserDirectory>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            provider,
            catalog: CandidateCatalog::new(store.clone(), users),
            attacher: ResourceAttacher::new(store),
            events,
            parser: Arc::new(HeuristicParser::new()),
        }
    }

    /// Replace the default heuristic parser.
    pub fn with_parser(mut self, parser: Arc<dyn SelectionParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn parser_name(&self) -> &str {
        self.parser.name()
    }

    /// Route one turn.
    ///
    /// Only an identity failure is an error. Every other failure is reported
    /// through the status channel and the payload comes back without an
    /// attachment.
    pub async fn route(
        &self,
        payload: ConversationPayload,
        user_id: Option<&str>,
        options: &RouterOptions,
    ) -> Result<RouteOutcome, RouteError> {
        let invocation_id = Uuid::new_v4();
        let span = info_span!("route", %invocation_id, model = %payload.model);
        self.run(payload, user_id, options).instrument(span).await
    }

    async fn run(
        &self,
        mut payload: ConversationPayload,
        user_id: Option<&str>,
        options: &RouterOptions,
    ) -> Result<RouteOutcome, RouteError> {
        let status = StatusReporter::new(self.events.clone(), options.status);
        status.report(StatusPhase::Searching).await;

        let identity = match self.catalog.resolve_identity(user_id).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(error = %e, "Identity resolution failed");
                status
                    .report(StatusPhase::Error {
                        message: e.to_string(),
                    })
                    .await;
                return Err(e.into());
            }
        };

        let decision = self.select_and_attach(&mut payload, &identity, options).await;

        match &decision {
            RouteDecision::Matched { name, .. } => {
                status
                    .report(StatusPhase::Matched { name: name.clone() })
                    .await;
            }
            RouteDecision::NoMatch => status.report(StatusPhase::NoMatch).await,
            RouteDecision::Degraded { reason } => {
                status
                    .report(StatusPhase::Error {
                        message: reason.clone(),
                    })
                    .await;
            }
        }

        if let Some(context) = &options.context_message {
            payload.messages.insert(0, Message::system(context));
        }

        info!(user_id = %identity.id, decision = ?decision, "Turn routed");
        Ok(RouteOutcome { payload, decision })
    }

    async fn select_and_attach(
        &self,
        payload: &mut ConversationPayload,
        identity: &Identity,
        options: &RouterOptions,
    ) -> RouteDecision {
        let Some(query) = last_user_message(&payload.messages).map(str::to_owned) else {
            debug!("No user message to route");
            return RouteDecision::NoMatch;
        };

        let candidates = match self.catalog.list(identity).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, "Candidate listing failed");
                return RouteDecision::Degraded {
                    reason: e.to_string(),
                };
            }
        };

        let prompt = PromptBuilder::new(options.history_window).build(
            &candidates,
            &payload.messages,
            &query,
        );

        let model = options.classification_model(&payload.model).to_string();

        let classifier = Classifier::new(self.provider.clone())
            .with_temperature(options.temperature)
            .with_max_tokens(options.max_tokens)
            .with_timeout(options.timeout);

        let raw = match classifier.complete(&prompt, &model, identity).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    provider = %classifier.provider_name(),
                    error = %e,
                    "Classifier call failed"
                );
                return RouteDecision::Degraded {
                    reason: e.to_string(),
                };
            }
        };

        let mut selection = self.parser.parse(&raw);
        debug!(parser = %self.parser.name(), selection = ?selection, "Completion parsed");

        if let SelectionResult::Selected(id) = &selection
            && !candidates.iter().any(|c| c.id == *id)
        {
            debug!(collection_id = %id, "Selected id was not offered as a candidate");
            selection = SelectionResult::NoSelection;
        }

        match self.attacher.attach(&selection, identity, payload).await {
            Ok(Some(summary)) => RouteDecision::Matched {
                id: summary.id,
                name: summary.name,
            },
            Ok(None) => RouteDecision::NoMatch,
            Err(e) => {
                warn!(error = %e, "Attaching the selected collection failed");
                RouteDecision::Degraded {
                    reason: e.to_string(),
                }
            }
        }
    }
}
