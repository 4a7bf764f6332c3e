//! Lifecycle notifications for a routing invocation.

use knowroute_core::event::{EventSink, NullSink, StatusEvent};
use std::sync::Arc;
use tracing::warn;

/// Where the pipeline is, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusPhase {
    Searching,
    Matched { name: String },
    NoMatch,
    Error { message: String },
}

impl StatusPhase {
    pub fn description(&self) -> String {
        match self {
            Self::Searching => "Searching for appropriate knowledge bases...".into(),
            Self::Matched { name } => format!("Matching knowledge base found: {name}"),
            Self::NoMatch => "No matching knowledge base found.".into(),
            Self::Error { message } => {
                format!("Error occurred while processing the request: {message}")
            }
        }
    }

    /// Every phase but `Searching` ends the invocation.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Searching)
    }

    pub fn to_event(&self) -> StatusEvent {
        StatusEvent::status(self.description(), self.is_terminal())
    }
}

/// Fire-and-forget status publisher.
#[derive(Clone)]
pub struct StatusReporter {
    sink: Arc<dyn EventSink>,
    enabled: bool,
}

impl StatusReporter {
    pub fn new(sink: Arc<dyn EventSink>, enabled: bool) -> Self {
        Self { sink, enabled }
    }

    /// A reporter that never emits.
    pub fn disabled() -> Self {
        Self::new(Arc::new(NullSink), false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Publish `phase`. Delivery failures are logged and dropped.
    pub async fn report(&self, phase: StatusPhase) {
        if !self.enabled {
            return;
        }
        if let Err(e) = self.sink.emit(phase.to_event()).await {
            warn!(error = %e, phase = ?phase, "Status notification dropped");
        }
    }
}
