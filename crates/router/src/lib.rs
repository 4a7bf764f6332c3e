//! The knowledge selection pipeline: the heart of KnowRoute.
//!
//! One invocation routes one conversation turn:
//!
//! 1. **Resolve** the requester and list the collections they may read
//! 2. **Build** a classification prompt from the candidates and recent history
//! 3. **Classify** with a single non-streaming completion
//! 4. **Parse** the raw answer into at most one collection id
//! 5. **Attach** the matched collection and its files to the payload
//!
//! Status events bracket the run. Every failure after step 1 degrades to
//! "no selection" and the payload is handed back intact.

pub mod attacher;
pub mod catalog;
pub mod classifier;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod status;

pub use attacher::{AttachedSummary, ResourceAttacher};
pub use catalog::CandidateCatalog;
pub use classifier::Classifier;
pub use parser::{HeuristicParser, ParseFailure, SelectionParser, SelectionResult};
pub use pipeline::{KnowledgeRouter, RouteDecision, RouteError, RouteOutcome, RouterOptions};
pub use prompt::{ClassificationPrompt, PromptBuilder};
pub use status::{StatusPhase, StatusReporter};

#[cfg(test)]
pub(crate) mod test_helpers;
