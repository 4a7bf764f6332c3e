//! Classification prompt construction.

use knowroute_core::knowledge::CandidateCollection;
use knowroute_core::message::Message;
use std::fmt::Write;

/// Default number of trailing turns quoted in the user prompt.
pub const DEFAULT_HISTORY_WINDOW: usize = 4;

const INSTRUCTION_HEAD: &str =
    "Based on the user's prompt, find the knowledge base the user is asking about.";

const INSTRUCTION_TAIL: &str = "\
Pick the single knowledge base from the list above that best fits the user's request.
Reply in JSON with exactly two fields, \"id\" (the knowledge base ID) and \"name\" (the knowledge base name), and nothing else.
If no knowledge base is suitable or relevant, do not pick one; reply with None.";

/// The two messages sent to the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationPrompt {
    pub system_text: String,
    pub user_text: String,
}

impl ClassificationPrompt {
    /// System message followed by the user message.
    pub fn to_messages(&self) -> Vec<Message> {
        vec![
            Message::system(&self.system_text),
            Message::user(&self.user_text),
        ]
    }
}

/// Renders candidates and recent history into a [`ClassificationPrompt`].
#[derive(Debug, Clone, Copy)]
pub struct PromptBuilder {
    history_window: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW)
    }
}

impl PromptBuilder {
    pub fn new(history_window: usize) -> Self {
        Self { history_window }
    }

    pub fn history_window(&self) -> usize {
        self.history_window
    }

    pub fn build(
        &self,
        candidates: &[CandidateCollection],
        history: &[Message],
        query: &str,
    ) -> ClassificationPrompt {
        ClassificationPrompt {
            system_text: system_text(candidates),
            user_text: self.user_text(history, query),
        }
    }

    /// `History:` block of the trailing turns, oldest first, then the query.
    fn user_text(&self, history: &[Message], query: &str) -> String {
        let start = history.len().saturating_sub(self.history_window);
        let turns: Vec<String> = history[start..]
            .iter()
            .map(|m| format!("{}: \"\"\"{}\"\"\"", m.role.label(), m.content))
            .collect();

        format!("History:\n{}\nQuery: {query}", turns.join("\n"))
    }
}

fn system_text(candidates: &[CandidateCollection]) -> String {
    let mut text = String::from(INSTRUCTION_HEAD);
    text.push_str("\nAvailable knowledge bases:\n");

    if candidates.is_empty() {
        text.push_str("(none)\n");
    } else {
        let entries: Vec<String> = candidates
            .iter()
            .map(|c| {
                let mut entry = String::new();
                let _ = writeln!(entry, "- ID: {}", c.id);
                let _ = writeln!(entry, " - Knowledge Base Name: {}", c.name);
                let _ = writeln!(entry, " - Description: {}", c.description);
                entry
            })
            .collect();
        text.push_str(&entries.join("\n"));
    }

    text.push_str(INSTRUCTION_TAIL);
    text
}
