#[cfg(test)]
mod tests;

use std::fmt;

pub const SYSTEM_INSTRUCTION: &str = "You are a concise analyst. Use ONLY the provided context when answering. \
     If the context is insufficient, say so explicitly.";

/// Stands in for the context blob when retrieval found nothing
pub const EMPTY_CONTEXT: &str = "(no context retrieved)";

pub const DEFAULT_CONTEXT_LABEL: &str = "Context";

const ANSWER_GUIDANCE: &str = "Answer with dates and numbers when possible.";

/// A system + user message pair, built fresh for every question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    /// Copy-ready block for pasting into any chat model
    #[inline]
    pub fn render(&self) -> String {
        format!("### SYSTEM\n{}\n\n### USER\n{}", self.system, self.user)
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[inline]
pub fn build_prompt(question: &str, context: &str) -> Prompt {
    build_labeled_prompt(question, context, DEFAULT_CONTEXT_LABEL)
}

/// Like [`build_prompt`] with a custom heading for the context section
#[inline]
pub fn build_labeled_prompt(question: &str, context: &str, label: &str) -> Prompt {
    let context = if context.trim().is_empty() {
        EMPTY_CONTEXT
    } else {
        context
    };

    Prompt {
        system: SYSTEM_INSTRUCTION.to_string(),
        user: format!("Question: {question}\n\n{label}:\n{context}\n\n{ANSWER_GUIDANCE}"),
    }
}
