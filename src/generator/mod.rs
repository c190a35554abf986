// Prompt construction and chat-completion generation

pub mod chat;
pub mod prompt;

pub use chat::ChatClient;
pub use prompt::{EMPTY_CONTEXT, Prompt, SYSTEM_INSTRUCTION, build_labeled_prompt, build_prompt};
