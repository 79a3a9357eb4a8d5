pub mod completion;
pub mod metrics;
pub mod prompt;

pub use completion::{ChatMessage, ChatRole, CompletionClient, CompletionError};
