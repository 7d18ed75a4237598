use crate::sessions::ConversationTurn;
use std::future::Future;
use std::pin::Pin;

/// A text-completion backend.
pub trait CompletionBackend: Send + Sync {
    /// Backend identifier (e.g. "gemini").
    fn name(&self) -> &str;

    /// Model the backend queries.
    fn model(&self) -> &str;

    /// Label reported to callers in the `powered_by` response field.
    fn describe(&self) -> String {
        format!("{} {}", self.name(), self.model())
    }

    /// Produce one assistant reply for `message`, given the system prompt
    /// and a window of prior turns (oldest first, current message excluded).
    fn complete<'a>(
        &'a self,
        system_prompt: &'a str,
        history: &'a [ConversationTurn],
        message: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;
}
