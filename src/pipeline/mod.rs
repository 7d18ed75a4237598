//! Conversation turn orchestration: detect, branch to escalation or the
//! completion backend, append to the session history, truncate.

pub mod audit;

pub use audit::{AuditSink, CrisisEvent, TracingAuditSink, TurnRecord};

use crate::crisis::{
    CRISIS_TAG, CrisisDetector, ResponseSegment, concatenated_crisis_text,
    crisis_response_sequence,
};
use crate::llm::{CompletionBackend, classify_backend_error, fallback_reply};
use crate::sessions::{ConversationTurn, SessionStore, TurnRole};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TurnError {
    #[error("message must not be empty")]
    EmptyMessage,
}

/// Which path produced the assistant reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplySource {
    CrisisProtocol,
    Backend(String),
    Fallback,
}

impl fmt::Display for ReplySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CrisisProtocol => f.write_str("Crisis Safety Protocol"),
            Self::Backend(label) => f.write_str(label),
            Self::Fallback => f.write_str("Fallback response"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub session_id: String,
    pub segments: Vec<ResponseSegment>,
    pub crisis_detected: bool,
    pub produced_by: ReplySource,
}

pub struct ChatPipeline {
    detector: CrisisDetector,
    backend: Arc<dyn CompletionBackend>,
    store: Arc<dyn SessionStore>,
    audit: Arc<dyn AuditSink>,
    system_prompt: String,
    context_turns: usize,
}

impl ChatPipeline {
    pub fn new(
        detector: CrisisDetector,
        backend: Arc<dyn CompletionBackend>,
        store: Arc<dyn SessionStore>,
        audit: Arc<dyn AuditSink>,
        system_prompt: String,
        context_turns: usize,
    ) -> Self {
        Self {
            detector,
            backend,
            store,
            audit,
            system_prompt,
            context_turns,
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn backend_label(&self) -> String {
        self.backend.describe()
    }

    /// Process one message end to end. Every message is evaluated
    /// independently: a crisis verdict does not persist to later turns.
    pub async fn handle_turn(
        &self,
        session_id: &str,
        raw_message: &str,
    ) -> Result<TurnOutcome, TurnError> {
        let message = raw_message.trim();
        if message.is_empty() {
            return Err(TurnError::EmptyMessage);
        }

        let detection = self.detector.detect(message);

        // The handle lock is held for the whole turn, including the backend
        // call, so concurrent requests for one session serialize.
        let handle = self.store.session(session_id);
        let mut history = handle.lock().await;

        if detection.is_crisis() {
            tracing::warn!(
                session = session_id,
                keywords = ?detection.matched_keywords,
                pattern = ?detection.matched_pattern,
                "crisis signals detected, activating safety protocol"
            );

            let segments = crisis_response_sequence();
            history.push(ConversationTurn::user(message));
            self.audit_turn(session_id, TurnRole::User, message, true);

            let assistant_text = format!("{CRISIS_TAG} {}", concatenated_crisis_text());
            history.push(ConversationTurn::assistant(assistant_text.clone()));
            self.audit_turn(session_id, TurnRole::Assistant, &assistant_text, true);

            if let Err(error) = self.audit.record_crisis(CrisisEvent {
                session_id: session_id.to_string(),
                matched_keywords: detection.matched_keywords,
                matched_pattern: detection.matched_pattern,
            }) {
                tracing::error!(session = session_id, "crisis audit sink failed: {error:#}");
            }

            return Ok(TurnOutcome {
                session_id: session_id.to_string(),
                segments,
                crisis_detected: true,
                produced_by: ReplySource::CrisisProtocol,
            });
        }

        history.push(ConversationTurn::user(message));
        self.audit_turn(session_id, TurnRole::User, message, false);

        // Context window: the most recent prior turns, excluding the user
        // turn just appended (the backend receives it separately).
        let turns = history.turns();
        let prior = &turns[..turns.len() - 1];
        let start = prior.len().saturating_sub(self.context_turns);
        let context = prior[start..].to_vec();

        let (reply, produced_by) = match self
            .backend
            .complete(&self.system_prompt, &context, message)
            .await
        {
            Ok(text) if !text.trim().is_empty() => {
                let label = self.backend.describe();
                (ResponseSegment::standard(text), ReplySource::Backend(label))
            }
            Ok(_) => {
                tracing::warn!(session = session_id, "backend returned an empty reply");
                (
                    ResponseSegment::fallback(fallback_reply(message)),
                    ReplySource::Fallback,
                )
            }
            Err(error) => {
                let category = classify_backend_error(&error);
                tracing::error!(
                    session = session_id,
                    category = category.as_str(),
                    "backend call failed, substituting fallback reply: {error:#}"
                );
                (
                    ResponseSegment::fallback(fallback_reply(message)),
                    ReplySource::Fallback,
                )
            }
        };

        history.push(ConversationTurn::assistant(reply.content.clone()));
        self.audit_turn(session_id, TurnRole::Assistant, &reply.content, false);

        Ok(TurnOutcome {
            session_id: session_id.to_string(),
            segments: vec![reply],
            crisis_detected: false,
            produced_by,
        })
    }

    fn audit_turn(&self, session_id: &str, role: TurnRole, content: &str, crisis: bool) {
        if let Err(error) = self.audit.record_turn(TurnRecord {
            session_id: session_id.to_string(),
            role,
            content: content.to_string(),
            crisis,
        }) {
            tracing::error!(session = session_id, "turn audit sink failed: {error:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ReplySource;

    #[test]
    fn reply_source_labels() {
        assert_eq!(ReplySource::CrisisProtocol.to_string(), "Crisis Safety Protocol");
        assert_eq!(
            ReplySource::Backend("Google gemini-1.5-flash".into()).to_string(),
            "Google gemini-1.5-flash"
        );
        assert_eq!(ReplySource::Fallback.to_string(), "Fallback response");
    }
}
