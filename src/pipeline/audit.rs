use crate::sessions::TurnRole;
use anyhow::Result;

/// One appended turn, emitted as data for the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRecord {
    pub session_id: String,
    pub role: TurnRole,
    pub content: String,
    pub crisis: bool,
}

/// A positive detection, with the rules that fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrisisEvent {
    pub session_id: String,
    pub matched_keywords: Vec<String>,
    pub matched_pattern: Option<String>,
}

/// Boundary to whatever stores conversation and crisis data. The pipeline
/// only emits; sink failures are logged by the caller and never block a
/// response that has already been computed.
pub trait AuditSink: Send + Sync {
    fn record_turn(&self, record: TurnRecord) -> Result<()>;
    fn record_crisis(&self, event: CrisisEvent) -> Result<()>;
}

/// Default sink: structured log events only. Message bodies are not logged,
/// just their size.
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record_turn(&self, record: TurnRecord) -> Result<()> {
        tracing::info!(
            session = %record.session_id,
            role = ?record.role,
            crisis = record.crisis,
            chars = record.content.chars().count(),
            "conversation turn recorded"
        );
        Ok(())
    }

    fn record_crisis(&self, event: CrisisEvent) -> Result<()> {
        tracing::warn!(
            session = %event.session_id,
            keywords = ?event.matched_keywords,
            pattern = ?event.matched_pattern,
            "crisis event recorded"
        );
        Ok(())
    }
}
