//! Audit sink - outbound channel for audit events.
//!
//! Application operations emit exactly one event per logical operation,
//! after the business transaction resolves. The channel is best-effort: a
//! sink failure is logged as a warning and never rolls back or fails the
//! operation, and the event is never written inside the business
//! transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde::Serialize;
use uuid::Uuid;

use super::repositories::entities::audit_log;
use crate::errors::{AppError, AppResult};

/// Result of the audited operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    Success,
    Failure,
}

impl std::fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditOutcome::Success => write!(f, "success"),
            AuditOutcome::Failure => write!(f, "failure"),
        }
    }
}

impl AuditOutcome {
    /// Outcome of an already-resolved operation result.
    pub fn from_result<T, E>(result: &Result<T, E>) -> Self {
        if result.is_ok() {
            AuditOutcome::Success
        } else {
            AuditOutcome::Failure
        }
    }
}

/// Immutable record of who did what to which aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub actor_id: Uuid,
    /// Dotted action name, e.g. "account.create"
    pub action: String,
    pub aggregate_type: String,
    pub aggregate_id: Uuid,
    pub outcome: AuditOutcome,
    /// State before the change, for operations that mutate existing data
    pub before: Option<serde_json::Value>,
    /// State after the change, for operations that leave data behind
    pub after: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        actor_id: Uuid,
        action: impl Into<String>,
        aggregate_type: impl Into<String>,
        aggregate_id: Uuid,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            actor_id,
            action: action.into(),
            aggregate_type: aggregate_type.into(),
            aggregate_id,
            outcome,
            before: None,
            after: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_before<T: Serialize>(mut self, before: &T) -> Self {
        self.before = serde_json::to_value(before).ok();
        self
    }

    pub fn with_after<T: Serialize>(mut self, after: &T) -> Self {
        self.after = serde_json::to_value(after).ok();
        self
    }
}

/// Outbound audit channel.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent) -> AppResult<()>;
}

/// Emit an event without letting a sink failure surface.
///
/// The one place the best-effort policy lives: callers fire and forget,
/// failures end up in the operational log.
pub async fn emit(sink: &dyn AuditSink, event: AuditEvent) {
    let action = event.action.clone();
    if let Err(e) = sink.record(event).await {
        tracing::warn!(action = %action, error = %e, "Audit record dropped");
    }
}

/// Sink that writes structured audit lines to the operational log.
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: AuditEvent) -> AppResult<()> {
        tracing::info!(
            target: "audit",
            actor_id = %event.actor_id,
            action = %event.action,
            aggregate_type = %event.aggregate_type,
            aggregate_id = %event.aggregate_id,
            outcome = %event.outcome,
            timestamp = %event.timestamp,
            "audit event"
        );
        Ok(())
    }
}

/// Sink that appends events to the `audit_log` table.
///
/// Uses its own pooled connection, never the business transaction: an audit
/// row must not hold the operation's scope open, and an audit failure must
/// not roll the operation back.
pub struct DbAuditSink {
    db: DatabaseConnection,
}

impl DbAuditSink {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditSink for DbAuditSink {
    async fn record(&self, event: AuditEvent) -> AppResult<()> {
        let row = audit_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            actor_id: Set(event.actor_id),
            action: Set(event.action),
            aggregate_type: Set(event.aggregate_type),
            aggregate_id: Set(event.aggregate_id),
            outcome: Set(event.outcome.to_string()),
            before: Set(event.before.map(|v| v.to_string())),
            after: Set(event.after.map(|v| v.to_string())),
            recorded_at: Set(event.timestamp),
        };

        row.insert(&self.db).await.map_err(AppError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emit_swallows_sink_failures() {
        let mut sink = MockAuditSink::new();
        sink.expect_record()
            .returning(|_| Err(AppError::infrastructure("sink down")));

        let event = AuditEvent::new(
            Uuid::new_v4(),
            "account.create",
            "account",
            Uuid::new_v4(),
            AuditOutcome::Success,
        );

        // Must not panic or propagate
        emit(&sink, event).await;
    }

    #[tokio::test]
    async fn emit_forwards_event_once() {
        let mut sink = MockAuditSink::new();
        sink.expect_record().times(1).returning(|_| Ok(()));

        let event = AuditEvent::new(
            Uuid::new_v4(),
            "card.soft_delete",
            "card",
            Uuid::new_v4(),
            AuditOutcome::Failure,
        );
        emit(&sink, event).await;
    }
}
