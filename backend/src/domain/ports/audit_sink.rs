//! Port for recording audit events raised by mapping operations.
//!
//! Auditing is fire-and-forget from the domain's point of view: services log
//! a failed write and carry on, so a broken sink never changes the response
//! returned to the caller.

use std::fmt;

use async_trait::async_trait;

use crate::domain::TraceId;

use super::define_port_error;

/// Application module tag attached to every mapping audit event.
pub const MACHINE_MAPPING_MODULE: &str = "MACHINE_MAPPING";

define_port_error! {
    /// Errors exposed when writing audit events.
    pub enum AuditSinkError {
        /// The audit backend rejected the write.
        Write { message: String } => "audit sink write failed: {message}",
    }
}

/// Kind of auditable action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditEventKind {
    /// A mapping was created, updated, or deactivated.
    MachineMappingChanged,
    /// Mapped users of a machine were listed.
    MachineMappingViewed,
}

impl AuditEventKind {
    /// Stable event code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MachineMappingChanged => "MACHINE_MAPPING_CHANGED",
            Self::MachineMappingViewed => "MACHINE_MAPPING_VIEWED",
        }
    }
}

impl fmt::Display for AuditEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Auditable event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub kind: AuditEventKind,
    pub module: &'static str,
    /// Identifier of whoever triggered the event.
    pub actor: String,
    /// Record the event refers to, for example a mapping key.
    pub context: String,
    pub message: String,
    /// Trace identifier in scope when the event was raised.
    pub trace_id: Option<TraceId>,
}

impl AuditEvent {
    /// Build a mapping-module event, capturing the ambient trace identifier.
    pub fn machine_mapping(
        kind: AuditEventKind,
        actor: impl Into<String>,
        context: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            module: MACHINE_MAPPING_MODULE,
            actor: actor.into(),
            context: context.into(),
            message: message.into(),
            trace_id: TraceId::current(),
        }
    }
}

/// Audit recording port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Record one event.
    async fn record(&self, event: &AuditEvent) -> Result<(), AuditSinkError>;
}

/// No-op implementation for when auditing is disabled or in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpAuditSink;

#[async_trait]
impl AuditSink for NoOpAuditSink {
    async fn record(&self, _event: &AuditEvent) -> Result<(), AuditSinkError> {
        Ok(())
    }
}
