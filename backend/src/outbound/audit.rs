//! Audit sink writing events to the structured `audit` tracing target.
//!
//! Deployments route the target to durable storage through the subscriber
//! configuration, keeping the domain unaware of where audit records land.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{AuditEvent, AuditSink, AuditSinkError};

/// Tracing target used for audit records.
pub const AUDIT_TARGET: &str = "audit";

/// Emits each audit event as one structured `info` record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: &AuditEvent) -> Result<(), AuditSinkError> {
        let trace_id = event
            .trace_id
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        info!(
            target: AUDIT_TARGET,
            event = event.kind.code(),
            module = event.module,
            actor = %event.actor,
            context = %event.context,
            trace_id = %trace_id,
            "{}",
            event.message
        );
        Ok(())
    }
}
