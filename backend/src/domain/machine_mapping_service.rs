//! Save-or-update reconciliation for user-to-machine mappings.
//!
//! The service decides whether a request creates a new mapping or updates an
//! existing one, applies that decision through the repository port and turns
//! the result into a [`ResponseEnvelope`]. Storage failures are logged and
//! reported with a fixed message so infrastructure detail never reaches the
//! caller.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, warn};

use crate::domain::ports::{
    AuditEvent, AuditEventKind, AuditSink, MachineMappingCommand, MappingRepository,
    MappingRepositoryError,
};
use crate::domain::{
    ErrorResponse, MACHINE_MAPPED_MESSAGE, MachineMappingRequest, ResponseCode, ResponseEnvelope,
    SuccessResponse, UNABLE_TO_MAP_USER_MESSAGE, UserMachineMapping, ValidatedMappingRequest,
};

/// Which repository write a reconciliation performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reconciliation {
    Created,
    Updated,
}

impl Reconciliation {
    const fn verb(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }
}

/// Mapping service implementing the [`MachineMappingCommand`] driving port.
#[derive(Clone)]
pub struct MachineMappingCommandService<R, A> {
    mapping_repo: Arc<R>,
    audit_sink: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<R, A> MachineMappingCommandService<R, A> {
    /// Create a new service with its repository, audit sink and clock.
    pub fn new(mapping_repo: Arc<R>, audit_sink: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self {
            mapping_repo,
            audit_sink,
            clock,
        }
    }
}

impl<R, A> MachineMappingCommandService<R, A>
where
    R: MappingRepository,
    A: AuditSink,
{
    async fn reconcile(
        &self,
        request: &ValidatedMappingRequest,
    ) -> Result<Reconciliation, MappingRepositoryError> {
        let now = self.clock.utc();
        match self.mapping_repo.find_by_id(&request.key).await? {
            None => {
                let mapping = UserMachineMapping::new(
                    request.key.clone(),
                    request.status,
                    request.actor().clone(),
                    now,
                );
                self.mapping_repo.save(&mapping).await?;
                Ok(Reconciliation::Created)
            }
            Some(mut existing) => {
                existing.apply_status(request.status, request.actor().clone(), now);
                self.mapping_repo.update(&existing).await?;
                Ok(Reconciliation::Updated)
            }
        }
    }

    async fn audit_change(&self, request: &ValidatedMappingRequest, outcome: Reconciliation) {
        let event = AuditEvent::machine_mapping(
            AuditEventKind::MachineMappingChanged,
            request.actor().as_str(),
            request.key.to_string(),
            format!(
                "mapping {} as {} at station {} of center {}",
                outcome.verb(),
                request.status,
                request.station_id,
                request.center_id,
            ),
        );
        if let Err(error) = self.audit_sink.record(&event).await {
            warn!(%error, key = %request.key, "machine mapping audit event dropped");
        }
    }
}

#[async_trait]
impl<R, A> MachineMappingCommand for MachineMappingCommandService<R, A>
where
    R: MappingRepository,
    A: AuditSink,
{
    async fn save_or_update(&self, request: MachineMappingRequest) -> ResponseEnvelope {
        let validated = match request.validate() {
            Ok(validated) => validated,
            Err(error) => {
                debug!(%error, "machine mapping request rejected");
                return ResponseEnvelope::error(ErrorResponse::new(
                    ResponseCode::InvalidRequest,
                    error.to_string(),
                ));
            }
        };

        match self.reconcile(&validated).await {
            Ok(outcome) => {
                debug!(
                    key = %validated.key,
                    status = %validated.status,
                    outcome = outcome.verb(),
                    "machine mapping reconciled"
                );
                self.audit_change(&validated, outcome).await;
                ResponseEnvelope::success(SuccessResponse::new(
                    ResponseCode::MachineMapped,
                    MACHINE_MAPPED_MESSAGE,
                ))
            }
            Err(error) => {
                warn!(
                    %error,
                    fatal = error.is_fatal(),
                    key = %validated.key,
                    "machine mapping failed"
                );
                ResponseEnvelope::error(ErrorResponse::new(
                    ResponseCode::MappingFailed,
                    UNABLE_TO_MAP_USER_MESSAGE,
                ))
            }
        }
    }
}

#[cfg(test)]
#[path = "machine_mapping_service_tests.rs"]
mod tests;
