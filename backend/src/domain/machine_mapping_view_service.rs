//! Read path listing the users mapped to the current machine.
//!
//! Resolves the host's machine identifier, confirms the machine is registered
//! to a station and center, then joins each mapped user's role grants and
//! mapping status into [`MappedUserView`] rows.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::ports::{
    AuditEvent, AuditEventKind, AuditSink, MachineIdentifierProvider, MachineMappingQuery,
    MappingRepository, MappingRepositoryError,
};
use crate::domain::{
    CenterId, ErrorResponse, MachineId, MappedUserView, NO_RECORDS_FOUND_MESSAGE,
    RegistrationUserDetail, ResponseCode, ResponseEnvelope, StationId, SuccessResponse,
    UNABLE_TO_FETCH_USER_DATA_MESSAGE, USER_DATA_FETCHED_MESSAGE,
};

fn map_repository_error(error: MappingRepositoryError) -> ErrorResponse {
    if error.is_fatal() {
        warn!(%error, "mapped user lookup failed");
        return ErrorResponse::new(ResponseCode::LookupFailed, UNABLE_TO_FETCH_USER_DATA_MESSAGE);
    }
    debug!(%error, "mapped user lookup rejected");
    ErrorResponse::new(ResponseCode::LookupFailed, error.to_string())
}

fn no_records_found() -> ErrorResponse {
    ErrorResponse::new(ResponseCode::NoRecordsFound, NO_RECORDS_FOUND_MESSAGE)
}

fn to_view_row(
    user: RegistrationUserDetail,
    machine_id: &MachineId,
    station_id: &StationId,
    center_id: &CenterId,
) -> Option<MappedUserView> {
    let Some(status) = user.mapping_for(machine_id).map(|mapping| mapping.status()) else {
        debug!(user = %user.id, machine = %machine_id, "user has no mapping onto machine; skipped");
        return None;
    };
    let role_codes = user.role_codes().cloned().collect();
    Some(MappedUserView {
        user_id: user.id,
        user_name: user.name,
        center_id: center_id.clone(),
        station_id: station_id.clone(),
        machine_id: machine_id.clone(),
        role_codes,
        status,
    })
}

/// Mapping service implementing the [`MachineMappingQuery`] driving port.
#[derive(Clone)]
pub struct MachineMappingQueryService<P, R, A> {
    machine_identifier: Arc<P>,
    mapping_repo: Arc<R>,
    audit_sink: Arc<A>,
}

impl<P, R, A> MachineMappingQueryService<P, R, A> {
    /// Create a new query service.
    pub fn new(machine_identifier: Arc<P>, mapping_repo: Arc<R>, audit_sink: Arc<A>) -> Self {
        Self {
            machine_identifier,
            mapping_repo,
            audit_sink,
        }
    }
}

impl<P, R, A> MachineMappingQueryService<P, R, A>
where
    P: MachineIdentifierProvider,
    R: MappingRepository,
    A: AuditSink,
{
    async fn mapped_users(&self) -> Result<(MachineId, Vec<MappedUserView>), ErrorResponse> {
        let machine_id = self.machine_identifier.current().await.map_err(|error| {
            warn!(%error, "machine identifier lookup failed");
            ErrorResponse::new(ResponseCode::LookupFailed, error.to_string())
        })?;

        let station_id = self
            .mapping_repo
            .get_station_id(&machine_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(no_records_found)?;
        let center_id = self
            .mapping_repo
            .get_center_id(&machine_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(no_records_found)?;
        let users = self
            .mapping_repo
            .get_users(&machine_id)
            .await
            .map_err(map_repository_error)?;

        let rows = users
            .into_iter()
            .filter_map(|user| to_view_row(user, &machine_id, &station_id, &center_id))
            .collect();
        Ok((machine_id, rows))
    }

    async fn audit_view(&self, machine_id: &MachineId, user_count: usize) {
        let event = AuditEvent::machine_mapping(
            AuditEventKind::MachineMappingViewed,
            machine_id.as_str(),
            machine_id.as_str(),
            format!("listed {user_count} mapped users"),
        );
        if let Err(error) = self.audit_sink.record(&event).await {
            warn!(%error, machine = %machine_id, "machine mapping audit event dropped");
        }
    }
}

#[async_trait]
impl<P, R, A> MachineMappingQuery for MachineMappingQueryService<P, R, A>
where
    P: MachineIdentifierProvider,
    R: MappingRepository,
    A: AuditSink,
{
    async fn view(&self) -> ResponseEnvelope {
        match self.mapped_users().await {
            Ok((machine_id, users)) => {
                debug!(machine = %machine_id, users = users.len(), "mapped users fetched");
                self.audit_view(&machine_id, users.len()).await;
                ResponseEnvelope::success(
                    SuccessResponse::new(ResponseCode::UsersFetched, USER_DATA_FETCHED_MESSAGE)
                        .with_users(users),
                )
            }
            Err(error) => ResponseEnvelope::error(error),
        }
    }
}

#[cfg(test)]
#[path = "machine_mapping_view_service_tests.rs"]
mod tests;
