//! Inbound request to create or update a user-to-machine mapping.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    CenterId, IdentifierValidationError, MachineId, MachineMappingKey, MappingStatus, RoleCode,
    StationId, UnknownMappingStatus, UserId,
};

/// Raw mapping request as submitted by a registration client.
///
/// Every field is required. `status` must be `ACTIVE` or `IN-ACTIVE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineMappingRequest {
    pub user_id: String,
    pub user_name: String,
    pub role: String,
    pub status: String,
    pub center_id: String,
    pub station_id: String,
    pub machine_id: String,
}

/// Reasons a [`MachineMappingRequest`] is rejected before reaching storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingRequestError {
    /// A free-text field was blank.
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    /// An identifier field failed validation.
    #[error("invalid {field}: {source}")]
    InvalidIdentifier {
        field: &'static str,
        #[source]
        source: IdentifierValidationError,
    },
    /// The status label is not recognised.
    #[error(transparent)]
    Status(#[from] UnknownMappingStatus),
}

/// Request whose fields have passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedMappingRequest {
    pub key: MachineMappingKey,
    pub user_name: String,
    pub role: RoleCode,
    pub status: MappingStatus,
    pub center_id: CenterId,
    pub station_id: StationId,
}

impl ValidatedMappingRequest {
    /// User performing the change.
    #[must_use]
    pub fn actor(&self) -> &UserId {
        self.key.user_id()
    }
}

fn identifier<T>(
    field: &'static str,
    raw: &str,
    build: impl FnOnce(String) -> Result<T, IdentifierValidationError>,
) -> Result<T, MappingRequestError> {
    build(raw.trim().to_owned())
        .map_err(|source| MappingRequestError::InvalidIdentifier { field, source })
}

fn required_text(field: &'static str, raw: &str) -> Result<String, MappingRequestError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MappingRequestError::EmptyField { field });
    }
    Ok(trimmed.to_owned())
}

impl MachineMappingRequest {
    /// Validate every field, trimming surrounding whitespace.
    ///
    /// Fields are checked in declaration order and the first failure wins.
    pub fn validate(&self) -> Result<ValidatedMappingRequest, MappingRequestError> {
        let user_id = identifier("userId", &self.user_id, UserId::new)?;
        let user_name = required_text("userName", &self.user_name)?;
        let role = identifier("role", &self.role, RoleCode::new)?;
        let status = self.status.trim().parse::<MappingStatus>()?;
        let center_id = identifier("centerId", &self.center_id, CenterId::new)?;
        let station_id = identifier("stationId", &self.station_id, StationId::new)?;
        let machine_id = identifier("machineId", &self.machine_id, MachineId::new)?;

        Ok(ValidatedMappingRequest {
            key: MachineMappingKey::new(user_id, machine_id),
            user_name,
            role,
            status,
            center_id,
            station_id,
        })
    }
}
