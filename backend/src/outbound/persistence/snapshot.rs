//! Serialisable snapshot of the mapping store.
//!
//! Snapshots seed the in-memory repository at start-up and capture its state
//! afterwards, so a single JSON document can stand in for the registration
//! client's local database.

use serde::{Deserialize, Serialize};

use crate::domain::{CenterId, MachineId, RoleCode, StationId, UserId, UserMachineMapping};

/// A machine registered to a station and center.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineRegistration {
    pub machine_id: MachineId,
    pub station_id: StationId,
    pub center_id: CenterId,
}

/// A registration user and the roles granted to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub center_id: CenterId,
    #[serde(default)]
    pub role_codes: Vec<RoleCode>,
}

/// Complete store contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingSnapshot {
    #[serde(default)]
    pub machines: Vec<MachineRegistration>,
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub mappings: Vec<UserMachineMapping>,
}
