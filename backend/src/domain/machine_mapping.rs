//! User-to-machine mapping entities.
//!
//! A [`UserMachineMapping`] records that a registration user may operate a
//! particular client machine. Mappings are never deleted; deactivation flips
//! the active flag through the same update path as any other status change.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{CenterId, MachineId, RoleCode, StationId, UserId};

/// Composite identifier of a mapping: one user on one machine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineMappingKey {
    user_id: UserId,
    machine_id: MachineId,
}

impl MachineMappingKey {
    /// Build a key from validated identifiers.
    #[must_use]
    pub fn new(user_id: UserId, machine_id: MachineId) -> Self {
        Self {
            user_id,
            machine_id,
        }
    }

    /// Mapped user.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Mapped machine.
    #[must_use]
    pub fn machine_id(&self) -> &MachineId {
        &self.machine_id
    }
}

impl fmt::Display for MachineMappingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user_id, self.machine_id)
    }
}

/// Raised when a status label is neither `ACTIVE` nor `IN-ACTIVE`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mapping status '{0}'; expected ACTIVE or IN-ACTIVE")]
pub struct UnknownMappingStatus(pub String);

/// Requested state of a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MappingStatus {
    /// The user may operate the machine.
    #[serde(rename = "ACTIVE")]
    Active,
    /// The mapping is retained but disabled.
    #[serde(rename = "IN-ACTIVE")]
    Inactive,
}

impl MappingStatus {
    /// Wire label used by registration clients.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "IN-ACTIVE",
        }
    }

    /// Whether the status enables the mapping.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Status matching a stored active flag.
    #[must_use]
    pub const fn from_active(is_active: bool) -> Self {
        if is_active { Self::Active } else { Self::Inactive }
    }
}

impl FromStr for MappingStatus {
    type Err = UnknownMappingStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "IN-ACTIVE" => Ok(Self::Inactive),
            other => Err(UnknownMappingStatus(other.to_owned())),
        }
    }
}

impl fmt::Display for MappingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted association between a user and a client machine.
///
/// ## Invariants
/// - `key` never changes after creation.
/// - `created_by`/`created_at` are preserved across updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMachineMapping {
    key: MachineMappingKey,
    is_active: bool,
    created_by: UserId,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_by: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

impl UserMachineMapping {
    /// Create a mapping that has not been persisted yet.
    #[must_use]
    pub fn new(
        key: MachineMappingKey,
        status: MappingStatus,
        created_by: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            key,
            is_active: status.is_active(),
            created_by,
            created_at,
            updated_by: None,
            updated_at: None,
        }
    }

    /// Apply a new status, stamping the update audit columns.
    pub fn apply_status(&mut self, status: MappingStatus, updated_by: UserId, at: DateTime<Utc>) {
        self.is_active = status.is_active();
        self.updated_by = Some(updated_by);
        self.updated_at = Some(at);
    }

    /// Composite identifier.
    #[must_use]
    pub fn key(&self) -> &MachineMappingKey {
        &self.key
    }

    /// Owning user.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        self.key.user_id()
    }

    /// Mapped machine.
    #[must_use]
    pub fn machine_id(&self) -> &MachineId {
        self.key.machine_id()
    }

    /// Whether the user may currently operate the machine.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Current status label.
    #[must_use]
    pub fn status(&self) -> MappingStatus {
        MappingStatus::from_active(self.is_active)
    }

    #[must_use]
    pub fn created_by(&self) -> &UserId {
        &self.created_by
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_by(&self) -> Option<&UserId> {
        self.updated_by.as_ref()
    }

    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

/// A role granted to a registration user. Read-only for this service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationUserRole {
    pub user_id: UserId,
    pub role_code: RoleCode,
}

/// Registration user together with their machine mappings and roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationUserDetail {
    pub id: UserId,
    pub name: String,
    pub center_id: CenterId,
    #[serde(default)]
    pub machine_mappings: Vec<UserMachineMapping>,
    #[serde(default)]
    pub roles: Vec<RegistrationUserRole>,
}

impl RegistrationUserDetail {
    /// Mapping of this user onto `machine_id`, if one exists.
    #[must_use]
    pub fn mapping_for(&self, machine_id: &MachineId) -> Option<&UserMachineMapping> {
        self.machine_mappings
            .iter()
            .find(|mapping| mapping.machine_id() == machine_id)
    }

    /// Role codes in grant order.
    pub fn role_codes(&self) -> impl Iterator<Item = &RoleCode> {
        self.roles.iter().map(|role| &role.role_code)
    }
}

/// Station and center a machine is registered under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineLocation {
    pub station_id: StationId,
    pub center_id: CenterId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn key() -> MachineMappingKey {
        MachineMappingKey::new(
            UserId::new("ID123").expect("user id"),
            MachineId::new("MCHN123").expect("machine id"),
        )
    }

    #[fixture]
    fn created_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    #[rstest]
    #[case("ACTIVE", MappingStatus::Active)]
    #[case("IN-ACTIVE", MappingStatus::Inactive)]
    fn parses_known_status_labels(#[case] raw: &str, #[case] expected: MappingStatus) {
        assert_eq!(raw.parse::<MappingStatus>(), Ok(expected));
        assert_eq!(expected.as_str(), raw);
    }

    #[rstest]
    #[case("active")]
    #[case("INACTIVE")]
    #[case("")]
    fn rejects_unknown_status_labels(#[case] raw: &str) {
        assert_eq!(
            raw.parse::<MappingStatus>(),
            Err(UnknownMappingStatus(raw.to_owned()))
        );
    }

    #[rstest]
    fn new_mapping_derives_flag_from_status(key: MachineMappingKey, created_at: DateTime<Utc>) {
        let actor = key.user_id().clone();
        let mapping = UserMachineMapping::new(key, MappingStatus::Inactive, actor, created_at);

        assert!(!mapping.is_active());
        assert_eq!(mapping.status(), MappingStatus::Inactive);
        assert!(mapping.updated_at().is_none());
    }

    #[rstest]
    fn apply_status_preserves_creation_columns(key: MachineMappingKey, created_at: DateTime<Utc>) {
        let actor = key.user_id().clone();
        let mut mapping =
            UserMachineMapping::new(key.clone(), MappingStatus::Inactive, actor.clone(), created_at);
        let later = created_at + chrono::Duration::hours(1);

        mapping.apply_status(MappingStatus::Active, actor.clone(), later);

        assert!(mapping.is_active());
        assert_eq!(mapping.key(), &key);
        assert_eq!(mapping.created_at(), created_at);
        assert_eq!(mapping.updated_by(), Some(&actor));
        assert_eq!(mapping.updated_at(), Some(later));
    }

    #[rstest]
    fn key_displays_user_at_machine(key: MachineMappingKey) {
        assert_eq!(key.to_string(), "ID123@MCHN123");
    }
}
