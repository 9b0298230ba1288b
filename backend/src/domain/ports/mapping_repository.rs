//! Port for mapping, station and registration-user persistence.
//!
//! The [`MappingRepository`] trait is the persistence authority for
//! [`UserMachineMapping`] records and the read-only user/role data joined into
//! the machine view. Adapters decide how records are stored.

use async_trait::async_trait;

use crate::domain::{
    CenterId, MachineId, MachineMappingKey, RegistrationUserDetail, StationId, UserMachineMapping,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by mapping repository adapters.
    pub enum MappingRepositoryError {
        /// Storage could not be reached.
        Connection { message: String } => "mapping repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "mapping repository query failed: {message}",
        /// `save` was called for a key that is already stored.
        Duplicate { key: String } => "mapping {key} already exists",
        /// `update` was called for a key that is not stored.
        Missing { key: String } => "mapping {key} does not exist",
    }
}

impl MappingRepositoryError {
    /// Whether the failure is an unexpected infrastructure fault rather than
    /// a recoverable domain condition.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Port for mapping storage and lookups keyed by machine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MappingRepository: Send + Sync {
    /// Station the machine is registered under, or `None` when the machine is
    /// unknown.
    async fn get_station_id(
        &self,
        machine_id: &MachineId,
    ) -> Result<Option<StationId>, MappingRepositoryError>;

    /// Center the machine belongs to, or `None` when the machine is unknown.
    async fn get_center_id(
        &self,
        machine_id: &MachineId,
    ) -> Result<Option<CenterId>, MappingRepositoryError>;

    /// Users holding a mapping (active or not) onto the machine, each with
    /// their mappings and role grants.
    async fn get_users(
        &self,
        machine_id: &MachineId,
    ) -> Result<Vec<RegistrationUserDetail>, MappingRepositoryError>;

    /// Fetch a mapping by its composite key.
    async fn find_by_id(
        &self,
        key: &MachineMappingKey,
    ) -> Result<Option<UserMachineMapping>, MappingRepositoryError>;

    /// Insert a mapping that does not exist yet.
    async fn save(&self, mapping: &UserMachineMapping) -> Result<(), MappingRepositoryError>;

    /// Replace an existing mapping.
    async fn update(&self, mapping: &UserMachineMapping) -> Result<(), MappingRepositoryError>;
}
