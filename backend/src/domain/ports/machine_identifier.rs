//! Port resolving the identifier of the machine this service runs on.

use async_trait::async_trait;

use crate::domain::MachineId;

use super::define_port_error;

define_port_error! {
    /// Errors raised when the host identifier cannot be determined.
    pub enum MachineIdentifierError {
        /// No usable hardware identifier was found.
        Unavailable { message: String } => "machine identifier unavailable: {message}",
    }
}

/// Source of the current machine's stable identifier.
///
/// Implementations must return the same value for the lifetime of the host.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MachineIdentifierProvider: Send + Sync {
    /// Identifier of the current machine.
    async fn current(&self) -> Result<MachineId, MachineIdentifierError>;
}

/// Provider returning a fixed identifier, for tests and configured hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticMachineIdentifier(MachineId);

impl StaticMachineIdentifier {
    /// Wrap a known identifier.
    #[must_use]
    pub fn new(machine_id: MachineId) -> Self {
        Self(machine_id)
    }
}

#[async_trait]
impl MachineIdentifierProvider for StaticMachineIdentifier {
    async fn current(&self) -> Result<MachineId, MachineIdentifierError> {
        Ok(self.0.clone())
    }
}
