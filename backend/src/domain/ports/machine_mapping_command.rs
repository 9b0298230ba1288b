//! Driving port for creating and updating user-to-machine mappings.

use async_trait::async_trait;

use crate::domain::{MachineMappingRequest, ResponseEnvelope};

/// Driving port consumed by inbound adapters (CLI, controllers) to map users.
///
/// The operation never fails at the Rust level: validation and storage
/// failures are reported as error payloads inside the returned envelope.
#[async_trait]
pub trait MachineMappingCommand: Send + Sync {
    /// Insert the mapping when none exists for the request's user and
    /// machine, otherwise update its active flag.
    async fn save_or_update(&self, request: MachineMappingRequest) -> ResponseEnvelope;
}
