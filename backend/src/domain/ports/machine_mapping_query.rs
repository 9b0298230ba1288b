//! Driving port for listing the users mapped to the current machine.

use async_trait::async_trait;

use crate::domain::ResponseEnvelope;

/// Driving port returning the users mapped to the machine this service runs
/// on, with their roles and mapping status.
#[async_trait]
pub trait MachineMappingQuery: Send + Sync {
    /// List mapped users; a machine without a station yields an error
    /// envelope.
    async fn view(&self) -> ResponseEnvelope;
}
