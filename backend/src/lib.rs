//! Client machine mapping library.
//!
//! Maps registration users to the machines they may operate. The domain layer
//! owns validation, reconciliation, and the response envelope; outbound
//! adapters supply storage, host identification, and audit recording.

pub mod config;
pub mod domain;
pub mod outbound;
