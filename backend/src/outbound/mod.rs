//! Outbound adapters implementing domain ports for local infrastructure.
//!
//! - **persistence**: in-memory mapping repository backed by a JSON snapshot
//! - **machine_identifier**: host MAC address lookup through sysfs
//! - **audit**: audit events emitted as structured tracing records
//!
//! Adapters translate between domain types and their storage or host
//! representations and contain no business logic.

pub mod audit;
pub mod machine_identifier;
pub mod persistence;
