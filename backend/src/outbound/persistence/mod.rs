//! Persistence adapters for the mapping repository port.
//!
//! The registration client keeps its mapping data locally, so the store is an
//! in-process repository whose contents are loaded from and saved to a JSON
//! snapshot file.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use machine_mapping::outbound::persistence::{
//!     InMemoryMappingRepository, load_snapshot, store_snapshot,
//! };
//!
//! let path = Path::new("machine-mapping.json");
//! let snapshot = load_snapshot(path)?.unwrap_or_default();
//! let repo = InMemoryMappingRepository::from_snapshot(snapshot);
//! // ... run mapping operations ...
//! store_snapshot(path, &repo.snapshot()?)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod in_memory_mapping_repository;
mod snapshot;
mod snapshot_file;

pub use in_memory_mapping_repository::InMemoryMappingRepository;
pub use snapshot::{MachineRegistration, MappingSnapshot, UserRecord};
pub use snapshot_file::{SnapshotFileError, load_snapshot, store_snapshot};
