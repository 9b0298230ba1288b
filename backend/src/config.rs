//! Machine mapping configuration loaded via OrthoConfig.

use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::machine_identifier::DEFAULT_NET_CLASS_DIR;

const DEFAULT_SNAPSHOT_PATH: &str = "machine-mapping.json";

/// Settings controlling where mapping data lives and how the host is identified.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MACHINE_MAPPING")]
pub struct MappingSettings {
    /// Fixed machine identifier, bypassing hardware address discovery.
    pub machine_id: Option<String>,
    /// Location of the JSON snapshot holding the mapping store.
    #[ortho_config(default = PathBuf::from(DEFAULT_SNAPSHOT_PATH))]
    pub snapshot_path: PathBuf,
    /// Network interface class directory scanned for MAC addresses.
    #[ortho_config(default = PathBuf::from(DEFAULT_NET_CLASS_DIR))]
    pub net_class_dir: PathBuf,
}

impl MappingSettings {
    /// Configured machine identifier, ignoring blank values.
    pub fn machine_id(&self) -> Option<&str> {
        self.machine_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Snapshot location.
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Interface class directory.
    pub fn net_class_dir(&self) -> &Path {
        &self.net_class_dir
    }
}
