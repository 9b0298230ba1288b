//! Host MAC address lookup backed by the Linux sysfs network class.
//!
//! Each directory under `/sys/class/net` is a network interface whose
//! `address` file holds its hardware address. Interfaces are visited in name
//! order so the chosen identifier is stable across runs.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;

use crate::domain::MachineId;
use crate::domain::ports::{MachineIdentifierError, MachineIdentifierProvider};

/// Default location of the network interface class directory.
pub const DEFAULT_NET_CLASS_DIR: &str = "/sys/class/net";

const LOOPBACK_INTERFACE: &str = "lo";

/// Normalise a raw sysfs address into `AA-BB-CC-DD-EE-FF` form.
///
/// Returns `None` for blank or all-zero addresses.
fn normalise_mac(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let is_zero = trimmed
        .chars()
        .filter(|ch| *ch != ':' && *ch != '-')
        .all(|ch| ch == '0');
    if is_zero {
        return None;
    }
    Some(trimmed.replace(':', "-").to_ascii_uppercase())
}

/// Resolves the machine identifier from the first usable interface MAC.
#[derive(Debug, Clone)]
pub struct SysfsMacAddressProvider {
    net_class_dir: PathBuf,
}

impl Default for SysfsMacAddressProvider {
    fn default() -> Self {
        Self::new(DEFAULT_NET_CLASS_DIR)
    }
}

impl SysfsMacAddressProvider {
    /// Provider reading interfaces below `net_class_dir`.
    pub fn new(net_class_dir: impl Into<PathBuf>) -> Self {
        Self {
            net_class_dir: net_class_dir.into(),
        }
    }

    fn unavailable(&self, detail: impl std::fmt::Display) -> MachineIdentifierError {
        MachineIdentifierError::unavailable(format!(
            "{}: {detail}",
            self.net_class_dir.display()
        ))
    }

    fn read_first_address(&self) -> Result<String, MachineIdentifierError> {
        let dir = Dir::open_ambient_dir(&self.net_class_dir, ambient_authority())
            .map_err(|error| self.unavailable(error))?;
        let mut interfaces: Vec<String> = dir
            .entries()
            .map_err(|error| self.unavailable(error))?
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name != LOOPBACK_INTERFACE)
            .collect();
        interfaces.sort();

        for interface in &interfaces {
            let address_path = Path::new(interface).join("address");
            let Ok(raw) = dir.read_to_string(&address_path) else {
                debug!(interface, "interface has no readable address; skipped");
                continue;
            };
            if let Some(mac) = normalise_mac(&raw) {
                debug!(interface, mac, "machine identifier resolved");
                return Ok(mac);
            }
        }
        Err(self.unavailable("no interface with a hardware address"))
    }
}

#[async_trait]
impl MachineIdentifierProvider for SysfsMacAddressProvider {
    async fn current(&self) -> Result<MachineId, MachineIdentifierError> {
        let mac = self.read_first_address()?;
        MachineId::new(mac).map_err(|error| self.unavailable(error))
    }
}
