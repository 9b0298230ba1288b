//! In-process mapping repository.
//!
//! Holds machines, users and mappings in ordered maps behind a `RwLock`.
//! Lock poisoning is reported as a connection failure since the store can no
//! longer be trusted.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::ports::{MappingRepository, MappingRepositoryError};
use crate::domain::{
    CenterId, MachineId, MachineLocation, MachineMappingKey, RegistrationUserDetail,
    RegistrationUserRole, StationId, UserId, UserMachineMapping, ValidatedMappingRequest,
};

use super::snapshot::{MachineRegistration, MappingSnapshot, UserRecord};

#[derive(Debug, Default)]
struct Store {
    machines: BTreeMap<MachineId, MachineLocation>,
    users: BTreeMap<UserId, UserRecord>,
    mappings: BTreeMap<MachineMappingKey, UserMachineMapping>,
}

impl Store {
    fn user_detail(&self, record: &UserRecord) -> RegistrationUserDetail {
        let machine_mappings = self
            .mappings
            .values()
            .filter(|mapping| mapping.user_id() == &record.id)
            .cloned()
            .collect();
        let roles = record
            .role_codes
            .iter()
            .map(|role_code| RegistrationUserRole {
                user_id: record.id.clone(),
                role_code: role_code.clone(),
            })
            .collect();
        RegistrationUserDetail {
            id: record.id.clone(),
            name: record.name.clone(),
            center_id: record.center_id.clone(),
            machine_mappings,
            roles,
        }
    }
}

/// Thread-safe in-memory implementation of [`MappingRepository`].
#[derive(Debug, Default)]
pub struct InMemoryMappingRepository {
    store: RwLock<Store>,
}

fn poisoned() -> MappingRepositoryError {
    MappingRepositoryError::connection("mapping store lock poisoned")
}

impl InMemoryMappingRepository {
    /// Empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository seeded from a snapshot. Later entries win on duplicate keys.
    #[must_use]
    pub fn from_snapshot(snapshot: MappingSnapshot) -> Self {
        let MappingSnapshot {
            machines,
            users,
            mappings,
        } = snapshot;
        let store = Store {
            machines: machines
                .into_iter()
                .map(|machine| {
                    let location = MachineLocation {
                        station_id: machine.station_id,
                        center_id: machine.center_id,
                    };
                    (machine.machine_id, location)
                })
                .collect(),
            users: users
                .into_iter()
                .map(|user| (user.id.clone(), user))
                .collect(),
            mappings: mappings
                .into_iter()
                .map(|mapping| (mapping.key().clone(), mapping))
                .collect(),
        };
        Self {
            store: RwLock::new(store),
        }
    }

    /// Capture the current contents in key order.
    pub fn snapshot(&self) -> Result<MappingSnapshot, MappingRepositoryError> {
        let store = self.read()?;
        Ok(MappingSnapshot {
            machines: store
                .machines
                .iter()
                .map(|(machine_id, location)| MachineRegistration {
                    machine_id: machine_id.clone(),
                    station_id: location.station_id.clone(),
                    center_id: location.center_id.clone(),
                })
                .collect(),
            users: store.users.values().cloned().collect(),
            mappings: store.mappings.values().cloned().collect(),
        })
    }

    /// Register a machine under a station and center.
    pub fn register_machine(
        &self,
        machine_id: MachineId,
        location: MachineLocation,
    ) -> Result<(), MappingRepositoryError> {
        self.write()?.machines.insert(machine_id, location);
        Ok(())
    }

    /// Insert or replace a user record.
    pub fn register_user(&self, user: UserRecord) -> Result<(), MappingRepositoryError> {
        self.write()?.users.insert(user.id.clone(), user);
        Ok(())
    }

    /// Record the machine location and user enrolment carried by a request.
    ///
    /// The machine is (re)registered under the request's station and center.
    /// The user record is created or renamed, moved to the request's center,
    /// and granted the request's role if it does not hold it yet.
    pub fn enrol(&self, request: &ValidatedMappingRequest) -> Result<(), MappingRepositoryError> {
        let mut store = self.write()?;
        store.machines.insert(
            request.key.machine_id().clone(),
            MachineLocation {
                station_id: request.station_id.clone(),
                center_id: request.center_id.clone(),
            },
        );
        let user_id = request.actor();
        let record = store
            .users
            .entry(user_id.clone())
            .or_insert_with(|| UserRecord {
                id: user_id.clone(),
                name: request.user_name.clone(),
                center_id: request.center_id.clone(),
                role_codes: Vec::new(),
            });
        record.name.clone_from(&request.user_name);
        record.center_id = request.center_id.clone();
        if !record.role_codes.contains(&request.role) {
            record.role_codes.push(request.role.clone());
        }
        debug!(key = %request.key, "machine and user enrolment recorded");
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Store>, MappingRepositoryError> {
        self.store.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Store>, MappingRepositoryError> {
        self.store.write().map_err(|_| poisoned())
    }
}

#[async_trait]
impl MappingRepository for InMemoryMappingRepository {
    async fn get_station_id(
        &self,
        machine_id: &MachineId,
    ) -> Result<Option<StationId>, MappingRepositoryError> {
        let store = self.read()?;
        Ok(store
            .machines
            .get(machine_id)
            .map(|location| location.station_id.clone()))
    }

    async fn get_center_id(
        &self,
        machine_id: &MachineId,
    ) -> Result<Option<CenterId>, MappingRepositoryError> {
        let store = self.read()?;
        Ok(store
            .machines
            .get(machine_id)
            .map(|location| location.center_id.clone()))
    }

    async fn get_users(
        &self,
        machine_id: &MachineId,
    ) -> Result<Vec<RegistrationUserDetail>, MappingRepositoryError> {
        let store = self.read()?;
        let mut users = Vec::new();
        for mapping in store
            .mappings
            .values()
            .filter(|mapping| mapping.machine_id() == machine_id)
        {
            match store.users.get(mapping.user_id()) {
                Some(record) => users.push(store.user_detail(record)),
                None => warn!(key = %mapping.key(), "mapping references unknown user; skipped"),
            }
        }
        debug!(machine = %machine_id, users = users.len(), "loaded mapped users");
        Ok(users)
    }

    async fn find_by_id(
        &self,
        key: &MachineMappingKey,
    ) -> Result<Option<UserMachineMapping>, MappingRepositoryError> {
        Ok(self.read()?.mappings.get(key).cloned())
    }

    async fn save(&self, mapping: &UserMachineMapping) -> Result<(), MappingRepositoryError> {
        let mut store = self.write()?;
        if store.mappings.contains_key(mapping.key()) {
            return Err(MappingRepositoryError::duplicate(mapping.key().to_string()));
        }
        store.mappings.insert(mapping.key().clone(), mapping.clone());
        Ok(())
    }

    async fn update(&self, mapping: &UserMachineMapping) -> Result<(), MappingRepositoryError> {
        let mut store = self.write()?;
        let Some(existing) = store.mappings.get_mut(mapping.key()) else {
            return Err(MappingRepositoryError::missing(mapping.key().to_string()));
        };
        *existing = mapping.clone();
        Ok(())
    }
}
