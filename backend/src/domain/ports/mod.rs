//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod audit_sink;
mod machine_identifier;
mod machine_mapping_command;
mod machine_mapping_query;
mod mapping_repository;

#[cfg(test)]
pub use audit_sink::MockAuditSink;
pub use audit_sink::{
    AuditEvent, AuditEventKind, AuditSink, AuditSinkError, MACHINE_MAPPING_MODULE, NoOpAuditSink,
};
#[cfg(test)]
pub use machine_identifier::MockMachineIdentifierProvider;
pub use machine_identifier::{
    MachineIdentifierError, MachineIdentifierProvider, StaticMachineIdentifier,
};
pub use machine_mapping_command::MachineMappingCommand;
pub use machine_mapping_query::MachineMappingQuery;
#[cfg(test)]
pub use mapping_repository::MockMappingRepository;
pub use mapping_repository::{MappingRepository, MappingRepositoryError};
