//! Domain primitives, services and ports for user-to-machine mappings.
//!
//! Purpose: Define the strongly typed mapping entities, the response envelope
//! returned to callers, and the services implementing the driving ports.
//! Infrastructure lives behind the traits in [`ports`].
//!
//! Public surface:
//! - `MachineMappingCommandService`: save-or-update reconciliation.
//! - `MachineMappingQueryService`: mapped users of the current machine.
//! - `ResponseEnvelope`: success payload or ordered error payloads.

pub mod ports;

mod identifiers;
mod machine_mapping;
mod machine_mapping_service;
mod machine_mapping_view_service;
mod mapping_request;
mod response;
mod trace_id;

pub use self::identifiers::{
    CenterId, IdentifierValidationError, MachineId, RoleCode, StationId, UserId,
};
pub use self::machine_mapping::{
    MachineLocation, MachineMappingKey, MappingStatus, RegistrationUserDetail,
    RegistrationUserRole, UnknownMappingStatus, UserMachineMapping,
};
pub use self::machine_mapping_service::MachineMappingCommandService;
pub use self::machine_mapping_view_service::MachineMappingQueryService;
pub use self::mapping_request::{
    MachineMappingRequest, MappingRequestError, ValidatedMappingRequest,
};
pub use self::response::{
    ErrorResponse, InfoType, MACHINE_MAPPED_MESSAGE, MappedUserView, NO_RECORDS_FOUND_MESSAGE,
    ResponseCode, ResponseEnvelope, ResponseValidationError, SuccessResponse,
    UNABLE_TO_FETCH_USER_DATA_MESSAGE, UNABLE_TO_MAP_USER_MESSAGE, USER_DATA_FETCHED_MESSAGE,
};
pub use self::trace_id::TraceId;
