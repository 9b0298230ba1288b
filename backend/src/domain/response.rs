//! Uniform success-or-error result returned by the mapping operations.
//!
//! Every driving-port call finishes with a [`ResponseEnvelope`]; failures are
//! reported inside the envelope rather than as a Rust error so callers have a
//! single shape to render. The envelope is transport agnostic and serialises
//! either as `{"successResponse": {...}}` or `{"errorResponses": [...]}`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{CenterId, MachineId, MappingStatus, RoleCode, StationId, UserId};

/// Message returned when a mapping was saved or updated.
pub const MACHINE_MAPPED_MESSAGE: &str = "Machine Mapped Successfully";
/// Message returned when the mapped users of this machine were listed.
pub const USER_DATA_FETCHED_MESSAGE: &str = "User Data Fetched Successfully";
/// Generic failure message for save-or-update.
pub const UNABLE_TO_MAP_USER_MESSAGE: &str = "Unable to map user";
/// Message returned when the machine is not registered to a station.
pub const NO_RECORDS_FOUND_MESSAGE: &str = "No Records Found";
/// Generic failure message for the view when storage is unreachable.
pub const UNABLE_TO_FETCH_USER_DATA_MESSAGE: &str = "Unable to fetch user data";

/// Stable machine-readable code attached to every response payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ResponseCode {
    /// A mapping was created or updated.
    #[serde(rename = "REG-MAP-SUCCESS")]
    MachineMapped,
    /// Mapped users were listed.
    #[serde(rename = "REG-MAP-VIEW")]
    UsersFetched,
    /// The request failed validation.
    #[serde(rename = "REG-MAP-VALIDATION")]
    InvalidRequest,
    /// Save-or-update could not complete.
    #[serde(rename = "REG-MAP-FAILURE")]
    MappingFailed,
    /// No station or center is registered for the machine.
    #[serde(rename = "REG-MAP-NO-RECORDS")]
    NoRecordsFound,
    /// The view lookup failed.
    #[serde(rename = "REG-MAP-FETCH-FAILURE")]
    LookupFailed,
}

impl ResponseCode {
    /// Wire representation of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MachineMapped => "REG-MAP-SUCCESS",
            Self::UsersFetched => "REG-MAP-VIEW",
            Self::InvalidRequest => "REG-MAP-VALIDATION",
            Self::MappingFailed => "REG-MAP-FAILURE",
            Self::NoRecordsFound => "REG-MAP-NO-RECORDS",
            Self::LookupFailed => "REG-MAP-FETCH-FAILURE",
        }
    }
}

/// Severity tag shown alongside a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InfoType {
    #[serde(rename = "ALERT_INFORMATION")]
    AlertInformation,
    #[serde(rename = "ERROR")]
    Error,
}

/// One row of the machine view: a user mapped to the current machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedUserView {
    pub user_id: UserId,
    pub user_name: String,
    pub center_id: CenterId,
    pub station_id: StationId,
    pub machine_id: MachineId,
    pub role_codes: Vec<RoleCode>,
    pub status: MappingStatus,
}

/// Success payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessResponse {
    code: ResponseCode,
    info_type: InfoType,
    message: String,
    /// Present on view payloads, even when no user is mapped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    users: Option<Vec<MappedUserView>>,
}

impl SuccessResponse {
    /// Informational success payload with no attached users.
    pub fn new(code: ResponseCode, message: impl Into<String>) -> Self {
        Self {
            code,
            info_type: InfoType::AlertInformation,
            message: message.into(),
            users: None,
        }
    }

    /// Attach the mapped users listed by a view.
    #[must_use]
    pub fn with_users(mut self, users: Vec<MappedUserView>) -> Self {
        self.users = Some(users);
        self
    }

    #[must_use]
    pub fn code(&self) -> ResponseCode {
        self.code
    }

    #[must_use]
    pub fn info_type(&self) -> InfoType {
        self.info_type
    }

    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    #[must_use]
    pub fn users(&self) -> &[MappedUserView] {
        self.users.as_deref().unwrap_or_default()
    }
}

/// Validation errors raised while building response payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseValidationError {
    #[error("error message must not be empty")]
    EmptyMessage,
    #[error("an error response must carry at least one error")]
    NoErrors,
}

/// Error payload.
///
/// ## Invariants
/// - `message` must be non-empty once trimmed of whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "ErrorResponseDto", into = "ErrorResponseDto")]
pub struct ErrorResponse {
    code: ResponseCode,
    info_type: InfoType,
    message: String,
}

impl ErrorResponse {
    /// Create a new error payload, panicking if validation fails.
    pub fn new(code: ResponseCode, message: impl Into<String>) -> Self {
        match Self::try_new(code, message) {
            Ok(value) => value,
            Err(err) => panic!("error messages must satisfy validation: {err}"),
        }
    }

    /// Fallible constructor that validates the message content.
    pub fn try_new(
        code: ResponseCode,
        message: impl Into<String>,
    ) -> Result<Self, ResponseValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ResponseValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            info_type: InfoType::Error,
            message,
        })
    }

    #[must_use]
    pub fn code(&self) -> ResponseCode {
        self.code
    }

    #[must_use]
    pub fn info_type(&self) -> InfoType {
        self.info_type
    }

    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponseDto {
    code: ResponseCode,
    info_type: InfoType,
    message: String,
}

impl From<ErrorResponse> for ErrorResponseDto {
    fn from(value: ErrorResponse) -> Self {
        Self {
            code: value.code,
            info_type: value.info_type,
            message: value.message,
        }
    }
}

impl TryFrom<ErrorResponseDto> for ErrorResponse {
    type Error = ResponseValidationError;

    fn try_from(value: ErrorResponseDto) -> Result<Self, Self::Error> {
        let mut error = Self::try_new(value.code, value.message)?;
        error.info_type = value.info_type;
        Ok(error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Success(SuccessResponse),
    Errors(Vec<ErrorResponse>),
}

/// Success payload or an ordered, non-empty list of error payloads.
///
/// ## Invariants
/// - Exactly one of [`Self::success_response`] being `Some` or
///   [`Self::error_responses`] being non-empty holds.
///
/// # Examples
/// ```
/// use machine_mapping::domain::{ErrorResponse, ResponseCode, ResponseEnvelope};
///
/// let envelope = ResponseEnvelope::error(ErrorResponse::new(
///     ResponseCode::NoRecordsFound,
///     "No Records Found",
/// ));
/// assert!(envelope.success_response().is_none());
/// assert_eq!(envelope.error_responses()[0].message(), "No Records Found");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ResponseEnvelopeDto", into = "ResponseEnvelopeDto")]
pub struct ResponseEnvelope(Outcome);

impl ResponseEnvelope {
    /// Successful outcome.
    #[must_use]
    pub fn success(response: SuccessResponse) -> Self {
        Self(Outcome::Success(response))
    }

    /// Failed outcome carrying a single error.
    #[must_use]
    pub fn error(error: ErrorResponse) -> Self {
        Self(Outcome::Errors(vec![error]))
    }

    /// Failed outcome carrying several errors in order.
    pub fn try_from_errors(
        errors: impl IntoIterator<Item = ErrorResponse>,
    ) -> Result<Self, ResponseValidationError> {
        let errors: Vec<_> = errors.into_iter().collect();
        if errors.is_empty() {
            return Err(ResponseValidationError::NoErrors);
        }
        Ok(Self(Outcome::Errors(errors)))
    }

    /// Whether the operation succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.0, Outcome::Success(_))
    }

    #[must_use]
    pub fn success_response(&self) -> Option<&SuccessResponse> {
        match &self.0 {
            Outcome::Success(response) => Some(response),
            Outcome::Errors(_) => None,
        }
    }

    /// Errors in the order they were recorded; empty on success.
    #[must_use]
    pub fn error_responses(&self) -> &[ErrorResponse] {
        match &self.0 {
            Outcome::Success(_) => &[],
            Outcome::Errors(errors) => errors,
        }
    }

    /// First recorded error, if the operation failed.
    #[must_use]
    pub fn first_error(&self) -> Option<&ErrorResponse> {
        self.error_responses().first()
    }

    /// Message of the success payload or of the first error.
    #[must_use]
    pub fn message(&self) -> &str {
        match &self.0 {
            Outcome::Success(response) => response.message(),
            Outcome::Errors(errors) => errors.first().map_or("", ErrorResponse::message),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
enum ResponseEnvelopeDto {
    #[serde(rename = "successResponse")]
    Success(SuccessResponse),
    #[serde(rename = "errorResponses")]
    Errors(Vec<ErrorResponse>),
}

impl From<ResponseEnvelope> for ResponseEnvelopeDto {
    fn from(value: ResponseEnvelope) -> Self {
        match value.0 {
            Outcome::Success(response) => Self::Success(response),
            Outcome::Errors(errors) => Self::Errors(errors),
        }
    }
}

impl TryFrom<ResponseEnvelopeDto> for ResponseEnvelope {
    type Error = ResponseValidationError;

    fn try_from(value: ResponseEnvelopeDto) -> Result<Self, Self::Error> {
        match value {
            ResponseEnvelopeDto::Success(response) => Ok(Self::success(response)),
            ResponseEnvelopeDto::Errors(errors) => Self::try_from_errors(errors),
        }
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
