//! Validated string identifiers used across the mapping domain.
//!
//! Registration identifiers are opaque strings issued by other systems
//! (user ids, machine MAC addresses, station and center codes), so the only
//! invariant enforced here is that they are non-empty and carry no
//! surrounding whitespace.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors raised when constructing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierValidationError {
    /// The supplied value was empty or whitespace only.
    #[error("{kind} must not be empty")]
    Empty {
        /// Identifier kind, for example `user id`.
        kind: &'static str,
    },
    /// The supplied value had leading or trailing whitespace.
    #[error("{kind} must not have surrounding whitespace")]
    Untrimmed {
        /// Identifier kind, for example `user id`.
        kind: &'static str,
    },
}

fn validate(kind: &'static str, value: String) -> Result<String, IdentifierValidationError> {
    if value.trim().is_empty() {
        return Err(IdentifierValidationError::Empty { kind });
    }
    if value.trim() != value {
        return Err(IdentifierValidationError::Untrimmed { kind });
    }
    Ok(value)
}

macro_rules! define_identifier {
    ($(#[$meta:meta])* $name:ident => $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Human-readable identifier kind used in validation messages.
            pub const KIND: &'static str = $kind;

            /// Validate and construct the identifier.
            pub fn new(value: impl Into<String>) -> Result<Self, IdentifierValidationError> {
                validate($kind, value.into()).map(Self)
            }

            /// Borrow the raw identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

define_identifier! {
    /// Registration user identifier.
    UserId => "user id"
}

define_identifier! {
    /// Stable identifier of a physical client machine (typically its MAC).
    MachineId => "machine id"
}

define_identifier! {
    /// Registration station identifier.
    StationId => "station id"
}

define_identifier! {
    /// Registration center identifier.
    CenterId => "center id"
}

define_identifier! {
    /// Code of a role granted to a registration user.
    RoleCode => "role code"
}
