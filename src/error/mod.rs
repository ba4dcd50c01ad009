//! Error handling for key-exchange and key_share operations

use core::fmt;

/// Error type for key-exchange and key_share operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Unrecognized ECC preference policy name
    UnknownPolicy { version: String },

    /// Ephemeral key generation failed
    KeyGenerationFailed {
        curve: &'static str,
        details: &'static str,
    },

    /// Public point could not be serialized to its fixed wire size
    SerializationFailed {
        context: &'static str,
        details: &'static str,
    },

    /// Shared-secret derivation failed
    SharedSecretComputationFailed { details: &'static str },

    /// The two sides of an operation reference different named curves
    UnsupportedCurve { context: &'static str },

    /// Malformed wire data from the peer
    BadMessage { context: &'static str },
}

/// Result type for key-exchange and key_share operations
pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownPolicy { version } => {
                write!(f, "Unknown ECC preference policy: {}", version)
            }
            Error::KeyGenerationFailed { curve, details } => {
                write!(f, "Key generation failed for {}: {}", curve, details)
            }
            Error::SerializationFailed { context, details } => {
                write!(f, "Serialization error in {}: {}", context, details)
            }
            Error::SharedSecretComputationFailed { details } => {
                write!(f, "Shared secret computation failed: {}", details)
            }
            Error::UnsupportedCurve { context } => {
                write!(f, "Unsupported curve in {}", context)
            }
            Error::BadMessage { context } => {
                write!(f, "Bad message: {}", context)
            }
        }
    }
}

impl std::error::Error for Error {}

// Include validation submodule
pub mod validate;
