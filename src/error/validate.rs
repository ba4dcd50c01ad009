//! Validation utilities for key-exchange operations

use super::{Error, Result};

/// Validate key generation state
pub fn key_generation(condition: bool, curve: &'static str, details: &'static str) -> Result<()> {
    if !condition {
        return Err(Error::KeyGenerationFailed { curve, details });
    }
    Ok(())
}

/// Validate serialization state
pub fn serialization(condition: bool, context: &'static str, details: &'static str) -> Result<()> {
    if !condition {
        return Err(Error::SerializationFailed { context, details });
    }
    Ok(())
}

/// Validate shared-secret derivation state
pub fn shared_secret(condition: bool, details: &'static str) -> Result<()> {
    if !condition {
        return Err(Error::SharedSecretComputationFailed { details });
    }
    Ok(())
}

/// Validate curve agreement between two parameter slots
pub fn curve(condition: bool, context: &'static str) -> Result<()> {
    if !condition {
        return Err(Error::UnsupportedCurve { context });
    }
    Ok(())
}

/// Validate wire framing read from the peer
pub fn message(condition: bool, context: &'static str) -> Result<()> {
    if !condition {
        return Err(Error::BadMessage { context });
    }
    Ok(())
}
