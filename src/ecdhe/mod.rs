// File: src/ecdhe/mod.rs
//! Key-exchange parameter engine
//!
//! Ephemeral key generation, public-point serialization and parsing, and
//! shared-secret derivation, dispatched by curve family. NIST curves go
//! through the `p256`/`p384` providers and serialize as uncompressed SEC1
//! points; x25519 goes through `x25519-dalek` and serializes as the raw
//! 32-byte u-coordinate.
//!
//! All per-connection key material lives in [`KeyExchangeParams`] slots. A
//! slot owns its key handle exclusively; dropping or [releasing] it frees the
//! material exactly once, on every exit path.
//!
//! [releasing]: KeyExchangeParams::release

use p256::elliptic_curve::sec1::ToEncodedPoint;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::curve::{CurveKind, NamedCurve};
use crate::error::{validate, Error, Result};
use crate::stuffer::WireWriter;

/// An owned ephemeral key handle, opaque outside this module.
///
/// A handle generated locally carries both halves of the key pair; a handle
/// parsed from peer bytes is public-only and usable solely as the peer side
/// of a shared-secret derivation. Private material is zeroized on drop by
/// the provider types.
pub enum KeyHandle {
    P256 {
        secret: Option<p256::ecdh::EphemeralSecret>,
        public: p256::PublicKey,
    },
    P384 {
        secret: Option<p384::ecdh::EphemeralSecret>,
        public: p384::PublicKey,
    },
    X25519 {
        secret: Option<x25519_dalek::StaticSecret>,
        public: x25519_dalek::PublicKey,
    },
}

impl core::fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KeyHandle")
            .field("kind", &self.kind())
            .field("has_secret", &self.has_secret())
            .finish()
    }
}

impl KeyHandle {
    /// Provider identifier of the curve this handle lives on
    pub fn kind(&self) -> CurveKind {
        match self {
            KeyHandle::P256 { .. } => CurveKind::NistP256,
            KeyHandle::P384 { .. } => CurveKind::NistP384,
            KeyHandle::X25519 { .. } => CurveKind::X25519,
        }
    }

    /// Whether this handle carries a private scalar
    pub fn has_secret(&self) -> bool {
        match self {
            KeyHandle::P256 { secret, .. } => secret.is_some(),
            KeyHandle::P384 { secret, .. } => secret.is_some(),
            KeyHandle::X25519 { secret, .. } => secret.is_some(),
        }
    }
}

/// Generate an ephemeral key pair for `curve`.
///
/// Dispatches by curve family: x25519 generation is a direct single-step
/// key-pair generation, NIST generation builds the key under the curve's
/// domain parameters via the provider.
pub fn generate<R: CryptoRng + RngCore>(
    curve: &'static NamedCurve,
    rng: &mut R,
) -> Result<KeyHandle> {
    match curve.kind {
        CurveKind::NistP256 => {
            let secret = p256::ecdh::EphemeralSecret::random(rng);
            let public = secret.public_key();
            Ok(KeyHandle::P256 {
                secret: Some(secret),
                public,
            })
        }
        CurveKind::NistP384 => {
            let secret = p384::ecdh::EphemeralSecret::random(rng);
            let public = secret.public_key();
            Ok(KeyHandle::P384 {
                secret: Some(secret),
                public,
            })
        }
        CurveKind::X25519 => {
            let secret = x25519_dalek::StaticSecret::random_from_rng(&mut *rng);
            let public = x25519_dalek::PublicKey::from(&secret);
            Ok(KeyHandle::X25519 {
                secret: Some(secret),
                public,
            })
        }
    }
}

/// Parse peer public-key bytes into a public-only handle.
///
/// `bytes` must be exactly `curve.share_size` long. NIST points are decoded
/// onto the curve's domain and rejected if not on the curve; either failure
/// is [`Error::BadMessage`].
pub fn parse_public(curve: &'static NamedCurve, bytes: &[u8]) -> Result<KeyHandle> {
    validate::message(
        bytes.len() == curve.share_size as usize,
        "key share has wrong size for its named group",
    )?;
    match curve.kind {
        CurveKind::NistP256 => {
            let public = p256::PublicKey::from_sec1_bytes(bytes).map_err(|_| Error::BadMessage {
                context: "point is not on the secp256r1 curve",
            })?;
            Ok(KeyHandle::P256 {
                secret: None,
                public,
            })
        }
        CurveKind::NistP384 => {
            let public = p384::PublicKey::from_sec1_bytes(bytes).map_err(|_| Error::BadMessage {
                context: "point is not on the secp384r1 curve",
            })?;
            Ok(KeyHandle::P384 {
                secret: None,
                public,
            })
        }
        CurveKind::X25519 => {
            let mut point = [0u8; 32];
            point.copy_from_slice(bytes);
            Ok(KeyHandle::X25519 {
                secret: None,
                public: x25519_dalek::PublicKey::from(point),
            })
        }
    }
}

/// Per-connection, per-curve key-exchange state.
///
/// Created empty. `negotiated_curve` is pinned when the curve is chosen for
/// offering or accepted from a peer; the key handle is populated by
/// generation (own side) or point parsing (peer side). A populated handle
/// implies a pinned curve.
#[derive(Default)]
pub struct KeyExchangeParams {
    pub negotiated_curve: Option<&'static NamedCurve>,
    key: Option<KeyHandle>,
}

impl KeyExchangeParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the slot holds key material
    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// Generate a fresh ephemeral key pair for the pinned curve
    pub fn generate_ephemeral_key<R: CryptoRng + RngCore>(&mut self, rng: &mut R) -> Result<()> {
        let curve = self.negotiated_curve.ok_or(Error::KeyGenerationFailed {
            curve: "none",
            details: "no curve negotiated for this slot",
        })?;
        self.key = Some(generate(curve, rng)?);
        Ok(())
    }

    /// Wire encoding of the public key, sized exactly to the curve's share size
    pub fn public_share_bytes(&self) -> Result<Vec<u8>> {
        let curve = self.negotiated_curve.ok_or(Error::SerializationFailed {
            context: "public share",
            details: "no curve negotiated for this slot",
        })?;
        let key = self.key.as_ref().ok_or(Error::SerializationFailed {
            context: "public share",
            details: "slot holds no key material",
        })?;
        let encoded = match key {
            KeyHandle::P256 { public, .. } => public.to_encoded_point(false).as_bytes().to_vec(),
            KeyHandle::P384 { public, .. } => public.to_encoded_point(false).as_bytes().to_vec(),
            KeyHandle::X25519 { public, .. } => public.as_bytes().to_vec(),
        };
        validate::serialization(
            encoded.len() == curve.share_size as usize,
            curve.name,
            "encoded point length does not match the registered share size",
        )?;
        Ok(encoded)
    }

    /// Serialize the public key directly into output space reserved on `out`.
    /// The reservation is exactly `share_size` bytes; a provider encoding of
    /// any other length fails before anything is written.
    pub fn write_share_point(&self, out: &mut WireWriter) -> Result<()> {
        let encoded = self.public_share_bytes()?;
        let space = out.reserve_write(encoded.len());
        space.copy_from_slice(&encoded);
        Ok(())
    }

    /// Populate the slot from peer public-key bytes. The slot's curve must
    /// already be pinned; the resulting handle is public-only.
    pub fn parse_share_point(&mut self, point: &[u8]) -> Result<()> {
        let curve = self.negotiated_curve.ok_or(Error::BadMessage {
            context: "no curve negotiated for received key share",
        })?;
        self.key = Some(parse_public(curve, point)?);
        Ok(())
    }

    /// Derive the ECDH shared secret between this slot's private key and the
    /// peer slot's public key.
    ///
    /// Both slots must be pinned to the same named curve, compared by wire
    /// identifier; a mismatch fails with [`Error::UnsupportedCurve`] before
    /// any derivation work. The output length is whatever the provider
    /// reports at derivation time. The buffer is zeroized on drop.
    pub fn compute_shared_secret(&self, peer: &KeyExchangeParams) -> Result<Zeroizing<Vec<u8>>> {
        let own_curve = self.negotiated_curve.ok_or(Error::UnsupportedCurve {
            context: "shared secret: own slot has no negotiated curve",
        })?;
        let peer_curve = peer.negotiated_curve.ok_or(Error::UnsupportedCurve {
            context: "shared secret: peer slot has no negotiated curve",
        })?;
        validate::curve(
            own_curve.iana_id == peer_curve.iana_id,
            "shared secret: slots negotiated different curves",
        )?;

        let own_key = self.key.as_ref().ok_or(Error::SharedSecretComputationFailed {
            details: "own slot holds no key material",
        })?;
        let peer_key = peer.key.as_ref().ok_or(Error::SharedSecretComputationFailed {
            details: "peer slot holds no key material",
        })?;

        match (own_key, peer_key) {
            (
                KeyHandle::P256 {
                    secret: Some(secret),
                    ..
                },
                KeyHandle::P256 { public, .. },
            ) => {
                let shared = secret.diffie_hellman(public);
                Ok(Zeroizing::new(shared.raw_secret_bytes().to_vec()))
            }
            (
                KeyHandle::P384 {
                    secret: Some(secret),
                    ..
                },
                KeyHandle::P384 { public, .. },
            ) => {
                let shared = secret.diffie_hellman(public);
                Ok(Zeroizing::new(shared.raw_secret_bytes().to_vec()))
            }
            (
                KeyHandle::X25519 {
                    secret: Some(secret),
                    ..
                },
                KeyHandle::X25519 { public, .. },
            ) => {
                let shared = secret.diffie_hellman(public);
                // Reject the all-zero output produced by low-order peer points
                validate::shared_secret(
                    shared.was_contributory(),
                    "x25519 peer point is of low order",
                )?;
                Ok(Zeroizing::new(shared.as_bytes().to_vec()))
            }
            _ => Err(Error::SharedSecretComputationFailed {
                details: "own slot has no private key for this curve",
            }),
        }
    }

    /// Pin `to` to this slot's curve without generating a new key.
    ///
    /// Fails if `to` is already pinned to a different curve, or if this
    /// slot's key handle is inconsistent with its own pinned curve.
    pub fn copy_domain_parameters(&self, to: &mut KeyExchangeParams) -> Result<()> {
        let from_curve = self.negotiated_curve.ok_or(Error::UnsupportedCurve {
            context: "domain copy: source slot has no negotiated curve",
        })?;
        let from_key = self.key.as_ref().ok_or(Error::KeyGenerationFailed {
            curve: from_curve.name,
            details: "domain copy: source slot holds no key material",
        })?;
        validate::serialization(
            from_key.kind() == from_curve.kind,
            from_curve.name,
            "domain copy: source key does not belong to its negotiated curve",
        )?;
        let to_curve = to.negotiated_curve.ok_or(Error::UnsupportedCurve {
            context: "domain copy: destination slot has no negotiated curve",
        })?;
        validate::curve(
            to_curve.iana_id == from_curve.iana_id,
            "domain copy: destination slot pinned to a different curve",
        )?;
        to.negotiated_curve = Some(from_curve);
        Ok(())
    }

    /// Free the key handle, if any, and clear the slot. Safe to call on an
    /// already-empty slot.
    pub fn release(&mut self) {
        self.key = None;
        self.negotiated_curve = None;
    }
}

#[cfg(test)]
mod tests;
