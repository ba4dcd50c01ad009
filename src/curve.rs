//! Registry of supported named curves
//!
//! Each supported curve is described by a static [`NamedCurve`] carrying its
//! IANA wire identifier, a provider-level identifier, a display name, and the
//! exact serialized size of its public share. Registry membership is a
//! compile-time decision; the table is never mutated at runtime.

/// IANA identifier for secp256r1 (RFC 8446 "secp256r1")
pub const TLS_EC_CURVE_SECP_256_R1: u16 = 0x0017;
/// IANA identifier for secp384r1 (RFC 8446 "secp384r1")
pub const TLS_EC_CURVE_SECP_384_R1: u16 = 0x0018;
/// IANA identifier for x25519 (RFC 8446 "x25519")
pub const TLS_EC_CURVE_ECDH_X25519: u16 = 0x001D;

/// The two structurally different curve families handled by this crate.
///
/// NIST curves serialize as uncompressed SEC1 points and need on-curve
/// validation when parsing; the Montgomery curve uses a fixed 32-byte
/// u-coordinate encoding and accepts any 32-byte string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveFamily {
    /// Short-Weierstrass NIST curves (secp256r1, secp384r1)
    NistWeierstrass,
    /// Montgomery curve (x25519)
    Montgomery,
}

/// Provider-level curve identifier, used to dispatch to the backing
/// arithmetic implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    NistP256,
    NistP384,
    X25519,
}

impl CurveKind {
    /// The family this curve belongs to
    pub fn family(self) -> CurveFamily {
        match self {
            CurveKind::NistP256 | CurveKind::NistP384 => CurveFamily::NistWeierstrass,
            CurveKind::X25519 => CurveFamily::Montgomery,
        }
    }
}

/// A statically registered named curve.
///
/// `share_size` is the exact serialized length of the curve's public key
/// material: the uncompressed point `0x04 || X || Y` for NIST curves, the
/// fixed 32-byte encoding for x25519. Every serialization and parse boundary
/// asserts against this value.
#[derive(Debug, PartialEq, Eq)]
pub struct NamedCurve {
    /// IANA-assigned wire group identifier
    pub iana_id: u16,
    /// Identifier of the backing provider implementation
    pub kind: CurveKind,
    /// Display name
    pub name: &'static str,
    /// Exact serialized length of the public share, in bytes
    pub share_size: u16,
}

impl NamedCurve {
    /// The family this curve belongs to
    pub fn family(&self) -> CurveFamily {
        self.kind.family()
    }
}

pub static SECP256R1: NamedCurve = NamedCurve {
    iana_id: TLS_EC_CURVE_SECP_256_R1,
    kind: CurveKind::NistP256,
    name: "secp256r1",
    share_size: 65,
};

pub static SECP384R1: NamedCurve = NamedCurve {
    iana_id: TLS_EC_CURVE_SECP_384_R1,
    kind: CurveKind::NistP384,
    name: "secp384r1",
    share_size: 97,
};

pub static X25519: NamedCurve = NamedCurve {
    iana_id: TLS_EC_CURVE_ECDH_X25519,
    kind: CurveKind::X25519,
    name: "x25519",
    share_size: 32,
};

/// All curves this build supports, in registry order
pub static SUPPORTED_CURVES: [&NamedCurve; 3] = [&SECP256R1, &SECP384R1, &X25519];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_entries_are_distinct() {
        for (i, a) in SUPPORTED_CURVES.iter().enumerate() {
            for b in &SUPPORTED_CURVES[i + 1..] {
                assert_ne!(a.iana_id, b.iana_id);
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn share_sizes_match_wire_encodings() {
        assert_eq!(SECP256R1.share_size, 65);
        assert_eq!(SECP384R1.share_size, 97);
        assert_eq!(X25519.share_size, 32);
    }

    #[test]
    fn family_dispatch() {
        assert_eq!(SECP256R1.family(), CurveFamily::NistWeierstrass);
        assert_eq!(SECP384R1.family(), CurveFamily::NistWeierstrass);
        assert_eq!(X25519.family(), CurveFamily::Montgomery);
    }
}
