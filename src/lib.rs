//! # tls-keyshare
//!
//! Ephemeral elliptic-curve key exchange for TLS 1.3, together with the
//! client-side `key_share` extension (RFC 8446 section 4.2.8) that carries
//! the resulting public values on the wire.
//!
//! Two curve families are supported behind one interface: the NIST
//! short-Weierstrass curves (secp256r1, secp384r1) and the Montgomery curve
//! x25519. Curve arithmetic is delegated to the `p256`, `p384` and
//! `x25519-dalek` crates; this crate owns the negotiation logic, the wire
//! framing, and the lifecycle of the per-connection key material.
//!
//! ## Usage
//!
//! ```
//! use rand::rngs::OsRng;
//! use tls_keyshare::key_share::{KeyShareConfig, KeyShareState};
//! use tls_keyshare::stuffer::WireWriter;
//!
//! let config = KeyShareConfig::new("default_tls13")?;
//! let mut state = KeyShareState::new(&config);
//!
//! let mut out = WireWriter::new();
//! tls_keyshare::key_share::send(&config, &mut state, &mut OsRng, &mut out)?;
//! # Ok::<(), tls_keyshare::Error>(())
//! ```

pub mod curve;
pub mod ecdhe;
pub mod error;
pub mod key_share;
pub mod preferences;
pub mod stuffer;

// Re-exports
pub use curve::{CurveFamily, CurveKind, NamedCurve};
pub use ecdhe::{KeyExchangeParams, KeyHandle};
pub use error::{Error, Result};
pub use key_share::{KeyShareConfig, KeyShareState};
pub use preferences::{select, PreferenceList};
pub use stuffer::{WireReader, WireWriter};
