//! ECC preference lists
//!
//! Named, ordered subsets of the curve registry. A list is selected once per
//! configuration by policy name and is immutable afterwards; its order is the
//! offer order on the wire, and the index of a curve within the list is the
//! index of the matching key-exchange slot on the connection.

use crate::curve::{NamedCurve, SECP256R1, SECP384R1, X25519};
use crate::error::{Error, Result};

/// An ordered list of curves to offer, most preferred first
#[derive(Debug, PartialEq, Eq)]
pub struct PreferenceList {
    pub curves: &'static [&'static NamedCurve],
}

impl PreferenceList {
    /// Number of curves in the list
    pub fn count(&self) -> usize {
        self.curves.len()
    }

    /// Position of the curve with the given IANA identifier, if present.
    /// Identifiers are never duplicated within a list.
    pub fn position(&self, iana_id: u16) -> Option<usize> {
        self.curves.iter().position(|c| c.iana_id == iana_id)
    }
}

/// Legacy NIST-only list
pub static PREFERENCES_20140601: PreferenceList = PreferenceList {
    curves: &[&SECP256R1, &SECP384R1],
};

/// Modern list, x25519 first
pub static PREFERENCES_20200310: PreferenceList = PreferenceList {
    curves: &[&X25519, &SECP256R1, &SECP384R1],
};

static SELECTION: [(&str, &PreferenceList); 4] = [
    ("default", &PREFERENCES_20140601),
    ("default_tls13", &PREFERENCES_20200310),
    ("20200310", &PREFERENCES_20200310),
    ("20140601", &PREFERENCES_20140601),
];

/// Look up a preference list by policy name.
///
/// Matching is ASCII case-insensitive. Unrecognized names fail with
/// [`Error::UnknownPolicy`].
pub fn select(version: &str) -> Result<&'static PreferenceList> {
    for (name, preferences) in &SELECTION {
        if version.eq_ignore_ascii_case(name) {
            return Ok(preferences);
        }
    }
    Err(Error::UnknownPolicy {
        version: version.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::TLS_EC_CURVE_ECDH_X25519;

    #[test]
    fn select_is_case_insensitive() {
        let lower = select("default").unwrap();
        let mixed = select("dEfAUlT").unwrap();
        let upper = select("DEFAULT").unwrap();
        assert!(std::ptr::eq(lower, mixed));
        assert!(std::ptr::eq(lower, upper));
        assert!(std::ptr::eq(lower, &PREFERENCES_20140601));
    }

    #[test]
    fn select_unknown_policy_fails() {
        let err = select("notathing").unwrap_err();
        assert!(matches!(err, Error::UnknownPolicy { .. }));
    }

    #[test]
    fn tls13_policies_share_the_modern_list() {
        let tls13 = select("default_tls13").unwrap();
        let dated = select("20200310").unwrap();
        assert!(std::ptr::eq(tls13, dated));
        assert_eq!(tls13.count(), 3);
        assert_eq!(tls13.curves[0].iana_id, TLS_EC_CURVE_ECDH_X25519);
    }

    #[test]
    fn legacy_list_is_nist_only() {
        let legacy = select("20140601").unwrap();
        assert_eq!(legacy.count(), 2);
        assert!(legacy.position(TLS_EC_CURVE_ECDH_X25519).is_none());
    }

    #[test]
    fn position_follows_list_order() {
        let prefs = select("default_tls13").unwrap();
        for (i, curve) in prefs.curves.iter().enumerate() {
            assert_eq!(prefs.position(curve.iana_id), Some(i));
        }
        assert_eq!(prefs.position(0xFFFF), None);
    }
}
