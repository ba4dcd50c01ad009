use super::*;
use crate::curve::{SECP256R1, SECP384R1, SUPPORTED_CURVES, X25519};
use crate::error::Error;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn test_rng() -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(0x6b65795f7368)
}

fn generated_slot(curve: &'static NamedCurve, rng: &mut ChaCha20Rng) -> KeyExchangeParams {
    let mut slot = KeyExchangeParams::new();
    slot.negotiated_curve = Some(curve);
    slot.generate_ephemeral_key(rng).unwrap();
    slot
}

#[test]
fn share_sizes_match_registry() {
    let mut rng = test_rng();
    for curve in SUPPORTED_CURVES {
        let slot = generated_slot(curve, &mut rng);
        let share = slot.public_share_bytes().unwrap();
        assert_eq!(
            share.len(),
            curve.share_size as usize,
            "share size mismatch for {}",
            curve.name
        );
    }
}

#[test]
fn nist_shares_are_uncompressed_points() {
    let mut rng = test_rng();
    for curve in [&SECP256R1, &SECP384R1] {
        let slot = generated_slot(curve, &mut rng);
        let share = slot.public_share_bytes().unwrap();
        assert_eq!(share[0], 0x04, "{} share is not uncompressed", curve.name);
    }
}

#[test]
fn serialize_parse_roundtrip_yields_usable_key() {
    let mut rng = test_rng();
    for curve in SUPPORTED_CURVES {
        let own = generated_slot(curve, &mut rng);
        let share = own.public_share_bytes().unwrap();

        let mut peer = KeyExchangeParams::new();
        peer.negotiated_curve = Some(curve);
        peer.parse_share_point(&share).unwrap();
        assert!(peer.has_key());

        // A parsed slot can serve as the peer side of a derivation
        let other = generated_slot(curve, &mut rng);
        other.compute_shared_secret(&peer).unwrap();
    }
}

#[test]
fn shared_secrets_are_symmetric() {
    let mut rng = test_rng();
    for curve in SUPPORTED_CURVES {
        let alice = generated_slot(curve, &mut rng);
        let bob = generated_slot(curve, &mut rng);

        let mut bob_public = KeyExchangeParams::new();
        bob_public.negotiated_curve = Some(curve);
        bob_public
            .parse_share_point(&bob.public_share_bytes().unwrap())
            .unwrap();

        let mut alice_public = KeyExchangeParams::new();
        alice_public.negotiated_curve = Some(curve);
        alice_public
            .parse_share_point(&alice.public_share_bytes().unwrap())
            .unwrap();

        let alice_secret = alice.compute_shared_secret(&bob_public).unwrap();
        let bob_secret = bob.compute_shared_secret(&alice_public).unwrap();
        assert_eq!(
            alice_secret.as_slice(),
            bob_secret.as_slice(),
            "asymmetric secrets on {}",
            curve.name
        );
        assert!(!alice_secret.is_empty());
    }
}

#[test]
fn mismatched_curves_fail_derivation() {
    let mut rng = test_rng();
    let own = generated_slot(&SECP256R1, &mut rng);
    let peer = generated_slot(&SECP384R1, &mut rng);
    let err = own.compute_shared_secret(&peer).unwrap_err();
    assert!(matches!(err, Error::UnsupportedCurve { .. }));

    let peer = generated_slot(&X25519, &mut rng);
    let err = own.compute_shared_secret(&peer).unwrap_err();
    assert!(matches!(err, Error::UnsupportedCurve { .. }));
}

#[test]
fn parse_rejects_wrong_length() {
    for curve in SUPPORTED_CURVES {
        let short = vec![0x04; curve.share_size as usize - 1];
        let long = vec![0x04; curve.share_size as usize + 1];
        for bytes in [&short, &long] {
            let err = parse_public(curve, bytes).unwrap_err();
            assert!(matches!(err, Error::BadMessage { .. }));
        }
    }
}

#[test]
fn parse_rejects_invalid_nist_points() {
    for curve in [&SECP256R1, &SECP384R1] {
        // Wrong SEC1 tag byte
        let zeroes = vec![0u8; curve.share_size as usize];
        assert!(matches!(
            parse_public(curve, &zeroes).unwrap_err(),
            Error::BadMessage { .. }
        ));

        // Uncompressed tag but coordinates outside the field
        let mut overflow = vec![0xFF; curve.share_size as usize];
        overflow[0] = 0x04;
        assert!(matches!(
            parse_public(curve, &overflow).unwrap_err(),
            Error::BadMessage { .. }
        ));
    }
}

#[test]
fn x25519_low_order_peer_point_fails_derivation() {
    let mut rng = test_rng();
    let own = generated_slot(&X25519, &mut rng);

    // The all-zero u-coordinate is a low-order point; it parses (any 32
    // bytes are a valid x25519 encoding) but must not yield a secret.
    let mut peer = KeyExchangeParams::new();
    peer.negotiated_curve = Some(&X25519);
    peer.parse_share_point(&[0u8; 32]).unwrap();

    let err = own.compute_shared_secret(&peer).unwrap_err();
    assert!(matches!(err, Error::SharedSecretComputationFailed { .. }));
}

#[test]
fn derivation_requires_own_private_key() {
    let mut rng = test_rng();
    let own = generated_slot(&SECP256R1, &mut rng);
    let share = own.public_share_bytes().unwrap();

    // Both sides public-only: no private scalar to derive with
    let mut public_only = KeyExchangeParams::new();
    public_only.negotiated_curve = Some(&SECP256R1);
    public_only.parse_share_point(&share).unwrap();

    let err = public_only.compute_shared_secret(&public_only).unwrap_err();
    assert!(matches!(
        err,
        Error::SharedSecretComputationFailed { .. }
    ));
}

#[test]
fn release_is_idempotent() {
    let mut rng = test_rng();
    let mut slot = generated_slot(&X25519, &mut rng);
    assert!(slot.has_key());

    slot.release();
    assert!(!slot.has_key());
    assert!(slot.negotiated_curve.is_none());

    // Releasing an already-empty slot is a no-op
    slot.release();
    assert!(!slot.has_key());
}

#[test]
fn generate_requires_negotiated_curve() {
    let mut rng = test_rng();
    let mut slot = KeyExchangeParams::new();
    let err = slot.generate_ephemeral_key(&mut rng).unwrap_err();
    assert!(matches!(err, Error::KeyGenerationFailed { .. }));
}

#[test]
fn copy_domain_parameters_pins_matching_curve() {
    let mut rng = test_rng();
    let from = generated_slot(&SECP384R1, &mut rng);

    let mut to = KeyExchangeParams::new();
    to.negotiated_curve = Some(&SECP384R1);
    from.copy_domain_parameters(&mut to).unwrap();
    assert_eq!(to.negotiated_curve.unwrap().iana_id, SECP384R1.iana_id);
    assert!(!to.has_key());
}

#[test]
fn copy_domain_parameters_rejects_curve_mismatch() {
    let mut rng = test_rng();
    let from = generated_slot(&SECP256R1, &mut rng);

    let mut to = KeyExchangeParams::new();
    to.negotiated_curve = Some(&X25519);
    let err = from.copy_domain_parameters(&mut to).unwrap_err();
    assert!(matches!(err, Error::UnsupportedCurve { .. }));

    // Unpinned destination is also rejected
    let mut unpinned = KeyExchangeParams::new();
    let err = from.copy_domain_parameters(&mut unpinned).unwrap_err();
    assert!(matches!(err, Error::UnsupportedCurve { .. }));
}

#[test]
fn write_share_point_emits_exact_share_size() {
    let mut rng = test_rng();
    for curve in SUPPORTED_CURVES {
        let slot = generated_slot(curve, &mut rng);
        let mut out = WireWriter::new();
        slot.write_share_point(&mut out).unwrap();
        assert_eq!(out.len(), curve.share_size as usize);
        assert_eq!(out.as_bytes(), slot.public_share_bytes().unwrap());
    }
}
