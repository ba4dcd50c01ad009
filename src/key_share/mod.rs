// File: src/key_share/mod.rs
//! Client key_share extension (RFC 8446 section 4.2.8)
//!
//! Builds the outbound list of client key shares and parses the inbound
//! list, maintaining one [`KeyExchangeParams`] slot per entry in the active
//! preference list plus one slot for the peer's accepted share.
//!
//! Wire layout of the extension body:
//!
//! ```text
//! Client shares size (2 bytes)
//! Client shares:
//!      Named group (2 bytes)
//!      Key share size (2 bytes)
//!      Key share (variable size)
//! ```
//!
//! The outer extension type / extension length framing belongs to the
//! extension dispatcher and is not written here.
//!
//! Parsing is deliberately permissive, matching what peers actually send:
//! entries for unknown groups, duplicate groups, wrong share sizes, or
//! unparseable points are skipped rather than rejected. Only broken framing
//! is fatal. If nothing in the list was usable, the caller is told to
//! trigger a HelloRetryRequest instead of failing the handshake.

use rand::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;

use crate::ecdhe::KeyExchangeParams;
use crate::error::{validate, Error, Result};
use crate::preferences::PreferenceList;
use crate::stuffer::{WireReader, WireWriter};

/// IANA extension type for key_share
pub const KEY_SHARE_EXTENSION_TYPE: u16 = 51;

/// Length of the random field in a ServerHello
pub const TLS_RANDOM_LEN: usize = 32;

/// The special ServerHello random value that marks a HelloRetryRequest
/// (RFC 8446 section 4.1.3)
pub const HELLO_RETRY_REQUEST_RANDOM: [u8; TLS_RANDOM_LEN] = [
    0xCF, 0x21, 0xAD, 0x74, 0xE5, 0x9A, 0x61, 0x11, 0xBE, 0x1D, 0x8C, 0x02, 0x1E, 0x65, 0xB8,
    0x91, 0xC2, 0xA2, 0x11, 0x16, 0x7A, 0xBB, 0x8C, 0x5E, 0x07, 0x9E, 0x09, 0xE2, 0xC8, 0xA8,
    0x33, 0x9C,
];

const SIZE_OF_NAMED_GROUP: u32 = 2;
const SIZE_OF_KEY_SHARE_SIZE: u32 = 2;
const SIZE_OF_EXTENSION_TYPE: usize = 2;
const SIZE_OF_EXTENSION_DATA_SIZE: usize = 2;
const SIZE_OF_CLIENT_SHARES_SIZE: usize = 2;

/// What happened to a single received key-share entry.
///
/// Everything except `Matched` is tolerated and skipped; the distinction is
/// kept explicit so the receive loop never confuses tolerated conditions
/// with fatal ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareDisposition {
    /// Entry parsed and its slot now holds the peer's public key
    Matched,
    /// Named group is not in the active preference list
    UnsupportedGroup,
    /// A share for this group was already accepted earlier in the list
    DuplicateGroup,
    /// Declared share size differs from the group's registered size
    BadLength,
    /// Well-framed entry whose point failed validation
    UnparseablePoint,
}

/// Configuration surface consumed by the extension logic
pub struct KeyShareConfig {
    /// Active curve preference list
    pub preferences: &'static PreferenceList,
    /// Optional ordered list of IANA group ids to offer real shares for.
    /// Preference-list curves not named here get placeholder entries.
    pub preferred_key_shares: Vec<u16>,
    /// Interoperability mode: offer every curve with a zero-filled payload
    pub send_empty_key_shares: bool,
}

impl KeyShareConfig {
    /// Build a configuration from an ECC preference policy name
    pub fn new(policy: &str) -> Result<Self> {
        Ok(Self {
            preferences: crate::preferences::select(policy)?,
            preferred_key_shares: Vec::new(),
            send_empty_key_shares: false,
        })
    }
}

/// Per-connection key-share state: one client slot per preference-list
/// entry, plus the slot holding the curve and key the server selected.
pub struct KeyShareState {
    client_params: Vec<KeyExchangeParams>,
    /// The server's accepted curve and key, used to correlate an HRR re-offer
    pub server_params: KeyExchangeParams,
    /// Random field from the most recent ServerHello
    pub server_random: [u8; TLS_RANDOM_LEN],
    hello_retry_required: bool,
}

impl KeyShareState {
    pub fn new(config: &KeyShareConfig) -> Self {
        let mut client_params = Vec::with_capacity(config.preferences.count());
        client_params.resize_with(config.preferences.count(), KeyExchangeParams::new);
        Self {
            client_params,
            server_params: KeyExchangeParams::new(),
            server_random: [0; TLS_RANDOM_LEN],
            hello_retry_required: false,
        }
    }

    /// Client slot for the preference-list entry at `index`
    pub fn client_params(&self, index: usize) -> &KeyExchangeParams {
        &self.client_params[index]
    }

    /// Whether the stored server random marks the pending ClientHello as a
    /// response to a HelloRetryRequest
    pub fn is_hello_retry(&self) -> bool {
        bool::from(self.server_random.ct_eq(&HELLO_RETRY_REQUEST_RANDOM))
    }

    /// Mark that the handshake must continue with a HelloRetryRequest
    pub fn set_hello_retry_required(&mut self) {
        self.hello_retry_required = true;
    }

    pub fn hello_retry_required(&self) -> bool {
        self.hello_retry_required
    }

    /// Release every client slot and the server slot
    pub fn wipe(&mut self) {
        for slot in &mut self.client_params {
            slot.release();
        }
        self.server_params.release();
    }
}

/// Generate a key pair for the slot's pinned curve and write one key-share
/// entry: group id, share size, then the share itself.
fn send_ecdhe_parameters<R: CryptoRng + RngCore>(
    slot: &mut KeyExchangeParams,
    rng: &mut R,
    out: &mut WireWriter,
) -> Result<()> {
    let curve = slot.negotiated_curve.ok_or(Error::KeyGenerationFailed {
        curve: "none",
        details: "no curve negotiated for outbound key share",
    })?;
    slot.generate_ephemeral_key(rng)?;
    out.write_u16(curve.iana_id);
    out.write_u16(curve.share_size);
    slot.write_share_point(out)
}

/// Write a placeholder entry for `slot`: real group id and share size, but a
/// zero-filled payload and no generated key.
fn send_placeholder_parameters(slot: &mut KeyExchangeParams, out: &mut WireWriter) -> Result<()> {
    let curve = slot.negotiated_curve.ok_or(Error::SerializationFailed {
        context: "placeholder key share",
        details: "no curve negotiated for this slot",
    })?;
    out.write_u16(curve.iana_id);
    out.write_u16(curve.share_size);
    out.reserve_write(curve.share_size as usize);
    Ok(())
}

/// Re-offer after a HelloRetryRequest: discard every previous client share
/// and offer exactly one fresh share for the curve the server selected.
fn send_hrr_key_share<R: CryptoRng + RngCore>(
    state: &mut KeyShareState,
    rng: &mut R,
    out: &mut WireWriter,
) -> Result<()> {
    let named_curve = state
        .server_params
        .negotiated_curve
        .ok_or(Error::UnsupportedCurve {
            context: "retry re-offer: server selected no curve",
        })?;

    // Our original key shares weren't successful, so clear the old list
    for slot in &mut state.client_params {
        slot.release();
    }

    let slot = &mut state.client_params[0];
    slot.negotiated_curve = Some(named_curve);
    send_ecdhe_parameters(slot, rng, out)
}

/// Offer real shares for the configured group ids, in configured order, and
/// placeholder entries for every other preference-list curve.
fn send_config_key_shares<R: CryptoRng + RngCore>(
    config: &KeyShareConfig,
    state: &mut KeyShareState,
    rng: &mut R,
    out: &mut WireWriter,
) -> Result<()> {
    for iana_id in &config.preferred_key_shares {
        if let Some(index) = config.preferences.position(*iana_id) {
            let slot = &mut state.client_params[index];
            slot.release();
            slot.negotiated_curve = Some(config.preferences.curves[index]);
            send_ecdhe_parameters(slot, rng, out)?;
        }
    }

    for (index, curve) in config.preferences.curves.iter().enumerate() {
        let slot = &mut state.client_params[index];
        if !slot.has_key() {
            slot.negotiated_curve = Some(curve);
            send_placeholder_parameters(slot, out)?;
        }
    }
    Ok(())
}

/// Offer every preference-list curve with a zero-filled payload
fn send_empty_key_shares(
    config: &KeyShareConfig,
    state: &mut KeyShareState,
    out: &mut WireWriter,
) -> Result<()> {
    for (index, curve) in config.preferences.curves.iter().enumerate() {
        let slot = &mut state.client_params[index];
        slot.release();
        slot.negotiated_curve = Some(curve);
        send_placeholder_parameters(slot, out)?;
    }
    Ok(())
}

fn send_supported_curves<R: CryptoRng + RngCore>(
    config: &KeyShareConfig,
    state: &mut KeyShareState,
    rng: &mut R,
    out: &mut WireWriter,
) -> Result<()> {
    // From RFC 8446 section 4.1.2: after a HelloRetryRequest carrying a
    // key_share, replace the share list with a single entry from the
    // indicated group.
    if state.is_hello_retry() {
        return send_hrr_key_share(state, rng, out);
    }

    if !config.preferred_key_shares.is_empty() {
        return send_config_key_shares(config, state, rng, out);
    }

    if config.send_empty_key_shares {
        return send_empty_key_shares(config, state, out);
    }

    for (index, curve) in config.preferences.curves.iter().enumerate() {
        let slot = &mut state.client_params[index];
        slot.release();
        slot.negotiated_curve = Some(curve);
        send_ecdhe_parameters(slot, rng, out)?;
    }
    Ok(())
}

/// Write the extension body: a two-byte shares length followed by the
/// offered entries, chosen by the send decision tree (HRR re-offer,
/// config-pinned, empty-offer, or the full default offer).
pub fn send<R: CryptoRng + RngCore>(
    config: &KeyShareConfig,
    state: &mut KeyShareState,
    rng: &mut R,
    out: &mut WireWriter,
) -> Result<()> {
    let shares_size = out.reserve_u16();
    send_supported_curves(config, state, rng, out)?;
    out.finish_u16(shares_size)
}

/// Process one received entry and report its disposition
fn recv_key_share_entry(
    config: &KeyShareConfig,
    state: &mut KeyShareState,
    extension: &mut WireReader<'_>,
    named_group: u16,
    share_size: u16,
) -> Result<ShareDisposition> {
    let index = match config.preferences.position(named_group) {
        Some(index) => index,
        None => {
            // Ignore unsupported groups
            extension.skip_read(share_size as usize)?;
            return Ok(ShareDisposition::UnsupportedGroup);
        }
    };
    let supported_curve = config.preferences.curves[index];

    // Ignore groups we've already received material for
    if state.client_params[index].negotiated_curve.is_some() {
        extension.skip_read(share_size as usize)?;
        return Ok(ShareDisposition::DuplicateGroup);
    }

    // Ignore groups with unexpected share sizes
    if supported_curve.share_size != share_size {
        extension.skip_read(share_size as usize)?;
        return Ok(ShareDisposition::BadLength);
    }

    let point = extension.read_exact(share_size as usize)?;
    let slot = &mut state.client_params[index];
    slot.negotiated_curve = Some(supported_curve);
    if slot.parse_share_point(point).is_err() {
        // Ignore points we can't parse; the slot must not stay half-populated
        slot.release();
        return Ok(ShareDisposition::UnparseablePoint);
    }
    Ok(ShareDisposition::Matched)
}

/// Parse the extension body received from the peer.
///
/// Returns `true` if no offered share was usable, in which case the state is
/// also marked hello-retry-required; the surrounding handshake should
/// respond with a HelloRetryRequest rather than failing. Only framing
/// overruns are fatal ([`Error::BadMessage`]).
pub fn recv(
    config: &KeyShareConfig,
    state: &mut KeyShareState,
    extension: &mut WireReader<'_>,
) -> Result<bool> {
    let key_shares_size = extension.read_u16()?;
    validate::message(
        extension.bytes_remaining() >= key_shares_size as usize,
        "key share list overruns the extension",
    )?;

    let mut match_found = false;
    // Widened counter so `share_size + 4` cannot overflow
    let mut bytes_processed: u32 = 0;

    while bytes_processed < u32::from(key_shares_size) {
        let named_group = extension.read_u16()?;
        let share_size = extension.read_u16()?;
        validate::message(
            extension.bytes_remaining() >= share_size as usize,
            "key share overruns the share list",
        )?;
        bytes_processed += u32::from(share_size) + SIZE_OF_NAMED_GROUP + SIZE_OF_KEY_SHARE_SIZE;

        let disposition =
            recv_key_share_entry(config, state, extension, named_group, share_size)?;
        if disposition == ShareDisposition::Matched {
            match_found = true;
        }
    }

    // No usable share: the peer sent an empty list or nothing we support.
    // Ask for a retry instead of failing the extension.
    if !match_found {
        state.set_hello_retry_required();
    }
    Ok(!match_found)
}

/// Full on-wire size of the extension, outer type and length framing
/// included, for hello-message size accounting.
pub fn extension_size(config: &KeyShareConfig, state: &KeyShareState) -> usize {
    let mut size = SIZE_OF_EXTENSION_TYPE + SIZE_OF_EXTENSION_DATA_SIZE + SIZE_OF_CLIENT_SHARES_SIZE;
    let entry_overhead = (SIZE_OF_NAMED_GROUP + SIZE_OF_KEY_SHARE_SIZE) as usize;

    if state.is_hello_retry() {
        if let Some(named_curve) = state.server_params.negotiated_curve {
            if config.preferences.position(named_curve.iana_id).is_some() {
                size += entry_overhead + named_curve.share_size as usize;
            }
        }
        return size;
    }

    for curve in config.preferences.curves {
        size += entry_overhead + curve.share_size as usize;
    }
    size
}
