//! Bounds-checked wire cursors
//!
//! [`WireReader`] walks untrusted network bytes and fails with
//! [`Error::BadMessage`] on any overrun. [`WireWriter`] builds outbound
//! messages and supports the TLS pattern of reserving a two-byte length
//! prefix that is backfilled once the framed content is known.

use crate::error::{validate, Error, Result};

/// Read cursor over received wire bytes
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not yet consumed
    pub fn bytes_remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Read a big-endian u16
    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_exact(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Read exactly `n` bytes
    pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
        validate::message(self.bytes_remaining() >= n, "unexpected end of message")?;
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Consume `n` bytes without looking at them
    pub fn skip_read(&mut self, n: usize) -> Result<()> {
        self.read_exact(n).map(|_| ())
    }
}

/// Marker for a reserved two-byte length prefix in a [`WireWriter`]
#[must_use]
pub struct LengthReservation {
    at: usize,
}

/// Write cursor for outbound wire bytes
#[derive(Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Write a big-endian u16
    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Write raw bytes
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Reserve `n` bytes of zero-filled output space and return it for the
    /// caller to fill in place. The space stays zeroed if the caller writes
    /// nothing, so placeholder payloads never carry stale memory.
    pub fn reserve_write(&mut self, n: usize) -> &mut [u8] {
        let start = self.buf.len();
        self.buf.resize(start + n, 0);
        &mut self.buf[start..]
    }

    /// Reserve space for a two-byte length prefix covering everything
    /// written after this call, to be backfilled by [`finish_u16`].
    ///
    /// [`finish_u16`]: WireWriter::finish_u16
    pub fn reserve_u16(&mut self) -> LengthReservation {
        let at = self.buf.len();
        self.buf.extend_from_slice(&[0, 0]);
        LengthReservation { at }
    }

    /// Backfill a reserved length prefix with the number of bytes written
    /// since the reservation was taken.
    pub fn finish_u16(&mut self, reservation: LengthReservation) -> Result<()> {
        let written = self.buf.len() - reservation.at - 2;
        let length = u16::try_from(written).map_err(|_| Error::SerializationFailed {
            context: "length prefix",
            details: "framed content exceeds 65535 bytes",
        })?;
        self.buf[reservation.at..reservation.at + 2].copy_from_slice(&length.to_be_bytes());
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
