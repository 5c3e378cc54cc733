//! # Wire Buffer
//!
//! Cursor-based reader/writer over the modem's parcel format.
//!
//! ## Layout
//!
//! ```text
//! int32       4 bytes, little-endian
//! string16    int32 length in UTF-16 units (-1 = null)
//!             (length + 1) * 2 bytes UTF-16LE, zero terminated, padded to 4
//! byte array  int32 length (-1 = null), bytes padded to 4
//! ```
//!
//! Writes at a cursor that is not at the end overwrite the existing bytes,
//! which is what lets the unsolicited dispatcher patch a response code in
//! place and replay the same buffer.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{RilError, Result};

/// Marker length for a null string or byte array
const NULL_LENGTH: i32 = -1;

/// Round a byte count up to the 4-byte parcel alignment
fn pad4(len: usize) -> Option<usize> {
    len.checked_add(3).map(|n| n & !3)
}

/// Byte buffer with a read/write cursor
#[derive(Clone, Default, PartialEq, Eq)]
pub struct WireBuffer {
    data: BytesMut,
    pos: usize,
}

impl std::fmt::Debug for WireBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WireBuffer")
            .field("len", &self.data.len())
            .field("pos", &self.pos)
            .finish_non_exhaustive()
    }
}

impl From<Vec<u8>> for WireBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self {
            data: BytesMut::from(&data[..]),
            pos: 0,
        }
    }
}

impl From<&[u8]> for WireBuffer {
    fn from(data: &[u8]) -> Self {
        Self {
            data: BytesMut::from(data),
            pos: 0,
        }
    }
}

impl WireBuffer {
    /// Create an empty buffer for writing
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cursor position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the cursor back (or forward) to `pos`
    ///
    /// Positions past the end are clamped to the end.
    pub fn rewind_to(&mut self, pos: usize) {
        self.pos = pos.min(self.data.len());
    }

    /// Total number of bytes held
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left between the cursor and the end
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer, returning the underlying bytes
    pub fn freeze(self) -> Bytes {
        self.data.freeze()
    }

    fn take(&mut self, len: usize) -> Result<&[u8]> {
        let end = self.pos.checked_add(len).filter(|&end| end <= self.data.len());
        let Some(end) = end else {
            return Err(RilError::TruncatedBuffer {
                offset: self.pos,
                needed: len,
                available: self.remaining(),
            });
        };
        let start = self.pos;
        self.pos = end;
        Ok(&self.data[start..end])
    }

    /// Read a 4-byte little-endian integer
    pub fn read_i32(&mut self) -> Result<i32> {
        let mut raw = self.take(4)?;
        Ok(raw.get_i32_le())
    }

    /// Read the next integer without moving the cursor
    pub fn peek_i32(&self) -> Result<i32> {
        match self.data.get(self.pos..self.pos + 4) {
            Some(mut raw) => Ok(raw.get_i32_le()),
            None => Err(RilError::TruncatedBuffer {
                offset: self.pos,
                needed: 4,
                available: self.remaining(),
            }),
        }
    }

    /// Read a length-prefixed UTF-16 string, `None` for the null marker
    pub fn read_string(&mut self) -> Result<Option<String>> {
        let offset = self.pos;
        let len = self.read_i32()?;
        if len < 0 {
            return Ok(None);
        }

        let units = len as usize;
        let byte_len = units
            .checked_add(1)
            .and_then(|n| n.checked_mul(2))
            .and_then(pad4)
            .ok_or_else(|| RilError::malformed(format!("string length {} at offset {} overflows", len, offset)))?;
        let raw = self.take(byte_len)?;

        let utf16: Vec<u16> = raw
            .chunks_exact(2)
            .take(units)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        String::from_utf16(&utf16)
            .map(Some)
            .map_err(|_| RilError::malformed(format!("invalid UTF-16 string at offset {}", offset)))
    }

    /// Read a length-prefixed byte array, `None` for the null marker
    pub fn read_byte_array(&mut self) -> Result<Option<Vec<u8>>> {
        let len = self.read_i32()?;
        if len < 0 {
            return Ok(None);
        }

        let len = len as usize;
        let padded = pad4(len).ok_or_else(|| RilError::malformed("byte array length overflows"))?;
        let raw = self.take(padded)?;
        Ok(Some(raw[..len].to_vec()))
    }

    /// Read exactly `len` raw bytes with no prefix or padding
    pub fn read_raw(&mut self, len: usize) -> Result<Vec<u8>> {
        self.take(len).map(<[u8]>::to_vec)
    }

    fn put(&mut self, bytes: &[u8]) {
        let end = self.pos + bytes.len();
        if self.pos == self.data.len() {
            self.data.put_slice(bytes);
        } else {
            if end > self.data.len() {
                self.data.resize(end, 0);
            }
            self.data[self.pos..end].copy_from_slice(bytes);
        }
        self.pos = end;
    }

    /// Write a 4-byte little-endian integer at the cursor
    pub fn write_i32(&mut self, value: i32) {
        self.put(&value.to_le_bytes());
    }

    /// Write a length-prefixed UTF-16 string, or the null marker
    pub fn write_string(&mut self, value: Option<&str>) {
        let Some(value) = value else {
            self.write_i32(NULL_LENGTH);
            return;
        };

        let units: Vec<u16> = value.encode_utf16().collect();
        self.write_i32(units.len() as i32);

        let mut raw = Vec::with_capacity((units.len() + 2) * 2);
        for unit in units.iter().chain(std::iter::once(&0u16)) {
            raw.extend_from_slice(&unit.to_le_bytes());
        }
        raw.resize(raw.len().next_multiple_of(4), 0);
        self.put(&raw);
    }

    /// Write a length-prefixed byte array, or the null marker
    pub fn write_byte_array(&mut self, value: Option<&[u8]>) {
        let Some(value) = value else {
            self.write_i32(NULL_LENGTH);
            return;
        };

        self.write_i32(value.len() as i32);
        let mut raw = value.to_vec();
        raw.resize(raw.len().next_multiple_of(4), 0);
        self.put(&raw);
    }

    /// Patch the integer at `pos` without moving the cursor
    pub fn overwrite_i32_at(&mut self, pos: usize, value: i32) -> Result<()> {
        match self.data.get_mut(pos..pos + 4) {
            Some(slot) => {
                slot.copy_from_slice(&value.to_le_bytes());
                Ok(())
            }
            None => Err(RilError::TruncatedBuffer {
                offset: pos,
                needed: 4,
                available: self.data.len().saturating_sub(pos),
            }),
        }
    }
}
