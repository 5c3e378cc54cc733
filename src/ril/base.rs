//! # Base Protocol Collaborator
//!
//! The vendor adapter composes over the generic telephony core rather than
//! replacing it. This module holds the slice of the base protocol the
//! adapter delegates to: its generic payload decoders and its unsolicited
//! handler.

use crate::error::{RilError, Result};
use super::wire::WireBuffer;

/// Generic unsolicited handler owned by the telephony core
///
/// The buffer is positioned at the response code (just after the envelope
/// type), exactly as the transport delivered it or as rewritten by a remap.
pub trait BaseProtocol {
    fn process_unsolicited(&mut self, buf: &mut WireBuffer, response_type: i32);
}

impl<T: BaseProtocol + ?Sized> BaseProtocol for Box<T> {
    fn process_unsolicited(&mut self, buf: &mut WireBuffer, response_type: i32) {
        (**self).process_unsolicited(buf, response_type)
    }
}

/// Decode a counted list of integers
pub fn response_ints(buf: &mut WireBuffer) -> Result<Vec<i32>> {
    let count = buf.read_i32()?;
    let count = usize::try_from(count)
        .map_err(|_| RilError::malformed(format!("negative int count: {}", count)))?;

    // Each entry needs four bytes; reject counts the buffer cannot hold
    // before allocating for them.
    if count > buf.remaining() / 4 {
        return Err(RilError::TruncatedBuffer {
            offset: buf.position(),
            needed: count.saturating_mul(4),
            available: buf.remaining(),
        });
    }

    (0..count).map(|_| buf.read_i32()).collect()
}

/// Decode a single nullable string
pub fn response_string(buf: &mut WireBuffer) -> Result<Option<String>> {
    buf.read_string()
}

/// Decode a counted array of nullable strings
pub fn response_strings(buf: &mut WireBuffer) -> Result<Vec<Option<String>>> {
    let count = buf.read_i32()?;
    let count = usize::try_from(count)
        .map_err(|_| RilError::malformed(format!("negative string count: {}", count)))?;

    if count > buf.remaining() / 4 {
        return Err(RilError::TruncatedBuffer {
            offset: buf.position(),
            needed: count.saturating_mul(4),
            available: buf.remaining(),
        });
    }

    (0..count).map(|_| buf.read_string()).collect()
}

/// Payload-less response; consumes nothing
pub fn response_void(_buf: &mut WireBuffer) -> Result<()> {
    Ok(())
}
