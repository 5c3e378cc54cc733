//! # Request Encoder
//!
//! Builds outgoing request payloads for the commands whose layout differs
//! on Exynos modems. Everything here is a pure transformation; the result
//! is handed to the transport by the caller.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use super::protocol::*;
use super::quirks::QuirkConfig;
use super::wire::WireBuffer;

/// Request code plus its encoded payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorRequest {
    pub code: i32,
    pub payload: WireBuffer,
}

impl VendorRequest {
    /// Wrap the payload in the base request envelope
    ///
    /// ```text
    /// [code: i32][serial: i32][payload...]
    /// ```
    pub fn into_frame(self, serial: i32) -> Bytes {
        debug!("[{:04}]> {}", serial, request_to_string(self.code));

        let payload = self.payload.freeze();
        let mut frame = BytesMut::with_capacity(8 + payload.len());
        frame.put_i32_le(self.code);
        frame.put_i32_le(serial);
        frame.put_slice(&payload);
        frame.freeze()
    }
}

/// Encode an answer request for the call at `index`
///
/// The vendor firmware expects an explicit one-element int list; the plain
/// base protocol answer carries no payload.
pub fn encode_accept_call(index: i32) -> VendorRequest {
    let mut payload = WireBuffer::new();
    payload.write_i32(1);
    payload.write_i32(index);

    VendorRequest {
        code: RIL_REQUEST_ANSWER,
        payload,
    }
}

/// Encode a dial request
///
/// # Arguments
///
/// * `address` - Number to dial
/// * `clir_mode` - Caller-id restriction mode
/// * `uus_info` - Optional user-to-user signalling payload
/// * `quirks` - Modem quirks; `next_gen_call_details` inserts a fixed
///   `[0, 1, ""]` call-details stanza after `clir_mode`
///
/// # Layout
///
/// ```text
/// [address][clir_mode]{[0][1][""]}[uus_present]{[type][dcs][data]}
/// ```
pub fn encode_dial(
    address: &str,
    clir_mode: i32,
    uus_info: Option<&UusInfo>,
    quirks: &QuirkConfig,
) -> VendorRequest {
    let mut payload = WireBuffer::new();
    payload.write_string(Some(address));
    payload.write_i32(clir_mode);

    if quirks.next_gen_call_details {
        // Call details: type, domain, extras
        payload.write_i32(0);
        payload.write_i32(1);
        payload.write_string(Some(""));
    }

    match uus_info {
        None => payload.write_i32(0),
        Some(uus) => {
            payload.write_i32(1);
            payload.write_i32(uus.uus_type);
            payload.write_i32(uus.dcs);
            payload.write_byte_array(uus.user_data.as_deref());
        }
    }

    VendorRequest {
        code: RIL_REQUEST_DIAL,
        payload,
    }
}

/// Encode a plain send-SMS request
pub fn encode_send_sms_as_plain(smsc_pdu: Option<&str>, pdu: &str) -> VendorRequest {
    let mut payload = WireBuffer::new();
    payload.write_i32(2);
    payload.write_string(smsc_pdu);
    payload.write_string(Some(pdu));

    VendorRequest {
        code: RIL_REQUEST_SEND_SMS,
        payload,
    }
}

/// Encode a send-SMS "expect more" request
///
/// The firmware mishandles SEND_SMS_EXPECT_MORE, so this always produces a
/// plain SEND_SMS with the same arguments.
pub fn encode_send_sms_expect_more(smsc_pdu: Option<&str>, pdu: &str) -> VendorRequest {
    debug!(
        "Downgrading {} to {}",
        request_to_string(RIL_REQUEST_SEND_SMS_EXPECT_MORE),
        request_to_string(RIL_REQUEST_SEND_SMS)
    );
    encode_send_sms_as_plain(smsc_pdu, pdu)
}
