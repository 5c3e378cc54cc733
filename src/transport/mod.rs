//! # Transport Module
//!
//! Carries parcels between the adapter and the modem daemon socket.
//!
//! This module handles:
//! - Connecting to the rild Unix socket
//! - Length-prefixed framing with a size limit
//! - Splitting inbound parcels into solicited and unsolicited envelopes

pub mod frame_io;

use std::path::Path;

use bytes::Bytes;
use tokio::net::UnixStream;
use tracing::{debug, info};

use crate::error::{Result, RilError};
use crate::ril::protocol::{RESPONSE_SOLICITED, RESPONSE_UNSOLICITED};
use crate::ril::wire::WireBuffer;

pub use frame_io::{FrameIo, LengthPrefixed};

/// Framed connection to the modem daemon socket
pub type RilSocket = LengthPrefixed<UnixStream>;

/// Connect to the modem daemon socket
///
/// # Arguments
///
/// * `path` - Socket path (e.g., "/dev/socket/rild")
/// * `max_frame_bytes` - Largest parcel accepted in either direction
///
/// # Errors
///
/// Returns `RilError::Transport` if the socket cannot be reached
pub async fn connect<P: AsRef<Path>>(path: P, max_frame_bytes: usize) -> Result<RilSocket> {
    let path = path.as_ref();
    debug!("Connecting to {}", path.display());

    let stream = UnixStream::connect(path)
        .await
        .map_err(|e| RilError::Transport(format!("Failed to connect to {}: {}", path.display(), e)))?;

    info!("Connected to modem socket at {}", path.display());
    Ok(LengthPrefixed::new(stream, max_frame_bytes))
}

/// Inbound parcel split by response type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Reply to a request; `payload` is positioned after the header
    Solicited {
        serial: i32,
        error: i32,
        payload: WireBuffer,
    },
    /// Modem-originated event; the buffer is positioned at its code
    Unsolicited(WireBuffer),
}

impl Inbound {
    /// Parse the response envelope of one inbound parcel
    ///
    /// ```text
    /// solicited:   [0][serial][error][payload...]
    /// unsolicited: [1][code][payload...]
    /// ```
    ///
    /// # Errors
    ///
    /// `TruncatedBuffer` if the header is cut short, `MalformedResponse`
    /// for an unknown response type
    pub fn parse(frame: &Bytes) -> Result<Self> {
        let mut buf = WireBuffer::from(&frame[..]);

        match buf.read_i32()? {
            RESPONSE_SOLICITED => {
                let serial = buf.read_i32()?;
                let error = buf.read_i32()?;
                Ok(Inbound::Solicited {
                    serial,
                    error,
                    payload: buf,
                })
            }
            RESPONSE_UNSOLICITED => Ok(Inbound::Unsolicited(buf)),
            other => Err(RilError::malformed(format!("unknown response type {}", other))),
        }
    }

    /// Wire response type of this envelope
    pub fn response_type(&self) -> i32 {
        match self {
            Inbound::Solicited { .. } => RESPONSE_SOLICITED,
            Inbound::Unsolicited(_) => RESPONSE_UNSOLICITED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    fn frame(words: &[i32]) -> Bytes {
        let mut out = BytesMut::new();
        for word in words {
            out.put_i32_le(*word);
        }
        out.freeze()
    }

    #[test]
    fn test_parse_solicited() {
        let inbound = Inbound::parse(&frame(&[0, 42, 0, 7])).unwrap();
        assert_eq!(inbound.response_type(), RESPONSE_SOLICITED);

        match inbound {
            Inbound::Solicited { serial, error, mut payload } => {
                assert_eq!(serial, 42);
                assert_eq!(error, 0);
                assert_eq!(payload.position(), 12);
                assert_eq!(payload.read_i32().unwrap(), 7);
            }
            other => panic!("Expected solicited envelope, got: {:?}", other),
        }
    }

    #[test]
    fn test_parse_unsolicited_positions_at_code() {
        let inbound = Inbound::parse(&frame(&[1, 11057])).unwrap();
        assert_eq!(inbound.response_type(), RESPONSE_UNSOLICITED);

        match inbound {
            Inbound::Unsolicited(buf) => {
                assert_eq!(buf.position(), 4);
                assert_eq!(buf.peek_i32().unwrap(), 11057);
            }
            other => panic!("Expected unsolicited envelope, got: {:?}", other),
        }
    }

    #[test]
    fn test_parse_unknown_type() {
        assert!(matches!(
            Inbound::parse(&frame(&[5, 0])),
            Err(RilError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_truncated_header() {
        assert!(matches!(
            Inbound::parse(&frame(&[0, 42])),
            Err(RilError::TruncatedBuffer { .. })
        ));
        assert!(matches!(
            Inbound::parse(&Bytes::from_static(&[1, 0])),
            Err(RilError::TruncatedBuffer { .. })
        ));
    }

    #[tokio::test]
    async fn test_connect_missing_socket() {
        let dir = tempfile::tempdir().unwrap();
        let result = connect(dir.path().join("rild"), 8192).await;

        match result {
            Err(RilError::Transport(msg)) => assert!(msg.contains("Failed to connect")),
            other => panic!("Expected Transport error, got: {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_connect_and_exchange() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rild");
        let listener = tokio::net::UnixListener::bind(&path).unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut io = LengthPrefixed::new(stream, 8192);
            let request = io.read_frame().await.unwrap().unwrap();
            io.write_frame(&request).await.unwrap();
        });

        let mut socket = connect(&path, 8192).await.unwrap();
        let sent = frame(&[1, 11011]);
        socket.write_frame(&sent).await.unwrap();
        let echoed = socket.read_frame().await.unwrap().unwrap();
        assert_eq!(echoed, sent);

        server.await.unwrap();
    }
}
