//! Trait abstraction for framed socket I/O to enable testing

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Result, RilError};

/// Size of the big-endian length prefix ahead of every parcel
pub const FRAME_HEADER_LEN: usize = 4;

/// Trait for reading and writing length-prefixed parcels
#[async_trait]
pub trait FrameIo: Send {
    /// Read the next parcel; `None` on a clean end of stream
    async fn read_frame(&mut self) -> Result<Option<Bytes>>;

    /// Write one parcel with its length prefix
    async fn write_frame(&mut self, frame: &[u8]) -> Result<()>;
}

/// Length-prefixed framing over any async byte stream
pub struct LengthPrefixed<T> {
    io: T,
    max_frame_bytes: usize,
}

impl<T> std::fmt::Debug for LengthPrefixed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LengthPrefixed")
            .field("max_frame_bytes", &self.max_frame_bytes)
            .finish_non_exhaustive()
    }
}

impl<T> LengthPrefixed<T> {
    pub fn new(io: T, max_frame_bytes: usize) -> Self {
        Self { io, max_frame_bytes }
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len == 0 {
            return Err(RilError::Transport("zero-length frame".to_string()));
        }
        if len > self.max_frame_bytes {
            return Err(RilError::Transport(format!(
                "frame of {} bytes exceeds limit of {}",
                len, self.max_frame_bytes
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<T> FrameIo for LengthPrefixed<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn read_frame(&mut self) -> Result<Option<Bytes>> {
        let mut header = [0u8; FRAME_HEADER_LEN];
        let mut filled = 0;
        while filled < FRAME_HEADER_LEN {
            let n = self.io.read(&mut header[filled..]).await?;
            if n == 0 {
                // Only a close between frames is clean
                if filled == 0 {
                    return Ok(None);
                }
                return Err(RilError::Transport(format!(
                    "stream ended inside frame header after {} of {} bytes",
                    filled, FRAME_HEADER_LEN
                )));
            }
            filled += n;
        }

        let len = u32::from_be_bytes(header) as usize;
        self.check_len(len)?;

        let mut frame = vec![0u8; len];
        self.io.read_exact(&mut frame).await.map_err(|e| {
            RilError::Transport(format!("stream ended inside a {} byte frame: {}", len, e))
        })?;
        Ok(Some(Bytes::from(frame)))
    }

    async fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.check_len(frame.len())?;

        self.io.write_u32(frame.len() as u32).await?;
        self.io.write_all(frame).await?;
        self.io.flush().await?;
        Ok(())
    }
}
