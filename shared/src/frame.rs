//! Length-prefixed packet framing over a byte stream
//!
//! Wire format: `[4-byte big-endian length][bincode payload]`. The reader
//! consumes a whole frame before decoding, so a payload that fails to decode
//! leaves the stream aligned on the next frame and the connection usable.

use crate::Packet;
use bincode::{deserialize, serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest payload accepted in either direction (64 KiB)
pub const MAX_FRAME_SIZE: u32 = 64 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Empty frame")]
    Empty,

    #[error("Frame too large: {0} bytes")]
    TooLarge(u32),

    #[error("Invalid packet: {0}")]
    Decode(#[from] bincode::Error),
}

impl FrameError {
    /// A decode failure leaves the stream intact; everything else ends the connection.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FrameError::Decode(_))
    }
}

fn map_eof(e: std::io::Error) -> FrameError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        FrameError::ConnectionClosed
    } else {
        FrameError::Io(e)
    }
}

/// Encodes a packet into a complete frame, length prefix included
pub fn encode(packet: &Packet) -> Result<Vec<u8>, FrameError> {
    let payload = serialize(packet)?;
    let len = payload.len() as u32;
    if len > MAX_FRAME_SIZE {
        return Err(FrameError::TooLarge(len));
    }

    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Reads one frame and decodes its packet
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Packet, FrameError> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await.map_err(map_eof)?;

    let len = u32::from_be_bytes(len_buf);
    if len == 0 {
        return Err(FrameError::Empty);
    }
    if len > MAX_FRAME_SIZE {
        return Err(FrameError::TooLarge(len));
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await.map_err(map_eof)?;

    Ok(deserialize(&payload)?)
}

/// Writes one packet as a frame and flushes it
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    packet: &Packet,
) -> Result<(), FrameError> {
    let frame = encode(packet)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_frame_roundtrip() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &Packet::VoteFinal { target_id: 9 })
            .await
            .unwrap();

        let mut cursor = Cursor::new(buf);
        let decoded = read_frame(&mut cursor).await.unwrap();
        assert_eq!(decoded, Packet::VoteFinal { target_id: 9 });
    }

    #[tokio::test]
    async fn test_frame_split_across_reads() {
        let frame = encode(&Packet::SendChat {
            message: "fever and cough".to_string(),
        })
        .unwrap();

        let mut reader = tokio_test::io::Builder::new()
            .read(&frame[..2])
            .read(&frame[2..7])
            .read(&frame[7..])
            .build();

        let decoded = read_frame(&mut reader).await.unwrap();
        assert_eq!(
            decoded,
            Packet::SendChat {
                message: "fever and cough".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_empty_frame_rejected() {
        let mut cursor = Cursor::new(vec![0, 0, 0, 0]);
        let result = read_frame(&mut cursor).await;
        assert!(matches!(result, Err(FrameError::Empty)));
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let len = (MAX_FRAME_SIZE + 1).to_be_bytes();
        let mut cursor = Cursor::new(len.to_vec());
        let result = read_frame(&mut cursor).await;
        assert!(matches!(result, Err(FrameError::TooLarge(_))));
    }

    #[tokio::test]
    async fn test_truncated_stream_is_closed_connection() {
        let frame = encode(&Packet::StartGame).unwrap();
        let mut cursor = Cursor::new(frame[..frame.len() - 1].to_vec());
        let result = read_frame(&mut cursor).await;
        assert!(matches!(result, Err(FrameError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_garbage_payload_keeps_stream_aligned() {
        let mut bytes = vec![0, 0, 0, 4, 0xFF, 0xFF, 0xFF, 0xFF];
        bytes.extend(encode(&Packet::Ping).unwrap());
        let mut cursor = Cursor::new(bytes);

        let first = read_frame(&mut cursor).await;
        match first {
            Err(e) => assert!(e.is_recoverable()),
            Ok(p) => panic!("Garbage decoded as {:?}", p),
        }

        let second = read_frame(&mut cursor).await.unwrap();
        assert_eq!(second, Packet::Ping);
    }
}
