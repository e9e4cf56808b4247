//! Outbound frame production for streaming recognition.
//!
//! A streaming call multiplexes one configuration handshake and a sequence
//! of audio payload frames into a single outbound stream. The first frame
//! always carries the session configuration and no audio; every later frame
//! carries only audio, in source byte order.
//!
//! Two chunking disciplines exist and share nothing beyond "produce a byte
//! chunk", so the policy is a tagged variant chosen once per session from
//! the negotiated encoding:
//!
//! - **fixed-size** - frames hold up to `chunk_size` bytes read straight
//!   from the source; the final frame may be short.
//! - **length-prefixed** - the source is already self-delimited: a 4-byte
//!   big-endian length precedes each frame's payload. Used for raw Opus.
//!
//! [`FrameReader`] is the blocking iterator form; [`stream::encode_stream`]
//! is the async form with identical frame semantics.

pub mod stream;

use std::io::Read;

use bytes::Bytes;

use crate::errors::{ClientError, ClientResult};

/// Chunking discipline for one streaming session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkPolicy {
    /// Payload frames of up to `chunk_size` bytes.
    FixedSize { chunk_size: usize },
    /// Payload frames delimited by a 4-byte big-endian length prefix.
    LengthPrefixed,
}

/// One outbound frame of a streaming session.
///
/// Ordering is significant: the handshake is always element zero, and
/// payload frames preserve source byte order.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioFrame<C> {
    /// Session configuration, zero audio bytes.
    Handshake(C),
    /// Raw audio bytes sized by the active chunking policy.
    Payload(Bytes),
}

impl<C> AudioFrame<C> {
    /// Payload bytes, or `None` for the handshake.
    pub fn payload(&self) -> Option<&Bytes> {
        match self {
            AudioFrame::Handshake(_) => None,
            AudioFrame::Payload(data) => Some(data),
        }
    }
}

enum ReaderState {
    Handshake,
    Streaming,
    Done,
}

/// Blocking frame producer over any [`Read`] source.
///
/// Lazy, forward-only and non-restartable; terminates at source EOF. The
/// source is dropped with the reader, so abandoning the iterator early
/// releases the underlying file handle.
pub struct FrameReader<R, C> {
    source: R,
    config: Option<C>,
    policy: ChunkPolicy,
    state: ReaderState,
}

impl<R: Read, C> FrameReader<R, C> {
    pub fn new(source: R, config: C, policy: ChunkPolicy) -> Self {
        Self {
            source,
            config: Some(config),
            policy,
            state: ReaderState::Handshake,
        }
    }

    fn next_payload(&mut self) -> ClientResult<Option<Bytes>> {
        match self.policy {
            ChunkPolicy::FixedSize { chunk_size } => {
                let mut buf = vec![0u8; chunk_size];
                let filled = read_up_to(&mut self.source, &mut buf)?;
                if filled == 0 {
                    return Ok(None);
                }
                buf.truncate(filled);
                Ok(Some(Bytes::from(buf)))
            }
            ChunkPolicy::LengthPrefixed => {
                let mut prefix = [0u8; 4];
                let filled = read_up_to(&mut self.source, &mut prefix)?;
                if filled < 4 {
                    // A missing or partial prefix is session end, not an error.
                    return Ok(None);
                }
                let declared = u32::from_be_bytes(prefix) as usize;
                let mut payload = vec![0u8; declared];
                let got = read_up_to(&mut self.source, &mut payload)?;
                if got < declared {
                    return Err(ClientError::TruncatedFrame(format!(
                        "frame declared {declared} bytes, source ended after {got}"
                    )));
                }
                Ok(Some(Bytes::from(payload)))
            }
        }
    }
}

impl<R: Read, C> Iterator for FrameReader<R, C> {
    type Item = ClientResult<AudioFrame<C>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            ReaderState::Handshake => {
                self.state = ReaderState::Streaming;
                let config = self.config.take().expect("handshake emitted once");
                Some(Ok(AudioFrame::Handshake(config)))
            }
            ReaderState::Streaming => match self.next_payload() {
                Ok(Some(data)) => Some(Ok(AudioFrame::Payload(data))),
                Ok(None) => {
                    self.state = ReaderState::Done;
                    None
                }
                Err(e) => {
                    self.state = ReaderState::Done;
                    Some(Err(e))
                }
            },
            ReaderState::Done => None,
        }
    }
}

/// Fill `buf` from `reader` until full or EOF, returning the filled length.
///
/// `Read::read` may return short counts mid-source; frame boundaries must
/// not depend on that.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> ClientResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Parse a length-prefixed buffer into `(declared_length, payload)` pairs.
///
/// The inverse of the length-prefixed framing: a trailing incomplete prefix
/// ends the sequence cleanly, while a payload shorter than its declared
/// length fails with [`ClientError::TruncatedFrame`].
pub fn decode_length_prefixed(buffer: &[u8]) -> ClientResult<Vec<(u32, Bytes)>> {
    let mut frames = Vec::new();
    let mut pos = 0;

    while buffer.len() - pos >= 4 {
        let prefix: [u8; 4] = buffer[pos..pos + 4].try_into().expect("4-byte slice");
        let declared = u32::from_be_bytes(prefix);
        pos += 4;

        let end = pos + declared as usize;
        if end > buffer.len() {
            return Err(ClientError::TruncatedFrame(format!(
                "frame declared {declared} bytes, buffer holds {}",
                buffer.len() - pos
            )));
        }
        frames.push((declared, Bytes::copy_from_slice(&buffer[pos..end])));
        pos = end;
    }

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn collect<R: Read>(reader: FrameReader<R, &'static str>) -> Vec<AudioFrame<&'static str>> {
        reader.map(|f| f.unwrap()).collect()
    }

    #[test]
    fn test_empty_source_yields_only_handshake() {
        let frames = collect(FrameReader::new(
            Cursor::new(Vec::new()),
            "config",
            ChunkPolicy::FixedSize { chunk_size: 4096 },
        ));
        assert_eq!(frames, vec![AudioFrame::Handshake("config")]);
    }

    #[test]
    fn test_empty_source_yields_only_handshake_length_prefixed() {
        let frames = collect(FrameReader::new(
            Cursor::new(Vec::new()),
            "config",
            ChunkPolicy::LengthPrefixed,
        ));
        assert_eq!(frames, vec![AudioFrame::Handshake("config")]);
    }

    #[test]
    fn test_fixed_size_chunking_and_reassembly() {
        let source: Vec<u8> = (0..10000u32).map(|i| (i % 251) as u8).collect();
        let frames = collect(FrameReader::new(
            Cursor::new(source.clone()),
            "config",
            ChunkPolicy::FixedSize { chunk_size: 4096 },
        ));

        assert_eq!(frames.len(), 4);
        assert!(matches!(frames[0], AudioFrame::Handshake("config")));
        let sizes: Vec<usize> = frames[1..]
            .iter()
            .map(|f| f.payload().unwrap().len())
            .collect();
        assert_eq!(sizes, vec![4096, 4096, 1808]);

        let reassembled: Vec<u8> = frames[1..]
            .iter()
            .flat_map(|f| f.payload().unwrap().to_vec())
            .collect();
        assert_eq!(reassembled, source);
    }

    #[test]
    fn test_short_final_frame_only() {
        let frames = collect(FrameReader::new(
            Cursor::new(vec![1u8; 100]),
            "config",
            ChunkPolicy::FixedSize { chunk_size: 4096 },
        ));
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].payload().unwrap().len(), 100);
    }

    #[test]
    fn test_length_prefixed_frames() {
        let mut source = Vec::new();
        source.extend_from_slice(&3u32.to_be_bytes());
        source.extend_from_slice(b"abc");
        source.extend_from_slice(&2u32.to_be_bytes());
        source.extend_from_slice(b"xy");

        let frames = collect(FrameReader::new(
            Cursor::new(source),
            "config",
            ChunkPolicy::LengthPrefixed,
        ));
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[1].payload().unwrap().as_ref(), b"abc");
        assert_eq!(frames[2].payload().unwrap().as_ref(), b"xy");
    }

    #[test]
    fn test_partial_prefix_is_clean_eof() {
        let mut source = Vec::new();
        source.extend_from_slice(&1u32.to_be_bytes());
        source.push(b'a');
        source.extend_from_slice(&[0, 0]); // two bytes of a second prefix

        let mut reader = FrameReader::new(Cursor::new(source), "config", ChunkPolicy::LengthPrefixed);
        assert!(matches!(reader.next(), Some(Ok(AudioFrame::Handshake(_)))));
        assert_eq!(
            reader.next().unwrap().unwrap().payload().unwrap().as_ref(),
            b"a"
        );
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_truncated_payload_is_error() {
        let mut source = Vec::new();
        source.extend_from_slice(&10u32.to_be_bytes());
        source.extend_from_slice(b"abc");

        let mut reader = FrameReader::new(Cursor::new(source), "config", ChunkPolicy::LengthPrefixed);
        reader.next().unwrap().unwrap(); // handshake
        assert!(matches!(
            reader.next(),
            Some(Err(ClientError::TruncatedFrame(_)))
        ));
        // The stream is dead after the error.
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_decode_length_prefixed() {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&[0, 0, 0, 3]);
        buffer.extend_from_slice(b"abc");
        buffer.extend_from_slice(&[0, 0, 0, 2]);
        buffer.extend_from_slice(b"xy");

        let frames = decode_length_prefixed(&buffer).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], (3, Bytes::from_static(b"abc")));
        assert_eq!(frames[1], (2, Bytes::from_static(b"xy")));
    }

    #[test]
    fn test_decode_trailing_incomplete_prefix_ends_cleanly() {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&[0, 0, 0, 1]);
        buffer.push(b'z');
        buffer.extend_from_slice(&[0, 0]); // incomplete prefix

        let frames = decode_length_prefixed(&buffer).unwrap();
        assert_eq!(frames, vec![(1, Bytes::from_static(b"z"))]);
    }

    #[test]
    fn test_decode_overdeclared_length_is_error() {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&[0, 0, 0, 3]);
        buffer.extend_from_slice(b"abc");
        buffer.extend_from_slice(&[0, 0, 0, 9]);
        buffer.extend_from_slice(b"xy");

        assert!(matches!(
            decode_length_prefixed(&buffer),
            Err(ClientError::TruncatedFrame(_))
        ));
    }

    #[test]
    fn test_decode_empty_buffer() {
        assert!(decode_length_prefixed(&[]).unwrap().is_empty());
    }
}
