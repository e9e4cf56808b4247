//! Async frame production.
//!
//! Same frame semantics as [`FrameReader`](super::FrameReader), but yields
//! at every read so a single-threaded event loop can interleave unrelated
//! sessions. Dropping the stream drops the source with it.

use async_stream::stream;
use bytes::Bytes;
use futures::Stream;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::{AudioFrame, ChunkPolicy};
use crate::errors::{ClientError, ClientResult};

/// Turn an async byte source into the outbound frame sequence.
///
/// The zeroth element is always the handshake carrying `config`; the
/// sequence is finite and ends at source EOF. An error ends the sequence;
/// nothing more is yielded after it.
pub fn encode_stream<R, C>(
    mut source: R,
    config: C,
    policy: ChunkPolicy,
) -> impl Stream<Item = ClientResult<AudioFrame<C>>>
where
    R: AsyncRead + Unpin,
{
    stream! {
        yield Ok(AudioFrame::Handshake(config));

        loop {
            match policy {
                ChunkPolicy::FixedSize { chunk_size } => {
                    let mut buf = vec![0u8; chunk_size];
                    let filled = match read_up_to(&mut source, &mut buf).await {
                        Ok(filled) => filled,
                        Err(e) => {
                            yield Err(e);
                            break;
                        }
                    };
                    if filled == 0 {
                        break;
                    }
                    buf.truncate(filled);
                    yield Ok(AudioFrame::Payload(Bytes::from(buf)));
                }
                ChunkPolicy::LengthPrefixed => {
                    let mut prefix = [0u8; 4];
                    let filled = match read_up_to(&mut source, &mut prefix).await {
                        Ok(filled) => filled,
                        Err(e) => {
                            yield Err(e);
                            break;
                        }
                    };
                    if filled < 4 {
                        // A missing or partial prefix is session end, not an error.
                        break;
                    }
                    let declared = u32::from_be_bytes(prefix) as usize;
                    let mut payload = vec![0u8; declared];
                    match read_up_to(&mut source, &mut payload).await {
                        Ok(got) if got < declared => {
                            yield Err(ClientError::TruncatedFrame(format!(
                                "frame declared {declared} bytes, source ended after {got}"
                            )));
                            break;
                        }
                        Ok(_) => yield Ok(AudioFrame::Payload(Bytes::from(payload))),
                        Err(e) => {
                            yield Err(e);
                            break;
                        }
                    }
                }
            }
        }
    }
}

/// Fill `buf` until full or EOF, returning the filled length.
async fn read_up_to<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> ClientResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
