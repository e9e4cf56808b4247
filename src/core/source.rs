//! Audio source handling.
//!
//! A call accepts either a path to an audio file or an in-memory buffer.
//! Both report their byte length up front, so oversize sources are rejected
//! before any frame is emitted.

use std::io::Cursor;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

use crate::errors::{ClientError, ClientResult};

/// Audio input for a recognition call.
#[derive(Debug, Clone)]
pub enum AudioSource {
    /// Path to an audio file on disk.
    Path(PathBuf),
    /// In-memory audio bytes.
    Buffer(Bytes),
}

impl AudioSource {
    /// Total byte length of the source.
    pub async fn byte_len(&self) -> ClientResult<u64> {
        match self {
            AudioSource::Path(path) => Ok(tokio::fs::metadata(path).await?.len()),
            AudioSource::Buffer(data) => Ok(data.len() as u64),
        }
    }

    /// Enforce the configured source size limit.
    pub async fn check_len(&self, max: u64) -> ClientResult<u64> {
        let size = self.byte_len().await?;
        if size > max {
            return Err(ClientError::OversizeSource { size, max });
        }
        Ok(size)
    }

    /// Open the source for streaming reads.
    pub async fn open(self) -> ClientResult<SourceReader> {
        match self {
            AudioSource::Path(path) => Ok(SourceReader::File(tokio::fs::File::open(path).await?)),
            AudioSource::Buffer(data) => Ok(SourceReader::Memory(Cursor::new(data))),
        }
    }

    /// Read the entire source into memory.
    pub async fn read_all(self) -> ClientResult<Bytes> {
        match self {
            AudioSource::Path(path) => Ok(tokio::fs::read(path).await?.into()),
            AudioSource::Buffer(data) => Ok(data),
        }
    }

    /// Open the source for blocking reads.
    pub fn open_blocking(self) -> ClientResult<BlockingSourceReader> {
        match self {
            AudioSource::Path(path) => Ok(BlockingSourceReader::File(std::fs::File::open(path)?)),
            AudioSource::Buffer(data) => Ok(BlockingSourceReader::Memory(Cursor::new(data))),
        }
    }
}

impl From<PathBuf> for AudioSource {
    fn from(path: PathBuf) -> Self {
        AudioSource::Path(path)
    }
}

impl From<&str> for AudioSource {
    fn from(path: &str) -> Self {
        AudioSource::Path(PathBuf::from(path))
    }
}

impl From<Bytes> for AudioSource {
    fn from(data: Bytes) -> Self {
        AudioSource::Buffer(data)
    }
}

impl From<Vec<u8>> for AudioSource {
    fn from(data: Vec<u8>) -> Self {
        AudioSource::Buffer(data.into())
    }
}

/// Async reader over an opened [`AudioSource`]. Dropping it releases the
/// underlying file handle.
pub enum SourceReader {
    File(tokio::fs::File),
    Memory(Cursor<Bytes>),
}

impl AsyncRead for SourceReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            SourceReader::File(file) => Pin::new(file).poll_read(cx, buf),
            SourceReader::Memory(cursor) => Pin::new(cursor).poll_read(cx, buf),
        }
    }
}

impl SourceReader {
    /// Drain the remaining bytes.
    pub async fn read_to_end_bytes(mut self) -> ClientResult<Vec<u8>> {
        let mut buffer = Vec::new();
        self.read_to_end(&mut buffer).await?;
        Ok(buffer)
    }
}

/// Blocking reader over an opened [`AudioSource`].
pub enum BlockingSourceReader {
    File(std::fs::File),
    Memory(Cursor<Bytes>),
}

impl std::io::Read for BlockingSourceReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            BlockingSourceReader::File(file) => std::io::Read::read(file, buf),
            BlockingSourceReader::Memory(cursor) => std::io::Read::read(cursor, buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_buffer_len_and_read() {
        let source = AudioSource::from(vec![1u8, 2, 3]);
        assert_eq!(source.byte_len().await.unwrap(), 3);
        assert_eq!(source.read_all().await.unwrap().as_ref(), &[1, 2, 3]);
    }

    #[tokio::test]
    async fn test_oversize_rejected_before_read() {
        let source = AudioSource::from(vec![0u8; 100]);
        let result = source.check_len(99).await;
        assert!(matches!(
            result,
            Err(ClientError::OversizeSource { size: 100, max: 99 })
        ));
        assert!(source.check_len(100).await.is_ok());
    }

    #[tokio::test]
    async fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audio.raw");
        tokio::fs::write(&path, b"pcm-bytes").await.unwrap();

        let source = AudioSource::Path(path);
        assert_eq!(source.byte_len().await.unwrap(), 9);
        let reader = source.open().await.unwrap();
        assert_eq!(reader.read_to_end_bytes().await.unwrap(), b"pcm-bytes");
    }
}
