//! Inbound audio reassembly for synthesis.
//!
//! Synthesized audio arrives as a stream of raw payload chunks, one stream
//! per utterance. Each chunk is decoded to signed 16-bit samples, the
//! samples are accumulated in arrival order, and the finished buffer is
//! written once as an uncompressed mono WAV file.
//!
//! Decoder state is scoped to a single utterance: an Opus decoder carries
//! prediction state across chunks of one stream, and reusing it for a
//! second utterance would leak that state between unrelated audio. Create
//! one [`SampleDecoder`] per utterance and drop it with the response loop.

use std::path::Path;

use crate::core::tts::proto::AudioEncoding;
use crate::errors::{ClientError, ClientResult};

/// Opus frame duration the service synthesizes at, in milliseconds.
const OPUS_FRAME_MILLIS: usize = 120;

/// Per-utterance chunk decoder producing signed 16-bit samples.
pub enum SampleDecoder {
    /// Pass-through for 16-bit little-endian linear PCM. A chunk boundary
    /// may split a sample, so a dangling byte is carried to the next chunk.
    Linear16 { pending: Option<u8> },
    /// Stateful Opus decoder, mono, fixed frame duration.
    Opus {
        decoder: opus::Decoder,
        frame_size: usize,
    },
}

impl SampleDecoder {
    /// Create a decoder for one utterance of the given encoding.
    ///
    /// Fails with [`ClientError::UnsupportedEncoding`] for encodings this
    /// client cannot decode, and [`ClientError::InvalidConfiguration`] if
    /// the Opus decoder rejects the sample rate.
    pub fn new(encoding: AudioEncoding, sample_rate: u32) -> ClientResult<Self> {
        match encoding {
            AudioEncoding::Linear16 => Ok(SampleDecoder::Linear16 { pending: None }),
            AudioEncoding::RawOpus => {
                let decoder = opus::Decoder::new(sample_rate, opus::Channels::Mono)
                    .map_err(|e| {
                        ClientError::InvalidConfiguration(format!(
                            "opus decoder rejected sample rate {sample_rate}: {e}"
                        ))
                    })?;
                Ok(SampleDecoder::Opus {
                    decoder,
                    frame_size: sample_rate as usize * OPUS_FRAME_MILLIS / 1000,
                })
            }
            other => Err(ClientError::UnsupportedEncoding(format!(
                "no decoder for {other:?}"
            ))),
        }
    }

    /// Decode one inbound chunk to samples.
    ///
    /// Malformed compressed data fails with [`ClientError::CodecDecode`];
    /// previously decoded samples are unaffected.
    pub fn decode(&mut self, chunk: &[u8]) -> ClientResult<Vec<i16>> {
        match self {
            SampleDecoder::Linear16 { pending } => {
                let mut samples = Vec::with_capacity((chunk.len() + 1) / 2);
                let mut bytes = chunk.iter().copied();

                if let Some(low) = pending.take() {
                    match bytes.next() {
                        Some(high) => samples.push(i16::from_le_bytes([low, high])),
                        None => {
                            *pending = Some(low);
                            return Ok(samples);
                        }
                    }
                }
                loop {
                    match (bytes.next(), bytes.next()) {
                        (Some(low), Some(high)) => samples.push(i16::from_le_bytes([low, high])),
                        (Some(low), None) => {
                            *pending = Some(low);
                            break;
                        }
                        _ => break,
                    }
                }
                Ok(samples)
            }
            SampleDecoder::Opus {
                decoder,
                frame_size,
            } => {
                let mut samples = vec![0i16; *frame_size];
                let decoded = decoder
                    .decode(chunk, &mut samples, false)
                    .map_err(|e| ClientError::CodecDecode(format!("opus: {e}")))?;
                samples.truncate(decoded);
                Ok(samples)
            }
        }
    }
}

/// Concatenate decoded chunks of one utterance in arrival order.
pub fn accumulate<I>(chunks: I) -> Vec<i16>
where
    I: IntoIterator<Item = Vec<i16>>,
{
    let mut buffer = Vec::new();
    for chunk in chunks {
        buffer.extend_from_slice(&chunk);
    }
    buffer
}

/// Write an accumulated sample buffer as a canonical uncompressed WAV file.
///
/// 16 bits per sample; the frame count equals `samples.len()`. Parent
/// directories are created if absent and prior content at `path` is fully
/// replaced.
pub fn write_wav(
    samples: &[i16],
    path: &Path,
    sample_rate: u32,
    channels: u16,
) -> ClientResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear16_pass_through() {
        let mut decoder = SampleDecoder::new(AudioEncoding::Linear16, 16000).unwrap();
        let chunk: Vec<u8> = [1i16, -2, 300]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        assert_eq!(decoder.decode(&chunk).unwrap(), vec![1, -2, 300]);
    }

    #[test]
    fn test_linear16_carries_split_sample_across_chunks() {
        let mut decoder = SampleDecoder::new(AudioEncoding::Linear16, 16000).unwrap();
        let bytes = 513i16.to_le_bytes();

        assert!(decoder.decode(&bytes[..1]).unwrap().is_empty());
        assert_eq!(decoder.decode(&bytes[1..]).unwrap(), vec![513]);
    }

    #[test]
    fn test_unsupported_encoding() {
        let result = SampleDecoder::new(AudioEncoding::Mulaw, 16000);
        assert!(matches!(result, Err(ClientError::UnsupportedEncoding(_))));
    }

    #[test]
    fn test_opus_decoder_rejects_bad_rate() {
        // libopus only accepts 8/12/16/24/48 kHz
        let result = SampleDecoder::new(AudioEncoding::RawOpus, 44100);
        assert!(matches!(result, Err(ClientError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_opus_malformed_data_is_codec_error() {
        let mut decoder = SampleDecoder::new(AudioEncoding::RawOpus, 48000).unwrap();
        let result = decoder.decode(&[0xFF, 0x00, 0x13, 0x37]);
        assert!(matches!(result, Err(ClientError::CodecDecode(_))));
    }

    #[test]
    fn test_accumulate_preserves_order() {
        let buffer = accumulate(vec![vec![1, 2], vec![], vec![3], vec![4, 5]]);
        assert_eq!(buffer, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_write_wav_header_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.wav");

        write_wav(&[100, -200], &path, 48000, 1).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 48000);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 2); // 2 frames, 4 audio bytes

        let samples: Vec<i16> = reader.into_samples().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![100, -200]);
    }

    #[test]
    fn test_write_wav_replaces_prior_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");

        write_wav(&[1, 2, 3, 4, 5], &path, 16000, 1).unwrap();
        write_wav(&[9], &path, 16000, 1).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.len(), 1);
    }
}
