//! Network-free end-to-end coverage of the streaming transport core:
//! token minting, outbound frame production under both chunking policies,
//! inbound sample reassembly to WAV, and storage URI resolution.

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::{pin_mut, StreamExt};

use voxkit_client::core::codec::stream::encode_stream;
use voxkit_client::core::stt::proto::{AudioEncoding, RecognitionConfig};
use voxkit_client::core::stt::chunk_policy;
use voxkit_client::core::tts::proto::AudioEncoding as SynthesisEncoding;
use voxkit_client::{
    accumulate, decode_length_prefixed, is_storage_uri, resolve, write_wav, AudioFrame,
    ChunkPolicy, ClientError, ClientResult, FrameReader, ObjectUploader, ResourceUri,
    SampleDecoder, SessionToken,
};

fn stream_config() -> RecognitionConfig {
    RecognitionConfig {
        encoding: AudioEncoding::Linear16 as i32,
        sample_rate_hertz: 16000,
        num_channels: 1,
        language_code: "en-US".to_string(),
        ..Default::default()
    }
}

#[test]
fn token_is_fresh_and_reflects_refresh() {
    let mut token = SessionToken::new("key-id", "c2VjcmV0LWtleQ", "voxkit.cloud.stt").unwrap();
    assert!(token.is_fresh());
    assert_eq!(token.audience(), "voxkit.cloud.stt");

    let first_jwt = token.jwt().to_string();
    token.refresh().unwrap();
    let headers = token.credential_headers();
    assert_eq!(headers[0].0, "authorization");
    assert_eq!(headers[0].1, format!("Bearer {}", token.jwt()));
    assert_eq!(headers[1], ("x-api-key", "key-id".to_string()));
    // Header and payload survive the refresh with the same shape.
    assert_eq!(
        first_jwt.split('.').count(),
        token.jwt().split('.').count()
    );
}

#[test]
fn fixed_size_frames_round_trip_through_reassembly() {
    let audio: Vec<u8> = (0..10000u32).map(|i| (i * 7 % 256) as u8).collect();
    let policy = chunk_policy(AudioEncoding::Linear16, 4096);
    assert_eq!(policy, ChunkPolicy::FixedSize { chunk_size: 4096 });

    let frames: Vec<_> = FrameReader::new(Cursor::new(audio.clone()), stream_config(), policy)
        .map(|frame| frame.unwrap())
        .collect();

    assert!(matches!(frames[0], AudioFrame::Handshake(_)));
    let payloads: Vec<_> = frames[1..]
        .iter()
        .map(|f| f.payload().unwrap().clone())
        .collect();
    assert_eq!(
        payloads.iter().map(|p| p.len()).collect::<Vec<_>>(),
        vec![4096, 4096, 1808]
    );
    let reassembled: Vec<u8> = payloads.iter().flat_map(|p| p.to_vec()).collect();
    assert_eq!(reassembled, audio);
}

#[tokio::test]
async fn length_prefixed_frames_match_inverse_parser() {
    let mut source = Vec::new();
    for payload in [&b"first"[..], &b"second-frame"[..], &b"x"[..]] {
        source.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        source.extend_from_slice(payload);
    }

    let policy = chunk_policy(AudioEncoding::RawOpus, 8192);
    assert_eq!(policy, ChunkPolicy::LengthPrefixed);

    let stream = encode_stream(Cursor::new(source.clone()), stream_config(), policy);
    pin_mut!(stream);

    let mut streamed = Vec::new();
    while let Some(frame) = stream.next().await {
        if let AudioFrame::Payload(data) = frame.unwrap() {
            streamed.push(data);
        }
    }

    let parsed = decode_length_prefixed(&source).unwrap();
    assert_eq!(parsed.len(), streamed.len());
    for ((declared, payload), frame) in parsed.iter().zip(&streamed) {
        assert_eq!(*declared as usize, frame.len());
        assert_eq!(payload, frame);
    }
}

#[test]
fn truncated_stream_fails_but_decoded_prefix_is_kept() {
    let mut source = Vec::new();
    source.extend_from_slice(&2u32.to_be_bytes());
    source.extend_from_slice(b"ok");
    source.extend_from_slice(&100u32.to_be_bytes());
    source.extend_from_slice(b"short");

    let mut reader = FrameReader::new(
        Cursor::new(source),
        stream_config(),
        ChunkPolicy::LengthPrefixed,
    );
    reader.next().unwrap().unwrap(); // handshake
    assert_eq!(
        reader.next().unwrap().unwrap().payload().unwrap().as_ref(),
        b"ok"
    );
    assert!(matches!(
        reader.next(),
        Some(Err(ClientError::TruncatedFrame(_)))
    ));
}

#[test]
fn decoded_utterance_lands_in_wav_container() {
    let samples: Vec<i16> = vec![0, 1000, -1000, 32767, -32768];
    let chunks: Vec<Vec<u8>> = samples
        .chunks(2)
        .map(|c| c.iter().flat_map(|s| s.to_le_bytes()).collect())
        .collect();

    let mut decoder = SampleDecoder::new(SynthesisEncoding::Linear16, 48000).unwrap();
    let decoded: Vec<Vec<i16>> = chunks
        .iter()
        .map(|chunk| decoder.decode(chunk).unwrap())
        .collect();
    let buffer = accumulate(decoded);
    assert_eq!(buffer, samples);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("speech").join("utterance_0.wav");
    write_wav(&buffer, &path, 48000, 1).unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().sample_rate, 48000);
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.len() as usize, samples.len());
}

struct RecordingUploader {
    uploads: AtomicUsize,
}

#[async_trait]
impl ObjectUploader for RecordingUploader {
    async fn upload(&self, _source: &Path, _object_name: &str) -> ClientResult<(String, String)> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(("s3.api.voxkit.cloud".to_string(), "inbound".to_string()))
    }
}

#[tokio::test]
async fn resolved_uri_round_trips_and_never_reuploads() {
    let uploader = RecordingUploader {
        uploads: AtomicUsize::new(0),
    };

    let resolved = resolve("/tmp/audio.raw", Some("job-7".to_string()), &uploader)
        .await
        .unwrap();
    assert_eq!(uploader.uploads.load(Ordering::SeqCst), 1);
    assert!(is_storage_uri(&resolved));

    let parsed = ResourceUri::parse(&resolved).unwrap();
    assert_eq!(parsed.format(), resolved);
    assert_eq!(parsed.object, "job-7");

    // A second resolution of the now-remote URI performs zero uploads.
    let again = resolve(&resolved, None, &uploader).await.unwrap();
    assert_eq!(again, resolved);
    assert_eq!(uploader.uploads.load(Ordering::SeqCst), 1);
}
