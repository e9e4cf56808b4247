//! Speech recognition client.
//!
//! Wraps the `voxkit.cloud.stt.v1.SpeechToText` service: whole-file
//! recognition, bidirectional streaming recognition, and long-running
//! recognition of uploaded sources. A session token scoped to the STT
//! audience is minted at construction and refreshed in place whenever a
//! call finds it stale.

pub mod proto;

use std::sync::{Arc, Mutex};

use async_stream::stream;
use futures::{pin_mut, Stream, StreamExt};
use tonic::metadata::MetadataMap;
use tracing::{debug, warn};

use crate::auth::SessionToken;
use crate::config::{audience, ClientConfig};
use crate::core::codec::{stream::encode_stream, AudioFrame, ChunkPolicy};
use crate::core::operations::proto::Operation;
use crate::core::AudioSource;
use crate::errors::{ClientError, ClientResult};
use crate::storage::{self, ObjectUploader};
use crate::transport::{self, GrpcCall};

use proto::streaming_recognize_request::StreamingRequest;
use proto::{
    AudioEncoding, LongRunningRecognizeRequest, RecognitionAudio, RecognitionConfig,
    RecognizeRequest, RecognizeResponse, SpeechRecognitionResult, StreamingRecognitionConfig,
    StreamingRecognitionResult, StreamingRecognizeRequest, StreamingRecognizeResponse,
};
use proto::recognition_audio::AudioSource as WireAudioSource;

const RECOGNIZE_PATH: &str = "/voxkit.cloud.stt.v1.SpeechToText/Recognize";
const STREAMING_RECOGNIZE_PATH: &str = "/voxkit.cloud.stt.v1.SpeechToText/StreamingRecognize";
const LONG_RUNNING_RECOGNIZE_PATH: &str =
    "/voxkit.cloud.stt.v1.SpeechToText/LongRunningRecognize";

/// Client for the VoxKit speech recognition service.
pub struct SttClient {
    call: GrpcCall,
    token: SessionToken,
    config: ClientConfig,
}

impl SttClient {
    /// Connect to the default recognition endpoint.
    pub async fn connect(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> ClientResult<Self> {
        Self::connect_with_config(api_key, secret_key, ClientConfig::default()).await
    }

    /// Connect with explicit endpoint settings.
    pub async fn connect_with_config(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
        config: ClientConfig,
    ) -> ClientResult<Self> {
        let token = SessionToken::new(api_key, secret_key, audience::STT)?;
        let channel = transport::connect(&config).await?;
        let call = GrpcCall::new(channel, config.max_source_bytes as usize);
        Ok(Self {
            call,
            token,
            config,
        })
    }

    /// Refresh the token if stale and build call metadata from it.
    fn fresh_metadata(&mut self) -> ClientResult<MetadataMap> {
        if !self.token.is_fresh() {
            debug!("session token expired, refreshing");
            self.token.refresh()?;
        }
        transport::credential_metadata(&self.token)
    }

    /// Recognize a whole audio source and return all results.
    pub async fn recognize(
        &mut self,
        source: impl Into<AudioSource>,
        config: RecognitionConfig,
    ) -> ClientResult<Vec<SpeechRecognitionResult>> {
        validate_recognition_config(&config)?;

        let source = source.into();
        source.check_len(self.config.max_source_bytes).await?;
        let content = source.read_all().await?;

        let request = RecognizeRequest {
            config: Some(config),
            audio: Some(RecognitionAudio {
                audio_source: Some(WireAudioSource::Content(content.to_vec())),
            }),
        };

        let metadata = self.fresh_metadata()?;
        let response: tonic::Response<RecognizeResponse> =
            self.call.unary(RECOGNIZE_PATH, metadata, request).await?;
        Ok(response.into_inner().results)
    }

    /// Recognize an audio source in streaming mode.
    ///
    /// The source is turned into the outbound frame sequence (configuration
    /// handshake first, then audio frames under the policy negotiated from
    /// the encoding) and pushed over one bidirectional stream. Returns the
    /// stream of recognition results; dropping it cancels the call and
    /// releases the source.
    pub async fn streaming_recognize(
        &mut self,
        source: impl Into<AudioSource>,
        config: StreamingRecognitionConfig,
    ) -> ClientResult<impl Stream<Item = ClientResult<StreamingRecognitionResult>> + Send + 'static>
    {
        let recognition = config
            .config
            .as_ref()
            .ok_or_else(|| {
                ClientError::InvalidConfiguration(
                    "streaming config must carry a recognition config".to_string(),
                )
            })?;
        validate_recognition_config(recognition)?;
        let policy = chunk_policy(recognition.encoding(), self.config.chunk_size);

        let source = source.into();
        source.check_len(self.config.max_source_bytes).await?;
        let reader = source.open().await?;

        // tonic's request stream carries messages, not results: a frame
        // error ends the outbound side and is parked here, to be surfaced
        // from the response stream so the caller never loses it.
        let frame_error = Arc::new(Mutex::new(None::<ClientError>));
        let outbound_error = frame_error.clone();

        let frames = encode_stream(reader, config, policy);
        let outbound = stream! {
            pin_mut!(frames);
            while let Some(frame) = frames.next().await {
                match frame {
                    Ok(AudioFrame::Handshake(config)) => {
                        yield StreamingRecognizeRequest {
                            streaming_request: Some(StreamingRequest::StreamingConfig(config)),
                        };
                    }
                    Ok(AudioFrame::Payload(data)) => {
                        yield StreamingRecognizeRequest {
                            streaming_request: Some(StreamingRequest::AudioContent(data.to_vec())),
                        };
                    }
                    Err(e) => {
                        warn!(error = %e, "outbound frame production failed, aborting stream");
                        *outbound_error.lock().expect("frame error slot") = Some(e);
                        break;
                    }
                }
            }
        };

        let metadata = self.fresh_metadata()?;
        let mut inbound: tonic::Streaming<StreamingRecognizeResponse> = self
            .call
            .streaming(STREAMING_RECOGNIZE_PATH, metadata, outbound)
            .await?;

        Ok(stream! {
            let mut failed = false;
            loop {
                match inbound.message().await {
                    Ok(Some(response)) => {
                        for result in response.results {
                            yield Ok(result);
                        }
                    }
                    Ok(None) => break,
                    Err(status) => {
                        // Prefer the local frame error over the status the
                        // server reports for the half-closed stream.
                        let parked = frame_error.lock().expect("frame error slot").take();
                        match parked {
                            Some(e) => yield Err(e),
                            None => yield Err(ClientError::from(status)),
                        }
                        failed = true;
                        break;
                    }
                }
            }
            if !failed {
                let parked = frame_error.lock().expect("frame error slot").take();
                if let Some(e) = parked {
                    yield Err(e);
                }
            }
        })
    }

    /// Start a long-running recognition job.
    ///
    /// A source already resident in VoxKit storage (a `storage://` URI)
    /// passes through untouched; anything else is treated as a local file
    /// and uploaded first. Returns the job operation and the resolved URI.
    pub async fn long_running_recognize<U>(
        &mut self,
        source: &str,
        config: RecognitionConfig,
        group: impl Into<String>,
        uploader: &U,
        object_name: Option<String>,
    ) -> ClientResult<(Operation, String)>
    where
        U: ObjectUploader + ?Sized,
    {
        validate_recognition_config(&config)?;

        let uri = storage::resolve(source, object_name, uploader).await?;
        let request = LongRunningRecognizeRequest {
            config: Some(config),
            group: group.into(),
            audio: Some(RecognitionAudio {
                audio_source: Some(WireAudioSource::Uri(uri.clone())),
            }),
        };

        let metadata = self.fresh_metadata()?;
        let response: tonic::Response<Operation> = self
            .call
            .unary(LONG_RUNNING_RECOGNIZE_PATH, metadata, request)
            .await?;
        Ok((response.into_inner(), uri))
    }

    /// The session token currently attached to calls.
    pub fn token(&self) -> &SessionToken {
        &self.token
    }
}

/// Select the chunking discipline for an encoding.
///
/// Raw Opus is self-delimited on the wire, so its frame boundaries come
/// from the length prefixes; every other encoding is cut into fixed-size
/// chunks.
pub fn chunk_policy(encoding: AudioEncoding, chunk_size: usize) -> ChunkPolicy {
    match encoding {
        AudioEncoding::RawOpus => ChunkPolicy::LengthPrefixed,
        _ => ChunkPolicy::FixedSize { chunk_size },
    }
}

fn validate_recognition_config(config: &RecognitionConfig) -> ClientResult<()> {
    if config.encoding() == AudioEncoding::Unspecified {
        return Err(ClientError::InvalidConfiguration(
            "audio encoding must be specified".to_string(),
        ));
    }
    if config.sample_rate_hertz == 0 {
        return Err(ClientError::InvalidConfiguration(
            "sample_rate_hertz must be greater than zero".to_string(),
        ));
    }
    if config.num_channels == 0 {
        return Err(ClientError::InvalidConfiguration(
            "num_channels must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
