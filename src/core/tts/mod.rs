//! Speech synthesis client.
//!
//! Wraps the `voxkit.cloud.tts.v1.TextToSpeech` service. Synthesis is
//! utterance oriented: a text source expands to a list of utterances, each
//! utterance is one server-streaming call, and the inbound audio chunks of
//! each call are decoded, accumulated and written as one WAV file.

pub mod proto;

use std::path::{Path, PathBuf};

use tonic::metadata::MetadataMap;
use tracing::{debug, info};

use crate::auth::SessionToken;
use crate::config::{audience, ClientConfig, DEFAULT_TTS_HOST};
use crate::core::audio::{write_wav, SampleDecoder};
use crate::errors::{ClientError, ClientResult};
use crate::transport::{self, GrpcCall};

use proto::synthesis_input::Source;
use proto::{
    AudioConfig, AudioEncoding, StreamingSynthesizeSpeechResponse, SynthesisInput,
    SynthesizeSpeechRequest,
};

const STREAMING_SYNTHESIZE_PATH: &str = "/voxkit.cloud.tts.v1.TextToSpeech/StreamingSynthesize";

/// Text input for synthesis: a literal string is one utterance, a file is
/// one utterance per line (blank lines and `#` comment lines are skipped).
#[derive(Debug, Clone)]
pub enum TextSource {
    Text(String),
    File(PathBuf),
}

impl From<&str> for TextSource {
    fn from(text: &str) -> Self {
        TextSource::Text(text.to_string())
    }
}

impl From<String> for TextSource {
    fn from(text: String) -> Self {
        TextSource::Text(text)
    }
}

impl TextSource {
    /// Expand the source into its utterance list.
    pub async fn utterances(&self) -> ClientResult<Vec<String>> {
        match self {
            TextSource::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    Ok(Vec::new())
                } else {
                    Ok(vec![trimmed.to_string()])
                }
            }
            TextSource::File(path) => {
                let content = tokio::fs::read_to_string(path).await?;
                Ok(content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .map(str::to_string)
                    .collect())
            }
        }
    }
}

/// Client for the VoxKit speech synthesis service.
pub struct TtsClient {
    call: GrpcCall,
    token: SessionToken,
}

impl TtsClient {
    /// Connect to the default synthesis endpoint.
    pub async fn connect(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> ClientResult<Self> {
        Self::connect_with_config(api_key, secret_key, ClientConfig::with_host(DEFAULT_TTS_HOST))
            .await
    }

    /// Connect with explicit endpoint settings.
    pub async fn connect_with_config(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
        config: ClientConfig,
    ) -> ClientResult<Self> {
        let token = SessionToken::new(api_key, secret_key, audience::TTS)?;
        let channel = transport::connect(&config).await?;
        let call = GrpcCall::new(channel, config.max_source_bytes as usize);
        Ok(Self { call, token })
    }

    fn fresh_metadata(&mut self) -> ClientResult<MetadataMap> {
        if !self.token.is_fresh() {
            debug!("session token expired, refreshing");
            self.token.refresh()?;
        }
        transport::credential_metadata(&self.token)
    }

    /// Synthesize one utterance, returning the raw response stream.
    pub async fn streaming_synthesize(
        &mut self,
        utterance: &str,
        config: &AudioConfig,
        ssml: bool,
    ) -> ClientResult<tonic::Streaming<StreamingSynthesizeSpeechResponse>> {
        validate_audio_config(config)?;

        let source = if ssml {
            Source::Ssml(utterance.to_string())
        } else {
            Source::Text(utterance.to_string())
        };
        let request = SynthesizeSpeechRequest {
            input: Some(SynthesisInput {
                source: Some(source),
            }),
            audio_config: Some(config.clone()),
        };

        let metadata = self.fresh_metadata()?;
        self.call
            .server_streaming(STREAMING_SYNTHESIZE_PATH, metadata, request)
            .await
    }

    /// Synthesize every utterance of `source` and write one WAV file per
    /// utterance to `output_dir`, named `<prefix>_<index>.wav` with a
    /// zero-based index. Returns the written paths in utterance order.
    ///
    /// Each utterance gets a freshly created decoder; a decode failure
    /// aborts that utterance and leaves previously written files intact.
    pub async fn synthesize_to_wav(
        &mut self,
        source: impl Into<TextSource>,
        config: &AudioConfig,
        output_dir: impl AsRef<Path>,
        prefix: &str,
        ssml: bool,
    ) -> ClientResult<Vec<PathBuf>> {
        validate_audio_config(config)?;

        let output_dir = output_dir.as_ref();
        tokio::fs::create_dir_all(output_dir).await?;

        let utterances = source.into().utterances().await?;
        let mut written = Vec::with_capacity(utterances.len());

        for (index, utterance) in utterances.iter().enumerate() {
            let mut inbound = self.streaming_synthesize(utterance, config, ssml).await?;

            // Decoder state must not leak between utterances.
            let mut decoder =
                SampleDecoder::new(config.audio_encoding(), config.sample_rate_hertz)?;
            let mut samples = Vec::new();
            while let Some(response) = inbound.message().await? {
                samples.extend(decoder.decode(&response.audio_chunk)?);
            }

            let path = output_dir.join(format!("{prefix}_{index}.wav"));
            write_wav(&samples, &path, config.sample_rate_hertz, 1)?;
            info!(path = %path.display(), samples = samples.len(), "utterance written");
            written.push(path);
        }

        Ok(written)
    }

    /// The session token currently attached to calls.
    pub fn token(&self) -> &SessionToken {
        &self.token
    }
}

fn validate_audio_config(config: &AudioConfig) -> ClientResult<()> {
    match config.audio_encoding() {
        AudioEncoding::Linear16 | AudioEncoding::RawOpus => {}
        other => {
            return Err(ClientError::InvalidConfiguration(format!(
                "synthesis supports LINEAR16 and RAW_OPUS, got {other:?}"
            )))
        }
    }
    if config.sample_rate_hertz == 0 {
        return Err(ClientError::InvalidConfiguration(
            "sample_rate_hertz must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
