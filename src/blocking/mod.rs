//! Blocking client facade.
//!
//! Thin wrappers that drive the async clients to completion on a private
//! current-thread runtime, for callers without an event loop. All frame
//! production, transport I/O and file writes happen on the calling thread
//! and may block it. Must not be used from inside an async context.

use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::runtime::{Builder, Runtime};

use crate::config::ClientConfig;
use crate::core::operations::proto::Operation;
use crate::core::stt::proto::{
    RecognitionConfig, SpeechRecognitionResult, StreamingRecognitionConfig,
    StreamingRecognitionResult,
};
use crate::core::tts::proto::{AudioConfig, StreamingSynthesizeSpeechResponse};
use crate::core::tts::TextSource;
use crate::core::{operations, stt, tts, AudioSource};
use crate::errors::{ClientError, ClientResult};
use crate::storage::ObjectUploader;

fn runtime() -> ClientResult<Arc<Runtime>> {
    Ok(Arc::new(Builder::new_current_thread().enable_all().build()?))
}

/// Iterator over a response stream, driven one item at a time.
///
/// Dropping it mid-stream cancels the underlying call and releases any
/// held file handles and decoder state.
pub struct BlockingStream<T> {
    runtime: Arc<Runtime>,
    stream: Pin<Box<dyn Stream<Item = ClientResult<T>> + Send>>,
}

impl<T> Iterator for BlockingStream<T> {
    type Item = ClientResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.runtime.block_on(self.stream.next())
    }
}

/// Blocking counterpart of [`stt::SttClient`].
pub struct SttClient {
    runtime: Arc<Runtime>,
    inner: stt::SttClient,
}

impl SttClient {
    pub fn connect(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> ClientResult<Self> {
        Self::connect_with_config(api_key, secret_key, ClientConfig::default())
    }

    pub fn connect_with_config(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
        config: ClientConfig,
    ) -> ClientResult<Self> {
        let runtime = runtime()?;
        let inner =
            runtime.block_on(stt::SttClient::connect_with_config(api_key, secret_key, config))?;
        Ok(Self { runtime, inner })
    }

    pub fn recognize(
        &mut self,
        source: impl Into<AudioSource>,
        config: RecognitionConfig,
    ) -> ClientResult<Vec<SpeechRecognitionResult>> {
        self.runtime
            .clone()
            .block_on(self.inner.recognize(source, config))
    }

    pub fn streaming_recognize(
        &mut self,
        source: impl Into<AudioSource>,
        config: StreamingRecognitionConfig,
    ) -> ClientResult<BlockingStream<StreamingRecognitionResult>> {
        let runtime = self.runtime.clone();
        let stream = runtime.block_on(self.inner.streaming_recognize(source, config))?;
        Ok(BlockingStream {
            runtime,
            stream: Box::pin(stream),
        })
    }

    pub fn long_running_recognize<U>(
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
        self.runtime.clone().block_on(self.inner.long_running_recognize(
            source,
            config,
            group,
            uploader,
            object_name,
        ))
    }
}

/// Blocking counterpart of [`tts::TtsClient`].
pub struct TtsClient {
    runtime: Arc<Runtime>,
    inner: tts::TtsClient,
}

impl TtsClient {
    pub fn connect(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> ClientResult<Self> {
        let runtime = runtime()?;
        let inner = runtime.block_on(tts::TtsClient::connect(api_key, secret_key))?;
        Ok(Self { runtime, inner })
    }

    pub fn connect_with_config(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
        config: ClientConfig,
    ) -> ClientResult<Self> {
        let runtime = runtime()?;
        let inner =
            runtime.block_on(tts::TtsClient::connect_with_config(api_key, secret_key, config))?;
        Ok(Self { runtime, inner })
    }

    pub fn streaming_synthesize(
        &mut self,
        utterance: &str,
        config: &AudioConfig,
        ssml: bool,
    ) -> ClientResult<BlockingStream<StreamingSynthesizeSpeechResponse>> {
        let runtime = self.runtime.clone();
        let inbound = runtime.block_on(self.inner.streaming_synthesize(utterance, config, ssml))?;
        Ok(BlockingStream {
            runtime,
            stream: Box::pin(inbound.map(|item| item.map_err(ClientError::from))),
        })
    }

    pub fn synthesize_to_wav(
        &mut self,
        source: impl Into<TextSource>,
        config: &AudioConfig,
        output_dir: impl AsRef<Path>,
        prefix: &str,
        ssml: bool,
    ) -> ClientResult<Vec<PathBuf>> {
        self.runtime.clone().block_on(self.inner.synthesize_to_wav(
            source,
            config,
            output_dir,
            prefix,
            ssml,
        ))
    }
}

/// Blocking counterpart of [`operations::OperationsClient`].
pub struct OperationsClient {
    runtime: Arc<Runtime>,
    inner: operations::OperationsClient,
}

impl OperationsClient {
    pub fn connect(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> ClientResult<Self> {
        let runtime = runtime()?;
        let inner = runtime.block_on(operations::OperationsClient::connect(api_key, secret_key))?;
        Ok(Self { runtime, inner })
    }

    pub fn get_operation(&mut self, id: impl Into<String>) -> ClientResult<Operation> {
        self.runtime.clone().block_on(self.inner.get_operation(id))
    }

    pub fn wait_operation(
        &mut self,
        id: impl Into<String>,
        timeout: Duration,
    ) -> ClientResult<Operation> {
        self.runtime
            .clone()
            .block_on(self.inner.wait_operation(id, timeout))
    }

    pub fn cancel_operation(&mut self, id: impl Into<String>) -> ClientResult<Operation> {
        self.runtime
            .clone()
            .block_on(self.inner.cancel_operation(id))
    }
}
