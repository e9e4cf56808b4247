//! VoxKit speech service client.
//!
//! Client library for the VoxKit cloud speech API: streaming and
//! whole-file speech recognition, streaming speech synthesis to WAV files,
//! and long-running recognition of uploaded sources, all over gRPC with
//! short-lived HS256 session tokens.
//!
//! Async clients live under [`core`]; blocking counterparts with the same
//! surface live under [`blocking`].
//!
//! # Example
//!
//! ```rust,ignore
//! use voxkit_client::core::stt::proto::{AudioEncoding, RecognitionConfig};
//! use voxkit_client::SttClient;
//!
//! #[tokio::main]
//! async fn main() -> voxkit_client::ClientResult<()> {
//!     let mut stt = SttClient::connect("api-key", "base64url-secret").await?;
//!     let results = stt
//!         .recognize(
//!             "audio.raw",
//!             RecognitionConfig {
//!                 encoding: AudioEncoding::Linear16 as i32,
//!                 sample_rate_hertz: 16000,
//!                 num_channels: 1,
//!                 ..Default::default()
//!             },
//!         )
//!         .await?;
//!     println!("{results:?}");
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod blocking;
pub mod config;
pub mod core;
pub mod errors;
pub mod storage;
pub mod transport;

// Re-export commonly used items for convenience
pub use auth::SessionToken;
pub use config::ClientConfig;
pub use core::audio::{accumulate, write_wav, SampleDecoder};
pub use core::codec::{decode_length_prefixed, AudioFrame, ChunkPolicy, FrameReader};
pub use core::operations::OperationsClient;
pub use core::stt::SttClient;
pub use core::tts::{TextSource, TtsClient};
pub use core::AudioSource;
pub use errors::{ClientError, ClientResult};
pub use storage::{is_storage_uri, resolve, ObjectUploader, ResourceUri, VoxkitUploader};
