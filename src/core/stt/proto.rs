//! Wire messages for the `voxkit.cloud.stt.v1.SpeechToText` service.
//!
//! Hand-written prost structs matching the service proto definitions:
//!
//! ```protobuf
//! service SpeechToText {
//!     rpc Recognize(RecognizeRequest) returns (RecognizeResponse);
//!     rpc StreamingRecognize(stream StreamingRecognizeRequest)
//!         returns (stream StreamingRecognizeResponse);
//!     rpc LongRunningRecognize(LongRunningRecognizeRequest)
//!         returns (Operation);
//! }
//! ```

/// Audio encodings accepted for recognition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum AudioEncoding {
    Unspecified = 0,
    /// 16-bit signed little-endian linear PCM
    Linear16 = 1,
    Alaw = 2,
    Mulaw = 3,
    Linear32f = 4,
    /// Self-delimited Opus frames with a 4-byte big-endian length prefix
    RawOpus = 5,
    MpegAudio = 6,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecognitionConfig {
    #[prost(enumeration = "AudioEncoding", tag = "1")]
    pub encoding: i32,

    #[prost(uint32, tag = "2")]
    pub sample_rate_hertz: u32,

    #[prost(string, tag = "3")]
    pub language_code: ::prost::alloc::string::String,

    #[prost(uint32, tag = "4")]
    pub max_alternatives: u32,

    #[prost(uint32, tag = "5")]
    pub num_channels: u32,

    #[prost(bool, tag = "6")]
    pub enable_automatic_punctuation: bool,

    #[prost(bool, tag = "7")]
    pub profanity_filter: bool,

    #[prost(string, tag = "8")]
    pub model: ::prost::alloc::string::String,
}

/// Audio payload of a non-streaming request: inline bytes or an already
/// uploaded `storage://` object.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecognitionAudio {
    #[prost(oneof = "recognition_audio::AudioSource", tags = "1, 2")]
    pub audio_source: ::core::option::Option<recognition_audio::AudioSource>,
}

pub mod recognition_audio {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum AudioSource {
        #[prost(bytes, tag = "1")]
        Content(::prost::alloc::vec::Vec<u8>),
        #[prost(string, tag = "2")]
        Uri(::prost::alloc::string::String),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecognizeRequest {
    #[prost(message, optional, tag = "1")]
    pub config: ::core::option::Option<RecognitionConfig>,

    #[prost(message, optional, tag = "2")]
    pub audio: ::core::option::Option<RecognitionAudio>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SpeechRecognitionAlternative {
    #[prost(string, tag = "1")]
    pub transcript: ::prost::alloc::string::String,

    #[prost(float, tag = "2")]
    pub confidence: f32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SpeechRecognitionResult {
    #[prost(message, repeated, tag = "1")]
    pub alternatives: ::prost::alloc::vec::Vec<SpeechRecognitionAlternative>,

    #[prost(uint32, tag = "2")]
    pub channel: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecognizeResponse {
    #[prost(message, repeated, tag = "1")]
    pub results: ::prost::alloc::vec::Vec<SpeechRecognitionResult>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InterimResultsConfig {
    #[prost(bool, tag = "1")]
    pub enable_interim_results: bool,

    #[prost(float, tag = "2")]
    pub interval: f32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamingRecognitionConfig {
    #[prost(message, optional, tag = "1")]
    pub config: ::core::option::Option<RecognitionConfig>,

    #[prost(bool, tag = "2")]
    pub single_utterance: bool,

    #[prost(message, optional, tag = "3")]
    pub interim_results_config: ::core::option::Option<InterimResultsConfig>,
}

/// One outbound frame of a streaming session: the configuration handshake
/// first, then audio-only frames.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamingRecognizeRequest {
    #[prost(oneof = "streaming_recognize_request::StreamingRequest", tags = "1, 2")]
    pub streaming_request:
        ::core::option::Option<streaming_recognize_request::StreamingRequest>,
}

pub mod streaming_recognize_request {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum StreamingRequest {
        #[prost(message, tag = "1")]
        StreamingConfig(super::StreamingRecognitionConfig),
        #[prost(bytes, tag = "2")]
        AudioContent(::prost::alloc::vec::Vec<u8>),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamingRecognitionResult {
    #[prost(message, optional, tag = "1")]
    pub recognition_result: ::core::option::Option<SpeechRecognitionResult>,

    #[prost(bool, tag = "2")]
    pub is_final: bool,

    #[prost(float, tag = "3")]
    pub stability: f32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamingRecognizeResponse {
    #[prost(message, repeated, tag = "1")]
    pub results: ::prost::alloc::vec::Vec<StreamingRecognitionResult>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LongRunningRecognizeRequest {
    #[prost(message, optional, tag = "1")]
    pub config: ::core::option::Option<RecognitionConfig>,

    #[prost(string, tag = "2")]
    pub group: ::prost::alloc::string::String,

    #[prost(message, optional, tag = "3")]
    pub audio: ::core::option::Option<RecognitionAudio>,
}
