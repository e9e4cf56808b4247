//! Wire messages for the `voxkit.cloud.tts.v1.TextToSpeech` service.
//!
//! ```protobuf
//! service TextToSpeech {
//!     rpc StreamingSynthesize(SynthesizeSpeechRequest)
//!         returns (stream StreamingSynthesizeSpeechResponse);
//! }
//! ```

/// Audio encodings the service can synthesize to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum AudioEncoding {
    Unspecified = 0,
    /// 16-bit signed little-endian linear PCM
    Linear16 = 1,
    Alaw = 2,
    Mulaw = 3,
    /// One Opus frame per response chunk
    RawOpus = 4,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AudioConfig {
    #[prost(enumeration = "AudioEncoding", tag = "1")]
    pub audio_encoding: i32,

    #[prost(double, tag = "2")]
    pub speaking_rate: f64,

    #[prost(uint32, tag = "3")]
    pub sample_rate_hertz: u32,
}

/// Utterance text, plain or SSML.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SynthesisInput {
    #[prost(oneof = "synthesis_input::Source", tags = "1, 2")]
    pub source: ::core::option::Option<synthesis_input::Source>,
}

pub mod synthesis_input {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Source {
        #[prost(string, tag = "1")]
        Text(::prost::alloc::string::String),
        #[prost(string, tag = "2")]
        Ssml(::prost::alloc::string::String),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SynthesizeSpeechRequest {
    #[prost(message, optional, tag = "1")]
    pub input: ::core::option::Option<SynthesisInput>,

    #[prost(message, optional, tag = "2")]
    pub audio_config: ::core::option::Option<AudioConfig>,
}

/// One inbound chunk of synthesized audio.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamingSynthesizeSpeechResponse {
    #[prost(bytes, tag = "1")]
    pub audio_chunk: ::prost::alloc::vec::Vec<u8>,
}
