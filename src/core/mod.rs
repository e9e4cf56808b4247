//! Core client components: frame production, audio reassembly, and the
//! per-service gRPC clients.

pub mod audio;
pub mod codec;
pub mod operations;
pub mod stt;
pub mod tts;

mod source;

pub use source::{AudioSource, SourceReader};
