//! Client configuration for the VoxKit speech service.
//!
//! Endpoint defaults, per-call limits, and the token audiences for each
//! service. Values can be overridden per client; the defaults match the
//! production VoxKit deployment.

use serde::{Deserialize, Serialize};

use crate::errors::{ClientError, ClientResult};

/// Maximum audio source length accepted for a single call, in bytes.
pub const MAX_SOURCE_BYTES: u64 = 32 * 10_u64.pow(6);

/// Default payload frame size for fixed-size chunking, in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Default recognition endpoint host.
pub const DEFAULT_STT_HOST: &str = "api.voxkit.cloud";

/// Default synthesis endpoint host.
pub const DEFAULT_TTS_HOST: &str = "api.voxkit.cloud";

/// Default long-running operations endpoint host.
pub const DEFAULT_OPERATIONS_HOST: &str = "api.voxkit.cloud";

/// Default service port.
pub const DEFAULT_PORT: u16 = 443;

/// Token audiences, one per service.
pub mod audience {
    pub const STT: &str = "voxkit.cloud.stt";
    pub const TTS: &str = "voxkit.cloud.tts";
    pub const OPERATIONS: &str = "voxkit.cloud.longrunning";
}

/// Connection settings shared by every VoxKit client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Service host name
    pub host: String,

    /// Service port (default 443)
    pub port: u16,

    /// Use TLS for the channel (default true)
    pub tls: bool,

    /// Optional PEM CA certificate overriding the system roots
    pub ca_pem: Option<String>,

    /// Maximum audio source length in bytes, checked before any frame is sent
    pub max_source_bytes: u64,

    /// Payload frame size for fixed-size chunking
    pub chunk_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_STT_HOST.to_string(),
            port: DEFAULT_PORT,
            tls: true,
            ca_pem: None,
            max_source_bytes: MAX_SOURCE_BYTES,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ClientConfig {
    /// Config pointing at the given host with all other defaults.
    pub fn with_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Target URI for channel construction.
    pub fn endpoint(&self) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    /// Validate the connection settings.
    pub fn validate(&self) -> ClientResult<()> {
        if self.host.is_empty() {
            return Err(ClientError::InvalidConfiguration(
                "host must not be empty".to_string(),
            ));
        }
        if self.chunk_size == 0 {
            return Err(ClientError::InvalidConfiguration(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.max_source_bytes == 0 {
            return Err(ClientError::InvalidConfiguration(
                "max_source_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
