//! gRPC channel construction and call plumbing.
//!
//! VoxKit services are plain gRPC; the client drives them through tonic's
//! low-level [`Grpc`] client with hand-written prost messages, so no proto
//! compilation step is involved. Credential metadata from the session token
//! is attached to every request.

use std::time::Duration;

use futures::Stream;
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::metadata::{AsciiMetadataValue, MetadataMap};
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};
use tonic::{Request, Streaming};
use tracing::debug;

use crate::auth::SessionToken;
use crate::config::ClientConfig;
use crate::errors::{ClientError, ClientResult};

/// Channel connect timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Establish a channel to the configured endpoint.
///
/// TLS uses the system roots unless `ca_pem` overrides them; plaintext is
/// only for local development targets.
pub async fn connect(config: &ClientConfig) -> ClientResult<Channel> {
    config.validate()?;

    let mut endpoint = Endpoint::from_shared(config.endpoint())
        .map_err(|e| ClientError::InvalidConfiguration(format!("endpoint: {e}")))?
        .connect_timeout(CONNECT_TIMEOUT);

    if config.tls {
        let mut tls = ClientTlsConfig::new().domain_name(config.host.clone());
        if let Some(pem) = &config.ca_pem {
            tls = tls.ca_certificate(Certificate::from_pem(pem));
        }
        endpoint = endpoint
            .tls_config(tls)
            .map_err(|e| ClientError::InvalidConfiguration(format!("TLS config: {e}")))?;
    }

    let channel = endpoint
        .connect()
        .await
        .map_err(|e| ClientError::ConnectionFailed(format!("{}: {e}", config.endpoint())))?;

    debug!(endpoint = %config.endpoint(), "channel established");
    Ok(channel)
}

/// Build the request metadata for the current token state.
pub fn credential_metadata(token: &SessionToken) -> ClientResult<MetadataMap> {
    let mut metadata = MetadataMap::new();
    let [(auth_name, auth_value), (key_name, key_value)] = token.credential_headers();
    metadata.insert(auth_name, parse_header_value(&auth_value, auth_name)?);
    metadata.insert(key_name, parse_header_value(&key_value, key_name)?);
    Ok(metadata)
}

/// Extract the `x-request-id` the service attaches to responses, if any.
pub fn x_request_id(metadata: &MetadataMap) -> Option<&str> {
    metadata.get("x-request-id").and_then(|v| v.to_str().ok())
}

/// Parse a string into an ASCII metadata value.
fn parse_header_value(value: &str, name: &str) -> ClientResult<AsciiMetadataValue> {
    value
        .parse()
        .map_err(|_| ClientError::InvalidConfiguration(format!("invalid {name} header value")))
}

/// One channel plus the message-size limits applied to every call on it.
#[derive(Clone)]
pub struct GrpcCall {
    channel: Channel,
    max_message_bytes: usize,
}

impl GrpcCall {
    pub fn new(channel: Channel, max_message_bytes: usize) -> Self {
        Self {
            channel,
            max_message_bytes,
        }
    }

    async fn ready(&self) -> ClientResult<Grpc<Channel>> {
        let mut grpc = Grpc::new(self.channel.clone())
            .max_decoding_message_size(self.max_message_bytes)
            .max_encoding_message_size(self.max_message_bytes);
        grpc.ready()
            .await
            .map_err(|e| ClientError::ConnectionFailed(format!("service not ready: {e}")))?;
        Ok(grpc)
    }

    /// Unary call.
    pub async fn unary<M, N>(
        &self,
        path: &'static str,
        metadata: MetadataMap,
        message: M,
    ) -> ClientResult<tonic::Response<N>>
    where
        M: prost::Message + 'static,
        N: prost::Message + Default + 'static,
    {
        let mut grpc = self.ready().await?;
        let codec: ProstCodec<M, N> = ProstCodec::default();
        let mut request = Request::new(message);
        *request.metadata_mut() = metadata;
        Ok(grpc
            .unary(request, PathAndQuery::from_static(path), codec)
            .await?)
    }

    /// Server-streaming call.
    pub async fn server_streaming<M, N>(
        &self,
        path: &'static str,
        metadata: MetadataMap,
        message: M,
    ) -> ClientResult<Streaming<N>>
    where
        M: prost::Message + 'static,
        N: prost::Message + Default + 'static,
    {
        let mut grpc = self.ready().await?;
        let codec: ProstCodec<M, N> = ProstCodec::default();
        let mut request = Request::new(message);
        *request.metadata_mut() = metadata;
        Ok(grpc
            .server_streaming(request, PathAndQuery::from_static(path), codec)
            .await?
            .into_inner())
    }

    /// Bidirectional streaming call.
    pub async fn streaming<S, M, N>(
        &self,
        path: &'static str,
        metadata: MetadataMap,
        requests: S,
    ) -> ClientResult<Streaming<N>>
    where
        S: Stream<Item = M> + Send + 'static,
        M: prost::Message + 'static,
        N: prost::Message + Default + 'static,
    {
        let mut grpc = self.ready().await?;
        let codec: ProstCodec<M, N> = ProstCodec::default();
        let mut request = Request::new(requests);
        *request.metadata_mut() = metadata;
        Ok(grpc
            .streaming(request, PathAndQuery::from_static(path), codec)
            .await?
            .into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_metadata_pairs() {
        let token =
            SessionToken::new("key-id", "dGVzdC1zZWNyZXQta2V5IQ", "voxkit.cloud.stt").unwrap();
        let metadata = credential_metadata(&token).unwrap();

        let auth = metadata.get("authorization").unwrap().to_str().unwrap();
        assert!(auth.starts_with("Bearer "));
        assert_eq!(metadata.get("x-api-key").unwrap(), "key-id");
    }

    #[test]
    fn test_x_request_id_lookup() {
        let mut metadata = MetadataMap::new();
        assert!(x_request_id(&metadata).is_none());
        metadata.insert("x-request-id", "req-42".parse().unwrap());
        assert_eq!(x_request_id(&metadata), Some("req-42"));
    }
}
