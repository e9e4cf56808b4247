//! Long-running operations client.
//!
//! Deliberately slim wrapper over `voxkit.cloud.longrunning.v1.Operations`:
//! enough to follow a job started by
//! [`SttClient::long_running_recognize`](crate::core::stt::SttClient::long_running_recognize)
//! to completion. Listing and filtered watch are not exposed.

pub mod proto;

use std::time::Duration;

use tonic::metadata::MetadataMap;
use tracing::debug;

use crate::auth::SessionToken;
use crate::config::{audience, ClientConfig, DEFAULT_OPERATIONS_HOST};
use crate::errors::ClientResult;
use crate::transport::{self, GrpcCall};

use proto::{CancelOperationRequest, GetOperationRequest, Operation, WaitOperationRequest};

const GET_OPERATION_PATH: &str = "/voxkit.cloud.longrunning.v1.Operations/GetOperation";
const WAIT_OPERATION_PATH: &str = "/voxkit.cloud.longrunning.v1.Operations/WaitOperation";
const CANCEL_OPERATION_PATH: &str = "/voxkit.cloud.longrunning.v1.Operations/CancelOperation";

/// Client for the VoxKit long-running operations service.
pub struct OperationsClient {
    call: GrpcCall,
    token: SessionToken,
}

impl OperationsClient {
    /// Connect to the default operations endpoint.
    pub async fn connect(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> ClientResult<Self> {
        Self::connect_with_config(
            api_key,
            secret_key,
            ClientConfig::with_host(DEFAULT_OPERATIONS_HOST),
        )
        .await
    }

    /// Connect with explicit endpoint settings.
    pub async fn connect_with_config(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
        config: ClientConfig,
    ) -> ClientResult<Self> {
        let token = SessionToken::new(api_key, secret_key, audience::OPERATIONS)?;
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

    /// Fetch an operation by id.
    pub async fn get_operation(&mut self, id: impl Into<String>) -> ClientResult<Operation> {
        let request = GetOperationRequest { id: id.into() };
        let metadata = self.fresh_metadata()?;
        let response: tonic::Response<Operation> = self
            .call
            .unary(GET_OPERATION_PATH, metadata, request)
            .await?;
        Ok(response.into_inner())
    }

    /// Block server-side until the operation completes or `timeout` passes,
    /// returning its latest state either way.
    pub async fn wait_operation(
        &mut self,
        id: impl Into<String>,
        timeout: Duration,
    ) -> ClientResult<Operation> {
        let request = WaitOperationRequest {
            id: id.into(),
            timeout: Some(::prost_types::Duration {
                seconds: timeout.as_secs() as i64,
                nanos: timeout.subsec_nanos() as i32,
            }),
        };
        let metadata = self.fresh_metadata()?;
        let response: tonic::Response<Operation> = self
            .call
            .unary(WAIT_OPERATION_PATH, metadata, request)
            .await?;
        Ok(response.into_inner())
    }

    /// Cancel an operation by id.
    pub async fn cancel_operation(&mut self, id: impl Into<String>) -> ClientResult<Operation> {
        let request = CancelOperationRequest { id: id.into() };
        let metadata = self.fresh_metadata()?;
        let response: tonic::Response<Operation> = self
            .call
            .unary(CANCEL_OPERATION_PATH, metadata, request)
            .await?;
        Ok(response.into_inner())
    }
}
