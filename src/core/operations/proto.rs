//! Wire messages for the `voxkit.cloud.longrunning.v1.Operations` service.

/// Lifecycle state of a long-running job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum OperationState {
    Unspecified = 0,
    Enqueued = 1,
    Processing = 2,
    Done = 3,
    Failed = 4,
}

/// A long-running recognition job.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Operation {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,

    #[prost(string, tag = "2")]
    pub group: ::prost::alloc::string::String,

    #[prost(string, tag = "3")]
    pub service_id: ::prost::alloc::string::String,

    #[prost(enumeration = "OperationState", tag = "4")]
    pub state: i32,

    /// Result payload once the job is done.
    #[prost(message, optional, tag = "5")]
    pub response: ::core::option::Option<::prost_types::Any>,

    /// Failure description once the job has failed.
    #[prost(string, tag = "6")]
    pub error: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetOperationRequest {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WaitOperationRequest {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,

    #[prost(message, optional, tag = "2")]
    pub timeout: ::core::option::Option<::prost_types::Duration>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CancelOperationRequest {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
}
