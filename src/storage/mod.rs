//! VoxKit object storage: `storage://` URIs and the upload path for
//! long-running recognition sources.
//!
//! A long-running job reads its audio from VoxKit storage. A source that is
//! already a `storage://` URI passes through [`resolve`] untouched - that
//! check is what makes repeated resolution idempotent and guarantees an
//! already-resident object is never uploaded twice. Anything else is
//! treated as a local file and uploaded first.

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::ObjectStore;
use tracing::info;

use crate::errors::{ClientError, ClientResult};

/// Fixed scheme prefix of VoxKit storage URIs.
pub const STORAGE_PREFIX: &str = "storage://";

/// Default S3-compatible uploader endpoint host.
pub const DEFAULT_UPLOADER_HOST: &str = "s3.api.voxkit.cloud";

/// Bucket long-running sources are uploaded to.
pub const DEFAULT_BUCKET: &str = "inbound";

/// Whether a value is already a VoxKit storage URI.
pub fn is_storage_uri(value: &str) -> bool {
    value.starts_with(STORAGE_PREFIX)
}

/// Parsed form of `storage://{host}/{bucket}/{object}`.
///
/// Formatting and parsing are lossless inverses: for any valid URI `u`,
/// `ResourceUri::parse(&u.format())` reproduces `u`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUri {
    pub host: String,
    pub bucket: String,
    pub object: String,
}

impl ResourceUri {
    /// Serialize to the `storage://` form.
    pub fn format(&self) -> String {
        format!(
            "{}{}/{}/{}",
            STORAGE_PREFIX, self.host, self.bucket, self.object
        )
    }

    /// Parse a `storage://` URI.
    pub fn parse(uri: &str) -> ClientResult<Self> {
        let rest = uri
            .strip_prefix(STORAGE_PREFIX)
            .ok_or_else(|| ClientError::InvalidUri(format!("missing {STORAGE_PREFIX}: {uri}")))?;

        let mut parts = rest.splitn(3, '/');
        let host = parts.next().unwrap_or_default();
        let bucket = parts.next().unwrap_or_default();
        let object = parts.next().unwrap_or_default();
        if host.is_empty() || bucket.is_empty() || object.is_empty() {
            return Err(ClientError::InvalidUri(format!(
                "expected storage://host/bucket/object: {uri}"
            )));
        }

        Ok(Self {
            host: host.to_string(),
            bucket: bucket.to_string(),
            object: object.to_string(),
        })
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// Collaborator seam for the actual upload.
#[async_trait]
pub trait ObjectUploader {
    /// Upload the file at `source` under `object_name`, returning the
    /// `(host, bucket)` the object landed in.
    async fn upload(&self, source: &Path, object_name: &str) -> ClientResult<(String, String)>;
}

/// Collision-resistant object name derived from the current UTC time.
pub fn default_object_name() -> String {
    let now = time::OffsetDateTime::now_utc();
    format!(
        "default_name_{}.{:09}",
        now.unix_timestamp(),
        now.nanosecond()
    )
}

/// Ensure a source is resident in VoxKit storage.
///
/// An existing `storage://` URI is returned unchanged and nothing is
/// uploaded. Otherwise the source is uploaded under `object_name` (or a
/// generated default) and the resulting URI is returned.
pub async fn resolve<U>(
    source: &str,
    object_name: Option<String>,
    uploader: &U,
) -> ClientResult<String>
where
    U: ObjectUploader + ?Sized,
{
    if is_storage_uri(source) {
        return Ok(source.to_string());
    }

    let object = object_name.unwrap_or_else(default_object_name);
    let (host, bucket) = uploader.upload(Path::new(source), &object).await?;
    let uri = ResourceUri {
        host,
        bucket,
        object,
    };
    info!(uri = %uri, "source uploaded");
    Ok(uri.format())
}

/// S3-compatible uploader for the VoxKit inbound bucket.
pub struct VoxkitUploader {
    store: object_store::aws::AmazonS3,
    host: String,
    bucket: String,
}

impl VoxkitUploader {
    /// Uploader against the default VoxKit storage endpoint.
    pub fn new(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> ClientResult<Self> {
        Self::with_endpoint(api_key, secret_key, DEFAULT_UPLOADER_HOST, DEFAULT_BUCKET)
    }

    /// Uploader against an explicit endpoint host and bucket.
    pub fn with_endpoint(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
        host: impl Into<String>,
        bucket: impl Into<String>,
    ) -> ClientResult<Self> {
        let host = host.into();
        let bucket = bucket.into();
        let store = AmazonS3Builder::new()
            .with_endpoint(format!("https://{host}"))
            .with_bucket_name(bucket.clone())
            .with_region("us-east-1")
            .with_access_key_id(api_key.into())
            .with_secret_access_key(secret_key.into())
            .build()?;
        Ok(Self {
            store,
            host,
            bucket,
        })
    }
}

#[async_trait]
impl ObjectUploader for VoxkitUploader {
    async fn upload(&self, source: &Path, object_name: &str) -> ClientResult<(String, String)> {
        let data = tokio::fs::read(source).await?;
        let location = object_store::path::Path::from(object_name);
        self.store
            .put(&location, Bytes::from(data).into())
            .await?;
        Ok((self.host.clone(), self.bucket.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingUploader {
        uploads: AtomicUsize,
    }

    #[async_trait]
    impl ObjectUploader for CountingUploader {
        async fn upload(
            &self,
            _source: &Path,
            _object_name: &str,
        ) -> ClientResult<(String, String)> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            Ok((DEFAULT_UPLOADER_HOST.to_string(), DEFAULT_BUCKET.to_string()))
        }
    }

    #[test]
    fn test_is_storage_uri() {
        assert!(is_storage_uri("storage://host/bucket/name"));
        assert!(!is_storage_uri("s3://host/bucket/name"));
        assert!(!is_storage_uri("/local/path.wav"));
    }

    #[test]
    fn test_uri_round_trip() {
        let uri = ResourceUri {
            host: "s3.api.voxkit.cloud".to_string(),
            bucket: "inbound".to_string(),
            object: "dir/with/slashes.raw".to_string(),
        };
        let formatted = uri.format();
        assert!(is_storage_uri(&formatted));
        assert_eq!(ResourceUri::parse(&formatted).unwrap(), uri);
    }

    #[test]
    fn test_build_uri_shape() {
        let uri = ResourceUri {
            host: "host".to_string(),
            bucket: "bucket".to_string(),
            object: "name".to_string(),
        };
        assert_eq!(uri.format(), "storage://host/bucket/name");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(ResourceUri::parse("storage://host/bucket").is_err());
        assert!(ResourceUri::parse("storage://").is_err());
        assert!(ResourceUri::parse("http://host/bucket/name").is_err());
    }

    #[tokio::test]
    async fn test_resolve_passes_remote_uri_through_without_upload() {
        let uploader = CountingUploader {
            uploads: AtomicUsize::new(0),
        };

        let uri = "storage://host/bucket/name";
        let resolved = resolve(uri, None, &uploader).await.unwrap();
        assert_eq!(resolved, uri);
        // Re-resolving the resolved URI is idempotent.
        let resolved_again = resolve(&resolved, None, &uploader).await.unwrap();
        assert_eq!(resolved_again, uri);
        assert_eq!(uploader.uploads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resolve_uploads_local_source() {
        let uploader = CountingUploader {
            uploads: AtomicUsize::new(0),
        };

        let resolved = resolve("/tmp/audio.raw", Some("given-name".to_string()), &uploader)
            .await
            .unwrap();
        assert_eq!(
            resolved,
            format!("{STORAGE_PREFIX}{DEFAULT_UPLOADER_HOST}/{DEFAULT_BUCKET}/given-name")
        );
        assert_eq!(uploader.uploads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_default_object_name_shape() {
        let name = default_object_name();
        assert!(name.starts_with("default_name_"));
        assert!(name.contains('.'));
    }
}
