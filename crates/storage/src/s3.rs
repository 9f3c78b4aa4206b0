//! S3-backed file storage.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;
use todo_core::error::StorageError;
use todo_core::ports::FileStorage;

/// Region S3 treats as the default; buckets there take no location constraint.
const DEFAULT_REGION: &str = "us-east-1";

/// Object storage settings.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Custom endpoint (e.g. a LocalStack URL). `None` uses AWS.
    pub endpoint: Option<String>,
    pub region: String,
    pub bucket: String,
}

/// Stores uploaded files as objects in a single bucket.
#[derive(Clone)]
pub struct S3FileStorage {
    client: Client,
    bucket: String,
    region: String,
}

impl S3FileStorage {
    /// Build a client from the ambient AWS configuration.
    ///
    /// With a custom endpoint the client uses static `test`/`test` credentials
    /// and path-style bucket addressing, which S3 emulators expect.
    pub async fn connect(config: &S3Config) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint {
            builder = builder
                .endpoint_url(endpoint)
                .credentials_provider(Credentials::new("test", "test", None, None, "static"))
                .force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            region: config.region.clone(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// `CreateBucket` configuration for `region`, or `None` for the default region.
fn bucket_configuration(region: &str) -> Option<CreateBucketConfiguration> {
    if region.is_empty() || region == DEFAULT_REGION {
        return None;
    }
    Some(
        CreateBucketConfiguration::builder()
            .location_constraint(BucketLocationConstraint::from(region))
            .build(),
    )
}

#[async_trait]
impl FileStorage for S3FileStorage {
    async fn upload_file(
        &self,
        storage_path: &str,
        content_type: &str,
        data: Vec<u8>,
        size: i64,
    ) -> Result<(), StorageError> {
        let content_length = data.len() as i64;
        if content_length != size {
            tracing::warn!(
                storage_path,
                declared = size,
                actual = content_length,
                "Declared file size differs from received bytes",
            );
        }

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(storage_path)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .content_length(content_length)
            .send()
            .await
            .map_err(|e| StorageError::Upload(DisplayErrorContext(e).to_string().into()))?;

        tracing::debug!(bucket = %self.bucket, storage_path, "Stored object");
        Ok(())
    }

    async fn ensure_bucket(&self) -> Result<(), StorageError> {
        if self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok()
        {
            return Ok(());
        }

        self.client
            .create_bucket()
            .bucket(&self.bucket)
            .set_create_bucket_configuration(bucket_configuration(&self.region))
            .send()
            .await
            .map_err(|e| StorageError::Bucket(DisplayErrorContext(e).to_string().into()))?;

        tracing::info!(bucket = %self.bucket, "Created bucket");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_region_has_no_location_constraint() {
        assert!(bucket_configuration("us-east-1").is_none());
        assert!(bucket_configuration("").is_none());
    }

    #[test]
    fn other_regions_set_location_constraint() {
        let config = bucket_configuration("eu-west-1").unwrap();
        assert_eq!(
            config.location_constraint(),
            Some(&BucketLocationConstraint::EuWest1)
        );
    }

    #[tokio::test]
    async fn connect_keeps_bucket_and_region() {
        let storage = S3FileStorage::connect(&S3Config {
            endpoint: Some("http://localhost:4566".to_string()),
            region: "us-east-1".to_string(),
            bucket: "todo-bucket".to_string(),
        })
        .await;

        assert_eq!(storage.bucket(), "todo-bucket");
        assert_eq!(storage.region, "us-east-1");
    }
}
