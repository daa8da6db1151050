use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::{primitives::ByteStream as AwsByteStream, types::ObjectCannedAcl, Client};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{BlobError, BlobResult, GetResult, ListPage, ObjectMeta, ObjectStore, PutResult, S3Config};

/// S3-compatible store implementation using the AWS SDK
#[derive(Clone)]
pub struct S3CompatibleStore {
    client: Client,
    bucket: String,
    public_read: bool,
}

impl S3CompatibleStore {
    /// Connect using `PAINT_S3_*` environment variables
    pub async fn from_env() -> BlobResult<Self> {
        let config = S3Config::from_env()?;
        Self::connect(config).await
    }

    pub async fn connect(config: S3Config) -> BlobResult<Self> {
        config.validate()?;
        let bucket = config.bucket.clone();
        let public_read = config.public_read;
        let client = Self::create_client(config).await;
        Ok(Self {
            client,
            bucket,
            public_read,
        })
    }

    async fn create_client(config: S3Config) -> Client {
        let endpoint_url = config.endpoint_url();
        let credentials = Credentials::new(
            config.access_key_id,
            config.secret_access_key,
            None,
            None,
            "paint",
        );

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .endpoint_url(endpoint_url)
            .load()
            .await;

        Client::from_conf(
            aws_sdk_s3::config::Builder::from(&aws_config)
                .force_path_style(true) // bucket in the path, not the host
                .build(),
        )
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn map_aws_error(err: impl std::error::Error + Send + Sync + 'static) -> BlobError {
        BlobError::backend(err)
    }

    fn to_chrono(dt: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
    }
}

#[async_trait]
impl ObjectStore for S3CompatibleStore {
    async fn list_page(&self, cursor: Option<&str>) -> BlobResult<ListPage> {
        let mut request = self.client.list_objects_v2().bucket(&self.bucket);

        if let Some(token) = cursor {
            request = request.continuation_token(token);
        }

        let result = request.send().await.map_err(Self::map_aws_error)?;

        let entries = result
            .contents()
            .iter()
            .filter_map(|object| {
                let key = object.key()?;
                Some(ObjectMeta {
                    key: key.to_string(),
                    last_modified: object.last_modified().and_then(Self::to_chrono),
                })
            })
            .collect::<Vec<_>>();

        let truncated = result.is_truncated().unwrap_or(false);
        debug!(
            bucket = %self.bucket,
            entries = entries.len(),
            truncated,
            "listed S3 page"
        );

        Ok(ListPage {
            entries,
            truncated,
            next_cursor: result.next_continuation_token().map(|t| t.to_string()),
        })
    }

    async fn put(&self, key: &str, content_type: &str, body: Bytes) -> BlobResult<PutResult> {
        let size_bytes = body.len() as u64;

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .content_length(size_bytes as i64)
            .body(AwsByteStream::from(body));

        if self.public_read {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        let result = request.send().await.map_err(Self::map_aws_error)?;

        Ok(PutResult {
            etag: result.e_tag,
            size_bytes,
        })
    }

    async fn get(&self, key: &str) -> BlobResult<GetResult> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(Self::map_aws_error)?;

        let last_modified = result.last_modified().and_then(Self::to_chrono);
        let content_type = result.content_type;
        let body = result.body.collect().await.map_err(Self::map_aws_error)?;

        Ok(GetResult {
            body: body.into_bytes(),
            content_type,
            last_modified,
        })
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(Self::map_aws_error)?;
        Ok(())
    }
}
