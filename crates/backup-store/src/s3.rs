use async_trait::async_trait;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::info;

use crate::{ObjectStore, StoreError, ARCHIVE_CONTENT_TYPE};

/// Connection settings for an S3-compatible endpoint (MinIO included).
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub use_ssl: bool,
    pub bucket: String,
    pub object_key: String,
}

pub struct S3BackupStore {
    client: Client,
    bucket: String,
    key: String,
}

impl S3BackupStore {
    pub async fn connect(settings: &S3Settings) -> Self {
        let scheme = if settings.use_ssl { "https" } else { "http" };
        let credentials = Credentials::new(
            &settings.access_key,
            &settings.secret_key,
            None,
            None,
            "wardend",
        );
        let conf = aws_config::ConfigLoader::default()
            .credentials_provider(credentials)
            .region("us-east-1")
            .endpoint_url(format!("{scheme}://{}", settings.endpoint))
            .load()
            .await;
        // MinIO serves buckets under the path, not as subdomains.
        let conf = aws_sdk_s3::config::Builder::from(&conf)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(conf),
            bucket: settings.bucket.clone(),
            key: settings.object_key.clone(),
        }
    }

    fn bucket_error(&self, message: impl ToString) -> StoreError {
        StoreError::Bucket {
            bucket: self.bucket.clone(),
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3BackupStore {
    async fn ensure_bucket(&self) -> Result<(), StoreError> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(()),
            Err(err) => {
                let service = err.into_service_error();
                if !service.is_not_found() {
                    return Err(self.bucket_error(service));
                }
                match self.client.create_bucket().bucket(&self.bucket).send().await {
                    Ok(_) => Ok(()),
                    Err(err) => {
                        let service = err.into_service_error();
                        if service.is_bucket_already_owned_by_you() {
                            return Ok(());
                        }
                        Err(self.bucket_error(service))
                    }
                }
            }
        }
    }

    async fn put_archive(&self, data: Vec<u8>) -> Result<(), StoreError> {
        self.ensure_bucket().await?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .content_type(ARCHIVE_CONTENT_TYPE)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|err| StoreError::Upload(err.into_service_error().to_string()))?;

        info!(bucket = %self.bucket, key = %self.key, "uploaded backup archive");
        Ok(())
    }

    async fn fetch_archive(&self) -> Result<Option<Vec<u8>>, StoreError> {
        self.ensure_bucket().await?;

        match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await
        {
            Ok(output) => {
                let data = output
                    .body
                    .collect()
                    .await
                    .map_err(|err| StoreError::Download(err.to_string()))?;
                Ok(Some(data.into_bytes().to_vec()))
            }
            Err(err) => {
                let service = err.into_service_error();
                if service.is_no_such_key() {
                    return Ok(None);
                }
                Err(StoreError::Download(service.to_string()))
            }
        }
    }
}
