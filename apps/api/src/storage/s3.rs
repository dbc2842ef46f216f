use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::debug;

use crate::storage::{BlobStore, StorageError};

/// Stores each blob as the object `<prefix>/<key>.json` in one bucket.
#[derive(Clone)]
pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    prefix: String,
}

impl S3BlobStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, prefix: String) -> Self {
        Self {
            client,
            bucket,
            prefix,
        }
    }

    fn object_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            format!("{key}.json")
        } else {
            format!("{}/{key}.json", self.prefix.trim_end_matches('/'))
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn load(&self, key: &str) -> Result<Option<Bytes>, StorageError> {
        let object_key = self.object_key(key);
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await;

        match response {
            Ok(output) => {
                let data = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| StorageError::Backend(format!("S3 read failed: {e}")))?;
                Ok(Some(data.into_bytes()))
            }
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    Ok(None)
                } else {
                    Err(StorageError::Backend(format!(
                        "S3 get of {object_key} failed: {service_error}"
                    )))
                }
            }
        }
    }

    async fn store(&self, key: &str, bytes: Bytes) -> Result<(), StorageError> {
        let object_key = self.object_key(key);
        let len = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .body(ByteStream::from(bytes))
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| StorageError::Backend(format!("S3 upload failed: {e}")))?;

        debug!("Uploaded {len} bytes to s3://{}/{}", self.bucket, object_key);
        Ok(())
    }
}
