//! Blob storage over the Storage API.

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use tracing::{debug, instrument};

use super::SupabaseClient;
use crate::backend::BlobStorage;
use crate::error::BackendError;
use crate::types::{AccessToken, UploadFile};

/// Browser cache lifetime of uploaded objects, in seconds.
const CACHE_MAX_AGE: u32 = 3600;

/// Percent-encode each segment of an object path, keeping the `/`
/// separators.
fn encode_object_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl BlobStorage for SupabaseClient {
    #[instrument(skip(self, token, file), fields(path = %path, bytes = file.bytes.len()))]
    async fn upload(
        &self,
        token: &AccessToken,
        path: &str,
        file: &UploadFile,
    ) -> Result<(), BackendError> {
        let object = format!(
            "storage/v1/object/{}/{}",
            self.inner.images_bucket,
            encode_object_path(path)
        );
        let request = self
            .request(Method::POST, &object, Some(token))
            .header(CONTENT_TYPE, file.content_type.as_str())
            .header(CACHE_CONTROL, format!("max-age={CACHE_MAX_AGE}"))
            .header("x-upsert", "true")
            .body(file.bytes.clone());

        Self::send(request).await?;
        debug!("Uploaded object");
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        self.endpoint(&format!(
            "storage/v1/object/public/{}/{}",
            self.inner.images_bucket,
            encode_object_path(path)
        ))
    }
}
