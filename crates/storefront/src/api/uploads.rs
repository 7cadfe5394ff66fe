//! Image uploads.

use reqwest::multipart::{Form, Part};
use tracing::instrument;

use super::types::UploadedFile;
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Upload an image to `POST /uploads` as the `image` form field.
    ///
    /// # Errors
    ///
    /// Returns an error if `content_type` is not a valid MIME type or the
    /// upload fails.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedFile, ApiError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| self.surface(ApiError::Parse(e.to_string())))?;
        let form = Form::new().part("image", part);

        let response = self.upload("uploads", form).await?;
        self.data(response)
    }
}
