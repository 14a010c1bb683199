use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::ApiError;
use crate::media::MediaFile;

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Client for the media upload endpoint.
///
/// The destination is parameterized by the tenant's cloud name; the upload
/// preset rides along as a form field on every request.
#[derive(Clone)]
pub struct UploadClient {
    client: Client,
    endpoint: String,
    upload_preset: String,
}

impl UploadClient {
    pub fn new(cloud_name: &str, upload_preset: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!(
                "https://api.cloudinary.com/v1_1/{}/image/upload",
                cloud_name
            ),
            upload_preset: upload_preset.to_string(),
        }
    }

    /// Post the file as a multipart form and return the durable URL.
    pub async fn upload(&self, file: &MediaFile) -> Result<String, ApiError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| {
                ApiError::Transport(format!(
                    "invalid content type {}: {}",
                    file.content_type, e
                ))
            })?;
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone());

        debug!(file = %file.file_name, "dispatching upload request");
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status, "upload request rejected");
            return Err(ApiError::Status { status, body });
        }

        let body = response.text().await?;
        parse_upload_body(&body)
    }
}

fn parse_upload_body(body: &str) -> Result<String, ApiError> {
    let parsed: UploadResponse =
        serde_json::from_str(body).map_err(|e| ApiError::Malformed(e.to_string()))?;
    Ok(parsed.secure_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extracts_secure_url() {
        let body = r#"{"secure_url":"https://x/y.png","public_id":"y"}"#;
        assert_eq!(parse_upload_body(body).unwrap(), "https://x/y.png");
    }

    #[test]
    fn test_parse_rejects_body_without_secure_url() {
        let body = r#"{"url":"http://x/y.png"}"#;
        assert!(matches!(
            parse_upload_body(body),
            Err(ApiError::Malformed(_))
        ));
    }
}
