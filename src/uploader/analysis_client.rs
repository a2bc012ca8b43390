use async_trait::async_trait;
use reqwest::{multipart, Client, Url};
use std::path::Path;
use tokio::time::Duration;

use crate::errors::{AppError, AppResult, UploadError};

pub const CLIENT_ID_FIELD: &str = "clientId";
pub const IMAGE_FIELD: &str = "image";

/// Anything that can carry one upload to the analysis service and hand back
/// the raw response body.
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    async fn submit(&self, payload: UploadPayload) -> Result<String, UploadError>;
}

/// HTTP client for the analysis endpoint
pub struct AnalysisClient {
    client: Client,
    endpoint: Url,
}

impl AnalysisClient {
    pub fn new(endpoint: Url, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::initialization(format!("could not build HTTP client: {}", e)))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl AnalysisTransport for AnalysisClient {
    async fn submit(&self, payload: UploadPayload) -> Result<String, UploadError> {
        let file_name = payload.file_name.clone();
        let form = payload.build_form()?;

        log::debug!("POST {} for {}", self.endpoint, file_name);

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        log::info!("Response status for {}: {}", file_name, status.as_u16());

        if !status.is_success() {
            log::error!("HTTP error! Status: {}", status.as_u16());
            return Err(UploadError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let response_text = response.text().await?;
        log::debug!("Raw response: {}", response_text);

        Ok(response_text)
    }
}

/// Multipart body for a single image: the client identifier and the file.
#[derive(Debug, Clone)]
pub struct UploadPayload {
    client_id: String,
    file_name: String,
    data: Vec<u8>,
    mime_type: String,
}

impl UploadPayload {
    pub fn new(client_id: &str, file_name: &str, data: Vec<u8>) -> Self {
        Self {
            client_id: client_id.to_string(),
            file_name: file_name.to_string(),
            mime_type: mime_type_for(file_name).to_string(),
            data,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn build_form(self) -> Result<multipart::Form, UploadError> {
        let part = multipart::Part::bytes(self.data)
            .file_name(self.file_name)
            .mime_str(&self.mime_type)?;

        Ok(multipart::Form::new()
            .text(CLIENT_ID_FIELD, self.client_id)
            .part(IMAGE_FIELD, part))
    }
}

/// MIME type from the file extension, as a browser would report it.
pub fn mime_type_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("tif") | Some("tiff") => "image/tiff",
        _ => "application/octet-stream",
    }
}
