use reqwest::Url;
use std::path::PathBuf;
use tokio::time::Duration;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::security::InputValidator;
use crate::uploader::{process_submission, AnalysisClient, ResultSink, SelectedFile, SubmissionSummary};

/// The upload form, bound to a concrete endpoint.
///
/// Binding happens once at startup. If it fails nothing can be submitted.
pub struct UploadSurface {
    client: AnalysisClient,
}

impl UploadSurface {
    pub fn bind(config: &Config, endpoint_override: Option<&str>) -> AppResult<Self> {
        let endpoint = endpoint_override.unwrap_or(&config.endpoint_url);

        let endpoint = InputValidator::validate_endpoint_url(endpoint)
            .map_err(|e| AppError::initialization(format!("analysis endpoint unusable: {}", e)))?;

        let client = AnalysisClient::new(endpoint, Duration::from_secs(config.request_timeout_secs))?;

        log::info!("Upload surface bound to {}", client.endpoint());
        Ok(Self { client })
    }

    pub fn endpoint(&self) -> &Url {
        self.client.endpoint()
    }

    pub async fn submit(
        &self,
        sink: &mut dyn ResultSink,
        client_id: &str,
        paths: Vec<PathBuf>,
    ) -> AppResult<SubmissionSummary> {
        let files = paths.into_iter().map(SelectedFile::from_path).collect();
        process_submission(&self.client, sink, client_id, files).await
    }
}
