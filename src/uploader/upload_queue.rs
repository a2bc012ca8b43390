use std::path::PathBuf;
use tokio::time::Instant;
use uuid::Uuid;

use crate::errors::{AppError, AppResult, UploadError};
use crate::security::InputValidator;

use super::analysis_client::{AnalysisTransport, UploadPayload};
use super::response::{parse_analysis_response, AnalysisResult};
use super::result_sink::ResultSink;

#[derive(Debug, Clone)]
pub enum FileContents {
    /// Read when the file's turn comes, not at selection time.
    OnDisk(PathBuf),
    InMemory(Vec<u8>),
}

/// A file picked by the user.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    file_name: String,
    contents: FileContents,
}

impl SelectedFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .unwrap_or(path.as_os_str())
            .to_string_lossy()
            .to_string();

        Self {
            file_name,
            contents: FileContents::OnDisk(path),
        }
    }

    pub fn from_bytes(file_name: &str, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            contents: FileContents::InMemory(data),
        }
    }

    /// Name sent with the multipart `image` part.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Name shown in result nodes.
    pub fn display_name(&self) -> String {
        InputValidator::sanitize_display_name(&self.file_name)
    }

    async fn read(&self) -> Result<Vec<u8>, UploadError> {
        match &self.contents {
            FileContents::InMemory(data) => Ok(data.clone()),
            FileContents::OnDisk(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| UploadError::Read {
                        file_name: self.file_name.clone(),
                        source,
                    })
            }
        }
    }
}

/// One file of a submission, tagged with the submission's client id.
#[derive(Debug)]
pub struct UploadTask {
    client_id: String,
    file: SelectedFile,
}

impl UploadTask {
    pub fn new(client_id: &str, file: SelectedFile) -> Self {
        Self {
            client_id: client_id.to_string(),
            file,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn file(&self) -> &SelectedFile {
        &self.file
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionSummary {
    pub submission_id: Uuid,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl SubmissionSummary {
    fn new(total: usize) -> Self {
        Self {
            submission_id: Uuid::new_v4(),
            total,
            succeeded: 0,
            failed: 0,
        }
    }
}

/// Upload every selected file, one after another, and report each outcome
/// to `sink`.
///
/// A blank client id or an empty selection rejects the whole submission
/// before any request is made: the sink gets an alert and a
/// [`AppError::Validation`] is returned. Once started, a failing file never
/// stops the files after it.
pub async fn process_submission(
    transport: &dyn AnalysisTransport,
    sink: &mut dyn ResultSink,
    client_id: &str,
    files: Vec<SelectedFile>,
) -> AppResult<SubmissionSummary> {
    let client_id = match validate_submission(client_id, &files) {
        Ok(client_id) => client_id,
        Err(e) => {
            if let AppError::Validation { message, .. } = &e {
                sink.alert(message);
            }
            log::warn!("Submission rejected: {}", e);
            return Err(e);
        }
    };

    sink.clear();

    let mut summary = SubmissionSummary::new(files.len());
    let start_time = Instant::now();

    log::info!(
        "Processing {} files for client {} (submission {})",
        summary.total,
        client_id,
        summary.submission_id
    );

    for (index, file) in files.into_iter().enumerate() {
        log::debug!(
            "Submission {}: file {} of {}",
            summary.submission_id,
            index + 1,
            summary.total
        );

        let task = UploadTask::new(&client_id, file);
        if process_upload_task(transport, sink, &task).await {
            summary.succeeded += 1;
        } else {
            summary.failed += 1;
        }
    }

    log::info!(
        "Submission {} finished in {:?}: {} succeeded, {} failed",
        summary.submission_id,
        start_time.elapsed(),
        summary.succeeded,
        summary.failed
    );

    Ok(summary)
}

fn validate_submission(client_id: &str, files: &[SelectedFile]) -> AppResult<String> {
    let client_id = InputValidator::validate_client_id(client_id)?;
    InputValidator::validate_selection(files)?;
    Ok(client_id)
}

/// Run one task through Loading and into Success or Failure.
///
/// Returns whether the file ended in Success.
pub async fn process_upload_task(
    transport: &dyn AnalysisTransport,
    sink: &mut dyn ResultSink,
    task: &UploadTask,
) -> bool {
    let display_name = task.file().display_name();
    let node = sink.show_loading(&display_name);

    match analyze_file(transport, task).await {
        Ok(result) => {
            sink.show_success(node, &display_name, &result);
            true
        }
        Err(e) => {
            if e.is_format() {
                log::warn!("Unusable response for {}: {}", display_name, e);
            } else {
                log::error!("Error processing image {}: {}", display_name, e);
            }
            sink.show_failure(node, &display_name, &e.to_string());
            false
        }
    }
}

async fn analyze_file(
    transport: &dyn AnalysisTransport,
    task: &UploadTask,
) -> Result<AnalysisResult, UploadError> {
    let data = task.file().read().await?;
    let payload = UploadPayload::new(task.client_id(), task.file().file_name(), data);

    let body = transport.submit(payload).await?;
    let result = parse_analysis_response(&body)?;

    log::info!(
        "Labels for {}: {} found",
        task.file().file_name(),
        result.labels.len()
    );
    for label in &result.labels {
        log::info!("- {}", label);
    }

    Ok(result)
}
