// Uploader module - sends selected images to the analysis endpoint
//
// Files are processed strictly one after another; each one goes through
// Loading and then Success or Failure in the result sink.

pub mod analysis_client;
pub mod response;
pub mod result_sink;
pub mod upload_queue;

pub use analysis_client::{AnalysisClient, AnalysisTransport, UploadPayload};
pub use response::{parse_analysis_response, AnalysisResult, Label};
pub use result_sink::{RenderState, ResultSink, ResultsPanel, TerminalSink};
pub use upload_queue::{process_submission, process_upload_task, SelectedFile, SubmissionSummary, UploadTask};
