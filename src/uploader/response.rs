use serde::Deserialize;
use std::fmt;

use crate::errors::UploadError;
use crate::security::InputValidator;

/// A classification tag returned by the analysis service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Label {
    pub name: String,
    pub confidence: f64,
}

impl Label {
    /// Confidence as a percentage with one decimal place, e.g. `97.5%`.
    pub fn formatted_confidence(&self) -> String {
        format!("{:.1}%", self.confidence)
    }

    /// Label name with control characters replaced, safe to print.
    pub fn display_name(&self) -> String {
        InputValidator::sanitize_display_name(&self.name)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.display_name(), self.formatted_confidence())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisResult {
    pub labels: Vec<Label>,
}

impl AnalysisResult {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Interpret a response body from the analysis endpoint.
///
/// The body must be JSON with a `labels` array. Anything that is not JSON,
/// or whose labels are not `{name, confidence}` objects, is
/// [`UploadError::InvalidFormat`]; a document without a `labels` array is
/// [`UploadError::NoLabels`]. An empty array is a valid result.
pub fn parse_analysis_response(body: &str) -> Result<AnalysisResult, UploadError> {
    let data: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            log::error!("JSON parse error: {}", e);
            return Err(UploadError::InvalidFormat);
        }
    };

    log::debug!("Parsed data: {}", data);

    let items = match data.get("labels") {
        Some(serde_json::Value::Array(items)) => items,
        _ => {
            log::error!("No labels in response: {}", data);
            return Err(UploadError::NoLabels);
        }
    };

    let mut labels = Vec::with_capacity(items.len());
    for item in items {
        match Label::deserialize(item) {
            Ok(label) => labels.push(label),
            Err(e) => {
                log::error!("Malformed label {}: {}", item, e);
                return Err(UploadError::InvalidFormat);
            }
        }
    }

    Ok(AnalysisResult { labels })
}
