use reqwest::Url;

use crate::errors::{AppError, AppResult};

pub const MISSING_CLIENT_ID_MESSAGE: &str = "Please enter a client ID";
pub const EMPTY_SELECTION_MESSAGE: &str = "Please select at least one image";

const MAX_DISPLAY_NAME_LEN: usize = 255;
const MAX_ENDPOINT_LEN: usize = 2048;

pub struct InputValidator;

impl InputValidator {
    /// Trim the client identifier and reject it if nothing is left.
    pub fn validate_client_id(raw: &str) -> AppResult<String> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(AppError::validation("client_id", MISSING_CLIENT_ID_MESSAGE));
        }

        Ok(trimmed.to_string())
    }

    pub fn validate_selection<T>(files: &[T]) -> AppResult<()> {
        if files.is_empty() {
            return Err(AppError::validation("files", EMPTY_SELECTION_MESSAGE));
        }

        Ok(())
    }

    pub fn validate_endpoint_url(url: &str) -> AppResult<Url> {
        let trimmed = url.trim();

        if trimmed.is_empty() {
            return Err(AppError::validation("endpoint_url", "Endpoint URL cannot be empty"));
        }

        if trimmed.len() > MAX_ENDPOINT_LEN {
            return Err(AppError::validation("endpoint_url", "Endpoint URL too long"));
        }

        let parsed = Url::parse(trimmed).map_err(|_| AppError::invalid_endpoint(trimmed))?;

        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(AppError::invalid_endpoint(trimmed));
        }

        Ok(parsed)
    }

    /// Make a file name safe to print: control characters become `_` and the
    /// result is capped at 255 characters.
    pub fn sanitize_display_name(name: &str) -> String {
        let sanitized: String = name
            .trim()
            .chars()
            .map(|c| if c.is_control() { '_' } else { c })
            .collect();

        if sanitized.chars().count() > MAX_DISPLAY_NAME_LEN {
            let truncated: String = sanitized.chars().take(MAX_DISPLAY_NAME_LEN - 3).collect();
            format!("{}...", truncated)
        } else {
            sanitized
        }
    }
}
