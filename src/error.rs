use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Element not interactable: {0}")]
    NotInteractable(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Stage error: {0}")]
    Stage(String),
}

impl ReportError {
    pub fn browser(message: impl Into<String>) -> Self {
        ReportError::Browser(message.into())
    }

    pub fn stage(message: impl Into<String>) -> Self {
        ReportError::Stage(message.into())
    }

    /// Validation and setup failures abort the whole run; everything else is
    /// recovered at the stage boundary and degrades to a partial report.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ReportError::InvalidUrl(_) | ReportError::Config(_))
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            ReportError::Io(e) => ErrorPayload::new(
                ErrorCategory::Setup,
                e.to_string(),
                "Check file paths/permissions and free disk space.",
            ),
            ReportError::Network(e) => ErrorPayload::new(
                ErrorCategory::Network,
                e.to_string(),
                "Check connectivity/proxy/VPN and retry.",
            ),
            ReportError::InvalidUrl(msg) => ErrorPayload::new(
                ErrorCategory::Validation,
                msg.to_string(),
                "Pass a valid http/https URL or a bare hostname (e.g., example.com).",
            ),
            ReportError::Browser(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("launch") || lower.contains("executable") {
                    ErrorPayload::new(
                        ErrorCategory::Setup,
                        msg.to_string(),
                        "Install Chrome/Chromium or point --browser-path at the binary.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Browser,
                        msg.to_string(),
                        "The external page may have changed; rerun with --verbose for details.",
                    )
                }
            }
            ReportError::ElementNotFound(sel) => ErrorPayload::new(
                ErrorCategory::Browser,
                format!("Element not found: {}", sel),
                "The external service layout may have changed; the stage was skipped.",
            ),
            ReportError::NotInteractable(sel) => ErrorPayload::new(
                ErrorCategory::Browser,
                format!("Element not interactable: {}", sel),
                "The external service layout may have changed; the stage was skipped.",
            ),
            ReportError::Timeout(msg) => ErrorPayload::new(
                ErrorCategory::Browser,
                msg.to_string(),
                "Increase --nav-timeout or the analysis timeout and retry.",
            ),
            ReportError::Image(e) => ErrorPayload::new(
                ErrorCategory::Image,
                e.to_string(),
                "Verify the template/asset images under the assets directory.",
            ),
            ReportError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Setup,
                e.to_string(),
                "An external service returned an unexpected body; rerun with --verbose.",
            ),
            ReportError::Config(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("credential") || lower.contains("email") {
                    ErrorPayload::new(
                        ErrorCategory::Setup,
                        msg.to_string(),
                        "Set SITEREPORT_EMAIL and SITEREPORT_PASSWORD before running.",
                    )
                } else if lower.contains("font") || lower.contains("template") {
                    ErrorPayload::new(
                        ErrorCategory::Setup,
                        msg.to_string(),
                        "Check --assets-dir; it must contain the report templates and fonts.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Setup,
                        msg.to_string(),
                        "Check flags/paths and the config file.",
                    )
                }
            }
            ReportError::Stage(msg) => ErrorPayload::new(
                ErrorCategory::Stage,
                msg.to_string(),
                "The run continued; the report is missing this artifact.",
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Validation,
    Setup,
    Network,
    Browser,
    Image,
    Stage,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::Setup => "setup",
            ErrorCategory::Network => "network",
            ErrorCategory::Browser => "browser",
            ErrorCategory::Image => "image",
            ErrorCategory::Stage => "stage",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}
