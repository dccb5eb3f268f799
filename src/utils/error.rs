use thiserror::Error;

#[derive(Error, Debug)]
pub enum WcsError {
    /// 伺服器回傳 OGC 例外報告
    #[error("Service exception: {message}")]
    ServiceException { message: String, xml: String },

    #[error("No operation named {name}")]
    OperationNotFound { name: String },

    #[error("No content named {identifier}")]
    CoverageNotFound { identifier: String },

    #[error("Invalid parameter '{field}': {reason}")]
    InvalidParameter { field: String, reason: String },

    #[error("Invalid bounding box '{value}': {reason}")]
    BoundingBoxError { value: String, reason: String },

    #[error("Unsupported WCS version: {version}")]
    UnsupportedVersion { version: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("XML parsing error: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("Invalid XML document: {reason}")]
    InvalidDocument { reason: String },

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl WcsError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            WcsError::OperationNotFound { .. } | WcsError::CoverageNotFound { .. } => {
                ErrorSeverity::Low
            }
            WcsError::HttpError(_) | WcsError::ServiceException { .. } => ErrorSeverity::Medium,
            WcsError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// 給終端使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            WcsError::ServiceException { message, .. } => {
                format!("The WCS server reported an error: {}", message)
            }
            WcsError::HttpError(e) if e.is_timeout() => {
                "The WCS server did not answer before the timeout".to_string()
            }
            WcsError::HttpError(_) => "Could not reach the WCS server".to_string(),
            WcsError::XmlError(_) => "The server response is not valid XML".to_string(),
            WcsError::CoverageNotFound { identifier } => {
                format!("The server does not offer a coverage named '{}'", identifier)
            }
            WcsError::OperationNotFound { name } => {
                format!("The server does not advertise the {} operation", name)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WcsError>;
