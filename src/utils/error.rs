use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("API key is missing")]
    MissingCredentialError,

    #[error("Subject not found: {query}")]
    SubjectNotFound { query: String },

    #[error("Score '{score_id}' not found in subject '{subject}'")]
    ScoreNotFound { subject: String, score_id: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Insight service returned HTTP {status}: {body}")]
    InsightStatusError { status: u16, body: String },

    #[error("Insight generation failed: {message}")]
    InsightError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Storage,
    Network,
    Insight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TrackerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TrackerError::ConfigError { .. } | TrackerError::MissingCredentialError => {
                ErrorCategory::Configuration
            }
            // 金鑰被拒絕，重試無用
            TrackerError::InsightStatusError { .. } if self.is_auth_rejection() => {
                ErrorCategory::Configuration
            }
            TrackerError::InvalidConfigValueError { .. }
            | TrackerError::SubjectNotFound { .. }
            | TrackerError::ScoreNotFound { .. } => ErrorCategory::Input,
            TrackerError::IoError(_)
            | TrackerError::SerializationError(_)
            | TrackerError::StorageError { .. } => ErrorCategory::Storage,
            TrackerError::ApiError(_) | TrackerError::InsightStatusError { .. } => {
                ErrorCategory::Network
            }
            TrackerError::InsightError { .. } => ErrorCategory::Insight,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Network | ErrorCategory::Insight => ErrorSeverity::Medium,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    /// Exit code for the CLI. Low severity counts as success.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    /// 401/403 from the insight service: the key was sent but not accepted.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self,
            TrackerError::InsightStatusError {
                status: 401 | 403,
                ..
            }
        )
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::Insight
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            TrackerError::MissingCredentialError => {
                "API Key not found. Please configure the environment.".to_string()
            }
            TrackerError::SubjectNotFound { query } => {
                format!("No subject matches '{}'", query)
            }
            TrackerError::ScoreNotFound { subject, score_id } => {
                format!("Subject '{}' has no score with id '{}'", subject, score_id)
            }
            TrackerError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid {}: {}", field, reason)
            }
            TrackerError::InsightStatusError { status, .. } if self.is_auth_rejection() => {
                format!(
                    "The insight service rejected the API key (HTTP {}). Check that it is valid.",
                    status
                )
            }
            TrackerError::ApiError(_) | TrackerError::InsightStatusError { .. } => {
                "Could not reach the insight service.".to_string()
            }
            TrackerError::InsightError { message } => message.clone(),
            TrackerError::IoError(_)
            | TrackerError::SerializationError(_)
            | TrackerError::StorageError { .. } => {
                "Your changes could not be saved.".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => {
                "Set GEMINI_API_KEY (or API_KEY), pass --api-key, or add api_key under [insights] in the config file".to_string()
            }
            ErrorCategory::Input => {
                "Run `scholartrack dashboard` to list subjects and `scholartrack show <subject>` to list score ids".to_string()
            }
            ErrorCategory::Storage => {
                "Check that the data directory exists and is writable".to_string()
            }
            ErrorCategory::Network | ErrorCategory::Insight => {
                "Try again: run `scholartrack insights`".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
