use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Tax service error: {0}")]
    ServiceError(#[from] ServiceError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required credential: environment variable {name} is not set")]
    MissingCredential { name: String },

    #[error("Input is missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("Input header names column '{column}' more than once")]
    DuplicateColumn { column: String },
}

impl EtlError {
    /// Process exit code for errors that abort the run.
    pub fn exit_code(&self) -> i32 {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingCredential { .. } => 2,
            EtlError::MissingColumn { .. }
            | EtlError::DuplicateColumn { .. }
            | EtlError::CsvError(_) => 3,
            EtlError::IoError(_) | EtlError::SerializationError(_) => 4,
            EtlError::ServiceError(_) => 5,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::MissingCredential { name } => {
                format!("Export {} before running the job", name)
            }
            EtlError::MissingColumn { column } => {
                format!("Add a '{}' column to the input header row", column)
            }
            EtlError::DuplicateColumn { column } => {
                format!("Rename or remove the repeated '{}' header", column)
            }
            EtlError::CsvError(_) => "Check that the input is a well-formed CSV file".to_string(),
            EtlError::IoError(_) => {
                "Check that the input exists and the output location is writable".to_string()
            }
            EtlError::ConfigError { .. } | EtlError::InvalidConfigValueError { .. } => {
                "Review the configuration file and command line arguments".to_string()
            }
            EtlError::ServiceError(_) => {
                "Check the tax service endpoint and credentials".to_string()
            }
            EtlError::SerializationError(_) => "Report this as a bug".to_string(),
        }
    }
}

/// Failures raised by a remote tax service call.
///
/// The display text of a failure is what ends up in the `messages` column of
/// the output row when address resolution fails, so variants carry the
/// service's own wording where possible.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Malformed service response: {0}")]
    MalformedResponse(String),

    #[error("{0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, EtlError>;
