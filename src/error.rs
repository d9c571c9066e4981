use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcilerError {
    #[cfg(feature = "fetch")]
    #[error("Fetch error: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Fetch of {url} failed with HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("No data found in sheet: {0}")]
    NoData(String),

    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("Sheet '{source_name}' is missing required column '{column}'")]
    MissingColumn { source_name: String, column: String },

    #[error("Please fill in both user and password")]
    MissingCredentials,

    #[error("Incorrect user or password")]
    InvalidCredentials,

    #[error("No active user in session")]
    NotAuthenticated,

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ReconcilerError {
    /// True for every failure that surfaces as "reload failed" on the dashboard.
    pub fn is_reload_failure(&self) -> bool {
        match self {
            #[cfg(feature = "fetch")]
            ReconcilerError::Fetch(_) => true,
            ReconcilerError::HttpStatus { .. }
            | ReconcilerError::NoData(_)
            | ReconcilerError::Parse(_)
            | ReconcilerError::MissingColumn { .. } => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReconcilerError>;
