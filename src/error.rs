use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Data store error: {0}")]
    StoreError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),

    #[error("Unsupported data file version {found} (expected {expected})")]
    BundleVersion { found: u32, expected: u32 },

    #[error("A scrape session is already running")]
    SessionBusy,

    #[error("Failed to save statistics: {0}")]
    SaveFailed(String),
}
