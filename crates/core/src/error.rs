use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardwatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid keyword pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, BoardwatchError>;
