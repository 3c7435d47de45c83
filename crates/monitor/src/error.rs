use boardwatch_core::BoardwatchError;
use boardwatch_notify::NotifyError;
use thiserror::Error;

/// Errors that abort a monitor run.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("catalog request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("catalog endpoint returned {status}")]
    Status { status: u16 },

    #[error("invalid catalog URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Core(#[from] BoardwatchError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error("alert delivery failed on {failed:?} ({delivered} channel(s) delivered)")]
    Delivery {
        failed: Vec<String>,
        delivered: usize,
    },
}

pub type Result<T> = std::result::Result<T, MonitorError>;
