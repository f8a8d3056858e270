use thiserror::Error;

/// Failures raised while talking to the extraction engine.
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("{0} not found. Please install yt-dlp and make sure it's in your PATH")]
    BinaryNotFound(String),

    #[error("failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Failed(String),

    #[error("could not read video metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

/// Failures writing the history ledger or the config file.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything that can go wrong while handling one menu action.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
