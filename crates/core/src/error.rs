use thiserror::Error;

#[derive(Error, Debug)]
pub enum YtscribeError {
    #[error("Fetch failed for {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Render failed for {url}: {reason}")]
    RenderFailed { url: String, reason: String },

    #[error("Caption parse failed: {reason}")]
    CaptionParseFailed { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, YtscribeError>;
