use std::{io, path::PathBuf};

/// Error type returned by the tokenizing and rendering pipeline.
#[derive(Debug, thiserror::Error)]
pub enum WcloudError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("morphological analysis failed: {0}")]
    Analyzer(String),
    #[error("font file may be invalid: {0}")]
    InvalidFont(String),
    #[error("invalid color: {0}")]
    InvalidColor(String),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("we need at least 1 word to plot a word cloud, got 0")]
    NoWords,
    #[error("couldn't find space to draw, the canvas may be too small")]
    NoSpace,
}

impl WcloudError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        WcloudError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, WcloudError>;
