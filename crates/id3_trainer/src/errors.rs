use id3_core::Id3Error;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned while loading inputs or writing reports.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{}:{line}: {source}", path.display())]
    Schema {
        path: PathBuf,
        line: usize,
        #[source]
        source: Id3Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] Id3Error),
}

impl TrainerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
