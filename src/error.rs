use std::path::PathBuf;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("illegal param: \"{0}\"")]
    IllegalParam(String),
    #[error("Can't find {}. No such file", .0.display())]
    ConfigNotFound(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    ConfigWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read confirmation: {0}")]
    Prompt(#[from] std::io::Error),
    #[error("unable to locate the home directory")]
    NoHomeDir,
}

impl Error {
    /// Process exit code reported for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::IllegalParam(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
