//! Failure categories of a dump run and their process exit codes.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::backend::BackendError;

/// Exit code for unsupported versions, configuration, repository and general errors.
pub const EXIT_FAILURE: u8 = 1;

/// Exit code for anything that went wrong around the exclusive yum lock.
pub const EXIT_LOCK_FAILURE: u8 = 200;

/// Everything that can end a dump run early.
#[derive(Error, Debug)]
pub enum DumpError {
    #[error("Error: Can't match supported yum version: {0}")]
    UnsupportedVersion(String),

    #[error("Config Error: {0}")]
    Config(String),

    #[error("Locking Error! {0}")]
    Lock(String),

    #[error(
        "Locking Error! Couldn't obtain an exclusive yum lock on {} in {} seconds ({} attempts). Giving up.",
        .path.display(),
        .waited.as_secs(),
        .attempts
    )]
    LockTimeout {
        path: PathBuf,
        attempts: usize,
        waited: Duration,
    },

    #[error("Unlock Error: {0}")]
    Unlock(String),

    #[error("Repository Error: {0}")]
    Repo(String),

    #[error("General Error: {0}")]
    Backend(String),

    #[error("Output Error: {0}")]
    Output(#[from] std::io::Error),
}

impl DumpError {
    pub fn exit_code(&self) -> u8 {
        match self {
            DumpError::Lock(_) | DumpError::LockTimeout { .. } | DumpError::Unlock(_) => {
                EXIT_LOCK_FAILURE
            }
            _ => EXIT_FAILURE,
        }
    }
}

impl From<BackendError> for DumpError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Config(msg) => DumpError::Config(msg),
            BackendError::Locked { .. } | BackendError::Lock(_) => DumpError::Lock(err.to_string()),
            BackendError::Repo(msg) => DumpError::Repo(msg),
            BackendError::Base(msg) => DumpError::Backend(msg),
        }
    }
}
