//! Adapter over the two incompatible yum API revisions.
//!
//! The host's yum is probed once with [`open`]; the reported version selects
//! either the [`legacy`] (2.x) or the [`modern`] (3.x) binding. Everything
//! after that talks to the [`YumApi`] trait object and never to a concrete
//! binding.
//!
//! # Structure
//!
//! - `version` - Version string probe and revision detection
//! - `command` - Tool invocations shared by both bindings
//! - `pidlock` - The PID-file protocol behind yum's global lock
//! - `legacy` / `modern` - The two bindings

mod command;
mod legacy;
mod modern;
mod pidlock;
mod version;

use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::error::DumpError;
use crate::package::PackageLists;
use crate::runtime::Runtime;

pub use command::{classify_failure, parse_query_output};
pub use legacy::LegacyYum;
pub use modern::ModernYum;
pub use pidlock::YUM_PID_FILE;
pub use version::{ApiRevision, probe_version};

/// Error categories raised by the backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("{0}")]
    Config(String),

    #[error("yum lock is held by process {pid}")]
    Locked { pid: u32 },

    #[error("{0}")]
    Lock(String),

    #[error("{0}")]
    Repo(String),

    #[error("{0}")]
    Base(String),
}

impl BackendError {
    /// Only contention on the lock is worth waiting for.
    pub fn is_lock_contention(&self) -> bool {
        matches!(self, BackendError::Locked { .. })
    }
}

/// Query session settings, applied once before anything is listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Suppress yum's own informational and error output.
    pub silent: bool,
    /// Never refresh repository metadata, use what is cached.
    pub cache_only: bool,
    /// List every version a repository carries instead of only the newest.
    pub show_duplicates: bool,
}

/// Paths of the host tools the bindings drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YumTools {
    pub yum: PathBuf,
    pub repoquery: PathBuf,
    pub rpm: PathBuf,
}

impl Default for YumTools {
    fn default() -> Self {
        Self {
            yum: PathBuf::from("yum"),
            repoquery: PathBuf::from("repoquery"),
            rpm: PathBuf::from("rpm"),
        }
    }
}

/// The operations a dump needs, normalized across yum revisions.
#[cfg_attr(test, mockall::automock)]
pub trait YumApi {
    fn revision(&self) -> ApiRevision;

    /// Apply the session settings. Must run before any listing.
    fn configure(&mut self, settings: &SessionSettings) -> Result<(), BackendError>;

    /// Take yum's global lock. Fails with [`BackendError::Locked`] while another process holds it.
    fn lock(&mut self, pid_file: &Path) -> Result<(), BackendError>;
    fn unlock(&mut self, pid_file: &Path) -> Result<(), BackendError>;

    /// Setup steps the binding needs between configuration and listing.
    fn prepare(&mut self) -> Result<(), BackendError>;

    /// Installed and available packages.
    fn list_packages(&mut self) -> Result<PackageLists, BackendError>;

    /// Release the rpm database. Safe to call more than once.
    fn close_rpmdb(&mut self);
}

/// Probe the host's yum and bind the matching API revision.
pub fn open<'a, R: Runtime>(
    runtime: &'a R,
    tools: &'a YumTools,
) -> Result<Box<dyn YumApi + 'a>, DumpError> {
    let version = probe_version(runtime, tools)?;
    let revision = ApiRevision::detect(&version)
        .ok_or_else(|| DumpError::UnsupportedVersion(version.clone()))?;
    debug!("yum {} uses the {:?} binding", version, revision);

    Ok(match revision {
        ApiRevision::Legacy => Box::new(LegacyYum::new(runtime, tools)),
        ApiRevision::Modern => Box::new(ModernYum::new(runtime, tools)),
    })
}
