//! yum version probe.

use log::debug;

use super::{BackendError, YumTools, classify_failure};
use crate::runtime::Runtime;

/// The two yum API revisions this tool can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiRevision {
    /// yum 2.x
    Legacy,
    /// yum 3.x
    Modern,
}

impl ApiRevision {
    /// Pick the revision from a version string such as `3.4.3`.
    pub fn detect(version: &str) -> Option<Self> {
        let version = version.trim();
        if has_minor(version, "3.") {
            Some(ApiRevision::Modern)
        } else if has_minor(version, "2.") {
            Some(ApiRevision::Legacy)
        } else {
            None
        }
    }
}

fn has_minor(version: &str, major: &str) -> bool {
    version
        .strip_prefix(major)
        .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
}

/// Ask yum for its version. The first non-empty line of `yum --version` is the version itself.
pub fn probe_version<R: Runtime>(runtime: &R, tools: &YumTools) -> Result<String, BackendError> {
    let output = runtime
        .run_command(&tools.yum, &["--version".to_string()])
        .map_err(|e| BackendError::Base(format!("{:#}", e)))?;

    if !output.success() {
        return Err(classify_failure("yum", &output));
    }

    let version = output
        .stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string();
    debug!("yum reports version {:?}", version);
    Ok(version)
}
