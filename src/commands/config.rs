use log::debug;
use std::path::PathBuf;

use crate::{
    backend::{YUM_PID_FILE, YumTools},
    runtime::Runtime,
};

pub const YUM_ENV: &str = "YUM_DUMP_YUM";
pub const REPOQUERY_ENV: &str = "YUM_DUMP_REPOQUERY";
pub const RPM_ENV: &str = "YUM_DUMP_RPM";
pub const PID_FILE_ENV: &str = "YUM_DUMP_PID_FILE";

/// Everything a dump run needs to know up front.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `--cache` was given.
    pub cache_only: bool,
    pub tools: YumTools,
    pub pid_file: PathBuf,
}

impl Config {
    /// Build the configuration from the CLI flag and `YUM_DUMP_*` overrides.
    pub fn new<R: Runtime>(runtime: &R, cache_only: bool) -> Self {
        let defaults = YumTools::default();
        let config = Self {
            cache_only,
            tools: YumTools {
                yum: path_from_env(runtime, YUM_ENV).unwrap_or(defaults.yum),
                repoquery: path_from_env(runtime, REPOQUERY_ENV).unwrap_or(defaults.repoquery),
                rpm: path_from_env(runtime, RPM_ENV).unwrap_or(defaults.rpm),
            },
            pid_file: path_from_env(runtime, PID_FILE_ENV)
                .unwrap_or_else(|| PathBuf::from(YUM_PID_FILE)),
        };
        debug!("Using {:?}", config);
        config
    }
}

fn path_from_env<R: Runtime>(runtime: &R, key: &str) -> Option<PathBuf> {
    runtime
        .env_var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}
