//! Binding for yum 2.x.
//!
//! yum 2 has no `--setopt`, so "newest only" is enforced here after listing.
//! It also reports a broken configuration on stderr while still exiting 0,
//! and the rpm database must be opened explicitly by [`YumApi::prepare`].

use std::path::Path;

use log::debug;

use super::command::CommandSession;
use super::{ApiRevision, BackendError, SessionSettings, YumApi, YumTools};
use crate::package::{PackageLists, keep_newest};
use crate::runtime::Runtime;

pub struct LegacyYum<'a, R: Runtime> {
    session: CommandSession<'a, R>,
    repoquery_args: Vec<String>,
}

impl<'a, R: Runtime> LegacyYum<'a, R> {
    pub fn new(runtime: &'a R, tools: &'a YumTools) -> Self {
        Self {
            session: CommandSession::new(runtime, tools),
            repoquery_args: Vec::new(),
        }
    }

    fn yum_args(settings: &SessionSettings) -> Vec<String> {
        let mut args = Vec::new();
        if settings.silent {
            args.extend(["-d", "0", "-e", "0"].map(String::from));
        }
        if settings.cache_only {
            args.push("-C".to_string());
        }
        args
    }

    fn repoquery_args(settings: &SessionSettings) -> Vec<String> {
        let mut args = Vec::new();
        if settings.silent {
            args.push("-q".to_string());
        }
        if settings.cache_only {
            args.push("-C".to_string());
        }
        if settings.show_duplicates {
            args.push("--show-duplicates".to_string());
        }
        args
    }
}

impl<R: Runtime> YumApi for LegacyYum<'_, R> {
    fn revision(&self) -> ApiRevision {
        ApiRevision::Legacy
    }

    fn configure(&mut self, settings: &SessionSettings) -> Result<(), BackendError> {
        let output = self.session.configure(settings, Self::yum_args(settings))?;
        if let Some(line) = output
            .stderr
            .lines()
            .find(|line| line.to_lowercase().contains("config error"))
        {
            return Err(BackendError::Config(line.trim().to_string()));
        }
        self.repoquery_args = Self::repoquery_args(settings);
        Ok(())
    }

    fn lock(&mut self, pid_file: &Path) -> Result<(), BackendError> {
        self.session.lock(pid_file)
    }

    fn unlock(&mut self, pid_file: &Path) -> Result<(), BackendError> {
        self.session.unlock(pid_file)
    }

    fn prepare(&mut self) -> Result<(), BackendError> {
        self.session.settings()?;
        self.session.open_rpmdb()?;
        Ok(())
    }

    fn list_packages(&mut self) -> Result<PackageLists, BackendError> {
        let settings = self.session.settings()?;
        if !self.session.is_rpmdb_open() {
            return Err(BackendError::Base(
                "rpm database is not set up, prepare must run before listing".into(),
            ));
        }

        let mut available = self.session.query_available(&self.repoquery_args)?;
        if !settings.show_duplicates {
            let before = available.len();
            available = keep_newest(available);
            debug!("Dropped {} older duplicate(s)", before - available.len());
        }

        let installed = self.session.open_rpmdb()?.to_vec();
        Ok(PackageLists {
            installed,
            available,
        })
    }

    fn close_rpmdb(&mut self) {
        self.session.close_rpmdb()
    }
}
