//! Binding for yum 3.x.
//!
//! yum 3 understands `--setopt`, so duplicate suppression is handed to yum
//! itself and overrides whatever yum.conf says. The rpm database is opened
//! lazily on the first listing.

use std::path::Path;

use super::command::CommandSession;
use super::{ApiRevision, BackendError, SessionSettings, YumApi, YumTools};
use crate::package::PackageLists;
use crate::runtime::Runtime;

pub struct ModernYum<'a, R: Runtime> {
    session: CommandSession<'a, R>,
    repoquery_args: Vec<String>,
}

impl<'a, R: Runtime> ModernYum<'a, R> {
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
        args.push(format!(
            "--setopt=showdupesfromrepos={}",
            u8::from(settings.show_duplicates)
        ));
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
        args.push(format!(
            "--setopt=showdupesfromrepos={}",
            u8::from(settings.show_duplicates)
        ));
        if settings.show_duplicates {
            args.push("--show-duplicates".to_string());
        }
        args
    }
}

impl<R: Runtime> YumApi for ModernYum<'_, R> {
    fn revision(&self) -> ApiRevision {
        ApiRevision::Modern
    }

    fn configure(&mut self, settings: &SessionSettings) -> Result<(), BackendError> {
        self.session.configure(settings, Self::yum_args(settings))?;
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
        Ok(())
    }

    fn list_packages(&mut self) -> Result<PackageLists, BackendError> {
        self.session.settings()?;
        let installed = self.session.open_rpmdb()?.to_vec();
        let available = self.session.query_available(&self.repoquery_args)?;
        Ok(PackageLists {
            installed,
            available,
        })
    }

    fn close_rpmdb(&mut self) {
        self.session.close_rpmdb()
    }
}
