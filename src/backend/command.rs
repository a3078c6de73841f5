//! Host tool invocations shared by both bindings.

use std::path::Path;

use log::debug;

use super::{BackendError, SessionSettings, YumTools, pidlock};
use crate::package::Nevra;
use crate::runtime::{CommandOutput, Runtime};

/// One package per line, five space separated fields.
const REPOQUERY_FORMAT: &str = "%{name} %{epoch} %{version} %{release} %{arch}";
const RPM_FORMAT: &str = "%{NAME} %{EPOCH} %{VERSION} %{RELEASE} %{ARCH}\\n";

/// Public keys imported into the rpm database show up as packages; yum hides them.
const GPG_PUBKEY: &str = "gpg-pubkey";

/// Lower-cased stderr fragments yum and repoquery print when repository metadata can't be had.
const REPO_MARKERS: &[&str] = &[
    "cannot retrieve repository metadata",
    "repomd.xml",
    "failure: repodata",
    "failed to retrieve",
    "one of the configured repositories failed",
];

/// Map a failed tool run onto the backend's error categories using its stderr.
pub fn classify_failure(tool: &str, output: &CommandOutput) -> BackendError {
    let stderr = output.stderr.trim();
    let message = if stderr.is_empty() {
        match output.status {
            Some(code) => format!("{} exited with status {}", tool, code),
            None => format!("{} was terminated by a signal", tool),
        }
    } else {
        stderr.to_string()
    };

    let lower = stderr.to_lowercase();
    if lower.contains("config error") {
        BackendError::Config(message)
    } else if REPO_MARKERS.iter().any(|marker| lower.contains(marker)) {
        BackendError::Repo(message)
    } else {
        BackendError::Base(message)
    }
}

/// Parse `name epoch version release arch` lines. Anything else is skipped.
pub fn parse_query_output(stdout: &str) -> Vec<Nevra> {
    stdout
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [name, epoch, version, release, arch] => {
                    let epoch = if *epoch == "(none)" { "0" } else { *epoch };
                    Some(Nevra::new(name, epoch, version, release, arch))
                }
                [] => None,
                _ => {
                    debug!("Skipping unparseable package line: {:?}", line);
                    None
                }
            }
        })
        .collect()
}

/// State and tool access common to both bindings: the applied settings and
/// the rpm database snapshot, which is open between its first read and `close_rpmdb`.
pub(super) struct CommandSession<'a, R: Runtime> {
    runtime: &'a R,
    tools: &'a YumTools,
    settings: Option<SessionSettings>,
    rpmdb: Option<Vec<Nevra>>,
}

impl<'a, R: Runtime> CommandSession<'a, R> {
    pub(super) fn new(runtime: &'a R, tools: &'a YumTools) -> Self {
        Self {
            runtime,
            tools,
            settings: None,
            rpmdb: None,
        }
    }

    pub(super) fn settings(&self) -> Result<SessionSettings, BackendError> {
        self.settings
            .ok_or_else(|| BackendError::Base("yum session used before it was configured".into()))
    }

    /// Validate `yum_args` by letting yum load its configuration with them, then keep `settings`.
    /// Returns the validation run so bindings can inspect what yum printed.
    pub(super) fn configure(
        &mut self,
        settings: &SessionSettings,
        yum_args: Vec<String>,
    ) -> Result<CommandOutput, BackendError> {
        let mut args = yum_args;
        args.push("--version".to_string());

        let output = self.run(&self.tools.yum, &args)?;
        if !output.success() {
            return Err(classify_failure("yum", &output));
        }

        self.settings = Some(*settings);
        Ok(output)
    }

    pub(super) fn is_rpmdb_open(&self) -> bool {
        self.rpmdb.is_some()
    }

    /// Read the installed packages out of the rpm database, once.
    pub(super) fn open_rpmdb(&mut self) -> Result<&[Nevra], BackendError> {
        if self.rpmdb.is_none() {
            let args = vec!["-qa".to_string(), "--qf".to_string(), RPM_FORMAT.to_string()];
            let output = self.run(&self.tools.rpm, &args)?;
            if !output.success() {
                return Err(classify_failure("rpm", &output));
            }

            let installed: Vec<Nevra> = parse_query_output(&output.stdout)
                .into_iter()
                .filter(|pkg| pkg.name != GPG_PUBKEY)
                .collect();
            debug!("rpm database lists {} installed package(s)", installed.len());
            self.rpmdb = Some(installed);
        }

        Ok(self.rpmdb.as_deref().unwrap_or_default())
    }

    pub(super) fn close_rpmdb(&mut self) {
        if self.rpmdb.take().is_some() {
            debug!("Closed rpm database");
        }
    }

    /// Packages the enabled repositories offer.
    pub(super) fn query_available(&self, repoquery_args: &[String]) -> Result<Vec<Nevra>, BackendError> {
        let mut args = repoquery_args.to_vec();
        args.extend(
            ["--all", "--pkgnarrow=available", "--qf", REPOQUERY_FORMAT]
                .iter()
                .map(|s| s.to_string()),
        );

        let output = self.run(&self.tools.repoquery, &args)?;
        if !output.success() {
            return Err(classify_failure("repoquery", &output));
        }

        let available = parse_query_output(&output.stdout);
        debug!("repositories offer {} package(s)", available.len());
        Ok(available)
    }

    pub(super) fn lock(&self, pid_file: &Path) -> Result<(), BackendError> {
        pidlock::acquire(self.runtime, pid_file)
    }

    pub(super) fn unlock(&self, pid_file: &Path) -> Result<(), BackendError> {
        pidlock::release(self.runtime, pid_file)
    }

    fn run(&self, program: &Path, args: &[String]) -> Result<CommandOutput, BackendError> {
        debug!("Running {} {}", program.display(), args.join(" "));
        self.runtime
            .run_command(program, args)
            .map_err(|e| BackendError::Base(format!("{:#}", e)))
    }
}
