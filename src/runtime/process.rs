//! Child processes, PIDs and sleeping.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use super::RealRuntime;

/// Captured result of a finished child process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn run_command_impl(&self, program: &Path, args: &[String]) -> Result<CommandOutput> {
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("Failed to run {}", program.display()))?;

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    pub(crate) fn current_pid_impl(&self) -> u32 {
        std::process::id()
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn process_alive_impl(&self, pid: u32) -> bool {
        #[cfg(unix)]
        {
            use nix::errno::Errno;
            use nix::sys::signal::kill;
            use nix::unistd::Pid;

            let Ok(raw) = i32::try_from(pid) else {
                return false;
            };
            match kill(Pid::from_raw(raw), None) {
                Ok(()) => true,
                Err(Errno::EPERM) => true,
                Err(_) => false,
            }
        }

        #[cfg(not(unix))]
        {
            let _ = pid;
            true
        }
    }

    pub(crate) fn sleep_impl(&self, duration: Duration) {
        std::thread::sleep(duration)
    }
}
