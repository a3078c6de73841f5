//! Runtime abstraction for system operations.
//!
//! Everything that touches the host (environment, the PID file, child
//! processes, the clock, privilege) goes through [`Runtime`] so the query and
//! locking logic can be exercised against a mock.
//!
//! # Structure
//!
//! - `env` - Environment variables and privilege
//! - `fs` - File operations used by the PID-file lock
//! - `process` - Child processes, PIDs and sleeping

mod env;
mod fs;
mod process;

use anyhow::Result;
use std::env as std_env;
use std::path::Path;
use std::time::Duration;

pub use process::CommandOutput;

#[cfg_attr(test, mockall::automock)]
pub trait Runtime {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;

    // File System
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn remove_file(&self, path: &Path) -> Result<()>;

    /// Create `path` with `contents` only if it does not exist yet.
    /// Returns Ok(false) without touching the file when it already exists.
    fn create_new(&self, path: &Path, contents: &[u8]) -> Result<bool>;

    // Processes
    /// Run `program` to completion and capture its output.
    /// A non-zero exit status is not an error here; callers inspect `CommandOutput`.
    fn run_command(&self, program: &Path, args: &[String]) -> Result<CommandOutput>;
    fn current_pid(&self) -> u32;
    /// Whether a process with this PID exists (permission errors count as alive).
    fn process_alive(&self, pid: u32) -> bool;
    fn sleep(&self, duration: Duration);

    // Privilege
    fn is_privileged(&self) -> bool;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.remove_file_impl(path)
    }

    fn create_new(&self, path: &Path, contents: &[u8]) -> Result<bool> {
        self.create_new_impl(path, contents)
    }

    fn run_command(&self, program: &Path, args: &[String]) -> Result<CommandOutput> {
        self.run_command_impl(program, args)
    }

    fn current_pid(&self) -> u32 {
        self.current_pid_impl()
    }

    fn process_alive(&self, pid: u32) -> bool {
        self.process_alive_impl(pid)
    }

    fn sleep(&self, duration: Duration) {
        self.sleep_impl(duration)
    }

    fn is_privileged(&self) -> bool {
        self.is_privileged_impl()
    }
}
