use log::debug;
use std::io::Write;

use crate::{
    backend::{self, YumApi},
    error::DumpError,
    output::write_records,
    runtime::Runtime,
};

pub mod config;
mod enumerate;
mod lock;
mod session;

pub use config::Config;
pub use enumerate::enumerate;
pub use lock::{LOCK_POLICY, run_exclusive};
pub use session::{QuerySession, configure, session_settings};

/// Print every installed and available package to `out`.
#[tracing::instrument(skip(runtime, config, out))]
pub fn dump<R: Runtime, W: Write>(runtime: &R, config: &Config, out: &mut W) -> Result<(), DumpError> {
    let privileged = runtime.is_privileged();
    debug!("Running {}", if privileged { "as root" } else { "unprivileged" });

    let api = backend::open(runtime, &config.tools)?;
    run(runtime, api, config, privileged, out)
}

/// Configure, lock, enumerate and print, with an already bound backend.
pub fn run<'a, R: Runtime, W: Write>(
    runtime: &R,
    api: Box<dyn YumApi + 'a>,
    config: &Config,
    privileged: bool,
    out: &mut W,
) -> Result<(), DumpError> {
    let mut session = configure(api, config.cache_only, privileged)?;

    run_exclusive(runtime, &mut session, privileged, &config.pid_file, |session| {
        let records = enumerate(session)?;
        write_records(out, &records)?;
        debug!("Wrote {} package line(s)", records.len());
        Ok(())
    })
}
