//! yum's global lock: a PID file that exists while some process holds the lock.

use std::path::Path;

use log::debug;

use super::BackendError;
use crate::runtime::Runtime;

/// Well-known location yum itself locks.
pub const YUM_PID_FILE: &str = "/var/run/yum.pid";

/// Create the PID file with our PID.
///
/// A live holder yields [`BackendError::Locked`]. A file naming a dead process,
/// or holding no valid PID, is stale and gets replaced once. A lock file that
/// exists but can't be read is an error, never stale.
pub fn acquire<R: Runtime>(runtime: &R, path: &Path) -> Result<(), BackendError> {
    let own_pid = runtime.current_pid();
    let contents = format!("{}\n", own_pid);

    for _ in 0..2 {
        let created = runtime
            .create_new(path, contents.as_bytes())
            .map_err(|e| BackendError::Lock(format!("{:#}", e)))?;
        if created {
            debug!("Acquired lock {}", path.display());
            return Ok(());
        }

        let body = match runtime.read_to_string(path) {
            Ok(body) => body,
            Err(e) if is_not_found(&e) => {
                debug!("Lock {} went away before it could be read", path.display());
                continue;
            }
            Err(e) => {
                return Err(BackendError::Lock(format!(
                    "Could not access lock {}: {:#}",
                    path.display(),
                    e
                )));
            }
        };

        // PID 0 would address our own process group, never a real holder
        let holder = body.trim().parse::<u32>().ok().filter(|&pid| pid != 0);

        match holder {
            Some(pid) if pid == own_pid => {
                debug!("Lock {} is already ours", path.display());
                return Ok(());
            }
            Some(pid) if runtime.process_alive(pid) => {
                return Err(BackendError::Locked { pid });
            }
            _ => {
                debug!("Removing stale lock {} (holder {:?})", path.display(), holder);
                if let Err(e) = runtime.remove_file(path) {
                    debug!("Could not remove stale lock: {:#}", e);
                }
            }
        }
    }

    Err(BackendError::Lock(format!(
        "could not replace stale lock file {}",
        path.display()
    )))
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

/// Remove the PID file.
pub fn release<R: Runtime>(runtime: &R, path: &Path) -> Result<(), BackendError> {
    runtime
        .remove_file(path)
        .map_err(|e| BackendError::Lock(format!("{}: {:#}", path.display(), e)))?;
    debug!("Released lock {}", path.display());
    Ok(())
}
