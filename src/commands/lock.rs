//! Exclusive access to the rpm database around a piece of work.

use log::{debug, warn};
use std::path::Path;
use std::time::Duration;

use super::session::QuerySession;
use crate::backend::BackendError;
use crate::error::DumpError;
use crate::retry::{RetryError, RetryPolicy, with_retry};
use crate::runtime::Runtime;

/// Ten tries, one second apart.
pub const LOCK_POLICY: RetryPolicy = RetryPolicy::new(10, Duration::from_secs(1));

/// Run `work` while holding yum's global lock, then close the rpm database
/// and release the lock whatever `work` returned.
///
/// Without root nobody can change the shared state, so no lock is taken.
/// An unlock failure replaces the result, successful or not.
pub fn run_exclusive<'a, R, T, F>(
    runtime: &R,
    session: &mut QuerySession<'a>,
    privileged: bool,
    pid_file: &Path,
    work: F,
) -> Result<T, DumpError>
where
    R: Runtime,
    F: FnOnce(&mut QuerySession<'a>) -> Result<T, DumpError>,
{
    if !privileged {
        debug!("Not running as root, skipping the yum lock");
        let result = work(session);
        session.api().close_rpmdb();
        return result;
    }

    let mut lock_obtained = false;
    let result = acquire(runtime, session, pid_file).and_then(|()| {
        lock_obtained = true;
        work(session)
    });

    session.api().close_rpmdb();
    if lock_obtained {
        if let Err(e) = session.api().unlock(pid_file) {
            if let Err(prior) = &result {
                warn!("Dropping earlier error in favour of the unlock failure: {}", prior);
            }
            return Err(DumpError::Unlock(e.to_string()));
        }
    }

    result
}

fn acquire<R: Runtime>(
    runtime: &R,
    session: &mut QuerySession,
    pid_file: &Path,
) -> Result<(), DumpError> {
    let api = session.api();
    with_retry(
        "yum lock",
        &LOCK_POLICY,
        |_| api.lock(pid_file),
        BackendError::is_lock_contention,
        |delay| runtime.sleep(delay),
    )
    .map_err(|e| match e {
        RetryError::Exhausted { attempts, last } => {
            debug!("Last lock attempt: {}", last);
            DumpError::LockTimeout {
                path: pid_file.to_path_buf(),
                attempts,
                waited: LOCK_POLICY.total_wait(),
            }
        }
        RetryError::Aborted(err) => DumpError::Lock(err.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockYumApi;
    use crate::commands::session::configure;
    use crate::runtime::MockRuntime;
    use mockall::Sequence;
    use std::cell::Cell;
    use std::path::PathBuf;

    fn pid_file() -> PathBuf {
        PathBuf::from("/var/run/yum.pid")
    }

    fn configured(api: MockYumApi) -> QuerySession<'static> {
        configure(Box::new(api), false, true).unwrap()
    }

    fn base_api() -> MockYumApi {
        let mut api = MockYumApi::new();
        api.expect_configure().returning(|_| Ok(()));
        api.expect_revision()
            .return_const(crate::backend::ApiRevision::Modern);
        api
    }

    #[test]
    fn test_non_root_skips_lock() {
        let mut api = base_api();
        api.expect_lock().never();
        api.expect_unlock().never();
        api.expect_close_rpmdb().times(1).return_const(());
        let mut runtime = MockRuntime::new();
        runtime.expect_sleep().never();

        let mut session = configured(api);
        let result = run_exclusive(&runtime, &mut session, false, &pid_file(), |_| Ok(7));
        assert_eq!(result.unwrap(), 7);
    }

    #[test]
    fn test_lock_work_close_unlock_in_order() {
        let mut seq = Sequence::new();
        let mut api = base_api();
        api.expect_lock()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        api.expect_close_rpmdb()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        api.expect_unlock()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        let runtime = MockRuntime::new();

        let mut session = configured(api);
        let ran = Cell::new(false);
        let result = run_exclusive(&runtime, &mut session, true, &pid_file(), |_| {
            ran.set(true);
            Ok(())
        });

        assert!(result.is_ok());
        assert!(ran.get());
    }

    #[test_log::test]
    fn test_lock_acquired_after_contention() {
        let mut api = base_api();
        let attempts = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = attempts.clone();
        api.expect_lock().times(4).returning(move |_| {
            if counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst) < 3 {
                Err(BackendError::Locked { pid: 1001 })
            } else {
                Ok(())
            }
        });
        api.expect_close_rpmdb().times(1).return_const(());
        api.expect_unlock().times(1).returning(|_| Ok(()));
        let mut runtime = MockRuntime::new();
        runtime
            .expect_sleep()
            .withf(|d| *d == Duration::from_secs(1))
            .times(3)
            .return_const(());

        let mut session = configured(api);
        let result = run_exclusive(&runtime, &mut session, true, &pid_file(), |_| Ok("done"));
        assert_eq!(result.unwrap(), "done");
        assert_eq!(attempts.load(std::sync::atomic::Ordering::SeqCst), 4);
    }

    #[test_log::test]
    fn test_lock_timeout_skips_work() {
        let mut api = base_api();
        api.expect_lock()
            .times(10)
            .returning(|_| Err(BackendError::Locked { pid: 1001 }));
        api.expect_close_rpmdb().times(1).return_const(());
        api.expect_unlock().never();
        let mut runtime = MockRuntime::new();
        runtime.expect_sleep().times(10).return_const(());

        let mut session = configured(api);
        let result: Result<(), _> = run_exclusive(&runtime, &mut session, true, &pid_file(), |_| {
            panic!("work must not run without the lock")
        });

        let err = result.unwrap_err();
        assert!(matches!(
            err,
            DumpError::LockTimeout { attempts: 10, ref waited, .. } if *waited == Duration::from_secs(10)
        ));
        assert_eq!(err.exit_code(), 200);
    }

    #[test]
    fn test_lock_error_is_not_retried() {
        let mut api = base_api();
        api.expect_lock()
            .times(1)
            .returning(|_| Err(BackendError::Lock("Permission denied".into())));
        api.expect_close_rpmdb().times(1).return_const(());
        api.expect_unlock().never();
        let mut runtime = MockRuntime::new();
        runtime.expect_sleep().never();

        let mut session = configured(api);
        let err = run_exclusive(&runtime, &mut session, true, &pid_file(), |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, DumpError::Lock(ref m) if m.contains("Permission denied")));
        assert_eq!(err.exit_code(), 200);
    }

    #[test]
    fn test_unlock_runs_when_work_fails() {
        let mut api = base_api();
        api.expect_lock().returning(|_| Ok(()));
        api.expect_close_rpmdb().times(1).return_const(());
        api.expect_unlock().times(1).returning(|_| Ok(()));
        let runtime = MockRuntime::new();

        let mut session = configured(api);
        let err = run_exclusive::<_, (), _>(&runtime, &mut session, true, &pid_file(), |_| {
            Err(DumpError::Repo("Cannot retrieve repository metadata".into()))
        })
        .unwrap_err();

        assert!(matches!(err, DumpError::Repo(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test_log::test]
    fn test_unlock_failure_overrides_result() {
        let mut api = base_api();
        api.expect_lock().returning(|_| Ok(()));
        api.expect_close_rpmdb().return_const(());
        api.expect_unlock()
            .returning(|_| Err(BackendError::Lock("/var/run/yum.pid: No such file".into())));
        let runtime = MockRuntime::new();

        let mut session = configured(api);
        let err = run_exclusive(&runtime, &mut session, true, &pid_file(), |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, DumpError::Unlock(ref m) if m.contains("No such file")));
        assert_eq!(err.exit_code(), 200);
    }

    #[test]
    fn test_unlock_failure_overrides_earlier_error() {
        let mut api = base_api();
        api.expect_lock().returning(|_| Ok(()));
        api.expect_close_rpmdb().return_const(());
        api.expect_unlock()
            .returning(|_| Err(BackendError::Lock("gone".into())));
        let runtime = MockRuntime::new();

        let mut session = configured(api);
        let err = run_exclusive::<_, (), _>(&runtime, &mut session, true, &pid_file(), |_| {
            Err(DumpError::Backend("boom".into()))
        })
        .unwrap_err();
        assert!(matches!(err, DumpError::Unlock(_)));
    }
}
