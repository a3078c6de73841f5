//! Query session setup.

use log::debug;

use crate::backend::{SessionSettings, YumApi};
use crate::error::DumpError;

/// A configured backend, owned for the whole run. Its settings never change after [`configure`].
pub struct QuerySession<'a> {
    api: Box<dyn YumApi + 'a>,
    settings: SessionSettings,
}

impl<'a> QuerySession<'a> {
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn api(&mut self) -> &mut (dyn YumApi + 'a) {
        self.api.as_mut()
    }
}

/// Settings for one invocation.
///
/// yum stays silent and reports only the newest version per package. Without
/// root the shared cache can't be refreshed, so cache-only is forced; with
/// root it follows `--cache`.
pub fn session_settings(cache_flag: bool, privileged: bool) -> SessionSettings {
    SessionSettings {
        silent: true,
        cache_only: cache_flag || !privileged,
        show_duplicates: false,
    }
}

/// Apply the invocation's settings to the backend.
pub fn configure<'a>(
    mut api: Box<dyn YumApi + 'a>,
    cache_flag: bool,
    privileged: bool,
) -> Result<QuerySession<'a>, DumpError> {
    let settings = session_settings(cache_flag, privileged);
    if !privileged && !cache_flag {
        debug!("Not running as root, using cached repository data only");
    }

    api.configure(&settings)?;
    debug!("Configured {:?} session: {:?}", api.revision(), settings);

    Ok(QuerySession { api, settings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ApiRevision, BackendError, MockYumApi};

    #[test]
    fn test_non_root_forces_cache_only() {
        assert!(session_settings(false, false).cache_only);
        assert!(session_settings(true, false).cache_only);
    }

    #[test]
    fn test_root_follows_flag() {
        assert!(!session_settings(false, true).cache_only);
        assert!(session_settings(true, true).cache_only);
    }

    #[test]
    fn test_always_silent_without_duplicates() {
        for (flag, privileged) in [(false, false), (false, true), (true, false), (true, true)] {
            let settings = session_settings(flag, privileged);
            assert!(settings.silent);
            assert!(!settings.show_duplicates);
        }
    }

    #[test]
    fn test_configure_applies_settings_once() {
        let mut api = MockYumApi::new();
        api.expect_revision().return_const(ApiRevision::Modern);
        api.expect_configure()
            .withf(|s| s.cache_only && s.silent && !s.show_duplicates)
            .times(1)
            .returning(|_| Ok(()));

        let session = configure(Box::new(api), false, false).unwrap();
        assert!(session.settings().cache_only);
    }

    #[test]
    fn test_configure_maps_config_error() {
        let mut api = MockYumApi::new();
        api.expect_configure()
            .returning(|_| Err(BackendError::Config("Error parsing \"exclude\"".into())));

        let err = configure(Box::new(api), true, true).err().unwrap();
        assert!(matches!(err, DumpError::Config(ref m) if m.contains("exclude")));
        assert_eq!(err.exit_code(), 1);
    }
}
