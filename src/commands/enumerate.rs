use log::debug;

use super::session::QuerySession;
use crate::error::DumpError;
use crate::package::PackageRecord;

/// Installed and available packages, tagged with their origin and sorted by name.
pub fn enumerate(session: &mut QuerySession) -> Result<Vec<PackageRecord>, DumpError> {
    let api = session.api();
    api.prepare()?;
    let lists = api.list_packages()?;
    debug!(
        "{} installed and {} available package(s)",
        lists.installed.len(),
        lists.available.len()
    );
    Ok(lists.into_records())
}
