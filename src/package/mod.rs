//! Package records
//!
//! The backend hands out bare [`Nevra`] tuples; enumeration copies them into
//! owned [`PackageRecord`]s that carry their [`Origin`] from the start.

mod evr;

pub use evr::{compare_evr, keep_newest, rpmvercmp};

/// Name, epoch, version, release and architecture of one package.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Nevra {
    pub name: String,
    pub epoch: String,
    pub version: String,
    pub release: String,
    pub arch: String,
}

impl Nevra {
    pub fn new(name: &str, epoch: &str, version: &str, release: &str, arch: &str) -> Self {
        Self {
            name: name.to_string(),
            epoch: epoch.to_string(),
            version: version.to_string(),
            release: release.to_string(),
            arch: arch.to_string(),
        }
    }
}

/// Which package set a record was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Installed,
    Available,
}

impl Origin {
    /// Single-character tag the consumer matches on.
    pub fn code(self) -> char {
        match self {
            Origin::Installed => 'i',
            Origin::Available => 'a',
        }
    }
}

/// A package as printed: the backend's tuple plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub nevra: Nevra,
    pub origin: Origin,
}

impl PackageRecord {
    pub fn new(nevra: Nevra, origin: Origin) -> Self {
        Self { nevra, origin }
    }

    pub fn name(&self) -> &str {
        &self.nevra.name
    }
}

/// The package universe as the backend reports it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PackageLists {
    pub installed: Vec<Nevra>,
    pub available: Vec<Nevra>,
}

impl PackageLists {
    /// Tag every entry with its origin and order the result by name.
    ///
    /// Available entries are laid down before installed ones and the sort is
    /// stable, but callers must not rely on any order among equal names.
    pub fn into_records(self) -> Vec<PackageRecord> {
        let mut records: Vec<PackageRecord> = self
            .available
            .into_iter()
            .map(|n| PackageRecord::new(n, Origin::Available))
            .chain(
                self.installed
                    .into_iter()
                    .map(|n| PackageRecord::new(n, Origin::Installed)),
            )
            .collect();

        records.sort_by(|a, b| a.name().cmp(b.name()));
        records
    }
}
