//! Line format read by the configuration-management provider.
//!
//! One package per line: `name epoch version release arch origin`, separated
//! by single spaces, origin `i` or `a`. The consumer splits lines positionally,
//! so the field order and separator are fixed.

use std::io::{self, Write};

use crate::package::PackageRecord;

pub fn format_record(record: &PackageRecord) -> String {
    let n = &record.nevra;
    format!(
        "{} {} {} {} {} {}",
        n.name,
        n.epoch,
        n.version,
        n.release,
        n.arch,
        record.origin.code()
    )
}

/// Write one line per record, in the given order. Nothing is written for an empty slice.
pub fn write_records<W: Write>(out: &mut W, records: &[PackageRecord]) -> io::Result<()> {
    for record in records {
        writeln!(out, "{}", format_record(record))?;
    }
    out.flush()
}
