//! File operations (read, exclusive create, remove).

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn read_to_string_impl(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).context("Failed to read file to string")
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn remove_file_impl(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).context("Failed to remove file")?;
        Ok(())
    }

    #[tracing::instrument(skip(self, contents))]
    pub(crate) fn create_new_impl(&self, path: &Path, contents: &[u8]) -> Result<bool> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to create {}", path.display()));
            }
        };
        file.write_all(contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};
    use tempfile::tempdir;

    #[test]
    fn test_real_runtime_file_ops() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("yum.pid");

        // First create wins
        assert!(runtime.create_new(&file_path, b"1234\n").unwrap());
        assert_eq!(runtime.read_to_string(&file_path).unwrap(), "1234\n");

        // Second create must not clobber the existing contents
        assert!(!runtime.create_new(&file_path, b"5678\n").unwrap());
        assert_eq!(runtime.read_to_string(&file_path).unwrap(), "1234\n");

        runtime.remove_file(&file_path).unwrap();
        assert!(!file_path.exists());
    }

    #[test]
    fn test_real_runtime_errors() {
        let runtime = RealRuntime;
        let missing = std::path::Path::new("/nonexistent/path/file.txt");

        assert!(runtime.read_to_string(missing).is_err());
        assert!(runtime.remove_file(missing).is_err());
        assert!(runtime.create_new(missing, b"1").is_err());
    }
}
