//! Small helpers for reading and writing sysfs attributes

use crate::error::{HalError, Result};
use std::fmt::Display;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Read the first line of an attribute, trimmed
pub fn read_string(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path).map_err(|e| HalError::io(path, e))?;
    Ok(content.lines().next().unwrap_or("").trim().to_string())
}

/// Read and parse a single-valued attribute
pub fn read_value<T: FromStr>(path: &Path, what: &'static str) -> Result<T> {
    let content = read_string(path)?;
    content.parse::<T>().map_err(|_| HalError::Parse {
        what,
        path: path.to_path_buf(),
        value: content,
    })
}

/// Write a value to an existing attribute
///
/// The attribute is never created; a missing file is an error, as it is in sysfs.
pub fn write_value(path: &Path, value: impl Display) -> Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|e| HalError::io(path, e))?;
    write!(file, "{}", value).map_err(|e| HalError::io(path, e))
}

/// Names of all entries in a directory, sorted
pub fn list_entries(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| HalError::io(dir, e))? {
        let entry = entry.map_err(|e| HalError::io(dir, e))?;
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Paths of the entries whose name ends with `suffix` (and is longer than it), sorted by name
pub fn entries_with_suffix(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    Ok(list_entries(dir)?
        .into_iter()
        .filter(|name| name.len() > suffix.len() && name.ends_with(suffix))
        .map(|name| dir.join(name))
        .collect())
}
