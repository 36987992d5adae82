// src/filesystem.rs - Convenience entry points over the finder plus single-file helpers
use crate::comparator::NumberComparison;
use crate::error::{FsError, Result};
use crate::filter::FilterSpec;
use crate::finder::Finder;
use crate::property::{Projection, PropertySpec};
use log::debug;
use std::fs;
use std::io;
use std::path::Path;

/// How deep a listing descends.
///
/// `false` lists immediate children only, `true` lists everything, and a
/// number or comparison string (`2`, `"< 3"`) is used as the depth filter
/// as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecursionSpec {
    Flag(bool),
    Depth(String),
}

impl RecursionSpec {
    /// Depth constraint for the finder; `None` means unrestricted.
    pub fn depth(&self) -> Result<Option<NumberComparison>> {
        match self {
            RecursionSpec::Flag(false) => Ok(Some(NumberComparison::from(0))),
            RecursionSpec::Flag(true) => Ok(None),
            RecursionSpec::Depth(expr) => expr.parse().map(Some),
        }
    }
}

impl Default for RecursionSpec {
    fn default() -> Self {
        RecursionSpec::Flag(false)
    }
}

impl From<bool> for RecursionSpec {
    fn from(recursive: bool) -> Self {
        RecursionSpec::Flag(recursive)
    }
}

impl From<u64> for RecursionSpec {
    fn from(depth: u64) -> Self {
        RecursionSpec::Depth(depth.to_string())
    }
}

impl From<&str> for RecursionSpec {
    fn from(expr: &str) -> Self {
        RecursionSpec::Depth(expr.to_owned())
    }
}

impl From<String> for RecursionSpec {
    fn from(expr: String) -> Self {
        RecursionSpec::Depth(expr)
    }
}

fn finder(directory: &Path, recursive: &RecursionSpec, filters: &FilterSpec) -> Result<Finder> {
    let mut finder = Finder::new(directory);
    if let Some(depth) = recursive.depth()? {
        finder = finder.depth(depth);
    }
    debug!("[filesystem] listing {:?} recursive={:?}", directory, recursive);
    finder.apply_filters(filters)
}

/// Files under `directory`, projected through `properties`.
pub fn list_files(
    directory: &Path,
    recursive: &RecursionSpec,
    filters: &FilterSpec,
    properties: &PropertySpec,
    limit: Option<usize>,
) -> Result<Vec<Projection>> {
    finder(directory, recursive, filters)?
        .files()
        .get(properties, limit)
}

/// Directories under `directory`, projected through `properties`.
pub fn list_directories(
    directory: &Path,
    recursive: &RecursionSpec,
    filters: &FilterSpec,
    properties: &PropertySpec,
    limit: Option<usize>,
) -> Result<Vec<Projection>> {
    finder(directory, recursive, filters)?
        .directories()
        .get(properties, limit)
}

/// Every file below `directory`, at any depth.
pub fn all_files(directory: &Path, properties: &PropertySpec) -> Result<Vec<Projection>> {
    list_files(
        directory,
        &RecursionSpec::Flag(true),
        &FilterSpec::new(),
        properties,
        None,
    )
}

/// Every directory below `directory`, at any depth.
pub fn all_directories(directory: &Path, properties: &PropertySpec) -> Result<Vec<Projection>> {
    list_directories(
        directory,
        &RecursionSpec::Flag(true),
        &FilterSpec::new(),
        properties,
        None,
    )
}

pub fn exists(path: &Path) -> bool {
    path.exists()
}

pub fn is_file(path: &Path) -> bool {
    path.is_file()
}

pub fn is_directory(path: &Path) -> bool {
    path.is_dir()
}

/// Read a whole file as UTF-8.
pub fn get(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(FsError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => FsError::NotReadable(path.to_path_buf()),
        _ => e.into(),
    })
}

/// Write `contents` to `path`, creating parent directories as needed.
pub fn put(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

/// Delete every path given; `false` if any of them could not be removed.
pub fn delete<P: AsRef<Path>>(paths: &[P]) -> bool {
    let mut success = true;
    for path in paths {
        if let Err(e) = fs::remove_file(path.as_ref()) {
            debug!("[filesystem] delete {:?}: {e}", path.as_ref());
            success = false;
        }
    }
    success
}

/// Copy one file, returning the number of bytes written.
pub fn copy(from: &Path, to: &Path) -> Result<u64> {
    fs::copy(from, to).map_err(|source| FsError::PathContext {
        src: from.to_path_buf(),
        dst: to.to_path_buf(),
        source,
    })
}

/// Move a file or directory by renaming it.
pub fn move_path(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to).map_err(|source| FsError::PathContext {
        src: from.to_path_buf(),
        dst: to.to_path_buf(),
        source,
    })
}
