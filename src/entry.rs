// src/entry.rs - One filesystem node yielded by a traversal
use crate::error::Result;
use chrono::{DateTime, Local};
use std::fmt;
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};

/// Node type as reported without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    File,
    Dir,
    Link,
    Unknown,
}

impl EntryType {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryType::File => "file",
            EntryType::Dir => "dir",
            EntryType::Link => "link",
            EntryType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to a single file or directory found under a traversal root.
///
/// `is_dir`, `is_file`, `size` and `mtime` follow symlinks; `is_link` and
/// `entry_type` look at the link itself. Entries are built fresh for every
/// traversal and hold a metadata snapshot taken at that moment.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pathname: PathBuf,
    relative: PathBuf,
    depth: usize,
    link_meta: Metadata,
    meta: Option<Metadata>,
}

impl FileEntry {
    /// Build an entry for `path`, which must live under `root`.
    pub fn new(path: impl Into<PathBuf>, root: &Path) -> Result<Self> {
        let pathname = path.into();
        let relative = pathname
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| pathname.clone());
        let depth = relative.components().count().saturating_sub(1);
        let link_meta = fs::symlink_metadata(&pathname)?;
        let meta = if link_meta.file_type().is_symlink() {
            fs::metadata(&pathname).ok()
        } else {
            Some(link_meta.clone())
        };
        Ok(Self {
            pathname,
            relative,
            depth,
            link_meta,
            meta,
        })
    }

    pub(crate) fn from_walk(entry: &walkdir::DirEntry, root: &Path) -> Result<Self> {
        let mut built = Self::new(entry.path(), root)?;
        built.depth = entry.depth().saturating_sub(1);
        Ok(built)
    }

    /// Final path component.
    pub fn basename(&self) -> String {
        self.pathname
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Basename without its extension.
    pub fn filename(&self) -> String {
        self.pathname
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn extension(&self) -> String {
        self.pathname
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Directory containing the entry.
    pub fn path(&self) -> String {
        self.pathname
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn pathname(&self) -> String {
        self.pathname.to_string_lossy().into_owned()
    }

    pub fn as_path(&self) -> &Path {
        &self.pathname
    }

    /// Canonical absolute path, `None` when it cannot be resolved
    /// (dangling link, entry removed since the walk).
    pub fn real_path(&self) -> Option<String> {
        fs::canonicalize(&self.pathname)
            .ok()
            .map(|p| p.to_string_lossy().into_owned())
    }

    /// Directory part of the path relative to the traversal root.
    pub fn relative_path(&self) -> String {
        self.relative
            .parent()
            .map(slashed)
            .unwrap_or_default()
    }

    pub fn relative_pathname(&self) -> String {
        slashed(&self.relative)
    }

    /// 0 for immediate children of the traversal root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn entry_type(&self) -> EntryType {
        let ft = self.link_meta.file_type();
        if ft.is_symlink() {
            EntryType::Link
        } else if ft.is_dir() {
            EntryType::Dir
        } else if ft.is_file() {
            EntryType::File
        } else {
            EntryType::Unknown
        }
    }

    pub fn is_dir(&self) -> bool {
        self.meta.as_ref().is_some_and(Metadata::is_dir)
    }

    pub fn is_file(&self) -> bool {
        self.meta.as_ref().is_some_and(Metadata::is_file)
    }

    pub fn is_link(&self) -> bool {
        self.link_meta.file_type().is_symlink()
    }

    pub fn is_readable(&self) -> bool {
        access::readable(&self.pathname)
    }

    pub fn is_writable(&self) -> bool {
        access::writable(&self.pathname)
    }

    /// Size in bytes; a dangling link reports the size of the link itself.
    pub fn size(&self) -> u64 {
        self.metadata().len()
    }

    pub fn mtime(&self) -> Option<DateTime<Local>> {
        self.metadata().modified().ok().map(DateTime::<Local>::from)
    }

    fn metadata(&self) -> &Metadata {
        self.meta.as_ref().unwrap_or(&self.link_meta)
    }
}

// Relative paths are matched with forward slashes on every platform.
pub(crate) fn slashed(p: &Path) -> String {
    p.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(unix)]
mod access {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;
    use std::path::Path;

    fn check(path: &Path, mode: libc::c_int) -> bool {
        let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
            return false;
        };
        // SAFETY: `c_path` is a valid NUL-terminated string for the call.
        unsafe { libc::access(c_path.as_ptr(), mode) == 0 }
    }

    pub(super) fn readable(path: &Path) -> bool {
        check(path, libc::R_OK)
    }

    pub(super) fn writable(path: &Path) -> bool {
        check(path, libc::W_OK)
    }
}

#[cfg(not(unix))]
mod access {
    use std::fs;
    use std::path::Path;

    pub(super) fn readable(path: &Path) -> bool {
        fs::metadata(path).is_ok()
    }

    pub(super) fn writable(path: &Path) -> bool {
        fs::metadata(path).is_ok_and(|m| !m.permissions().readonly())
    }
}
