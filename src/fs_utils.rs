// src/fs_utils.rs - Recursive directory copy, delete and create with best-effort outcomes
use crate::error::{FsError, Result};
use log::{debug, warn};
use std::fs::{self, DirEntry};
use std::io;
use std::path::Path;

/// Result of an operation whose contract is "report, never raise".
#[derive(Debug)]
pub enum Outcome {
    Succeeded,
    /// A non-critical step failed; the operation still counts as a success.
    Ignored(FsError),
    Failed(FsError),
}

impl Outcome {
    /// The boolean the operation reports to callers.
    pub fn succeeded(&self) -> bool {
        !matches!(self, Outcome::Failed(_))
    }

    pub fn error(&self) -> Option<&FsError> {
        match self {
            Outcome::Succeeded => None,
            Outcome::Ignored(e) | Outcome::Failed(e) => Some(e),
        }
    }
}

/// Immediate children of `dir`, ordered by file name.
fn children(dir: &Path) -> io::Result<Vec<DirEntry>> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(DirEntry::file_name);
    Ok(entries)
}

/// Copy the contents of `source` into `destination`, creating it as needed.
///
/// Stops at the first child that cannot be copied. Whatever was copied
/// before that point stays in place.
pub fn copy_directory(source: &Path, destination: &Path) -> Outcome {
    match copy_tree(source, destination) {
        Ok(()) => Outcome::Succeeded,
        Err(e) => {
            warn!("[copy_directory] {:?} -> {:?} aborted: {e}", source, destination);
            Outcome::Failed(e)
        }
    }
}

fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_dir() {
        return Err(FsError::DirectoryNotFound(src.to_path_buf()));
    }
    if !dst.is_dir() {
        fs::create_dir_all(dst)?;
    }
    for entry in children(src)? {
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_tree(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path).map_err(|source| FsError::PathContext {
                src: src_path.clone(),
                dst: dst_path.clone(),
                source,
            })?;
        }
    }
    Ok(())
}

/// Remove everything below `directory`, then `directory` itself unless
/// `preserve` is set.
///
/// Real subdirectories are emptied recursively; files and symlinks (even
/// links to directories) are unlinked without following them. Failures on
/// individual children and on the final removal are logged and reported as
/// [`Outcome::Ignored`]; only a missing or unreadable `directory` fails.
pub fn delete_directory(directory: &Path, preserve: bool) -> Outcome {
    if !directory.is_dir() {
        return Outcome::Failed(FsError::DirectoryNotFound(directory.to_path_buf()));
    }
    let entries = match fs::read_dir(directory) {
        Ok(rd) => rd,
        Err(e) => return Outcome::Failed(e.into()),
    };

    let mut ignored: Option<FsError> = None;
    let mut note = |err: FsError| {
        warn!("[delete_directory] ignoring: {err}");
        if ignored.is_none() {
            ignored = Some(err);
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                note(e.into());
                continue;
            }
        };
        let path = entry.path();
        // DirEntry::file_type does not follow symlinks.
        let is_real_dir = entry.file_type().is_ok_and(|ft| ft.is_dir());
        if is_real_dir {
            match delete_directory(&path, false) {
                Outcome::Succeeded => {}
                Outcome::Ignored(e) | Outcome::Failed(e) => note(e),
            }
        } else if let Err(e) = fs::remove_file(&path) {
            note(e.into());
        }
    }

    if !preserve {
        debug!("[delete_directory] removing {:?}", directory);
        if let Err(e) = fs::remove_dir(directory) {
            note(e.into());
        }
    }

    match ignored {
        Some(e) => Outcome::Ignored(e),
        None => Outcome::Succeeded,
    }
}

/// Empty `directory` but keep it.
pub fn clean_directory(directory: &Path) -> Outcome {
    delete_directory(directory, true)
}

/// Create `path` with permission bits `mode` (Unix only).
///
/// An existing path is an error even when `recursive` is set. With `force`
/// the error is swallowed and reported as [`Outcome::Failed`] instead of
/// being returned.
pub fn make_directory(path: &Path, mode: u32, recursive: bool, force: bool) -> Result<Outcome> {
    match create_dir(path, mode, recursive) {
        Ok(()) => Ok(Outcome::Succeeded),
        Err(e) if force => {
            debug!("[make_directory] {:?}: {e} (forced)", path);
            Ok(Outcome::Failed(e.into()))
        }
        Err(e) => Err(e.into()),
    }
}

fn create_dir(path: &Path, mode: u32, recursive: bool) -> io::Result<()> {
    if path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", path.display()),
        ));
    }
    let mut builder = fs::DirBuilder::new();
    builder.recursive(recursive);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    builder.create(path)
}

/// Create `path` and its parents unless it is already a directory.
pub fn ensure_directory_exists(path: &Path, mode: u32) -> Result<()> {
    if !path.is_dir() {
        make_directory(path, mode, true, false)?;
    }
    Ok(())
}

/// Rename `from` to `to`. With `overwrite`, an existing directory at `to`
/// is deleted first and the move is abandoned if that fails.
pub fn move_directory(from: &Path, to: &Path, overwrite: bool) -> Outcome {
    if overwrite && to.is_dir() {
        let cleared = delete_directory(to, false);
        if !cleared.succeeded() || to.exists() {
            return match cleared {
                Outcome::Failed(e) | Outcome::Ignored(e) => Outcome::Failed(e),
                Outcome::Succeeded => Outcome::Failed(FsError::Io(io::Error::other(format!(
                    "{} could not be cleared",
                    to.display()
                )))),
            };
        }
    }
    match fs::rename(from, to) {
        Ok(()) => Outcome::Succeeded,
        Err(source) => Outcome::Failed(FsError::PathContext {
            src: from.to_path_buf(),
            dst: to.to_path_buf(),
            source,
        }),
    }
}
