// src/error.rs - Error taxonomy shared by the finder and the filesystem helpers
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by finder queries and filesystem helpers.
///
/// Operations with a boolean contract (directory copy/delete/make with
/// `force`) do not return these directly; they report through
/// [`crate::Outcome`] instead.
#[derive(Debug, Error)]
pub enum FsError {
    /// A readable file was expected at this path.
    #[error("file does not exist at path {0}")]
    NotFound(PathBuf),

    /// The file exists but cannot be read.
    #[error("file is not readable at path {0}")]
    NotReadable(PathBuf),

    #[error("directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("unsupported property `{property}` for {path}")]
    UnsupportedProperty { property: String, path: PathBuf },

    /// A filter key that does not name a known filter kind.
    #[error("unknown filter `{key}`")]
    InvalidFilter { key: String },

    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid comparison `{0}`")]
    InvalidComparison(String),

    /// Contextual error that includes source and destination paths.
    #[error("operation failed from `{src}` to `{dst}`: {source}")]
    PathContext {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Raised by the traversal engine while walking a tree.
    #[error("traversal error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, FsError>;

impl FsError {
    pub(crate) fn pattern(pattern: &str, reason: impl ToString) -> Self {
        FsError::InvalidPattern {
            pattern: pattern.to_owned(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_path() {
        let err = FsError::UnsupportedProperty {
            property: "colour".into(),
            path: PathBuf::from("/tmp/a.txt"),
        };
        assert_eq!(
            err.to_string(),
            "unsupported property `colour` for /tmp/a.txt"
        );

        let err = FsError::NotFound(PathBuf::from("missing.txt"));
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn io_errors_convert() {
        let io = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        let err: FsError = io.into();
        assert!(matches!(err, FsError::Io(_)));
    }
}
