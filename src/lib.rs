// src/lib.rs - sift: filtered file listing with projected metadata and recursive directory helpers
pub mod comparator;
pub mod entry;
pub mod error;
pub mod filesystem;
pub mod filter;
pub mod finder;
pub mod fs_utils;
pub mod property;

pub use comparator::{DateComparison, NumberComparison, Operator};
pub use entry::{EntryType, FileEntry};
pub use error::{FsError, Result};
pub use filesystem::{
    all_directories, all_files, list_directories, list_files, RecursionSpec,
};
pub use filter::{Filter, FilterKind, FilterSpec, Pattern};
pub use finder::{Finder, Mode, SNAPSHOT_PROPERTIES};
pub use fs_utils::{
    clean_directory, copy_directory, delete_directory, ensure_directory_exists, make_directory,
    move_directory, Outcome,
};
pub use property::{extract, Projection, Property, PropertySpec, Value};
