// src/finder.rs - Filtered recursive enumeration with projected results
use crate::comparator::NumberComparison;
use crate::entry::{slashed, FileEntry};
use crate::error::{FsError, Result};
use crate::filter::{Filter, FilterSet, FilterSpec};
use crate::property::{extract, Projection, PropertySpec};
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Properties returned by [`Finder::to_array`].
pub const SNAPSHOT_PROPERTIES: [&str; 6] =
    ["name", "filename", "type", "path", "pathname", "real_path"];

/// Which kinds of node a finder yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Any,
    Files,
    Directories,
}

/// Recursive file/directory search rooted at one directory.
///
/// Entries come out depth-first, parents before children. Sibling order is
/// whatever the OS returns unless [`Finder::sort_by_name`] is set.
///
/// ```no_run
/// use sift::{Finder, PropertySpec};
///
/// let names = Finder::new("src")
///     .files()
///     .apply_filters(&"*.rs".into())?
///     .get(&PropertySpec::from("basename"), None)?;
/// # Ok::<(), sift::FsError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Finder {
    root: PathBuf,
    mode: Mode,
    filters: FilterSet,
    sort_by_name: bool,
    follow_links: bool,
}

impl Finder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mode: Mode::Any,
            filters: FilterSet::default(),
            sort_by_name: false,
            follow_links: false,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Only yield regular files (symlinks to files included).
    pub fn files(mut self) -> Self {
        self.mode = Mode::Files;
        self
    }

    /// Only yield directories (symlinks to directories included).
    pub fn directories(mut self) -> Self {
        self.mode = Mode::Directories;
        self
    }

    /// Restrict the depth of yielded entries; 0 is the root's children.
    pub fn depth(self, comparison: NumberComparison) -> Self {
        self.filter(Filter::Depth(comparison))
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Register every filter described by `spec`.
    pub fn apply_filters(self, spec: &FilterSpec) -> Result<Self> {
        Ok(spec.compile()?.into_iter().fold(self, Finder::filter))
    }

    pub fn sort_by_name(mut self) -> Self {
        self.sort_by_name = true;
        self
    }

    pub fn ignore_dot_files(self, on: bool) -> Self {
        self.filter(Filter::IgnoreDotFiles(on))
    }

    pub fn ignore_vcs(self, on: bool) -> Self {
        self.filter(Filter::IgnoreVcs(on))
    }

    pub fn follow_links(mut self, on: bool) -> Self {
        self.follow_links = on;
        self
    }

    /// Lazily walk the tree. Traversal errors are yielded as they occur.
    pub fn iter(&self) -> Result<Entries<'_>> {
        if !self.root.is_dir() {
            return Err(FsError::DirectoryNotFound(self.root.clone()));
        }

        let (min, max) = self.filters.depth_bounds();
        debug!(
            "[finder] walking {:?} mode={:?} depth={}..{:?}",
            self.root, self.mode, min, max
        );

        // The lower bound is left to `accepts`: shallower directories still
        // have to reach `filter_entry` to be pruned.
        let mut walk = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(self.follow_links);
        if let Some(max) = max {
            walk = walk.max_depth(max.saturating_add(1));
        }
        if self.sort_by_name {
            walk = walk.sort_by_file_name();
        }

        let root = self.root.as_path();
        let filters = &self.filters;
        let inner = walk.into_iter().filter_entry(move |e| {
            if e.depth() == 0 {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            let relative = e
                .path()
                .strip_prefix(root)
                .map(slashed)
                .unwrap_or_default();
            !filters.prunes(&name, &relative, e.file_type().is_dir())
        });

        Ok(Entries {
            finder: self,
            inner: Box::new(inner),
        })
    }

    /// Project up to `limit` entries through `properties`.
    pub fn get(&self, properties: &PropertySpec, limit: Option<usize>) -> Result<Vec<Projection>> {
        let mut entries = self.iter()?;
        let mut out = Vec::new();
        while limit.map_or(true, |n| out.len() < n) {
            let Some(entry) = entries.next() else {
                break;
            };
            out.push(extract(entry?, properties)?);
        }
        Ok(out)
    }

    pub fn first(&self, properties: &PropertySpec) -> Result<Option<Projection>> {
        Ok(self.get(properties, Some(1))?.into_iter().next())
    }

    /// Project the final entry. Walks and holds the whole result set, unlike
    /// [`Finder::first`].
    pub fn last(&self, properties: &PropertySpec) -> Result<Option<Projection>> {
        let mut entries = self.all()?;
        entries
            .pop()
            .map(|entry| extract(entry, properties))
            .transpose()
    }

    /// Every entry, unprojected.
    pub fn all(&self) -> Result<Vec<FileEntry>> {
        self.iter()?.collect()
    }

    /// Snapshot of [`SNAPSHOT_PROPERTIES`] for every entry.
    pub fn to_array(&self) -> Result<Vec<Projection>> {
        self.get(&PropertySpec::from(SNAPSHOT_PROPERTIES.to_vec()), None)
    }
}

/// Iterator returned by [`Finder::iter`].
pub struct Entries<'a> {
    finder: &'a Finder,
    inner: Box<dyn Iterator<Item = walkdir::Result<walkdir::DirEntry>> + 'a>,
}

impl Iterator for Entries<'_> {
    type Item = Result<FileEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let dent = match self.inner.next()? {
                Ok(dent) => dent,
                Err(e) => return Some(Err(e.into())),
            };
            let entry = match FileEntry::from_walk(&dent, &self.finder.root) {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e)),
            };
            let wanted = match self.finder.mode {
                Mode::Any => true,
                Mode::Files => entry.is_file(),
                Mode::Directories => entry.is_dir(),
            };
            if wanted && self.finder.filters.accepts(&entry) {
                return Some(Ok(entry));
            }
        }
    }
}
