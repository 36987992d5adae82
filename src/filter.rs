// src/filter.rs - Filter specs, typed filters and the compiled set a finder applies
use crate::comparator::{DateComparison, NumberComparison};
use crate::entry::FileEntry;
use crate::error::{FsError, Result};
use glob::MatchOptions;
use regex::Regex;
use std::fs;

/// Directories skipped by `ignore_vcs`.
pub const VCS_DIRS: &[&str] = &[
    ".svn", "_svn", "CVS", "_darcs", ".arch-params", ".monotone", ".bzr", ".git", ".hg",
];

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// A name, path or content pattern.
///
/// Strings wrapped in delimiters (`/foo$/i`, `#bar#`, `{baz}`) are regular
/// expressions; anything else is a glob for names and a plain substring for
/// paths and contents.
#[derive(Debug, Clone)]
pub enum Pattern {
    Glob(glob::Pattern),
    Regex(Regex),
    Literal(String),
}

impl Pattern {
    pub fn glob(s: &str) -> Result<Self> {
        if let Some(re) = delimited_regex(s)? {
            return Ok(Pattern::Regex(re));
        }
        glob::Pattern::new(s)
            .map(Pattern::Glob)
            .map_err(|e| FsError::pattern(s, e))
    }

    pub fn literal(s: &str) -> Result<Self> {
        Ok(match delimited_regex(s)? {
            Some(re) => Pattern::Regex(re),
            None => Pattern::Literal(s.to_owned()),
        })
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        match self {
            Pattern::Glob(p) => p.matches_with(haystack, GLOB_OPTIONS),
            Pattern::Regex(re) => re.is_match(haystack),
            Pattern::Literal(s) => haystack.contains(s.as_str()),
        }
    }
}

fn delimited_regex(s: &str) -> Result<Option<Regex>> {
    let mut chars = s.chars();
    let Some(open) = chars.next() else {
        return Ok(None);
    };
    let close = match open {
        '/' | '#' | '~' | '@' | '%' => open,
        '{' => '}',
        _ => return Ok(None),
    };
    let Some(end) = s.rfind(close).filter(|&i| i > 0) else {
        return Ok(None);
    };
    let body = &s[open.len_utf8()..end];
    let flags = &s[end + close.len_utf8()..];
    if body.is_empty() || !flags.chars().all(|c| "imsxu".contains(c)) {
        return Ok(None);
    }
    // `u` only toggles UTF-8 mode, which the regex crate always has.
    let inline: String = flags.chars().filter(|&c| c != 'u').collect();
    let source = if inline.is_empty() {
        body.to_owned()
    } else {
        format!("(?{inline}){body}")
    };
    Regex::new(&source)
        .map(Some)
        .map_err(|e| FsError::pattern(s, e))
}

/// Every filter kind a finder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Name,
    NotName,
    Path,
    NotPath,
    Size,
    Date,
    Depth,
    Contains,
    NotContains,
    Exclude,
    IgnoreDotFiles,
    IgnoreVcs,
}

impl FilterKind {
    /// Case-insensitive; underscores and dashes are ignored, so `not_name`,
    /// `NotName` and `not-name` are the same key.
    pub fn from_key(key: &str) -> Result<Self> {
        let ident: String = key
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        Ok(match ident.as_str() {
            "name" => FilterKind::Name,
            "notname" => FilterKind::NotName,
            "path" => FilterKind::Path,
            "notpath" => FilterKind::NotPath,
            "size" => FilterKind::Size,
            "date" => FilterKind::Date,
            "depth" => FilterKind::Depth,
            "contains" => FilterKind::Contains,
            "notcontains" => FilterKind::NotContains,
            "exclude" => FilterKind::Exclude,
            "ignoredotfiles" => FilterKind::IgnoreDotFiles,
            "ignorevcs" => FilterKind::IgnoreVcs,
            _ => return Err(FsError::InvalidFilter { key: key.to_owned() }),
        })
    }
}

#[derive(Debug, Clone)]
pub enum Filter {
    Name(Pattern),
    NotName(Pattern),
    Path(Pattern),
    NotPath(Pattern),
    Size(NumberComparison),
    Date(DateComparison),
    Depth(NumberComparison),
    Contains(Pattern),
    NotContains(Pattern),
    Exclude(String),
    IgnoreDotFiles(bool),
    IgnoreVcs(bool),
}

impl Filter {
    pub fn parse(kind: FilterKind, value: &str) -> Result<Self> {
        Ok(match kind {
            FilterKind::Name => Filter::Name(Pattern::glob(value)?),
            FilterKind::NotName => Filter::NotName(Pattern::glob(value)?),
            FilterKind::Path => Filter::Path(Pattern::literal(value)?),
            FilterKind::NotPath => Filter::NotPath(Pattern::literal(value)?),
            FilterKind::Size => Filter::Size(value.parse()?),
            FilterKind::Date => Filter::Date(value.parse()?),
            FilterKind::Depth => Filter::Depth(value.parse()?),
            FilterKind::Contains => Filter::Contains(Pattern::literal(value)?),
            FilterKind::NotContains => Filter::NotContains(Pattern::literal(value)?),
            FilterKind::Exclude => Filter::Exclude(value.trim_matches('/').to_owned()),
            FilterKind::IgnoreDotFiles => Filter::IgnoreDotFiles(parse_flag(value)?),
            FilterKind::IgnoreVcs => Filter::IgnoreVcs(parse_flag(value)?),
        })
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(FsError::pattern(value, "expected a boolean")),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKey {
    /// No key given; filters by name.
    Positional,
    Named(String),
}

/// Caller-facing filter description: an ordered list of keys, each with one
/// or more patterns.
///
/// ```
/// use sift::FilterSpec;
///
/// let a = FilterSpec::from("*.txt");
/// let b = FilterSpec::from(vec!["*.txt"]);
/// let c = FilterSpec::new().with("name", ["*.txt"]);
/// assert_eq!(a.compile().unwrap().len(), 1);
/// assert_eq!(b.compile().unwrap().len(), 1);
/// assert_eq!(c.compile().unwrap().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    entries: Vec<(FilterKey, Vec<String>)>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<K, I, S>(mut self, key: K, patterns: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.push((
            FilterKey::Named(key.into()),
            patterns.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn positional(mut self, pattern: impl Into<String>) -> Self {
        self.entries
            .push((FilterKey::Positional, vec![pattern.into()]));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Turn every (key, pattern) pair into a typed filter. Unknown keys and
    /// malformed patterns are reported here, before any traversal starts.
    pub fn compile(&self) -> Result<Vec<Filter>> {
        let mut filters = Vec::new();
        for (key, patterns) in &self.entries {
            let kind = match key {
                FilterKey::Positional => FilterKind::Name,
                FilterKey::Named(k) => FilterKind::from_key(k)?,
            };
            for pattern in patterns {
                filters.push(Filter::parse(kind, pattern)?);
            }
        }
        Ok(filters)
    }
}

impl From<&str> for FilterSpec {
    fn from(pattern: &str) -> Self {
        FilterSpec::new().with("name", [pattern])
    }
}

impl From<String> for FilterSpec {
    fn from(pattern: String) -> Self {
        FilterSpec::new().with("name", [pattern])
    }
}

impl<S: Into<String>> From<Vec<S>> for FilterSpec {
    fn from(patterns: Vec<S>) -> Self {
        patterns
            .into_iter()
            .fold(FilterSpec::new(), |spec, p| spec.positional(p))
    }
}

/// Filters grouped by kind, ready to be evaluated against entries.
#[derive(Debug, Clone, Default)]
pub(crate) struct FilterSet {
    names: Vec<Pattern>,
    not_names: Vec<Pattern>,
    paths: Vec<Pattern>,
    not_paths: Vec<Pattern>,
    sizes: Vec<NumberComparison>,
    dates: Vec<DateComparison>,
    depths: Vec<NumberComparison>,
    contains: Vec<Pattern>,
    not_contains: Vec<Pattern>,
    excludes: Vec<String>,
    ignore_dot_files: bool,
    ignore_vcs: bool,
}

impl FilterSet {
    pub(crate) fn push(&mut self, filter: Filter) {
        match filter {
            Filter::Name(p) => self.names.push(p),
            Filter::NotName(p) => self.not_names.push(p),
            Filter::Path(p) => self.paths.push(p),
            Filter::NotPath(p) => self.not_paths.push(p),
            Filter::Size(c) => self.sizes.push(c),
            Filter::Date(c) => self.dates.push(c),
            Filter::Depth(c) => self.depths.push(c),
            Filter::Contains(p) => self.contains.push(p),
            Filter::NotContains(p) => self.not_contains.push(p),
            Filter::Exclude(dir) => self.excludes.push(dir),
            Filter::IgnoreDotFiles(on) => self.ignore_dot_files = on,
            Filter::IgnoreVcs(on) => self.ignore_vcs = on,
        }
    }

    /// Tightest (min, max) depth implied by the depth comparisons.
    pub(crate) fn depth_bounds(&self) -> (usize, Option<usize>) {
        let mut min = 0;
        let mut max: Option<usize> = None;
        for c in &self.depths {
            let (lo, hi) = c.depth_bounds();
            if let Some(lo) = lo {
                min = min.max(lo);
            }
            if let Some(hi) = hi {
                max = Some(max.map_or(hi, |m| m.min(hi)));
            }
        }
        (min, max)
    }

    /// True when the entry, and everything beneath it, must not be visited.
    pub(crate) fn prunes(&self, name: &str, relative: &str, is_dir: bool) -> bool {
        if self.ignore_dot_files && name.starts_with('.') {
            return true;
        }
        if !is_dir {
            return false;
        }
        if self.ignore_vcs && VCS_DIRS.contains(&name) {
            return true;
        }
        self.excludes.iter().any(|ex| {
            if ex.contains('/') {
                relative == ex || relative.starts_with(&format!("{ex}/"))
            } else {
                name == ex
            }
        })
    }

    pub(crate) fn accepts(&self, entry: &FileEntry) -> bool {
        if !self.depths.iter().all(|c| c.test(entry.depth() as u64)) {
            return false;
        }

        let name = entry.basename();
        if self.not_names.iter().any(|p| p.is_match(&name)) {
            return false;
        }
        if !self.names.is_empty() && !self.names.iter().any(|p| p.is_match(&name)) {
            return false;
        }

        let relative = entry.relative_pathname();
        if self.not_paths.iter().any(|p| p.is_match(&relative)) {
            return false;
        }
        if !self.paths.is_empty() && !self.paths.iter().any(|p| p.is_match(&relative)) {
            return false;
        }

        if entry.is_file() && !self.sizes.iter().all(|c| c.test(entry.size())) {
            return false;
        }

        if !self.dates.is_empty() {
            let Some(mtime) = entry.mtime() else {
                return false;
            };
            if !self.dates.iter().all(|c| c.test(mtime)) {
                return false;
            }
        }

        if !self.contains.is_empty() || !self.not_contains.is_empty() {
            return self.accepts_content(entry);
        }
        true
    }

    // Content filters only ever accept readable regular files.
    fn accepts_content(&self, entry: &FileEntry) -> bool {
        if !entry.is_file() {
            return false;
        }
        let Ok(bytes) = fs::read(entry.as_path()) else {
            return false;
        };
        let content = String::from_utf8_lossy(&bytes);
        if self.not_contains.iter().any(|p| p.is_match(&content)) {
            return false;
        }
        self.contains.is_empty() || self.contains.iter().any(|p| p.is_match(&content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiled(spec: FilterSpec) -> Vec<Filter> {
        spec.compile().expect("compile")
    }

    #[test]
    fn bare_strings_and_lists_filter_by_name() {
        for spec in [
            FilterSpec::from("*.txt"),
            FilterSpec::from(vec!["*.txt"]),
            FilterSpec::new().with("name", ["*.txt"]),
        ] {
            let filters = compiled(spec);
            assert_eq!(filters.len(), 1);
            assert!(matches!(&filters[0], Filter::Name(p) if p.is_match("a.txt")));
        }
    }

    #[test]
    fn keys_are_normalised() {
        for key in ["not_name", "NotName", "notname", "NOT-NAME"] {
            assert_eq!(FilterKind::from_key(key).expect("known key"), FilterKind::NotName);
        }
    }

    #[test]
    fn unknown_keys_fail_at_compile_time() {
        let err = FilterSpec::new()
            .with("colour", ["red"])
            .compile()
            .expect_err("unknown key");
        assert!(matches!(err, FsError::InvalidFilter { key } if key == "colour"));
    }

    #[test]
    fn each_pattern_registers_separately() {
        let filters = compiled(FilterSpec::new().with("name", ["*.rs", "*.toml"]));
        assert_eq!(filters.len(), 2);
    }

    #[test]
    fn delimited_strings_are_regexes() {
        let p = Pattern::glob("/^re.*\\.MD$/i").expect("regex");
        assert!(matches!(p, Pattern::Regex(_)));
        assert!(p.is_match("readme.md"));

        let p = Pattern::literal("{^src/}").expect("regex");
        assert!(p.is_match("src/main.rs"));
        assert!(!p.is_match("tests/src/x.rs"));

        assert!(Pattern::glob("/[/").is_err());
    }

    #[test]
    fn plain_path_patterns_match_substrings() {
        let p = Pattern::literal("fixtures/").expect("literal");
        assert!(p.is_match("tests/fixtures/a.txt"));
        assert!(!p.is_match("tests/a.txt"));
    }

    #[test]
    fn globs_keep_leading_dots_literal() {
        let p = Pattern::glob("*.txt").expect("glob");
        assert!(p.is_match("notes.txt"));
        assert!(!p.is_match(".hidden.txt"));
    }

    #[test]
    fn depth_bounds_intersect() {
        let mut set = FilterSet::default();
        for f in compiled(FilterSpec::new().with("depth", ["> 0", "< 4", "<= 2"])) {
            set.push(f);
        }
        assert_eq!(set.depth_bounds(), (1, Some(2)));
    }

    #[test]
    fn excludes_match_names_or_relative_paths() {
        let mut set = FilterSet::default();
        set.push(Filter::Exclude("target".into()));
        set.push(Filter::Exclude("docs/generated".into()));
        assert!(set.prunes("target", "crates/a/target", true));
        assert!(set.prunes("generated", "docs/generated", true));
        assert!(!set.prunes("generated", "src/generated", true));
        assert!(!set.prunes("target", "target", false));
    }

    #[test]
    fn vcs_and_dot_files() {
        let mut set = FilterSet::default();
        set.push(Filter::IgnoreVcs(true));
        assert!(set.prunes(".git", ".git", true));
        assert!(!set.prunes(".env", ".env", false));
        set.push(Filter::IgnoreDotFiles(true));
        assert!(set.prunes(".env", ".env", false));
    }

    #[test]
    fn flags_parse() {
        assert!(matches!(
            Filter::parse(FilterKind::IgnoreVcs, "off").expect("flag"),
            Filter::IgnoreVcs(false)
        ));
        assert!(Filter::parse(FilterKind::IgnoreDotFiles, "maybe").is_err());
    }
}
