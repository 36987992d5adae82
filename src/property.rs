// src/property.rs - Projects selected properties off a FileEntry
use crate::entry::{EntryType, FileEntry};
use crate::error::{FsError, Result};
use chrono::{DateTime, Local};
use indexmap::IndexMap;
use std::fmt;

/// A single projected attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Bool(bool),
    Int(u64),
    Time(DateTime<Local>),
    Type(EntryType),
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Time(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
            Value::Type(t) => write!(f, "{t}"),
            Value::Null => f.write_str("null"),
        }
    }
}

/// The closed set of properties an entry can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Basename,
    Filename,
    Extension,
    Path,
    Pathname,
    RealPath,
    RelativePath,
    RelativePathname,
    Type,
    IsDir,
    IsFile,
    IsLink,
    IsReadable,
    IsWritable,
    Size,
    Mtime,
    Depth,
}

type Accessor = fn(&FileEntry) -> Value;

// Name lookup, aliases included. `name` and `dirname` are the only aliases.
static PROPERTIES: &[(&str, Property)] = &[
    ("basename", Property::Basename),
    ("name", Property::Basename),
    ("filename", Property::Filename),
    ("extension", Property::Extension),
    ("path", Property::Path),
    ("dirname", Property::Path),
    ("pathname", Property::Pathname),
    ("real_path", Property::RealPath),
    ("relative_path", Property::RelativePath),
    ("relative_pathname", Property::RelativePathname),
    ("type", Property::Type),
    ("is_dir", Property::IsDir),
    ("is_file", Property::IsFile),
    ("is_link", Property::IsLink),
    ("is_readable", Property::IsReadable),
    ("is_writable", Property::IsWritable),
    ("size", Property::Size),
    ("mtime", Property::Mtime),
    ("depth", Property::Depth),
];

impl Property {
    /// Resolve a property name, applying the alias table.
    pub fn lookup(name: &str) -> Option<Self> {
        PROPERTIES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, p)| *p)
    }

    fn accessor(self) -> Accessor {
        match self {
            Property::Basename => |e: &FileEntry| Value::Str(e.basename()),
            Property::Filename => |e: &FileEntry| Value::Str(e.filename()),
            Property::Extension => |e: &FileEntry| Value::Str(e.extension()),
            Property::Path => |e: &FileEntry| Value::Str(e.path()),
            Property::Pathname => |e: &FileEntry| Value::Str(e.pathname()),
            Property::RealPath => |e: &FileEntry| e.real_path().map_or(Value::Null, Value::Str),
            Property::RelativePath => |e: &FileEntry| Value::Str(e.relative_path()),
            Property::RelativePathname => |e: &FileEntry| Value::Str(e.relative_pathname()),
            Property::Type => |e: &FileEntry| Value::Type(e.entry_type()),
            Property::IsDir => |e: &FileEntry| Value::Bool(e.is_dir()),
            Property::IsFile => |e: &FileEntry| Value::Bool(e.is_file()),
            Property::IsLink => |e: &FileEntry| Value::Bool(e.is_link()),
            Property::IsReadable => |e: &FileEntry| Value::Bool(e.is_readable()),
            Property::IsWritable => |e: &FileEntry| Value::Bool(e.is_writable()),
            Property::Size => |e: &FileEntry| Value::Int(e.size()),
            Property::Mtime => |e: &FileEntry| e.mtime().map_or(Value::Null, Value::Time),
            Property::Depth => |e: &FileEntry| Value::Int(e.depth() as u64),
        }
    }

    pub fn get(self, entry: &FileEntry) -> Value {
        (self.accessor())(entry)
    }
}

/// Which attributes of an entry a query materialises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertySpec {
    /// Hand back the entry itself.
    Entry,
    One(String),
    /// Ordered map keyed by the names exactly as given.
    Many(Vec<String>),
}

impl Default for PropertySpec {
    fn default() -> Self {
        PropertySpec::One("pathname".to_owned())
    }
}

impl From<&str> for PropertySpec {
    fn from(name: &str) -> Self {
        PropertySpec::One(name.to_owned())
    }
}

impl<S: Into<String>> From<Vec<S>> for PropertySpec {
    fn from(names: Vec<S>) -> Self {
        PropertySpec::Many(names.into_iter().map(Into::into).collect())
    }
}

/// Result of projecting one entry; the variant is fixed by the spec used.
#[derive(Debug, Clone)]
pub enum Projection {
    Entry(FileEntry),
    Value(Value),
    Map(IndexMap<String, Value>),
}

impl Projection {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Projection::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Projection::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_entry(&self) -> Option<&FileEntry> {
        match self {
            Projection::Entry(e) => Some(e),
            _ => None,
        }
    }

    pub fn into_entry(self) -> Option<FileEntry> {
        match self {
            Projection::Entry(e) => Some(e),
            _ => None,
        }
    }
}

fn resolve(entry: &FileEntry, name: &str) -> Result<Value> {
    let property = Property::lookup(name).ok_or_else(|| FsError::UnsupportedProperty {
        property: name.to_owned(),
        path: entry.as_path().to_path_buf(),
    })?;
    Ok(property.get(entry))
}

/// Project `entry` through `spec`.
pub fn extract(entry: FileEntry, spec: &PropertySpec) -> Result<Projection> {
    match spec {
        PropertySpec::Entry => Ok(Projection::Entry(entry)),
        PropertySpec::One(name) => resolve(&entry, name).map(Projection::Value),
        PropertySpec::Many(names) => {
            let mut out = IndexMap::with_capacity(names.len());
            for name in names {
                let value = resolve(&entry, name)?;
                // Re-inserting keeps the first position but takes the newest value.
                out.insert(name.clone(), value);
            }
            Ok(Projection::Map(out))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn sample() -> (tempfile::TempDir, FileEntry) {
        let td = tempdir().expect("tempdir");
        let file = td.path().join("notes.md");
        fs::write(&file, b"# notes").expect("write");
        let entry = FileEntry::new(&file, td.path()).expect("entry");
        (td, entry)
    }

    #[test]
    fn entry_spec_returns_the_handle() {
        let (_td, entry) = sample();
        let out = extract(entry.clone(), &PropertySpec::Entry).expect("extract");
        let back = out.into_entry().expect("entry projection");
        assert_eq!(back.pathname(), entry.pathname());
    }

    #[test]
    fn aliases_resolve() {
        let (_td, entry) = sample();
        let name = extract(entry.clone(), &"name".into()).expect("extract");
        assert_eq!(name.as_value(), Some(&Value::Str("notes.md".into())));
        let dirname = extract(entry.clone(), &"dirname".into()).expect("extract");
        assert_eq!(dirname.as_value(), Some(&Value::Str(entry.path())));
    }

    #[test]
    fn map_keeps_input_order_and_original_names() {
        let (_td, entry) = sample();
        let spec = PropertySpec::from(vec!["is_dir", "name", "basename", "size"]);
        let out = extract(entry, &spec).expect("extract");
        let map = out.as_map().expect("map projection");
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["is_dir", "name", "basename", "size"]);
        assert_eq!(map["is_dir"], Value::Bool(false));
        assert_eq!(map["name"], Value::Str("notes.md".into()));
        assert_eq!(map["size"], Value::Int(7));
    }

    #[test]
    fn duplicates_collapse_to_one_key() {
        let (_td, entry) = sample();
        let spec = PropertySpec::from(vec!["basename", "type", "basename"]);
        let out = extract(entry, &spec).expect("extract");
        let map = out.as_map().expect("map projection");
        assert_eq!(map.len(), 2);
        assert_eq!(map["type"], Value::Type(EntryType::File));
    }

    #[test]
    fn unknown_property_names_the_entry() {
        let (_td, entry) = sample();
        let path = entry.as_path().to_path_buf();
        let err = extract(entry, &"colour".into()).expect_err("should fail");
        match err {
            FsError::UnsupportedProperty { property, path: p } => {
                assert_eq!(property, "colour");
                assert_eq!(p, path);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn lookup_is_exact() {
        assert_eq!(Property::lookup("real_path"), Some(Property::RealPath));
        assert_eq!(Property::lookup("RealPath"), None);
        assert_eq!(Property::lookup("is_dir"), Some(Property::IsDir));
    }
}
