// src/main.rs - sift: list files and directories with selected properties, copy/delete/make trees
use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use sift::{FilterSpec, Outcome, Projection, PropertySpec, RecursionSpec};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "sift",
    about = "List files and directories with selected properties, or copy/delete whole trees",
    version = "1.0.0",
    author = "Farid",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List files below a directory
    Files(ListArgs),
    /// List directories below a directory
    Dirs(ListArgs),
    /// Copy the contents of one directory into another
    Copy {
        #[arg(value_name = "SRC")]
        source: String,
        #[arg(value_name = "DST")]
        destination: String,
    },
    /// Delete a directory and everything in it
    Delete {
        #[arg(value_name = "DIR")]
        directory: String,
        #[arg(long, help = "Keep the directory itself, only remove its contents")]
        preserve: bool,
    },
    /// Remove everything inside a directory
    Clean {
        #[arg(value_name = "DIR")]
        directory: String,
    },
    /// Create a directory
    Mkdir {
        #[arg(value_name = "PATH")]
        path: String,
        #[arg(long, value_name = "OCTAL", default_value = "755", help = "Permission bits")]
        mode: String,
        #[arg(short = 'p', long, help = "Create missing parent directories")]
        parents: bool,
        #[arg(long, help = "Report failure through the exit status only")]
        force: bool,
    },
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(value_name = "DIR")]
    directory: String,

    #[arg(short, long, conflicts_with = "depth", help = "Descend into subdirectories")]
    recursive: bool,

    #[arg(long, value_name = "EXPR", help = "Depth filter, e.g. 2 or '< 3'")]
    depth: Option<String>,

    #[arg(long, value_name = "PATTERN", help = "Glob or /regex/ on the file name")]
    name: Vec<String>,

    #[arg(long, value_name = "PATTERN", help = "Exclude names matching this glob or /regex/")]
    not_name: Vec<String>,

    #[arg(long, value_name = "PATTERN", help = "Substring or /regex/ on the relative path")]
    path: Vec<String>,

    #[arg(long, value_name = "EXPR", help = "Size filter, e.g. '> 10K'")]
    size: Vec<String>,

    #[arg(long, value_name = "PATTERN", help = "Substring or /regex/ in file contents")]
    contains: Vec<String>,

    #[arg(long = "filter", value_name = "KEY=VALUE", help = "Any filter by key")]
    filters: Vec<String>,

    #[arg(long = "prop", value_name = "NAME", help = "Property to print (repeatable)")]
    props: Vec<String>,

    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    #[arg(long, conflicts_with_all = ["last", "limit"], help = "Only the first match")]
    first: bool,

    #[arg(long, conflicts_with = "limit", help = "Only the last match")]
    last: bool,

    #[arg(long, help = "Visit entries in name order")]
    sort: bool,
}

impl ListArgs {
    fn recursion(&self) -> RecursionSpec {
        match &self.depth {
            Some(expr) => RecursionSpec::from(expr.as_str()),
            None => RecursionSpec::from(self.recursive),
        }
    }

    fn filter_spec(&self) -> Result<FilterSpec> {
        let mut spec = FilterSpec::new();
        for (key, values) in [
            ("name", &self.name),
            ("not_name", &self.not_name),
            ("path", &self.path),
            ("size", &self.size),
            ("contains", &self.contains),
        ] {
            if !values.is_empty() {
                spec = spec.with(key, values.iter().cloned());
            }
        }
        for raw in &self.filters {
            let (key, value) = raw
                .split_once('=')
                .ok_or_else(|| anyhow!("expected KEY=VALUE, got `{raw}`"))?;
            spec = spec.with(key.trim(), [value.trim()]);
        }
        Ok(spec)
    }

    fn property_spec(&self) -> PropertySpec {
        match self.props.as_slice() {
            [] => PropertySpec::default(),
            [one] => PropertySpec::One(one.clone()),
            many => PropertySpec::Many(many.to_vec()),
        }
    }
}

fn expand(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn print(projection: &Projection) {
    match projection {
        Projection::Entry(entry) => println!("{}", entry.pathname()),
        Projection::Value(value) => println!("{value}"),
        Projection::Map(map) => {
            let row: Vec<String> = map.iter().map(|(k, v)| format!("{k}={v}")).collect();
            println!("{}", row.join("\t"));
        }
    }
}

fn list(args: &ListArgs, directories: bool) -> Result<()> {
    let dir = expand(&args.directory);
    let recursion = args.recursion();
    let filters = args.filter_spec()?;
    let props = args.property_spec();

    let rows: Vec<Projection> = if args.first || args.last || args.sort {
        let mut finder = sift::Finder::new(&dir);
        if let Some(depth) = recursion.depth()? {
            finder = finder.depth(depth);
        }
        finder = finder.apply_filters(&filters)?;
        finder = if directories {
            finder.directories()
        } else {
            finder.files()
        };
        if args.sort {
            finder = finder.sort_by_name();
        }
        if args.first {
            finder.first(&props)?.into_iter().collect()
        } else if args.last {
            finder.last(&props)?.into_iter().collect()
        } else {
            finder.get(&props, args.limit)?
        }
    } else if directories {
        sift::list_directories(&dir, &recursion, &filters, &props, args.limit)?
    } else {
        sift::list_files(&dir, &recursion, &filters, &props, args.limit)?
    };
    rows.iter().for_each(print);
    Ok(())
}

fn report(what: &str, path: &Path, outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Succeeded => Ok(()),
        Outcome::Ignored(e) => {
            log::warn!("{what} {}: {e}", path.display());
            Ok(())
        }
        Outcome::Failed(e) => Err(e).with_context(|| format!("{what} {}", path.display())),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("SIFT_LOG", "warn")).init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Command::Files(args) => list(&args, false)?,
        Command::Dirs(args) => list(&args, true)?,
        Command::Copy { source, destination } => {
            let src = expand(&source);
            report("copy", &src, sift::copy_directory(&src, &expand(&destination)))?;
        }
        Command::Delete { directory, preserve } => {
            let dir = expand(&directory);
            report("delete", &dir, sift::delete_directory(&dir, preserve))?;
        }
        Command::Clean { directory } => {
            let dir = expand(&directory);
            report("clean", &dir, sift::clean_directory(&dir))?;
        }
        Command::Mkdir { path, mode, parents, force } => {
            let mode = u32::from_str_radix(&mode, 8)
                .with_context(|| format!("invalid mode `{mode}`"))?;
            let dir = expand(&path);
            let outcome = sift::make_directory(&dir, mode, parents, force)
                .with_context(|| format!("mkdir {}", dir.display()))?;
            if !outcome.succeeded() {
                bail!("mkdir {}: not created", dir.display());
            }
        }
    }
    Ok(())
}
