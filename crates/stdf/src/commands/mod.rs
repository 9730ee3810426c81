use itertools::Itertools;
use miette::{miette, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub mod dump;
pub mod time;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Parse STDF files and summarize their records
    Dump(dump::DumpArgs),
    /// Measure how long reading and parsing STDF files takes
    Time(time::TimeArgs),
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Dump(dump) => dump.handle(),
            Commands::Time(time) => time.handle(),
        }
    }
}

/// Expand a file or directory into the STDF files it holds
pub(crate) fn stdf_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let files = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| !e.file_type().is_dir())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("stdf") || ext.eq_ignore_ascii_case("std"))
        })
        .sorted()
        .collect::<Vec<_>>();

    if files.is_empty() {
        return Err(miette!("no STDF files found in {}", path.display()));
    }
    Ok(files)
}
