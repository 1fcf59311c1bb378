use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Result, UpmError};

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

/// Collects every file under `root` whose file name matches one of
/// `patterns`, skipping directories named in `ignore_dirs`.
///
/// Files that cannot be read as UTF-8 text are left out.
pub fn search_recursive(
    root: &Path,
    patterns: &[&str],
    ignore_dirs: &[String],
) -> Result<Vec<SourceFile>> {
    let patterns = patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|err| UpmError::Other(anyhow::Error::new(err)))
        })
        .collect::<Result<Vec<_>>>()?;

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !ignore_dirs
                    .iter()
                    .any(|dir| entry.file_name().to_str() == Some(dir.as_str()))
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!(%err, "skipping unreadable path");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !patterns.iter().any(|pattern| pattern.matches(name)) {
            continue;
        }
        match fs::read_to_string(entry.path()) {
            Ok(text) => files.push(SourceFile {
                path: entry.path().to_path_buf(),
                text,
            }),
            Err(err) => debug!(path = %entry.path().display(), %err, "skipping source file"),
        }
    }
    Ok(files)
}
