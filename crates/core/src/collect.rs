use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub scanned_files: usize,
    pub skipped_hidden: usize,
}

/// Lists the files under `root` in a stable order. Directories are never returned.
pub fn collect_files(
    root: &Path,
    recursive: bool,
    include_hidden: bool,
) -> Result<(Vec<PathBuf>, CollectStats)> {
    if !root.is_dir() {
        anyhow::bail!("not a directory: {}", root.display());
    }

    let mut stats = CollectStats::default();
    let mut out = Vec::new();

    if recursive {
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0 || include_hidden || !is_hidden(entry.path())
            });
        for entry in walker {
            let entry =
                entry.with_context(|| format!("failed to walk directory: {}", root.display()))?;
            if entry.file_type().is_dir() {
                continue;
            }
            stats.scanned_files += 1;
            out.push(entry.into_path());
        }
        // filter_entry drops hidden names before they are counted
        if !include_hidden {
            stats.skipped_hidden = count_hidden(root)?;
            stats.scanned_files += stats.skipped_hidden;
        }
    } else {
        for entry in fs::read_dir(root)
            .with_context(|| format!("failed to read directory: {}", root.display()))?
        {
            let entry =
                entry.with_context(|| format!("failed to read entry in: {}", root.display()))?;
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            stats.scanned_files += 1;
            if is_hidden(&path) && !include_hidden {
                stats.skipped_hidden += 1;
                continue;
            }
            out.push(path);
        }
        out.sort();
    }

    Ok((out, stats))
}

fn count_hidden(root: &Path) -> Result<usize> {
    let mut hidden = 0usize;
    for entry in WalkDir::new(root).min_depth(1) {
        let entry =
            entry.with_context(|| format!("failed to walk directory: {}", root.display()))?;
        if !entry.file_type().is_dir() && has_hidden_component(root, entry.path()) {
            hidden += 1;
        }
    }
    Ok(hidden)
}

fn has_hidden_component(root: &Path, path: &Path) -> bool {
    path.strip_prefix(root)
        .map(|relative| relative.components().any(|c| is_hidden(Path::new(c.as_os_str()))))
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}
