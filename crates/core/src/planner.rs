use crate::error::{RenameError, RenameResult};
use crate::naming::{is_occupied, random_stem, RenameConfig, SplitName};
use rand::Rng;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameEntry {
    pub source_path: PathBuf,
    pub target_path: PathBuf,
}

/// Source to target mapping. Entries keep insertion order; both sources and
/// targets are unique.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenamePlan {
    entries: Vec<RenameEntry>,
    #[serde(skip)]
    sources: HashSet<PathBuf>,
    #[serde(skip)]
    targets: HashSet<PathBuf>,
}

impl RenamePlan {
    pub fn entries(&self) -> &[RenameEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_source(&self, path: &Path) -> bool {
        self.sources.contains(path)
    }

    pub fn contains_target(&self, path: &Path) -> bool {
        self.targets.contains(path)
    }

    pub fn target_for(&self, source: &Path) -> Option<&Path> {
        self.entries
            .iter()
            .find(|entry| entry.source_path == source)
            .map(|entry| entry.target_path.as_path())
    }

    pub(crate) fn insert(&mut self, source_path: PathBuf, target_path: PathBuf) {
        debug_assert!(!self.sources.contains(&source_path));
        debug_assert!(!self.targets.contains(&target_path));
        self.sources.insert(source_path.clone());
        self.targets.insert(target_path.clone());
        self.entries.push(RenameEntry {
            source_path,
            target_path,
        });
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub target_path: PathBuf,
    /// Sources that wanted `target_path`, in input order.
    pub claimants: Vec<PathBuf>,
}

/// Targets that could not be granted during planning, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ConflictSet {
    conflicts: Vec<Conflict>,
    index: HashMap<PathBuf, usize>,
}

impl ConflictSet {
    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter()
    }

    pub fn claimant_count(&self) -> usize {
        self.conflicts.iter().map(|c| c.claimants.len()).sum()
    }

    pub(crate) fn push(&mut self, target_path: PathBuf, source_path: PathBuf) {
        if let Some(&slot) = self.index.get(&target_path) {
            self.conflicts[slot].claimants.push(source_path);
            return;
        }
        self.index.insert(target_path.clone(), self.conflicts.len());
        self.conflicts.push(Conflict {
            target_path,
            claimants: vec![source_path],
        });
    }
}

impl IntoIterator for ConflictSet {
    type Item = Conflict;
    type IntoIter = std::vec::IntoIter<Conflict>;

    fn into_iter(self) -> Self::IntoIter {
        self.conflicts.into_iter()
    }
}

pub fn build_plan(
    sources: &[PathBuf],
    config: &RenameConfig,
) -> RenameResult<(RenamePlan, ConflictSet)> {
    build_plan_with_rng(sources, config, &mut rand::thread_rng())
}

pub fn build_plan_with_rng<R: Rng>(
    sources: &[PathBuf],
    config: &RenameConfig,
    rng: &mut R,
) -> RenameResult<(RenamePlan, ConflictSet)> {
    if sources.is_empty() {
        return Err(RenameError::invalid("no files selected for renaming"));
    }
    config.validate()?;

    let mut plan = RenamePlan::default();
    let mut conflicts = ConflictSet::default();
    let mut seen = HashSet::<&Path>::with_capacity(sources.len());

    for (index, source) in sources.iter().enumerate() {
        if !seen.insert(source.as_path()) {
            warn!("ignoring duplicate selection: {}", source.display());
            continue;
        }
        ensure_regular_file(source)?;

        let split = SplitName::of(source)?;
        let candidate = split.join(&candidate_name(&split, index, config, rng));
        debug!("{} -> {}", source.display(), candidate.display());

        if plan.contains_target(&candidate) || is_occupied(&candidate) {
            warn!(
                "{} is taken, deferring {} to conflict resolution",
                candidate.display(),
                source.display()
            );
            conflicts.push(candidate, source.clone());
        } else {
            plan.insert(source.clone(), candidate);
        }
    }

    Ok((plan, conflicts))
}

fn candidate_name<R: Rng>(
    split: &SplitName,
    index: usize,
    config: &RenameConfig,
    rng: &mut R,
) -> OsString {
    let mut stem = if config.use_random_names {
        OsString::from(random_stem(rng, config.random_name_length))
    } else if !config.base_name().is_empty() {
        OsString::from(config.base_name())
    } else {
        split.stem.clone()
    };

    if config.add_numbering {
        stem = config.with_number(&stem, index + 1);
    }

    config.with_extension(stem, &split.extension)
}

fn ensure_regular_file(path: &Path) -> RenameResult<()> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(RenameError::SourceMissing(path.to_path_buf()));
        }
        Err(err) => {
            return Err(RenameError::Unexpected(format!(
                "cannot inspect {}: {err}",
                path.display()
            )));
        }
    };
    if metadata.is_dir() {
        return Err(RenameError::Unexpected(format!(
            "only files can be renamed, got a directory: {}",
            path.display()
        )));
    }
    Ok(())
}
