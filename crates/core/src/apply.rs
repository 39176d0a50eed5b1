use crate::error::{RenameError, RenameResult};
use crate::naming::{is_occupied, RenameConfig};
use crate::planner::{RenameEntry, RenamePlan};
use crate::resolver::plan_renames;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    pub applied: usize,
}

/// Renames every entry in plan order and stops at the first failure.
/// Renames already done stay done.
pub fn apply_plan(plan: &RenamePlan) -> RenameResult<ApplyResult> {
    let mut applied = 0usize;
    for entry in plan.entries() {
        if let Err(cause) = rename_entry(entry) {
            error!(
                "rename failed after {applied} of {}: {} -> {}: {cause}",
                plan.len(),
                entry.source_path.display(),
                entry.target_path.display()
            );
            return Err(RenameError::RenameFailed {
                from: entry.source_path.clone(),
                to: entry.target_path.clone(),
                cause,
            });
        }
        info!(
            "renamed {} -> {}",
            entry.source_path.display(),
            entry.target_path.display()
        );
        applied += 1;
    }

    Ok(ApplyResult { applied })
}

/// Plans, resolves and applies in one call.
pub fn rename_files(sources: &[PathBuf], config: &RenameConfig) -> RenameResult<ApplyResult> {
    let plan = plan_renames(sources, config)?;
    apply_plan(&plan)
}

fn rename_entry(entry: &RenameEntry) -> io::Result<()> {
    // fs::rename replaces an existing target on unix.
    if is_occupied(&entry.target_path) {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "target appeared after planning",
        ));
    }
    fs::rename(&entry.source_path, &entry.target_path)
}
