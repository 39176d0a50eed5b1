use crate::error::RenameResult;
use crate::naming::{is_occupied, random_stem, RenameConfig, SplitName};
use crate::planner::{ConflictSet, RenamePlan};
use rand::Rng;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn resolve_conflicts(
    plan: RenamePlan,
    conflicts: ConflictSet,
    config: &RenameConfig,
) -> RenameResult<RenamePlan> {
    resolve_conflicts_with_rng(plan, conflicts, config, &mut rand::thread_rng())
}

/// Gives every claimant of a contested target its own free path and merges it
/// into `plan`. Groups are visited in first-seen order and claimants in input
/// order, so non-random configs always resolve the same way.
///
/// Numbered names are rebuilt from the contested stem, which may already hold a
/// number: `img-01` resolves to `img-01-02`.
pub fn resolve_conflicts_with_rng<R: Rng>(
    mut plan: RenamePlan,
    conflicts: ConflictSet,
    config: &RenameConfig,
    rng: &mut R,
) -> RenameResult<RenamePlan> {
    for conflict in conflicts {
        let contested = SplitName::of(&conflict.target_path)?;

        for (position, source) in conflict.claimants.into_iter().enumerate() {
            let stem = if config.use_random_names {
                OsString::from(random_stem(rng, config.random_name_length))
            } else if config.add_numbering {
                config.with_number(&contested.stem, plan.len() + position + 1)
            } else {
                let mut stem = contested.stem.clone();
                stem.push(format!("_{}", position + 1));
                stem
            };

            // Retries grow the full name, extension included: `same_1.txt_.txt`.
            let mut name = config.with_extension(stem, &contested.extension);
            let mut candidate = contested.join(&name);
            while is_taken(&plan, &candidate) {
                debug!("{} still taken, retrying", candidate.display());
                if config.use_random_names {
                    name = OsString::from(random_stem(rng, config.random_name_length));
                } else {
                    name.push("_");
                }
                name = config.with_extension(name, &contested.extension);
                candidate = contested.join(&name);
            }

            debug!("resolved {} -> {}", source.display(), candidate.display());
            plan.insert(source, candidate);
        }
    }

    Ok(plan)
}

fn is_taken(plan: &RenamePlan, candidate: &Path) -> bool {
    plan.contains_target(candidate) || is_occupied(candidate)
}

/// Builds and resolves in one step.
pub fn plan_renames(sources: &[PathBuf], config: &RenameConfig) -> RenameResult<RenamePlan> {
    let (plan, conflicts) = crate::planner::build_plan(sources, config)?;
    if conflicts.is_empty() {
        return Ok(plan);
    }
    resolve_conflicts(plan, conflicts, config)
}
