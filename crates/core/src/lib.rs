mod apply;
mod collect;
mod config;
mod error;
mod naming;
mod planner;
mod resolver;

pub use apply::{apply_plan, rename_files, ApplyResult};
pub use collect::{collect_files, CollectStats};
pub use config::{
    app_paths, load_config, load_config_from, save_config, save_config_to, AppConfig, AppPaths,
};
pub use error::{RenameError, RenameResult};
pub use naming::{random_stem, RenameConfig, PADDING_DIGITS_RANGE, RANDOM_NAME_LENGTH_RANGE};
pub use planner::{
    build_plan, build_plan_with_rng, Conflict, ConflictSet, RenameEntry, RenamePlan,
};
pub use resolver::{plan_renames, resolve_conflicts, resolve_conflicts_with_rng};
