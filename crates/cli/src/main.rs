use anyhow::{Context, Result};
use bulk_renamer_core::{
    app_paths, apply_plan, collect_files, load_config, plan_renames, save_config, AppConfig,
    RenameConfig, RenamePlan,
};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "bulk-renamer-cli")]
#[command(about = "Rename many files at once with a pattern, numbering or random names")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Rename(RenameArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    Show,
    /// Write the default settings to the config file.
    Init {
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[derive(Debug, Args)]
struct RenameArgs {
    /// Files to rename, in numbering order.
    files: Vec<PathBuf>,
    /// Rename every file in this directory (appended after FILES).
    #[arg(long)]
    dir: Option<PathBuf>,
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    recursive: Option<bool>,
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    include_hidden: Option<bool>,
    /// New base name; empty keeps each file's own name.
    #[arg(long)]
    pattern: Option<String>,
    #[arg(long, conflicts_with = "drop_extension")]
    keep_extension: bool,
    #[arg(long)]
    drop_extension: bool,
    #[arg(long)]
    numbering: bool,
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
    padding: Option<u8>,
    #[arg(long, conflicts_with = "number_at_start")]
    number_at_end: bool,
    #[arg(long)]
    number_at_start: bool,
    #[arg(long)]
    random: bool,
    #[arg(long, value_parser = clap::value_parser!(u8).range(5..=30))]
    random_length: Option<u8>,
    #[arg(long, default_value_t = false)]
    apply: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

impl RenameArgs {
    fn rename_config(&self, defaults: &RenameConfig) -> RenameConfig {
        let mut config = defaults.clone();
        if let Some(pattern) = &self.pattern {
            config.pattern = pattern.trim().to_string();
        }
        if self.keep_extension {
            config.keep_extension = true;
        }
        if self.drop_extension {
            config.keep_extension = false;
        }
        if self.numbering {
            config.add_numbering = true;
        }
        if let Some(padding) = self.padding {
            config.padding_digits = usize::from(padding);
        }
        if self.number_at_start {
            config.number_at_start = true;
        }
        if self.number_at_end {
            config.number_at_start = false;
        }
        if self.random {
            config.use_random_names = true;
        }
        if let Some(length) = self.random_length {
            config.random_name_length = usize::from(length);
        }
        config
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Rename(args) => cmd_rename(args),
        Commands::Config(config) => match config.action {
            ConfigAction::Show => cmd_config_show(),
            ConfigAction::Init { force } => cmd_config_init(force),
        },
    }
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_rename(args: RenameArgs) -> Result<()> {
    let app_config = load_config()?;
    let config = args.rename_config(&app_config.rename);
    let sources = selected_files(&args, &app_config)?;

    let plan = plan_renames(&sources, &config)?;

    match args.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        OutputFormat::Table => {
            print_table(&plan);
        }
    }

    if args.apply {
        let result = apply_plan(&plan)?;
        eprintln!("renamed {} file(s)", result.applied);
    } else {
        eprintln!("dry run: no files were changed. Pass --apply to rename.");
    }

    Ok(())
}

fn selected_files(args: &RenameArgs, app_config: &AppConfig) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::with_capacity(args.files.len());
    for file in &args.files {
        if file.is_dir() {
            anyhow::bail!(
                "{} is a directory; use --dir to rename its contents",
                file.display()
            );
        }
        sources.push(absolute(file)?);
    }

    if let Some(dir) = &args.dir {
        let recursive = args.recursive.unwrap_or(app_config.recursive_default);
        let include_hidden = args
            .include_hidden
            .unwrap_or(app_config.include_hidden_default);
        let (files, stats) = collect_files(&absolute(dir)?, recursive, include_hidden)?;
        info!(
            "collected {} file(s) from {} (scanned={} hidden_skip={})",
            files.len(),
            dir.display(),
            stats.scanned_files,
            stats.skipped_hidden
        );
        sources.extend(files);
    }

    Ok(sources)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .with_context(|| format!("failed to resolve path: {}", path.display()))
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let paths = app_paths()?;
    println!("config file: {}", paths.config_path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn cmd_config_init(force: bool) -> Result<()> {
    let paths = app_paths()?;
    if paths.config_path.exists() && !force {
        anyhow::bail!(
            "config file already exists: {} (pass --force to overwrite)",
            paths.config_path.display()
        );
    }
    save_config(&AppConfig::default())?;
    println!("wrote {}", paths.config_path.display());
    Ok(())
}

fn print_table(plan: &RenamePlan) {
    println!("source -> target");
    for entry in plan.entries() {
        println!(
            "{} -> {}",
            entry.source_path.display(),
            entry.target_path.display()
        );
    }
    println!("\ntotal: {}", plan.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rename_args(argv: &[&str]) -> RenameArgs {
        let cli = Cli::try_parse_from(argv).expect("parse args");
        match cli.command {
            Commands::Rename(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn flags_override_saved_defaults() {
        let args = rename_args(&[
            "bulk-renamer-cli",
            "rename",
            "a.txt",
            "--pattern",
            " trip ",
            "--numbering",
            "--padding",
            "4",
            "--number-at-end",
            "--drop-extension",
        ]);
        let config = args.rename_config(&RenameConfig::default());
        assert_eq!(config.pattern, "trip");
        assert!(config.add_numbering);
        assert_eq!(config.padding_digits, 4);
        assert!(!config.number_at_start);
        assert!(!config.keep_extension);
        assert!(!config.use_random_names);
    }

    #[test]
    fn unset_flags_keep_saved_defaults() {
        let saved = RenameConfig {
            pattern: "saved".to_string(),
            number_at_start: false,
            random_name_length: 20,
            ..RenameConfig::default()
        };
        let args = rename_args(&["bulk-renamer-cli", "rename", "--random"]);
        let config = args.rename_config(&saved);
        assert_eq!(config.pattern, "saved");
        assert!(!config.number_at_start);
        assert!(config.use_random_names);
        assert_eq!(config.random_name_length, 20);
    }

    #[test]
    fn out_of_range_padding_is_rejected_by_parser() {
        let parsed = Cli::try_parse_from(["bulk-renamer-cli", "rename", "--padding", "11"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn bare_recursive_flag_means_true() {
        let args = rename_args(&["bulk-renamer-cli", "rename", "--dir", ".", "--recursive"]);
        assert_eq!(args.recursive, Some(true));
        assert_eq!(args.include_hidden, None);
    }
}
