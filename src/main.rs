use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use log::{error, info, warn};

use common_items::{
    build_report, load_items_data, load_or_default, save_items_data, validate_items_data,
    CommonItemsData, ItemKit, ItemRegistry, ItemsScanner, ItemsScannerConfig, ScanDatabase,
    StoreOptions,
    scanner::save_report,
};

/// Manage and check item kit configuration files
#[derive(Parser, Debug)]
#[command(name = "common-items", version, about)]
struct Cli {
    /// More log output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Don't copy files aside before overwriting them
    #[arg(long, global = true)]
    no_backup: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write an empty items data file
    Init {
        file: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Append a kit to item_kits
    AddKit {
        file: PathBuf,

        /// Item class names in the kit
        #[arg(required = true)]
        items: Vec<String>,
    },

    /// Append a kit set to random_item_kit_groups
    AddGroup {
        file: PathBuf,

        /// One kit as comma-separated item names, e.g. "Flare,Matches"
        #[arg(long = "kit", required = true)]
        kits: Vec<String>,
    },

    /// Print the kits in a file
    Show {
        file: PathBuf,
    },

    /// Lint a file and optionally check it against known item names
    Validate {
        file: PathBuf,

        /// Text file with one known item class name per line
        #[arg(long)]
        registry: Option<PathBuf>,
    },

    /// Scan a directory of items data files
    Scan {
        dir: PathBuf,

        /// Loader threads (defaults to the number of CPUs)
        #[arg(long)]
        threads: Option<usize>,

        /// Only scan the top-level directory
        #[arg(long)]
        no_recursive: bool,

        /// Scan cache for skipping unchanged files
        #[arg(long)]
        database: Option<PathBuf>,

        /// Reload files even if unchanged
        #[arg(long)]
        force: bool,

        /// Don't lint loaded files
        #[arg(long)]
        skip_validation: bool,

        /// Write a JSON report here
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn parse_kit(spec: &str) -> ItemKit {
    spec.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn save(data: &CommonItemsData, path: &Path, options: &StoreOptions) -> Result<()> {
    if let Some(backup) = save_items_data(data, path, options)? {
        info!("Previous version kept at {}", backup.display());
    }
    Ok(())
}

fn show(data: &CommonItemsData) {
    println!("item_kits: {}", data.item_kits.len());
    for (idx, kit) in data.item_kits.iter().enumerate() {
        println!("  [{}] {}", idx, kit.join(", "));
    }

    println!("random_item_kit_groups: {}", data.random_item_kit_groups.len());
    for (group_idx, group) in data.random_item_kit_groups.iter().enumerate() {
        println!("  [{}] {} kits", group_idx, group.len());
        for (kit_idx, kit) in group.iter().enumerate() {
            println!("    [{}] {}", kit_idx, kit.join(", "));
        }
    }
}

fn validate(file: &Path, registry: Option<&Path>) -> Result<bool> {
    let data = load_items_data(file)?;
    let report = validate_items_data(&data);

    for issue in &report.issues {
        println!("{}", issue);
    }

    let mut ok = report.error_count() == 0;

    if let Some(registry_path) = registry {
        let mut registry = ItemRegistry::new();
        registry.load_from_file(registry_path)?;

        let missing = registry.check_items(&data)?;
        for item in &missing {
            print!(
                "error: Unknown item {:?} ({} references, first at {})",
                item.item_name,
                item.reference_count,
                item.reference_locations.first().map(String::as_str).unwrap_or("?")
            );
            if item.suggested_alternatives.is_empty() {
                println!();
            } else {
                println!(", did you mean: {}", item.suggested_alternatives.join(", "));
            }
        }
        ok &= missing.is_empty();
    }

    println!(
        "{}: {} errors, {} warnings",
        file.display(),
        report.error_count(),
        report.warning_count()
    );

    Ok(ok)
}

/// Run one command; `Ok(false)` means it completed but found problems
async fn run(cli: Cli) -> Result<bool> {
    let store_options = StoreOptions {
        create_backup: !cli.no_backup,
        ..Default::default()
    };

    match cli.command {
        Commands::Init { file, force } => {
            if file.exists() && !force {
                bail!("{} already exists, use --force to overwrite", file.display());
            }
            save(&CommonItemsData::new(), &file, &store_options)?;
            info!("Created {}", file.display());
        }

        Commands::AddKit { file, items } => {
            let mut data = load_or_default(&file)?;
            let kit: ItemKit = items.iter().map(|item| item.trim().to_string()).collect();
            data.item_kits.push(kit);
            save(&data, &file, &store_options)?;
            info!("{} now has {} kits", file.display(), data.item_kits.len());
        }

        Commands::AddGroup { file, kits } => {
            let mut data = load_or_default(&file)?;
            let group: Vec<ItemKit> = kits.iter().map(|spec| parse_kit(spec)).collect();
            if group.iter().any(Vec::is_empty) {
                warn!("Adding a group that contains an empty kit");
            }
            data.random_item_kit_groups.push(group);
            save(&data, &file, &store_options)?;
            info!("{} now has {} kit groups", file.display(), data.random_item_kit_groups.len());
        }

        Commands::Show { file } => {
            let data = load_items_data(&file)?;
            show(&data);
        }

        Commands::Validate { file, registry } => {
            return validate(&file, registry.as_deref());
        }

        Commands::Scan { dir, threads, no_recursive, database, force, skip_validation, output } => {
            let mut config = ItemsScannerConfig {
                recursive: !no_recursive,
                force_rescan: force,
                skip_validation,
                show_progress: !cli.quiet,
                ..Default::default()
            };
            if let Some(threads) = threads {
                config.max_threads = threads;
            }

            let mut db = match &database {
                Some(path) => Some(ScanDatabase::load_or_create(path)?),
                None => None,
            };

            let scanner = ItemsScanner::with_config(&dir, config);
            let outcome = scanner.scan(db.as_mut()).await?;

            for result in &outcome.results {
                if let Some(err) = &result.error {
                    error!("{}: {}", result.path.display(), err);
                }
                if let Some(validation) = &result.validation {
                    for issue in &validation.issues {
                        warn!("{}: {}", result.path.display(), issue);
                    }
                }
            }

            if let (Some(db), Some(path)) = (&db, &database) {
                db.save(path)?;
            }

            let report = build_report(&outcome);
            info!(
                "{} files, {} loaded, {} failed, {} unchanged, {} distinct items",
                report.stats.total,
                report.stats.processed,
                report.stats.failed,
                report.stats.unchanged,
                report.unique_items.len()
            );

            if let Some(output) = output {
                save_report(&report, &output)?;
            }

            return Ok(report.stats.failed == 0);
        }
    }

    Ok(true)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if run(cli).await? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_kit() {
        assert_eq!(parse_kit("Flare, Matches,,"), vec!["Flare".to_string(), "Matches".to_string()]);
        assert!(parse_kit(" , ").is_empty());
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("common-items").chain(args.iter().copied()))
    }

    fn path_arg(path: &Path) -> String {
        path.to_string_lossy().to_string()
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let file = temp_dir.path().join("kits.json");
        let file_arg = path_arg(&file);

        assert!(run(cli(&["init", &file_arg])).await?);
        assert_eq!(load_items_data(&file)?, CommonItemsData::new());

        assert!(run(cli(&["add-kit", &file_arg, "Apple", "Knife"])).await?);
        assert!(run(cli(&["init", &file_arg])).await.is_err());
        assert_eq!(load_items_data(&file)?.item_kits.len(), 1);

        assert!(run(cli(&["--no-backup", "init", &file_arg, "--force"])).await?);
        assert!(load_items_data(&file)?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_validate_outcome() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let file = temp_dir.path().join("kits.json");
        let registry = temp_dir.path().join("items.txt");
        std::fs::write(&registry, "Apple\nKnife\nRope\n")?;
        let file_arg = path_arg(&file);
        let registry_arg = path_arg(&registry);

        assert!(run(cli(&["add-kit", &file_arg, "Apple", "Knife"])).await?);
        assert!(run(cli(&["validate", &file_arg])).await?);
        assert!(run(cli(&["validate", &file_arg, "--registry", &registry_arg])).await?);

        // Known to the linter, unknown to the registry
        assert!(run(cli(&["add-group", &file_arg, "--kit", "Rope", "--kit", "Flare"])).await?);
        assert!(run(cli(&["validate", &file_arg])).await?);
        assert!(!run(cli(&["validate", &file_arg, "--registry", &registry_arg])).await?);

        // Malformed class name is an error-severity issue
        assert!(run(cli(&["add-kit", &file_arg, "Bad-Name"])).await?);
        assert!(!run(cli(&["validate", &file_arg])).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_scan_writes_report() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let kits_dir = temp_dir.path().join("kits");
        let report = temp_dir.path().join("report.json");
        let file_arg = path_arg(&kits_dir.join("a.json"));

        assert!(run(cli(&["add-kit", &file_arg, "Apple"])).await?);
        assert!(run(cli(&["-q", "scan", &path_arg(&kits_dir), "--output", &path_arg(&report)])).await?);

        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&report)?)?;
        assert_eq!(written["stats"]["processed"], 1);
        assert_eq!(written["unique_items"]["Apple"], 1);
        Ok(())
    }

    #[test]
    fn test_parse_add_group() {
        let cli = Cli::parse_from([
            "common-items", "add-group", "kits.json", "--kit", "Rope", "--kit", "Flare,Matches",
        ]);
        match cli.command {
            Commands::AddGroup { file, kits } => {
                assert_eq!(file, PathBuf::from("kits.json"));
                assert_eq!(kits, vec!["Rope".to_string(), "Flare,Matches".to_string()]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
