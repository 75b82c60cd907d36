use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info, warn};
use media_intake_core::{
    logging, Config, Error, HttpCatalogClient, LogLevel, MediaIntake, MediaKind,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "media-intake")]
#[command(about = "Validate, accept and canonically rename product media")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file (environment is used when absent)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Photo,
    Video,
}

impl From<Kind> for MediaKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Photo => MediaKind::Photo,
            Kind::Video => MediaKind::Video,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Copy the freshest shot per product and angle into the renamed folder
    Rename {
        #[arg(long, value_enum, default_value = "photo")]
        kind: Kind,
    },

    /// Move new files from the photo team folder into the sources
    Accept {
        #[arg(long, value_enum, default_value = "photo")]
        kind: Kind,
    },

    /// Check that every source file is well named and known to the catalog
    Check {
        #[arg(long, value_enum, default_value = "photo")]
        kind: Kind,
    },

    /// List articles filed under more than one barcode
    Duplicates {
        #[arg(long, value_enum, default_value = "photo")]
        kind: Kind,

        /// Where to write the JSON report (report directory when absent)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate default configuration file
    GenerateConfig {
        /// Path to save configuration file
        #[arg(default_value = "media-intake.json")]
        path: PathBuf,
    },
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    if let Commands::GenerateConfig { path } = &cli.command {
        env_logger::init();
        Config::default().save_to_file(path)?;
        println!("Configuration file generated at: {}", path.display());
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    // Set log level based on verbosity
    config.log_level = match cli.verbose {
        0 => config.log_level,
        1 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };
    init_logging(&config)?;

    let intake = MediaIntake::from_config(config)?;
    let result = run(&intake, cli.command);

    if let Err(Error::ValidationFailed(report)) = &result {
        let dir = &intake.config().report_dir;
        write_report(dir, "wrong_file_names.txt", &report.malformed_text())?;
        write_report(dir, "wrong_barcodes.txt", &report.unresolved_text())?;
        write_report(dir, "wrong_identities.txt", &report.unsafe_identities_text())?;
        error!("Validation failed, reports written to {}", dir.display());
    }

    result.map_err(anyhow::Error::from)
}

fn run(intake: &MediaIntake<HttpCatalogClient>, command: Commands) -> media_intake_core::Result<()> {
    match command {
        Commands::Rename { kind } => {
            info!("Renaming started...");
            let report = intake.rename(kind.into())?;
            for name in &report.without_identity {
                warn!("No identity in catalog, skipped: {}", name);
            }
            println!("{}", report.sync);
        }

        Commands::Accept { kind } => {
            info!("Accepting started...");
            let report = intake.accept(kind.into())?;
            for set in &report.collisions.collisions {
                let origin = if set.introduced_by_pending { "new" } else { "pre-existing" };
                println!("Article {} ({}) under barcodes {:?}:", set.article, origin, set.barcodes);
                for file in &set.files {
                    println!("  {} [{:?}]", file.file_name, file.origin);
                }
            }
            if !report.collisions.is_empty() {
                let path = intake.config().report_dir.join("accept_collisions.json");
                report.collisions.save_to_file(&path)?;
                println!("Collision report written to {}", path.display());
            }
            println!("Accepting completed: {} files moved.", report.moved.len());
        }

        Commands::Check { kind } => {
            info!("Checking started...");
            let report = intake.check(kind.into())?;
            println!("Checking completed: {} files are valid.", report.checked);
        }

        Commands::Duplicates { kind, output } => {
            let report = intake.duplicates(kind.into())?;
            let path = output
                .unwrap_or_else(|| intake.config().report_dir.join("duplicate_articles.json"));
            report.save_article_map(&path)?;
            println!(
                "{} duplicate articles written to {}",
                report.collisions.len(),
                path.display()
            );
        }

        Commands::GenerateConfig { .. } => unreachable!("handled before configuration is loaded"),
    }

    Ok(())
}

fn init_logging(config: &Config) -> media_intake_core::Result<()> {
    match &config.log_dir {
        Some(dir) => logging::init_logger(dir, config.log_level.to_level_filter()),
        None => {
            env_logger::Builder::new()
                .filter_level(config.log_level.to_level_filter())
                .parse_env(logging::LOG_ENV)
                .init();
            Ok(())
        }
    }
}

/// Write one newline-separated list, skipping empty ones
fn write_report(dir: &Path, name: &str, contents: &str) -> std::io::Result<()> {
    if contents.is_empty() {
        return Ok(());
    }
    fs::create_dir_all(dir)?;
    fs::write(dir.join(name), contents)
}
