mod run;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use opsy_config::{
    apply_env_overrides, config_dir, config_file_path, load_config, validate, write_config,
    DashboardConfig,
};

#[derive(Parser)]
#[command(name = "opsy")]
#[command(about = "Opsy dashboard runtime: periodic refresh scheduler and alert banners")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduler until interrupted
    Run(run::RunArgs),
    /// Validate a config file and print the report
    CheckConfig {
        /// Config file (defaults to ~/.opsy/dashboard.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Write a config file with default values
    InitConfig {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub(crate) fn resolve_config_path(config: Option<PathBuf>) -> PathBuf {
    config.unwrap_or_else(|| config_file_path(&config_dir()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run::run(args).await?,
        Commands::CheckConfig { config } => {
            let path = resolve_config_path(config);
            let mut config = load_config(&path).await?;
            apply_env_overrides(&mut config);
            let report = validate(&config);

            for warning in &report.warnings {
                println!("warning: {warning}");
            }
            for error in &report.errors {
                println!("error: {error}");
            }
            if !report.is_valid() {
                anyhow::bail!("{} has {} error(s)", path.display(), report.errors.len());
            }
            println!("{} is valid", path.display());
        }
        Commands::InitConfig { config, force } => {
            let path = resolve_config_path(config);
            if path.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
            }
            write_config(&DashboardConfig::default(), &path).await?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}
