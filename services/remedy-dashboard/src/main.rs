//! Remedy dashboard CLI
//!
//! Serves the operations dashboard, or runs one-off API commands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use remedy_dashboard::engine::kinds_label;
use remedy_dashboard::{api_client, load_config, Config, DashboardError};
use tracing::Level;

#[derive(Parser)]
#[command(name = "remedy-dashboard")]
#[command(about = "Operations dashboard for Remedy scans, findings, and pull requests")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Remedy API base URL (overrides config file and environment)
    #[arg(long)]
    api_base_url: Option<String>,

    /// Dashboard port (overrides config file)
    #[arg(long)]
    port: Option<u16>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the dashboard until Ctrl-C (default)
    Serve,
    /// List registered repositories
    Repos,
    /// Register a repository and queue its first scan
    Register {
        /// Repository URL, e.g. https://github.com/acme/widgets
        url: String,
    },
    /// Queue a scan for a registered repository
    Scan {
        /// Repository identifier
        repo_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, api_base_url={:?}, port={:?}, log_level={:?}, command={:?}",
        args.config,
        args.api_base_url,
        args.port,
        args.log_level,
        args.command
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    config.apply_env_overrides();

    if let Some(base_url) = args.api_base_url {
        config.api.base_url = base_url;
    }
    if let Some(port) = args.port {
        config.dashboard.port = port;
    }

    config.validate()?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            tracing::info!("Starting Remedy dashboard against {}", config.api.base_url);
            remedy_dashboard::run(config).await?;
        }
        Command::Repos => {
            let repos = api_client(&config)?.fetch_repos().await?;
            if repos.is_empty() {
                println!("No repositories registered.");
            }
            for repo in repos {
                println!("{}\t{}\t{}", repo.id, repo.name, repo.url);
            }
        }
        Command::Register { url } => {
            let url = url.trim();
            if url.is_empty() {
                return Err(DashboardError::Validation(
                    "Please provide a repository URL.".to_string(),
                )
                .into());
            }
            let api = api_client(&config)?;
            let repo = api.register_repo(url).await?;
            println!("Registered {} ({}).", repo.name, repo.id);
            let queued = api.trigger_scan(&repo.id, &config.api.scan_kinds).await?;
            println!(
                "{} scan queued for {} ({} job(s)).",
                kinds_label(&config.api.scan_kinds),
                repo.name,
                queued.queued_jobs.len()
            );
        }
        Command::Scan { repo_id } => {
            let queued = api_client(&config)?
                .trigger_scan(&repo_id, &config.api.scan_kinds)
                .await?;
            println!(
                "Scan queued for {} ({} job(s)).",
                queued.repo_id,
                queued.queued_jobs.len()
            );
        }
    }

    Ok(())
}
