mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use cumulus_config::Config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cumulus")]
#[command(version)]
#[command(about = "Provision a cloud instance with cloud-init templating and DNS registration")]
struct Cli {
    /// Alternate config file
    #[arg(short, long, global = true, default_value = "./config.yaml", value_name = "FILE")]
    config: PathBuf,

    /// Enable debug messages
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a compute instance and optionally register DNS records for it
    Create(commands::create::CreateArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = run(cli).await {
        eprintln!("{} {error:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Create(args) => commands::create::handle(config, &args, cli.verbose).await,
    }
}
