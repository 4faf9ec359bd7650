mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ecsroll", about = "Build web apps and roll them out to Amazon ECS")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build, push, register a new task definition, and update the service
    Deploy {
        /// Project directory to build in; temp files are written here too
        #[arg(long, default_value = ".")]
        workdir: PathBuf,
    },
    /// Check local tooling and AWS configuration
    Doctor,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let dotenv_loaded = dotenvy::dotenv().is_ok();
    tracing::debug!(dotenv = dotenv_loaded, "environment loaded");

    let cli = Cli::parse();

    match cli.command {
        Commands::Deploy { workdir } => commands::deploy(&workdir).await?,
        Commands::Doctor => commands::doctor().await?,
    }

    Ok(())
}
