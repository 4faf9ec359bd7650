use std::path::Path;

use anyhow::Context;
use ecsroll_cli::pipeline;
use ecsroll_cloud::{RealExecutor, ToolClient};
use ecsroll_core::{DeployConfig, ImageTag};

/// Execute the full deploy pipeline.
pub async fn deploy(workdir: &Path) -> anyhow::Result<()> {
    // Credentials are checked before any command runs.
    let config = DeployConfig::from_env()?;

    let workdir = std::fs::canonicalize(workdir)
        .with_context(|| format!("failed to resolve working directory {}", workdir.display()))?;

    let executor = RealExecutor::new()
        .current_dir(&workdir)
        .envs(config.credentials.env_pairs());
    let client = ToolClient::with_executor(executor);

    let outcome = pipeline::run(&client, &config, &workdir, ImageTag::now)
        .await
        .context("deployment failed")?;

    println!();
    println!("{}", pipeline::report(&outcome));

    Ok(())
}
