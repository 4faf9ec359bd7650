use ecsroll_cloud::{RealExecutor, ToolClient};
use ecsroll_core::DeployConfig;

pub async fn doctor() -> anyhow::Result<()> {
    let config = match DeployConfig::from_env() {
        Ok(config) => Some(config),
        Err(e) => {
            println!("Configuration: {e}");
            None
        }
    };

    let executor = match &config {
        Some(c) => RealExecutor::new().envs(c.credentials.env_pairs()),
        None => RealExecutor::new(),
    };
    let client = ToolClient::with_executor(executor);
    let report = client.doctor(config.as_ref()).await;

    println!();
    println!("{report}");

    if !report.all_passed() {
        anyhow::bail!("some checks failed — see above for details");
    }

    Ok(())
}
