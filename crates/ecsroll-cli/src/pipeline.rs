use std::path::Path;

use ecsroll_cloud::{CommandExecutor, ToolClient};
use ecsroll_core::task_definition;
use ecsroll_core::{DeployConfig, ImageRef, ImageTag};

/// Result of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    /// Image pushed to ECR and referenced by the new revision.
    pub image: ImageRef,
    /// Revision number assigned by `register-task-definition`.
    pub revision: u64,
    /// `<service>:<revision>` the service now points at.
    pub task_definition: String,
}

/// Run every step in order, stopping at the first failure.
///
/// `workdir` holds `task-def.json` and `new-task-def.json`; both are left in
/// place afterwards. Nothing already pushed or registered is rolled back.
///
/// `now` is read once, right before the image is tagged for push.
pub async fn run<E, C>(
    client: &ToolClient<E>,
    config: &DeployConfig,
    workdir: &Path,
    now: C,
) -> anyhow::Result<DeployOutcome>
where
    E: CommandExecutor,
    C: FnOnce() -> ecsroll_core::Result<ImageTag>,
{
    println!("Step 1: Building app...");
    client.build_app().await?;

    println!("Step 2: Building Docker image...");
    let local_image = config.local_image();
    client.build_image(&local_image).await?;

    println!("Step 3: Logging into Amazon ECR...");
    let registry_host = config.registry_host();
    client.registry_login(&config.region, &registry_host).await?;

    println!("Step 4: Tagging and pushing image to ECR...");
    let image = ImageRef::new(config, now()?);
    client.tag_image(&local_image, &image).await?;
    client.push_image(&image).await?;
    tracing::info!(image = %image, "image pushed");

    println!("Step 5: Fetching ECS task definition...");
    let raw = client
        .describe_task_definition(&config.service, &config.region)
        .await?;
    let raw_path = task_definition::write_raw(workdir, &raw)?;
    let register_path = task_definition::rewrite_file(&raw_path, workdir, &image.to_string())?;

    println!("Step 6: Registering new ECS task definition...");
    let response = client
        .register_task_definition(&register_path, &config.region)
        .await?;
    let revision = task_definition::parse_revision(&response)?;
    let task_definition = format!("{}:{revision}", config.service);
    tracing::info!(
        image = %image,
        revision,
        task_definition = %task_definition,
        "task definition registered",
    );

    println!("Step 7: Updating ECS service...");
    client
        .update_service(
            &config.cluster,
            &config.service,
            &task_definition,
            &config.region,
        )
        .await?;
    tracing::info!(
        cluster = %config.cluster,
        service = %config.service,
        task_definition = %task_definition,
        "service updated",
    );

    Ok(DeployOutcome {
        image,
        revision,
        task_definition,
    })
}

/// Final success lines printed once the service points at the new revision.
pub fn report(outcome: &DeployOutcome) -> String {
    format!("Deployment successful!\nImage: {}", outcome.image)
}
