use std::fmt;
use std::path::Path;

use ecsroll_core::{DeployConfig, ImageRef};
use secrecy::{ExposeSecret, SecretString};

use crate::command::CommandError;
use crate::executor::{CommandExecutor, RealExecutor};

const NPM: &str = "npm";
const DOCKER: &str = "docker";
const AWS: &str = "aws";

/// npm / Docker / AWS CLI operations, parameterized over the executor for testability.
pub struct ToolClient<E: CommandExecutor = RealExecutor> {
    executor: E,
}

impl ToolClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor::new(),
        }
    }
}

impl Default for ToolClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor> ToolClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    // ── App build ──

    /// `npm install` followed by `npm run build`.
    pub async fn build_app(&self) -> Result<(), AppBuildError> {
        self.executor
            .exec_streaming(NPM, &args(["install"]))
            .await
            .map_err(|e| AppBuildError::Install { source: e })?;

        self.executor
            .exec_streaming(NPM, &args(["run", "build"]))
            .await
            .map_err(|e| AppBuildError::Build { source: e })
    }

    // ── Docker ──

    pub async fn build_image(&self, local_image: &str) -> Result<(), ImageError> {
        self.executor
            .exec_streaming(DOCKER, &args(["build", "-t", local_image, "."]))
            .await
            .map_err(|e| ImageError::Build { source: e })
    }

    pub async fn tag_image(&self, local_image: &str, image: &ImageRef) -> Result<(), ImageError> {
        let target = image.to_string();
        self.executor
            .exec_streaming(DOCKER, &args(["tag", local_image, &target]))
            .await
            .map_err(|e| ImageError::Tag { source: e })
    }

    pub async fn push_image(&self, image: &ImageRef) -> Result<(), ImageError> {
        let target = image.to_string();
        self.executor
            .exec_streaming(DOCKER, &args(["push", &target]))
            .await
            .map_err(|e| ImageError::Push { source: e })
    }

    // ── ECR ──

    /// Fetch a short-lived ECR password and pipe it into `docker login`.
    pub async fn registry_login(
        &self,
        region: &str,
        registry_host: &str,
    ) -> Result<(), RegistryError> {
        let password = self
            .executor
            .exec(AWS, &args(["ecr", "get-login-password", "--region", region]))
            .await
            .map(|out| SecretString::from(out.trim_end().to_owned()))
            .map_err(|e| RegistryError::Password { source: e })?;

        self.executor
            .exec_with_stdin(
                DOCKER,
                &args([
                    "login",
                    "--username",
                    "AWS",
                    "--password-stdin",
                    registry_host,
                ]),
                password.expose_secret().as_bytes(),
            )
            .await
            .map_err(|e| RegistryError::Login {
                host: registry_host.to_owned(),
                source: e,
            })?;

        Ok(())
    }

    // ── ECS ──

    /// Raw `describe-task-definition` JSON for `family`.
    pub async fn describe_task_definition(
        &self,
        family: &str,
        region: &str,
    ) -> Result<String, TaskDefinitionError> {
        self.executor
            .exec(
                AWS,
                &args([
                    "ecs",
                    "describe-task-definition",
                    "--task-definition",
                    family,
                    "--region",
                    region,
                ]),
            )
            .await
            .map_err(|e| TaskDefinitionError::Describe {
                family: family.to_owned(),
                source: e,
            })
    }

    /// Register the definition in `input_file`, returning the raw response JSON.
    pub async fn register_task_definition(
        &self,
        input_file: &Path,
        region: &str,
    ) -> Result<String, TaskDefinitionError> {
        let path = input_file
            .to_str()
            .ok_or_else(|| TaskDefinitionError::InvalidPath(input_file.to_path_buf()))?;
        let input = format!("file://{path}");

        self.executor
            .exec(
                AWS,
                &args([
                    "ecs",
                    "register-task-definition",
                    "--cli-input-json",
                    &input,
                    "--region",
                    region,
                ]),
            )
            .await
            .map_err(|e| TaskDefinitionError::Register { source: e })
    }

    pub async fn update_service(
        &self,
        cluster: &str,
        service: &str,
        task_definition: &str,
        region: &str,
    ) -> Result<(), ServiceError> {
        self.executor
            .exec_streaming(
                AWS,
                &args([
                    "ecs",
                    "update-service",
                    "--cluster",
                    cluster,
                    "--service",
                    service,
                    "--task-definition",
                    task_definition,
                    "--region",
                    region,
                ]),
            )
            .await
            .map_err(|e| ServiceError::Update {
                service: service.to_owned(),
                source: e,
            })
    }

    // ── Doctor ──

    /// Run all diagnostic checks without early return.
    pub async fn doctor(&self, config: Option<&DeployConfig>) -> DoctorReport {
        let mut report = DoctorReport::default();

        for (label, program) in [("npm", NPM), ("Docker", DOCKER), ("AWS CLI", AWS)] {
            let result = match self.executor.exec(program, &args(["--version"])).await {
                Ok(v) => CheckResult::ok(v.lines().next().unwrap_or_default().trim()),
                Err(e) => CheckResult::fail(&e.to_string()),
            };
            report.tools.push(ToolCheck {
                name: label.to_owned(),
                result,
            });
        }

        let Some(config) = config else {
            report.config = CheckResult::fail("configuration incomplete — see error above");
            return report;
        };
        report.config = CheckResult::ok(&format!(
            "{service} on {cluster} ({region})",
            service = config.service,
            cluster = config.cluster,
            region = config.region,
        ));

        match self
            .executor
            .exec(
                AWS,
                &args([
                    "sts",
                    "get-caller-identity",
                    "--query",
                    "Account",
                    "--output",
                    "text",
                    "--region",
                    &config.region,
                ]),
            )
            .await
        {
            Ok(account) if account.trim() == config.account_id => {
                report.account = CheckResult::ok(account.trim());
            }
            Ok(account) => {
                report.account = CheckResult::fail(&format!(
                    "credentials belong to {actual}, AWS_ACCOUNT_ID is {expected}",
                    actual = account.trim(),
                    expected = config.account_id,
                ));
            }
            Err(e) => report.account = CheckResult::fail(&e.to_string()),
        }

        report
    }
}

// ── Helper ──

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

// ── Doctor types ──

#[derive(Debug, Default)]
pub struct DoctorReport {
    pub tools: Vec<ToolCheck>,
    pub config: CheckResult,
    pub account: CheckResult,
}

impl DoctorReport {
    pub fn all_passed(&self) -> bool {
        self.config.passed && self.account.passed && self.tools.iter().all(|t| t.result.passed)
    }
}

impl fmt::Display for DoctorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tool in &self.tools {
            writeln!(f, "{}", line(&tool.name, &tool.result))?;
        }
        writeln!(f, "{}", line("Config", &self.config))?;
        write!(f, "{}", line("Account", &self.account))
    }
}

fn line(label: &str, result: &CheckResult) -> String {
    format!("[{}] {label:<12} {}", result.icon(), result.detail)
}

#[derive(Debug, Default, Clone)]
pub struct CheckResult {
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    pub fn ok(detail: &str) -> Self {
        Self {
            passed: true,
            detail: detail.to_owned(),
        }
    }

    pub fn fail(detail: &str) -> Self {
        Self {
            passed: false,
            detail: detail.to_owned(),
        }
    }

    pub fn icon(&self) -> &'static str {
        if self.passed { "OK" } else { "NG" }
    }
}

#[derive(Debug, Clone)]
pub struct ToolCheck {
    pub name: String,
    pub result: CheckResult,
}

// ── Error types ──

#[derive(Debug, thiserror::Error)]
pub enum AppBuildError {
    #[error("npm install failed")]
    Install { source: CommandError },

    #[error("npm run build failed")]
    Build { source: CommandError },
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("docker build failed")]
    Build { source: CommandError },

    #[error("docker tag failed")]
    Tag { source: CommandError },

    #[error("docker push failed")]
    Push { source: CommandError },
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to get ECR login password")]
    Password { source: CommandError },

    #[error("docker login to {host} failed")]
    Login { host: String, source: CommandError },
}

#[derive(Debug, thiserror::Error)]
pub enum TaskDefinitionError {
    #[error("failed to describe task definition '{family}'")]
    Describe { family: String, source: CommandError },

    #[error("task definition path is not valid UTF-8: {0}")]
    InvalidPath(std::path::PathBuf),

    #[error("task definition registration was rejected")]
    Register { source: CommandError },
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("failed to update ECS service '{service}'")]
    Update { service: String, source: CommandError },
}
