use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

pub const ACCESS_KEY_ID_VAR: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";
pub const ACCOUNT_ID_VAR: &str = "AWS_ACCOUNT_ID";
pub const REGION_VAR: &str = "AWS_REGION";
pub const REPOSITORY_VAR: &str = "ECR_REPOSITORY";
pub const CLUSTER_VAR: &str = "ECS_CLUSTER";
pub const SERVICE_VAR: &str = "ECS_SERVICE";

/// AWS access key pair handed to every spawned `aws` / `docker` command.
#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: SecretString,
}

impl Credentials {
    /// Environment variables to set on child processes.
    pub fn env_pairs(&self) -> Vec<(String, String)> {
        vec![
            (ACCESS_KEY_ID_VAR.to_owned(), self.access_key_id.clone()),
            (
                SECRET_ACCESS_KEY_VAR.to_owned(),
                self.secret_access_key.expose_secret().to_owned(),
            ),
        ]
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .finish()
    }
}

/// Deployment configuration, resolved once and passed to the pipeline.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub credentials: Credentials,
    /// AWS account that owns the ECR registry
    pub account_id: String,
    /// AWS region (defaults to us-east-1)
    pub region: String,
    /// ECR repository name (defaults to my-react-app)
    pub repository: String,
    /// ECS cluster name (defaults to my-cluster)
    pub cluster: String,
    /// ECS service name, also the task definition family (defaults to my-service)
    pub service: String,
}

impl DeployConfig {
    /// Resolve from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honored.
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|key| {
            std::env::var(key)
                // arch-lint: allow(no-silent-result-drop) reason="an unset or non-UTF-8 variable is treated as absent and reported by from_lookup"
                .ok()
        })
    }

    /// Resolve from an arbitrary variable lookup.
    ///
    /// Empty or whitespace-only values count as unset. The credential pair and
    /// the account id are required; everything else falls back to a default.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let access_key_id = get(ACCESS_KEY_ID_VAR);
        let secret_access_key = get(SECRET_ACCESS_KEY_VAR);

        let (access_key_id, secret_access_key) = match (access_key_id, secret_access_key) {
            (Some(id), Some(secret)) => (id, secret),
            (id, secret) => {
                let mut names = Vec::new();
                if id.is_none() {
                    names.push(ACCESS_KEY_ID_VAR);
                }
                if secret.is_none() {
                    names.push(SECRET_ACCESS_KEY_VAR);
                }
                return Err(Error::MissingCredentials { names });
            }
        };

        let account_id = get(ACCOUNT_ID_VAR).ok_or(Error::MissingAccountId)?;

        let config = Self {
            credentials: Credentials {
                access_key_id,
                secret_access_key: SecretString::from(secret_access_key),
            },
            account_id,
            region: get(REGION_VAR).unwrap_or_else(default_region),
            repository: get(REPOSITORY_VAR).unwrap_or_else(default_repository),
            cluster: get(CLUSTER_VAR).unwrap_or_else(default_cluster),
            service: get(SERVICE_VAR).unwrap_or_else(default_service),
        };

        tracing::debug!(
            region = %config.region,
            repository = %config.repository,
            cluster = %config.cluster,
            service = %config.service,
            "DeployConfig resolved",
        );
        Ok(config)
    }

    /// ECR registry host, e.g. `123456789012.dkr.ecr.us-east-1.amazonaws.com`.
    pub fn registry_host(&self) -> String {
        format!(
            "{account}.dkr.ecr.{region}.amazonaws.com",
            account = self.account_id,
            region = self.region,
        )
    }

    /// Local image name produced by `docker build`.
    pub fn local_image(&self) -> String {
        format!("{}:latest", self.repository)
    }
}

fn default_region() -> String {
    "us-east-1".to_owned()
}

fn default_repository() -> String {
    "my-react-app".to_owned()
}

fn default_cluster() -> String {
    "my-cluster".to_owned()
}

fn default_service() -> String {
    "my-service".to_owned()
}
