use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ── Configuration ──
    #[error("missing AWS credentials: set {}", names.join(" and "))]
    MissingCredentials { names: Vec<&'static str> },

    #[error("missing AWS account id: set AWS_ACCOUNT_ID")]
    MissingAccountId,

    #[error("system clock is before the Unix epoch; cannot derive an image tag")]
    Clock { source: std::time::SystemTimeError },

    // ── Task definition files ──
    #[error("failed to read task definition from {path}")]
    TaskDefinitionRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write task definition to {path}")]
    TaskDefinitionWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse task definition JSON")]
    TaskDefinitionParse { source: serde_json::Error },

    #[error("failed to serialize task definition")]
    TaskDefinitionSerialize { source: serde_json::Error },

    // ── Task definition shape ──
    #[error("task definition document has no `taskDefinition` object")]
    MissingTaskDefinition,

    #[error("task definition has no `containerDefinitions` list")]
    MissingContainerDefinitions,

    #[error("task definition has an empty `containerDefinitions` list")]
    EmptyContainerDefinitions,

    #[error("first container definition is not a JSON object")]
    InvalidContainerDefinition,

    #[error("registration response has no integer `taskDefinition.revision`")]
    MissingRevision { source: serde_json::Error },
}
