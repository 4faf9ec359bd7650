//! ECS task definition rewriting.
//!
//! `aws ecs describe-task-definition` returns `{"taskDefinition": {...}}`.
//! `register-task-definition --cli-input-json` wants the inner object without
//! the fields ECS assigns itself, so the pipeline goes:
//!
//! ```text
//! task-def.json ── unwrap taskDefinition
//!               ── drop SERVER_MANAGED_FIELDS
//!               ── containerDefinitions[0].image = <pushed image>
//!               ── new-task-def.json
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::Error;

/// Raw `describe-task-definition` output, relative to the working directory.
pub const RAW_FILE_NAME: &str = "task-def.json";

/// Rewritten definition submitted to `register-task-definition`.
pub const REGISTER_FILE_NAME: &str = "new-task-def.json";

/// Fields ECS assigns on registration and rejects or ignores on input.
pub const SERVER_MANAGED_FIELDS: &[&str] = &[
    "taskDefinitionArn",
    "revision",
    "status",
    "requiresAttributes",
    "compatibilities",
    "registeredAt",
    "registeredBy",
];

const WRAPPER_KEY: &str = "taskDefinition";
const CONTAINER_DEFINITIONS_KEY: &str = "containerDefinitions";
const IMAGE_KEY: &str = "image";

/// Turn a `describe-task-definition` document into registration input.
///
/// Everything other than the server-managed fields and the first container's
/// `image` is carried over untouched.
pub fn prepare_for_registration(document: Value, image: &str) -> crate::Result<Value> {
    let Value::Object(mut wrapper) = document else {
        return Err(Error::MissingTaskDefinition);
    };
    let Some(Value::Object(mut definition)) = wrapper.remove(WRAPPER_KEY) else {
        return Err(Error::MissingTaskDefinition);
    };

    for field in SERVER_MANAGED_FIELDS {
        definition.remove(*field);
    }

    set_primary_image(&mut definition, image)?;

    Ok(Value::Object(definition))
}

fn set_primary_image(definition: &mut Map<String, Value>, image: &str) -> crate::Result<()> {
    let containers = definition
        .get_mut(CONTAINER_DEFINITIONS_KEY)
        .and_then(Value::as_array_mut)
        .ok_or(Error::MissingContainerDefinitions)?;

    let primary = containers
        .first_mut()
        .ok_or(Error::EmptyContainerDefinitions)?
        .as_object_mut()
        .ok_or(Error::InvalidContainerDefinition)?;

    primary.insert(IMAGE_KEY.to_owned(), Value::String(image.to_owned()));
    Ok(())
}

/// Write raw `describe-task-definition` output to `<dir>/task-def.json`.
pub fn write_raw(dir: &Path, raw: &str) -> crate::Result<PathBuf> {
    let path = dir.join(RAW_FILE_NAME);
    std::fs::write(&path, raw).map_err(|e| Error::TaskDefinitionWrite {
        path: path.clone(),
        source: e,
    })?;
    Ok(path)
}

/// Read `raw_path`, rewrite it for `image`, and write the result to
/// `<dir>/new-task-def.json` as pretty-printed JSON.
pub fn rewrite_file(raw_path: &Path, dir: &Path, image: &str) -> crate::Result<PathBuf> {
    let content = std::fs::read_to_string(raw_path).map_err(|e| Error::TaskDefinitionRead {
        path: raw_path.to_path_buf(),
        source: e,
    })?;
    let document: Value =
        serde_json::from_str(&content).map_err(|e| Error::TaskDefinitionParse { source: e })?;

    let prepared = prepare_for_registration(document, image)?;
    let rendered = serde_json::to_string_pretty(&prepared)
        .map_err(|e| Error::TaskDefinitionSerialize { source: e })?;

    let out_path = dir.join(REGISTER_FILE_NAME);
    std::fs::write(&out_path, rendered).map_err(|e| Error::TaskDefinitionWrite {
        path: out_path.clone(),
        source: e,
    })?;

    tracing::debug!(path = %out_path.display(), "task definition rewritten");
    Ok(out_path)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterResponse {
    task_definition: RegisteredTaskDefinition,
}

#[derive(Deserialize)]
struct RegisteredTaskDefinition {
    revision: u64,
}

/// Extract `taskDefinition.revision` from `register-task-definition` output.
pub fn parse_revision(output: &str) -> crate::Result<u64> {
    serde_json::from_str::<RegisterResponse>(output)
        .map(|r| r.task_definition.revision)
        .map_err(|e| Error::MissingRevision { source: e })
}
