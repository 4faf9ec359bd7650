use ecsroll_core::task_definition::{
    self, REGISTER_FILE_NAME, SERVER_MANAGED_FIELDS, parse_revision, prepare_for_registration,
};
use ecsroll_core::{DeployConfig, Error, ImageRef, ImageTag};
use proptest::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

const IMAGE: &str = "123456789012.dkr.ecr.us-east-1.amazonaws.com/app:1700000000000";

fn described() -> Value {
    json!({
        "taskDefinition": {
            "taskDefinitionArn": "arn:aws:ecs:us-east-1:123456789012:task-definition/my-service:6",
            "family": "my-service",
            "revision": 6,
            "status": "ACTIVE",
            "requiresAttributes": [{ "name": "com.amazonaws.ecs.capability.logging-driver.awslogs" }],
            "compatibilities": ["EC2", "FARGATE"],
            "registeredAt": "2024-01-01T00:00:00.000Z",
            "registeredBy": "arn:aws:iam::123456789012:user/deployer",
            "networkMode": "awsvpc",
            "cpu": "256",
            "memory": "512",
            "executionRoleArn": "arn:aws:iam::123456789012:role/ecsTaskExecutionRole",
            "requiresCompatibilities": ["FARGATE"],
            "containerDefinitions": [
                {
                    "name": "web",
                    "image": "old:1",
                    "essential": true,
                    "portMappings": [{ "containerPort": 80, "protocol": "tcp" }]
                },
                {
                    "name": "sidecar",
                    "image": "envoy:1.29"
                }
            ]
        }
    })
}

#[test]
fn removes_server_managed_fields() {
    let prepared = prepare_for_registration(described(), IMAGE).unwrap();
    let obj = prepared.as_object().unwrap();

    for field in SERVER_MANAGED_FIELDS {
        assert!(!obj.contains_key(*field), "{field} should be removed");
    }
    assert!(!obj.contains_key("taskDefinition"), "wrapper should be dropped");
}

#[test]
fn preserves_everything_else() {
    let prepared = prepare_for_registration(described(), IMAGE).unwrap();

    let mut expected = described()["taskDefinition"].clone();
    let expected_obj = expected.as_object_mut().unwrap();
    for field in SERVER_MANAGED_FIELDS {
        expected_obj.remove(*field);
    }
    expected["containerDefinitions"][0]["image"] = json!(IMAGE);

    assert_eq!(prepared, expected);
}

#[test]
fn only_first_container_image_changes() {
    let prepared = prepare_for_registration(described(), IMAGE).unwrap();

    assert_eq!(prepared["containerDefinitions"][0]["image"], IMAGE);
    assert_eq!(prepared["containerDefinitions"][1]["image"], "envoy:1.29");
}

#[test]
fn image_matches_config_reference() {
    let config = DeployConfig::from_lookup(|key| {
        let value = match key {
            "AWS_ACCESS_KEY_ID" => "AKIA",
            "AWS_SECRET_ACCESS_KEY" => "secret",
            "AWS_ACCOUNT_ID" => "123456789012",
            "AWS_REGION" => "us-west-2",
            "ECR_REPOSITORY" => "app",
            _ => return None,
        };
        Some(value.to_owned())
    })
    .unwrap();
    let image = ImageRef::new(&config, ImageTag::from_millis(1_700_000_000_000));

    let prepared = prepare_for_registration(described(), &image.to_string()).unwrap();

    assert_eq!(
        prepared["containerDefinitions"][0]["image"],
        "123456789012.dkr.ecr.us-west-2.amazonaws.com/app:1700000000000"
    );
}

#[test]
fn empty_container_list_is_an_error() {
    let doc = json!({ "taskDefinition": { "family": "svc", "containerDefinitions": [] } });

    let result = prepare_for_registration(doc, IMAGE);
    assert!(matches!(result, Err(Error::EmptyContainerDefinitions)));
}

#[test]
fn missing_container_list_is_an_error() {
    let doc = json!({ "taskDefinition": { "family": "svc" } });

    let result = prepare_for_registration(doc, IMAGE);
    assert!(matches!(result, Err(Error::MissingContainerDefinitions)));
}

#[test]
fn missing_wrapper_is_an_error() {
    let doc = json!({ "family": "svc", "containerDefinitions": [{ "image": "x" }] });

    let result = prepare_for_registration(doc, IMAGE);
    assert!(matches!(result, Err(Error::MissingTaskDefinition)));
}

// ── File round-trip ──

#[test]
fn rewrite_file_writes_valid_json() {
    let tmp = TempDir::new().unwrap();
    let raw = serde_json::to_string(&described()).unwrap();

    let raw_path = task_definition::write_raw(tmp.path(), &raw).unwrap();
    let out_path = task_definition::rewrite_file(&raw_path, tmp.path(), IMAGE).unwrap();

    assert_eq!(out_path, tmp.path().join(REGISTER_FILE_NAME));
    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(written, prepare_for_registration(described(), IMAGE).unwrap());

    // Raw file is left as fetched.
    let raw_back: Value =
        serde_json::from_str(&std::fs::read_to_string(&raw_path).unwrap()).unwrap();
    assert_eq!(raw_back, described());
}

#[test]
fn rewrite_file_overwrites_previous_run() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join(REGISTER_FILE_NAME), "stale").unwrap();
    let raw = serde_json::to_string(&described()).unwrap();

    let raw_path = task_definition::write_raw(tmp.path(), &raw).unwrap();
    let out_path = task_definition::rewrite_file(&raw_path, tmp.path(), IMAGE).unwrap();

    let content = std::fs::read_to_string(out_path).unwrap();
    assert!(content.contains(IMAGE));
}

#[test]
fn rewrite_file_rejects_malformed_json() {
    let tmp = TempDir::new().unwrap();
    let raw_path = task_definition::write_raw(tmp.path(), "{ not json").unwrap();

    let result = task_definition::rewrite_file(&raw_path, tmp.path(), IMAGE);
    assert!(matches!(result, Err(Error::TaskDefinitionParse { .. })));
    assert!(!tmp.path().join(REGISTER_FILE_NAME).exists());
}

#[test]
fn rewrite_file_reports_missing_input() {
    let tmp = TempDir::new().unwrap();

    let result =
        task_definition::rewrite_file(&tmp.path().join("absent.json"), tmp.path(), IMAGE);
    assert!(matches!(result, Err(Error::TaskDefinitionRead { .. })));
}

// ── Revision parsing ──

#[test]
fn parse_revision_rejects_missing_revision() {
    let result = parse_revision(r#"{"taskDefinition": {"family": "svc"}}"#);
    assert!(matches!(result, Err(Error::MissingRevision { .. })));
}

#[test]
fn parse_revision_rejects_non_json() {
    assert!(parse_revision("An error occurred").is_err());
}

// ── Property: unrelated fields survive ──

proptest! {
    #[test]
    fn extra_fields_are_preserved(
        extras in prop::collection::btree_map("[a-z]{1,12}", "[a-zA-Z0-9 ]{0,16}", 0..8)
    ) {
        let mut doc = described();
        let definition = doc["taskDefinition"].as_object_mut().unwrap();
        let extras: Vec<(String, String)> = extras
            .into_iter()
            .filter(|(k, _)| {
                !SERVER_MANAGED_FIELDS.contains(&k.as_str()) && k != "containerDefinitions"
            })
            .collect();
        for (k, v) in &extras {
            definition.insert(k.clone(), json!(v));
        }

        let prepared = prepare_for_registration(doc, IMAGE).unwrap();

        for (k, v) in &extras {
            prop_assert_eq!(&prepared[k.as_str()], &json!(v));
        }
        prop_assert_eq!(&prepared["containerDefinitions"][0]["image"], &json!(IMAGE));
    }
}
