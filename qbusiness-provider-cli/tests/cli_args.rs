use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("qbusiness-provider").unwrap();
    cmd.env_remove("QBUSINESS_PROVIDER_CONFIG");
    cmd
}

#[test]
fn help_lists_arguments() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("<RESOURCE_TYPE>"))
        .stdout(predicate::str::contains("--callback-context"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn unsupported_resource_type_is_a_usage_error() {
    cli()
        .args(["AWS::QBusiness::DataSource", "read"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unsupported resource type"));
}

#[test]
fn unknown_action_is_a_usage_error() {
    cli()
        .args(["AWS::QBusiness::Index", "destroy"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown action"));
}

#[test]
fn missing_request_file_exits_with_two() {
    cli()
        .args([
            "AWS::QBusiness::Index",
            "read",
            "--request",
            "/nonexistent/request.json",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn malformed_config_exits_with_two() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "unknown_key = 1").unwrap();

    cli()
        .args(["AWS::QBusiness::Index", "read", "--config"])
        .arg(config.path())
        .write_stdin("{}")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to parse provider config"));
}

#[test]
fn request_that_does_not_match_the_schema_fails_without_calling_aws() {
    // Deserialization fails before any client call is made.
    cli()
        .args(["AWS::QBusiness::Index", "read"])
        .env("AWS_REGION", "us-east-1")
        .write_stdin(r#"{"desiredResourceState": {"ApplicationId": 7}}"#)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"errorCode\": \"InvalidRequest\""));
}
