use super::*;
use crate::test_support::{failed, succeeded, FakeCommandRunner};
use std::io;

#[test]
fn test_secret_is_trimmed() {
    let runner = FakeCommandRunner::new(|_, _| Ok(succeeded("  s3cr3t\n")));
    let store = AgentSecretStore::new(&runner, "buildkite-agent");

    assert_eq!(store.get_secret("APP_ID"), Some("s3cr3t".to_string()));
    assert_eq!(
        runner.calls(),
        vec![vec!["buildkite-agent", "secret", "get", "APP_ID"]]
    );
}

#[test]
fn test_non_zero_exit_is_a_miss() {
    let runner = FakeCommandRunner::new(|_, _| Ok(failed(1, "secret not found")));
    let store = AgentSecretStore::new(&runner, "buildkite-agent");

    assert_eq!(store.get_secret("APP_ID"), None);
}

#[test]
fn test_empty_output_is_a_miss() {
    let runner = FakeCommandRunner::new(|_, _| Ok(succeeded(" \n\t")));
    let store = AgentSecretStore::new(&runner, "buildkite-agent");

    assert_eq!(store.get_secret("PRIVATE_KEY"), None);
}

#[test]
fn test_missing_agent_is_a_miss() {
    let runner = FakeCommandRunner::new(|_, _| {
        Err(io::Error::new(io::ErrorKind::NotFound, "no such file"))
    });
    let store = AgentSecretStore::new(&runner, "buildkite-agent");

    assert_eq!(store.get_secret("APP_ID"), None);
}

#[test]
fn test_custom_agent_binary() {
    let runner = FakeCommandRunner::new(|_, _| Ok(succeeded("value")));
    let store = AgentSecretStore::new(&runner, "/opt/agent/bin/buildkite-agent");

    store.get_secret("APP_ID");

    assert_eq!(runner.calls()[0][0], "/opt/agent/bin/buildkite-agent");
}
