#![cfg(unix)]

use nocmatch::services::{BuildRequest, IndexBuilder, COMPLETION_MESSAGE};
use nocmatch::NocMatchError;
use std::path::Path;

fn sh(script: &str, workdir: &Path) -> BuildRequest {
    BuildRequest::default()
        .with_venv(None)
        .with_workdir(workdir)
        .with_program("sh", vec!["-c".to_string(), script.to_string()])
}

#[tokio::test]
async fn test_successful_builder_prints_completion_message() {
    let dir = tempfile::tempdir().unwrap();
    let request = sh(
        "echo '[]' > noc_embeddings.json && echo '[]' > title_embeddings.json",
        dir.path(),
    );

    let mut out = Vec::new();
    let outcome = IndexBuilder::new(request).run(&mut out).await.unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), format!("{COMPLETION_MESSAGE}\n"));
    assert_eq!(outcome.missing_expected().count(), 0);
    let optional_present = outcome
        .artifacts
        .iter()
        .filter(|a| a.optional && a.present)
        .count();
    assert_eq!(optional_present, 0);
}

#[tokio::test]
async fn test_failing_builder_aborts_without_message() {
    let dir = tempfile::tempdir().unwrap();
    let request = sh("exit 7", dir.path());

    let mut out = Vec::new();
    let result = IndexBuilder::new(request).run(&mut out).await;

    match result {
        Err(NocMatchError::BuilderFailed { exit_code }) => assert_eq!(exit_code, 7),
        other => panic!("Expected BuilderFailed, got {other:?}"),
    }
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_missing_credential_is_forwarded_as_empty_string() {
    let dir = tempfile::tempdir().unwrap();
    // Fails unless OPENAI_API_KEY is set and empty in the child
    let request = sh(
        r#"[ "${OPENAI_API_KEY+set}" = set ] && [ -z "$OPENAI_API_KEY" ]"#,
        dir.path(),
    );

    let mut out = Vec::new();
    IndexBuilder::new(request).run(&mut out).await.unwrap();
    assert!(!out.is_empty());
}

#[tokio::test]
async fn test_credential_is_forwarded_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let request = sh(r#"[ "$OPENAI_API_KEY" = "sk-test 123" ]"#, dir.path())
        .with_api_key("sk-test 123");

    let mut out = Vec::new();
    IndexBuilder::new(request).run(&mut out).await.unwrap();
}

#[tokio::test]
async fn test_virtual_env_is_activated_for_builder() {
    let dir = tempfile::tempdir().unwrap();
    let venv = dir.path().join(".venv");
    std::fs::create_dir_all(venv.join("bin")).unwrap();
    let venv = std::fs::canonicalize(venv).unwrap();

    let script = format!(
        r#"[ "$VIRTUAL_ENV" = "{root}" ] && case ":$PATH:" in ":{root}/bin:"*) exit 0;; *) exit 9;; esac"#,
        root = venv.display()
    );
    let request = sh(&script, dir.path()).with_venv(Some(".venv".into()));

    let mut out = Vec::new();
    IndexBuilder::new(request).run(&mut out).await.unwrap();

    // Activation is confined to the child
    assert_ne!(
        std::env::var("VIRTUAL_ENV").ok().as_deref(),
        Some(venv.display().to_string().as_str())
    );
}

#[tokio::test]
async fn test_builder_runs_in_workdir() {
    let dir = tempfile::tempdir().unwrap();
    let request = sh("touch noc_embeddings.json noc_faiss.index", dir.path());

    let mut out = Vec::new();
    let outcome = IndexBuilder::new(request).run(&mut out).await.unwrap();

    assert!(dir.path().join("noc_embeddings.json").exists());
    let missing: Vec<&str> = outcome.missing_expected().map(|a| a.name).collect();
    assert_eq!(missing, vec!["title_embeddings.json"]);
    assert!(outcome
        .artifacts
        .iter()
        .any(|a| a.name == "noc_faiss.index" && a.present));
}

#[tokio::test]
async fn test_builder_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let request = sh("sleep 10", dir.path()).with_timeout_secs(Some(1));

    let mut out = Vec::new();
    let result = IndexBuilder::new(request).run(&mut out).await;

    assert!(matches!(
        result,
        Err(NocMatchError::BuilderTimeout { timeout_secs: 1 })
    ));
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_missing_builder_program() {
    let dir = tempfile::tempdir().unwrap();
    let request = BuildRequest::default()
        .with_venv(None)
        .with_workdir(dir.path())
        .with_program("nocmatch_missing_builder_12345", vec![]);

    let mut out = Vec::new();
    let result = IndexBuilder::new(request).run(&mut out).await;

    assert!(matches!(result, Err(NocMatchError::BuilderNotFound { .. })));
    assert!(out.is_empty());
}
