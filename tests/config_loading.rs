// tests/config_loading.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::io::Write;

use tempfile::NamedTempFile;

use flowdag::config::{load_and_validate, load_from_path, validate_config};

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(contents: &str) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    Ok(file)
}

#[test]
fn full_config_round_trips() -> TestResult {
    init_tracing();

    let file = write_config(
        r#"
        [workflow]
        name = "pipeline"
        loop = true
        poll_interval_ms = 250

        [job.build]
        cmd = "cargo build"

        [job.test]
        cmd = "cargo test"
        depends_on = ["build"]
        "#,
    )?;

    let cfg = load_and_validate(file.path())?;
    assert_eq!(cfg.workflow.name, "pipeline");
    assert!(cfg.workflow.looping);
    assert_eq!(cfg.workflow.poll_interval_ms, 250);
    assert_eq!(cfg.job.len(), 2);
    assert_eq!(cfg.job["test"].depends_on, vec!["build".to_string()]);

    Ok(())
}

#[test]
fn workflow_section_defaults_apply() -> TestResult {
    init_tracing();

    let file = write_config(
        r#"
        [job.only]
        cmd = "exit 0"
        "#,
    )?;

    let cfg = load_and_validate(file.path())?;
    assert_eq!(cfg.workflow.name, "flowdag");
    assert!(!cfg.workflow.looping);
    assert_eq!(cfg.workflow.poll_interval_ms, 1000);
    assert!(cfg.job["only"].depends_on.is_empty());

    Ok(())
}

#[test]
fn config_without_jobs_is_rejected() -> TestResult {
    init_tracing();

    let file = write_config(
        r#"
        [workflow]
        name = "empty"
        "#,
    )?;

    let cfg = load_from_path(file.path())?;
    let err = validate_config(&cfg).expect_err("zero jobs must fail validation");
    assert!(err.to_string().contains("at least one"));

    Ok(())
}

#[test]
fn unknown_dependency_is_rejected() -> TestResult {
    init_tracing();

    let file = write_config(
        r#"
        [job.app]
        cmd = "exit 0"
        depends_on = ["missing"]
        "#,
    )?;

    let err = load_and_validate(file.path()).expect_err("unknown dep must fail");
    assert!(err.to_string().contains("unknown dependency"));

    Ok(())
}

#[test]
fn self_dependency_is_rejected() -> TestResult {
    init_tracing();

    let file = write_config(
        r#"
        [job.snake]
        cmd = "exit 0"
        depends_on = ["snake"]
        "#,
    )?;

    let err = load_and_validate(file.path()).expect_err("self dep must fail");
    assert!(err.to_string().contains("cannot depend on itself"));

    Ok(())
}

#[test]
fn dependency_cycle_is_rejected() -> TestResult {
    init_tracing();

    let file = write_config(
        r#"
        [job.a]
        cmd = "exit 0"
        depends_on = ["b"]

        [job.b]
        cmd = "exit 0"
        depends_on = ["a"]
        "#,
    )?;

    let err = load_and_validate(file.path()).expect_err("cycle must fail");
    assert!(err.to_string().contains("cycle detected"));

    Ok(())
}

#[test]
fn malformed_toml_is_an_error() -> TestResult {
    init_tracing();

    let file = write_config("[job.broken\ncmd = ")?;
    let err = load_from_path(file.path()).expect_err("parse must fail");
    assert!(err.to_string().contains("parsing TOML config"));

    Ok(())
}
