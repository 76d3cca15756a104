use super::*;
use crate::schema::{
    Job, JobEntry, Matrix, OrderedMap, RunsOn, Step, Strategy, Trigger, Triggers,
};
use serde_yaml::Value;
use std::fs;
use tempfile::TempDir;

fn step_job(needs: &[&str]) -> Job {
    Job::builder()
        .runs_on("ubuntu-latest")
        .needs(needs.iter().copied())
        .step(Step::uses("actions/checkout@v4"))
        .step(Step::run("make test").name("Run tests"))
        .build()
        .unwrap()
}

fn ci_workflow() -> Workflow {
    Workflow::builder("CI")
        .on(Trigger::push().branches(["main"]))
        .job(
            "test",
            Job::builder()
                .runs_on("ubuntu-latest")
                .strategy(Strategy::matrix(
                    Matrix::new().axis("python-version", ["3.9", "3.10", "3.11"]),
                ))
                .step(Step::uses("actions/checkout@v4"))
                .step(
                    Step::uses("actions/setup-python@v5")
                        .with("python-version", "${{ matrix.python-version }}"),
                )
                .step(Step::run("pytest")),
        )
        .job("lint", step_job(&[]))
        .job("deploy", step_job(&["test", "lint"]))
        .build()
        .unwrap()
}

fn with_jobs(jobs: &[(&str, &[&str])]) -> Workflow {
    jobs.iter()
        .fold(
            Workflow::builder("Broken").on(Trigger::push()),
            |builder, (id, needs)| builder.job(*id, step_job(needs)),
        )
        .build()
        .unwrap()
}

#[test]
fn test_export_is_deterministic() {
    let workflow = ci_workflow();
    let first = to_yaml_string(&workflow).unwrap();
    let second = to_yaml_string(&workflow.clone()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_top_level_key_order() {
    let yaml = to_yaml_string(&ci_workflow()).unwrap();
    let doc: Value = serde_yaml::from_str(&yaml).unwrap();
    let keys: Vec<&str> = doc
        .as_mapping()
        .unwrap()
        .keys()
        .map(|k| k.as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["name", "on", "jobs"]);

    let jobs: Vec<&str> = doc["jobs"]
        .as_mapping()
        .unwrap()
        .keys()
        .map(|k| k.as_str().unwrap())
        .collect();
    assert_eq!(jobs, vec!["test", "lint", "deploy"]);
}

#[test]
fn test_matrix_versions_stay_strings() {
    let yaml = to_yaml_string(&ci_workflow()).unwrap();
    assert!(yaml.contains("- '3.10'"), "unquoted version in:\n{yaml}");

    let doc: Value = serde_yaml::from_str(&yaml).unwrap();
    let versions = &doc["jobs"]["test"]["strategy"]["matrix"]["python-version"];
    assert_eq!(versions[1], Value::String("3.10".into()));
}

#[test]
fn test_writer_matches_string() {
    let workflow = ci_workflow();
    let mut buf = Vec::new();
    to_writer(&workflow, &mut buf).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), to_yaml_string(&workflow).unwrap());
}

#[test]
fn test_write_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".github").join("workflows").join("ci.yml");

    write_to_path(&ci_workflow(), &path).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(written, to_yaml_string(&ci_workflow()).unwrap());
}

#[test]
fn test_write_replaces_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ci.yml");
    fs::write(&path, "stale: true\n").unwrap();

    write_to_path(&ci_workflow(), &path).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("name: CI\n"));
    let leftovers = fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[test]
fn test_failed_export_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ci.yml");
    fs::write(&path, "previous: content\n").unwrap();

    let workflow = with_jobs(&[("deploy", &["build"])]);
    let err = write_to_path(&workflow, &path).unwrap_err();

    assert!(matches!(err, ExportError::UnknownDependency { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), "previous: content\n");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_unknown_dependency_names_both_jobs() {
    let workflow = with_jobs(&[("build", &[]), ("deploy", &["build", "tests"])]);
    let err = to_yaml_string(&workflow).unwrap_err();
    assert_eq!(
        err.to_string(),
        "job `deploy` needs `tests`, but that job doesn't exist"
    );
}

#[test]
fn test_cycle_is_reported_as_path() {
    let workflow = with_jobs(&[("a", &["b"]), ("b", &["c"]), ("c", &["a"])]);
    let err = to_yaml_string(&workflow).unwrap_err();
    assert_eq!(
        err.to_string(),
        "circular job dependency: a -> b -> c -> a"
    );
}

#[test]
fn test_cycle_blocks_writer() {
    let workflow = with_jobs(&[("a", &["a"])]);
    let mut buf = Vec::new();
    let err = to_writer(&workflow, &mut buf).unwrap_err();
    assert!(matches!(err, ExportError::DependencyCycle { .. }));
    assert!(buf.is_empty());
}

fn literal_workflow(jobs: OrderedMap<JobEntry>) -> Workflow {
    let mut on = Triggers::default();
    on.push(Trigger::push().into());
    Workflow {
        name: "CI".to_string(),
        run_name: None,
        on,
        permissions: None,
        env: None,
        defaults: None,
        concurrency: None,
        jobs,
    }
}

#[test]
fn test_literal_workflow_with_bad_job_id_is_rejected() {
    let mut jobs = OrderedMap::new();
    jobs.insert("1 bad id", JobEntry::Run(step_job(&[])));

    let err = to_yaml_string(&literal_workflow(jobs)).unwrap_err();
    match err {
        ExportError::Invalid(err) => assert_eq!(err.path.to_string(), "jobs.1 bad id"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_literal_job_fields_are_checked_on_export() {
    let mut job = step_job(&[]);
    job.runs_on = RunsOn::Label(String::new());
    let mut jobs = OrderedMap::new();
    jobs.insert("test", JobEntry::Run(job));

    let mut buf = Vec::new();
    let err = to_writer(&literal_workflow(jobs), &mut buf).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid workflow: `jobs.test.runs-on` must not be empty"
    );
    assert!(buf.is_empty());
}

#[test]
fn test_literal_workflow_without_triggers_is_rejected() {
    let mut workflow = ci_workflow();
    workflow.on = Triggers::default();

    let err = to_yaml_string(&workflow).unwrap_err();
    assert_eq!(err.to_string(), "invalid workflow: `on` is required");
}
