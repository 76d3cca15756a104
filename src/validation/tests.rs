use super::*;
use crate::error::Constraint;
use crate::schema::BoolOrExpression;

fn at(key: &str) -> FieldPath {
    FieldPath::root().key(key)
}

#[test]
fn test_job_ids() {
    for id in ["test", "_private", "build-linux", "step_2"] {
        assert!(check_job_id(id, &at("jobs")).is_ok(), "{id} should be valid");
    }
    for id in ["2fast", "has space", "dot.ted", ""] {
        assert!(check_job_id(id, &at("jobs")).is_err(), "{id} should be invalid");
    }
}

#[test]
fn test_pattern_error_names_value_and_pattern() {
    let err = check_job_id("9lives", &FieldPath::root().key("jobs").key("9lives")).unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"invalid workflow: `jobs.9lives` `9lives` does not match `^[_a-zA-Z][a-zA-Z0-9_-]*$`"
    );
}

#[test]
fn test_expressions() {
    let path = at("if");
    assert!(check_expression("${{ github.event_name == 'push' }}", &path).is_ok());
    assert!(check_expression("${{\n  matrix.experimental\n}}", &path).is_ok());
    assert!(check_expression("github.event_name == 'push'", &path).is_err());
    assert!(check_expression("prefix ${{ x }}", &path).is_err());
}

#[test]
fn test_continue_on_error() {
    let path = at("continue-on-error");
    assert!(check_bool_or_expression(&BoolOrExpression::Flag(true), &path).is_ok());
    assert!(
        check_bool_or_expression(&BoolOrExpression::from("${{ matrix.experimental }}"), &path)
            .is_ok()
    );
    assert!(
        check_bool_or_expression(&BoolOrExpression::Expression("maybe".into()), &path).is_err()
    );
}

#[test]
fn test_reusable_workflow_references() {
    let path = at("uses");
    assert!(check_reusable_workflow("octo-org/repo/.github/workflows/ci.yml@v1", &path).is_ok());
    assert!(check_reusable_workflow("./.github/workflows/deploy.yaml", &path).is_ok());
    assert!(check_reusable_workflow("actions/checkout@v4", &path).is_err());
}

#[test]
fn test_volumes() {
    let path = at("volumes");
    assert!(check_volume("my_docker_volume:/volume_mount", &path).is_ok());
    assert!(check_volume("/source:/dest:ro", &path).is_err());
    assert!(check_volume("/just/a/path", &path).is_err());
}

#[test]
fn test_cron_schedules() {
    let path = at("cron");
    for cron in ["0 0 * * *", "*/15 * * * *", "30 5,17 * * MON-FRI", "0 12 1 JAN *"] {
        assert!(check_cron(cron, &path).is_ok(), "{cron} should be valid");
    }
    for cron in ["@daily", "0 0 * *", "every day"] {
        assert!(check_cron(cron, &path).is_err(), "{cron} should be invalid");
    }
}

#[test]
fn test_blank_strings_are_empty() {
    let err = check_non_empty("   ", &at("name")).unwrap_err();
    assert_eq!(err.constraint, Constraint::Empty);
    assert!(check_non_empty_list::<String>(&[], &at("needs")).is_err());
}

#[test]
fn test_globs_report_index() {
    let globs = vec!["src/**".to_string(), " ".to_string()];
    let err = check_globs(&globs, &at("paths")).unwrap_err();
    assert_eq!(err.path.to_string(), "paths[1]");
}

#[test]
fn test_min() {
    assert!(check_min(1, 1, &at("max-parallel")).is_ok());
    let err = check_min(0, 1, &at("max-parallel")).unwrap_err();
    assert_eq!(err.constraint, Constraint::AtLeast { min: 1 });
}

#[test]
fn test_exclusive_pair() {
    let branches = Some(vec!["main"]);
    let ignored: Option<Vec<&str>> = Some(vec!["dev"]);
    let err =
        check_exclusive(&branches, &ignored, "branches-ignore", &at("branches")).unwrap_err();
    assert_eq!(
        err.constraint,
        Constraint::Conflicts {
            other: "branches-ignore"
        }
    );

    let unset: Option<Vec<&str>> = None;
    assert!(check_exclusive(&branches, &unset, "branches-ignore", &at("branches")).is_ok());
}

#[test]
fn test_require() {
    assert_eq!(require(Some(3), &at("runs-on")).unwrap(), 3);
    let err = require::<u32>(None, &at("runs-on")).unwrap_err();
    assert_eq!(err.to_string(), "invalid workflow: `runs-on` is required");
}

#[test]
fn test_optional_records_validate_when_present() {
    struct AlwaysFails;
    impl Validate for AlwaysFails {
        fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
            Err(ValidationError::new(path.clone(), Constraint::Required))
        }
    }

    assert!(None::<AlwaysFails>.validate(&at("x")).is_ok());
    assert!(Some(AlwaysFails).validate(&at("x")).is_err());
}
