use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Constraint, FieldPath, ValidationError};
use crate::schema::BoolOrExpression;

pub(crate) const JOB_ID_PATTERN: &str = "^[_a-zA-Z][a-zA-Z0-9_-]*$";
pub(crate) const EXPRESSION_PATTERN: &str = r"^\$\{\{(.|[\r\n])*\}\}$";
pub(crate) const REUSABLE_WORKFLOW_PATTERN: &str = r"^(.+/)+(.+)\.(ya?ml)(@.+)?$";
pub(crate) const VOLUME_PATTERN: &str = "^[^:]+:[^:]+$";
pub(crate) const CRON_PATTERN: &str = r"^(((\d+,)+\d+|((\d+|\*)/\d+|((JAN|FEB|MAR|APR|MAY|JUN|JUL|AUG|SEP|OCT|NOV|DEC)(-(JAN|FEB|MAR|APR|MAY|JUN|JUL|AUG|SEP|OCT|NOV|DEC))?))|(\d+-\d+)|\d+|\*|((MON|TUE|WED|THU|FRI|SAT|SUN)(-(MON|TUE|WED|THU|FRI|SAT|SUN))?)) ?){5}$";

static JOB_ID: Lazy<Regex> = Lazy::new(|| Regex::new(JOB_ID_PATTERN).unwrap());
static EXPRESSION: Lazy<Regex> = Lazy::new(|| Regex::new(EXPRESSION_PATTERN).unwrap());
static REUSABLE_WORKFLOW: Lazy<Regex> =
    Lazy::new(|| Regex::new(REUSABLE_WORKFLOW_PATTERN).unwrap());
static VOLUME: Lazy<Regex> = Lazy::new(|| Regex::new(VOLUME_PATTERN).unwrap());
static CRON: Lazy<Regex> = Lazy::new(|| Regex::new(CRON_PATTERN).unwrap());

fn matches(
    regex: &Regex,
    pattern: &'static str,
    value: &str,
    path: &FieldPath,
) -> Result<(), ValidationError> {
    if regex.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new(
            path.clone(),
            Constraint::Pattern {
                value: value.to_string(),
                pattern,
            },
        ))
    }
}

/// Unwrap a required builder field
pub fn require<T>(value: Option<T>, path: &FieldPath) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::new(path.clone(), Constraint::Required))
}

pub fn check_job_id(id: &str, path: &FieldPath) -> Result<(), ValidationError> {
    matches(&JOB_ID, JOB_ID_PATTERN, id, path)
}

/// `${{ ... }}` spanning the whole value
pub fn check_expression(value: &str, path: &FieldPath) -> Result<(), ValidationError> {
    matches(&EXPRESSION, EXPRESSION_PATTERN, value, path)
}

pub fn check_reusable_workflow(value: &str, path: &FieldPath) -> Result<(), ValidationError> {
    matches(&REUSABLE_WORKFLOW, REUSABLE_WORKFLOW_PATTERN, value, path)
}

pub fn check_volume(value: &str, path: &FieldPath) -> Result<(), ValidationError> {
    matches(&VOLUME, VOLUME_PATTERN, value, path)
}

/// Five-field POSIX cron, without the `@daily` style shorthands
pub fn check_cron(value: &str, path: &FieldPath) -> Result<(), ValidationError> {
    matches(&CRON, CRON_PATTERN, value, path)
}

pub fn check_bool_or_expression(
    value: &BoolOrExpression,
    path: &FieldPath,
) -> Result<(), ValidationError> {
    match value {
        BoolOrExpression::Flag(_) => Ok(()),
        BoolOrExpression::Expression(expr) => check_expression(expr, path),
    }
}

pub fn check_non_empty(value: &str, path: &FieldPath) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new(path.clone(), Constraint::Empty))
    } else {
        Ok(())
    }
}

pub fn check_non_empty_list<T>(values: &[T], path: &FieldPath) -> Result<(), ValidationError> {
    if values.is_empty() {
        Err(ValidationError::new(path.clone(), Constraint::Empty))
    } else {
        Ok(())
    }
}

/// A filter list: at least one pattern, none of them blank
pub fn check_globs(globs: &[String], path: &FieldPath) -> Result<(), ValidationError> {
    check_non_empty_list(globs, path)?;
    for (i, glob) in globs.iter().enumerate() {
        check_non_empty(glob, &path.clone().index(i))?;
    }
    Ok(())
}

pub fn check_min(value: u64, min: u64, path: &FieldPath) -> Result<(), ValidationError> {
    if value < min {
        Err(ValidationError::new(path.clone(), Constraint::AtLeast { min }))
    } else {
        Ok(())
    }
}

/// Fail when both halves of a mutually exclusive pair are set
pub fn check_exclusive<A, B>(
    first: &Option<A>,
    second: &Option<B>,
    second_key: &'static str,
    first_path: &FieldPath,
) -> Result<(), ValidationError> {
    if first.is_some() && second.is_some() {
        Err(ValidationError::new(
            first_path.clone(),
            Constraint::Conflicts { other: second_key },
        ))
    } else {
        Ok(())
    }
}
