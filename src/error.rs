//! Error types for workflow construction and export

use miette::Diagnostic;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Location of a field inside a workflow, rendered as `jobs.test.steps[0].run`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<Segment>);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.0.push(Segment::Key(key.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.0.push(Segment::Index(index));
        self
    }

    /// Prepend `outer` to this path
    pub fn within(self, outer: &FieldPath) -> Self {
        let mut segments = outer.0.clone();
        segments.extend(self.0);
        Self(segments)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => write!(f, "{key}")?,
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// The rule a field broke
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    #[error("is required")]
    Required,

    #[error("must not be empty")]
    Empty,

    #[error("`{value}` does not match `{pattern}`")]
    Pattern {
        value: String,
        pattern: &'static str,
    },

    #[error("`{key}` is declared more than once")]
    Duplicate { key: String },

    #[error("cannot be combined with `{other}`")]
    Conflicts { other: &'static str },

    #[error("must be at least {min}")]
    AtLeast { min: u64 },

    #[error("{reason}")]
    Invalid { reason: &'static str },
}

/// Raised by a builder's `build()` when a field is missing or out of range
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[error("invalid workflow: `{path}` {constraint}")]
#[diagnostic(
    code(ciscript::validation),
    help("fix the field named above in the workflow definition")
)]
pub struct ValidationError {
    pub path: FieldPath,
    pub constraint: Constraint,
}

impl ValidationError {
    pub fn new(path: FieldPath, constraint: Constraint) -> Self {
        Self { path, constraint }
    }

    /// Re-anchor a job-relative error under its position in the workflow
    pub fn within(self, outer: &FieldPath) -> Self {
        Self {
            path: self.path.within(outer),
            constraint: self.constraint,
        }
    }
}

/// Raised while turning a validated workflow into YAML on disk
#[derive(Error, Debug, Diagnostic)]
pub enum ExportError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Invalid(#[from] ValidationError),

    #[error("job `{job}` needs `{dependency}`, but that job doesn't exist")]
    #[diagnostic(
        code(ciscript::export::unknown_dependency),
        help("every entry in `needs` must be the id of another job in the same workflow")
    )]
    UnknownDependency { job: String, dependency: String },

    #[error("circular job dependency: {}", format_cycle(.jobs))]
    #[diagnostic(
        code(ciscript::export::dependency_cycle),
        help("remove one of the `needs` entries along this path")
    )]
    DependencyCycle { jobs: Vec<String> },

    #[error("failed to serialize workflow to YAML")]
    #[diagnostic(code(ciscript::export::serialize))]
    Serialize(#[from] serde_yaml::Error),

    #[error("failed to write workflow to {}", .path.display())]
    #[diagnostic(code(ciscript::export::write))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn format_cycle(jobs: &[String]) -> String {
    let mut path: Vec<&str> = jobs.iter().map(String::as_str).collect();
    if let Some(first) = jobs.first() {
        path.push(first);
    }
    path.join(" -> ")
}

/// Any failure of a workflow program
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Export(#[from] ExportError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_path_display() {
        let path = FieldPath::root()
            .key("jobs")
            .key("test")
            .key("steps")
            .index(2)
            .key("run");
        assert_eq!(path.to_string(), "jobs.test.steps[2].run");
        assert_eq!(FieldPath::root().to_string(), "(root)");
    }

    #[test]
    fn test_within_prefixes_path() {
        let inner = FieldPath::root().key("runs-on");
        let outer = FieldPath::root().key("jobs").key("lint");
        assert_eq!(inner.within(&outer).to_string(), "jobs.lint.runs-on");
    }

    #[test]
    fn test_cycle_message_closes_the_loop() {
        let err = ExportError::DependencyCycle {
            jobs: vec!["a".to_string(), "b".to_string()],
        };
        insta::assert_snapshot!(err.to_string(), @"circular job dependency: a -> b -> a");
    }

    #[test]
    fn test_validation_message() {
        let err = ValidationError::new(
            FieldPath::root().key("jobs").key("test").key("runs-on"),
            Constraint::Required,
        );
        insta::assert_snapshot!(err.to_string(), @"invalid workflow: `jobs.test.runs-on` is required");
    }
}
