//! Records shared by workflows and jobs: permissions, concurrency, defaults

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use super::step::Shell;
use super::value::BoolOrExpression;
use crate::error::{FieldPath, ValidationError};
use crate::validation::{Validate, check_bool_or_expression, check_non_empty};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionLevel {
    Read,
    Write,
    None,
}

/// Token scopes GitHub lets a workflow adjust
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PermissionScope {
    Actions,
    Attestations,
    Checks,
    Contents,
    Deployments,
    Discussions,
    IdToken,
    Issues,
    Packages,
    Pages,
    PullRequests,
    RepositoryProjects,
    SecurityEvents,
    Statuses,
}

impl PermissionScope {
    pub fn key(self) -> &'static str {
        match self {
            PermissionScope::Actions => "actions",
            PermissionScope::Attestations => "attestations",
            PermissionScope::Checks => "checks",
            PermissionScope::Contents => "contents",
            PermissionScope::Deployments => "deployments",
            PermissionScope::Discussions => "discussions",
            PermissionScope::IdToken => "id-token",
            PermissionScope::Issues => "issues",
            PermissionScope::Packages => "packages",
            PermissionScope::Pages => "pages",
            PermissionScope::PullRequests => "pull-requests",
            PermissionScope::RepositoryProjects => "repository-projects",
            PermissionScope::SecurityEvents => "security-events",
            PermissionScope::Statuses => "statuses",
        }
    }
}

/// `GITHUB_TOKEN` permissions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permissions {
    ReadAll,
    WriteAll,
    /// Per-scope levels, emitted in scope order
    Scoped(Vec<(PermissionScope, PermissionLevel)>),
}

impl Permissions {
    pub fn scoped() -> Self {
        Permissions::Scoped(Vec::new())
    }

    /// Set one scope; a later call for the same scope wins
    pub fn grant(self, scope: PermissionScope, level: PermissionLevel) -> Self {
        let mut scopes = match self {
            Permissions::Scoped(scopes) => scopes,
            Permissions::ReadAll | Permissions::WriteAll => Vec::new(),
        };
        scopes.retain(|(existing, _)| *existing != scope);
        scopes.push((scope, level));
        scopes.sort_by_key(|(scope, _)| *scope);
        Permissions::Scoped(scopes)
    }
}

impl Serialize for Permissions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Permissions::ReadAll => serializer.serialize_str("read-all"),
            Permissions::WriteAll => serializer.serialize_str("write-all"),
            Permissions::Scoped(scopes) => {
                let mut map = serializer.serialize_map(Some(scopes.len()))?;
                for (scope, level) in scopes {
                    map.serialize_entry(scope.key(), level)?;
                }
                map.end()
            }
        }
    }
}

/// Limits runs sharing `group` to one at a time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Concurrency {
    Group(String),
    Detailed {
        group: String,

        #[serde(skip_serializing_if = "Option::is_none", rename = "cancel-in-progress")]
        cancel_in_progress: Option<BoolOrExpression>,
    },
}

impl Concurrency {
    pub fn group(group: impl Into<String>) -> Self {
        Concurrency::Group(group.into())
    }

    /// `true`, `false` or an expression such as
    /// `${{ github.ref != 'refs/heads/main' }}`
    pub fn cancel_in_progress(self, cancel: impl Into<BoolOrExpression>) -> Self {
        let group = match self {
            Concurrency::Group(group) | Concurrency::Detailed { group, .. } => group,
        };
        Concurrency::Detailed {
            group,
            cancel_in_progress: Some(cancel.into()),
        }
    }
}

impl Validate for Concurrency {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        match self {
            Concurrency::Group(group) => check_non_empty(group, path),
            Concurrency::Detailed {
                group,
                cancel_in_progress,
            } => {
                check_non_empty(group, &path.clone().key("group"))?;
                if let Some(cancel) = cancel_in_progress {
                    check_bool_or_expression(cancel, &path.clone().key("cancel-in-progress"))?;
                }
                Ok(())
            }
        }
    }
}

/// `defaults.run`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RunDefaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<Shell>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "working-directory")]
    pub working_directory: Option<String>,
}

/// Settings applied to every `run` step below them
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Defaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<RunDefaults>,
}

impl Defaults {
    pub fn shell(shell: Shell) -> Self {
        Self {
            run: Some(RunDefaults {
                shell: Some(shell),
                working_directory: None,
            }),
        }
    }

    pub fn working_directory(mut self, dir: impl Into<String>) -> Self {
        self.run.get_or_insert_with(RunDefaults::default).working_directory = Some(dir.into());
        self
    }
}
