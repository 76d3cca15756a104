use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use super::ordered::OrderedMap;
use crate::error::{Constraint, FieldPath, ValidationError};
use crate::validation::{Validate, check_cron, check_exclusive, check_globs, check_non_empty};

/// An event that starts the workflow
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    Push(PushEvent),
    PullRequest(PullRequestEvent),
    PullRequestTarget(PullRequestEvent),
    /// Started by hand from the Actions tab (`workflow_dispatch`)
    Manual(WorkflowDispatch),
    Schedule(Vec<String>),
    WorkflowCall(WorkflowCall),
    /// Any other repository webhook event, e.g. `release` or `workflow_run`
    Activity(ActivityEvent),
}

impl Trigger {
    /// Key under `on:`
    pub fn event_name(&self) -> &'static str {
        match self {
            Trigger::Push(_) => "push",
            Trigger::PullRequest(_) => "pull_request",
            Trigger::PullRequestTarget(_) => "pull_request_target",
            Trigger::Manual(_) => "workflow_dispatch",
            Trigger::Schedule(_) => "schedule",
            Trigger::WorkflowCall(_) => "workflow_call",
            Trigger::Activity(activity) => activity.event.name(),
        }
    }

    pub fn push() -> PushEvent {
        PushEvent::default()
    }

    pub fn pull_request() -> PullRequestEvent {
        PullRequestEvent::default()
    }

    pub fn manual() -> WorkflowDispatch {
        WorkflowDispatch::default()
    }

    /// A webhook event without dedicated filters
    pub fn event(event: Event) -> ActivityEvent {
        ActivityEvent {
            event,
            types: None,
            workflows: None,
        }
    }

    pub fn schedule<I, S>(crons: I) -> Trigger
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Trigger::Schedule(crons.into_iter().map(Into::into).collect())
    }
}

impl Validate for Trigger {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        match self {
            Trigger::Push(event) => event.validate(path),
            Trigger::PullRequest(event) | Trigger::PullRequestTarget(event) => event.validate(path),
            Trigger::Manual(dispatch) => validate_inputs(&dispatch.inputs, path),
            Trigger::Schedule(crons) => {
                if crons.is_empty() {
                    return Err(ValidationError::new(path.clone(), Constraint::Empty));
                }
                for (i, cron) in crons.iter().enumerate() {
                    check_cron(cron, &path.clone().index(i).key("cron"))?;
                }
                Ok(())
            }
            Trigger::WorkflowCall(call) => call.validate(path),
            Trigger::Activity(activity) => activity.validate(path),
        }
    }
}

/// The `on:` block: triggers in declaration order, one per event
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Triggers(Vec<Trigger>);

impl Triggers {
    pub fn iter(&self) -> impl Iterator<Item = &Trigger> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn push(&mut self, trigger: Trigger) {
        self.0.push(trigger);
    }
}

impl Validate for Triggers {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            return Err(ValidationError::new(path.clone(), Constraint::Required));
        }
        for (i, trigger) in self.0.iter().enumerate() {
            let name = trigger.event_name();
            if self.0[..i].iter().any(|t| t.event_name() == name) {
                return Err(ValidationError::new(
                    path.clone(),
                    Constraint::Duplicate {
                        key: name.to_string(),
                    },
                ));
            }
            trigger.validate(&path.clone().key(name))?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct CronEntry<'a> {
    cron: &'a str,
}

impl Serialize for Triggers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for trigger in &self.0 {
            let key = trigger.event_name();
            match trigger {
                Trigger::Push(event) => map.serialize_entry(key, event)?,
                Trigger::PullRequest(event) | Trigger::PullRequestTarget(event) => {
                    map.serialize_entry(key, event)?
                }
                Trigger::Manual(dispatch) => map.serialize_entry(key, dispatch)?,
                Trigger::Schedule(crons) => {
                    let entries: Vec<CronEntry<'_>> =
                        crons.iter().map(|cron| CronEntry { cron }).collect();
                    map.serialize_entry(key, &entries)?
                }
                Trigger::WorkflowCall(call) => map.serialize_entry(key, call)?,
                Trigger::Activity(activity) => map.serialize_entry(key, activity)?,
            }
        }
        map.end()
    }
}

/// Filters for the `push` event
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PushEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "branches-ignore")]
    pub branches_ignore: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "tags-ignore")]
    pub tags_ignore: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "paths-ignore")]
    pub paths_ignore: Option<Vec<String>>,
}

fn to_strings<I, S>(items: I) -> Option<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Some(items.into_iter().map(Into::into).collect())
}

fn validate_filters(
    include: &Option<Vec<String>>,
    ignore: &Option<Vec<String>>,
    key: &'static str,
    ignore_key: &'static str,
    path: &FieldPath,
) -> Result<(), ValidationError> {
    let include_path = path.clone().key(key);
    check_exclusive(include, ignore, ignore_key, &include_path)?;
    if let Some(globs) = include {
        check_globs(globs, &include_path)?;
    }
    if let Some(globs) = ignore {
        check_globs(globs, &path.clone().key(ignore_key))?;
    }
    Ok(())
}

impl PushEvent {
    pub fn branches<I, S>(mut self, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.branches = to_strings(branches);
        self
    }

    pub fn branches_ignore<I, S>(mut self, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.branches_ignore = to_strings(branches);
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = to_strings(tags);
        self
    }

    pub fn tags_ignore<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags_ignore = to_strings(tags);
        self
    }

    pub fn paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths = to_strings(paths);
        self
    }

    pub fn paths_ignore<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths_ignore = to_strings(paths);
        self
    }
}

impl Validate for PushEvent {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        validate_filters(
            &self.branches,
            &self.branches_ignore,
            "branches",
            "branches-ignore",
            path,
        )?;
        validate_filters(&self.tags, &self.tags_ignore, "tags", "tags-ignore", path)?;
        validate_filters(&self.paths, &self.paths_ignore, "paths", "paths-ignore", path)
    }
}

impl From<PushEvent> for Trigger {
    fn from(event: PushEvent) -> Self {
        Trigger::Push(event)
    }
}

/// Activity types that narrow the `pull_request` event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestActivity {
    Assigned,
    Unassigned,
    Labeled,
    Unlabeled,
    Opened,
    Edited,
    Closed,
    Reopened,
    Synchronize,
    ConvertedToDraft,
    ReadyForReview,
    Locked,
    Unlocked,
    ReviewRequested,
    ReviewRequestRemoved,
    AutoMergeEnabled,
    AutoMergeDisabled,
}

/// Filters for the `pull_request` and `pull_request_target` events
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PullRequestEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<PullRequestActivity>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "branches-ignore")]
    pub branches_ignore: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "paths-ignore")]
    pub paths_ignore: Option<Vec<String>>,
}

impl PullRequestEvent {
    pub fn types(mut self, types: impl IntoIterator<Item = PullRequestActivity>) -> Self {
        self.types = Some(types.into_iter().collect());
        self
    }

    pub fn branches<I, S>(mut self, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.branches = to_strings(branches);
        self
    }

    pub fn branches_ignore<I, S>(mut self, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.branches_ignore = to_strings(branches);
        self
    }

    pub fn paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths = to_strings(paths);
        self
    }

    pub fn paths_ignore<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths_ignore = to_strings(paths);
        self
    }

    /// Use these filters for `pull_request_target` instead of `pull_request`
    pub fn target(self) -> Trigger {
        Trigger::PullRequestTarget(self)
    }
}

impl Validate for PullRequestEvent {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        if let Some(types) = &self.types {
            crate::validation::check_non_empty_list(types, &path.clone().key("types"))?;
        }
        validate_filters(
            &self.branches,
            &self.branches_ignore,
            "branches",
            "branches-ignore",
            path,
        )?;
        validate_filters(&self.paths, &self.paths_ignore, "paths", "paths-ignore", path)
    }
}

impl From<PullRequestEvent> for Trigger {
    fn from(event: PullRequestEvent) -> Self {
        Trigger::PullRequest(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    String,
    Choice,
    Boolean,
    Number,
    Environment,
}

/// A parameter shown in the "Run workflow" form or passed by a caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Input {
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "type")]
    pub input_type: Option<InputType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl Input {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            required: None,
            default: None,
            input_type: None,
            options: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn input_type(mut self, input_type: InputType) -> Self {
        self.input_type = Some(input_type);
        self
    }

    /// Choices for an input of type `choice`
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = to_strings(options);
        self
    }
}

impl Validate for Input {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        check_non_empty(&self.description, &path.clone().key("description"))?;
        match (self.input_type, &self.options) {
            (Some(InputType::Choice), None) => Err(ValidationError::new(
                path.clone().key("options"),
                Constraint::Invalid {
                    reason: "is required for inputs of type `choice`",
                },
            )),
            (Some(InputType::Choice), Some(options)) => {
                check_globs(options, &path.clone().key("options"))
            }
            (_, Some(_)) => Err(ValidationError::new(
                path.clone().key("options"),
                Constraint::Invalid {
                    reason: "is only allowed for inputs of type `choice`",
                },
            )),
            (_, None) => Ok(()),
        }
    }
}

fn validate_inputs(
    inputs: &Option<OrderedMap<Input>>,
    path: &FieldPath,
) -> Result<(), ValidationError> {
    if let Some(inputs) = inputs {
        let inputs_path = path.clone().key("inputs");
        for (name, input) in inputs.iter() {
            check_non_empty(name, &inputs_path)?;
            input.validate(&inputs_path.clone().key(name))?;
        }
    }
    Ok(())
}

/// `workflow_dispatch`
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WorkflowDispatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<OrderedMap<Input>>,
}

impl WorkflowDispatch {
    pub fn input(mut self, name: impl Into<String>, input: Input) -> Self {
        self.inputs
            .get_or_insert_with(OrderedMap::new)
            .insert(name, input);
        self
    }
}

impl From<WorkflowDispatch> for Trigger {
    fn from(dispatch: WorkflowDispatch) -> Self {
        Trigger::Manual(dispatch)
    }
}

/// A secret a reusable workflow expects from its caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecretSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub required: bool,
}

/// `workflow_call`: lets other workflows run this one as a job
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WorkflowCall {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<OrderedMap<Input>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secrets: Option<OrderedMap<SecretSpec>>,
}

impl WorkflowCall {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, name: impl Into<String>, input: Input) -> Self {
        self.inputs
            .get_or_insert_with(OrderedMap::new)
            .insert(name, input);
        self
    }

    pub fn secret(mut self, name: impl Into<String>, required: bool) -> Self {
        self.secrets.get_or_insert_with(OrderedMap::new).insert(
            name,
            SecretSpec {
                description: None,
                required,
            },
        );
        self
    }
}

impl Validate for WorkflowCall {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        validate_inputs(&self.inputs, path)?;
        if let Some(secrets) = &self.secrets {
            for name in secrets.keys() {
                check_non_empty(name, &path.clone().key("secrets"))?;
            }
        }
        Ok(())
    }
}

impl From<WorkflowCall> for Trigger {
    fn from(call: WorkflowCall) -> Self {
        Trigger::WorkflowCall(call)
    }
}

/// Webhook events that take at most an activity `types` filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    BranchProtectionRule,
    CheckRun,
    CheckSuite,
    Create,
    Delete,
    Deployment,
    DeploymentStatus,
    Discussion,
    DiscussionComment,
    Fork,
    Gollum,
    IssueComment,
    Issues,
    Label,
    Member,
    MergeGroup,
    Milestone,
    PageBuild,
    Project,
    ProjectCard,
    ProjectColumn,
    Public,
    PullRequestReview,
    PullRequestReviewComment,
    RegistryPackage,
    Release,
    RepositoryDispatch,
    Status,
    Watch,
    WorkflowRun,
}

impl Event {
    pub fn name(self) -> &'static str {
        match self {
            Event::BranchProtectionRule => "branch_protection_rule",
            Event::CheckRun => "check_run",
            Event::CheckSuite => "check_suite",
            Event::Create => "create",
            Event::Delete => "delete",
            Event::Deployment => "deployment",
            Event::DeploymentStatus => "deployment_status",
            Event::Discussion => "discussion",
            Event::DiscussionComment => "discussion_comment",
            Event::Fork => "fork",
            Event::Gollum => "gollum",
            Event::IssueComment => "issue_comment",
            Event::Issues => "issues",
            Event::Label => "label",
            Event::Member => "member",
            Event::MergeGroup => "merge_group",
            Event::Milestone => "milestone",
            Event::PageBuild => "page_build",
            Event::Project => "project",
            Event::ProjectCard => "project_card",
            Event::ProjectColumn => "project_column",
            Event::Public => "public",
            Event::PullRequestReview => "pull_request_review",
            Event::PullRequestReviewComment => "pull_request_review_comment",
            Event::RegistryPackage => "registry_package",
            Event::Release => "release",
            Event::RepositoryDispatch => "repository_dispatch",
            Event::Status => "status",
            Event::Watch => "watch",
            Event::WorkflowRun => "workflow_run",
        }
    }
}

/// A webhook event with optional activity types
///
/// Serializes as `{}` when no filter is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEvent {
    #[serde(skip)]
    pub event: Event,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,

    /// Names of the workflows whose runs trigger `workflow_run`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflows: Option<Vec<String>>,
}

impl ActivityEvent {
    /// Activity types, e.g. `published` for `release`
    pub fn types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = to_strings(types);
        self
    }

    pub fn workflows<I, S>(mut self, workflows: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.workflows = to_strings(workflows);
        self
    }
}

impl Validate for ActivityEvent {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        if let Some(types) = &self.types {
            check_globs(types, &path.clone().key("types"))?;
        }
        let workflows_path = path.clone().key("workflows");
        match (self.event, &self.workflows) {
            (Event::WorkflowRun, Some(workflows)) => check_globs(workflows, &workflows_path),
            (Event::WorkflowRun, None) => {
                Err(ValidationError::new(workflows_path, Constraint::Required))
            }
            (_, Some(_)) => Err(ValidationError::new(
                workflows_path,
                Constraint::Invalid {
                    reason: "is only allowed for `workflow_run`",
                },
            )),
            (_, None) => Ok(()),
        }
    }
}

impl From<ActivityEvent> for Trigger {
    fn from(activity: ActivityEvent) -> Self {
        Trigger::Activity(activity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    fn on(triggers: &[Trigger]) -> Triggers {
        let mut on = Triggers::default();
        for trigger in triggers {
            on.push(trigger.clone());
        }
        on
    }

    #[test]
    fn test_activity_events_serialize_under_their_names() {
        let triggers = on(&[
            Trigger::event(Event::Release).types(["published"]).into(),
            Trigger::event(Event::WorkflowRun)
                .workflows(["CI"])
                .types(["completed"])
                .into(),
            Trigger::event(Event::Create).into(),
        ]);
        assert!(triggers.validate(&FieldPath::root().key("on")).is_ok());

        let yaml = serde_yaml::to_string(&triggers).unwrap();
        let doc: Value = serde_yaml::from_str(&yaml).unwrap();
        let keys: Vec<&str> = doc
            .as_mapping()
            .unwrap()
            .keys()
            .map(|k| k.as_str().unwrap())
            .collect();
        assert_eq!(keys, vec!["release", "workflow_run", "create"]);
        assert_eq!(doc["release"]["types"][0], Value::String("published".into()));
        assert_eq!(doc["workflow_run"]["workflows"][0], Value::String("CI".into()));
        assert!(doc["create"].as_mapping().unwrap().is_empty());
    }

    #[test]
    fn test_activity_types_must_not_be_empty() {
        let trigger: Trigger = Trigger::event(Event::Issues)
            .types(Vec::<String>::new())
            .into();
        let err = on(&[trigger])
            .validate(&FieldPath::root().key("on"))
            .unwrap_err();
        assert_eq!(err.path.to_string(), "on.issues.types");
        assert_eq!(err.constraint, Constraint::Empty);
    }

    #[test]
    fn test_workflow_run_needs_workflows() {
        let err = Trigger::from(Trigger::event(Event::WorkflowRun))
            .validate(&FieldPath::root().key("on").key("workflow_run"))
            .unwrap_err();
        assert_eq!(err.path.to_string(), "on.workflow_run.workflows");

        let err = Trigger::event(Event::Release)
            .workflows(["CI"])
            .validate(&FieldPath::root())
            .unwrap_err();
        assert!(matches!(err.constraint, Constraint::Invalid { .. }));
    }

    #[test]
    fn test_same_event_twice_rejected() {
        let err = on(&[
            Trigger::event(Event::Release).into(),
            Trigger::event(Event::Release).types(["created"]).into(),
        ])
        .validate(&FieldPath::root().key("on"))
        .unwrap_err();
        assert_eq!(
            err.constraint,
            Constraint::Duplicate {
                key: "release".to_string()
            }
        );
    }
}
