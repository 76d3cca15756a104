use serde::Serialize;
use serde::ser::Serializer;

use super::container::{Container, JobContainer};
use super::ordered::OrderedMap;
use super::settings::{Concurrency, Defaults, Permissions};
use super::step::Step;
use super::strategy::Strategy;
use super::value::{BoolOrExpression, Scalar};
use crate::error::{Constraint, FieldPath, ValidationError};
use crate::validation::{
    Validate, check_bool_or_expression, check_job_id, check_min, check_non_empty,
    check_non_empty_list, check_reusable_workflow, require,
};

/// Runner selection for `runs-on`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RunsOn {
    Label(String),
    Labels(Vec<String>),
    Group {
        group: String,

        #[serde(skip_serializing_if = "Option::is_none")]
        labels: Option<Vec<String>>,
    },
}

impl RunsOn {
    /// Every label must match, e.g. `["self-hosted", "linux"]`
    pub fn labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RunsOn::Labels(labels.into_iter().map(Into::into).collect())
    }

    pub fn group(group: impl Into<String>) -> Self {
        RunsOn::Group {
            group: group.into(),
            labels: None,
        }
    }
}

impl From<&str> for RunsOn {
    fn from(label: &str) -> Self {
        RunsOn::Label(label.to_string())
    }
}

impl From<String> for RunsOn {
    fn from(label: String) -> Self {
        RunsOn::Label(label)
    }
}

impl Validate for RunsOn {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        match self {
            RunsOn::Label(label) => check_non_empty(label, path),
            RunsOn::Labels(labels) => {
                check_non_empty_list(labels, path)?;
                for (i, label) in labels.iter().enumerate() {
                    check_non_empty(label, &path.clone().index(i))?;
                }
                Ok(())
            }
            RunsOn::Group { group, .. } => check_non_empty(group, &path.clone().key("group")),
        }
    }
}

/// Deployment environment a job targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Environment {
    Name(String),
    Detailed {
        name: String,

        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

impl Environment {
    pub fn with_url(name: impl Into<String>, url: impl Into<String>) -> Self {
        Environment::Detailed {
            name: name.into(),
            url: Some(url.into()),
        }
    }
}

impl From<&str> for Environment {
    fn from(name: &str) -> Self {
        Environment::Name(name.to_string())
    }
}

impl Validate for Environment {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        match self {
            Environment::Name(name) => check_non_empty(name, path),
            Environment::Detailed { name, .. } => check_non_empty(name, &path.clone().key("name")),
        }
    }
}

fn validate_needs(needs: &[String], path: &FieldPath) -> Result<(), ValidationError> {
    for (i, need) in needs.iter().enumerate() {
        let need_path = path.clone().index(i);
        check_job_id(need, &need_path)?;
        if needs[..i].contains(need) {
            return Err(ValidationError::new(
                need_path,
                Constraint::Duplicate { key: need.clone() },
            ));
        }
    }
    Ok(())
}

fn validate_steps(steps: &[Step], path: &FieldPath) -> Result<(), ValidationError> {
    check_non_empty_list(steps, path)?;
    for (i, step) in steps.iter().enumerate() {
        let step_path = path.clone().index(i);
        step.validate(&step_path)?;
        if let Some(id) = &step.id
            && steps[..i].iter().any(|s| s.id.as_ref() == Some(id))
        {
            return Err(ValidationError::new(
                step_path.key("id"),
                Constraint::Duplicate { key: id.clone() },
            ));
        }
    }
    Ok(())
}

/// A job that runs steps on a runner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub needs: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "if")]
    pub condition: Option<String>,

    #[serde(rename = "runs-on")]
    pub runs_on: RunsOn,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<Concurrency>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<JobContainer>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<OrderedMap<Container>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<OrderedMap<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<OrderedMap<Scalar>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Defaults>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "timeout-minutes")]
    pub timeout_minutes: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "continue-on-error")]
    pub continue_on_error: Option<BoolOrExpression>,

    pub steps: Vec<Step>,
}

impl Job {
    pub fn builder() -> JobBuilder {
        JobBuilder::default()
    }
}

impl Validate for Job {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            check_non_empty(name, &path.clone().key("name"))?;
        }
        validate_needs(&self.needs, &path.clone().key("needs"))?;
        if let Some(condition) = &self.condition {
            check_non_empty(condition, &path.clone().key("if"))?;
        }
        self.runs_on.validate(&path.clone().key("runs-on"))?;
        self.environment.validate(&path.clone().key("environment"))?;
        self.concurrency.validate(&path.clone().key("concurrency"))?;
        self.strategy.validate(&path.clone().key("strategy"))?;
        self.container.validate(&path.clone().key("container"))?;
        if let Some(services) = &self.services {
            for (name, service) in services.iter() {
                let service_path = path.clone().key("services").key(name);
                check_non_empty(name, &service_path)?;
                service.validate(&service_path)?;
            }
        }
        if let Some(outputs) = &self.outputs {
            for (name, value) in outputs.iter() {
                check_non_empty(value, &path.clone().key("outputs").key(name))?;
            }
        }
        if let Some(minutes) = self.timeout_minutes {
            check_min(u64::from(minutes), 1, &path.clone().key("timeout-minutes"))?;
        }
        if let Some(value) = &self.continue_on_error {
            check_bool_or_expression(value, &path.clone().key("continue-on-error"))?;
        }
        validate_steps(&self.steps, &path.clone().key("steps"))
    }
}

/// Collects job fields; `build()` checks them
#[derive(Debug, Clone, Default)]
pub struct JobBuilder {
    name: Option<String>,
    needs: Vec<String>,
    condition: Option<String>,
    runs_on: Option<RunsOn>,
    permissions: Option<Permissions>,
    environment: Option<Environment>,
    concurrency: Option<Concurrency>,
    strategy: Option<Strategy>,
    container: Option<JobContainer>,
    services: Option<OrderedMap<Container>>,
    outputs: Option<OrderedMap<String>>,
    env: Option<OrderedMap<Scalar>>,
    defaults: Option<Defaults>,
    timeout_minutes: Option<u32>,
    continue_on_error: Option<BoolOrExpression>,
    steps: Vec<Step>,
}

impl JobBuilder {
    /// Display name; GitHub falls back to the job id
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Ids of jobs that must succeed first
    pub fn needs<I, S>(mut self, jobs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.needs.extend(jobs.into_iter().map(Into::into));
        self
    }

    /// Expression copied verbatim into `if:`
    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn runs_on(mut self, runs_on: impl Into<RunsOn>) -> Self {
        self.runs_on = Some(runs_on.into());
        self
    }

    pub fn permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    pub fn environment(mut self, environment: impl Into<Environment>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// An image name, or a `Container` for credentials, ports and the rest
    pub fn container(mut self, container: impl Into<JobContainer>) -> Self {
        self.container = Some(container.into());
        self
    }

    pub fn service(mut self, name: impl Into<String>, container: Container) -> Self {
        self.services
            .get_or_insert_with(OrderedMap::new)
            .insert(name, container);
        self
    }

    pub fn output(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.outputs
            .get_or_insert_with(OrderedMap::new)
            .insert(name, value.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.env
            .get_or_insert_with(OrderedMap::new)
            .insert(key, value.into());
        self
    }

    pub fn defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn timeout_minutes(mut self, minutes: u32) -> Self {
        self.timeout_minutes = Some(minutes);
        self
    }

    pub fn continue_on_error(mut self, value: impl Into<BoolOrExpression>) -> Self {
        self.continue_on_error = Some(value.into());
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Append several steps, e.g. a shared setup sequence
    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    pub fn build(self) -> Result<Job, ValidationError> {
        let root = FieldPath::root();
        let job = Job {
            name: self.name,
            needs: self.needs,
            condition: self.condition,
            runs_on: require(self.runs_on, &root.clone().key("runs-on"))?,
            permissions: self.permissions,
            environment: self.environment,
            concurrency: self.concurrency,
            strategy: self.strategy,
            container: self.container,
            services: self.services,
            outputs: self.outputs,
            env: self.env,
            defaults: self.defaults,
            timeout_minutes: self.timeout_minutes,
            continue_on_error: self.continue_on_error,
            steps: self.steps,
        };
        job.validate(&root)?;
        Ok(job)
    }
}

/// Secrets handed to a called workflow
#[derive(Debug, Clone, PartialEq)]
pub enum Secrets {
    Inherit,
    Map(OrderedMap<String>),
}

impl Serialize for Secrets {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Secrets::Inherit => serializer.serialize_str("inherit"),
            Secrets::Map(map) => map.serialize(serializer),
        }
    }
}

/// A job that calls a reusable workflow instead of running steps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReusableJob {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub needs: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "if")]
    pub condition: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<Concurrency>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,

    pub uses: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub with: Option<OrderedMap<Scalar>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secrets: Option<Secrets>,
}

impl ReusableJob {
    pub fn builder() -> ReusableJobBuilder {
        ReusableJobBuilder::default()
    }
}

impl Validate for ReusableJob {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            check_non_empty(name, &path.clone().key("name"))?;
        }
        validate_needs(&self.needs, &path.clone().key("needs"))?;
        if let Some(condition) = &self.condition {
            check_non_empty(condition, &path.clone().key("if"))?;
        }
        self.concurrency.validate(&path.clone().key("concurrency"))?;
        self.strategy.validate(&path.clone().key("strategy"))?;
        check_reusable_workflow(&self.uses, &path.clone().key("uses"))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReusableJobBuilder {
    name: Option<String>,
    needs: Vec<String>,
    condition: Option<String>,
    permissions: Option<Permissions>,
    concurrency: Option<Concurrency>,
    strategy: Option<Strategy>,
    uses: Option<String>,
    with: Option<OrderedMap<Scalar>>,
    secrets: Option<Secrets>,
}

impl ReusableJobBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn needs<I, S>(mut self, jobs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.needs.extend(jobs.into_iter().map(Into::into));
        self
    }

    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    pub fn concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// `./.github/workflows/x.yml` or `owner/repo/.github/workflows/x.yml@ref`
    pub fn uses(mut self, workflow: impl Into<String>) -> Self {
        self.uses = Some(workflow.into());
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.with
            .get_or_insert_with(OrderedMap::new)
            .insert(key, value.into());
        self
    }

    pub fn inherit_secrets(mut self) -> Self {
        self.secrets = Some(Secrets::Inherit);
        self
    }

    pub fn secret(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut map = match self.secrets.take() {
            Some(Secrets::Map(map)) => map,
            Some(Secrets::Inherit) | None => OrderedMap::new(),
        };
        map.insert(name, value.into());
        self.secrets = Some(Secrets::Map(map));
        self
    }

    pub fn build(self) -> Result<ReusableJob, ValidationError> {
        let root = FieldPath::root();
        let job = ReusableJob {
            name: self.name,
            needs: self.needs,
            condition: self.condition,
            permissions: self.permissions,
            concurrency: self.concurrency,
            strategy: self.strategy,
            uses: require(self.uses, &root.clone().key("uses"))?,
            with: self.with,
            secrets: self.secrets,
        };
        job.validate(&root)?;
        Ok(job)
    }
}

/// An entry under `jobs:`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobEntry {
    Run(Job),
    Call(ReusableJob),
}

impl JobEntry {
    pub fn needs(&self) -> &[String] {
        match self {
            JobEntry::Run(job) => &job.needs,
            JobEntry::Call(job) => &job.needs,
        }
    }

    pub fn steps(&self) -> &[Step] {
        match self {
            JobEntry::Run(job) => &job.steps,
            JobEntry::Call(_) => &[],
        }
    }
}

impl Validate for JobEntry {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        match self {
            JobEntry::Run(job) => job.validate(path),
            JobEntry::Call(job) => job.validate(path),
        }
    }
}

/// Anything `WorkflowBuilder::job` accepts
///
/// Builders are finished inside `WorkflowBuilder::build`, so their errors
/// carry the `jobs.<id>` prefix.
#[derive(Debug, Clone)]
pub enum JobSpec {
    Built(JobEntry),
    Job(JobBuilder),
    Reusable(ReusableJobBuilder),
}

impl JobSpec {
    pub(crate) fn build(self) -> Result<JobEntry, ValidationError> {
        match self {
            JobSpec::Built(entry) => {
                entry.validate(&FieldPath::root())?;
                Ok(entry)
            }
            JobSpec::Job(builder) => builder.build().map(JobEntry::Run),
            JobSpec::Reusable(builder) => builder.build().map(JobEntry::Call),
        }
    }
}

impl From<Job> for JobSpec {
    fn from(job: Job) -> Self {
        JobSpec::Built(JobEntry::Run(job))
    }
}

impl From<ReusableJob> for JobSpec {
    fn from(job: ReusableJob) -> Self {
        JobSpec::Built(JobEntry::Call(job))
    }
}

impl From<JobBuilder> for JobSpec {
    fn from(builder: JobBuilder) -> Self {
        JobSpec::Job(builder)
    }
}

impl From<ReusableJobBuilder> for JobSpec {
    fn from(builder: ReusableJobBuilder) -> Self {
        JobSpec::Reusable(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Matrix, Shell};

    #[test]
    fn test_runs_on_is_required() {
        let err = Job::builder()
            .step(Step::run("make test"))
            .build()
            .unwrap_err();
        assert_eq!(err.path.to_string(), "runs-on");
        assert_eq!(err.constraint, Constraint::Required);
    }

    #[test]
    fn test_steps_must_not_be_empty() {
        let err = Job::builder().runs_on("ubuntu-latest").build().unwrap_err();
        assert_eq!(err.path.to_string(), "steps");
        assert_eq!(err.constraint, Constraint::Empty);
    }

    #[test]
    fn test_needs_must_be_job_ids() {
        let err = Job::builder()
            .runs_on("ubuntu-latest")
            .needs(["build", "not a job"])
            .step(Step::run("make"))
            .build()
            .unwrap_err();
        assert_eq!(err.path.to_string(), "needs[1]");
        assert!(matches!(err.constraint, Constraint::Pattern { .. }));
    }

    #[test]
    fn test_duplicate_step_ids_rejected() {
        let err = Job::builder()
            .runs_on("ubuntu-latest")
            .step(Step::run("a").id("build"))
            .step(Step::run("b").id("build"))
            .build()
            .unwrap_err();
        assert_eq!(err.path.to_string(), "steps[1].id");
    }

    #[test]
    fn test_job_key_order() {
        let job = Job::builder()
            .name("Test")
            .needs(["lint"])
            .runs_on("ubuntu-latest")
            .strategy(Strategy::matrix(Matrix::new().axis("python", ["3.12"])))
            .step(Step::run("pytest").shell(Shell::Bash))
            .build()
            .unwrap();
        let yaml = serde_yaml::to_string(&job).unwrap();
        assert_eq!(
            yaml,
            "name: Test\nneeds:\n- lint\nruns-on: ubuntu-latest\nstrategy:\n  matrix:\n    python:\n    - '3.12'\nsteps:\n- run: pytest\n  shell: bash\n"
        );
    }

    #[test]
    fn test_reusable_job_requires_uses() {
        let err = ReusableJob::builder().build().unwrap_err();
        assert_eq!(err.path.to_string(), "uses");

        let err = ReusableJob::builder()
            .uses("octo/repo/deploy")
            .build()
            .unwrap_err();
        assert!(matches!(err.constraint, Constraint::Pattern { .. }));

        let job = ReusableJob::builder()
            .uses("octo/repo/.github/workflows/deploy.yml@v1")
            .inherit_secrets()
            .build()
            .unwrap();
        let yaml = serde_yaml::to_string(&job).unwrap();
        assert!(yaml.contains("secrets: inherit"));
    }

    #[test]
    fn test_literal_job_is_checked_when_added() {
        let job = Job {
            name: None,
            needs: vec!["not a job id".to_string()],
            condition: None,
            runs_on: RunsOn::Label(String::new()),
            permissions: None,
            environment: None,
            concurrency: None,
            strategy: None,
            container: None,
            services: None,
            outputs: None,
            env: None,
            defaults: None,
            timeout_minutes: Some(0),
            continue_on_error: None,
            steps: Vec::new(),
        };
        let err = JobSpec::from(job).build().unwrap_err();
        assert_eq!(err.path.to_string(), "needs[0]");
    }

    #[test]
    fn test_container_image_shorthand() {
        let job = Job::builder()
            .runs_on("ubuntu-latest")
            .container("node:20")
            .step(Step::run("npm test"))
            .build()
            .unwrap();
        assert_eq!(job.container, Some(JobContainer::Image("node:20".to_string())));

        let err = Job::builder()
            .runs_on("ubuntu-latest")
            .container("")
            .step(Step::run("npm test"))
            .build()
            .unwrap_err();
        assert_eq!(err.path.to_string(), "container");
    }
}
