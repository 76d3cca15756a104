use serde::Serialize;

use super::job::{JobEntry, JobSpec};
use super::ordered::OrderedMap;
use super::settings::{Concurrency, Defaults, Permissions};
use super::trigger::{Trigger, Triggers};
use super::value::Scalar;
use crate::error::{Constraint, FieldPath, ValidationError};
use crate::validation::{Validate, check_job_id, check_non_empty};

/// A complete GitHub Actions workflow file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workflow {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none", rename = "run-name")]
    pub run_name: Option<String>,

    pub on: Triggers,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<OrderedMap<Scalar>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Defaults>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<Concurrency>,

    pub jobs: OrderedMap<JobEntry>,
}

impl Workflow {
    pub fn builder(name: impl Into<String>) -> WorkflowBuilder {
        WorkflowBuilder {
            name: name.into(),
            run_name: None,
            on: Triggers::default(),
            permissions: None,
            env: None,
            defaults: None,
            concurrency: None,
            jobs: Vec::new(),
        }
    }

    /// Job ids in declaration order
    pub fn job_ids(&self) -> impl Iterator<Item = &str> {
        self.jobs.keys()
    }
}

impl Validate for Workflow {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        check_non_empty(&self.name, &path.clone().key("name"))?;
        if let Some(run_name) = &self.run_name {
            check_non_empty(run_name, &path.clone().key("run-name"))?;
        }
        self.on.validate(&path.clone().key("on"))?;
        self.concurrency.validate(&path.clone().key("concurrency"))?;
        let jobs_path = path.clone().key("jobs");
        if self.jobs.is_empty() {
            return Err(ValidationError::new(jobs_path, Constraint::Empty));
        }
        for (id, job) in self.jobs.iter() {
            let job_path = jobs_path.clone().key(id);
            check_job_id(id, &job_path)?;
            job.validate(&job_path)?;
        }
        Ok(())
    }
}

/// Collects workflow fields and jobs; `build()` checks the whole tree
#[derive(Debug, Clone)]
pub struct WorkflowBuilder {
    name: String,
    run_name: Option<String>,
    on: Triggers,
    permissions: Option<Permissions>,
    env: Option<OrderedMap<Scalar>>,
    defaults: Option<Defaults>,
    concurrency: Option<Concurrency>,
    jobs: Vec<(String, JobSpec)>,
}

impl WorkflowBuilder {
    /// Name shown for each run, may contain expressions
    pub fn run_name(mut self, run_name: impl Into<String>) -> Self {
        self.run_name = Some(run_name.into());
        self
    }

    /// Add a trigger under `on:`
    pub fn on(mut self, trigger: impl Into<Trigger>) -> Self {
        self.on.push(trigger.into());
        self
    }

    pub fn permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Some(permissions);
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

    pub fn concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Add a job under `id`; jobs keep the order they are added in
    pub fn job(mut self, id: impl Into<String>, job: impl Into<JobSpec>) -> Self {
        self.jobs.push((id.into(), job.into()));
        self
    }

    pub fn build(self) -> Result<Workflow, ValidationError> {
        let jobs_path = FieldPath::root().key("jobs");
        let mut jobs = OrderedMap::new();
        for (id, spec) in self.jobs {
            let job_path = jobs_path.clone().key(&id);
            check_job_id(&id, &job_path)?;
            if jobs.contains_key(&id) {
                return Err(ValidationError::new(
                    jobs_path.clone(),
                    Constraint::Duplicate { key: id },
                ));
            }
            let entry = spec.build().map_err(|e| e.within(&job_path))?;
            jobs.insert(id, entry);
        }

        let workflow = Workflow {
            name: self.name,
            run_name: self.run_name,
            on: self.on,
            permissions: self.permissions,
            env: self.env,
            defaults: self.defaults,
            concurrency: self.concurrency,
            jobs,
        };
        workflow.validate(&FieldPath::root())?;
        Ok(workflow)
    }
}
