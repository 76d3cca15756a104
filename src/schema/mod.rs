//! Typed model of a GitHub Actions workflow
//!
//! Records are assembled with builders; `build()` checks required fields and
//! value constraints and reports the offending field path.
mod container;
mod job;
mod ordered;
mod settings;
mod step;
mod strategy;
mod trigger;
mod value;
mod workflow;

pub use container::{Container, Credentials, JobContainer};
pub use job::{
    Environment, Job, JobBuilder, JobEntry, JobSpec, ReusableJob, ReusableJobBuilder, RunsOn,
    Secrets,
};
pub use ordered::OrderedMap;
pub use settings::{
    Concurrency, Defaults, PermissionLevel, PermissionScope, Permissions, RunDefaults,
};
pub use step::{Shell, Step, StepAction};
pub use strategy::{Matrix, Strategy};
pub use trigger::{
    ActivityEvent, Event, Input, InputType, PullRequestActivity, PullRequestEvent, PushEvent,
    SecretSpec, Trigger, Triggers, WorkflowCall, WorkflowDispatch,
};
pub use value::{BoolOrExpression, Scalar};
pub use workflow::{Workflow, WorkflowBuilder};
