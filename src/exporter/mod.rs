//! Workflow to YAML
//!
//! Every entry point re-checks the workflow and its job dependencies first,
//! so an invalid record, a dangling `needs` or a cycle never produces output.
mod atomic;

#[cfg(test)]
mod tests;

use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{ExportError, FieldPath};
use crate::graph::DependencyGraph;
use crate::schema::Workflow;
use crate::validation::Validate;

pub use atomic::atomic_write;

/// Render the workflow as a YAML document
///
/// The same workflow always renders to the same bytes.
pub fn to_yaml_string(workflow: &Workflow) -> Result<String, ExportError> {
    check_dependencies(workflow)?;
    Ok(serde_yaml::to_string(workflow)?)
}

/// Render the workflow into any writer
pub fn to_writer<W: Write>(workflow: &Workflow, writer: W) -> Result<(), ExportError> {
    check_dependencies(workflow)?;
    serde_yaml::to_writer(writer, workflow)?;
    Ok(())
}

/// Render the workflow and replace `path` with the result
///
/// Missing parent directories are created. On any error the previous
/// contents of `path`, if there were any, stay untouched.
pub fn write_to_path(workflow: &Workflow, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    let yaml = to_yaml_string(workflow)?;
    atomic_write(path, yaml.as_bytes())?;

    info!(
        workflow = %workflow.name,
        jobs = workflow.jobs.len(),
        "Wrote workflow to {}",
        path.display()
    );
    Ok(())
}

fn check_dependencies(workflow: &Workflow) -> Result<(), ExportError> {
    // The tree may have been assembled without a builder
    workflow.validate(&FieldPath::root())?;

    let graph = DependencyGraph::new(workflow)?;
    let order = graph.topological_sort()?;
    debug!(?order, "Job execution order");
    Ok(())
}
