use petgraph::algo::{kosaraju_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::error::ExportError;
use crate::schema::Workflow;

/// Job dependencies of one workflow, checked for dangling `needs` and cycles
pub struct DependencyGraph {
    /// Edges point from a dependency to the job that needs it
    graph: DiGraph<String, ()>,
    /// Map from job id to graph node index
    node_map: HashMap<String, NodeIndex>,
    /// `needs` of each job, in declaration order
    needs: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Build the graph, failing on the first unknown dependency or any cycle
    pub fn new(workflow: &Workflow) -> Result<Self, ExportError> {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();
        let mut needs = HashMap::new();

        // First pass: one node per job, in declaration order
        for job_id in workflow.job_ids() {
            let node = graph.add_node(job_id.to_string());
            node_map.insert(job_id.to_string(), node);
        }

        // Second pass: edges from `needs`
        for (job_id, job) in workflow.jobs.iter() {
            let dependent_node = node_map[job_id];
            for dependency in job.needs() {
                let Some(&required_node) = node_map.get(dependency) else {
                    return Err(ExportError::UnknownDependency {
                        job: job_id.to_string(),
                        dependency: dependency.clone(),
                    });
                };
                graph.add_edge(required_node, dependent_node, ());
            }
            needs.insert(job_id.to_string(), job.needs().to_vec());
        }

        let dep_graph = Self {
            graph,
            node_map,
            needs,
        };

        if let Some(cycle) = dep_graph.find_cycle() {
            return Err(ExportError::DependencyCycle { jobs: cycle });
        }

        debug!(
            jobs = dep_graph.graph.node_count(),
            edges = dep_graph.graph.edge_count(),
            "Dependency graph is acyclic"
        );
        Ok(dep_graph)
    }

    /// The cycle through the earliest-declared job that is part of one
    ///
    /// Returned as a path `a, b, ..` where each job needs the next and the
    /// last needs the first.
    fn find_cycle(&self) -> Option<Vec<String>> {
        let start = kosaraju_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .filter_map(|scc| scc.into_iter().min())
            .min()?;

        let members: HashSet<NodeIndex> = kosaraju_scc(&self.graph)
            .into_iter()
            .find(|scc| scc.contains(&start))?
            .into_iter()
            .collect();

        let mut path: Vec<NodeIndex> = vec![start];
        let mut current = start;
        loop {
            let next = self.needs[&self.graph[current]]
                .iter()
                .map(|dep| self.node_map[dep])
                .find(|node| members.contains(node))?;
            if let Some(pos) = path.iter().position(|&node| node == next) {
                return Some(
                    path[pos..]
                        .iter()
                        .map(|&node| self.graph[node].clone())
                        .collect(),
                );
            }
            path.push(next);
            current = next;
        }
    }

    /// Job ids ordered so that every job comes after the jobs it needs
    pub fn topological_sort(&self) -> Result<Vec<String>, ExportError> {
        toposort(&self.graph, None)
            .map(|sorted| {
                sorted
                    .into_iter()
                    .map(|node| self.graph[node].clone())
                    .collect()
            })
            .map_err(|cycle| ExportError::DependencyCycle {
                jobs: vec![self.graph[cycle.node_id()].clone()],
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Job, Step, Trigger};

    fn job(needs: &[&str]) -> Job {
        Job::builder()
            .runs_on("ubuntu-latest")
            .needs(needs.iter().copied())
            .step(Step::run("true"))
            .build()
            .unwrap()
    }

    fn workflow(jobs: &[(&str, &[&str])]) -> Workflow {
        jobs.iter()
            .fold(
                Workflow::builder("test").on(Trigger::push()),
                |builder, (id, needs)| builder.job(*id, job(needs)),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_simple_dependency_chain() {
        let wf = workflow(&[("c", &["b"]), ("b", &["a"]), ("a", &[])]);
        let graph = DependencyGraph::new(&wf).unwrap();

        let sorted = graph.topological_sort().unwrap();
        let a_pos = sorted.iter().position(|j| j == "a").unwrap();
        let b_pos = sorted.iter().position(|j| j == "b").unwrap();
        let c_pos = sorted.iter().position(|j| j == "c").unwrap();
        assert!(a_pos < b_pos);
        assert!(b_pos < c_pos);
    }

    #[test]
    fn test_unknown_dependency() {
        let wf = workflow(&[("build", &[]), ("deploy", &["build", "test"])]);
        match DependencyGraph::new(&wf) {
            Err(ExportError::UnknownDependency { job, dependency }) => {
                assert_eq!(job, "deploy");
                assert_eq!(dependency, "test");
            }
            other => panic!("Expected unknown dependency, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_two_job_cycle() {
        let wf = workflow(&[("a", &["b"]), ("b", &["a"])]);
        match DependencyGraph::new(&wf) {
            Err(ExportError::DependencyCycle { jobs }) => assert_eq!(jobs, vec!["a", "b"]),
            other => panic!("Expected cycle, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_cycle_path_skips_jobs_outside_the_cycle() {
        let wf = workflow(&[
            ("setup", &[]),
            ("a", &["setup", "c"]),
            ("b", &["a"]),
            ("c", &["b"]),
            ("report", &["c"]),
        ]);
        match DependencyGraph::new(&wf) {
            Err(ExportError::DependencyCycle { jobs }) => assert_eq!(jobs, vec!["a", "c", "b"]),
            other => panic!("Expected cycle, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let wf = workflow(&[("loop", &["loop"])]);
        match DependencyGraph::new(&wf) {
            Err(ExportError::DependencyCycle { jobs }) => assert_eq!(jobs, vec!["loop"]),
            other => panic!("Expected cycle, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_multiple_dependencies() {
        let wf = workflow(&[
            ("setup", &[]),
            ("install_gems", &["setup"]),
            ("install_npm", &["setup"]),
            ("test", &["install_gems", "install_npm"]),
        ]);
        let graph = DependencyGraph::new(&wf).unwrap();

        let sorted = graph.topological_sort().unwrap();
        let pos = |job: &str| sorted.iter().position(|j| j == job).unwrap();
        assert_eq!(sorted.len(), 4);
        assert!(pos("setup") < pos("install_gems"));
        assert!(pos("setup") < pos("install_npm"));
        assert!(pos("install_gems") < pos("test"));
        assert!(pos("install_npm") < pos("test"));
    }
}
