// ABOUTME: Plan validation and dependency checking
// ABOUTME: Reports structural errors and ordering hazards without reordering the plan

use petgraph::algo::tarjan_scc;
use petgraph::graph::NodeIndex;
use petgraph::Graph;
use std::collections::{HashMap, HashSet};

use super::definition::Plan;
use super::error::{ValidationError, ValidationWarning};

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub is_valid: bool,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            is_valid: true,
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Checks a plan against the authored-order execution model.
///
/// The executor never reorders tasks, so a dependency on a later task means
/// the dependent is always skipped. The validator flags that instead of
/// silently sorting the plan.
#[derive(Debug, Default)]
pub struct PlanValidator {
    known_agents: Option<HashSet<String>>,
    prior_results: HashSet<String>,
}

impl PlanValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_known_agents<I, S>(mut self, agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_agents = Some(agents.into_iter().map(Into::into).collect());
        self
    }

    /// Task ids that already completed before this plan runs (fix plans)
    pub fn with_prior_results<I, S>(mut self, task_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prior_results = task_ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self, plan: &Plan) -> ValidationReport {
        let mut report = ValidationReport::new();

        if plan.is_empty() {
            report.errors.push(ValidationError::EmptyPlan);
        }

        self.validate_tasks(plan, &mut report);
        self.validate_dependencies(plan, &mut report);
        self.detect_cycles(plan, &mut report);

        report.is_valid = report.errors.is_empty();
        report
    }

    fn validate_tasks(&self, plan: &Plan, report: &mut ValidationReport) {
        let mut seen = HashSet::new();

        for task in &plan.tasks {
            if !seen.insert(task.id.as_str()) {
                report.errors.push(ValidationError::DuplicateTask {
                    task: task.id.clone(),
                });
            }

            for (field, value) in [("agent", &task.agent), ("action", &task.action)] {
                if value.trim().is_empty() {
                    report.errors.push(ValidationError::EmptyField {
                        task: task.id.clone(),
                        field: field.to_string(),
                    });
                }
            }

            if let Some(ref agents) = self.known_agents {
                if !task.agent.is_empty() && !agents.contains(&task.agent) {
                    report.warnings.push(ValidationWarning::UnknownAgent {
                        task: task.id.clone(),
                        agent: task.agent.clone(),
                    });
                }
            }

            if self.prior_results.contains(&task.id) {
                report.warnings.push(ValidationWarning::ShadowsPriorResult {
                    task: task.id.clone(),
                });
            }
        }
    }

    fn validate_dependencies(&self, plan: &Plan, report: &mut ValidationReport) {
        let positions: HashMap<&str, usize> = plan
            .tasks
            .iter()
            .enumerate()
            .map(|(index, task)| (task.id.as_str(), index))
            .collect();

        for (index, task) in plan.tasks.iter().enumerate() {
            for dep in &task.depends_on {
                if dep == &task.id {
                    report.warnings.push(ValidationWarning::SelfDependency {
                        task: task.id.clone(),
                    });
                    continue;
                }

                match positions.get(dep.as_str()) {
                    Some(&dep_index) if dep_index > index => {
                        report.warnings.push(ValidationWarning::ForwardReference {
                            task: task.id.clone(),
                            dependency: dep.clone(),
                        });
                    }
                    Some(_) => {}
                    None if self.prior_results.contains(dep) => {}
                    None => {
                        report.warnings.push(ValidationWarning::UnknownDependency {
                            task: task.id.clone(),
                            dependency: dep.clone(),
                        });
                    }
                }
            }
        }
    }

    fn detect_cycles(&self, plan: &Plan, report: &mut ValidationReport) {
        let mut graph = Graph::<String, ()>::new();
        let mut node_map: HashMap<&str, NodeIndex> = HashMap::new();

        for task in &plan.tasks {
            node_map
                .entry(task.id.as_str())
                .or_insert_with(|| graph.add_node(task.id.clone()));
        }

        for task in &plan.tasks {
            let task_node = node_map[task.id.as_str()];
            for dep in &task.depends_on {
                if dep == &task.id {
                    continue;
                }
                if let Some(&dep_node) = node_map.get(dep.as_str()) {
                    graph.add_edge(dep_node, task_node, ());
                }
            }
        }

        for component in tarjan_scc(&graph) {
            if component.len() > 1 {
                let mut tasks: Vec<String> =
                    component.iter().map(|node| graph[*node].clone()).collect();
                tasks.sort();
                report
                    .warnings
                    .push(ValidationWarning::CircularDependency { tasks });
            }
        }
    }
}
