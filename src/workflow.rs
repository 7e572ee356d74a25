//! Groups issues into priority-ordered phases with per-file parallel groups
//! (spec §4.3 step 8, §4.7, §8).

use crate::core::types::{Category, CategoryStatus, Issue, Phase, ParallelGroup, WorkflowPlan};
use std::collections::HashMap;
use std::time::Duration;

/// One category's contribution to the plan: its priority and the issues it
/// produced. Built by the orchestrator from its `categoryResults`.
pub struct CategoryContribution<'a> {
    pub category: Category,
    pub priority: i32,
    pub status: CategoryStatus,
    pub issues: &'a [Issue],
}

/// Build the [`WorkflowPlan`] from every category's contribution
/// (spec §4.3 step 8). Only categories with at least one issue produce a
/// phase entry; phases are strictly ascending by priority, matching
/// spec §8's "phases is strictly increasing in priority" property.
pub fn plan(contributions: &[CategoryContribution<'_>]) -> WorkflowPlan {
    let mut by_priority: HashMap<i32, Vec<&CategoryContribution<'_>>> = HashMap::new();
    for contribution in contributions {
        if contribution.status != CategoryStatus::Success || contribution.issues.is_empty() {
            continue;
        }
        by_priority.entry(contribution.priority).or_default().push(contribution);
    }

    let mut priorities: Vec<i32> = by_priority.keys().copied().collect();
    priorities.sort_unstable();

    let mut phases = Vec::with_capacity(priorities.len());
    let mut total_time = Duration::ZERO;

    for priority in priorities {
        let mut contributions = by_priority.remove(&priority).unwrap_or_default();
        contributions.sort_by_key(|c| c.category.as_str());

        let mut categories = Vec::with_capacity(contributions.len());
        let mut estimated_time = Duration::ZERO;
        let mut groups_by_file: HashMap<std::path::PathBuf, usize> = HashMap::new();

        for contribution in &contributions {
            categories.push(contribution.category);
            for issue in contribution.issues {
                estimated_time += issue.effective_estimate();
                *groups_by_file.entry(issue.file.clone()).or_insert(0) += 1;
            }
        }

        // A file becomes a parallel group only once it has more than one
        // issue in this phase (spec §4.7).
        let mut parallel_groups: Vec<ParallelGroup> = groups_by_file
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(file, issue_count)| ParallelGroup { file, issue_count })
            .collect();
        parallel_groups.sort_by(|a, b| a.file.cmp(&b.file));

        let description = describe_phase(priority, &categories);
        total_time += estimated_time;

        phases.push(Phase {
            priority,
            categories,
            description,
            estimated_time,
            parallel_groups,
        });
    }

    WorkflowPlan { phases, total_time }
}

fn describe_phase(priority: i32, categories: &[Category]) -> String {
    let names: Vec<&str> = categories.iter().map(|c| c.as_str()).collect();
    format!("Priority {priority}: {}", names.join(", "))
}
