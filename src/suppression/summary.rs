//! Quantified suppression summary (spec §4.6, §8).

use crate::core::types::{Severity, Suppression};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

const TOP_K: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SuppressionSummary {
    pub total: usize,
    pub by_tool: HashMap<String, usize>,
    pub by_severity: HashMap<Severity, usize>,
    pub by_rule: HashMap<String, usize>,
    pub by_file: HashMap<PathBuf, usize>,
    pub by_rule_files: HashMap<String, Vec<PathBuf>>,
    pub top_rules: Vec<NamedCount>,
    pub top_files: Vec<NamedCount>,
    pub with_reason: usize,
    pub without_reason: usize,
    pub average_age_days: Option<f64>,
    pub oldest_days: Option<u64>,
    pub newest_days: Option<u64>,
}

fn top_k(counts: &HashMap<String, usize>, k: usize) -> Vec<NamedCount> {
    let mut entries: Vec<NamedCount> = counts
        .iter()
        .map(|(name, count)| NamedCount {
            name: name.clone(),
            count: *count,
        })
        .collect();
    // Descending by count, ties broken lexicographically by name (spec §4.6).
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    entries.truncate(k);
    entries
}

/// `GenerateSummary(suppressions)` (spec §4.6). Deterministic regardless of
/// input permutation except for tied top-k ordering, which breaks by name.
pub fn generate_summary(suppressions: &[Suppression]) -> SuppressionSummary {
    let mut summary = SuppressionSummary {
        total: suppressions.len(),
        ..Default::default()
    };

    let mut rule_file_seen: HashMap<String, Vec<PathBuf>> = HashMap::new();
    let mut ages: Vec<u64> = Vec::new();

    for suppression in suppressions {
        *summary.by_tool.entry(suppression.tool.clone()).or_insert(0) += 1;
        if let Some(severity) = suppression.severity {
            *summary.by_severity.entry(severity).or_insert(0) += 1;
        }
        if let Some(rule) = &suppression.rule_id {
            *summary.by_rule.entry(rule.clone()).or_insert(0) += 1;
            let files = rule_file_seen.entry(rule.clone()).or_default();
            if !files.contains(&suppression.file) {
                files.push(suppression.file.clone());
            }
        }
        *summary.by_file.entry(suppression.file.clone()).or_insert(0) += 1;

        if suppression.reason.is_some() {
            summary.with_reason += 1;
        } else {
            summary.without_reason += 1;
        }

        if let Some(age) = suppression.age_days {
            ages.push(age);
        }
    }

    for files in rule_file_seen.values_mut() {
        files.sort();
    }
    summary.by_rule_files = rule_file_seen;

    summary.top_rules = top_k(&summary.by_rule, TOP_K);
    let by_file_str: HashMap<String, usize> = summary
        .by_file
        .iter()
        .map(|(path, count)| (path.to_string_lossy().into_owned(), *count))
        .collect();
    summary.top_files = top_k(&by_file_str, TOP_K);

    if !ages.is_empty() {
        let sum: u64 = ages.iter().sum();
        summary.average_age_days = Some(sum as f64 / ages.len() as f64);
        summary.oldest_days = ages.iter().max().copied();
        summary.newest_days = ages.iter().min().copied();
    }

    summary
}
