//! Policy promotion (spec §4.5): apply documented per-repo suppression
//! rules — e.g. "permit exec-bit writes in the git-hook installer path for
//! a specific tool/rule pair" — removing the matching issue and emitting a
//! synthetic [`Suppression`] in its place.

use crate::core::types::{Issue, Suppression};

/// One documented promotion rule: issues from `tool` with `rule_id`
/// (matched on `Issue.sub_category`, which carries the tool/rule tag) whose
/// file matches `path_prefix` are promoted rather than reported.
#[derive(Debug, Clone)]
pub struct PromotionRule {
    pub tool: String,
    pub rule_id: String,
    pub path_prefix: String,
    pub reason: String,
}

impl PromotionRule {
    fn matches(&self, issue: &Issue) -> bool {
        let tag = format!("{}({})", self.tool, self.rule_id);
        if issue.sub_category != tag && issue.sub_category != self.rule_id {
            return false;
        }
        issue.file.to_string_lossy().replace('\\', "/").starts_with(self.path_prefix.as_str())
    }

    fn promote(&self, issue: &Issue) -> Suppression {
        Suppression {
            tool: self.tool.clone(),
            rule_id: Some(self.rule_id.clone()),
            file: issue.file.clone(),
            line: issue.line,
            column: if issue.column == 0 { None } else { Some(issue.column) },
            syntax: String::new(),
            reason: Some(self.reason.clone()),
            severity: Some(issue.severity),
            age_days: None,
            author: None,
            commit: None,
            metadata: [("promoted_by".to_string(), "policy".to_string())].into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PromotionStats {
    pub promoted: usize,
}

/// Split `issues` into (kept issues, synthesized suppressions) by applying
/// every rule (spec §4.5). An issue matching more than one rule is
/// promoted once, using the first matching rule.
pub fn apply_promotions(
    issues: Vec<Issue>,
    rules: &[PromotionRule],
) -> (Vec<Issue>, Vec<Suppression>, PromotionStats) {
    let mut kept = Vec::with_capacity(issues.len());
    let mut promoted_suppressions = Vec::new();
    let mut stats = PromotionStats::default();

    for issue in issues {
        if let Some(rule) = rules.iter().find(|rule| rule.matches(&issue)) {
            promoted_suppressions.push(rule.promote(&issue));
            stats.promoted += 1;
        } else {
            kept.push(issue);
        }
    }

    (kept, promoted_suppressions, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Category, Severity};

    fn issue(file: &str, sub_category: &str) -> Issue {
        Issue::new(Category::Security, Severity::Medium, file, "m").with_sub_category(sub_category)
    }

    #[test]
    fn matching_issue_is_promoted_to_suppression() {
        let rules = vec![PromotionRule {
            tool: "gosec".to_string(),
            rule_id: "G302".to_string(),
            path_prefix: "scripts/githooks/".to_string(),
            reason: "exec bit required for installed hook".to_string(),
        }];
        let issues = vec![issue("scripts/githooks/install.go", "gosec(G302)")];
        let (kept, suppressions, stats) = apply_promotions(issues, &rules);
        assert!(kept.is_empty());
        assert_eq!(suppressions.len(), 1);
        assert_eq!(stats.promoted, 1);
        assert_eq!(suppressions[0].reason.as_deref(), Some("exec bit required for installed hook"));
    }

    #[test]
    fn non_matching_issue_is_kept() {
        let rules = vec![PromotionRule {
            tool: "gosec".to_string(),
            rule_id: "G302".to_string(),
            path_prefix: "scripts/githooks/".to_string(),
            reason: "r".to_string(),
        }];
        let issues = vec![issue("main.go", "gosec(G101)")];
        let (kept, suppressions, stats) = apply_promotions(issues, &rules);
        assert_eq!(kept.len(), 1);
        assert!(suppressions.is_empty());
        assert_eq!(stats.promoted, 0);
    }
}
