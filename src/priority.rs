//! Default + user-overridable category ordering (spec §4.2).

use crate::core::types::Category;
use crate::errors::ConfigError;
use std::collections::HashMap;
use std::str::FromStr;

/// Default priorities (lower = earlier phase). Categories not listed here
/// default to 999 (spec §4.2).
fn default_priority(category: Category) -> i32 {
    match category {
        Category::Format => 1,
        Category::Security => 2,
        Category::StaticAnalysis => 3,
        Category::Lint => 4,
        Category::Performance => 5,
        _ => 999,
    }
}

/// Named priority levels accepted in an override token (spec §4.2).
fn named_priority(name: &str) -> Option<i32> {
    match name {
        "highest" => Some(1),
        "high" => Some(2),
        "medium" => Some(3),
        "low" => Some(4),
        "lowest" => Some(5),
        _ => None,
    }
}

/// Resolves the effective priority of every category, honoring an optional
/// user override string, and produces deterministic orderings (spec §4.2).
#[derive(Debug, Clone, Default)]
pub struct PriorityManager {
    overrides: HashMap<Category, i32>,
}

impl PriorityManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated `category=N|name` string (or
    /// `category=default` to reset a prior override). An invalid token is a
    /// fatal [`ConfigError`] (spec §4.2, §7).
    pub fn parse(priority_string: &str) -> Result<Self, ConfigError> {
        let mut overrides = HashMap::new();
        for raw_token in priority_string.split(',') {
            let token = raw_token.trim();
            if token.is_empty() {
                continue;
            }
            let (cat_str, value_str) = token
                .split_once('=')
                .ok_or_else(|| ConfigError::InvalidPriorityToken(token.to_string()))?;
            let category = Category::from_str(cat_str.trim())?;
            let value_str = value_str.trim();
            if value_str.eq_ignore_ascii_case("default") {
                overrides.remove(&category);
                continue;
            }
            let value = if let Ok(n) = value_str.parse::<i32>() {
                n
            } else if let Some(n) = named_priority(value_str) {
                n
            } else {
                return Err(ConfigError::InvalidPriorityToken(token.to_string()));
            };
            overrides.insert(category, value);
        }
        Ok(Self { overrides })
    }

    pub fn priority_of(&self, category: Category) -> i32 {
        self.overrides
            .get(&category)
            .copied()
            .unwrap_or_else(|| default_priority(category))
    }

    /// Deterministic ascending sort by priority, ties broken by category
    /// name (spec §4.2).
    pub fn ordered(&self, categories: &[Category]) -> Vec<Category> {
        let mut ordered: Vec<Category> = categories.to_vec();
        ordered.sort_by(|a, b| {
            self.priority_of(*a)
                .cmp(&self.priority_of(*b))
                .then_with(|| a.as_str().cmp(b.as_str()))
        });
        ordered
    }
}
