//! The security sub-orchestrator's own tool registry, separate from the
//! category [`crate::registry::Registry`] (spec §4.5).

use crate::core::traits::{SecurityTool, ToolDimension};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn SecurityTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn SecurityTool>) {
        self.tools.push(tool);
    }

    /// Adapter selection (spec §4.5): dimensions default to "all enabled if
    /// none selected"; a `name_filter`, if present, keeps only tools whose
    /// name matches (case-insensitive, trimmed); unavailable tools are
    /// dropped silently.
    pub fn select(
        &self,
        dimensions: Option<&[ToolDimension]>,
        name_filter: Option<&str>,
    ) -> Vec<Arc<dyn SecurityTool>> {
        let normalized_filter = name_filter.map(|n| n.trim().to_lowercase());
        self.tools
            .iter()
            .filter(|tool| dimensions.is_none_or(|dims| dims.contains(&tool.dimension())))
            .filter(|tool| {
                normalized_filter
                    .as_ref()
                    .is_none_or(|filter| tool.name().trim().to_lowercase() == *filter)
            })
            .filter(|tool| tool.is_available())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::CancellationToken;
    use crate::core::types::Issue;
    use crate::errors::CoreError;
    use std::path::Path;

    struct StubTool {
        name: &'static str,
        dimension: ToolDimension,
        available: bool,
    }

    impl SecurityTool for StubTool {
        fn name(&self) -> &str {
            self.name
        }
        fn dimension(&self) -> ToolDimension {
            self.dimension
        }
        fn is_available(&self) -> bool {
            self.available
        }
        fn run(&self, _cancel: &CancellationToken, _target: &Path) -> Result<Vec<Issue>, CoreError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn defaults_to_all_enabled_dimensions() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(StubTool { name: "gosec", dimension: ToolDimension::Code, available: true }));
        registry.register(Arc::new(StubTool { name: "osv", dimension: ToolDimension::Vuln, available: true }));
        assert_eq!(registry.select(None, None).len(), 2);
    }

    #[test]
    fn dimension_filter_narrows_selection() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(StubTool { name: "gosec", dimension: ToolDimension::Code, available: true }));
        registry.register(Arc::new(StubTool { name: "osv", dimension: ToolDimension::Vuln, available: true }));
        let selected = registry.select(Some(&[ToolDimension::Code]), None);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name(), "gosec");
    }

    #[test]
    fn name_filter_is_case_insensitive_and_trimmed() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(StubTool { name: "Gosec", dimension: ToolDimension::Code, available: true }));
        let selected = registry.select(None, Some("  gosec  "));
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn unavailable_tools_are_dropped_silently() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(StubTool { name: "gosec", dimension: ToolDimension::Code, available: false }));
        assert!(registry.select(None, None).is_empty());
    }
}
