//! Name-indexed registry of the agent's tools.

use std::sync::Arc;

use dashmap::DashMap;

use super::BoxTool;

/// Advertised contract of one registered tool, for prompt assembly.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Concurrent name-to-tool map.
#[derive(Default)]
pub struct ToolRegistry {
    tools: DashMap<String, Arc<BoxTool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: DashMap::new(),
        }
    }

    /// Register a tool under its own name. Replaces any previous entry.
    pub fn register(&self, tool: BoxTool) {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<BoxTool>> {
        self.tools.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Registered tool names, sorted for stable prompt output.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Advertised specs of all registered tools, sorted by name.
    pub fn specs(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self
            .tools
            .iter()
            .map(|entry| ToolSpec {
                name: entry.value().name().to_string(),
                description: entry.value().description().to_string(),
                parameters: entry.value().parameters(),
            })
            .collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{Tool, ToolContext, ToolOutput};
    use properbot_types::error::ToolError;

    struct EchoTool;

    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes its input back."
        }

        fn parameters(&self) -> serde_json::Value {
            serde_json::json!({"type": "object"})
        }

        async fn invoke(
            &self,
            input: serde_json::Value,
            _ctx: &ToolContext,
        ) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::text(input.to_string()))
        }
    }

    #[test]
    fn test_register_and_get() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register(BoxTool::new(EchoTool));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("echo").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_specs_sorted() {
        let registry = ToolRegistry::new();
        registry.register(BoxTool::new(EchoTool));

        let specs = registry.specs();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "echo");
        assert_eq!(registry.names(), vec!["echo".to_string()]);
    }

    #[tokio::test]
    async fn test_invoke_through_registry() {
        let registry = ToolRegistry::new();
        registry.register(BoxTool::new(EchoTool));

        let tool = registry.get("echo").unwrap();
        let output = tool
            .invoke(serde_json::json!({"x": 1}), &ToolContext::default())
            .await
            .unwrap();
        assert!(output.observation.contains("\"x\":1"));
    }
}
