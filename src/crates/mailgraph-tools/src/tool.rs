//! MailTool trait and registry
//!
//! The operation catalog is supplied by the external tool layer at
//! startup: each catalog entry becomes one [`MailTool`] registered in a
//! [`ToolRegistry`]. The router and planner treat operation names as
//! opaque strings plus argument schemas; nothing in the core interprets
//! provider semantics.
//!
//! # Example
//!
//! ```rust
//! use mailgraph_tools::{MailTool, ToolRegistry, ToolInput, ToolOutput};
//! use async_trait::async_trait;
//!
//! struct ListEmails;
//!
//! #[async_trait]
//! impl MailTool for ListEmails {
//!     fn name(&self) -> &str {
//!         "Gmail_ListEmails"
//!     }
//!
//!     fn description(&self) -> &str {
//!         "List emails from the inbox with search criteria"
//!     }
//!
//!     async fn execute(&self, _args: ToolInput) -> mailgraph_tools::Result<ToolOutput> {
//!         Ok(serde_json::json!({"emails": []}))
//!     }
//! }
//!
//! let mut registry = ToolRegistry::new();
//! registry.register(Box::new(ListEmails));
//! assert!(registry.get("Gmail_ListEmails").is_some());
//! ```

use crate::error::{Result, ToolError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Tool input type
pub type ToolInput = Value;

/// Tool output type
pub type ToolOutput = Value;

/// One operation from the external mail-tool catalog
#[async_trait]
pub trait MailTool: Send + Sync {
    /// Operation name (opaque catalog entry, e.g. `Gmail_ListEmails`)
    fn name(&self) -> &str;

    /// Human-readable description, advertised to the planner
    fn description(&self) -> &str;

    /// JSON schema of the operation arguments (optional)
    fn input_schema(&self) -> Option<Value> {
        None
    }

    /// Whether this operation needs explicit user consent before running
    fn requires_authorization(&self) -> bool {
        false
    }

    /// Whether this is a write/compose-type operation that accepts a
    /// `body` argument (subject to the adapter's default-body policy)
    fn is_compose(&self) -> bool {
        false
    }

    /// Validate arguments before execution (optional)
    fn validate_args(&self, _args: &ToolInput) -> Result<()> {
        Ok(())
    }

    /// Execute the operation with the given arguments
    async fn execute(&self, args: ToolInput) -> Result<ToolOutput>;
}

/// Serializable description of a catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMetadata {
    /// Operation name
    pub name: String,

    /// Operation description
    pub description: String,

    /// Argument schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,

    /// Whether the operation needs user authorization
    #[serde(default)]
    pub requires_authorization: bool,

    /// Whether the operation is compose-type
    #[serde(default)]
    pub compose: bool,

    /// Additional provider metadata
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Registry of the operations available to a conversation
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn MailTool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Build a registry from a list of tools
    pub fn from_tools(tools: Vec<Box<dyn MailTool>>) -> Self {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool);
        }
        registry
    }

    /// Register a tool
    pub fn register(&mut self, tool: Box<dyn MailTool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Look up a tool by operation name
    pub fn get(&self, name: &str) -> Option<&dyn MailTool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// All registered operation names
    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Number of registered operations
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Metadata for every catalog entry
    pub fn metadata(&self) -> Vec<ToolMetadata> {
        self.tools
            .values()
            .map(|tool| ToolMetadata {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: tool.input_schema(),
                requires_authorization: tool.requires_authorization(),
                compose: tool.is_compose(),
                extra: HashMap::new(),
            })
            .collect()
    }

    /// Validate and execute an operation by name
    pub async fn execute(&self, name: &str, args: ToolInput) -> Result<ToolOutput> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        tool.validate_args(&args)?;
        tool.execute(args).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockTool;

    #[async_trait]
    impl MailTool for MockTool {
        fn name(&self) -> &str {
            "mock"
        }

        fn description(&self) -> &str {
            "A mock tool"
        }

        fn requires_authorization(&self) -> bool {
            true
        }

        async fn execute(&self, args: ToolInput) -> Result<ToolOutput> {
            Ok(serde_json::json!({"echo": args}))
        }
    }

    #[tokio::test]
    async fn test_registry_execute() {
        let registry = ToolRegistry::from_tools(vec![Box::new(MockTool)]);

        let output = registry
            .execute("mock", serde_json::json!({"a": 1}))
            .await
            .unwrap();
        assert_eq!(output["echo"]["a"], 1);
    }

    #[tokio::test]
    async fn test_registry_unknown_tool() {
        let registry = ToolRegistry::new();
        let result = registry.execute("missing", serde_json::json!({})).await;
        assert!(matches!(result, Err(ToolError::NotFound(_))));
    }

    #[test]
    fn test_registry_metadata() {
        let registry = ToolRegistry::from_tools(vec![Box::new(MockTool)]);
        let metadata = registry.metadata();

        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata[0].name, "mock");
        assert!(metadata[0].requires_authorization);
        assert!(!metadata[0].compose);
    }
}
