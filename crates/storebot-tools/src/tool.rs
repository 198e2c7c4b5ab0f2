// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool trait and registry.
//!
//! A [`Tool`] is bound to its collaborators at construction and answers a
//! model-issued call with a [`StateUpdate`] holding the tool result message.
//! The [`ToolRegistry`] looks tools up by name and renders the definitions
//! sent to the model.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use storebot_core::StorebotError;
use storebot_core::state::StateUpdate;
use storebot_core::types::ToolDefinition;

/// A capability the model can call during a turn.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name used for lookup and sent to the model.
    fn name(&self) -> &str;

    /// Usage instructions for the model.
    fn description(&self) -> &str;

    /// JSON Schema of the argument object.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Runs the call. The returned update must contain a tool message
    /// correlated to `call_id`.
    ///
    /// Collaborator failures are reported inside the message; an `Err` is
    /// reserved for faults the tool cannot phrase for the model.
    async fn invoke(
        &self,
        args: serde_json::Value,
        call_id: &str,
    ) -> Result<StateUpdate, StorebotError>;
}

/// Tools indexed by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool under its `name()`, replacing any previous entry.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// (name, description) pairs sorted by name.
    pub fn list(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .tools
            .values()
            .map(|t| (t.name(), t.description()))
            .collect();
        entries.sort_by_key(|(name, _)| *name);
        entries
    }

    /// Definitions sent with every model request, sorted by name.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters_schema(),
            })
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.list().iter().map(|(n, _)| *n).collect::<Vec<_>>())
            .finish()
    }
}
