use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use proquote_core::errors::AgentError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Template-driven agents with fixed output shapes.
    Simple,
    /// Agents that derive structure from free text.
    Workflow,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Workflow => "workflow",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Simple => "Template-based agents for fixed quotation sections",
            Self::Workflow => "Logic-based agents that extract structure from free text",
        }
    }
}

/// Contract every section agent fulfils. Inputs and outputs are JSON
/// mappings so the registry can drive any agent from the API; each agent
/// deserializes its own typed input inside `process`.
#[async_trait]
pub trait SectionAgent: Send + Sync {
    fn name(&self) -> &'static str;
    fn kind(&self) -> AgentKind;
    async fn process(&self, input: Value) -> Result<Value, AgentError>;
}

/// Name-indexed agent collection backing the `/agents` API surface.
/// Iteration order is stable (sorted by name) so listings are deterministic.
#[derive(Default)]
pub struct AgentRegistry {
    agents: BTreeMap<&'static str, Box<dyn SectionAgent>>,
}

impl AgentRegistry {
    pub fn register<A>(&mut self, agent: A)
    where
        A: SectionAgent + 'static,
    {
        self.agents.insert(agent.name(), Box::new(agent));
    }

    pub fn get(&self, name: &str) -> Option<&dyn SectionAgent> {
        self.agents.get(name).map(AsRef::as_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn SectionAgent> {
        self.agents.values().map(AsRef::as_ref)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub async fn execute(&self, name: &str, input: Value) -> Result<Value, AgentError> {
        let agent =
            self.get(name).ok_or_else(|| AgentError::UnknownAgent(name.to_string()))?;
        agent.process(input).await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::{json, Value};

    use proquote_core::errors::AgentError;

    use super::{AgentKind, AgentRegistry, SectionAgent};

    struct EchoAgent;

    #[async_trait]
    impl SectionAgent for EchoAgent {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn kind(&self) -> AgentKind {
            AgentKind::Simple
        }

        async fn process(&self, input: Value) -> Result<Value, AgentError> {
            Ok(input)
        }
    }

    #[tokio::test]
    async fn registry_dispatches_by_name() {
        let mut registry = AgentRegistry::default();
        registry.register(EchoAgent);

        assert_eq!(registry.len(), 1);
        let output = registry.execute("echo", json!({"a": 1})).await.expect("echo runs");
        assert_eq!(output, json!({"a": 1}));
    }

    #[tokio::test]
    async fn unknown_agent_is_an_error() {
        let registry = AgentRegistry::default();
        let error = registry.execute("missing", json!({})).await.expect_err("must fail");
        assert!(matches!(error, AgentError::UnknownAgent(name) if name == "missing"));
    }
}
