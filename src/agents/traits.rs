use std::collections::BTreeMap;

use async_trait::async_trait;

/// Values substituted into `{placeholder}` slots of prompts and profiles.
pub type TemplateInputs = BTreeMap<String, String>;

/// Structured payload handed to a crew member: the rendered task prompt plus
/// the kickoff inputs used to render the member's own persona.
#[derive(Debug, Clone)]
pub struct AgentRequest {
    pub input: String,
    pub inputs: TemplateInputs,
}

impl AgentRequest {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            inputs: TemplateInputs::new(),
        }
    }

    pub fn with_inputs(mut self, inputs: TemplateInputs) -> Self {
        self.inputs = inputs;
        self
    }
}

/// Standardized response wrapper so downstream tools can rely on metadata.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    pub output: String,
    pub metadata: Option<serde_json::Value>,
}

impl AgentResponse {
    pub fn with_metadata(output: impl Into<String>, metadata: serde_json::Value) -> Self {
        Self {
            output: output.into(),
            metadata: Some(metadata),
        }
    }
}

#[async_trait]
pub trait AgentBehavior: Send + Sync {
    async fn handle(&self, request: AgentRequest) -> anyhow::Result<AgentResponse>;
}
