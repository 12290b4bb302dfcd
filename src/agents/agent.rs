use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::llm_client::SharedLlmClient;

use super::specialists::AgentProfile;
use super::traits::{AgentBehavior, AgentRequest, AgentResponse};

/// A crew member: a persona bound to the shared LLM backend.
pub struct CrewAgent {
    profile: AgentProfile,
    llm_client: SharedLlmClient,
}

impl CrewAgent {
    pub fn new(profile: AgentProfile, llm_client: SharedLlmClient) -> Self {
        Self {
            profile,
            llm_client,
        }
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }
}

#[async_trait]
impl AgentBehavior for CrewAgent {
    #[instrument(skip_all, fields(agent = %self.profile.name))]
    async fn handle(&self, request: AgentRequest) -> anyhow::Result<AgentResponse> {
        let system_prompt = self.profile.system_prompt(&request.inputs)?;
        let output = self
            .llm_client
            .complete(&system_prompt, request.input.trim())
            .await?;

        let preview: String = output.chars().take(120).collect();
        if self.profile.verbose {
            info!(role = %self.profile.role, output_len = output.len(), %preview, "Agent finished");
        } else {
            debug!(role = %self.profile.role, output_len = output.len(), "Agent finished");
        }

        Ok(AgentResponse::with_metadata(
            output,
            json!({
                "agent": self.profile.name,
                "role": self.profile.role,
                "allow_delegation": self.profile.allow_delegation,
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::agents::specialists::doctor;
    use crate::agents::traits::TemplateInputs;
    use crate::llm_client::testing::ScriptedLlmClient;

    #[tokio::test]
    async fn handle_sends_persona_and_trimmed_prompt() {
        let llm = Arc::new(ScriptedLlmClient::default());
        let agent = CrewAgent::new(doctor(), llm.clone());
        let inputs = TemplateInputs::from([("topic".to_string(), "Migraine".to_string())]);

        let response = agent
            .handle(AgentRequest::new("  Examine the patient.\n").with_inputs(inputs))
            .await
            .expect("scripted reply");

        assert_eq!(response.output, "reply-0");
        let metadata = response.metadata.expect("metadata attached");
        assert_eq!(metadata["agent"], "doctor");
        assert_eq!(metadata["role"], "Doctor");

        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.starts_with("You are Doctor."));
        assert!(calls[0].0.contains("initial data collected on Migraine"));
        assert_eq!(calls[0].1, "Examine the patient.");
    }

    #[tokio::test]
    async fn missing_inputs_fail_before_calling_the_backend() {
        let llm = Arc::new(ScriptedLlmClient::default());
        let agent = CrewAgent::new(doctor(), llm.clone());

        let err = agent
            .handle(AgentRequest::new("Examine the patient."))
            .await
            .expect_err("topic is required");

        assert!(err.to_string().contains("{topic}"));
        assert!(llm.calls().is_empty());
    }
}
