use std::sync::Arc;

use anyhow::Context;
use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::{config::OpenAIConfig, Client as AsyncOpenAiClient};
use async_trait::async_trait;
use tracing::instrument;

use crate::config::LlmConfig;

pub type SharedLlmClient = Arc<dyn LlmClient>;

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system_prompt: &str, prompt: &str) -> anyhow::Result<String>;

    /// Model label reported by health checks.
    fn model(&self) -> &str;
}

/// Offline stand-in that mirrors the prompt back; used with `--echo`.
#[derive(Debug, Default, Clone)]
pub struct EchoLlmClient;

#[async_trait]
impl LlmClient for EchoLlmClient {
    async fn complete(&self, system_prompt: &str, prompt: &str) -> anyhow::Result<String> {
        let persona = system_prompt.lines().next().unwrap_or_default();
        Ok(format!(
            "[echo response]\n{persona}\nI received: {prompt}\nNext step: connect to an LLM backend."
        ))
    }

    fn model(&self) -> &str {
        "echo"
    }
}

impl EchoLlmClient {
    pub fn shared() -> SharedLlmClient {
        Arc::new(Self)
    }
}

/// OpenAI-compatible chat client; the base URL can point at OpenAI, vLLM, or
/// any server speaking the same API.
pub struct OpenAiLlmClient {
    client: AsyncOpenAiClient<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAiLlmClient {
    pub fn from_config(config: &LlmConfig) -> anyhow::Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .context("Set OPENAI_API_KEY to use the OpenAI client")?;

        let mut openai_config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base_url) = config.base_url.as_deref() {
            openai_config = openai_config.with_api_base(base_url);
        }

        Ok(Self {
            client: AsyncOpenAiClient::with_config(openai_config),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    pub fn shared_from_config(config: &LlmConfig) -> anyhow::Result<SharedLlmClient> {
        Ok(Arc::new(Self::from_config(config)?))
    }

    #[instrument(level = "debug", skip_all, fields(model = %self.model))]
    async fn chat(&self, system_prompt: &str, prompt: &str) -> anyhow::Result<String> {
        let system_message = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()?;
        let user_message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(self.temperature)
            .messages(vec![system_message.into(), user_message.into()])
            .build()?;

        let response = self.client.chat().create(request).await?;
        let choice = response
            .choices
            .first()
            .context("LLM response did not contain any choices")?;

        let output = choice
            .message
            .content
            .clone()
            .unwrap_or_else(|| String::from("[empty LLM response]"));

        Ok(output)
    }
}

#[async_trait]
impl LlmClient for OpenAiLlmClient {
    async fn complete(&self, system_prompt: &str, prompt: &str) -> anyhow::Result<String> {
        self.chat(system_prompt, prompt).await
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Build the OpenAI-compatible client, optionally falling back to the echo client.
pub fn build_llm_client(
    config: &LlmConfig,
    default_to_echo: bool,
) -> anyhow::Result<SharedLlmClient> {
    match OpenAiLlmClient::shared_from_config(config) {
        Ok(client) => Ok(client),
        Err(err) if default_to_echo => {
            tracing::warn!(?err, "Falling back to EchoLlmClient");
            Ok(EchoLlmClient::shared())
        }
        Err(err) => Err(err),
    }
}
