pub mod task;
pub mod template;

use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, instrument};

use crate::agents::{
    doctor, medical_report_writer, resident_doctor, AgentBehavior, AgentRequest, CrewAgent,
    TemplateInputs,
};
use crate::llm_client::SharedLlmClient;

pub use task::TaskSpec;
pub use template::TemplateError;

/// Black-box entry point used by the outer surfaces: inputs in, final text out.
#[async_trait]
pub trait ReportPipeline: Send + Sync {
    async fn run(&self, inputs: &TemplateInputs) -> anyhow::Result<String>;
}

#[derive(Debug, Error)]
pub enum CrewError {
    #[error("a crew needs at least one task")]
    NoTasks,
    #[error("task {task} is assigned to unknown agent {agent}")]
    UnknownAgent { task: String, agent: String },
    #[error("agent {0} is registered twice")]
    DuplicateAgent(String),
    #[error("invalid template in {location}: {source}")]
    Template {
        location: String,
        #[source]
        source: TemplateError,
    },
}

#[derive(Debug, Clone)]
pub struct TaskOutput {
    pub task: String,
    pub agent: String,
    pub output: String,
}

#[derive(Debug, Clone)]
pub struct CrewOutput {
    /// Output of the final task.
    pub raw: String,
    pub tasks_output: Vec<TaskOutput>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Agents plus an ordered task list, executed strictly in sequence. Each
/// task sees the previous task's output as context.
pub struct Crew {
    agents: HashMap<String, CrewAgent>,
    tasks: Vec<TaskSpec>,
}

#[derive(Default)]
pub struct CrewBuilder {
    agents: Vec<CrewAgent>,
    tasks: Vec<TaskSpec>,
}

impl CrewBuilder {
    pub fn agent(mut self, agent: CrewAgent) -> Self {
        self.agents.push(agent);
        self
    }

    pub fn task(mut self, task: TaskSpec) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn build(self) -> Result<Crew, CrewError> {
        if self.tasks.is_empty() {
            return Err(CrewError::NoTasks);
        }

        let mut agents = HashMap::with_capacity(self.agents.len());
        for agent in self.agents {
            let name = agent.name().to_string();
            if agents.contains_key(&name) {
                return Err(CrewError::DuplicateAgent(name));
            }
            agents.insert(name, agent);
        }

        if let Some(task) = self.tasks.iter().find(|t| !agents.contains_key(&t.agent)) {
            return Err(CrewError::UnknownAgent {
                task: task.name.clone(),
                agent: task.agent.clone(),
            });
        }

        Ok(Crew {
            agents,
            tasks: self.tasks,
        })
    }
}

impl Crew {
    pub fn builder() -> CrewBuilder {
        CrewBuilder::default()
    }

    /// Resident doctor → doctor → report writer.
    pub fn medical(llm_client: SharedLlmClient) -> Result<Self, CrewError> {
        Self::builder()
            .agent(CrewAgent::new(resident_doctor(), llm_client.clone()))
            .agent(CrewAgent::new(doctor(), llm_client.clone()))
            .agent(CrewAgent::new(medical_report_writer(), llm_client))
            .task(task::initial_statistics())
            .task(task::patient_examination())
            .task(task::report_writing())
            .build()
    }

    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    /// Render every template up front so a missing input fails before any
    /// backend call is made.
    pub fn validate_inputs(&self, inputs: &TemplateInputs) -> Result<(), CrewError> {
        for task in &self.tasks {
            task.render(inputs, None)
                .map_err(|source| CrewError::Template {
                    location: format!("task {}", task.name),
                    source,
                })?;
        }

        for (name, agent) in &self.agents {
            agent
                .profile()
                .system_prompt(inputs)
                .map_err(|source| CrewError::Template {
                    location: format!("agent {name}"),
                    source,
                })?;
        }

        Ok(())
    }

    #[instrument(skip_all, fields(tasks = self.tasks.len()))]
    pub async fn kickoff(&self, inputs: &TemplateInputs) -> anyhow::Result<CrewOutput> {
        self.validate_inputs(inputs)?;

        let started_at = Utc::now();
        let mut tasks_output: Vec<TaskOutput> = Vec::with_capacity(self.tasks.len());

        for (position, task) in self.tasks.iter().enumerate() {
            let agent = self
                .agents
                .get(&task.agent)
                .with_context(|| format!("agent {} is not part of this crew", task.agent))?;

            let context = tasks_output.last().map(|previous| previous.output.as_str());
            let prompt = task.render(inputs, context)?;

            info!(task = %task.name, agent = %task.agent, position, "Starting task");
            let response = agent
                .handle(AgentRequest::new(prompt).with_inputs(inputs.clone()))
                .await
                .with_context(|| format!("task {} failed", task.name))?;
            info!(task = %task.name, output_len = response.output.len(), "Task completed");

            tasks_output.push(TaskOutput {
                task: task.name.clone(),
                agent: task.agent.clone(),
                output: response.output,
            });
        }

        let raw = tasks_output
            .last()
            .map(|last| last.output.clone())
            .unwrap_or_default();

        Ok(CrewOutput {
            raw,
            tasks_output,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

#[async_trait]
impl ReportPipeline for Crew {
    async fn run(&self, inputs: &TemplateInputs) -> anyhow::Result<String> {
        Ok(self.kickoff(inputs).await?.raw)
    }
}
