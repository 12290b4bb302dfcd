use crate::agents::specialists::{DOCTOR, MEDICAL_REPORT_WRITER, RESIDENT_DOCTOR};
use crate::agents::TemplateInputs;

use super::template::{interpolate, TemplateError};

/// One unit of crew work, assigned to the agent named by `agent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub name: String,
    pub description: String,
    pub expected_output: String,
    pub agent: String,
}

impl TaskSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            expected_output: expected_output.into(),
            agent: agent.into(),
        }
    }

    /// Render the prompt handed to the assigned agent. `context` carries the
    /// previous task's output, if any.
    pub fn render(
        &self,
        inputs: &TemplateInputs,
        context: Option<&str>,
    ) -> Result<String, TemplateError> {
        let description = interpolate(&self.description, inputs)?;
        let expected_output = interpolate(&self.expected_output, inputs)?;

        let mut prompt = String::from(description.trim());
        prompt.push_str("\n\nThis is the expected criteria for your final answer: ");
        prompt.push_str(expected_output.trim());

        if let Some(ctx) = context.map(str::trim).filter(|ctx| !ctx.is_empty()) {
            prompt.push_str("\n\nThis is the context you're working with:\n");
            prompt.push_str(ctx);
        }

        Ok(prompt)
    }
}

pub fn initial_statistics() -> TaskSpec {
    TaskSpec::new(
        "initial_statistics",
        "1. Collect the patient's basic details, medical history, and symptoms related to {topic}.\n\
         2. Measure vital signs such as blood pressure, temperature, and pulse.\n\
         3. Organize all collected data in a structured format for the Doctor's examination.",
        "A detailed patient information sheet, including vital signs and symptom history, \
         ready for the Doctor's review.",
        RESIDENT_DOCTOR,
    )
}

pub fn patient_examination() -> TaskSpec {
    TaskSpec::new(
        "patient_examination",
        "1. Analyze the patient's symptoms and medical history provided by the Resident Doctor.\n\
         2. Perform a physical examination and conduct necessary tests.\n\
         3. Formulate a diagnosis based on the collected information and examination.",
        "A detailed diagnosis and treatment plan for the patient, including any tests or \
         prescriptions needed.",
        DOCTOR,
    )
}

pub fn report_writing() -> TaskSpec {
    TaskSpec::new(
        "report_writing",
        "Write a medical report based on the Doctor's examination and diagnosis. \
         The report should include the diagnosis, treatment plan, and any follow-up \
         recommendations.",
        "A comprehensive medical report documenting the diagnosis, treatment, and follow-up plan.",
        MEDICAL_REPORT_WRITER,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(value: &str) -> TemplateInputs {
        TemplateInputs::from([("topic".to_string(), value.to_string())])
    }

    #[test]
    fn first_task_renders_without_context() {
        let prompt = initial_statistics()
            .render(&topic("Hypertension"), None)
            .expect("topic supplied");

        assert!(prompt.starts_with("1. Collect the patient's basic details"));
        assert!(prompt.contains("symptoms related to Hypertension.\n2. Measure vital signs"));
        assert!(prompt.contains(
            "This is the expected criteria for your final answer: A detailed patient information sheet"
        ));
        assert!(!prompt.contains("context you're working with"));
    }

    #[test]
    fn context_is_appended_when_present() {
        let prompt = patient_examination()
            .render(&topic("Hypertension"), Some("  BP 150/95, pulse 88\n"))
            .expect("no placeholders");
        assert!(prompt.ends_with("This is the context you're working with:\nBP 150/95, pulse 88"));
    }

    #[test]
    fn blank_context_is_ignored() {
        let prompt = report_writing()
            .render(&TemplateInputs::new(), Some("   "))
            .expect("no placeholders");
        assert!(!prompt.contains("context you're working with"));
    }

    #[test]
    fn tasks_are_assigned_to_the_medical_roster() {
        assert_eq!(initial_statistics().agent, RESIDENT_DOCTOR);
        assert_eq!(patient_examination().agent, DOCTOR);
        assert_eq!(report_writing().agent, MEDICAL_REPORT_WRITER);
    }
}
