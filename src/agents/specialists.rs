use crate::crew::template::{interpolate, TemplateError};

use super::traits::TemplateInputs;

/// Persona of one crew member. `goal` and `backstory` may contain
/// `{placeholder}` slots filled from the kickoff inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentProfile {
    pub name: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub allow_delegation: bool,
    pub verbose: bool,
}

impl AgentProfile {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            allow_delegation: false,
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Render the system prompt for this persona.
    pub fn system_prompt(&self, inputs: &TemplateInputs) -> Result<String, TemplateError> {
        let role = interpolate(&self.role, inputs)?;
        let goal = interpolate(&self.goal, inputs)?;
        let backstory = interpolate(&self.backstory, inputs)?;

        Ok(format!(
            "You are {role}. {backstory}\nYour personal goal is: {goal}",
            role = role.trim(),
            backstory = backstory.trim(),
            goal = goal.trim(),
        ))
    }
}

pub const RESIDENT_DOCTOR: &str = "resident_doctor";
pub const DOCTOR: &str = "doctor";
pub const MEDICAL_REPORT_WRITER: &str = "medical_report_writer";

pub fn resident_doctor() -> AgentProfile {
    AgentProfile::new(
        RESIDENT_DOCTOR,
        "Resident Doctor",
        "Collect initial statistics and patient information on {topic}",
        "As a Resident Doctor, your role is to take initial medical statistics, \
         patient history, and basic symptoms related to {topic}. \
         You gather vital information that will help the Doctor in making a diagnosis. \
         Your role is essential for creating a foundation for the Doctor's examination.",
    )
    .verbose(true)
}

pub fn doctor() -> AgentProfile {
    AgentProfile::new(
        DOCTOR,
        "Doctor",
        "Examine the patient and diagnose based on initial data collected on {topic}",
        "As a Doctor, you analyze the information provided by the Resident Doctor. \
         You conduct a thorough examination of the patient, listening to their symptoms, \
         examining the collected data, and making a diagnosis. \
         Your goal is to provide an accurate diagnosis and create a treatment plan.",
    )
    .verbose(true)
}

pub fn medical_report_writer() -> AgentProfile {
    AgentProfile::new(
        MEDICAL_REPORT_WRITER,
        "Medical Report Writer",
        "Write a comprehensive report on the Doctor's findings after patient consultation",
        "As the Medical Report Writer, your task is to review the Doctor's findings from \
         the patient examination and prepare a detailed report. \
         This report includes diagnosis, treatment recommendations, and follow-up \
         instructions based on the Doctor's input.",
    )
    .verbose(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(value: &str) -> TemplateInputs {
        TemplateInputs::from([("topic".to_string(), value.to_string())])
    }

    #[test]
    fn resident_doctor_prompt_mentions_the_topic() {
        let prompt = resident_doctor()
            .system_prompt(&topic("Diabetes Management"))
            .expect("topic supplied");

        assert!(prompt.starts_with("You are Resident Doctor."));
        assert!(prompt.contains("basic symptoms related to Diabetes Management."));
        assert!(prompt.contains(
            "Your personal goal is: Collect initial statistics and patient information on Diabetes Management"
        ));
    }

    #[test]
    fn profiles_without_topic_slots_render_without_inputs() {
        let prompt = medical_report_writer()
            .system_prompt(&TemplateInputs::new())
            .expect("writer has no placeholders");
        assert!(prompt.contains("follow-up instructions based on the Doctor's input."));
    }

    #[test]
    fn missing_topic_is_reported() {
        let err = doctor()
            .system_prompt(&TemplateInputs::new())
            .expect_err("doctor goal needs a topic");
        assert_eq!(
            err,
            TemplateError::MissingInput {
                key: "topic".to_string()
            }
        );
    }

    #[test]
    fn roster_members_never_delegate() {
        for profile in [resident_doctor(), doctor(), medical_report_writer()] {
            assert!(!profile.allow_delegation, "{} delegates", profile.name);
        }
    }
}
