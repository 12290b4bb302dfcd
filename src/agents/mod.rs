pub mod agent;
pub mod specialists;
pub mod traits;

pub use agent::CrewAgent;
pub use specialists::{doctor, medical_report_writer, resident_doctor};
pub use traits::{AgentBehavior, AgentRequest, TemplateInputs};
