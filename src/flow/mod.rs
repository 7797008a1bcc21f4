pub mod remediation;
pub mod stage;

pub use remediation::{FlowSettings, RemediationFlow};
pub use stage::FlowStage;
