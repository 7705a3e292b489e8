//! One pass of the import notification journey per iteration, with the
//! journey-level accounting around it.
mod orchestrator;
mod stage;
mod think;


pub use orchestrator::{JourneyOrchestrator, JourneyOutcome, JourneySettings};
pub use stage::Stage;
pub use think::ThinkTime;

pub const SUCCESSFUL_JOURNEY: &str = "successful_journey";
pub const FAILED_JOURNEY: &str = "failed_journey";
pub const AUTH_FAILURE: &str = "auth_failure";
pub const JOURNEY_DURATION: &str = "notification_journey_duration";
