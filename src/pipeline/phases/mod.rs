pub mod connection;
pub mod detector;
pub mod gate;
pub mod publish;
pub mod summary;
pub mod teardown;

pub use detector::UnpublishedWorkDetector;
pub use gate::{plan_post_tasks, Decision, PostTaskPlan};
pub use publish::BuildInfoPublishPhase;
pub use summary::JobSummaryPhase;
pub use teardown::CredentialTeardownPhase;
