pub mod error;
pub mod events;
pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod state;

pub use error::PipelineError;
pub use events::{EventSender, PipelineEvent};
pub use models::{PipelineReport, PipelineRequest};
pub use orchestrator::Pipeline;
pub use state::{PipelineRun, PipelineState};
