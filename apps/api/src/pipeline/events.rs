use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::pipeline::models::PipelineReport;
use crate::pipeline::state::PipelineState;

/// Receives events as a run makes progress. A closed receiver does not stop the run.
pub type EventSender = mpsc::UnboundedSender<PipelineEvent>;

/// What a client watching a run is told, in the order it happens.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// The run entered `state`.
    Progress {
        run_id: Uuid,
        state: PipelineState,
        percent: u8,
    },
    /// Company research is ready; sent before analysis starts.
    Research {
        summary: String,
        queries: Vec<String>,
    },
    GapReport {
        markdown: String,
    },
    Completed {
        report: Box<PipelineReport>,
    },
    Failed {
        code: &'static str,
        message: String,
    },
}

impl PipelineEvent {
    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            PipelineEvent::Progress { .. } => "progress",
            PipelineEvent::Research { .. } => "research",
            PipelineEvent::GapReport { .. } => "gap_report",
            PipelineEvent::Completed { .. } => "completed",
            PipelineEvent::Failed { .. } => "failed",
        }
    }
}
