use std::fmt;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::pipeline::events::{EventSender, PipelineEvent};

/// Lifecycle of one pipeline run.
///
/// Idle → Extracting → Researching → Analyzing → Writing → Done,
/// with Error reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Extracting,
    Researching,
    Analyzing,
    Writing,
    Done,
    Error,
}

impl PipelineState {
    /// The state entered when this one completes successfully.
    pub fn successor(self) -> Option<Self> {
        match self {
            PipelineState::Idle => Some(PipelineState::Extracting),
            PipelineState::Extracting => Some(PipelineState::Researching),
            PipelineState::Researching => Some(PipelineState::Analyzing),
            PipelineState::Analyzing => Some(PipelineState::Writing),
            PipelineState::Writing => Some(PipelineState::Done),
            PipelineState::Done | PipelineState::Error => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Error)
    }

    /// Progress shown to the user while the run is in this state.
    pub fn progress_percent(self) -> u8 {
        match self {
            PipelineState::Idle | PipelineState::Error => 0,
            PipelineState::Extracting => 20,
            PipelineState::Researching => 40,
            PipelineState::Analyzing => 70,
            PipelineState::Writing => 90,
            PipelineState::Done => 100,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Extracting => "extracting",
            PipelineState::Researching => "researching",
            PipelineState::Analyzing => "analyzing",
            PipelineState::Writing => "writing",
            PipelineState::Done => "done",
            PipelineState::Error => "error",
        };
        f.write_str(name)
    }
}

/// Drives one run through the state machine and keeps the transition trace.
/// Every transition is also published to the attached event sender, if any.
#[derive(Debug)]
pub struct PipelineRun {
    run_id: Uuid,
    state: PipelineState,
    history: Vec<PipelineState>,
    events: Option<EventSender>,
}

impl PipelineRun {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            state: PipelineState::Idle,
            history: vec![PipelineState::Idle],
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Publishes an event to whoever is watching. Nobody watching is fine.
    pub fn emit(&self, event: PipelineEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    /// Moves to the successor state. Terminal states do not move.
    pub fn advance(&mut self) -> PipelineState {
        if let Some(next) = self.state.successor() {
            self.enter(next);
        }
        self.state
    }

    /// Moves to `Error`. Returns false if the run had already terminated.
    pub fn fail(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.enter(PipelineState::Error);
        true
    }

    fn enter(&mut self, next: PipelineState) {
        info!(
            "Pipeline run {}: {} → {} ({}%)",
            self.run_id,
            self.state,
            next,
            next.progress_percent()
        );
        self.state = next;
        self.history.push(next);
        self.emit(PipelineEvent::Progress {
            run_id: self.run_id,
            state: next,
            percent: next.progress_percent(),
        });
    }
}
