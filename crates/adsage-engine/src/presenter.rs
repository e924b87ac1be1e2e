use std::time::Duration;

use adsage_contracts::analysis::AnalysisMode;
use adsage_contracts::apply::AppliedContent;

use crate::follow_up::ButtonState;
use crate::orchestrator::ErrorPanel;
use crate::projector::{AudienceSplit, DashboardState};

/// Views the application can show. Each one has its own controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Capture,
    Dashboard,
}

/// User-facing signal for refused input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cue {
    /// Blocking message box.
    Alert(String),
    /// Brief highlight of the named field.
    Shake(&'static str),
}

/// Display changes requested by the controllers, in the order they happen.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Loading { mode: AnalysisMode },
    LoaderFadeOut { duration: Duration },
    LoaderHidden,
    ResultsRevealed,
    Rendered(Box<DashboardState>),
    Entrance,
    AudienceBars { delay: Duration, split: AudienceSplit },
    ErrorPanel(ErrorPanel),
    ApplyButton(ButtonState),
    AppliedRevealed(AppliedContent),
    Cue(Cue),
}

/// Presentation collaborator. Implementations own timing and drawing.
pub trait Presenter {
    fn show(&mut self, event: ViewEvent);
}

/// Presenter that keeps every event, for tests and headless runs.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub events: Vec<ViewEvent>,
}

impl Presenter for RecordingPresenter {
    fn show(&mut self, event: ViewEvent) {
        self.events.push(event);
    }
}
