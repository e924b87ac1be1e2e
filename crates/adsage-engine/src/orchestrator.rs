use std::time::Duration;

use adsage_contracts::analysis::{AnalysisMode, AnalysisRequest, AnalysisResponse};
use adsage_contracts::strategy::StrategyDocument;
use anyhow::bail;

use crate::presenter::{Presenter, View, ViewEvent};
use crate::projector::{self, AudienceSplit, DashboardState};
use crate::transport::{Transport, TransportError, ANALYZE_PATH};

pub const LOADER_FADE: Duration = Duration::from_millis(500);
pub const AUDIENCE_BAR_DELAY: Duration = Duration::from_millis(300);

const LARGE_IMAGE_NOTE: &str = "Note: Large images might fail in this demo configuration.";

/// Terminal failure shown in place of the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPanel {
    pub message: String,
    pub note: String,
    /// Where "Try Again" leads.
    pub retry_view: View,
}

impl ErrorPanel {
    fn new(message: String) -> Self {
        Self {
            message,
            note: LARGE_IMAGE_NOTE.to_string(),
            retry_view: View::Capture,
        }
    }

    pub fn headline(&self) -> String {
        format!("Analysis Error: {}", self.message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub response: AnalysisResponse,
    /// Decoded strategy, present only when the response was renderable.
    pub strategy: Option<StrategyDocument>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Loading,
    Success(AnalysisOutcome),
    Error(ErrorPanel),
}

/// Drives the single analysis request of a dashboard load.
#[derive(Debug)]
pub struct AnalysisOrchestrator {
    phase: Phase,
}

impl Default for AnalysisOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisOrchestrator {
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Issues the request and walks `Idle → Loading → Success | Error`.
    ///
    /// Refuses to run twice; a new load needs a new orchestrator.
    pub fn run(
        &mut self,
        transport: &dyn Transport,
        request: &AnalysisRequest,
        widgets: &mut DashboardState,
        presenter: &mut dyn Presenter,
    ) -> anyhow::Result<&Phase> {
        if !matches!(self.phase, Phase::Idle) {
            bail!("analysis already started for this dashboard");
        }
        let mode = request.mode();
        self.phase = Phase::Loading;
        presenter.show(ViewEvent::Loading { mode });
        log::info!("requesting {mode} analysis");

        self.phase = match fetch_analysis(transport, request) {
            Ok(response) => Phase::Success(reveal(response, mode, widgets, presenter)),
            Err(err) => {
                log::error!("analysis failed: {err}");
                let panel = ErrorPanel::new(err.to_string());
                presenter.show(ViewEvent::ErrorPanel(panel.clone()));
                Phase::Error(panel)
            }
        };
        Ok(&self.phase)
    }
}

fn fetch_analysis(
    transport: &dyn Transport,
    request: &AnalysisRequest,
) -> Result<AnalysisResponse, TransportError> {
    let body = serde_json::to_value(request).map_err(|err| TransportError::Decode(err.to_string()))?;
    let reply = transport.post_json(ANALYZE_PATH, &body)?;
    if !reply.is_success() {
        return Err(TransportError::Status {
            status: reply.status,
            reason: format!("Analysis failed {}", reply.reason).trim().to_string(),
        });
    }
    Ok(AnalysisResponse::from_value(&reply.json()?))
}

fn reveal(
    response: AnalysisResponse,
    mode: AnalysisMode,
    widgets: &mut DashboardState,
    presenter: &mut dyn Presenter,
) -> AnalysisOutcome {
    presenter.show(ViewEvent::LoaderFadeOut {
        duration: LOADER_FADE,
    });
    presenter.show(ViewEvent::LoaderHidden);
    presenter.show(ViewEvent::ResultsRevealed);

    let strategy = match response.renderable() {
        Some(data) => {
            let document = projector::render(widgets, data, mode);
            presenter.show(ViewEvent::Rendered(Box::new(widgets.clone())));
            Some(document)
        }
        None => {
            log::warn!(
                "analysis returned no renderable data (success={}, error={:?})",
                response.success,
                response.error
            );
            None
        }
    };

    presenter.show(ViewEvent::Entrance);
    widgets.audience = AudienceSplit::ANIMATED;
    presenter.show(ViewEvent::AudienceBars {
        delay: AUDIENCE_BAR_DELAY,
        split: AudienceSplit::ANIMATED,
    });
    AnalysisOutcome { response, strategy }
}
