use adsage_contracts::analysis::AnalysisData;
use adsage_contracts::session::SessionContext;
use adsage_contracts::strategy::StrategyDocument;
use anyhow::bail;

use crate::follow_up::{ApplyOutcome, FollowUpHandler};
use crate::orchestrator::{AnalysisOrchestrator, Phase};
use crate::presenter::{Presenter, ViewEvent};
use crate::projector::{self, DashboardState};
use crate::transport::Transport;

/// Controller for the dashboard view.
///
/// Holds one orchestrator, one follow-up handler and the widget state for
/// the lifetime of the view. Re-rendering only rewrites widget state, so the
/// apply action stays bound exactly once.
pub struct DashboardController<T: Transport> {
    transport: T,
    context: SessionContext,
    orchestrator: AnalysisOrchestrator,
    widgets: DashboardState,
    strategy: Option<StrategyDocument>,
    follow_up: FollowUpHandler,
}

impl<T: Transport> DashboardController<T> {
    pub fn new(transport: T, context: SessionContext) -> Self {
        Self {
            transport,
            context,
            orchestrator: AnalysisOrchestrator::new(),
            widgets: DashboardState::default(),
            strategy: None,
            follow_up: FollowUpHandler::new(),
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn widgets(&self) -> &DashboardState {
        &self.widgets
    }

    pub fn follow_up(&self) -> &FollowUpHandler {
        &self.follow_up
    }

    pub fn phase(&self) -> &Phase {
        self.orchestrator.phase()
    }

    /// Runs the analysis for this load. Called once, on view entry.
    pub fn load(&mut self, presenter: &mut dyn Presenter) -> anyhow::Result<&Phase> {
        let request = self.context.analysis_request();
        let phase = self
            .orchestrator
            .run(&self.transport, &request, &mut self.widgets, presenter)?;
        if let Phase::Success(outcome) = phase {
            self.strategy = outcome.strategy.clone();
        }
        Ok(self.orchestrator.phase())
    }

    /// Projects `data` again onto the current widgets.
    pub fn render(&mut self, data: &AnalysisData, presenter: &mut dyn Presenter) {
        let document = projector::render(&mut self.widgets, data, self.context.mode);
        self.strategy = Some(document);
        presenter.show(ViewEvent::Rendered(Box::new(self.widgets.clone())));
    }

    /// The user's "apply suggestions" click.
    pub fn apply_suggestions(&mut self, presenter: &mut dyn Presenter) -> anyhow::Result<ApplyOutcome> {
        let Some(strategy) = &self.strategy else {
            bail!("no rendered analysis to apply suggestions from");
        };
        Ok(self
            .follow_up
            .apply(&self.transport, &self.context, strategy, presenter))
    }
}
