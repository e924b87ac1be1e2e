use adsage_contracts::apply::{AppliedContent, ApplyRequest, ApplyResult};
use adsage_contracts::session::SessionContext;
use adsage_contracts::strategy::StrategyDocument;

use crate::presenter::{Cue, Presenter, ViewEvent};
use crate::transport::{Transport, TransportError, APPLY_SUGGESTIONS_PATH};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonState {
    /// "Apply Suggestions", enabled.
    #[default]
    Idle,
    /// Disabled spinner while the request is in flight.
    Working,
    /// "Error. Try Again", enabled.
    Retry,
}

impl ButtonState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Apply Suggestions",
            Self::Working => "Applying...",
            Self::Retry => "Error. Try Again",
        }
    }

    pub fn enabled(self) -> bool {
        !matches!(self, Self::Working)
    }
}

/// What one click ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied(AppliedContent),
    Alerted(String),
    Retry(String),
}

/// Owns the apply button and the rewritten-content block.
#[derive(Debug, Default)]
pub struct FollowUpHandler {
    button: ButtonState,
    applied: Option<AppliedContent>,
}

impl FollowUpHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn button(&self) -> ButtonState {
        self.button
    }

    /// Last rewrite shown; `Some` once the results block is revealed.
    pub fn applied(&self) -> Option<&AppliedContent> {
        self.applied.as_ref()
    }

    /// Runs one pending → success/error cycle. Clicking again repeats it.
    pub fn apply(
        &mut self,
        transport: &dyn Transport,
        context: &SessionContext,
        strategy: &StrategyDocument,
        presenter: &mut dyn Presenter,
    ) -> ApplyOutcome {
        let suggestions = strategy.suggestions_text();
        if suggestions.trim().is_empty() {
            let message = "No suggestions to apply.".to_string();
            presenter.show(ViewEvent::Cue(Cue::Alert(message.clone())));
            return ApplyOutcome::Alerted(message);
        }

        self.set_button(ButtonState::Working, presenter);
        let request = ApplyRequest {
            image: context.image.clone(),
            content: context.apply_content(),
            suggestions,
        };

        match send_apply(transport, &request) {
            Ok(result) if result.success => match result.applied_content() {
                Ok(applied) => {
                    self.set_button(ButtonState::Idle, presenter);
                    self.applied = Some(applied.clone());
                    presenter.show(ViewEvent::AppliedRevealed(applied.clone()));
                    ApplyOutcome::Applied(applied)
                }
                Err(err) => self.fail(format!("apply result unreadable: {err}"), presenter),
            },
            Ok(result) => {
                self.set_button(ButtonState::Idle, presenter);
                let message = format!(
                    "Error: {}",
                    result.error.as_deref().unwrap_or("unknown error")
                );
                log::warn!("apply suggestions rejected: {message}");
                presenter.show(ViewEvent::Cue(Cue::Alert(message.clone())));
                ApplyOutcome::Alerted(message)
            }
            Err(err) => self.fail(err.to_string(), presenter),
        }
    }

    fn fail(&mut self, reason: String, presenter: &mut dyn Presenter) -> ApplyOutcome {
        log::error!("apply suggestions failed: {reason}");
        self.set_button(ButtonState::Retry, presenter);
        ApplyOutcome::Retry(reason)
    }

    fn set_button(&mut self, state: ButtonState, presenter: &mut dyn Presenter) {
        self.button = state;
        presenter.show(ViewEvent::ApplyButton(state));
    }
}

/// The reply body is read whatever the HTTP status; the envelope decides.
fn send_apply(
    transport: &dyn Transport,
    request: &ApplyRequest,
) -> Result<ApplyResult, TransportError> {
    let body = serde_json::to_value(request).map_err(|err| TransportError::Decode(err.to_string()))?;
    let reply = transport.post_json(APPLY_SUGGESTIONS_PATH, &body)?;
    Ok(ApplyResult::from_value(&reply.json()?))
}

#[cfg(test)]
mod tests {
    use adsage_contracts::analysis::{PostInput, PreInput};
    use adsage_contracts::strategy::lenient_decode;
    use serde_json::json;

    use super::*;
    use crate::presenter::RecordingPresenter;
    use crate::transport::testing::FakeTransport;
    use crate::transport::TransportReply;

    fn strategy() -> StrategyDocument {
        lenient_decode(Some(
            r#"{"strategic_suggestions": [
                {"title": "Hook", "description": "Lead with the offer", "priority": "High"},
                {"title": "CTA", "description": "Add a clear CTA", "priority": "Medium"}
            ]}"#,
        ))
    }

    fn pre_context() -> SessionContext {
        SessionContext::pre(PreInput {
            image: "data:image/png;base64,AAAA".to_string(),
            text: "Old caption".to_string(),
            platform: "linkedin".to_string(),
            target: "all".to_string(),
        })
    }

    #[test]
    fn success_reveals_rewritten_content() {
        let transport = FakeTransport::with_replies(vec![FakeTransport::ok_json(json!({
            "success": true,
            "data": "{\"new_content\": \"New caption\", \"new_image_prompt\": \"Bright studio shot\"}"
        }))]);
        let mut handler = FollowUpHandler::new();
        let mut presenter = RecordingPresenter::default();

        let outcome = handler.apply(&transport, &pre_context(), &strategy(), &mut presenter);
        let expected = AppliedContent {
            new_content: "New caption".to_string(),
            new_image_prompt: "Bright studio shot".to_string(),
        };
        assert_eq!(outcome, ApplyOutcome::Applied(expected.clone()));
        assert_eq!(handler.applied(), Some(&expected));
        assert_eq!(handler.button(), ButtonState::Idle);
        assert_eq!(
            presenter.events,
            vec![
                ViewEvent::ApplyButton(ButtonState::Working),
                ViewEvent::ApplyButton(ButtonState::Idle),
                ViewEvent::AppliedRevealed(expected),
            ]
        );

        let requests = transport.requests.borrow();
        assert_eq!(requests[0].0, APPLY_SUGGESTIONS_PATH);
        assert_eq!(
            requests[0].1,
            json!({
                "image": "data:image/png;base64,AAAA",
                "content": "Old caption",
                "suggestions": "Lead with the offer\nAdd a clear CTA"
            })
        );
    }

    #[test]
    fn post_mode_sends_url_as_content_without_image() {
        let transport = FakeTransport::with_replies(vec![FakeTransport::ok_json(
            json!({"success": false, "error": "model offline"}),
        )]);
        let context = SessionContext::post(PostInput {
            url: "https://linkedin.com/p/1".to_string(),
        });
        let mut handler = FollowUpHandler::new();
        let mut presenter = RecordingPresenter::default();

        let outcome = handler.apply(&transport, &context, &strategy(), &mut presenter);
        assert_eq!(
            outcome,
            ApplyOutcome::Alerted("Error: model offline".to_string())
        );
        assert_eq!(handler.button(), ButtonState::Idle);
        assert_eq!(handler.applied(), None);

        let requests = transport.requests.borrow();
        assert_eq!(requests[0].1["image"], json!(null));
        assert_eq!(requests[0].1["content"], json!("https://linkedin.com/p/1"));
    }

    #[test]
    fn error_status_body_is_still_read() {
        let transport = FakeTransport::with_replies(vec![Ok(TransportReply {
            status: 500,
            reason: "Internal Server Error".to_string(),
            body: r#"{"success": false, "error": "quota exhausted"}"#.to_string(),
        })]);
        let mut handler = FollowUpHandler::new();
        let outcome = handler.apply(
            &transport,
            &pre_context(),
            &strategy(),
            &mut RecordingPresenter::default(),
        );
        assert_eq!(
            outcome,
            ApplyOutcome::Alerted("Error: quota exhausted".to_string())
        );
    }

    #[test]
    fn transport_failure_sets_retry_label_and_click_restarts() {
        let transport = FakeTransport::with_replies(vec![
            Err(TransportError::Network("connection refused".to_string())),
            FakeTransport::ok_json(json!({
                "success": true,
                "data": "{\"new_content\": \"c\", \"new_image_prompt\": \"p\"}"
            })),
        ]);
        let mut handler = FollowUpHandler::new();
        let mut presenter = RecordingPresenter::default();

        let first = handler.apply(&transport, &pre_context(), &strategy(), &mut presenter);
        assert!(matches!(first, ApplyOutcome::Retry(_)));
        assert_eq!(handler.button(), ButtonState::Retry);
        assert_eq!(ButtonState::Retry.label(), "Error. Try Again");
        assert!(handler.button().enabled());

        let second = handler.apply(&transport, &pre_context(), &strategy(), &mut presenter);
        assert!(matches!(second, ApplyOutcome::Applied(_)));
        assert_eq!(transport.request_count(), 2);
    }

    #[test]
    fn unreadable_data_is_a_retry() {
        let transport = FakeTransport::with_replies(vec![FakeTransport::ok_json(
            json!({"success": true, "data": "not json"}),
        )]);
        let mut handler = FollowUpHandler::new();
        let outcome = handler.apply(
            &transport,
            &pre_context(),
            &strategy(),
            &mut RecordingPresenter::default(),
        );
        assert!(matches!(outcome, ApplyOutcome::Retry(_)));
        assert_eq!(handler.button(), ButtonState::Retry);
    }

    #[test]
    fn nothing_to_apply_skips_the_request() {
        let transport = FakeTransport::default();
        let mut handler = FollowUpHandler::new();
        let outcome = handler.apply(
            &transport,
            &pre_context(),
            &StrategyDocument::default(),
            &mut RecordingPresenter::default(),
        );
        assert!(matches!(outcome, ApplyOutcome::Alerted(_)));
        assert_eq!(handler.button(), ButtonState::Idle);
        assert_eq!(transport.request_count(), 0);
    }
}
