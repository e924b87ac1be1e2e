pub mod capture;
pub mod dashboard;
pub mod follow_up;
pub mod orchestrator;
pub mod presenter;
pub mod projector;
pub mod transport;

use sha2::{Digest, Sha256};

pub use capture::{CaptureController, CaptureError, ImageUpload};
pub use dashboard::DashboardController;
pub use follow_up::{ApplyOutcome, ButtonState, FollowUpHandler};
pub use orchestrator::{AnalysisOrchestrator, ErrorPanel, Phase};
pub use presenter::{Cue, Presenter, RecordingPresenter, View, ViewEvent};
pub use projector::DashboardState;
pub use transport::{ClientConfig, HttpTransport, Transport, TransportError};

/// Short digest used to identify image payloads in logs.
pub fn image_fingerprint(data_uri: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data_uri.as_bytes());
    hex::encode(&hasher.finalize()[..6])
}

pub(crate) fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_short_and_stable() {
        let first = image_fingerprint("data:image/png;base64,AAAA");
        assert_eq!(first.len(), 12);
        assert_eq!(first, image_fingerprint("data:image/png;base64,AAAA"));
        assert_ne!(first, image_fingerprint("data:image/png;base64,AAAB"));
    }

    #[test]
    fn truncate_text_appends_ellipsis() {
        assert_eq!(truncate_text("abcdef", 3), "abc…");
        assert_eq!(truncate_text("abc", 3), "abc");
    }
}
