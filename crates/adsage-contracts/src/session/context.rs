use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::analysis::{AnalysisMode, AnalysisRequest, PostInput, PreInput, DEMO_URL};

/// Namespace shared by every key the capture view writes.
pub const KEY_PREFIX: &str = "adsage_";

pub(crate) const FIELD_MODE: &str = "mode";
pub(crate) const FIELD_URL: &str = "url";
pub(crate) const FIELD_IMAGE: &str = "image";
pub(crate) const FIELD_TEXT: &str = "text";
pub(crate) const FIELD_PLATFORM: &str = "platform";
pub(crate) const FIELD_TARGET: &str = "target";
pub(crate) const FIELD_SESSION: &str = "session";
pub(crate) const FIELD_SAVED_AT: &str = "saved_at";

pub(crate) const FIELDS: [&str; 8] = [
    FIELD_MODE,
    FIELD_URL,
    FIELD_IMAGE,
    FIELD_TEXT,
    FIELD_PLATFORM,
    FIELD_TARGET,
    FIELD_SESSION,
    FIELD_SAVED_AT,
];

pub(crate) fn prefixed(field: &str) -> String {
    format!("{KEY_PREFIX}{field}")
}

/// Typed hand-off between the capture view and the dashboard view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub session_id: String,
    pub mode: AnalysisMode,
    pub url: Option<String>,
    pub image: Option<String>,
    pub text: Option<String>,
    pub platform: Option<String>,
    pub target: Option<String>,
    pub saved_at: Option<DateTime<Utc>>,
}

impl SessionContext {
    pub fn post(input: PostInput) -> Self {
        Self {
            url: Some(input.url),
            ..Self::with_mode(AnalysisMode::Post)
        }
    }

    pub fn pre(input: PreInput) -> Self {
        Self {
            image: Some(input.image),
            text: Some(input.text),
            platform: Some(input.platform),
            target: Some(input.target),
            ..Self::with_mode(AnalysisMode::Pre)
        }
    }

    /// Context seen when the dashboard is opened without a prior capture.
    pub fn empty() -> Self {
        Self::with_mode(AnalysisMode::Post)
    }

    fn with_mode(mode: AnalysisMode) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            mode,
            url: None,
            image: None,
            text: None,
            platform: None,
            target: None,
            saved_at: None,
        }
    }

    pub fn analysis_request(&self) -> AnalysisRequest {
        match self.mode {
            AnalysisMode::Post => AnalysisRequest::Post {
                url: self
                    .url
                    .clone()
                    .filter(|url| !url.is_empty())
                    .unwrap_or_else(|| DEMO_URL.to_string()),
            },
            AnalysisMode::Pre => AnalysisRequest::Pre {
                image: self.image.clone(),
                text: self.text.clone(),
                platform: self.platform.clone(),
                target: self.target.clone(),
            },
        }
    }

    /// Content the follow-up rewrite starts from: the caption, else the url.
    pub fn apply_content(&self) -> Option<String> {
        non_empty(self.text.as_deref()).or_else(|| non_empty(self.url.as_deref()))
    }

    pub(crate) fn to_entries(&self, saved_at: DateTime<Utc>) -> Map<String, Value> {
        let mut entries = Map::new();
        let mut put = |field: &str, value: Option<&str>| {
            if let Some(value) = value {
                entries.insert(prefixed(field), Value::String(value.to_string()));
            }
        };
        put(FIELD_MODE, Some(self.mode.as_str()));
        put(FIELD_URL, self.url.as_deref());
        put(FIELD_IMAGE, self.image.as_deref());
        put(FIELD_TEXT, self.text.as_deref());
        put(FIELD_PLATFORM, self.platform.as_deref());
        put(FIELD_TARGET, self.target.as_deref());
        put(FIELD_SESSION, Some(self.session_id.as_str()));
        put(
            FIELD_SAVED_AT,
            Some(saved_at.to_rfc3339_opts(SecondsFormat::Micros, false).as_str()),
        );
        entries
    }

    pub(crate) fn from_entries(entries: &Map<String, Value>) -> Self {
        let read = |field: &str| {
            entries
                .get(&prefixed(field))
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        let mut context = Self::with_mode(AnalysisMode::parse(read(FIELD_MODE).as_deref()));
        if let Some(session_id) = read(FIELD_SESSION).filter(|value| !value.is_empty()) {
            context.session_id = session_id;
        }
        context.url = read(FIELD_URL);
        context.image = read(FIELD_IMAGE);
        context.text = read(FIELD_TEXT);
        context.platform = read(FIELD_PLATFORM);
        context.target = read(FIELD_TARGET);
        context.saved_at = read(FIELD_SAVED_AT)
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|ts| ts.with_timezone(&Utc));
        context
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
