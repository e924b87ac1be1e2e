use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which input shape was captured and which request schema applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Analyze an already published post by its URL.
    #[default]
    Post,
    /// Predict the reception of a creative that has not been posted yet.
    Pre,
}

impl AnalysisMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Pre => "pre",
        }
    }

    /// Unknown or missing values fall back to `Post`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
            Some("pre") => Self::Pre,
            _ => Self::Post,
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    #[default]
    LinkedIn,
    Instagram,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LinkedIn => "linkedin",
            Self::Instagram => "instagram",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Audience {
    #[default]
    All,
    Youth,
    Adult,
}

impl Audience {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Youth => "youth",
            Self::Adult => "adult",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostInput {
    pub url: String,
}

/// Image plus caption for a not-yet-posted creative.
///
/// `image` is a full `data:` URI and may be several megabytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreInput {
    pub image: String,
    pub text: String,
    pub platform: String,
    pub target: String,
}

/// Value the service substitutes for its bundled sample comments.
pub const DEMO_URL: &str = "demo";

/// Body of `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AnalysisRequest {
    Post {
        url: String,
    },
    Pre {
        image: Option<String>,
        text: Option<String>,
        platform: Option<String>,
        target: Option<String>,
    },
}

impl AnalysisRequest {
    pub fn mode(&self) -> AnalysisMode {
        match self {
            Self::Post { .. } => AnalysisMode::Post,
            Self::Pre { .. } => AnalysisMode::Pre,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisData {
    /// JSON-as-text produced by the strategist model, sometimes fenced.
    pub strategy: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisResponse {
    pub success: bool,
    pub data: Option<AnalysisData>,
    pub error: Option<String>,
}

impl AnalysisResponse {
    /// Reads the envelope without failing on unexpected shapes.
    ///
    /// A `strategy` that arrives as a JSON value instead of text is
    /// re-serialized so the strategy decoder still sees it.
    pub fn from_value(value: &Value) -> Self {
        let data = value.get("data").and_then(Value::as_object).map(|data| {
            AnalysisData {
                strategy: data.get("strategy").and_then(text_or_json),
                summary: data
                    .get("summary")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            }
        });
        Self {
            success: value.get("success").and_then(Value::as_bool).unwrap_or(false),
            data,
            error: value.get("error").and_then(Value::as_str).map(str::to_string),
        }
    }

    pub fn should_render(&self) -> bool {
        self.renderable().is_some()
    }

    /// Data worth projecting onto the dashboard; `None` unless `success && data`.
    pub fn renderable(&self) -> Option<&AnalysisData> {
        if self.success {
            self.data.as_ref()
        } else {
            None
        }
    }
}

fn text_or_json(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn post_request_serializes_with_mode_tag() -> anyhow::Result<()> {
        let request = AnalysisRequest::Post {
            url: "https://www.linkedin.com/posts/abc".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&request)?,
            json!({"mode": "post", "url": "https://www.linkedin.com/posts/abc"})
        );
        Ok(())
    }

    #[test]
    fn pre_request_keeps_missing_fields_as_null() -> anyhow::Result<()> {
        let request = AnalysisRequest::Pre {
            image: Some("data:image/png;base64,AAAA".to_string()),
            text: Some("New drop".to_string()),
            platform: Some("instagram".to_string()),
            target: None,
        };
        let value = serde_json::to_value(&request)?;
        assert_eq!(value["mode"], json!("pre"));
        assert_eq!(value["platform"], json!("instagram"));
        assert_eq!(value["target"], json!(null));
        assert_eq!(request.mode(), AnalysisMode::Pre);
        Ok(())
    }

    #[test]
    fn mode_parse_defaults_to_post() {
        assert_eq!(AnalysisMode::parse(None), AnalysisMode::Post);
        assert_eq!(AnalysisMode::parse(Some("")), AnalysisMode::Post);
        assert_eq!(AnalysisMode::parse(Some("weird")), AnalysisMode::Post);
        assert_eq!(AnalysisMode::parse(Some(" PRE ")), AnalysisMode::Pre);
    }

    #[test]
    fn response_renders_only_on_success_with_data() {
        let ok = AnalysisResponse::from_value(&json!({"success": true, "data": {"strategy": "{}"}}));
        assert!(ok.should_render());

        let failed = AnalysisResponse::from_value(
            &json!({"success": false, "data": {"strategy": "{}"}, "error": "boom"}),
        );
        assert!(failed.renderable().is_none());
        assert_eq!(failed.error.as_deref(), Some("boom"));

        let empty = AnalysisResponse::from_value(&json!({"success": true}));
        assert!(!empty.should_render());
    }

    #[test]
    fn structured_strategy_is_reserialized_as_text() {
        let response = AnalysisResponse::from_value(&json!({
            "success": true,
            "data": {"strategy": {"final_verdict": "Good"}, "summary": "ok"}
        }));
        let data = response.renderable().cloned().unwrap_or_default();
        assert_eq!(data.strategy.as_deref(), Some(r#"{"final_verdict":"Good"}"#));
        assert_eq!(data.summary.as_deref(), Some("ok"));
    }
}
