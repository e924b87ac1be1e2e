use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /apply-suggestions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyRequest {
    pub image: Option<String>,
    pub content: Option<String>,
    pub suggestions: String,
}

/// Envelope returned by the apply endpoint. `data` is itself JSON text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyResult {
    pub success: bool,
    pub data: Option<String>,
    pub error: Option<String>,
}

impl ApplyResult {
    pub fn from_value(value: &Value) -> Self {
        Self {
            success: value.get("success").and_then(Value::as_bool).unwrap_or(false),
            data: value.get("data").and_then(|data| match data {
                Value::Null => None,
                Value::String(text) => Some(text.clone()),
                other => Some(other.to_string()),
            }),
            error: value.get("error").and_then(|error| match error {
                Value::Null => None,
                Value::String(text) => Some(text.clone()),
                other => Some(other.to_string()),
            }),
        }
    }

    /// Decodes the rewritten content. Only meaningful when `success` is set.
    pub fn applied_content(&self) -> anyhow::Result<AppliedContent> {
        let raw = self
            .data
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("apply result carried no data"))?;
        let parsed: AppliedContent = serde_json::from_str(raw)?;
        Ok(parsed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppliedContent {
    pub new_content: String,
    pub new_image_prompt: String,
}
