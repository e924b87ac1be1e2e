use serde_json::{Map, Value};

/// Priority tier attached to a strategic suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Priority {
    High,
    Medium,
    Low,
    /// Anything else the model wrote, kept verbatim for the badge.
    Other(String),
}

impl Priority {
    /// Matching is exact, the same way the service spells the tiers.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "High" => Self::High,
            "Medium" => Self::Medium,
            "Low" => Self::Low,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToneAnalysis {
    pub label: Option<String>,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngagementMetrics {
    pub score: Option<String>,
    pub explanation: Option<String>,
    pub virality: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProsCons {
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashtagStrategy {
    pub trending: Vec<String>,
    pub niche: Vec<String>,
    pub insight: Option<String>,
}

/// Best-effort view of the strategist's output. Every field is optional and
/// each one is read on its own, so a malformed field only blanks its widget.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyDocument {
    pub final_verdict: Option<String>,
    pub strategic_suggestions: Option<Vec<Suggestion>>,
    pub shared_positives: Option<Vec<String>>,
    pub tone_analysis: Option<ToneAnalysis>,
    pub engagement_metrics: Option<EngagementMetrics>,
    pub pros_cons: Option<ProsCons>,
    pub hashtag_strategy: Option<HashtagStrategy>,
}

impl StrategyDocument {
    /// Degraded document carrying the raw text as its verdict.
    pub fn fallback(raw: &str) -> Self {
        Self {
            final_verdict: Some(raw.to_string()),
            ..Self::default()
        }
    }

    pub fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            final_verdict: object.get("final_verdict").and_then(scalar_text),
            strategic_suggestions: object
                .get("strategic_suggestions")
                .and_then(Value::as_array)
                .map(|rows| rows.iter().filter_map(suggestion_from_value).collect()),
            shared_positives: object.get("shared_positives").and_then(text_list),
            tone_analysis: object
                .get("tone_analysis")
                .and_then(Value::as_object)
                .map(|tone| ToneAnalysis {
                    label: tone.get("label").and_then(scalar_text),
                    score: tone.get("score").and_then(number_like),
                }),
            engagement_metrics: object
                .get("engagement_metrics")
                .and_then(Value::as_object)
                .map(|metrics| EngagementMetrics {
                    score: metrics.get("score").and_then(scalar_text),
                    explanation: metrics.get("explanation").and_then(scalar_text),
                    virality: metrics.get("virality").and_then(scalar_text),
                }),
            pros_cons: object
                .get("pros_cons")
                .and_then(Value::as_object)
                .map(|pros_cons| ProsCons {
                    pros: pros_cons.get("pros").and_then(text_list).unwrap_or_default(),
                    cons: pros_cons.get("cons").and_then(text_list).unwrap_or_default(),
                }),
            hashtag_strategy: object
                .get("hashtag_strategy")
                .and_then(Value::as_object)
                .map(|tags| HashtagStrategy {
                    trending: tags.get("trending").and_then(text_list).unwrap_or_default(),
                    niche: tags.get("niche").and_then(text_list).unwrap_or_default(),
                    insight: tags.get("insight").and_then(scalar_text),
                }),
        }
    }

    /// Descriptions of every suggestion, one per line, as the apply endpoint expects.
    pub fn suggestions_text(&self) -> String {
        self.strategic_suggestions
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|suggestion| suggestion.description.as_str())
            .collect::<Vec<&str>>()
            .join("\n")
    }
}

/// Removes every ```` ```json ```` and ```` ``` ```` marker and trims.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Decodes the strategy text the service embeds in its response.
///
/// Missing text decodes as an empty object. Text that is not a JSON object
/// once fences are stripped collapses to `{final_verdict: <original text>}`.
pub fn lenient_decode(raw: Option<&str>) -> StrategyDocument {
    let original = raw.unwrap_or("{}");
    let cleaned = strip_code_fences(original);
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(Value::Object(object)) => StrategyDocument::from_object(&object),
        Ok(other) => {
            log::warn!(
                "strategy payload is JSON but not an object ({}); using raw text",
                json_kind(&other)
            );
            StrategyDocument::fallback(original)
        }
        Err(err) => {
            log::warn!("could not parse strategy JSON: {err}");
            StrategyDocument::fallback(original)
        }
    }
}

fn suggestion_from_value(value: &Value) -> Option<Suggestion> {
    let row = value.as_object()?;
    Some(Suggestion {
        title: row.get("title").and_then(scalar_text).unwrap_or_default(),
        description: row
            .get("description")
            .and_then(scalar_text)
            .unwrap_or_default(),
        priority: Priority::parse(
            row.get("priority")
                .and_then(scalar_text)
                .as_deref()
                .unwrap_or_default(),
        ),
    })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn number_like(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

fn text_list(value: &Value) -> Option<Vec<String>> {
    let rows = value.as_array()?;
    Some(rows.iter().filter_map(scalar_text).collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn fenced_json_round_trips() {
        let doc = lenient_decode(Some("```json\n{\"final_verdict\":\"Good\"}\n```"));
        assert_eq!(
            doc,
            StrategyDocument {
                final_verdict: Some("Good".to_string()),
                ..StrategyDocument::default()
            }
        );
    }

    #[test]
    fn plain_text_collapses_to_verdict() {
        let doc = lenient_decode(Some("not json at all"));
        assert_eq!(doc, StrategyDocument::fallback("not json at all"));
    }

    #[test]
    fn fallback_keeps_original_unstripped_text() {
        let raw = "```\nnot json\n```";
        assert_eq!(lenient_decode(Some(raw)).final_verdict.as_deref(), Some(raw));
    }

    #[test]
    fn missing_strategy_is_an_empty_document() {
        assert_eq!(lenient_decode(None), StrategyDocument::default());
    }

    #[test]
    fn non_object_json_falls_back() {
        assert_eq!(lenient_decode(Some("[1, 2]")), StrategyDocument::fallback("[1, 2]"));
        assert_eq!(lenient_decode(Some("42")), StrategyDocument::fallback("42"));
    }

    #[test]
    fn full_document_decodes_every_section() {
        let raw = r##"{
            "final_verdict": "<b>Ship it</b>",
            "tone_analysis": {"label": "Inspirational", "score": 88},
            "engagement_metrics": {"score": "8.5/10", "virality": "High", "explanation": "Strong hook"},
            "hashtag_strategy": {"trending": ["#Ai"], "niche": ["#AdOps"], "insight": "Broad plus niche"},
            "pros_cons": {"pros": ["Clear"], "cons": ["Long"]},
            "strategic_suggestions": [
                {"title": "A", "priority": "High", "description": "first"},
                {"title": "B", "priority": "Medium", "description": "second"},
                {"title": "C", "priority": "urgent", "description": "third"}
            ],
            "shared_positives": ["Colors", "Copy"]
        }"##;
        let doc = lenient_decode(Some(raw));
        assert_eq!(doc.final_verdict.as_deref(), Some("<b>Ship it</b>"));
        assert_eq!(
            doc.tone_analysis,
            Some(ToneAnalysis {
                label: Some("Inspirational".to_string()),
                score: Some(88.0),
            })
        );
        let engagement = doc.engagement_metrics.clone().unwrap_or(EngagementMetrics {
            score: None,
            explanation: None,
            virality: None,
        });
        assert_eq!(engagement.score.as_deref(), Some("8.5/10"));
        assert_eq!(engagement.virality.as_deref(), Some("High"));
        let priorities: Vec<Priority> = doc
            .strategic_suggestions
            .clone()
            .unwrap_or_default()
            .into_iter()
            .map(|suggestion| suggestion.priority)
            .collect();
        assert_eq!(
            priorities,
            vec![
                Priority::High,
                Priority::Medium,
                Priority::Other("urgent".to_string())
            ]
        );
        assert_eq!(doc.suggestions_text(), "first\nsecond\nthird");
        assert_eq!(
            doc.shared_positives,
            Some(vec!["Colors".to_string(), "Copy".to_string()])
        );
        assert!(doc.pros_cons.is_some());
        assert!(doc.hashtag_strategy.is_some());
    }

    #[test]
    fn malformed_field_only_blanks_itself() {
        let doc = lenient_decode(Some(
            r#"{"final_verdict": "Fine", "tone_analysis": "calm", "strategic_suggestions": {"x": 1}}"#,
        ));
        assert_eq!(doc.final_verdict.as_deref(), Some("Fine"));
        assert_eq!(doc.tone_analysis, None);
        assert_eq!(doc.strategic_suggestions, None);
    }

    #[test]
    fn tone_score_accepts_percent_strings() {
        let doc = lenient_decode(Some(r#"{"tone_analysis": {"label": "Calm", "score": "72%"}}"#));
        assert_eq!(doc.tone_analysis.and_then(|tone| tone.score), Some(72.0));
    }
}
