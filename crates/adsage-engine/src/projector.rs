use adsage_contracts::analysis::{AnalysisData, AnalysisMode};
use adsage_contracts::strategy::{lenient_decode, Priority, StrategyDocument, Suggestion};

pub const SUMMARY_PLACEHOLDER: &str = "Analysis complete.";
pub const UNKNOWN_TONE: &str = "Unknown";
pub const ENGAGEMENT_SCORE_DEFAULT: &str = "N/A";
pub const ENGAGEMENT_EXPLANATION_DEFAULT: &str = "Based on visual appeal";
pub const VIRALITY_DEFAULT: &str = "Medium";
pub const HASHTAG_INSIGHT_DEFAULT: &str = "AI suggested tags.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Star,
    TrendUp,
    Lightbulb,
}

impl Icon {
    pub fn for_priority(priority: &Priority) -> Self {
        match priority {
            Priority::High => Self::Star,
            Priority::Medium => Self::TrendUp,
            _ => Self::Lightbulb,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Star => "fa-star",
            Self::TrendUp => "fa-arrow-trend-up",
            Self::Lightbulb => "fa-lightbulb",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionItem {
    pub icon: Icon,
    pub title: String,
    pub badge: String,
    pub description: String,
}

impl SuggestionItem {
    fn from_suggestion(suggestion: &Suggestion) -> Self {
        Self {
            icon: Icon::for_priority(&suggestion.priority),
            title: suggestion.title.clone(),
            badge: suggestion.priority.label().to_string(),
            description: suggestion.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryBlock {
    KeyStrengths(Vec<String>),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToneGauge {
    pub label: String,
    pub score: f64,
    /// Width of the gauge bar in percent, clamped to `0..=100`.
    pub bar_width: f64,
}

impl ToneGauge {
    pub fn score_text(&self) -> String {
        format!("{}%", self.score)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngagementPanel {
    pub score: String,
    pub explanation: String,
    pub virality: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StrategyColumn {
    #[default]
    Empty,
    ProsCons {
        pros: Vec<String>,
        cons: Vec<String>,
    },
    Hashtags {
        trending: Vec<String>,
        niche: Vec<String>,
        insight: String,
    },
}

impl StrategyColumn {
    pub fn title(&self) -> Option<&'static str> {
        match self {
            Self::Empty => None,
            Self::ProsCons { .. } => Some("Pros & Cons"),
            Self::Hashtags { .. } => Some("Hashtag Strategy"),
        }
    }
}

/// Audience split bars shown under the verdict once results appear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AudienceSplit {
    pub youth: u8,
    pub adult: u8,
    pub senior: u8,
}

impl AudienceSplit {
    pub const ANIMATED: Self = Self {
        youth: 65,
        adult: 30,
        senior: 5,
    };
}

/// Visible content of every dashboard widget.
///
/// Starts out as the empty markup; widgets whose source field is absent keep
/// whatever they showed before.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub verdict: Option<String>,
    pub suggestions: Option<Vec<SuggestionItem>>,
    pub summary: Option<SummaryBlock>,
    pub tone: Option<ToneGauge>,
    pub engagement: Option<EngagementPanel>,
    pub strategy_column: StrategyColumn,
    pub audience: AudienceSplit,
}

impl DashboardState {
    pub fn apply(&mut self, projection: Projection) {
        if let Some(verdict) = projection.verdict {
            self.verdict = Some(verdict);
        }
        if let Some(suggestions) = projection.suggestions {
            self.suggestions = Some(suggestions);
        }
        self.summary = Some(projection.summary);
        self.tone = Some(projection.tone);
        if let Some(engagement) = projection.engagement {
            self.engagement = Some(engagement);
        }
        if let Some(column) = projection.strategy_column {
            self.strategy_column = column;
        }
    }
}

/// Widget values derived from one response. `None` means "leave as is".
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub verdict: Option<String>,
    pub suggestions: Option<Vec<SuggestionItem>>,
    pub summary: SummaryBlock,
    pub tone: ToneGauge,
    pub engagement: Option<EngagementPanel>,
    pub strategy_column: Option<StrategyColumn>,
}

pub fn project(document: &StrategyDocument, summary: Option<&str>, mode: AnalysisMode) -> Projection {
    Projection {
        verdict: document
            .final_verdict
            .clone()
            .filter(|verdict| !verdict.is_empty()),
        suggestions: document
            .strategic_suggestions
            .as_ref()
            .map(|rows| rows.iter().map(SuggestionItem::from_suggestion).collect()),
        summary: summary_block(document, summary),
        tone: tone_gauge(document),
        engagement: document.engagement_metrics.as_ref().map(|metrics| EngagementPanel {
            score: or_default(metrics.score.as_deref(), ENGAGEMENT_SCORE_DEFAULT),
            explanation: or_default(
                metrics.explanation.as_deref(),
                ENGAGEMENT_EXPLANATION_DEFAULT,
            ),
            virality: or_default(metrics.virality.as_deref(), VIRALITY_DEFAULT),
        }),
        strategy_column: strategy_column(document, mode),
    }
}

/// Decodes the strategy text and projects it onto `state`.
///
/// Returns the decoded document so follow-up actions can reuse it.
pub fn render(state: &mut DashboardState, data: &AnalysisData, mode: AnalysisMode) -> StrategyDocument {
    let document = lenient_decode(data.strategy.as_deref());
    state.apply(project(&document, data.summary.as_deref(), mode));
    document
}

fn summary_block(document: &StrategyDocument, summary: Option<&str>) -> SummaryBlock {
    match document.shared_positives.as_deref() {
        Some(positives) if !positives.is_empty() => SummaryBlock::KeyStrengths(positives.to_vec()),
        _ => SummaryBlock::Text(or_default(summary, SUMMARY_PLACEHOLDER)),
    }
}

fn tone_gauge(document: &StrategyDocument) -> ToneGauge {
    let (label, score) = match &document.tone_analysis {
        Some(tone) => (
            or_default(tone.label.as_deref(), UNKNOWN_TONE),
            tone.score.unwrap_or(0.0),
        ),
        None => (UNKNOWN_TONE.to_string(), 0.0),
    };
    ToneGauge {
        label,
        score,
        bar_width: score.clamp(0.0, 100.0),
    }
}

fn strategy_column(document: &StrategyDocument, mode: AnalysisMode) -> Option<StrategyColumn> {
    if mode == AnalysisMode::Pre {
        if let Some(pros_cons) = &document.pros_cons {
            return Some(StrategyColumn::ProsCons {
                pros: pros_cons.pros.clone(),
                cons: pros_cons.cons.clone(),
            });
        }
    }
    document
        .hashtag_strategy
        .as_ref()
        .map(|tags| StrategyColumn::Hashtags {
            trending: tags.trending.clone(),
            niche: tags.niche.clone(),
            insight: or_default(tags.insight.as_deref(), HASHTAG_INSIGHT_DEFAULT),
        })
}

fn or_default(value: Option<&str>, default: &str) -> String {
    value
        .filter(|value| !value.is_empty())
        .unwrap_or(default)
        .to_string()
}
