use serde::Serialize;

/// Highest confidence any count-adjusted candidate can reach
pub const CONFIDENCE_CEILING: f64 = 0.95;

/// Penalty for expressions that match more than one node
pub const MULTI_MATCH_PENALTY: f64 = 0.15;

/// A proposed selector for the target
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePath {
    pub expression: String,
    #[serde(rename = "strategyTag")]
    pub strategy: &'static str,
    pub description: String,
    /// In `[0, 1]`, rounded to two decimals
    pub confidence: f64,
    /// Nodes matched when last evaluated
    pub match_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl CandidatePath {
    pub fn new(
        expression: impl Into<String>,
        strategy: &'static str,
        description: impl Into<String>,
        confidence: f64,
        match_count: usize,
    ) -> Self {
        Self {
            expression: expression.into(),
            strategy,
            description: description.into(),
            confidence: round_confidence(confidence),
            match_count,
            warning: None,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }

    /// Same candidate with a re-measured match count
    pub fn with_match_count(mut self, match_count: usize) -> Self {
        self.match_count = match_count;
        self
    }

    pub fn is_unique(&self) -> bool {
        self.match_count == 1
    }
}

/// Count-adjusted confidence: penalize multi-matches, cap at the ceiling
pub fn adjust_confidence(base: f64, match_count: usize) -> f64 {
    let confidence = if match_count > 1 {
        base - MULTI_MATCH_PENALTY
    } else {
        base
    };
    round_confidence(confidence.clamp(0.0, CONFIDENCE_CEILING))
}

fn round_confidence(confidence: f64) -> f64 {
    (confidence.clamp(0.0, 1.0) * 100.0).round() / 100.0
}
