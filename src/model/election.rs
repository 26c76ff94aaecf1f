use serde::{Deserialize, Serialize};

/// One labeled contribution to a desire or vote score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    pub label: String,
    pub value: f64,
}

/// Ordered list of labeled score contributions, kept for explainability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorBreakdown {
    pub factors: Vec<Factor>,
}

impl FactorBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: &str, value: f64) {
        self.factors.push(Factor {
            label: label.to_string(),
            value,
        });
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.factors
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value)
    }

    pub fn total(&self) -> f64 {
        self.factors.iter().map(|f| f.value).sum()
    }

    /// Labels of the `n` largest strictly positive factors, largest first.
    /// Ties keep insertion order.
    pub fn top_positive(&self, n: usize) -> Vec<&str> {
        let mut positive: Vec<&Factor> = self.factors.iter().filter(|f| f.value > 0.0).collect();
        positive.sort_by(|a, b| b.value.total_cmp(&a.value));
        positive.into_iter().take(n).map(|f| f.label.as_str()).collect()
    }
}

/// A character's recorded intent to run for one office in one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub character_id: u64,
    pub character_name: String,
    pub office_id: String,
    pub year: i32,
    pub desire: f64,
    pub breakdown: FactorBreakdown,
}

/// A declaration bound to election-day scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectionCandidate {
    pub declaration: Declaration,
    pub score: f64,
    pub breakdown: FactorBreakdown,
}

impl ElectionCandidate {
    pub fn character_id(&self) -> u64 {
        self.declaration.character_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub character_id: u64,
    pub name: String,
    pub score: f64,
    pub support_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinnerSummary {
    pub character_id: u64,
    pub name: String,
    pub seat_index: usize,
    pub term_start: i32,
    pub term_end: i32,
    pub deferred: bool,
    pub support_share: f64,
    pub justification: String,
}

/// Permanent record of one office's election in one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectionResultRecord {
    pub year: i32,
    pub office_id: String,
    pub office_name: String,
    pub candidates: Vec<CandidateSummary>,
    pub winners: Vec<WinnerSummary>,
}

impl ElectionResultRecord {
    pub fn winner_ids(&self) -> Vec<u64> {
        self.winners.iter().map(|w| w.character_id).collect()
    }
}
