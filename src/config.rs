use serde::{Deserialize, Serialize};

use crate::model::{CalendarDay, Gender};

/// Who may stand for office beyond the per-office rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityRules {
    /// Restrict every office to one gender. `None` opens offices to everyone.
    pub gender_restriction: Option<Gender>,
}

impl Default for EligibilityRules {
    fn default() -> Self {
        Self {
            gender_restriction: Some(Gender::Male),
        }
    }
}

/// Configuration for the election cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectionConfig {
    /// Day declarations open each year.
    pub declaration_day: CalendarDay,
    /// Day votes are cast. Must fall after `declaration_day`.
    pub election_day: CalendarDay,
    /// Winners take their seat on the first day of the following year.
    pub defer_assignments: bool,
    /// Fraction of a character's best desire score an office must reach to be
    /// considered at all (0.0 to 1.0).
    pub candidacy_threshold: f64,
    pub eligibility: EligibilityRules,
}

impl Default for ElectionConfig {
    fn default() -> Self {
        Self {
            declaration_day: CalendarDay::new(1, 15),
            election_day: CalendarDay::new(7, 1),
            defer_assignments: true,
            candidacy_threshold: 0.65,
            eligibility: EligibilityRules::default(),
        }
    }
}

impl ElectionConfig {
    /// Parse a (possibly partial) JSON config; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Clamp out-of-range values back to something the cycle can run with.
    pub fn sanitized(mut self) -> Self {
        if self.election_day <= self.declaration_day {
            tracing::warn!(
                "election day {:?} is not after declaration day {:?}; using defaults",
                self.election_day,
                self.declaration_day
            );
            let defaults = Self::default();
            self.declaration_day = defaults.declaration_day;
            self.election_day = defaults.election_day;
        }
        if !(0.0..=1.0).contains(&self.candidacy_threshold) {
            tracing::warn!(
                "candidacy threshold {} out of range; clamping",
                self.candidacy_threshold
            );
            self.candidacy_threshold = self.candidacy_threshold.clamp(0.0, 1.0);
        }
        self
    }
}
