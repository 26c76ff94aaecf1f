use serde::{Deserialize, Serialize};

/// Personality traits carried by characters.
///
/// Names outside the known set survive as `Custom` so roster data never fails to load
/// over flavor text; custom traits simply contribute nothing to scoring.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Trait {
    Ambitious,
    Proud,
    Bold,
    Determined,
    Charismatic,
    Eloquent,
    Persuasive,
    Confident,
    Diplomatic,
    Strategic,
    Disciplined,
    Courageous,
    Resolute,
    Kind,
    Cheerful,
    Generous,
    Warm,
    Pious,
    Devout,
    Shrewd,
    Calculating,
    Cautious,
    Content,
    Patient,
    Naval,
    Custom(String),
}

impl Trait {
    pub fn as_str(&self) -> &str {
        match self {
            Trait::Ambitious => "ambitious",
            Trait::Proud => "proud",
            Trait::Bold => "bold",
            Trait::Determined => "determined",
            Trait::Charismatic => "charismatic",
            Trait::Eloquent => "eloquent",
            Trait::Persuasive => "persuasive",
            Trait::Confident => "confident",
            Trait::Diplomatic => "diplomatic",
            Trait::Strategic => "strategic",
            Trait::Disciplined => "disciplined",
            Trait::Courageous => "courageous",
            Trait::Resolute => "resolute",
            Trait::Kind => "kind",
            Trait::Cheerful => "cheerful",
            Trait::Generous => "generous",
            Trait::Warm => "warm",
            Trait::Pious => "pious",
            Trait::Devout => "devout",
            Trait::Shrewd => "shrewd",
            Trait::Calculating => "calculating",
            Trait::Cautious => "cautious",
            Trait::Content => "content",
            Trait::Patient => "patient",
            Trait::Naval => "naval",
            Trait::Custom(s) => s,
        }
    }
}

impl From<Trait> for String {
    fn from(t: Trait) -> Self {
        match t {
            Trait::Custom(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl TryFrom<String> for Trait {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("trait cannot be empty".into());
        }
        Ok(match trimmed.to_ascii_lowercase().as_str() {
            "ambitious" => Trait::Ambitious,
            "proud" => Trait::Proud,
            "bold" => Trait::Bold,
            "determined" => Trait::Determined,
            "charismatic" => Trait::Charismatic,
            "eloquent" => Trait::Eloquent,
            "persuasive" => Trait::Persuasive,
            "confident" => Trait::Confident,
            "diplomatic" => Trait::Diplomatic,
            "strategic" => Trait::Strategic,
            "disciplined" => Trait::Disciplined,
            // Roster data uses both spellings of the same disposition.
            "courageous" | "brave" => Trait::Courageous,
            "resolute" => Trait::Resolute,
            "kind" => Trait::Kind,
            "cheerful" => Trait::Cheerful,
            "generous" => Trait::Generous,
            "warm" => Trait::Warm,
            "pious" => Trait::Pious,
            "devout" => Trait::Devout,
            "shrewd" => Trait::Shrewd,
            "calculating" => Trait::Calculating,
            "cautious" => Trait::Cautious,
            "content" => Trait::Content,
            "patient" => Trait::Patient,
            "naval" => Trait::Naval,
            _ => Trait::Custom(trimmed.to_string()),
        })
    }
}

/// Sum of the weights of every listed trait the character carries.
pub fn trait_weight(traits: &[Trait], table: &[(Trait, f64)]) -> f64 {
    table
        .iter()
        .filter(|(t, _)| traits.contains(t))
        .map(|(_, w)| w)
        .sum()
}
