use serde::{Deserialize, Serialize};

use super::character::SocialClass;

/// The vote bloc that elects an office; selects the vote-score formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Assembly {
    #[serde(alias = "CenturiateType", alias = "centuriate")]
    Centuriate,
    #[serde(alias = "TribalType", alias = "tribal")]
    Tribal,
    #[serde(alias = "PlebeianType", alias = "plebeian")]
    Plebeian,
}

/// An immutable office definition. Constructed only through the catalogue, which
/// validates every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeDefinition {
    pub id: String,
    pub name: String,
    pub assembly: Assembly,
    pub min_age: u32,
    pub term_length_years: u32,
    pub seats: usize,
    #[serde(default)]
    pub reelection_gap_years: u32,
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub requires_plebeian: bool,
    #[serde(default)]
    pub requires_patrician: bool,
    #[serde(default)]
    pub prerequisites_all: Vec<String>,
    #[serde(default)]
    pub prerequisites_any: Vec<String>,
}

impl OfficeDefinition {
    /// Last year of a term that starts in `start_year`.
    pub fn term_end(&self, start_year: i32) -> i32 {
        start_year + self.term_length_years.max(1) as i32 - 1
    }

    /// The class an office is restricted to, if any.
    pub fn required_class(&self) -> Option<SocialClass> {
        if self.requires_plebeian {
            Some(SocialClass::Plebeian)
        } else if self.requires_patrician {
            Some(SocialClass::Patrician)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembly_accepts_catalogue_aliases() {
        let a: Assembly = serde_json::from_str(r#""CenturiateType""#).unwrap();
        let b: Assembly = serde_json::from_str(r#""tribal""#).unwrap();
        let c: Assembly = serde_json::from_str(r#""Plebeian""#).unwrap();
        assert_eq!(a, Assembly::Centuriate);
        assert_eq!(b, Assembly::Tribal);
        assert_eq!(c, Assembly::Plebeian);
    }

    #[test]
    fn term_end_is_inclusive() {
        let office: OfficeDefinition = serde_json::from_str(
            r#"{"id":"censor","name":"Censor","assembly":"Centuriate","minAge":45,
                "termLengthYears":5,"seats":2}"#,
        )
        .unwrap();
        assert_eq!(office.term_end(-240), -236);
        assert_eq!(office.required_class(), None);
        assert!(office.prerequisites_all.is_empty());
    }
}
