use thiserror::Error;

use crate::catalog::OfficeCatalog;
use crate::config::EligibilityRules;
use crate::ledger::SeatLedger;
use crate::model::{Character, Gender, OfficeDefinition, SocialClass};

/// Why a character may not stand for an office. Only the first failing rule is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Ineligibility {
    #[error("is not alive")]
    Deceased,
    #[error("office is open only to {required:?} candidates")]
    GenderRestricted { required: Gender },
    #[error("is {age}, below the minimum age of {min_age}")]
    TooYoung { age: u32, min_age: u32 },
    #[error("office is reserved for the {required:?} class")]
    ClassRestricted { required: SocialClass },
    #[error("has not completed the required office `{office_id}`")]
    MissingPrerequisite { office_id: String },
    #[error("has completed none of the qualifying offices")]
    NoQualifyingPrerequisite,
    #[error("held this office in {last_held}; must wait {gap_years} years between terms")]
    ReelectionGap { last_held: i32, gap_years: u32 },
    #[error("already holds this office")]
    AlreadyHoldsOffice,
    #[error("already holds the office `{office_id}`")]
    HoldsOtherOffice { office_id: String },
    #[error("is already due to take up this office")]
    AlreadyPending,
    #[error("is already due to take up the office `{office_id}`")]
    PendingElsewhere { office_id: String },
}

/// Pure eligibility predicate over the ledger. Never mutates anything.
pub struct EligibilityEvaluator<'a> {
    catalog: &'a OfficeCatalog,
    ledger: &'a SeatLedger,
    rules: &'a EligibilityRules,
}

impl<'a> EligibilityEvaluator<'a> {
    pub fn new(
        catalog: &'a OfficeCatalog,
        ledger: &'a SeatLedger,
        rules: &'a EligibilityRules,
    ) -> Self {
        Self {
            catalog,
            ledger,
            rules,
        }
    }

    /// Run every rule in order, stopping at the first failure.
    pub fn check(
        &self,
        character: &Character,
        office: &OfficeDefinition,
        year: i32,
    ) -> Result<(), Ineligibility> {
        if !character.alive {
            return Err(Ineligibility::Deceased);
        }

        if let Some(required) = self.rules.gender_restriction
            && character.gender != required
        {
            return Err(Ineligibility::GenderRestricted { required });
        }

        if character.age < office.min_age {
            return Err(Ineligibility::TooYoung {
                age: character.age,
                min_age: office.min_age,
            });
        }

        if let Some(required) = office.required_class()
            && character.class != required
        {
            return Err(Ineligibility::ClassRestricted { required });
        }

        if let Some(missing) = office
            .prerequisites_all
            .iter()
            .find(|p| !self.prerequisite_met(character.id, p, year))
        {
            return Err(Ineligibility::MissingPrerequisite {
                office_id: missing.clone(),
            });
        }

        if !office.prerequisites_any.is_empty()
            && !office
                .prerequisites_any
                .iter()
                .any(|p| self.prerequisite_met(character.id, p, year))
        {
            return Err(Ineligibility::NoQualifyingPrerequisite);
        }

        if let Some(last_held) = self.last_held(character.id, &office.id)
            && year - last_held < office.reelection_gap_years as i32
        {
            return Err(Ineligibility::ReelectionGap {
                last_held,
                gap_years: office.reelection_gap_years,
            });
        }

        let active = self.ledger.active_for(character.id);
        if active
            .iter()
            .any(|r| r.office_id == office.id && r.term_end > year)
        {
            return Err(Ineligibility::AlreadyHoldsOffice);
        }
        if let Some(other) = active.iter().find(|r| r.term_end > year) {
            return Err(Ineligibility::HoldsOtherOffice {
                office_id: other.office_id.clone(),
            });
        }

        let pending = self.ledger.pending_for(character.id);
        if pending.iter().any(|p| p.office_id == office.id) {
            return Err(Ineligibility::AlreadyPending);
        }
        if let Some(other) = pending.iter().find(|p| p.start_year > year) {
            return Err(Ineligibility::PendingElsewhere {
                office_id: other.office_id.clone(),
            });
        }

        Ok(())
    }

    pub fn is_eligible(&self, character: &Character, office: &OfficeDefinition, year: i32) -> bool {
        self.check(character, office, year).is_ok()
    }

    /// Every office the character may stand for, highest rank first, then lowest
    /// minimum age, then catalogue order.
    pub fn eligible_offices(&self, character: &Character, year: i32) -> Vec<&'a OfficeDefinition> {
        let mut offices: Vec<&OfficeDefinition> = self
            .catalog
            .iter()
            .filter(|office| self.is_eligible(character, office, year))
            .collect();
        offices.sort_by(|a, b| b.rank.cmp(&a.rank).then(a.min_age.cmp(&b.min_age)));
        offices
    }

    /// Completed, or currently held with a term that ends by `year`.
    fn prerequisite_met(&self, character_id: u64, office_id: &str, year: i32) -> bool {
        self.ledger.has_completed(character_id, office_id)
            || self
                .ledger
                .active_for(character_id)
                .iter()
                .any(|r| r.office_id == office_id && r.term_end <= year)
    }

    /// Most recent year the character held the office, counting a term still running.
    fn last_held(&self, character_id: u64, office_id: &str) -> Option<i32> {
        let sitting = self
            .ledger
            .active_for(character_id)
            .into_iter()
            .filter(|r| r.office_id == office_id)
            .map(|r| r.term_end)
            .max();
        self.ledger
            .last_held_year(character_id, office_id)
            .max(sitting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{character, office, office_with};

    struct Fixture {
        catalog: OfficeCatalog,
        ledger: SeatLedger,
        rules: EligibilityRules,
    }

    impl Fixture {
        fn new() -> Self {
            let catalog = OfficeCatalog::from_definitions(vec![
                office("quaestor", 8, 1, 30, 1),
                office_with("tribune", 10, 1, 27, 2, |o| o.requires_plebeian = true),
                office_with("praetor", 2, 1, 39, 4, |o| {
                    o.prerequisites_any = vec!["quaestor".into(), "tribune".into()];
                    o.reelection_gap_years = 2;
                }),
                office_with("consul", 2, 1, 42, 5, |o| {
                    o.prerequisites_all = vec!["praetor".into()];
                    o.reelection_gap_years = 10;
                }),
            ]);
            Self {
                catalog,
                ledger: SeatLedger::new(),
                rules: EligibilityRules::default(),
            }
        }

        fn office(&self, id: &str) -> OfficeDefinition {
            self.catalog.get(id).unwrap().clone()
        }

        fn check(&self, c: &Character, office_id: &str, year: i32) -> Result<(), Ineligibility> {
            let evaluator = EligibilityEvaluator::new(&self.catalog, &self.ledger, &self.rules);
            evaluator.check(c, self.catalog.get(office_id).unwrap(), year)
        }
    }

    #[test]
    fn first_failing_rule_is_reported() {
        let f = Fixture::new();
        let mut c = character(1, 20, SocialClass::Patrician, 5.0);
        c.alive = false;
        c.gender = Gender::Female;
        // Dead, wrong gender and too young: death is reported.
        assert_eq!(f.check(&c, "consul", -248), Err(Ineligibility::Deceased));
        c.alive = true;
        assert_eq!(
            f.check(&c, "consul", -248),
            Err(Ineligibility::GenderRestricted {
                required: Gender::Male
            })
        );
        c.gender = Gender::Male;
        assert_eq!(
            f.check(&c, "consul", -248),
            Err(Ineligibility::TooYoung {
                age: 20,
                min_age: 42
            })
        );
    }

    #[test]
    fn gender_rule_is_configurable() {
        let mut f = Fixture::new();
        let mut c = character(1, 35, SocialClass::Patrician, 5.0);
        c.gender = Gender::Female;
        assert!(f.check(&c, "quaestor", -248).is_err());
        f.rules.gender_restriction = None;
        assert!(f.check(&c, "quaestor", -248).is_ok());
    }

    #[test]
    fn class_restriction() {
        let f = Fixture::new();
        let patrician = character(1, 35, SocialClass::Patrician, 5.0);
        let plebeian = character(2, 35, SocialClass::Plebeian, 5.0);
        assert_eq!(
            f.check(&patrician, "tribune", -248),
            Err(Ineligibility::ClassRestricted {
                required: SocialClass::Plebeian
            })
        );
        assert!(f.check(&plebeian, "tribune", -248).is_ok());
    }

    #[test]
    fn prerequisites_all_and_any() {
        let mut f = Fixture::new();
        let c = character(1, 45, SocialClass::Patrician, 5.0);
        assert_eq!(
            f.check(&c, "consul", -248),
            Err(Ineligibility::MissingPrerequisite {
                office_id: "praetor".into()
            })
        );
        assert_eq!(
            f.check(&c, "praetor", -248),
            Err(Ineligibility::NoQualifyingPrerequisite)
        );

        // Currently holding a quaestorship that ends this year counts.
        let quaestor = f.office("quaestor");
        f.ledger.assign(&quaestor, 1, -248, false).unwrap();
        assert!(f.check(&c, "praetor", -248).is_ok());
        // ...but not when checked for a year in which the term is still running.
        let censor_like = office("censor", 1, 5, 40, 6);
        let mut g = Fixture::new();
        g.ledger.assign(&censor_like, 1, -250, false).unwrap();
        assert_eq!(
            g.check(&c, "quaestor", -248),
            Err(Ineligibility::HoldsOtherOffice {
                office_id: "censor".into()
            })
        );
    }

    #[test]
    fn reelection_gap_counts_from_last_year_held() {
        let mut f = Fixture::new();
        let c = character(1, 45, SocialClass::Patrician, 5.0);
        let quaestor = f.office("quaestor");
        let praetor = f.office("praetor");
        f.ledger.assign(&quaestor, 1, -252, false).unwrap();
        f.ledger.assign(&praetor, 1, -250, false).unwrap();
        f.ledger.remove_character(1, -250);

        assert_eq!(
            f.check(&c, "praetor", -249),
            Err(Ineligibility::ReelectionGap {
                last_held: -250,
                gap_years: 2
            })
        );
        assert!(f.check(&c, "praetor", -248).is_ok());
    }

    #[test]
    fn sitting_holder_cannot_run_again_for_the_same_office() {
        let mut f = Fixture::new();
        let c = character(1, 45, SocialClass::Patrician, 5.0);
        let quaestor = f.office("quaestor");
        f.ledger.assign(&quaestor, 1, -252, false).unwrap();
        let praetor = f.office("praetor");
        f.ledger.assign(&praetor, 1, -248, false).unwrap();
        // Term ends this year, but the gap still applies from the running term.
        assert_eq!(
            f.check(&c, "praetor", -248),
            Err(Ineligibility::ReelectionGap {
                last_held: -248,
                gap_years: 2
            })
        );
    }

    #[test]
    fn pending_successions_block_candidacy() {
        let mut f = Fixture::new();
        let c = character(1, 45, SocialClass::Patrician, 5.0);
        let quaestor = f.office("quaestor");
        f.ledger.assign(&quaestor, 1, -248, true).unwrap();
        assert_eq!(
            f.check(&c, "quaestor", -248),
            Err(Ineligibility::AlreadyPending)
        );
        let aedile = office("aedile", 2, 1, 30, 3);
        let catalog = OfficeCatalog::from_definitions(vec![aedile.clone()]);
        let evaluator = EligibilityEvaluator::new(&catalog, &f.ledger, &f.rules);
        assert_eq!(
            evaluator.check(&c, &aedile, -248),
            Err(Ineligibility::PendingElsewhere {
                office_id: "quaestor".into()
            })
        );
    }

    #[test]
    fn eligible_offices_are_ranked() {
        let mut f = Fixture::new();
        let c = character(1, 45, SocialClass::Plebeian, 5.0);
        let tribune = f.office("tribune");
        f.ledger.assign(&tribune, 1, -250, false).unwrap();
        f.ledger.remove_character(1, -250);

        let evaluator = EligibilityEvaluator::new(&f.catalog, &f.ledger, &f.rules);
        let ids: Vec<&str> = evaluator
            .eligible_offices(&c, -248)
            .iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(ids, vec!["praetor", "tribune", "quaestor"]);
    }

    #[test]
    fn reasons_read_as_sentences() {
        let reason = Ineligibility::TooYoung {
            age: 20,
            min_age: 42,
        };
        assert_eq!(reason.to_string(), "is 20, below the minimum age of 42");
    }
}
