use rand::Rng;
use rand::RngCore;

use super::candidacy::DeclarationBook;
use super::eligibility::EligibilityEvaluator;
use super::lottery::weighted_draw_without_replacement;
use crate::catalog::OfficeCatalog;
use crate::config::ElectionConfig;
use crate::ledger::{ElectionInfo, SeatLedger};
use crate::model::traits::trait_weight;
use crate::model::{
    Assembly, Character, Declaration, ElectionCandidate, FactorBreakdown, SocialClass, Trait,
};
use crate::roster::CharacterProvider;

// --- Campaign ---
const CAMPAIGN_CARRYOVER: f64 = 0.25;
const VOTE_FORTUNA_MAX: f64 = 4.0;

// --- Trait groups ---
const CHARISMA_TRAITS: &[(Trait, f64)] = &[
    (Trait::Charismatic, 2.0),
    (Trait::Eloquent, 2.0),
    (Trait::Persuasive, 1.5),
    (Trait::Confident, 1.0),
];
const POPULARITY_TRAITS: &[(Trait, f64)] = &[
    (Trait::Kind, 1.5),
    (Trait::Cheerful, 1.0),
    (Trait::Generous, 2.0),
    (Trait::Diplomatic, 1.5),
    (Trait::Warm, 1.0),
];
const ADVOCACY_TRAITS: &[(Trait, f64)] = &[
    (Trait::Bold, 1.5),
    (Trait::Resolute, 1.5),
    (Trait::Determined, 1.0),
    (Trait::Courageous, 1.5),
];

/// How one assembly weighs a candidate.
struct VoteWeights {
    influence: f64,
    wealth: f64, // applied to sqrt(wealth)
    charisma: f64,
    popularity: f64,
    advocacy: f64,
    favored_class: Option<SocialClass>,
    class_bonus: f64,
}

// --- Assemblies ---
/// Voting by property class: money and standing carry the day.
const CENTURIATE: VoteWeights = VoteWeights {
    influence: 1.2,
    wealth: 0.6,
    charisma: 1.0,
    popularity: 0.5,
    advocacy: 1.0,
    favored_class: Some(SocialClass::Patrician),
    class_bonus: 4.0,
};
const TRIBAL: VoteWeights = VoteWeights {
    influence: 1.0,
    wealth: 0.3,
    charisma: 2.0,
    popularity: 1.5,
    advocacy: 1.0,
    favored_class: None,
    class_bonus: 0.0,
};
const PLEBEIAN: VoteWeights = VoteWeights {
    influence: 0.8,
    wealth: 0.1,
    charisma: 1.5,
    popularity: 2.0,
    advocacy: 2.5,
    favored_class: Some(SocialClass::Plebeian),
    class_bonus: 4.0,
};

fn weights_for(assembly: Assembly) -> &'static VoteWeights {
    match assembly {
        Assembly::Centuriate => &CENTURIATE,
        Assembly::Tribal => &TRIBAL,
        Assembly::Plebeian => &PLEBEIAN,
    }
}

/// Labeled election-day score. `campaign` carries over part of the declaration's
/// desire; `fortuna` is drawn last.
pub fn vote_breakdown(
    character: &Character,
    assembly: Assembly,
    desire: f64,
    rng: &mut dyn RngCore,
) -> FactorBreakdown {
    let w = weights_for(assembly);
    let mut breakdown = FactorBreakdown::new();
    breakdown.add("influence", character.influence * w.influence);
    breakdown.add("wealth", character.wealth.max(0.0).sqrt() * w.wealth);
    breakdown.add(
        "charisma",
        trait_weight(&character.traits, CHARISMA_TRAITS) * w.charisma,
    );
    breakdown.add(
        "popularity",
        trait_weight(&character.traits, POPULARITY_TRAITS) * w.popularity,
    );
    breakdown.add(
        "advocacy",
        trait_weight(&character.traits, ADVOCACY_TRAITS) * w.advocacy,
    );
    let class = if w.favored_class == Some(character.class) {
        w.class_bonus
    } else {
        0.0
    };
    breakdown.add("class", class);
    breakdown.add("campaign", desire * CAMPAIGN_CARRYOVER);
    breakdown.add("fortuna", rng.random_range(0.0..VOTE_FORTUNA_MAX));
    breakdown
}

/// One office's election: the scored field and the drawn winners.
#[derive(Debug, Clone, PartialEq)]
pub struct OfficeBallot {
    pub info: ElectionInfo,
    pub candidates: Vec<ElectionCandidate>,
    /// Indices into `candidates`, in draw order.
    pub winners: Vec<usize>,
}

/// Election-day scorer and winner lottery.
pub struct VoteSimulator<'a> {
    catalog: &'a OfficeCatalog,
    ledger: &'a SeatLedger,
    config: &'a ElectionConfig,
}

impl<'a> VoteSimulator<'a> {
    pub fn new(
        catalog: &'a OfficeCatalog,
        ledger: &'a SeatLedger,
        config: &'a ElectionConfig,
    ) -> Self {
        Self {
            catalog,
            ledger,
            config,
        }
    }

    /// Score every declared candidate who is still alive and eligible.
    pub fn score_candidates(
        &self,
        info: &ElectionInfo,
        declarations: &[&Declaration],
        characters: &dyn CharacterProvider,
        year: i32,
        rng: &mut dyn RngCore,
    ) -> Vec<ElectionCandidate> {
        let Some(office) = self.catalog.get(&info.office_id) else {
            tracing::warn!("cannot hold an election for unknown office `{}`", info.office_id);
            return Vec::new();
        };
        let eligibility =
            EligibilityEvaluator::new(self.catalog, self.ledger, &self.config.eligibility);

        let mut candidates = Vec::new();
        for declaration in declarations {
            let Some(character) = characters.character(declaration.character_id) else {
                tracing::warn!(
                    "declared candidate {} for {} is not in the roster; skipping",
                    declaration.character_id,
                    office.id
                );
                continue;
            };
            if let Err(reason) = eligibility.check(character, office, year) {
                tracing::debug!(
                    "candidate {} dropped from {}: {reason}",
                    character.id,
                    office.id
                );
                continue;
            }
            let breakdown = vote_breakdown(character, office.assembly, declaration.desire, rng);
            candidates.push(ElectionCandidate {
                declaration: (*declaration).clone(),
                score: breakdown.total(),
                breakdown,
            });
        }
        candidates
    }

    /// Hold every open office's election, in `infos` order. Offices nobody stands for
    /// are left out.
    pub fn run(
        &self,
        infos: &[ElectionInfo],
        book: &DeclarationBook,
        characters: &dyn CharacterProvider,
        year: i32,
        rng: &mut dyn RngCore,
    ) -> Vec<OfficeBallot> {
        let mut ballots = Vec::new();
        for info in infos {
            let declared = book.for_office(&info.office_id);
            let candidates = self.score_candidates(info, &declared, characters, year, rng);
            if candidates.is_empty() {
                tracing::debug!("no candidates for {} in {year}", info.office_id);
                continue;
            }
            let winners = select_winners(&candidates, info.available_seats, rng);
            ballots.push(OfficeBallot {
                info: info.clone(),
                candidates,
                winners,
            });
        }
        ballots
    }
}

/// One score-weighted draw per seat from the shrinking field.
pub fn select_winners(
    candidates: &[ElectionCandidate],
    seats: usize,
    rng: &mut dyn RngCore,
) -> Vec<usize> {
    let scores: Vec<f64> = candidates.iter().map(|c| c.score).collect();
    weighted_draw_without_replacement(&scores, seats, rng)
}
