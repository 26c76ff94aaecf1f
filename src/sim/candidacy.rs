use std::collections::BTreeMap;

use rand::Rng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::eligibility::EligibilityEvaluator;
use super::lottery::weighted_pick;
use crate::catalog::OfficeCatalog;
use crate::config::ElectionConfig;
use crate::ledger::{ElectionInfo, SeatLedger};
use crate::model::traits::trait_weight;
use crate::model::{
    Assembly, Character, Declaration, FactorBreakdown, OfficeDefinition, SocialClass, Trait,
};
use crate::roster::CharacterProvider;

// --- Desire weights ---
const INFLUENCE_WEIGHT: f64 = 1.0;
const WEALTH_WEIGHT: f64 = 0.1; // applied to sqrt(wealth)
const CLASS_ALIGNMENT_BONUS: f64 = 4.0;
const MATURITY_CEILING: f64 = 5.0;
const MATURITY_RAMP_YEARS: f64 = 25.0;
const OPPORTUNITY_WEIGHT: f64 = 2.0;
const RANK_PRESSURE: f64 = 0.05;

// --- Fortuna ---
const DESIRE_FORTUNA_MAX: f64 = 3.0;

// --- Ambition traits ---
const AMBITION_TRAITS: &[(Trait, f64)] = &[
    (Trait::Ambitious, 6.0),
    (Trait::Proud, 3.0),
    (Trait::Bold, 2.0),
    (Trait::Determined, 2.0),
    (Trait::Cautious, -3.0),
    (Trait::Content, -4.0),
];
/// Traits that pay off in front of a popular assembly.
const POPULAR_AMBITION_TRAITS: &[(Trait, f64)] =
    &[(Trait::Charismatic, 2.0), (Trait::Eloquent, 2.0)];
const CENTURIATE_AMBITION_TRAITS: &[(Trait, f64)] = &[(Trait::Strategic, 2.0)];

/// One office a character could declare for, with its desire breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidacyOption {
    pub office_id: String,
    pub rank: u32,
    pub desire: f64,
    pub breakdown: FactorBreakdown,
}

/// Labeled desire score for one character and one office. `fortuna` is drawn last.
pub fn desire_breakdown(
    character: &Character,
    office: &OfficeDefinition,
    available_seats: usize,
    rng: &mut dyn RngCore,
) -> FactorBreakdown {
    let mut breakdown = FactorBreakdown::new();
    breakdown.add("influence", character.influence * INFLUENCE_WEIGHT);
    breakdown.add("wealth", character.wealth.max(0.0).sqrt() * WEALTH_WEIGHT);
    breakdown.add("ambition", ambition(&character.traits, office.assembly));
    breakdown.add("class", class_alignment(character.class, office.assembly));

    let years_past_min = character.age.saturating_sub(office.min_age) as f64;
    breakdown.add(
        "maturity",
        MATURITY_CEILING * (years_past_min / MATURITY_RAMP_YEARS).min(1.0),
    );
    breakdown.add(
        "opportunity",
        OPPORTUNITY_WEIGHT * (1.0 + available_seats as f64).ln(),
    );

    let base = breakdown.total();
    breakdown.add("rank", base * RANK_PRESSURE * office.rank as f64);
    breakdown.add("fortuna", rng.random_range(0.0..DESIRE_FORTUNA_MAX));
    breakdown
}

fn ambition(traits: &[Trait], assembly: Assembly) -> f64 {
    let conditional = match assembly {
        Assembly::Tribal | Assembly::Plebeian => trait_weight(traits, POPULAR_AMBITION_TRAITS),
        Assembly::Centuriate => trait_weight(traits, CENTURIATE_AMBITION_TRAITS),
    };
    trait_weight(traits, AMBITION_TRAITS) + conditional
}

fn class_alignment(class: SocialClass, assembly: Assembly) -> f64 {
    match (class, assembly) {
        (SocialClass::Patrician, Assembly::Centuriate)
        | (SocialClass::Plebeian, Assembly::Plebeian) => CLASS_ALIGNMENT_BONUS,
        _ => 0.0,
    }
}

/// Pick one option: keep those within `threshold` of the best score, narrow to the
/// highest rank among them, then draw by score. Returns an index into `options`.
pub fn select_option(
    options: &[CandidacyOption],
    threshold: f64,
    rng: &mut dyn RngCore,
) -> Option<usize> {
    let best = options
        .iter()
        .map(|o| o.desire)
        .fold(f64::NEG_INFINITY, f64::max);
    if best <= 0.0 {
        return None;
    }
    let cutoff = best * threshold;
    let close: Vec<usize> = (0..options.len())
        .filter(|&i| options[i].desire >= cutoff)
        .collect();
    let top_rank = close.iter().map(|&i| options[i].rank).max()?;
    let finalists: Vec<usize> = close
        .into_iter()
        .filter(|&i| options[i].rank == top_rank)
        .collect();
    let weights: Vec<f64> = finalists.iter().map(|&i| options[i].desire).collect();
    weighted_pick(&weights, rng).map(|slot| finalists[slot])
}

/// Declaration-phase scorer: decides which single office, if any, each character runs for.
pub struct CandidacyEvaluator<'a> {
    catalog: &'a OfficeCatalog,
    ledger: &'a SeatLedger,
    config: &'a ElectionConfig,
}

impl<'a> CandidacyEvaluator<'a> {
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

    /// Viable options for one character, in `infos` order.
    pub fn options_for(
        &self,
        character: &Character,
        infos: &[ElectionInfo],
        year: i32,
        rng: &mut dyn RngCore,
    ) -> Vec<CandidacyOption> {
        let eligibility =
            EligibilityEvaluator::new(self.catalog, self.ledger, &self.config.eligibility);
        let mut options = Vec::new();
        for info in infos {
            let Some(office) = self.catalog.get(&info.office_id) else {
                tracing::warn!("election info names unknown office `{}`", info.office_id);
                continue;
            };
            if !eligibility.is_eligible(character, office, year) {
                continue;
            }
            let breakdown = desire_breakdown(character, office, info.available_seats, rng);
            let desire = breakdown.total();
            if desire > 0.0 {
                options.push(CandidacyOption {
                    office_id: office.id.clone(),
                    rank: office.rank,
                    desire,
                    breakdown,
                });
            }
        }
        options
    }

    pub fn evaluate(
        &self,
        character: &Character,
        infos: &[ElectionInfo],
        year: i32,
        rng: &mut dyn RngCore,
    ) -> Option<Declaration> {
        let mut options = self.options_for(character, infos, year, rng);
        let chosen = select_option(&options, self.config.candidacy_threshold, rng)?;
        let option = options.swap_remove(chosen);
        tracing::debug!(
            "character {} declares for {} (desire {:.2})",
            character.id,
            option.office_id,
            option.desire
        );
        Some(Declaration {
            character_id: character.id,
            character_name: character.name.clone(),
            office_id: option.office_id,
            year,
            desire: option.desire,
            breakdown: option.breakdown,
        })
    }

    /// Open the year's declarations for every living character, in provider order.
    /// Returns how many declarations were recorded.
    pub fn declare_all(
        &self,
        characters: &dyn CharacterProvider,
        infos: &[ElectionInfo],
        year: i32,
        book: &mut DeclarationBook,
        rng: &mut dyn RngCore,
    ) -> usize {
        if infos.is_empty() {
            return 0;
        }
        let mut recorded = 0;
        for character in characters.characters() {
            if !character.alive || book.has_declared(character.id) {
                continue;
            }
            if let Some(declaration) = self.evaluate(character, infos, year, rng)
                && book.record(declaration)
            {
                recorded += 1;
            }
        }
        recorded
    }
}

/// The current year's declarations, at most one per character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclarationBook {
    year: Option<i32>,
    declarations: BTreeMap<u64, Declaration>,
}

impl DeclarationBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    /// Start a fresh window for `year`, dropping anything left from before.
    pub fn open(&mut self, year: i32) {
        self.year = Some(year);
        self.declarations.clear();
    }

    /// Drop every declaration and forget the year. Returns what was dropped.
    pub fn clear(&mut self) -> Vec<Declaration> {
        self.year = None;
        std::mem::take(&mut self.declarations).into_values().collect()
    }

    /// Add a declaration. Rejects a second declaration by the same character, or one
    /// for a year other than the open window.
    pub fn record(&mut self, declaration: Declaration) -> bool {
        if self.year != Some(declaration.year) {
            tracing::warn!(
                "rejecting declaration by character {} for year {}: window is {:?}",
                declaration.character_id,
                declaration.year,
                self.year
            );
            return false;
        }
        if self.declarations.contains_key(&declaration.character_id) {
            tracing::warn!(
                "character {} has already declared for {}",
                declaration.character_id,
                declaration.year
            );
            return false;
        }
        self.declarations
            .insert(declaration.character_id, declaration);
        true
    }

    pub fn has_declared(&self, character_id: u64) -> bool {
        self.declarations.contains_key(&character_id)
    }

    pub fn get(&self, character_id: u64) -> Option<&Declaration> {
        self.declarations.get(&character_id)
    }

    /// Declarations for one office, in character id order.
    pub fn for_office(&self, office_id: &str) -> Vec<&Declaration> {
        self.declarations
            .values()
            .filter(|d| d.office_id == office_id)
            .collect()
    }

    pub fn clear_office(&mut self, office_id: &str) {
        self.declarations.retain(|_, d| d.office_id != office_id);
    }

    pub fn remove_character(&mut self, character_id: u64) -> Option<Declaration> {
        self.declarations.remove(&character_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.values()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}
