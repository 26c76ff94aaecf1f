use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::candidacy::{CandidacyEvaluator, DeclarationBook};
use super::context::TickContext;
use super::results::ResultsApplier;
use super::signal::Signal;
use super::system::{SimSystem, TickFrequency};
use super::voting::VoteSimulator;
use crate::catalog::OfficeCatalog;
use crate::config::ElectionConfig;
use crate::ledger::SeatLedger;
use crate::model::{Declaration, ElectionResultRecord, SimDate};

pub const ELECTIONS_SYSTEM: &str = "elections";
pub const OFFICE_CATALOG: &str = "office_catalog";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectionPhase {
    #[default]
    Idle,
    DeclarationOpen,
}

/// What the calendar calls for on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueAction {
    None,
    OpenDeclarations,
    HoldElection,
}

/// Everything one year of elections left behind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    #[serde(default)]
    pub results: Vec<ElectionResultRecord>,
}

/// Serializable orchestrator state (the ledger is saved separately).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectionsSnapshot {
    pub phase: ElectionPhase,
    pub declarations: DeclarationBook,
    pub declarations_opened_year: Option<i32>,
    pub election_held_year: Option<i32>,
    pub history: BTreeMap<i32, YearRecord>,
}

/// The yearly election cycle, driven only by calendar and population signals.
///
/// Owns the seat ledger. Each year: declarations open on the declaration day, votes
/// are counted on the election day, and winners take their seats at the next new year
/// (or at once, when assignments are not deferred).
pub struct ElectionOrchestrator {
    catalog: Arc<OfficeCatalog>,
    config: ElectionConfig,
    ledger: SeatLedger,
    declarations: DeclarationBook,
    phase: ElectionPhase,
    declarations_opened_year: Option<i32>,
    election_held_year: Option<i32>,
    history: BTreeMap<i32, YearRecord>,
}

impl ElectionOrchestrator {
    pub fn new(catalog: Arc<OfficeCatalog>, config: ElectionConfig) -> Self {
        Self {
            catalog,
            config: config.sanitized(),
            ledger: SeatLedger::new(),
            declarations: DeclarationBook::new(),
            phase: ElectionPhase::Idle,
            declarations_opened_year: None,
            election_held_year: None,
            history: BTreeMap::new(),
        }
    }

    /// Start from an existing occupancy instead of an empty ledger.
    pub fn with_ledger(mut self, ledger: SeatLedger) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn catalog(&self) -> &OfficeCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &ElectionConfig {
        &self.config
    }

    pub fn ledger(&self) -> &SeatLedger {
        &self.ledger
    }

    pub fn declarations(&self) -> &DeclarationBook {
        &self.declarations
    }

    pub fn phase(&self) -> ElectionPhase {
        self.phase
    }

    pub fn history(&self) -> &BTreeMap<i32, YearRecord> {
        &self.history
    }

    pub fn results_for(&self, year: i32) -> &[ElectionResultRecord] {
        self.history
            .get(&year)
            .map(|r| r.results.as_slice())
            .unwrap_or(&[])
    }

    pub fn snapshot(&self) -> ElectionsSnapshot {
        ElectionsSnapshot {
            phase: self.phase,
            declarations: self.declarations.clone(),
            declarations_opened_year: self.declarations_opened_year,
            election_held_year: self.election_held_year,
            history: self.history.clone(),
        }
    }

    pub fn restore(&mut self, ledger: SeatLedger, snapshot: ElectionsSnapshot) {
        self.ledger = ledger;
        self.phase = snapshot.phase;
        self.declarations = snapshot.declarations;
        self.declarations_opened_year = snapshot.declarations_opened_year;
        self.election_held_year = snapshot.election_held_year;
        self.history = snapshot.history;
    }

    /// Which step of the cycle is due on `date`, given what already ran this year.
    pub fn due_action(&self, date: SimDate) -> DueAction {
        let year = date.year;
        let day = date.calendar_day();
        if day >= self.config.election_day {
            if self.election_held_year == Some(year) {
                DueAction::None
            } else {
                DueAction::HoldElection
            }
        } else if day >= self.config.declaration_day
            && self.declarations_opened_year != Some(year)
        {
            DueAction::OpenDeclarations
        } else {
            DueAction::None
        }
    }

    /// Phase the cycle should be in on `date`.
    pub fn phase_for(&self, date: SimDate) -> ElectionPhase {
        let day = date.calendar_day();
        let opened = self.declarations_opened_year == Some(date.year);
        let held = self.election_held_year == Some(date.year);
        if day >= self.config.declaration_day && opened && !held {
            ElectionPhase::DeclarationOpen
        } else {
            ElectionPhase::Idle
        }
    }

    fn on_new_year(&mut self, year: i32, ctx: &mut TickContext) {
        let expiry = self.ledger.expire_completed_terms(year);
        for record in &expiry.vacated {
            tracing::debug!(
                "character {} leaves {} after {}",
                record.character_id,
                record.office_id,
                record.term_end
            );
        }

        for activation in self.ledger.activate_pending(year, &self.catalog) {
            let office_name = self
                .catalog
                .get(&activation.office_id)
                .map(|o| o.name.clone())
                .unwrap_or_else(|| activation.office_id.clone());
            tracing::info!(
                "character {} takes office as {office_name} (seat {})",
                activation.character_id,
                activation.seat_index
            );
            ctx.signals.push(Signal::OfficeAssigned {
                year: ctx.date.year,
                month: ctx.date.month,
                day: ctx.date.day,
                office_id: activation.office_id,
                office_name,
                character_id: activation.character_id,
                seat_index: activation.seat_index,
                term_start: activation.term_start,
                term_end: activation.term_end,
            });
        }

        let leftover = self.declarations.clear();
        if !leftover.is_empty() {
            tracing::debug!("dropping {} unresolved declarations", leftover.len());
        }
        self.phase = ElectionPhase::Idle;
    }

    fn open_declarations(&mut self, ctx: &mut TickContext) {
        let year = ctx.date.year;
        self.declarations.open(year);
        let infos = self.ledger.election_infos(year, &self.catalog);
        let recorded = CandidacyEvaluator::new(&self.catalog, &self.ledger, &self.config)
            .declare_all(
                ctx.characters,
                &infos,
                year,
                &mut self.declarations,
                ctx.rng,
            );

        self.history.entry(year).or_default().declarations =
            self.declarations.iter().cloned().collect();
        self.declarations_opened_year = Some(year);
        self.phase = ElectionPhase::DeclarationOpen;

        tracing::info!(
            "{year}: declarations open for {} offices, {recorded} candidates",
            infos.len()
        );
        ctx.signals.push(Signal::ElectionSeasonOpened {
            year,
            month: ctx.date.month,
            day: ctx.date.day,
            offices: infos.into_iter().map(|i| i.office_id).collect(),
        });
    }

    fn hold_election(&mut self, ctx: &mut TickContext) {
        let year = ctx.date.year;
        if self.declarations_opened_year != Some(year) {
            // The host skipped the declaration day; declare now so the year still votes.
            self.open_declarations(ctx);
        }

        let infos = self.ledger.election_infos(year, &self.catalog);
        let ballots = VoteSimulator::new(&self.catalog, &self.ledger, &self.config).run(
            &infos,
            &self.declarations,
            ctx.characters,
            year,
            ctx.rng,
        );

        let applier = ResultsApplier::new(&self.catalog, self.config.defer_assignments);
        let mut results = Vec::new();
        for ballot in &ballots {
            let Some(applied) =
                applier.apply(&mut self.ledger, &mut self.declarations, ballot, year)
            else {
                continue;
            };
            for outcome in applied.assignments.iter().filter(|a| !a.deferred) {
                ctx.signals.push(Signal::OfficeAssigned {
                    year,
                    month: ctx.date.month,
                    day: ctx.date.day,
                    office_id: outcome.office_id.clone(),
                    office_name: applied.record.office_name.clone(),
                    character_id: outcome.character_id,
                    seat_index: outcome.seat_index,
                    term_start: outcome.term_start,
                    term_end: outcome.term_end,
                });
            }
            results.push(applied.record);
        }

        self.history.entry(year).or_default().results = results.clone();
        self.election_held_year = Some(year);
        self.phase = ElectionPhase::Idle;

        tracing::info!(
            "{year}: elections complete, {} offices decided",
            results.len()
        );
        ctx.signals.push(Signal::ElectionSeasonCompleted {
            year,
            month: ctx.date.month,
            day: ctx.date.day,
            results,
        });
    }

    fn on_day(&mut self, date: SimDate, ctx: &mut TickContext) {
        match self.due_action(date) {
            DueAction::OpenDeclarations => self.open_declarations(ctx),
            DueAction::HoldElection => self.hold_election(ctx),
            DueAction::None => {}
        }
        self.phase = self.phase_for(date);
    }

    fn on_death(&mut self, character_id: u64, year: i32) {
        let removal = self.ledger.remove_character(character_id, year);
        if !removal.vacated.is_empty() || !removal.canceled.is_empty() {
            tracing::debug!(
                "character {character_id} died: {} seats vacated, {} successions canceled",
                removal.vacated.len(),
                removal.canceled.len()
            );
        }
        self.declarations.remove_character(character_id);
    }
}

impl SimSystem for ElectionOrchestrator {
    fn name(&self) -> &str {
        ELECTIONS_SYSTEM
    }

    fn frequency(&self) -> TickFrequency {
        TickFrequency::Daily
    }

    fn dependencies(&self) -> &[&str] {
        &[OFFICE_CATALOG]
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        let inbox = ctx.inbox;
        for signal in inbox {
            match signal {
                Signal::CharacterDied { character_id } => {
                    self.on_death(*character_id, ctx.date.year);
                }
                Signal::NewYear { year } => self.on_new_year(*year, ctx),
                Signal::DayAdvanced { date } => self.on_day(*date, ctx),
                _ => {}
            }
        }
    }

    fn handle_signals(&mut self, ctx: &mut TickContext) {
        for signal in ctx.inbox {
            if let Signal::CharacterDied { character_id } = signal {
                self.on_death(*character_id, ctx.date.year);
            }
        }
    }
}
