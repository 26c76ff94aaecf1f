use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::ledger::SeatLedger;
use crate::model::*;
use crate::roster::CharacterProvider;
use crate::sim::{Signal, SimSystem, Simulation, TickContext};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A Tribal-assembly office with no class rule, prerequisites, or reelection gap.
pub fn office(id: &str, seats: usize, term: u32, min_age: u32, rank: u32) -> OfficeDefinition {
    OfficeDefinition {
        id: id.to_string(),
        name: display_name(id),
        assembly: Assembly::Tribal,
        min_age,
        term_length_years: term,
        seats,
        reelection_gap_years: 0,
        rank,
        requires_plebeian: false,
        requires_patrician: false,
        prerequisites_all: Vec::new(),
        prerequisites_any: Vec::new(),
    }
}

/// Like [`office`], then apply `modify`.
pub fn office_with(
    id: &str,
    seats: usize,
    term: u32,
    min_age: u32,
    rank: u32,
    modify: impl FnOnce(&mut OfficeDefinition),
) -> OfficeDefinition {
    let mut office = office(id, seats, term, min_age, rank);
    modify(&mut office);
    office
}

/// A living male character with no traits or wealth.
pub fn character(id: u64, age: u32, class: SocialClass, influence: f64) -> Character {
    let mut character = Character::new(id, format!("Character {id}"));
    character.age = age;
    character.class = class;
    character.influence = influence;
    character
}

fn display_name(id: &str) -> String {
    id.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Tick execution helpers
// ---------------------------------------------------------------------------

/// The inbound signals the host would deliver on `date`: `NewYear` on the first day of
/// a year, then `DayAdvanced`.
pub fn calendar_inbox(date: SimDate) -> Vec<Signal> {
    let mut inbox = Vec::new();
    if date.is_new_year() {
        inbox.push(Signal::NewYear { year: date.year });
    }
    inbox.push(Signal::DayAdvanced { date });
    inbox
}

/// Run a single system tick on `date` with the calendar's signals. Returns emitted signals.
pub fn tick_system(
    system: &mut dyn SimSystem,
    characters: &dyn CharacterProvider,
    date: SimDate,
    seed: u64,
) -> Vec<Signal> {
    tick_with_inbox(system, characters, date, &calendar_inbox(date), seed)
}

/// Run a single system tick with an explicit inbox. Returns emitted signals.
pub fn tick_with_inbox(
    system: &mut dyn SimSystem,
    characters: &dyn CharacterProvider,
    date: SimDate,
    inbox: &[Signal],
    seed: u64,
) -> Vec<Signal> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut signals = Vec::new();
    let mut ctx = TickContext {
        date,
        characters,
        rng: &mut rng,
        signals: &mut signals,
        inbox,
    };
    system.tick(&mut ctx);
    signals
}

/// Run a system's handle_signals with the given inbox. Returns newly emitted signals.
pub fn deliver_signals(
    system: &mut dyn SimSystem,
    characters: &dyn CharacterProvider,
    date: SimDate,
    inbox: &[Signal],
    seed: u64,
) -> Vec<Signal> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut signals = Vec::new();
    let mut ctx = TickContext {
        date,
        characters,
        rng: &mut rng,
        signals: &mut signals,
        inbox,
    };
    system.handle_signals(&mut ctx);
    signals
}

/// Drive one year through the days that matter: new year, declaration day, election
/// day. Returns every signal emitted.
pub fn run_year(
    sim: &mut Simulation,
    characters: &dyn CharacterProvider,
    year: i32,
) -> Vec<Signal> {
    let config = sim.elections().config().clone();
    let mut signals = sim.advance_day(SimDate::from_year(year), characters);
    signals.extend(sim.advance_day(config.declaration_day.in_year(year), characters));
    signals.extend(sim.advance_day(config.election_day.in_year(year), characters));
    signals
}

/// Run `num_years` consecutive years starting at `start_year`.
pub fn run_years(
    sim: &mut Simulation,
    characters: &dyn CharacterProvider,
    start_year: i32,
    num_years: u32,
) -> Vec<Signal> {
    let mut signals = Vec::new();
    for offset in 0..num_years as i32 {
        signals.extend(run_year(sim, characters, start_year + offset));
    }
    signals
}

// ---------------------------------------------------------------------------
// Query helpers
// ---------------------------------------------------------------------------

/// Seats of an office whose holder is still serving in `year`.
pub fn serving_holders(ledger: &SeatLedger, office_id: &str, year: i32) -> usize {
    ledger
        .seats(office_id)
        .iter()
        .filter(|s| s.holder.is_some() && s.term_start <= year && s.term_end >= year)
        .count()
}

/// Every `ElectionSeasonCompleted` result in a signal stream, flattened.
pub fn completed_results(signals: &[Signal]) -> Vec<ElectionResultRecord> {
    signals
        .iter()
        .filter_map(|s| match s {
            Signal::ElectionSeasonCompleted { results, .. } => Some(results.clone()),
            _ => None,
        })
        .flatten()
        .collect()
}
