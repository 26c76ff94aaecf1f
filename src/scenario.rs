use crate::catalog::OfficeCatalog;
use crate::config::ElectionConfig;
use crate::error::StartupError;
use crate::ledger::SeatLedger;
use crate::model::*;
use crate::roster::Roster;
use crate::sim::{Signal, Simulation};
use crate::testutil::run_years;

/// Everything a finished [`Scenario::run`] leaves behind.
pub struct ScenarioRun {
    pub sim: Simulation,
    pub roster: Roster,
    pub signals: Vec<Signal>,
}

// -- Builder-style ref types --

/// Typed reference to a character in a [`Scenario`], enabling chained field mutation.
///
/// Created by [`Scenario::character`] (creation) or [`Scenario::character_mut`]
/// (mutation). Call [`.id()`](CharacterRef::id) to terminate the chain.
pub struct CharacterRef<'a> {
    scenario: &'a mut Scenario,
    id: u64,
}

impl CharacterRef<'_> {
    fn update(self, f: impl FnOnce(&mut Character)) -> Self {
        if let Some(character) = self.scenario.roster.get_mut(self.id) {
            f(character);
        }
        self
    }

    pub fn age(self, v: u32) -> Self { self.update(|c| c.age = v) }
    pub fn class(self, v: SocialClass) -> Self { self.update(|c| c.class = v) }
    pub fn gender(self, v: Gender) -> Self { self.update(|c| c.gender = v) }
    pub fn influence(self, v: f64) -> Self { self.update(|c| c.influence = v) }
    pub fn wealth(self, v: f64) -> Self { self.update(|c| c.wealth = v) }
    pub fn traits(self, v: Vec<Trait>) -> Self { self.update(|c| c.traits = v) }
    pub fn add_trait(self, t: Trait) -> Self { self.update(|c| c.traits.push(t)) }
    pub fn dead(self) -> Self { self.update(|c| c.alive = false) }

    /// Escape hatch: apply an arbitrary closure to the character.
    pub fn with(self, f: impl FnOnce(&mut Character)) -> Self { self.update(f) }

    /// Terminate the chain and return the character ID.
    pub fn id(self) -> u64 { self.id }
}

/// Declarative setup for election tests: offices, characters, prior seat holders.
pub struct Scenario {
    roster: Roster,
    offices: Vec<OfficeDefinition>,
    ledger: SeatLedger,
    config: ElectionConfig,
    start_year: i32,
    next_id: u64,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario {
    /// Empty scenario starting in 248 BCE.
    pub fn new() -> Self {
        Self::at_year(-248)
    }

    pub fn at_year(year: i32) -> Self {
        Self {
            roster: Roster::new(),
            offices: Vec::new(),
            ledger: SeatLedger::new(),
            config: ElectionConfig::default(),
            start_year: year,
            next_id: 1,
        }
    }

    /// Scenario preloaded with the bundled cursus honorum.
    pub fn roman_republic() -> Self {
        let mut scenario = Self::new();
        scenario.offices = OfficeCatalog::roman_republic().iter().cloned().collect();
        scenario
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    // -- Offices --

    /// Add (or replace, by id) an office definition. Returns the office id.
    pub fn add_office(&mut self, office: OfficeDefinition) -> String {
        let id = office.id.clone();
        match self.offices.iter_mut().find(|o| o.id == id) {
            Some(existing) => *existing = office,
            None => self.offices.push(office),
        }
        id
    }

    pub fn office(&self, id: &str) -> Option<&OfficeDefinition> {
        self.offices.iter().find(|o| o.id == id)
    }

    pub fn catalog(&self) -> OfficeCatalog {
        OfficeCatalog::from_definitions(self.offices.clone())
    }

    // -- Characters --

    /// Create a character (age 30, plebeian, male) and return a ref for chaining.
    pub fn character(&mut self, name: &str) -> CharacterRef<'_> {
        let id = self.next_id;
        self.next_id += 1;
        self.roster.insert(Character::new(id, name));
        CharacterRef { scenario: self, id }
    }

    /// Ref to an existing character for further mutation.
    pub fn character_mut(&mut self, id: u64) -> CharacterRef<'_> {
        CharacterRef { scenario: self, id }
    }

    /// Shorthand for the common fields.
    pub fn add_character(
        &mut self,
        name: &str,
        age: u32,
        class: SocialClass,
        influence: f64,
    ) -> u64 {
        self.character(name)
            .age(age)
            .class(class)
            .influence(influence)
            .id()
    }

    // -- Prior occupancy --

    /// Seat a character in an office from `year`, as if elected earlier.
    /// Returns false if the office is unknown or full.
    pub fn seat(&mut self, office_id: &str, character_id: u64, year: i32) -> bool {
        self.assign(office_id, character_id, year, false)
    }

    /// Schedule a character to take an office in `year + 1`.
    pub fn schedule(&mut self, office_id: &str, character_id: u64, year: i32) -> bool {
        self.assign(office_id, character_id, year, true)
    }

    fn assign(&mut self, office_id: &str, character_id: u64, year: i32, defer: bool) -> bool {
        let Some(office) = self.offices.iter().find(|o| o.id == office_id) else {
            return false;
        };
        self.ledger.assign(office, character_id, year, defer).is_ok()
    }

    /// Record a completed term directly: seated in `start_year`, vacated at its end.
    /// Any other seat the character holds is vacated too.
    pub fn completed_term(&mut self, office_id: &str, character_id: u64, start_year: i32) -> bool {
        let Some(office) = self.offices.iter().find(|o| o.id == office_id) else {
            return false;
        };
        let end = office.term_end(start_year);
        if self.ledger.assign(office, character_id, start_year, false).is_err() {
            return false;
        }
        let removed = self.ledger.remove_character(character_id, end);
        removed.vacated.iter().any(|r| r.office_id == office_id)
    }

    // -- Config --

    pub fn config_mut(&mut self) -> &mut ElectionConfig {
        &mut self.config
    }

    // -- Build / run --

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn ledger(&self) -> &SeatLedger {
        &self.ledger
    }

    /// Build a simulation over the scenario's offices, ledger, and config.
    pub fn build(self, seed: u64) -> Result<(Simulation, Roster), StartupError> {
        let sim = Simulation::builder(seed)
            .catalog(OfficeCatalog::from_definitions(self.offices))
            .config(self.config)
            .ledger(self.ledger)
            .build()?;
        Ok((sim, self.roster))
    }

    /// Build and run `num_years` election years from the start year.
    pub fn run(self, seed: u64, num_years: u32) -> Result<ScenarioRun, StartupError> {
        let start_year = self.start_year;
        let (mut sim, roster) = self.build(seed)?;
        let signals = run_years(&mut sim, &roster, start_year, num_years);
        Ok(ScenarioRun {
            sim,
            roster,
            signals,
        })
    }
}
