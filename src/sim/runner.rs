use std::sync::Arc;

use super::bus::{EventBus, SubscriptionHandle};
use super::context::TickContext;
use super::orchestrator::{ELECTIONS_SYSTEM, ElectionOrchestrator, OFFICE_CATALOG};
use super::rng::day_rng;
use super::schedule::{SystemDecl, order_systems};
use super::signal::{Signal, SignalTopic};
use super::system::{SimSystem, TickFrequency};
use crate::catalog::OfficeCatalog;
use crate::config::ElectionConfig;
use crate::error::StartupError;
use crate::ledger::SeatLedger;
use crate::model::SimDate;
use crate::persist::{CURRENT_VERSION, SaveState};
use crate::roster::CharacterProvider;

/// Returns true if a system with the given frequency should fire on this date.
pub fn should_fire(freq: TickFrequency, date: SimDate) -> bool {
    match freq {
        TickFrequency::Daily => true,
        TickFrequency::Monthly => date.day == 1,
        TickFrequency::Yearly => date.is_new_year(),
    }
}

/// Where a scheduled system lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Elections,
    Extra(usize),
}

/// The simulation host: owns the election cycle plus any extra systems, and turns
/// calendar days into signals.
pub struct Simulation {
    seed: u64,
    elections: ElectionOrchestrator,
    systems: Vec<Box<dyn SimSystem>>,
    schedule: Vec<Slot>,
    bus: EventBus,
    last_date: Option<SimDate>,
    queued: Vec<Signal>,
}

impl Simulation {
    pub fn builder(seed: u64) -> SimulationBuilder {
        SimulationBuilder::new(seed)
    }

    /// Advance the calendar to `date` and run one day.
    ///
    /// Signal delivery is **single-pass, non-cascading**:
    ///
    /// 1. **Phase 1 (tick):** each due system's `tick()` runs in dependency order with
    ///    the day's inbound signals (queued deaths, `NewYear` on a change of year, then
    ///    `DayAdvanced`) as `ctx.inbox`. Emitted signals are collected.
    /// 2. **Phase 2 (react):** if anything was emitted, each due system's
    ///    `handle_signals()` sees the Phase 1 buffer. Signals pushed here are published
    ///    but never re-delivered.
    ///
    /// Every emitted signal is published on the bus and returned. Dates that do not
    /// move the calendar forward are ignored.
    pub fn advance_day(
        &mut self,
        date: SimDate,
        characters: &dyn CharacterProvider,
    ) -> Vec<Signal> {
        if let Some(last) = self.last_date
            && date <= last
        {
            tracing::warn!("ignoring {date}: calendar is already at {last}");
            return Vec::new();
        }
        let new_year = self.last_date.is_none_or(|last| last.year != date.year);

        let mut inbox = std::mem::take(&mut self.queued);
        if new_year {
            inbox.push(Signal::NewYear { year: date.year });
        }
        inbox.push(Signal::DayAdvanced { date });

        // Phase 1: tick systems, collecting signals
        let mut signals = Vec::new();
        for (position, slot) in self.schedule.iter().enumerate() {
            let system: &mut dyn SimSystem = match *slot {
                Slot::Elections => &mut self.elections,
                Slot::Extra(i) => self.systems[i].as_mut(),
            };
            if !new_year && !should_fire(system.frequency(), date) {
                continue;
            }
            let mut rng = day_rng(self.seed, date, position as u64 * 2);
            let mut ctx = TickContext {
                date,
                characters,
                rng: &mut rng,
                signals: &mut signals,
                inbox: &inbox,
            };
            system.tick(&mut ctx);
        }

        // Phase 2: deliver signals for reaction (only if any were emitted)
        let mut reactions = Vec::new();
        if !signals.is_empty() {
            for (position, slot) in self.schedule.iter().enumerate() {
                let system: &mut dyn SimSystem = match *slot {
                    Slot::Elections => &mut self.elections,
                    Slot::Extra(i) => self.systems[i].as_mut(),
                };
                if !new_year && !should_fire(system.frequency(), date) {
                    continue;
                }
                let mut rng = day_rng(self.seed, date, position as u64 * 2 + 1);
                let mut ctx = TickContext {
                    date,
                    characters,
                    rng: &mut rng,
                    signals: &mut reactions,
                    inbox: &signals,
                };
                system.handle_signals(&mut ctx);
            }
        }
        signals.extend(reactions);

        for signal in &signals {
            self.bus.publish(signal);
        }
        self.last_date = Some(date);
        signals
    }

    /// Queue a death for delivery at the start of the next day.
    pub fn report_death(&mut self, character_id: u64) {
        self.queued.push(Signal::CharacterDied { character_id });
    }

    pub fn subscribe(
        &mut self,
        topic: SignalTopic,
        owner: &str,
        handler: impl FnMut(&Signal) + 'static,
    ) -> Option<SubscriptionHandle> {
        self.bus.subscribe(topic, owner, handler)
    }

    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        self.bus.unsubscribe(handle)
    }

    pub fn elections(&self) -> &ElectionOrchestrator {
        &self.elections
    }

    pub fn ledger(&self) -> &SeatLedger {
        self.elections.ledger()
    }

    pub fn catalog(&self) -> &OfficeCatalog {
        self.elections.catalog()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn last_date(&self) -> Option<SimDate> {
        self.last_date
    }

    /// Names of the scheduled systems, in tick order.
    pub fn system_order(&self) -> Vec<&str> {
        self.schedule
            .iter()
            .map(|slot| match *slot {
                Slot::Elections => self.elections.name(),
                Slot::Extra(i) => self.systems[i].name(),
            })
            .collect()
    }

    /// Everything needed to resume this run later.
    pub fn save_state(&self) -> SaveState {
        SaveState {
            version: CURRENT_VERSION,
            seed: self.seed,
            last_date: self.last_date,
            ledger: self.ledger().snapshot(),
            elections: self.elections.snapshot(),
        }
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("seed", &self.seed)
            .field("systems", &self.system_order())
            .field("last_date", &self.last_date)
            .finish()
    }
}

/// Collects the catalogue, configuration, and extra systems, then resolves startup
/// order. The office catalogue is a required provider: building without one fails.
pub struct SimulationBuilder {
    seed: u64,
    catalog: Option<Arc<OfficeCatalog>>,
    config: ElectionConfig,
    ledger: Option<SeatLedger>,
    systems: Vec<Box<dyn SimSystem>>,
    saved: Option<SaveState>,
}

impl SimulationBuilder {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            catalog: None,
            config: ElectionConfig::default(),
            ledger: None,
            systems: Vec::new(),
            saved: None,
        }
    }

    pub fn catalog(mut self, catalog: OfficeCatalog) -> Self {
        self.catalog = Some(Arc::new(catalog));
        self
    }

    pub fn config(mut self, config: ElectionConfig) -> Self {
        self.config = config;
        self
    }

    /// Start from an existing seat occupancy.
    pub fn ledger(mut self, ledger: SeatLedger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Register an additional system to tick alongside the elections.
    pub fn system(mut self, system: Box<dyn SimSystem>) -> Self {
        self.systems.push(system);
        self
    }

    /// Resume from a saved state. The saved seed, calendar position, ledger, and
    /// election state replace the builder's.
    pub fn restore(mut self, state: SaveState) -> Self {
        self.saved = Some(state);
        self
    }

    pub fn build(self) -> Result<Simulation, StartupError> {
        let mut decls = Vec::with_capacity(self.systems.len() + 2);
        let mut slots = Vec::with_capacity(self.systems.len() + 2);
        if self.catalog.is_some() {
            decls.push(SystemDecl::new(OFFICE_CATALOG, &[]));
            slots.push(None);
        }
        decls.push(SystemDecl::new(ELECTIONS_SYSTEM, &[OFFICE_CATALOG]));
        slots.push(Some(Slot::Elections));
        for (i, system) in self.systems.iter().enumerate() {
            decls.push(SystemDecl::new(system.name(), system.dependencies()));
            slots.push(Some(Slot::Extra(i)));
        }

        let order = order_systems(&decls)?;
        let schedule: Vec<Slot> = order.into_iter().filter_map(|i| slots[i]).collect();

        let catalog = self
            .catalog
            .ok_or_else(|| StartupError::MissingDependency {
                system: ELECTIONS_SYSTEM.to_string(),
                dependency: OFFICE_CATALOG.to_string(),
            })?;
        let mut elections = ElectionOrchestrator::new(catalog, self.config);
        if let Some(ledger) = self.ledger {
            elections = elections.with_ledger(ledger);
        }

        let mut seed = self.seed;
        let mut last_date = None;
        if let Some(saved) = self.saved {
            if saved.seed != seed {
                tracing::debug!("resuming with saved seed {} instead of {seed}", saved.seed);
            }
            seed = saved.seed;
            last_date = saved.last_date;
            elections.restore(SeatLedger::restore(saved.ledger), saved.elections);
        }

        tracing::debug!("startup order resolved for {} systems", schedule.len());
        Ok(Simulation {
            seed,
            elections,
            systems: self.systems,
            schedule,
            bus: EventBus::new(),
            last_date,
            queued: Vec::new(),
        })
    }
}
