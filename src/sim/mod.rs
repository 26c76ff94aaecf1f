mod bus;
mod candidacy;
mod context;
mod eligibility;
pub mod lottery;
mod orchestrator;
mod results;
pub mod rng;
mod runner;
pub mod schedule;
mod signal;
mod system;
mod voting;

pub use bus::{EventBus, SubscriptionHandle};
pub use candidacy::{CandidacyEvaluator, CandidacyOption, DeclarationBook, desire_breakdown};
pub use context::TickContext;
pub use eligibility::{EligibilityEvaluator, Ineligibility};
pub use orchestrator::{
    DueAction, ELECTIONS_SYSTEM, ElectionOrchestrator, ElectionPhase, ElectionsSnapshot,
    OFFICE_CATALOG, YearRecord,
};
pub use results::{AppliedBallot, ResultsApplier, justification, support_shares};
pub use runner::{Simulation, SimulationBuilder, should_fire};
pub use signal::{Signal, SignalTopic};
pub use system::{SimSystem, TickFrequency};
pub use voting::{OfficeBallot, VoteSimulator, select_winners, vote_breakdown};
