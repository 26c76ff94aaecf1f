pub mod catalog;
pub mod config;
pub mod error;
pub mod ledger;
pub mod model;
pub mod persist;
pub mod roster;
pub mod scenario;
pub mod sim;
pub mod testutil;

pub use catalog::OfficeCatalog;
pub use config::{ElectionConfig, EligibilityRules};
pub use error::{CatalogError, LedgerError, PersistError, StartupError};
pub use ledger::SeatLedger;
pub use model::{Character, OfficeDefinition, SimDate};
pub use roster::{CharacterProvider, Roster};
pub use sim::{Signal, Simulation, SimulationBuilder};
