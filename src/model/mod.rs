pub mod character;
pub mod election;
pub mod office;
pub mod timestamp;
pub mod traits;

pub use character::{Character, Gender, SocialClass};
pub use election::{
    CandidateSummary, Declaration, ElectionCandidate, ElectionResultRecord, Factor,
    FactorBreakdown, WinnerSummary,
};
pub use office::{Assembly, OfficeDefinition};
pub use timestamp::{CalendarDay, SimDate};
pub use traits::Trait;
