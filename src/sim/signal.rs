use serde::{Deserialize, Serialize};

use crate::model::{ElectionResultRecord, SimDate};

/// A notification passed between the calendar, the systems, and the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Signal {
    // -- Inbound (calendar and population) --
    /// The calendar moved to a new day.
    DayAdvanced { date: SimDate },

    /// The calendar crossed into a new year. Delivered before that day's `DayAdvanced`.
    NewYear { year: i32 },

    /// A character died.
    CharacterDied { character_id: u64 },

    // -- Outbound (elections) --
    /// Declarations opened for the listed offices.
    ElectionSeasonOpened {
        year: i32,
        month: u32,
        day: u32,
        offices: Vec<String>,
    },

    /// Votes were counted and winners recorded.
    ElectionSeasonCompleted {
        year: i32,
        month: u32,
        day: u32,
        results: Vec<ElectionResultRecord>,
    },

    /// A character took up a seat.
    OfficeAssigned {
        year: i32,
        month: u32,
        day: u32,
        office_id: String,
        office_name: String,
        character_id: u64,
        seat_index: usize,
        term_start: i32,
        term_end: i32,
    },

    /// Extensible: any host system can emit a custom signal.
    Custom {
        name: String,
        data: serde_json::Value,
    },
}

/// Subscription key: one per `Signal` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SignalTopic {
    DayAdvanced,
    NewYear,
    CharacterDied,
    ElectionSeasonOpened,
    ElectionSeasonCompleted,
    OfficeAssigned,
    Custom,
}

impl Signal {
    pub fn topic(&self) -> SignalTopic {
        match self {
            Signal::DayAdvanced { .. } => SignalTopic::DayAdvanced,
            Signal::NewYear { .. } => SignalTopic::NewYear,
            Signal::CharacterDied { .. } => SignalTopic::CharacterDied,
            Signal::ElectionSeasonOpened { .. } => SignalTopic::ElectionSeasonOpened,
            Signal::ElectionSeasonCompleted { .. } => SignalTopic::ElectionSeasonCompleted,
            Signal::OfficeAssigned { .. } => SignalTopic::OfficeAssigned,
            Signal::Custom { .. } => SignalTopic::Custom,
        }
    }
}
