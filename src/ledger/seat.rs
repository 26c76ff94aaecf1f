use serde::{Deserialize, Serialize};

/// One elective position instance within an office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub office_id: String,
    pub index: usize,
    pub holder: Option<u64>,
    /// Inclusive term bounds of the current holder. Meaningless while vacant.
    pub term_start: i32,
    pub term_end: i32,
    pub pending_holder: Option<u64>,
    pub pending_start: Option<i32>,
}

impl Seat {
    pub(crate) fn vacant(office_id: &str, index: usize) -> Self {
        Self {
            office_id: office_id.to_string(),
            index,
            holder: None,
            term_start: 0,
            term_end: 0,
            pending_holder: None,
            pending_start: None,
        }
    }

    pub fn is_vacant(&self) -> bool {
        self.holder.is_none()
    }

    pub fn has_pending(&self) -> bool {
        self.pending_holder.is_some()
    }

    /// Vacant, or the holder's term ends no later than `year`.
    pub fn term_over_by(&self, year: i32) -> bool {
        self.holder.is_none() || self.term_end <= year
    }

    /// Can be filled by this year's election.
    pub fn is_available(&self, year: i32) -> bool {
        !self.has_pending() && self.term_over_by(year)
    }

    /// Remove the current holder, returning the closed-out career record.
    /// The served term is clamped to end no later than `last_year_served`.
    pub(crate) fn vacate(&mut self, last_year_served: i32) -> Option<CareerRecord> {
        let character_id = self.holder.take()?;
        let term_end = self.term_end.min(last_year_served).max(self.term_start);
        Some(CareerRecord {
            character_id,
            office_id: self.office_id.clone(),
            seat_index: self.index,
            term_start: self.term_start,
            term_end,
        })
    }

    pub(crate) fn install(&mut self, character_id: u64, term_start: i32, term_end: i32) {
        debug_assert!(self.holder.is_none(), "install over an occupied seat");
        self.holder = Some(character_id);
        self.term_start = term_start;
        self.term_end = term_end.max(term_start);
    }

    pub(crate) fn take_pending(&mut self) -> Option<PendingAssignment> {
        let character_id = self.pending_holder.take()?;
        let start_year = self.pending_start.take().unwrap_or_default();
        Some(PendingAssignment {
            character_id,
            office_id: self.office_id.clone(),
            seat_index: self.index,
            start_year,
        })
    }

    pub(crate) fn active_record(&self) -> Option<ActiveRecord> {
        self.holder.map(|character_id| ActiveRecord {
            character_id,
            office_id: self.office_id.clone(),
            seat_index: self.index,
            term_start: self.term_start,
            term_end: self.term_end,
        })
    }

    pub(crate) fn pending_record(&self) -> Option<PendingAssignment> {
        match (self.pending_holder, self.pending_start) {
            (Some(character_id), Some(start_year)) => Some(PendingAssignment {
                character_id,
                office_id: self.office_id.clone(),
                seat_index: self.index,
                start_year,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRecord {
    pub character_id: u64,
    pub office_id: String,
    pub seat_index: usize,
    pub term_start: i32,
    pub term_end: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAssignment {
    pub character_id: u64,
    pub office_id: String,
    pub seat_index: usize,
    pub start_year: i32,
}

/// A completed (vacated) term. Written once, never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerRecord {
    pub character_id: u64,
    pub office_id: String,
    pub seat_index: usize,
    pub term_start: i32,
    pub term_end: i32,
}

/// What `SeatLedger::assign` did, for driving notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentOutcome {
    pub office_id: String,
    pub seat_index: usize,
    pub character_id: u64,
    pub deferred: bool,
    pub term_start: i32,
    pub term_end: i32,
    pub displaced: Option<CareerRecord>,
    pub canceled: Option<PendingAssignment>,
}

/// A pending successor promoted into the seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub character_id: u64,
    pub office_id: String,
    pub seat_index: usize,
    pub term_start: i32,
    pub term_end: i32,
    pub previous: Option<CareerRecord>,
}

/// A holder kept in a seat past the end of their term because no successor was ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraceExtension {
    pub character_id: u64,
    pub office_id: String,
    pub seat_index: usize,
    pub original_end: i32,
    pub extended_to: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpiryReport {
    pub vacated: Vec<CareerRecord>,
    pub extended: Vec<GraceExtension>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalOutcome {
    pub vacated: Vec<CareerRecord>,
    pub canceled: Vec<PendingAssignment>,
}

/// An office with at least one seat open in this year's election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionInfo {
    pub office_id: String,
    pub office_name: String,
    pub rank: u32,
    pub min_age: u32,
    pub available_seats: usize,
}
