use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::seat::{ActiveRecord, CareerRecord, PendingAssignment, Seat};
use super::{CareerBook, SeatLedger};

/// Serializable ledger state. Every map is a `BTreeMap` so the encoded form has a
/// stable key order and save→load→save is byte-identical.
///
/// `active` and `pending` are derived from `seats`; they are written for consumers of
/// the save file and cross-checked on restore, never trusted over the seats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub seats: BTreeMap<String, Vec<Seat>>,
    #[serde(default)]
    pub active: BTreeMap<u64, Vec<ActiveRecord>>,
    #[serde(default)]
    pub pending: BTreeMap<u64, Vec<PendingAssignment>>,
    #[serde(default)]
    pub history: BTreeMap<u64, Vec<CareerRecord>>,
    #[serde(default)]
    pub last_held: BTreeMap<u64, BTreeMap<String, i32>>,
}

impl SeatLedger {
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            seats: self.seats.clone(),
            active: self.active_index(),
            pending: self.pending_index(),
            history: self.careers.history.clone(),
            last_held: self.careers.last_held.clone(),
        }
    }

    /// Rebuild a ledger from a snapshot, repairing seats that break the seat invariants.
    pub fn restore(snapshot: LedgerSnapshot) -> Self {
        let LedgerSnapshot {
            seats,
            active,
            pending,
            history,
            last_held,
        } = snapshot;

        let mut repaired = BTreeMap::new();
        for (office_id, mut office_seats) in seats {
            for (index, seat) in office_seats.iter_mut().enumerate() {
                repair_seat(&office_id, index, seat);
            }
            repaired.insert(office_id, office_seats);
        }

        let ledger = SeatLedger {
            seats: repaired,
            careers: CareerBook { history, last_held },
        };

        if ledger.active_index() != active {
            tracing::warn!("saved active holdings disagree with seats; using seats");
        }
        if ledger.pending_index() != pending {
            tracing::warn!("saved pending successions disagree with seats; using seats");
        }
        ledger
    }
}

fn repair_seat(office_id: &str, index: usize, seat: &mut Seat) {
    if seat.office_id != office_id || seat.index != index {
        tracing::warn!(
            "seat {}#{} stored under {office_id}#{index}; re-keying",
            seat.office_id,
            seat.index
        );
        seat.office_id = office_id.to_string();
        seat.index = index;
    }
    if seat.term_end < seat.term_start {
        tracing::warn!("seat {office_id}#{index} has a term ending before it starts; clamping");
        seat.term_end = seat.term_start;
    }
    if seat.pending_holder.is_some() != seat.pending_start.is_some() {
        tracing::warn!("seat {office_id}#{index} has a half-recorded successor; dropping it");
        seat.pending_holder = None;
        seat.pending_start = None;
    }
}
