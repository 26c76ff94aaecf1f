mod seat;
mod snapshot;

use std::collections::{BTreeMap, BTreeSet};

pub use seat::{
    Activation, ActiveRecord, AssignmentOutcome, CareerRecord, ElectionInfo, ExpiryReport,
    GraceExtension, PendingAssignment, RemovalOutcome, Seat,
};
pub use snapshot::LedgerSnapshot;

use crate::catalog::OfficeCatalog;
use crate::error::LedgerError;
use crate::model::OfficeDefinition;

/// Completed terms and the last year each character held each office.
///
/// Only written from inside `SeatLedger`, in the same call that vacates the seat.
#[derive(Debug, Clone, Default, PartialEq)]
struct CareerBook {
    history: BTreeMap<u64, Vec<CareerRecord>>,
    last_held: BTreeMap<u64, BTreeMap<String, i32>>,
}

impl CareerBook {
    fn record(&mut self, record: CareerRecord) {
        self.last_held
            .entry(record.character_id)
            .or_default()
            .insert(record.office_id.clone(), record.term_end);
        self.history
            .entry(record.character_id)
            .or_default()
            .push(record);
    }
}

/// Seat occupancy across all offices: the single source of truth for who holds what.
///
/// Active and pending views are computed from the seats on demand, so they cannot
/// drift from them. Career history and last-held years are append/overwrite-only and
/// written in the same mutation that vacates a seat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeatLedger {
    seats: BTreeMap<String, Vec<Seat>>,
    careers: CareerBook,
}

impl SeatLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grow an office's seat list to at least `count` seats (never beyond the office's
    /// seat count). Existing seats are never removed.
    pub fn ensure_seats(&mut self, office: &OfficeDefinition, count: usize) {
        let target = count.min(office.seats);
        let seats = self.seats.entry(office.id.clone()).or_default();
        while seats.len() < target {
            let index = seats.len();
            seats.push(Seat::vacant(&office.id, index));
        }
    }

    /// Put `character_id` into a seat of `office`, either now or from next year.
    pub fn assign(
        &mut self,
        office: &OfficeDefinition,
        character_id: u64,
        year: i32,
        defer_to_next_year: bool,
    ) -> Result<AssignmentOutcome, LedgerError> {
        let term_start = if defer_to_next_year { year + 1 } else { year };
        let index = {
            let seats = self.seats.entry(office.id.clone()).or_default();
            choose_seat(seats, office.seats, year, defer_to_next_year).ok_or_else(|| {
                LedgerError::NoSeatAvailable {
                    office_id: office.id.clone(),
                    character_id,
                }
            })?
        };
        if !defer_to_next_year {
            self.vacate_elsewhere(character_id, &office.id, index, year);
        }
        let seats = self.seats.entry(office.id.clone()).or_default();
        if index == seats.len() {
            seats.push(Seat::vacant(&office.id, index));
        }
        let seat = &mut seats[index];

        if defer_to_next_year {
            let canceled = seat.take_pending();
            if let Some(c) = &canceled {
                tracing::warn!(
                    "canceling pending succession of character {} to {} seat {}",
                    c.character_id,
                    office.id,
                    index
                );
            }
            seat.pending_holder = Some(character_id);
            seat.pending_start = Some(term_start);
            return Ok(AssignmentOutcome {
                office_id: office.id.clone(),
                seat_index: index,
                character_id,
                deferred: true,
                term_start,
                term_end: office.term_end(term_start),
                displaced: None,
                canceled,
            });
        }

        let displaced = seat.vacate(year - 1);
        let term_end = office.term_end(term_start);
        seat.install(character_id, term_start, term_end);
        if let Some(record) = &displaced {
            self.careers.record(record.clone());
        }
        Ok(AssignmentOutcome {
            office_id: office.id.clone(),
            seat_index: index,
            character_id,
            deferred: false,
            term_start,
            term_end,
            displaced,
            canceled: None,
        })
    }

    /// Close out any other seat still held by a character who is taking seat `index`
    /// of `office_id` immediately.
    fn vacate_elsewhere(&mut self, character_id: u64, office_id: &str, index: usize, year: i32) {
        for (id, seats) in self.seats.iter_mut() {
            for seat in seats.iter_mut() {
                if id == office_id && seat.index == index {
                    continue;
                }
                if seat.holder == Some(character_id)
                    && let Some(record) = seat.vacate(year)
                {
                    tracing::debug!("character {character_id} leaves {id} to take {office_id}");
                    self.careers.record(record);
                }
            }
        }
    }

    /// Year-start housekeeping for finished terms.
    ///
    /// A holder whose term has ended is vacated only when a successor is ready to take
    /// the seat this year, or when the holder is about to take up another seat.
    /// Otherwise the holder stays on with the recorded end year moved up to `year`, so
    /// an office is never silently emptied.
    // TODO: confirm with design whether the silent extension should raise a notification.
    pub fn expire_completed_terms(&mut self, year: i32) -> ExpiryReport {
        let moving_on: BTreeSet<u64> = self
            .all_seats()
            .filter(|s| s.pending_start.is_some_and(|start| start <= year))
            .filter_map(|s| s.pending_holder)
            .collect();
        let mut report = ExpiryReport::default();
        for seats in self.seats.values_mut() {
            for seat in seats.iter_mut() {
                let Some(holder) = seat.holder else { continue };
                if seat.term_end >= year {
                    continue;
                }
                let successor_ready = seat.pending_start.is_some_and(|start| start <= year);
                if successor_ready || moving_on.contains(&holder) {
                    if let Some(record) = seat.vacate(seat.term_end) {
                        self.careers.record(record.clone());
                        report.vacated.push(record);
                    }
                } else {
                    tracing::debug!(
                        "no successor for {} seat {}; character {holder} stays on through {year}",
                        seat.office_id,
                        seat.index
                    );
                    report.extended.push(GraceExtension {
                        character_id: holder,
                        office_id: seat.office_id.clone(),
                        seat_index: seat.index,
                        original_end: seat.term_end,
                        extended_to: year,
                    });
                    seat.term_end = year;
                }
            }
        }
        report
    }

    /// Promote every pending successor whose start year has arrived.
    pub fn activate_pending(&mut self, year: i32, catalog: &OfficeCatalog) -> Vec<Activation> {
        let mut activations = Vec::new();
        for (office_id, seats) in self.seats.iter_mut() {
            let Some(office) = catalog.get(office_id) else {
                if seats.iter().any(|s| s.has_pending()) {
                    tracing::warn!("cannot activate successors for unknown office `{office_id}`");
                }
                continue;
            };
            for seat in seats.iter_mut() {
                if !seat.pending_start.is_some_and(|start| start <= year) {
                    continue;
                }
                let previous = seat.vacate(year - 1);
                if let Some(record) = &previous {
                    self.careers.record(record.clone());
                }
                let Some(pending) = seat.take_pending() else {
                    continue;
                };
                let term_end = office.term_end(year);
                seat.install(pending.character_id, year, term_end);
                activations.push(Activation {
                    character_id: pending.character_id,
                    office_id: office_id.clone(),
                    seat_index: seat.index,
                    term_start: year,
                    term_end,
                    previous,
                });
            }
        }
        activations
    }

    /// Vacate every seat held by a character and cancel their pending successions.
    pub fn remove_character(&mut self, character_id: u64, year: i32) -> RemovalOutcome {
        let mut outcome = RemovalOutcome::default();
        for seats in self.seats.values_mut() {
            for seat in seats.iter_mut() {
                if seat.holder == Some(character_id)
                    && let Some(record) = seat.vacate(year)
                {
                    self.careers.record(record.clone());
                    outcome.vacated.push(record);
                }
                if seat.pending_holder == Some(character_id)
                    && let Some(pending) = seat.take_pending()
                {
                    outcome.canceled.push(pending);
                }
            }
        }
        outcome
    }

    // -- Queries --

    pub fn seats(&self, office_id: &str) -> &[Seat] {
        self.seats.get(office_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn active_for(&self, character_id: u64) -> Vec<ActiveRecord> {
        self.all_seats()
            .filter(|s| s.holder == Some(character_id))
            .filter_map(Seat::active_record)
            .collect()
    }

    pub fn pending_for(&self, character_id: u64) -> Vec<PendingAssignment> {
        self.all_seats()
            .filter(|s| s.pending_holder == Some(character_id))
            .filter_map(Seat::pending_record)
            .collect()
    }

    pub fn history_for(&self, character_id: u64) -> &[CareerRecord] {
        self.careers
            .history
            .get(&character_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn last_held_year(&self, character_id: u64, office_id: &str) -> Option<i32> {
        self.careers
            .last_held
            .get(&character_id)
            .and_then(|offices| offices.get(office_id))
            .copied()
    }

    pub fn has_completed(&self, character_id: u64, office_id: &str) -> bool {
        self.history_for(character_id)
            .iter()
            .any(|r| r.office_id == office_id)
    }

    /// Number of seats of an office with a sitting holder.
    pub fn active_holder_count(&self, office_id: &str) -> usize {
        self.seats(office_id).iter().filter(|s| !s.is_vacant()).count()
    }

    /// Every sitting holder, keyed by character, in seat order.
    pub fn active_index(&self) -> BTreeMap<u64, Vec<ActiveRecord>> {
        let mut index: BTreeMap<u64, Vec<ActiveRecord>> = BTreeMap::new();
        for record in self.all_seats().filter_map(Seat::active_record) {
            index.entry(record.character_id).or_default().push(record);
        }
        index
    }

    /// Every pending succession, keyed by character, in seat order.
    pub fn pending_index(&self) -> BTreeMap<u64, Vec<PendingAssignment>> {
        let mut index: BTreeMap<u64, Vec<PendingAssignment>> = BTreeMap::new();
        for record in self.all_seats().filter_map(Seat::pending_record) {
            index.entry(record.character_id).or_default().push(record);
        }
        index
    }

    /// Offices with at least one seat open this year, ordered by rank (highest first),
    /// then minimum age (lowest first), then catalogue order. Declaration and voting
    /// both scan offices in this order.
    pub fn election_infos(&self, year: i32, catalog: &OfficeCatalog) -> Vec<ElectionInfo> {
        let mut infos: Vec<ElectionInfo> = catalog
            .iter()
            .filter_map(|office| {
                let seats = self.seats(&office.id);
                let uncreated = office.seats.saturating_sub(seats.len());
                let open = seats.iter().filter(|s| s.is_available(year)).count();
                let available_seats = uncreated + open;
                (available_seats > 0).then(|| ElectionInfo {
                    office_id: office.id.clone(),
                    office_name: office.name.clone(),
                    rank: office.rank,
                    min_age: office.min_age,
                    available_seats,
                })
            })
            .collect();
        infos.sort_by(|a, b| {
            b.rank
                .cmp(&a.rank)
                .then(a.min_age.cmp(&b.min_age))
                .then_with(|| catalog.position(&a.office_id).cmp(&catalog.position(&b.office_id)))
        });
        infos
    }

    fn all_seats(&self) -> impl Iterator<Item = &Seat> {
        self.seats.values().flat_map(|seats| seats.iter())
    }
}

/// Seat preference for a winner elected in `year`: vacant and unclaimed, then
/// finished and unclaimed, then a fresh seat, and only then a finished seat whose
/// pending successor will be displaced.
///
/// A seat is finished when its term ends by `year`, the same test `election_infos`
/// uses to count it open. An immediate assignment never displaces a holder who took
/// the seat in `year` itself.
fn choose_seat(seats: &[Seat], capacity: usize, year: i32, deferred: bool) -> Option<usize> {
    let finished =
        |s: &Seat| s.is_vacant() || (s.term_over_by(year) && (deferred || s.term_start < year));
    seats
        .iter()
        .position(|s| s.is_vacant() && !s.has_pending())
        .or_else(|| {
            seats
                .iter()
                .position(|s| !s.is_vacant() && finished(s) && !s.has_pending())
        })
        .or_else(|| (seats.len() < capacity).then_some(seats.len()))
        .or_else(|| seats.iter().position(|s| finished(s) && s.has_pending()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::office;

    fn consul() -> OfficeDefinition {
        office("consul", 2, 1, 42, 5)
    }

    fn catalog_with(offices: Vec<OfficeDefinition>) -> OfficeCatalog {
        OfficeCatalog::from_definitions(offices)
    }

    #[test]
    fn ensure_seats_grows_but_never_exceeds_capacity() {
        let mut ledger = SeatLedger::new();
        let consul = consul();
        ledger.ensure_seats(&consul, 1);
        assert_eq!(ledger.seats("consul").len(), 1);
        ledger.ensure_seats(&consul, 5);
        assert_eq!(ledger.seats("consul").len(), 2);
        ledger.ensure_seats(&consul, 0);
        assert_eq!(ledger.seats("consul").len(), 2);
    }

    #[test]
    fn immediate_assignment_fills_vacant_seats_first() {
        let mut ledger = SeatLedger::new();
        let consul = consul();
        let a = ledger.assign(&consul, 1, -248, false).unwrap();
        let b = ledger.assign(&consul, 2, -248, false).unwrap();
        assert_eq!((a.seat_index, b.seat_index), (0, 1));
        assert!(!a.deferred);
        assert_eq!((a.term_start, a.term_end), (-248, -248));
        assert_eq!(ledger.active_holder_count("consul"), 2);

        // Both seats occupied for the year: no third seat.
        let err = ledger.assign(&consul, 3, -248, false).unwrap_err();
        assert!(matches!(err, LedgerError::NoSeatAvailable { .. }));
    }

    #[test]
    fn deferred_assignment_schedules_next_year() {
        let mut ledger = SeatLedger::new();
        let consul = consul();
        ledger.assign(&consul, 1, -249, false).unwrap();
        let outcome = ledger.assign(&consul, 2, -249, true).unwrap();
        assert!(outcome.deferred);
        // Seat 0's term ends in -249, so it is reused ahead of creating seat 1.
        assert_eq!(outcome.seat_index, 0);
        assert_eq!((outcome.term_start, outcome.term_end), (-248, -248));
        assert_eq!(ledger.pending_for(2)[0].start_year, -248);
        assert!(ledger.active_for(2).is_empty());
    }

    #[test]
    fn deferred_assignment_prefers_unclaimed_expiring_seats() {
        let mut ledger = SeatLedger::new();
        let consul = consul();
        ledger.assign(&consul, 1, -249, false).unwrap();
        ledger.assign(&consul, 2, -249, false).unwrap();
        // Both terms end in -249; two winners claim one seat each.
        let a = ledger.assign(&consul, 3, -249, true).unwrap();
        let b = ledger.assign(&consul, 4, -249, true).unwrap();
        assert_ne!(a.seat_index, b.seat_index);
        assert!(a.canceled.is_none() && b.canceled.is_none());
    }

    #[test]
    fn reassigning_a_claimed_seat_cancels_the_previous_successor() {
        let mut ledger = SeatLedger::new();
        let censor = office("censor", 1, 5, 45, 6);
        ledger.assign(&censor, 1, -250, true).unwrap();
        let outcome = ledger.assign(&censor, 2, -250, true).unwrap();
        let canceled = outcome.canceled.unwrap();
        assert_eq!(canceled.character_id, 1);
        assert!(ledger.pending_for(1).is_empty());
        assert_eq!(ledger.pending_for(2).len(), 1);
    }

    #[test]
    fn immediate_assignment_displaces_finished_holder_into_history() {
        let mut ledger = SeatLedger::new();
        let single = office("dictator", 1, 1, 40, 9);
        ledger.assign(&single, 1, -250, false).unwrap();
        let outcome = ledger.assign(&single, 2, -249, false).unwrap();
        let displaced = outcome.displaced.unwrap();
        assert_eq!(displaced.character_id, 1);
        assert_eq!((displaced.term_start, displaced.term_end), (-250, -250));
        assert_eq!(ledger.last_held_year(1, "dictator"), Some(-250));
        assert!(ledger.has_completed(1, "dictator"));
    }

    #[test]
    fn expire_vacates_only_when_successor_ready() {
        let mut ledger = SeatLedger::new();
        let consul = consul();
        ledger.assign(&consul, 1, -250, false).unwrap();
        ledger.assign(&consul, 2, -250, false).unwrap();
        ledger.assign(&consul, 3, -250, true).unwrap();

        let report = ledger.expire_completed_terms(-249);
        assert_eq!(report.vacated.len(), 1);
        assert_eq!(report.extended.len(), 1);
        let vacated = &report.vacated[0];
        let extended = &report.extended[0];
        assert_ne!(vacated.character_id, extended.character_id);
        assert_eq!(extended.original_end, -250);
        assert_eq!(extended.extended_to, -249);
        assert_eq!(ledger.active_for(extended.character_id)[0].term_end, -249);
    }

    #[test]
    fn expire_releases_a_holder_taking_another_seat() {
        let mut ledger = SeatLedger::new();
        let quaestor = office("quaestor", 1, 1, 30, 1);
        let praetor = office("praetor", 2, 1, 39, 4);
        ledger.assign(&quaestor, 4, -250, false).unwrap();
        ledger.assign(&praetor, 4, -250, true).unwrap();

        // No successor for the quaestorship, but the holder moves on to praetor.
        let report = ledger.expire_completed_terms(-249);
        assert!(report.extended.is_empty());
        assert_eq!(report.vacated.len(), 1);
        assert_eq!(report.vacated[0].office_id, "quaestor");
        assert!(ledger.active_for(4).is_empty());
    }

    #[test]
    fn immediate_assignment_vacates_other_offices() {
        let mut ledger = SeatLedger::new();
        let quaestor = office("quaestor", 1, 1, 30, 1);
        let praetor = office("praetor", 2, 1, 39, 4);
        ledger.assign(&quaestor, 4, -250, false).unwrap();
        ledger.assign(&praetor, 4, -250, false).unwrap();

        let active = ledger.active_for(4);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].office_id, "praetor");
        assert!(ledger.has_completed(4, "quaestor"));
    }

    #[test]
    fn immediate_assignment_reuses_grace_extended_seats() {
        let mut ledger = SeatLedger::new();
        let consul = consul();
        let catalog = catalog_with(vec![consul.clone()]);
        ledger.assign(&consul, 1, -249, false).unwrap();
        ledger.assign(&consul, 2, -249, false).unwrap();

        let report = ledger.expire_completed_terms(-248);
        assert_eq!(report.extended.len(), 2);
        assert_eq!(ledger.election_infos(-248, &catalog)[0].available_seats, 2);

        let a = ledger.assign(&consul, 3, -248, false).unwrap();
        let b = ledger.assign(&consul, 4, -248, false).unwrap();
        assert_ne!(a.seat_index, b.seat_index);
        let displaced = a.displaced.unwrap();
        assert_eq!((displaced.term_start, displaced.term_end), (-249, -249));
        assert_eq!(ledger.last_held_year(1, "consul"), Some(-249));
        assert_eq!(ledger.active_for(3)[0].term_start, -248);

        // Seats filled this year are not up for grabs again.
        assert!(ledger.assign(&consul, 5, -248, false).is_err());
    }

    #[test]
    fn immediate_reelection_keeps_one_seat() {
        let mut ledger = SeatLedger::new();
        let consul = consul();
        ledger.assign(&consul, 1, -249, false).unwrap();
        ledger.assign(&consul, 2, -249, false).unwrap();
        ledger.expire_completed_terms(-248);

        // Holder of seat 1 is re-elected and lands in seat 0.
        let outcome = ledger.assign(&consul, 2, -248, false).unwrap();
        assert_eq!(outcome.seat_index, 0);
        let active = ledger.active_for(2);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].seat_index, 0);
        assert!(ledger.seats("consul")[1].is_vacant());
        assert_eq!(ledger.history_for(2)[0].term_end, -248);
    }

    #[test]
    fn activate_pending_installs_successor() {
        let mut ledger = SeatLedger::new();
        let consul = consul();
        let catalog = catalog_with(vec![consul.clone()]);
        ledger.assign(&consul, 1, -250, false).unwrap();
        ledger.assign(&consul, 7, -250, true).unwrap();

        ledger.expire_completed_terms(-249);
        let activations = ledger.activate_pending(-249, &catalog);
        assert_eq!(activations.len(), 1);
        assert_eq!(activations[0].character_id, 7);
        assert_eq!(activations[0].term_start, -249);
        assert_eq!(activations[0].term_end, -249);
        assert!(ledger.pending_for(7).is_empty());
        assert_eq!(ledger.active_for(7).len(), 1);
        assert_eq!(ledger.history_for(1).len(), 1);
    }

    #[test]
    fn activation_closes_out_a_holder_still_seated() {
        let mut ledger = SeatLedger::new();
        let censor = office("censor", 1, 5, 45, 6);
        let catalog = catalog_with(vec![censor.clone()]);
        ledger.assign(&censor, 1, -250, false).unwrap();
        // Term runs to -246; a successor is forced in for -248.
        assert!(ledger.assign(&censor, 2, -250, true).is_err());
        let seats = ledger.seats.get_mut("censor").unwrap();
        seats[0].pending_holder = Some(2);
        seats[0].pending_start = Some(-248);

        let activations = ledger.activate_pending(-248, &catalog);
        let previous = activations[0].previous.clone().unwrap();
        assert_eq!(previous.character_id, 1);
        assert_eq!(previous.term_end, -249);
        assert_eq!(ledger.last_held_year(1, "censor"), Some(-249));
    }

    #[test]
    fn remove_character_vacates_and_cancels() {
        let mut ledger = SeatLedger::new();
        let consul = consul();
        let praetor = office("praetor", 2, 1, 39, 4);
        ledger.assign(&praetor, 5, -250, false).unwrap();
        ledger.assign(&consul, 5, -250, true).unwrap();

        let outcome = ledger.remove_character(5, -250);
        assert_eq!(outcome.vacated.len(), 1);
        assert_eq!(outcome.canceled.len(), 1);
        assert!(ledger.active_for(5).is_empty());
        assert!(ledger.pending_for(5).is_empty());
        // Only the vacated term reaches the history.
        assert_eq!(ledger.history_for(5).len(), 1);
        assert_eq!(ledger.history_for(5)[0].office_id, "praetor");
    }

    #[test]
    fn election_infos_orders_by_rank_then_min_age() {
        let catalog = catalog_with(vec![
            office("quaestor", 8, 1, 30, 1),
            office("curule_aedile", 2, 1, 36, 3),
            office("plebeian_aedile", 2, 1, 33, 3),
            office("consul", 2, 1, 42, 5),
        ]);
        let ledger = SeatLedger::new();
        let ids: Vec<String> = ledger
            .election_infos(-248, &catalog)
            .into_iter()
            .map(|i| i.office_id)
            .collect();
        assert_eq!(
            ids,
            vec!["consul", "plebeian_aedile", "curule_aedile", "quaestor"]
        );
    }

    #[test]
    fn election_infos_breaks_ties_by_catalogue_order() {
        let catalog = catalog_with(vec![
            office("tribune_of_the_plebs", 10, 1, 27, 2),
            office("quaestor", 8, 1, 27, 2),
        ]);
        let infos = SeatLedger::new().election_infos(-248, &catalog);
        assert_eq!(infos[0].office_id, "tribune_of_the_plebs");
        assert_eq!(infos[1].office_id, "quaestor");
    }

    #[test]
    fn election_infos_counts_open_seats() {
        let consul = consul();
        let catalog = catalog_with(vec![consul.clone()]);
        let mut ledger = SeatLedger::new();
        ledger.assign(&consul, 1, -249, false).unwrap();
        assert_eq!(ledger.election_infos(-249, &catalog)[0].available_seats, 2);
        ledger.assign(&consul, 2, -249, true).unwrap();
        assert_eq!(ledger.election_infos(-249, &catalog)[0].available_seats, 1);
        ledger.assign(&consul, 3, -249, true).unwrap();
        assert!(ledger.election_infos(-249, &catalog).is_empty());
    }
}
