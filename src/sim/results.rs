use super::candidacy::DeclarationBook;
use super::lottery::floor_weight;
use super::voting::OfficeBallot;
use crate::catalog::OfficeCatalog;
use crate::ledger::{AssignmentOutcome, SeatLedger};
use crate::model::{
    CandidateSummary, ElectionCandidate, ElectionResultRecord, FactorBreakdown, WinnerSummary,
};

/// What applying one ballot did: the permanent record plus the ledger changes.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedBallot {
    pub record: ElectionResultRecord,
    pub assignments: Vec<AssignmentOutcome>,
}

/// Commits drawn winners into the ledger and writes up the result.
pub struct ResultsApplier<'a> {
    catalog: &'a OfficeCatalog,
    defer_assignments: bool,
}

impl<'a> ResultsApplier<'a> {
    pub fn new(catalog: &'a OfficeCatalog, defer_assignments: bool) -> Self {
        Self {
            catalog,
            defer_assignments,
        }
    }

    /// Seat every winner, clear the office's declarations, and build the record.
    /// Returns `None` only for an office missing from the catalogue.
    pub fn apply(
        &self,
        ledger: &mut SeatLedger,
        book: &mut DeclarationBook,
        ballot: &OfficeBallot,
        year: i32,
    ) -> Option<AppliedBallot> {
        let Some(office) = self.catalog.get(&ballot.info.office_id) else {
            tracing::warn!(
                "cannot apply results for unknown office `{}`",
                ballot.info.office_id
            );
            return None;
        };
        let shares = support_shares(&ballot.candidates);

        let mut winners = Vec::new();
        let mut assignments = Vec::new();
        for &index in &ballot.winners {
            let Some(candidate) = ballot.candidates.get(index) else {
                continue;
            };
            let outcome = match ledger.assign(
                office,
                candidate.character_id(),
                year,
                self.defer_assignments,
            ) {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::warn!("winner {} not seated: {err}", candidate.character_id());
                    continue;
                }
            };
            tracing::info!(
                "{} elected {} for {}..={}",
                candidate.declaration.character_name,
                office.name,
                outcome.term_start,
                outcome.term_end
            );
            winners.push(WinnerSummary {
                character_id: candidate.character_id(),
                name: candidate.declaration.character_name.clone(),
                seat_index: outcome.seat_index,
                term_start: outcome.term_start,
                term_end: outcome.term_end,
                deferred: outcome.deferred,
                support_share: shares[index],
                justification: justification(&candidate.breakdown),
            });
            assignments.push(outcome);
        }

        book.clear_office(&office.id);
        let record = ElectionResultRecord {
            year,
            office_id: office.id.clone(),
            office_name: office.name.clone(),
            candidates: summarize(&ballot.candidates, &shares),
            winners,
        };
        Some(AppliedBallot {
            record,
            assignments,
        })
    }
}

/// Each candidate's share of the floored score total: their chance on a single draw.
pub fn support_shares(candidates: &[ElectionCandidate]) -> Vec<f64> {
    let floored: Vec<f64> = candidates
        .iter()
        .map(|c| floor_weight(c.score))
        .collect();
    let total: f64 = floored.iter().sum();
    if total <= 0.0 {
        return vec![0.0; candidates.len()];
    }
    floored.into_iter().map(|w| w / total).collect()
}

fn summarize(candidates: &[ElectionCandidate], shares: &[f64]) -> Vec<CandidateSummary> {
    candidates
        .iter()
        .zip(shares)
        .map(|(c, &support_share)| CandidateSummary {
            character_id: c.character_id(),
            name: c.declaration.character_name.clone(),
            score: c.score,
            support_share,
        })
        .collect()
}

fn factor_phrase(label: &str) -> &str {
    match label {
        "influence" => "influence",
        "wealth" => "wealth",
        "charisma" => "personal charisma",
        "popularity" => "popular favour",
        "advocacy" => "forceful advocacy",
        "class" => "class loyalty",
        "campaign" => "a determined campaign",
        "fortuna" => "good fortune",
        other => other,
    }
}

/// Short sentence naming the one or two largest positive vote factors.
pub fn justification(breakdown: &FactorBreakdown) -> String {
    let top: Vec<&str> = breakdown
        .top_positive(2)
        .into_iter()
        .map(factor_phrase)
        .collect();
    match top.as_slice() {
        [] => "Elected without notable backing".to_string(),
        [only] => format!("Backed by {only}"),
        [first, second, ..] => format!("Backed by {first} and {second}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::ElectionInfo;
    use crate::model::Declaration;
    use crate::testutil::office;

    fn candidate(id: u64, score: f64, factors: &[(&str, f64)]) -> ElectionCandidate {
        let mut breakdown = FactorBreakdown::new();
        for &(label, value) in factors {
            breakdown.add(label, value);
        }
        ElectionCandidate {
            declaration: Declaration {
                character_id: id,
                character_name: format!("Character {id}"),
                office_id: "consul".to_string(),
                year: -248,
                desire: 5.0,
                breakdown: FactorBreakdown::new(),
            },
            score,
            breakdown,
        }
    }

    fn ballot(candidates: Vec<ElectionCandidate>, winners: Vec<usize>) -> OfficeBallot {
        OfficeBallot {
            info: ElectionInfo {
                office_id: "consul".into(),
                office_name: "Consul".into(),
                rank: 5,
                min_age: 40,
                available_seats: winners.len(),
            },
            candidates,
            winners,
        }
    }

    #[test]
    fn shares_use_floored_scores() {
        let shares = support_shares(&[
            candidate(1, 3.0, &[]),
            candidate(2, 1.0, &[]),
            candidate(3, -5.0, &[]),
        ]);
        assert!((shares[0] - 3.0 / 4.01).abs() < 1e-12);
        assert!((shares[2] - 0.01 / 4.01).abs() < 1e-12);
        assert!((shares.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn justification_names_top_factors() {
        let mut b = FactorBreakdown::new();
        b.add("influence", 24.0);
        b.add("wealth", 3.0);
        b.add("class", 4.0);
        assert_eq!(justification(&b), "Backed by influence and class loyalty");

        let mut lone = FactorBreakdown::new();
        lone.add("fortuna", 1.0);
        lone.add("class", 0.0);
        assert_eq!(justification(&lone), "Backed by good fortune");
        assert_eq!(
            justification(&FactorBreakdown::new()),
            "Elected without notable backing"
        );
    }

    #[test]
    fn apply_defers_winners_and_clears_declarations() {
        let catalog = OfficeCatalog::from_definitions(vec![office("consul", 2, 1, 40, 5)]);
        let mut ledger = SeatLedger::new();
        let mut book = DeclarationBook::new();
        book.open(-248);
        let field = vec![
            candidate(1, 30.0, &[("influence", 24.0), ("class", 4.0)]),
            candidate(2, 10.0, &[("influence", 10.0)]),
        ];
        for c in &field {
            book.record(c.declaration.clone());
        }

        let applied = ResultsApplier::new(&catalog, true)
            .apply(&mut ledger, &mut book, &ballot(field, vec![1]), -248)
            .unwrap();

        assert!(book.for_office("consul").is_empty());
        let record = &applied.record;
        assert_eq!(record.winner_ids(), vec![2]);
        assert_eq!(record.candidates.len(), 2);
        let winner = &record.winners[0];
        assert!(winner.deferred);
        assert_eq!((winner.term_start, winner.term_end), (-247, -247));
        assert!((winner.support_share - 0.25).abs() < 1e-12);
        assert_eq!(winner.justification, "Backed by influence");
        assert_eq!(ledger.pending_for(2).len(), 1);
    }

    #[test]
    fn unseatable_winner_is_skipped() {
        let catalog = OfficeCatalog::from_definitions(vec![office("dictator", 1, 1, 40, 9)]);
        let dictator = catalog.get("dictator").unwrap().clone();
        let mut ledger = SeatLedger::new();
        ledger.assign(&dictator, 50, -248, false).unwrap();
        ledger.assign(&dictator, 51, -248, true).unwrap();

        let mut book = DeclarationBook::new();
        let mut ballot = ballot(vec![candidate(1, 5.0, &[])], vec![0]);
        ballot.info.office_id = "dictator".into();
        // Seat already promised for next year: immediate assignment has nowhere to go.
        let applied = ResultsApplier::new(&catalog, false)
            .apply(&mut ledger, &mut book, &ballot, -248)
            .unwrap();
        assert!(applied.record.winners.is_empty());
        assert!(applied.assignments.is_empty());
    }
}
