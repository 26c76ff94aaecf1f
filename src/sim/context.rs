use rand::RngCore;

use super::signal::Signal;
use crate::model::SimDate;
use crate::roster::CharacterProvider;

/// Context passed to each system on every tick.
///
/// Bundled so we can add fields later without changing the `SimSystem` trait
/// signature.
pub struct TickContext<'a> {
    pub date: SimDate,
    pub characters: &'a dyn CharacterProvider,
    /// Per-day, per-system stream; see `sim::rng`.
    pub rng: &'a mut dyn RngCore,
    /// Systems push outbound signals here.
    pub signals: &'a mut Vec<Signal>,
    /// Calendar/population signals in Phase 1, other systems' signals in Phase 2.
    pub inbox: &'a [Signal],
}
