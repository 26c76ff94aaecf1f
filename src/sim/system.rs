use super::context::TickContext;

/// How often a simulation system should tick.
///
/// Ordered coarsest-to-finest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TickFrequency {
    Yearly,  // first day of each year
    Monthly, // first day of each month
    Daily,   // every calendar day
}

/// A pluggable simulation system driven by the calendar.
///
/// Object-safe so systems can be stored as `Box<dyn SimSystem>`. Dependencies are
/// declared by name and resolved once, when the simulation is built.
pub trait SimSystem {
    fn name(&self) -> &str;

    fn frequency(&self) -> TickFrequency {
        TickFrequency::Daily
    }

    /// Names of the systems or providers that must come before this one.
    fn dependencies(&self) -> &[&str] {
        &[]
    }

    /// Phase 1: react to the calendar and inbound signals in `ctx.inbox`.
    fn tick(&mut self, ctx: &mut TickContext);

    /// Phase 2: react to signals emitted by other systems during Phase 1.
    ///
    /// Called once per day with the full Phase 1 signal buffer in `ctx.inbox`.
    /// Signals pushed here are published but **not** re-delivered (single-pass).
    /// Default: no-op.
    fn handle_signals(&mut self, ctx: &mut TickContext) {
        let _ = ctx;
    }
}
