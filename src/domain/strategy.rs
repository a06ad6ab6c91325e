//! The strategy contract driven by the simulation loop.

use super::error::SbtError;
use super::ledger::Ledger;
use super::ohlcv::PriceSeries;

/// User-supplied decision logic.
///
/// The engine depends only on this trait; concrete strategies register by
/// name in [`super::strategies`] or are passed in directly by library
/// callers. Any auxiliary state a strategy needs between bars lives in its
/// own fields.
pub trait Strategy {
    /// Called once before the first bar; precompute derived series here.
    fn setup(&mut self, _series: &PriceSeries) -> Result<(), SbtError> {
        Ok(())
    }

    /// Called once per bar in increasing order; the only place orders may
    /// be issued. Must tolerate insufficient history by doing nothing.
    fn decide(
        &mut self,
        bar: usize,
        series: &PriceSeries,
        ledger: &mut Ledger,
    ) -> Result<(), SbtError>;
}
