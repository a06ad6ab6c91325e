//! Buy-and-hold baseline strategy.

use crate::domain::error::SbtError;
use crate::domain::ledger::Ledger;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::strategy::Strategy;

/// Spends as much cash as possible on whole shares at the first bar's
/// close, then holds to the end of the series.
#[derive(Debug, Default)]
pub struct BuyAndHold;

impl Strategy for BuyAndHold {
    fn decide(
        &mut self,
        bar: usize,
        series: &PriceSeries,
        ledger: &mut Ledger,
    ) -> Result<(), SbtError> {
        if bar != 0 {
            return Ok(());
        }
        let price = series.close(bar)?;
        let per_share = price * (1.0 + ledger.commission_rate());
        let size = (ledger.cash() / per_share).floor() as u64;
        ledger.buy(bar, size)
    }
}
