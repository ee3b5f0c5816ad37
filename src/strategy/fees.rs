use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::common::errors::InputError;

/// Kalshi trading fee schedule
///
/// Fee per order = `rate × C × P × (1 − P)` where `P` is the price in
/// dollars and `C` the contract count. The curve peaks at 50¢ and vanishes
/// at 0¢ and 100¢. Resting (maker) orders pay a quarter of the taker rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeSchedule {
    /// Rate for post-only orders that rest on the book
    pub maker_rate: Decimal,
    /// Rate for orders that cross the spread
    pub taker_rate: Decimal,
}

impl FeeSchedule {
    /// Kalshi's published general-market schedule
    pub fn kalshi() -> Self {
        Self {
            maker_rate: dec!(0.0175),
            taker_rate: dec!(0.07),
        }
    }

    fn rate(&self, maker: bool) -> Decimal {
        if maker {
            self.maker_rate
        } else {
            self.taker_rate
        }
    }

    /// Unrounded fee for a single contract, in dollars
    ///
    /// Used where the sizer needs the marginal cost of one more contract.
    pub fn per_contract(&self, price_cents: u32, maker: bool) -> Result<Decimal, InputError> {
        let p = price_fraction(price_cents)?;
        Ok(self.rate(maker) * p * (Decimal::ONE - p))
    }

    /// Fee for `contracts` at `price_cents`, in whole cents
    ///
    /// Rounded half-up (midpoint away from zero) to the cent. Decimal
    /// arithmetic keeps repeated calls bit-identical.
    pub fn fee_cents(
        &self,
        price_cents: u32,
        contracts: u32,
        maker: bool,
    ) -> Result<Decimal, InputError> {
        let raw_dollars = self.per_contract(price_cents, maker)? * Decimal::from(contracts);
        Ok((raw_dollars * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Same as [`fee_cents`](Self::fee_cents), expressed in dollars
    pub fn fee_dollars(
        &self,
        price_cents: u32,
        contracts: u32,
        maker: bool,
    ) -> Result<Decimal, InputError> {
        Ok(self.fee_cents(price_cents, contracts, maker)? / Decimal::ONE_HUNDRED)
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::kalshi()
    }
}

/// Kalshi fee in whole cents for `contracts` bought at `price_cents`
pub fn kalshi_fee(price_cents: u32, contracts: u32, maker: bool) -> Result<Decimal, InputError> {
    FeeSchedule::kalshi().fee_cents(price_cents, contracts, maker)
}

fn price_fraction(price_cents: u32) -> Result<Decimal, InputError> {
    if price_cents > 100 {
        return Err(InputError::PriceOutOfRange {
            field: "fee",
            cents: price_cents,
        });
    }
    Ok(Decimal::from(price_cents) / Decimal::ONE_HUNDRED)
}
