use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use tracing::debug;

use crate::common::errors::InputError;
use crate::common::types::BankrollState;
use crate::config::{DrawdownThrottleConfig, TradingConfig};
use crate::strategy::fees::FeeSchedule;
use crate::strategy::kelly::{binary_odds, full_kelly, ruin_constrained_fraction};
use crate::strategy::types::{SizingRejection, SizingResult};

/// Position sizer
///
/// Turns a model probability and an ask into a whole number of contracts.
///
/// # Pipeline
///
/// 1. Reject prices under the configured floor
/// 2. Full-Kelly fraction at the fee-inclusive cost of one contract
/// 3. Cap by the drawdown-probability constraint
/// 4. Scale down by realized drawdown
/// 5. Clamp the stake to `MAX_TRADE` and free capital
/// 6. Round down to contracts until notional plus fee fits the budget
/// 7. Require positive expected value after fees
///
/// Sizing never fails for lack of edge or money; those come back as a
/// zero-contract [`SizingResult`] with a reason. Only malformed inputs
/// produce an [`InputError`].
#[derive(Debug, Clone, Default)]
pub struct PositionSizer {
    fees: FeeSchedule,
}

impl PositionSizer {
    pub fn new(fees: FeeSchedule) -> Self {
        Self { fees }
    }

    pub fn size(
        &self,
        bankroll: &BankrollState,
        model_probability: Decimal,
        price_cents: u32,
        config: &TradingConfig,
    ) -> Result<SizingResult, InputError> {
        if price_cents == 0 || price_cents >= 100 {
            return Err(InputError::PriceOutOfRange {
                field: "market",
                cents: price_cents,
            });
        }
        if model_probability < Decimal::ZERO || model_probability > Decimal::ONE {
            return Err(InputError::ProbabilityOutOfRange {
                field: "model",
                value: model_probability,
            });
        }
        bankroll.validate()?;

        if price_cents < config.min_price_cents() {
            return Ok(SizingResult::rejected(SizingRejection::BelowPriceFloor, Decimal::ZERO));
        }

        let maker = config.use_maker;
        let price = Decimal::from(price_cents) / Decimal::ONE_HUNDRED;
        let cost = price + self.fees.per_contract(price_cents, maker)?;

        let odds = match binary_odds(cost) {
            Some(odds) => odds,
            None => {
                return Ok(SizingResult::rejected(SizingRejection::FeeExceedsProfit, Decimal::ZERO))
            }
        };

        let kelly = full_kelly(model_probability, odds);
        if kelly <= Decimal::ZERO {
            return Ok(SizingResult::rejected(SizingRejection::NoEdge, kelly));
        }

        let capped = if config.ruin.enabled {
            match ruin_constrained_fraction(model_probability, odds, kelly, &config.ruin) {
                Some(cap) => {
                    let fraction = Decimal::from_f64(cap.fraction).unwrap_or(Decimal::ZERO);
                    debug!(
                        kelly = %kelly,
                        capped = cap.fraction,
                        multiplier = cap.kelly_multiplier,
                        binding = cap.binding,
                        "drawdown constraint applied"
                    );
                    fraction.min(kelly)
                }
                None => {
                    return Ok(SizingResult::rejected(
                        SizingRejection::NoAdmissibleFraction,
                        kelly,
                    ))
                }
            }
        } else {
            kelly
        };

        let applied = capped * drawdown_scale(bankroll.realized_drawdown_pct, &config.throttle);
        let budget = config.max_trade.min(bankroll.free_capital());
        if budget <= Decimal::ZERO {
            return Ok(SizingResult::rejected(SizingRejection::InsufficientCapital, kelly));
        }

        let stake = (bankroll.total_capital * applied).min(budget);
        let mut contracts = (stake / price).floor().to_u32().unwrap_or(0);
        let mut fee = self.fees.fee_dollars(price_cents, contracts, maker)?;
        while contracts > 0 && Decimal::from(contracts) * price + fee > budget {
            contracts -= 1;
            fee = self.fees.fee_dollars(price_cents, contracts, maker)?;
        }

        if contracts == 0 {
            let mut result = SizingResult::rejected(SizingRejection::ZeroContracts, kelly);
            result.applied_fraction = applied;
            return Ok(result);
        }

        let count = Decimal::from(contracts);
        let expected_value = count * (model_probability - price) - fee;
        let result = SizingResult {
            contracts,
            notional_cost: count * price,
            expected_fee: fee,
            expected_value,
            kelly_fraction: kelly,
            applied_fraction: applied,
            rejected_reason: None,
        };

        if expected_value <= Decimal::ZERO {
            return Ok(SizingResult {
                contracts: 0,
                notional_cost: Decimal::ZERO,
                expected_fee: Decimal::ZERO,
                rejected_reason: Some(SizingRejection::NonPositiveExpectedValue),
                ..result
            });
        }

        Ok(result)
    }
}

/// Stake multiplier for a realized drawdown
///
/// 1 at zero drawdown, falling linearly to `floor_scale` at
/// `max_drawdown_pct` and flat beyond it.
pub fn drawdown_scale(drawdown_pct: Decimal, throttle: &DrawdownThrottleConfig) -> Decimal {
    if throttle.max_drawdown_pct <= Decimal::ZERO {
        return throttle.floor_scale;
    }
    let progress = (drawdown_pct / throttle.max_drawdown_pct)
        .max(Decimal::ZERO)
        .min(Decimal::ONE);
    Decimal::ONE - (Decimal::ONE - throttle.floor_scale) * progress
}
