use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::common::errors::InputError;
use crate::common::types::{BankrollState, OrderAck, OrderIntent, Settlement};
use crate::strategy::FeeSchedule;

/// Capital bookkeeping for the trading loop
///
/// Confirmed fills commit their notional to the game and pay the fee out
/// of total capital. The unfilled remainder of a resting order is committed
/// at its limit price as well, so it cannot be spent twice. A settlement
/// releases everything committed to the game and books `payout − cost`.
/// Drawdown is measured from the highest total capital seen.
#[derive(Debug, Clone)]
pub struct BankrollLedger {
    starting_capital: Decimal,
    total_capital: Decimal,
    peak_capital: Decimal,
    committed: BTreeMap<String, Decimal>,
    fees: FeeSchedule,
}

impl BankrollLedger {
    pub fn new(starting_capital: Decimal) -> Self {
        Self {
            starting_capital,
            total_capital: starting_capital,
            peak_capital: starting_capital,
            committed: BTreeMap::new(),
            fees: FeeSchedule::default(),
        }
    }

    pub fn total_capital(&self) -> Decimal {
        self.total_capital
    }

    /// Dollars committed across every open game
    pub fn deployed(&self) -> Decimal {
        self.committed.values().copied().sum()
    }

    pub fn peak_capital(&self) -> Decimal {
        self.peak_capital
    }

    /// Total capital gained or lost since the ledger was opened
    pub fn realized_pnl(&self) -> Decimal {
        self.total_capital - self.starting_capital
    }

    /// Games with committed capital awaiting settlement
    pub fn open_games(&self) -> Vec<String> {
        self.committed.keys().cloned().collect()
    }

    /// Fraction below peak, 0 when at or above it
    pub fn drawdown_pct(&self) -> Decimal {
        if self.peak_capital <= Decimal::ZERO || self.total_capital >= self.peak_capital {
            return Decimal::ZERO;
        }
        ((self.peak_capital - self.total_capital) / self.peak_capital).min(Decimal::ONE)
    }

    pub fn snapshot(&self) -> BankrollState {
        BankrollState::new(self.total_capital)
            .with_deployed(self.deployed())
            .with_drawdown(self.drawdown_pct())
    }

    /// Book an acknowledged order, returning the dollars it took out of free capital
    ///
    /// Simulated and cancelled acks without fills change nothing.
    pub fn record_order(&mut self, intent: &OrderIntent, ack: &OrderAck) -> Result<Decimal, InputError> {
        let mut filled_notional = Decimal::ZERO;
        let mut fee = Decimal::ZERO;
        if ack.has_fill() {
            let price = ack.avg_fill_price_cents.unwrap_or(intent.limit_price_cents);
            filled_notional =
                Decimal::from(ack.filled_contracts) * Decimal::from(price) / Decimal::ONE_HUNDRED;
            fee = self
                .fees
                .fee_dollars(price, ack.filled_contracts, intent.order_type.is_maker())?;
        }

        let resting = if ack.status.is_open() {
            intent.contract_count.saturating_sub(ack.filled_contracts)
        } else {
            0
        };
        let reserved =
            Decimal::from(resting) * Decimal::from(intent.limit_price_cents) / Decimal::ONE_HUNDRED;

        let committed = filled_notional + reserved;
        if committed.is_zero() {
            debug!(status = ?ack.status, "nothing to record");
            return Ok(Decimal::ZERO);
        }

        *self.committed.entry(intent.game_id.clone()).or_default() += committed;
        self.total_capital -= fee;

        info!(
            game_id = %intent.game_id,
            filled = ack.filled_contracts,
            resting,
            notional = %filled_notional,
            reserved = %reserved,
            fee = %fee,
            deployed = %self.deployed(),
            "order recorded"
        );
        Ok(committed + fee)
    }

    /// Release the game's committed capital and book the settlement's P&L
    pub fn record_settlement(&mut self, settlement: &Settlement) {
        let released = self
            .committed
            .remove(&settlement.game_id)
            .unwrap_or(Decimal::ZERO);
        self.total_capital += settlement.pnl();
        if self.total_capital > self.peak_capital {
            self.peak_capital = self.total_capital;
        }
        info!(
            game_id = %settlement.game_id,
            released = %released,
            cost = %settlement.cost,
            payout = %settlement.payout,
            total = %self.total_capital,
            drawdown = %self.drawdown_pct(),
            "settlement recorded"
        );
    }
}
