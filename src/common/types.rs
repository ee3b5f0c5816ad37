//! Unified types shared by the engine, the adapters and the trading loop

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::InputError;

/// Basketball league an opportunity belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum League {
    Nba,
    /// NCAA men's basketball
    Ncaabbm,
    /// NCAA women's basketball
    Ncaabbw,
}

impl League {
    /// Length of regulation play in seconds
    pub fn regulation_seconds(&self) -> u32 {
        match self {
            League::Nba => 2880,
            League::Ncaabbm => 2400,
            // Four 10-minute quarters
            League::Ncaabbw => 2400,
        }
    }
}

impl std::fmt::Display for League {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            League::Nba => write!(f, "nba"),
            League::Ncaabbm => write!(f, "ncaabbm"),
            League::Ncaabbw => write!(f, "ncaabbw"),
        }
    }
}

/// Which team a contract pays out on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Home,
    Away,
}

impl std::fmt::Display for TeamSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamSide::Home => write!(f, "home"),
            TeamSide::Away => write!(f, "away"),
        }
    }
}

/// Kalshi contract side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractSide {
    Yes,
    No,
}

impl std::fmt::Display for ContractSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContractSide::Yes => write!(f, "yes"),
            ContractSide::No => write!(f, "no"),
        }
    }
}

/// Maker (resting, post-only) or taker (crossing) order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Maker,
    Taker,
}

impl OrderType {
    pub fn from_use_maker(use_maker: bool) -> Self {
        if use_maker {
            OrderType::Maker
        } else {
            OrderType::Taker
        }
    }

    pub fn is_maker(&self) -> bool {
        matches!(self, OrderType::Maker)
    }
}

/// One merged (ESPN state, Kalshi quote) snapshot for a single team's contract
///
/// A fresh value is produced on every polling tick and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    /// Kalshi event ticker identifying the game
    pub game_id: String,
    /// Kalshi market ticker the order would be placed on
    pub ticker: String,
    pub league: League,
    pub team_home: String,
    pub team_away: String,
    /// Current period (1-4 regulation, 5+ overtime)
    pub period: u8,
    /// Total game seconds remaining
    pub seconds_remaining: u32,
    #[serde(default)]
    pub home_score: u32,
    #[serde(default)]
    pub away_score: u32,
    /// ESPN win probability for the home team (0-1)
    pub espn_win_probability: Decimal,
    pub kalshi_bid_cents: u32,
    pub kalshi_ask_cents: u32,
    /// Which team the contract represents
    pub kalshi_side: TeamSide,
    /// Kalshi side (yes/no) that pays on `kalshi_side` winning
    pub contract: ContractSide,
}

impl Opportunity {
    /// Model win probability for the team the contract represents
    pub fn side_probability(&self) -> Decimal {
        match self.kalshi_side {
            TeamSide::Home => self.espn_win_probability,
            TeamSide::Away => Decimal::ONE - self.espn_win_probability,
        }
    }

    /// Score differential from the contract team's point of view
    pub fn side_lead(&self) -> i64 {
        let diff = i64::from(self.home_score) - i64::from(self.away_score);
        match self.kalshi_side {
            TeamSide::Home => diff,
            TeamSide::Away => -diff,
        }
    }

    /// Market-implied probability of the contract (ask based, since we only buy)
    pub fn implied_probability(&self) -> Decimal {
        Decimal::from(self.kalshi_ask_cents) / Decimal::ONE_HUNDRED
    }

    /// Team code of the contract side
    pub fn side_team(&self) -> &str {
        match self.kalshi_side {
            TeamSide::Home => &self.team_home,
            TeamSide::Away => &self.team_away,
        }
    }

    /// Reject malformed snapshots before they reach the gate
    pub fn validate(&self) -> std::result::Result<(), InputError> {
        if self.game_id.trim().is_empty() {
            return Err(InputError::MissingField("game_id"));
        }
        if self.ticker.trim().is_empty() {
            return Err(InputError::MissingField("ticker"));
        }
        if self.espn_win_probability < Decimal::ZERO || self.espn_win_probability > Decimal::ONE {
            return Err(InputError::ProbabilityOutOfRange {
                field: "espn_win",
                value: self.espn_win_probability,
            });
        }
        if self.kalshi_bid_cents > 100 {
            return Err(InputError::PriceOutOfRange {
                field: "kalshi_bid",
                cents: self.kalshi_bid_cents,
            });
        }
        if self.kalshi_ask_cents > 100 {
            return Err(InputError::PriceOutOfRange {
                field: "kalshi_ask",
                cents: self.kalshi_ask_cents,
            });
        }
        if self.kalshi_bid_cents > self.kalshi_ask_cents {
            return Err(InputError::CrossedQuote {
                bid: self.kalshi_bid_cents,
                ask: self.kalshi_ask_cents,
            });
        }
        Ok(())
    }
}

/// Capital figures owned by the caller and read by the engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BankrollState {
    /// Total capital in dollars
    pub total_capital: Decimal,
    /// Dollars already committed to open positions
    pub currently_deployed: Decimal,
    /// Realized drawdown from peak as a fraction (0.10 = 10%)
    pub realized_drawdown_pct: Decimal,
}

impl BankrollState {
    pub fn new(total_capital: Decimal) -> Self {
        Self {
            total_capital,
            currently_deployed: Decimal::ZERO,
            realized_drawdown_pct: Decimal::ZERO,
        }
    }

    pub fn with_deployed(mut self, deployed: Decimal) -> Self {
        self.currently_deployed = deployed;
        self
    }

    pub fn with_drawdown(mut self, drawdown_pct: Decimal) -> Self {
        self.realized_drawdown_pct = drawdown_pct;
        self
    }

    /// Capital not yet committed, floored at zero
    pub fn free_capital(&self) -> Decimal {
        (self.total_capital - self.currently_deployed).max(Decimal::ZERO)
    }

    pub fn validate(&self) -> std::result::Result<(), InputError> {
        if self.total_capital < Decimal::ZERO {
            return Err(InputError::Bankroll(format!(
                "total capital {} is negative",
                self.total_capital
            )));
        }
        if self.currently_deployed < Decimal::ZERO {
            return Err(InputError::Bankroll(format!(
                "deployed capital {} is negative",
                self.currently_deployed
            )));
        }
        if self.realized_drawdown_pct < Decimal::ZERO || self.realized_drawdown_pct > Decimal::ONE {
            return Err(InputError::Bankroll(format!(
                "drawdown {} is outside [0, 1]",
                self.realized_drawdown_pct
            )));
        }
        Ok(())
    }
}

/// Order the engine wants placed
///
/// Handed to the execution adapter and then discarded; the engine does not
/// follow the order after submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub game_id: String,
    pub ticker: String,
    pub team: TeamSide,
    pub side: ContractSide,
    pub limit_price_cents: u32,
    pub contract_count: u32,
    pub order_type: OrderType,
}

impl OrderIntent {
    /// Dollar cost of the contracts before fees
    pub fn notional(&self) -> Decimal {
        Decimal::from(self.contract_count) * Decimal::from(self.limit_price_cents)
            / Decimal::ONE_HUNDRED
    }
}

impl std::fmt::Display for OrderIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BUY {} {} x{} @ {}¢ ({:?}) ticker={}",
            self.side,
            self.team,
            self.contract_count,
            self.limit_price_cents,
            self.order_type,
            self.ticker
        )
    }
}

/// Exchange-side order state after submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Filled,
    PartiallyFilled,
    Resting,
    Canceled,
    /// Logged only, never sent (dry run)
    Simulated,
}

impl OrderStatus {
    /// Part of the order may still fill
    pub fn is_open(&self) -> bool {
        matches!(self, OrderStatus::Resting | OrderStatus::PartiallyFilled)
    }
}

/// Adapter acknowledgement of a submitted order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAck {
    pub order_id: Option<String>,
    pub status: OrderStatus,
    /// Contracts the exchange confirmed as filled
    pub filled_contracts: u32,
    /// Average fill price in cents, when anything filled
    pub avg_fill_price_cents: Option<u32>,
    pub submitted_at: DateTime<Utc>,
}

impl OrderAck {
    pub fn simulated() -> Self {
        Self {
            order_id: None,
            status: OrderStatus::Simulated,
            filled_contracts: 0,
            avg_fill_price_cents: None,
            submitted_at: Utc::now(),
        }
    }

    pub fn has_fill(&self) -> bool {
        self.filled_contracts > 0
    }
}

/// Resolution of everything held in one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub game_id: String,
    /// Dollars paid for the settled contracts, fees excluded
    pub cost: Decimal,
    /// Dollars received at resolution, zero on a loss
    pub payout: Decimal,
}

impl Settlement {
    pub fn pnl(&self) -> Decimal {
        self.payout - self.cost
    }
}
