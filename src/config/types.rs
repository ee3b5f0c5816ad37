//! Configuration types

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::common::errors::{EngineError, Result};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Risk and sizing parameters consumed by the decision engine
    #[serde(default)]
    pub trading: TradingConfig,
    /// Kalshi-specific configuration
    #[serde(default)]
    pub kalshi: KalshiConfig,
    /// Opportunity feed configuration
    #[serde(default)]
    pub feed: FeedConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        self.trading.validate()?;
        self.kalshi.validate()?;
        if self.settings.poll_interval_seconds == 0 {
            return Err(EngineError::Configuration(
                "settings.poll_interval_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parameters of the gate, the sizer and the engine
///
/// Passed by reference into every call; nothing reads process globals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingConfig {
    /// Starting bankroll in dollars
    #[serde(default = "default_bankroll")]
    pub bankroll: Decimal,
    /// Hard cap per trade in dollars, fees included
    #[serde(default = "default_max_trade")]
    pub max_trade: Decimal,
    /// Minimum ask as a fraction of $1 (0.75 = 75¢)
    #[serde(default = "default_min_price")]
    pub min_price: Decimal,
    /// Minimum edge as a fraction (0.06 = 6 points)
    #[serde(default = "default_min_edge")]
    pub min_edge: Decimal,
    /// Minimum survival probability to enter
    #[serde(default = "default_min_survival")]
    pub min_survival: Decimal,
    /// Post-only orders at the maker fee rate
    #[serde(default = "default_true")]
    pub use_maker: bool,
    /// Log intents instead of sending them
    #[serde(default = "default_true")]
    pub dry_run: bool,
    /// Per-game exposure ceiling in contracts; at or above it the game is skipped
    #[serde(default = "default_max_contracts_per_game")]
    pub max_contracts_per_game: u32,
    /// Cushion above the ask the win probability must stay over
    #[serde(default = "default_survival_margin")]
    pub survival_margin: Decimal,
    /// Composite entry score (0-100) an entry must reach
    #[serde(default = "default_min_entry_score")]
    pub min_entry_score: f64,
    #[serde(default)]
    pub throttle: DrawdownThrottleConfig,
    #[serde(default)]
    pub ruin: RuinConstraintConfig,
    #[serde(default)]
    pub period_gate: PeriodGateConfig,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            bankroll: default_bankroll(),
            max_trade: default_max_trade(),
            min_price: default_min_price(),
            min_edge: default_min_edge(),
            min_survival: default_min_survival(),
            use_maker: true,
            dry_run: true,
            max_contracts_per_game: default_max_contracts_per_game(),
            survival_margin: default_survival_margin(),
            min_entry_score: default_min_entry_score(),
            throttle: DrawdownThrottleConfig::default(),
            ruin: RuinConstraintConfig::default(),
            period_gate: PeriodGateConfig::default(),
        }
    }
}

impl TradingConfig {
    /// Price floor in whole cents (`MIN_PRICE * 100`, rounded up)
    pub fn min_price_cents(&self) -> u32 {
        use rust_decimal::prelude::ToPrimitive;
        (self.min_price * Decimal::ONE_HUNDRED)
            .ceil()
            .to_u32()
            .unwrap_or(100)
    }

    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, value: Decimal| -> Result<()> {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(EngineError::Configuration(format!(
                    "trading.{} must be within [0, 1], got {}",
                    name, value
                )));
            }
            Ok(())
        };

        if self.bankroll <= Decimal::ZERO {
            return Err(EngineError::Configuration(format!(
                "trading.bankroll must be positive, got {}",
                self.bankroll
            )));
        }
        if self.max_trade <= Decimal::ZERO {
            return Err(EngineError::Configuration(format!(
                "trading.max_trade must be positive, got {}",
                self.max_trade
            )));
        }
        unit("min_price", self.min_price)?;
        unit("min_edge", self.min_edge)?;
        unit("min_survival", self.min_survival)?;
        unit("survival_margin", self.survival_margin)?;
        if !(0.0..=100.0).contains(&self.min_entry_score) {
            return Err(EngineError::Configuration(format!(
                "trading.min_entry_score must be within [0, 100], got {}",
                self.min_entry_score
            )));
        }
        if self.max_contracts_per_game == 0 {
            return Err(EngineError::Configuration(
                "trading.max_contracts_per_game must be at least 1".to_string(),
            ));
        }
        self.throttle.validate()?;
        self.ruin.validate()?;
        Ok(())
    }
}

fn default_bankroll() -> Decimal {
    dec!(288.0)
}

fn default_max_trade() -> Decimal {
    dec!(20.0)
}

fn default_min_price() -> Decimal {
    dec!(0.75)
}

fn default_min_edge() -> Decimal {
    dec!(0.06)
}

fn default_min_survival() -> Decimal {
    dec!(0.70)
}

fn default_true() -> bool {
    true
}

fn default_max_contracts_per_game() -> u32 {
    1
}

fn default_survival_margin() -> Decimal {
    dec!(0.02)
}

fn default_min_entry_score() -> f64 {
    50.0
}

/// Sizing reduction as realized drawdown grows
///
/// Scale is 1 at zero drawdown and falls linearly to `floor_scale` once
/// drawdown reaches `max_drawdown_pct`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownThrottleConfig {
    #[serde(default = "default_max_drawdown_pct")]
    pub max_drawdown_pct: Decimal,
    /// Never zero: a losing streak shrinks stakes without halting them
    #[serde(default = "default_floor_scale")]
    pub floor_scale: Decimal,
}

impl Default for DrawdownThrottleConfig {
    fn default() -> Self {
        Self {
            max_drawdown_pct: default_max_drawdown_pct(),
            floor_scale: default_floor_scale(),
        }
    }
}

impl DrawdownThrottleConfig {
    fn validate(&self) -> Result<()> {
        if self.max_drawdown_pct <= Decimal::ZERO || self.max_drawdown_pct > Decimal::ONE {
            return Err(EngineError::Configuration(format!(
                "trading.throttle.max_drawdown_pct must be within (0, 1], got {}",
                self.max_drawdown_pct
            )));
        }
        if self.floor_scale <= Decimal::ZERO || self.floor_scale > Decimal::ONE {
            return Err(EngineError::Configuration(format!(
                "trading.throttle.floor_scale must be within (0, 1], got {}",
                self.floor_scale
            )));
        }
        Ok(())
    }
}

fn default_max_drawdown_pct() -> Decimal {
    dec!(0.25)
}

fn default_floor_scale() -> Decimal {
    dec!(0.25)
}

/// Cap on the Kelly fraction from a drawdown-probability constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuinConstraintConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Drawdown level that counts as ruin (0.25 = 25%)
    #[serde(default = "default_ruin_drawdown")]
    pub drawdown: f64,
    /// Required probability of never reaching `drawdown`
    #[serde(default = "default_ruin_confidence")]
    pub confidence: f64,
    /// Number of bets the constraint looks ahead
    #[serde(default = "default_horizon_bets")]
    pub horizon_bets: u32,
}

impl Default for RuinConstraintConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            drawdown: default_ruin_drawdown(),
            confidence: default_ruin_confidence(),
            horizon_bets: default_horizon_bets(),
        }
    }
}

impl RuinConstraintConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        if !(self.drawdown > 0.0 && self.drawdown < 1.0) {
            return Err(EngineError::Configuration(format!(
                "trading.ruin.drawdown must be within (0, 1), got {}",
                self.drawdown
            )));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(EngineError::Configuration(format!(
                "trading.ruin.confidence must be within (0, 1), got {}",
                self.confidence
            )));
        }
        if self.horizon_bets == 0 {
            return Err(EngineError::Configuration(
                "trading.ruin.horizon_bets must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_ruin_drawdown() -> f64 {
    0.25
}

fn default_ruin_confidence() -> f64 {
    0.95
}

fn default_horizon_bets() -> u32 {
    250
}

/// Game-clock windows in which entries are refused
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodGateConfig {
    /// Periods never traded (e.g. `[1]` for the first quarter)
    #[serde(default)]
    pub excluded_periods: Vec<u8>,
    /// Refuse entries with this many seconds or fewer left (0 disables)
    #[serde(default)]
    pub final_seconds_cutoff: u32,
    /// Periods before this one require an effectively locked lead
    #[serde(default = "default_lock_before_period")]
    pub lock_before_period: u8,
    /// Required lead in points per minute of game time remaining
    #[serde(default = "default_lock_lead_per_minute")]
    pub lock_lead_per_minute: Decimal,
}

impl Default for PeriodGateConfig {
    fn default() -> Self {
        Self {
            excluded_periods: Vec::new(),
            final_seconds_cutoff: 0,
            lock_before_period: default_lock_before_period(),
            lock_lead_per_minute: default_lock_lead_per_minute(),
        }
    }
}

impl PeriodGateConfig {
    /// Gate that only applies the explicit exclusions, no lock requirement
    pub fn exclusions_only(excluded_periods: Vec<u8>, final_seconds_cutoff: u32) -> Self {
        Self {
            excluded_periods,
            final_seconds_cutoff,
            lock_before_period: 0,
            lock_lead_per_minute: Decimal::ZERO,
        }
    }
}

fn default_lock_before_period() -> u8 {
    4
}

fn default_lock_lead_per_minute() -> Decimal {
    dec!(0.3)
}

/// Kalshi platform configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KalshiConfig {
    /// API key ID for authenticated requests
    #[serde(default)]
    pub api_key_id: Option<String>,
    /// Path to the RSA private key (PEM)
    #[serde(default)]
    pub private_key_path: Option<String>,
    /// Base URL for the REST API
    #[serde(default = "default_kalshi_rest_url")]
    pub rest_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for KalshiConfig {
    fn default() -> Self {
        Self {
            api_key_id: None,
            private_key_path: None,
            rest_url: default_kalshi_rest_url(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl KalshiConfig {
    /// Both credentials are present
    pub fn has_credentials(&self) -> bool {
        self.api_key_id.is_some() && self.private_key_path.is_some()
    }

    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.rest_url).map_err(|e| {
            EngineError::Configuration(format!("kalshi.rest_url {:?}: {}", self.rest_url, e))
        })?;
        Ok(())
    }
}

fn default_kalshi_rest_url() -> String {
    "https://api.elections.kalshi.com/trade-api/v2".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

/// Opportunity feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// JSON file of merged game snapshots, rewritten by the collectors
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

fn default_snapshot_path() -> String {
    "snapshots/merged_games.json".to_string()
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Delay between polling ticks in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            poll_interval_seconds: default_poll_interval(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_poll_interval() -> u64 {
    30
}
