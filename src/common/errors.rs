//! Error types for the application

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type alias using our EngineError
pub type Result<T> = std::result::Result<T, EngineError>;

/// Malformed or out-of-range input to the decision engine
///
/// The offending opportunity is skipped for the current tick.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    /// Price outside the 0-100 cent range, or at an extreme where sizing is undefined
    #[error("{field} price {cents}¢ is out of range")]
    PriceOutOfRange { field: &'static str, cents: u32 },

    /// Probability outside [0, 1]
    #[error("{field} probability {value} is outside [0, 1]")]
    ProbabilityOutOfRange { field: &'static str, value: Decimal },

    /// Bid above ask
    #[error("crossed quote: bid {bid}¢ above ask {ask}¢")]
    CrossedQuote { bid: u32, ask: u32 },

    /// Negative or inconsistent bankroll figures
    #[error("invalid bankroll: {0}")]
    Bankroll(String),

    /// Required identifier missing
    #[error("missing field: {0}")]
    MissingField(&'static str),
}

/// Failure of an external collaborator (exchange or opportunity feed)
///
/// The engine never inspects these; they are passed upward unchanged.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Snapshot file errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication / request signing errors
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limit exceeded, retry after {retry_after_seconds:?} seconds")]
    RateLimit { retry_after_seconds: Option<u64> },

    /// Exchange answered with a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Invalid API response
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Order refused by the exchange
    #[error("Order rejected: {0}")]
    OrderRejected(String),
}

/// Main error type for engine and trading-loop operations
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl EngineError {
    /// True when only the current opportunity should be skipped
    pub fn is_input(&self) -> bool {
        matches!(self, EngineError::Input(_))
    }
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::Configuration(err.to_string())
    }
}
