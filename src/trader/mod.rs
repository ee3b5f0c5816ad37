//! Trading loop and bankroll bookkeeping

pub mod ledger;
pub mod runner;

pub use ledger::BankrollLedger;
pub use runner::{TickSummary, TradingLoop};
