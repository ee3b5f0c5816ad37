//! Execution adapters that do not talk to the exchange

pub mod dry_run;
pub mod paper;

pub use dry_run::DryRunExecutor;
pub use paper::PaperExecutor;
