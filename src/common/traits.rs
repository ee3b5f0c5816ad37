//! Trait definitions for the engine's external collaborators

use async_trait::async_trait;

use super::errors::AdapterError;
use super::types::{Opportunity, OrderAck, OrderIntent, Settlement};

/// Result type for collaborator calls
pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

/// Capability to trade against the exchange
///
/// The decision engine only calls `get_position` and `place_order`. The
/// trading loop polls `settlement` for games it holds; `cancel_open_orders`
/// is reserved for the surrounding orchestration.
/// Each method is a single atomic call; retries, if any, live in the
/// implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExecutionAdapter: Send + Sync {
    /// Submit a limit buy described by `intent`
    async fn place_order(&self, intent: &OrderIntent) -> AdapterResult<OrderAck>;

    /// Contracts held or resting on the book across all markets of a game
    async fn get_position(&self, game_id: &str) -> AdapterResult<u32>;

    /// Cost and payout of the game's positions once its markets settled,
    /// `None` while they are still open
    async fn settlement(&self, game_id: &str) -> AdapterResult<Option<Settlement>>;

    /// Cancel every resting order for a game, returning how many were cancelled
    async fn cancel_open_orders(&self, game_id: &str) -> AdapterResult<usize>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Source of merged (ESPN, Kalshi) opportunities
///
/// Unmatched games are dropped by the feed and never reach the engine.
#[async_trait]
pub trait OpportunityFeed: Send {
    /// Opportunities for every live game at this tick
    async fn next_batch(&mut self) -> AdapterResult<Vec<Opportunity>>;
}

#[async_trait]
impl<T: ExecutionAdapter + ?Sized> ExecutionAdapter for Box<T> {
    async fn place_order(&self, intent: &OrderIntent) -> AdapterResult<OrderAck> {
        (**self).place_order(intent).await
    }

    async fn get_position(&self, game_id: &str) -> AdapterResult<u32> {
        (**self).get_position(game_id).await
    }

    async fn settlement(&self, game_id: &str) -> AdapterResult<Option<Settlement>> {
        (**self).settlement(game_id).await
    }

    async fn cancel_open_orders(&self, game_id: &str) -> AdapterResult<usize> {
        (**self).cancel_open_orders(game_id).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Boxed adapter for dynamic dispatch
pub type BoxedExecutionAdapter = Box<dyn ExecutionAdapter>;
