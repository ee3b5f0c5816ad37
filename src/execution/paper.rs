//! In-memory executor that fills every order immediately at its limit price
//!
//! Games are resolved by hand with [`PaperExecutor::settle`].

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::info;

use crate::common::traits::{AdapterResult, ExecutionAdapter};
use crate::common::types::{OrderAck, OrderIntent, OrderStatus, Settlement};

#[derive(Debug, Default)]
struct PaperBook {
    positions: HashMap<String, u32>,
    /// Dollars paid for each game's filled contracts
    costs: HashMap<String, Decimal>,
    resting: HashMap<String, Vec<OrderIntent>>,
    settled: HashMap<String, Settlement>,
    orders: Vec<OrderIntent>,
    next_id: u64,
}

/// Paper trading executor
///
/// Useful for end-to-end runs without exchange credentials. With
/// [`resting`](Self::resting) orders stay on the simulated book unfilled
/// until cancelled.
#[derive(Debug)]
pub struct PaperExecutor {
    book: Mutex<PaperBook>,
    fill: bool,
}

impl PaperExecutor {
    /// Executor that fills everything
    pub fn new() -> Self {
        Self {
            book: Mutex::new(PaperBook::default()),
            fill: true,
        }
    }

    /// Executor that never fills; orders rest until cancelled
    pub fn resting() -> Self {
        Self {
            book: Mutex::new(PaperBook::default()),
            fill: false,
        }
    }

    /// Every order received, in submission order
    pub async fn orders(&self) -> Vec<OrderIntent> {
        self.book.lock().await.orders.clone()
    }

    /// Seed an existing position
    pub async fn set_position(&self, game_id: &str, contracts: u32) {
        self.book
            .lock()
            .await
            .positions
            .insert(game_id.to_string(), contracts);
    }

    /// Resolve a game: every filled contract pays $1 if `won`, nothing otherwise
    ///
    /// Resting orders for the game are dropped. Returns the settlement, or
    /// `None` when nothing was held.
    pub async fn settle(&self, game_id: &str, won: bool) -> Option<Settlement> {
        let mut book = self.book.lock().await;
        book.resting.remove(game_id);
        let contracts = book.positions.remove(game_id)?;
        let cost = book.costs.remove(game_id).unwrap_or(Decimal::ZERO);
        let payout = if won { Decimal::from(contracts) } else { Decimal::ZERO };
        let settlement = Settlement {
            game_id: game_id.to_string(),
            cost,
            payout,
        };
        info!(%game_id, contracts, won, pnl = %settlement.pnl(), "[PAPER] game settled");
        book.settled.insert(game_id.to_string(), settlement.clone());
        Some(settlement)
    }
}

impl Default for PaperExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutionAdapter for PaperExecutor {
    async fn place_order(&self, intent: &OrderIntent) -> AdapterResult<OrderAck> {
        let mut book = self.book.lock().await;
        book.next_id += 1;
        let order_id = format!("paper-{}", book.next_id);
        book.orders.push(intent.clone());

        if !self.fill {
            book.resting
                .entry(intent.game_id.clone())
                .or_default()
                .push(intent.clone());
            info!(%order_id, intent = %intent, "[PAPER] order resting");
            return Ok(OrderAck {
                order_id: Some(order_id),
                status: OrderStatus::Resting,
                filled_contracts: 0,
                avg_fill_price_cents: None,
                submitted_at: Utc::now(),
            });
        }

        *book.positions.entry(intent.game_id.clone()).or_insert(0) += intent.contract_count;
        *book.costs.entry(intent.game_id.clone()).or_default() += intent.notional();
        info!(%order_id, intent = %intent, "[PAPER] order filled");

        Ok(OrderAck {
            order_id: Some(order_id),
            status: OrderStatus::Filled,
            filled_contracts: intent.contract_count,
            avg_fill_price_cents: Some(intent.limit_price_cents),
            submitted_at: Utc::now(),
        })
    }

    async fn get_position(&self, game_id: &str) -> AdapterResult<u32> {
        let book = self.book.lock().await;
        let held = book.positions.get(game_id).copied().unwrap_or(0);
        let resting: u32 = book
            .resting
            .get(game_id)
            .map(|orders| orders.iter().map(|o| o.contract_count).sum())
            .unwrap_or(0);
        Ok(held.saturating_add(resting))
    }

    async fn settlement(&self, game_id: &str) -> AdapterResult<Option<Settlement>> {
        Ok(self.book.lock().await.settled.get(game_id).cloned())
    }

    async fn cancel_open_orders(&self, game_id: &str) -> AdapterResult<usize> {
        let cancelled = self
            .book
            .lock()
            .await
            .resting
            .remove(game_id)
            .map(|orders| orders.len())
            .unwrap_or(0);
        Ok(cancelled)
    }

    fn name(&self) -> &'static str {
        "paper"
    }
}
