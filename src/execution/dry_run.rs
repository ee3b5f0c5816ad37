//! Dry-run wrapper: logs intents instead of sending them

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::info;

use crate::common::traits::{AdapterResult, ExecutionAdapter};
use crate::common::types::{OrderAck, OrderIntent, Settlement};

/// Wraps a real adapter so that writes are logged and reads pass through
///
/// Simulated contracts are added to the inner adapter's position so a game
/// already "entered" during this session hits the per-game ceiling and is
/// not entered again.
#[derive(Debug)]
pub struct DryRunExecutor<A> {
    inner: A,
    simulated: Mutex<HashMap<String, u32>>,
    intents: Mutex<Vec<OrderIntent>>,
}

impl<A: ExecutionAdapter> DryRunExecutor<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            simulated: Mutex::new(HashMap::new()),
            intents: Mutex::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Intents logged so far
    pub async fn intents(&self) -> Vec<OrderIntent> {
        self.intents.lock().await.clone()
    }
}

#[async_trait]
impl<A: ExecutionAdapter> ExecutionAdapter for DryRunExecutor<A> {
    async fn place_order(&self, intent: &OrderIntent) -> AdapterResult<OrderAck> {
        info!(adapter = self.inner.name(), intent = %intent, "[DRY RUN] would place order");
        *self
            .simulated
            .lock()
            .await
            .entry(intent.game_id.clone())
            .or_insert(0) += intent.contract_count;
        self.intents.lock().await.push(intent.clone());
        Ok(OrderAck::simulated())
    }

    async fn get_position(&self, game_id: &str) -> AdapterResult<u32> {
        let held = self.inner.get_position(game_id).await?;
        let simulated = self.simulated.lock().await.get(game_id).copied().unwrap_or(0);
        Ok(held.saturating_add(simulated))
    }

    async fn settlement(&self, game_id: &str) -> AdapterResult<Option<Settlement>> {
        self.inner.settlement(game_id).await
    }

    async fn cancel_open_orders(&self, game_id: &str) -> AdapterResult<usize> {
        info!(%game_id, "[DRY RUN] would cancel resting orders");
        Ok(0)
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}
