use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::ledger::BankrollLedger;
use crate::common::errors::{EngineError, Result};
use crate::common::traits::{ExecutionAdapter, OpportunityFeed};
use crate::common::types::ContractSide;
use crate::strategy::{BrownianSurvival, CycleOutcome, DecisionEngine, DecisionStage, SurvivalModel};

/// Counters for one polling tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub opportunities: usize,
    /// Open games whose settlement was booked at the top of the tick
    pub settled: usize,
    /// Market and side already entered earlier in the session
    pub already_entered: usize,
    pub position_ceiling: usize,
    pub rejected: usize,
    pub sizing_infeasible: usize,
    pub submitted: usize,
    pub filled_contracts: u32,
    pub input_errors: usize,
    pub adapter_errors: usize,
}

impl TickSummary {
    fn record_skip(&mut self, stage: DecisionStage) {
        match stage {
            DecisionStage::Received => self.position_ceiling += 1,
            DecisionStage::Gated => self.rejected += 1,
            DecisionStage::Sized | DecisionStage::IntentEmitted => self.sizing_infeasible += 1,
        }
    }
}

/// Polling loop: feed → engine → adapter → ledger
///
/// Opportunities are handled one at a time, each to completion, so there is
/// never more than one order in flight. Each tick first books settlements
/// for games the ledger holds, then takes the bankroll snapshot once; orders
/// placed during the tick are booked but only seen by the sizer on the next
/// tick. A market and side is entered at most once per session.
pub struct TradingLoop<F, A, S: SurvivalModel = BrownianSurvival> {
    feed: F,
    adapter: A,
    engine: DecisionEngine<S>,
    ledger: BankrollLedger,
    entered: HashSet<(String, ContractSide)>,
    poll_interval: Duration,
}

impl<F, A, S> TradingLoop<F, A, S>
where
    F: OpportunityFeed,
    A: ExecutionAdapter,
    S: SurvivalModel,
{
    pub fn new(
        feed: F,
        adapter: A,
        engine: DecisionEngine<S>,
        ledger: BankrollLedger,
        poll_interval: Duration,
    ) -> Self {
        Self {
            feed,
            adapter,
            engine,
            ledger,
            entered: HashSet::new(),
            poll_interval,
        }
    }

    pub fn ledger(&self) -> &BankrollLedger {
        &self.ledger
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Evaluate every opportunity in the current feed batch
    ///
    /// Input and adapter errors on a single opportunity are logged and
    /// counted; only a feed failure aborts the tick.
    pub async fn run_tick(&mut self) -> Result<TickSummary> {
        let mut summary = TickSummary::default();
        self.reconcile_settlements(&mut summary).await;

        let batch = self.feed.next_batch().await?;
        let bankroll = self.ledger.snapshot();
        summary.opportunities = batch.len();

        debug!(
            opportunities = batch.len(),
            total = %bankroll.total_capital,
            deployed = %bankroll.currently_deployed,
            drawdown = %bankroll.realized_drawdown_pct,
            "tick started"
        );

        for opp in &batch {
            let key = (opp.ticker.clone(), opp.contract);
            if self.entered.contains(&key) {
                summary.already_entered += 1;
                debug!(ticker = %opp.ticker, side = %opp.contract, "already entered this session");
                continue;
            }

            match self.engine.run_cycle(&self.adapter, opp, &bankroll).await {
                Ok(CycleOutcome::Skipped(reason)) => summary.record_skip(reason.stage()),
                Ok(CycleOutcome::Submitted { intent, ack, .. }) => {
                    summary.submitted += 1;
                    summary.filled_contracts += ack.filled_contracts;
                    self.entered.insert(key);
                    if let Err(e) = self.ledger.record_order(&intent, &ack) {
                        warn!(error = %e, game_id = %intent.game_id, "could not book order");
                    }
                }
                Err(EngineError::Input(e)) => {
                    summary.input_errors += 1;
                    warn!(error = %e, game_id = %opp.game_id, "skipping malformed opportunity");
                }
                Err(e) => {
                    summary.adapter_errors += 1;
                    error!(error = %e, game_id = %opp.game_id, adapter = self.adapter.name(), "adapter call failed");
                }
            }
        }

        info!(
            opportunities = summary.opportunities,
            settled = summary.settled,
            submitted = summary.submitted,
            filled = summary.filled_contracts,
            rejected = summary.rejected,
            errors = summary.input_errors + summary.adapter_errors,
            "tick complete"
        );
        Ok(summary)
    }

    /// Book settlements for every game holding committed capital
    ///
    /// A failed lookup leaves the game open for the next tick.
    async fn reconcile_settlements(&mut self, summary: &mut TickSummary) {
        for game_id in self.ledger.open_games() {
            match self.adapter.settlement(&game_id).await {
                Ok(Some(settlement)) => {
                    self.ledger.record_settlement(&settlement);
                    summary.settled += 1;
                }
                Ok(None) => {}
                Err(e) => {
                    summary.adapter_errors += 1;
                    warn!(error = %e, %game_id, "settlement lookup failed");
                }
            }
        }
    }

    /// Tick every `poll_interval` until `shutdown` turns true
    ///
    /// The signal is checked between ticks; a tick in progress always
    /// finishes.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!(
            adapter = self.adapter.name(),
            interval_seconds = self.poll_interval.as_secs(),
            "trading loop started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            if let Err(e) = self.run_tick().await {
                error!(error = %e, "tick failed");
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!(
            total = %self.ledger.total_capital(),
            deployed = %self.ledger.deployed(),
            pnl = %self.ledger.realized_pnl(),
            "trading loop stopped"
        );
        Ok(())
    }
}
