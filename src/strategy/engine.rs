use tracing::{debug, info, instrument};

use crate::common::errors::{InputError, Result};
use crate::common::traits::ExecutionAdapter;
use crate::common::types::{BankrollState, Opportunity, OrderAck, OrderIntent, OrderType};
use crate::config::TradingConfig;
use crate::strategy::entry_gate;
use crate::strategy::size_calculator::PositionSizer;
use crate::strategy::survival::{BrownianSurvival, SurvivalModel};
use crate::strategy::types::{Decision, DecisionStage, NoGoReason, SizingResult};

/// What one decision cycle did
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Nothing was sent
    Skipped(NoGoReason),
    /// The adapter accepted an order
    Submitted {
        intent: OrderIntent,
        sizing: SizingResult,
        ack: OrderAck,
    },
}

impl CycleOutcome {
    pub fn stage(&self) -> DecisionStage {
        match self {
            CycleOutcome::Skipped(reason) => reason.stage(),
            CycleOutcome::Submitted { .. } => DecisionStage::IntentEmitted,
        }
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self, CycleOutcome::Submitted { .. })
    }
}

/// Decision engine
///
/// Walks each opportunity through `Received → Gated → Sized →
/// IntentEmitted`. Nothing carries over between cycles: every call starts
/// from the opportunity, the bankroll snapshot and the current position.
///
/// [`decide`](Self::decide) is pure and needs no adapter.
/// [`run_cycle`](Self::run_cycle) adds the position lookup and submission.
pub struct DecisionEngine<S: SurvivalModel = BrownianSurvival> {
    config: TradingConfig,
    sizer: PositionSizer,
    survival: S,
}

impl DecisionEngine<BrownianSurvival> {
    pub fn new(config: TradingConfig) -> Self {
        Self::with_survival(config, BrownianSurvival::default())
    }
}

impl<S: SurvivalModel> DecisionEngine<S> {
    pub fn with_survival(config: TradingConfig, survival: S) -> Self {
        Self {
            config,
            sizer: PositionSizer::default(),
            survival,
        }
    }

    pub fn config(&self) -> &TradingConfig {
        &self.config
    }

    /// Decide on `opp` given the bankroll and contracts already held in the game
    pub fn decide(
        &self,
        opp: &Opportunity,
        bankroll: &BankrollState,
        held_contracts: u32,
    ) -> std::result::Result<Decision, InputError> {
        opp.validate()?;
        self.decide_validated(opp, bankroll, held_contracts)
    }

    fn decide_validated(
        &self,
        opp: &Opportunity,
        bankroll: &BankrollState,
        held_contracts: u32,
    ) -> std::result::Result<Decision, InputError> {
        let ceiling = self.config.max_contracts_per_game;
        if held_contracts >= ceiling {
            return Ok(Decision::NoGo(NoGoReason::PositionCeiling {
                held: held_contracts,
                ceiling,
            }));
        }

        let verdict = entry_gate::evaluate(opp, &self.config, &self.survival);
        if !verdict.accepted {
            return Ok(Decision::NoGo(NoGoReason::Rejected(verdict)));
        }

        let sizing = self.sizer.size(
            bankroll,
            opp.side_probability(),
            opp.kalshi_ask_cents,
            &self.config,
        )?;
        if !sizing.is_viable() {
            return Ok(Decision::NoGo(NoGoReason::SizingInfeasible(sizing)));
        }

        let intent = OrderIntent {
            game_id: opp.game_id.clone(),
            ticker: opp.ticker.clone(),
            team: opp.kalshi_side,
            side: opp.contract,
            limit_price_cents: opp.kalshi_ask_cents,
            contract_count: sizing.contracts,
            order_type: OrderType::from_use_maker(self.config.use_maker),
        };

        Ok(Decision::Go {
            intent,
            verdict,
            sizing,
        })
    }

    /// Full cycle: position lookup, decision, submission
    ///
    /// Adapter failures are returned unchanged and nothing is retried.
    #[instrument(
        skip(self, adapter, opp, bankroll),
        fields(game_id = %opp.game_id, team = %opp.side_team(), adapter = adapter.name())
    )]
    pub async fn run_cycle<A>(
        &self,
        adapter: &A,
        opp: &Opportunity,
        bankroll: &BankrollState,
    ) -> Result<CycleOutcome>
    where
        A: ExecutionAdapter + ?Sized,
    {
        opp.validate()?;

        let held = adapter.get_position(&opp.game_id).await?;

        match self.decide_validated(opp, bankroll, held)? {
            Decision::NoGo(reason) => {
                debug!(stage = ?reason.stage(), reason = %reason, "no-go");
                Ok(CycleOutcome::Skipped(reason))
            }
            Decision::Go {
                intent,
                verdict,
                sizing,
            } => {
                info!(
                    intent = %intent,
                    edge = %verdict.edge,
                    survival = verdict.survival.unwrap_or_default(),
                    score = verdict.score.map(|s| s.score).unwrap_or_default(),
                    kelly = %sizing.kelly_fraction,
                    applied = %sizing.applied_fraction,
                    cost = %sizing.total_cost(),
                    ev = %sizing.expected_value,
                    "order intent"
                );
                let ack = adapter.place_order(&intent).await?;
                debug!(status = ?ack.status, filled = ack.filled_contracts, "order acknowledged");
                Ok(CycleOutcome::Submitted { intent, sizing, ack })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::{AdapterError, EngineError};
    use crate::common::traits::MockExecutionAdapter;
    use crate::common::types::{ContractSide, League, OrderStatus, TeamSide};
    use crate::strategy::types::{RejectionReason, SizingRejection};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    struct FixedSurvival(f64);

    impl SurvivalModel for FixedSurvival {
        fn survival(&self, _: f64, _: f64, _: u32, _: League) -> f64 {
            self.0
        }
    }

    fn engine(survival: f64) -> DecisionEngine<FixedSurvival> {
        DecisionEngine::with_survival(TradingConfig::default(), FixedSurvival(survival))
    }

    fn opportunity(ask: u32, home_prob: rust_decimal::Decimal) -> Opportunity {
        Opportunity {
            game_id: "KXNBAGAME-26MAR03DENPHX".to_string(),
            ticker: "KXNBAGAME-26MAR03DENPHX-PHX".to_string(),
            league: League::Nba,
            team_home: "PHX".to_string(),
            team_away: "DEN".to_string(),
            period: 4,
            seconds_remaining: 300,
            home_score: 110,
            away_score: 101,
            espn_win_probability: home_prob,
            kalshi_bid_cents: ask - 1,
            kalshi_ask_cents: ask,
            kalshi_side: TeamSide::Home,
            contract: ContractSide::Yes,
        }
    }

    fn filled(count: u32, price: u32) -> OrderAck {
        OrderAck {
            order_id: Some("ord-1".to_string()),
            status: OrderStatus::Filled,
            filled_contracts: count,
            avg_fill_price_cents: Some(price),
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn test_decide_go_builds_intent_at_ask() {
        let decision = engine(0.9)
            .decide(&opportunity(80, dec!(0.90)), &BankrollState::new(dec!(288)), 0)
            .unwrap();

        assert_eq!(decision.stage(), DecisionStage::IntentEmitted);
        let intent = decision.intent().unwrap();
        assert_eq!(intent.game_id, "KXNBAGAME-26MAR03DENPHX");
        assert_eq!(intent.ticker, "KXNBAGAME-26MAR03DENPHX-PHX");
        assert_eq!(intent.limit_price_cents, 80);
        assert_eq!(intent.contract_count, 24);
        assert_eq!(intent.side, ContractSide::Yes);
        assert_eq!(intent.order_type, OrderType::Maker);
    }

    #[test]
    fn test_decide_rejects_at_gate() {
        let decision = engine(0.9)
            .decide(&opportunity(70, dec!(0.95)), &BankrollState::new(dec!(288)), 0)
            .unwrap();
        match decision {
            Decision::NoGo(NoGoReason::Rejected(verdict)) => {
                assert_eq!(verdict.reason, Some(RejectionReason::PriceBelowFloor));
            }
            other => panic!("expected gate rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_decide_sizing_infeasible() {
        let bankroll = BankrollState::new(dec!(288)).with_deployed(dec!(288));
        let decision = engine(0.9)
            .decide(&opportunity(80, dec!(0.90)), &bankroll, 0)
            .unwrap();
        match decision {
            Decision::NoGo(NoGoReason::SizingInfeasible(sizing)) => {
                assert_eq!(sizing.contracts, 0);
                assert_eq!(sizing.rejected_reason, Some(SizingRejection::InsufficientCapital));
            }
            other => panic!("expected sizing no-go, got {:?}", other),
        }
    }

    #[test]
    fn test_decide_respects_position_ceiling() {
        let decision = engine(0.9)
            .decide(&opportunity(80, dec!(0.90)), &BankrollState::new(dec!(288)), 1)
            .unwrap();
        assert_eq!(
            decision,
            Decision::NoGo(NoGoReason::PositionCeiling { held: 1, ceiling: 1 })
        );
    }

    #[test]
    fn test_decide_input_error() {
        let mut opp = opportunity(80, dec!(0.90));
        opp.kalshi_bid_cents = 90;
        let err = engine(0.9)
            .decide(&opp, &BankrollState::new(dec!(288)), 0)
            .unwrap_err();
        assert_eq!(err, InputError::CrossedQuote { bid: 90, ask: 80 });
    }

    #[tokio::test]
    async fn test_run_cycle_submits_once() {
        let mut adapter = MockExecutionAdapter::new();
        adapter
            .expect_get_position()
            .withf(|game_id| game_id == "KXNBAGAME-26MAR03DENPHX")
            .times(1)
            .returning(|_| Ok(0));
        adapter
            .expect_place_order()
            .withf(|intent| intent.contract_count == 24 && intent.limit_price_cents == 80)
            .times(1)
            .returning(|intent| Ok(filled(intent.contract_count, intent.limit_price_cents)));
        adapter.expect_name().return_const("mock");

        let outcome = engine(0.9)
            .run_cycle(&adapter, &opportunity(80, dec!(0.90)), &BankrollState::new(dec!(288)))
            .await
            .unwrap();

        match outcome {
            CycleOutcome::Submitted { intent, ack, .. } => {
                assert_eq!(intent.contract_count, 24);
                assert_eq!(ack.filled_contracts, 24);
            }
            other => panic!("expected submission, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_cycle_skips_when_ceiling_reached() {
        let mut adapter = MockExecutionAdapter::new();
        adapter.expect_get_position().times(1).returning(|_| Ok(24));
        adapter.expect_place_order().times(0);
        adapter.expect_name().return_const("mock");

        let outcome = engine(0.9)
            .run_cycle(&adapter, &opportunity(80, dec!(0.90)), &BankrollState::new(dec!(288)))
            .await
            .unwrap();
        assert_eq!(outcome.stage(), DecisionStage::Received);
        assert!(!outcome.is_submitted());
    }

    #[tokio::test]
    async fn test_run_cycle_survival_rejection_sends_nothing() {
        let mut config = TradingConfig::default();
        config.min_edge = dec!(0.05);
        let engine = DecisionEngine::with_survival(config, FixedSurvival(0.60));

        let mut adapter = MockExecutionAdapter::new();
        adapter.expect_get_position().returning(|_| Ok(0));
        adapter.expect_place_order().times(0);
        adapter.expect_name().return_const("mock");

        let outcome = engine
            .run_cycle(&adapter, &opportunity(85, dec!(0.90)), &BankrollState::new(dec!(288)))
            .await
            .unwrap();
        match outcome {
            CycleOutcome::Skipped(NoGoReason::Rejected(verdict)) => {
                assert_eq!(verdict.reason_str(), "below survival threshold");
            }
            other => panic!("expected survival rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_cycle_propagates_adapter_error() {
        let mut adapter = MockExecutionAdapter::new();
        adapter.expect_get_position().returning(|_| Ok(0));
        adapter
            .expect_place_order()
            .times(1)
            .returning(|_| Err(AdapterError::Api {
                status: 400,
                message: "post only cross".to_string(),
            }));
        adapter.expect_name().return_const("mock");

        let err = engine(0.9)
            .run_cycle(&adapter, &opportunity(80, dec!(0.90)), &BankrollState::new(dec!(288)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Adapter(AdapterError::Api { status: 400, .. })
        ));
    }

    #[tokio::test]
    async fn test_run_cycle_position_lookup_failure() {
        let mut adapter = MockExecutionAdapter::new();
        adapter
            .expect_get_position()
            .returning(|_| Err(AdapterError::RateLimit { retry_after_seconds: None }));
        adapter.expect_place_order().times(0);
        adapter.expect_name().return_const("mock");

        let err = engine(0.9)
            .run_cycle(&adapter, &opportunity(80, dec!(0.90)), &BankrollState::new(dec!(288)))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Adapter(AdapterError::RateLimit { .. })));
    }

    #[tokio::test]
    async fn test_run_cycle_invalid_opportunity_skips_adapter() {
        let mut adapter = MockExecutionAdapter::new();
        adapter.expect_get_position().times(0);
        adapter.expect_place_order().times(0);
        adapter.expect_name().return_const("mock");

        let mut opp = opportunity(80, dec!(0.90));
        opp.espn_win_probability = dec!(1.5);
        let err = engine(0.9)
            .run_cycle(&adapter, &opp, &BankrollState::new(dec!(288)))
            .await
            .unwrap_err();
        assert!(err.is_input());
    }
}
