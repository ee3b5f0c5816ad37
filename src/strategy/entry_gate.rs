//! Entry gate: price floor, edge floor, survival, period window, entry score
//!
//! The gate is pure. It sees one opportunity and the configuration and
//! returns an [`EntryVerdict`]; the first failing check decides the reason.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::trace;

use crate::common::types::Opportunity;
use crate::config::{PeriodGateConfig, TradingConfig};
use crate::strategy::fees::FeeSchedule;
use crate::strategy::kelly::admissible_fraction;
use crate::strategy::score::entry_score;
use crate::strategy::survival::SurvivalModel;
use crate::strategy::types::{EntryVerdict, RejectionReason};

const SECONDS_PER_MINUTE: u32 = 60;

/// Run every entry check against `opp`
pub fn evaluate(opp: &Opportunity, config: &TradingConfig, model: &dyn SurvivalModel) -> EntryVerdict {
    let implied = opp.implied_probability();
    let side_probability = opp.side_probability();
    let edge = side_probability - implied;

    if opp.kalshi_ask_cents < config.min_price_cents() {
        return EntryVerdict::reject(RejectionReason::PriceBelowFloor, edge, None);
    }

    if edge < config.min_edge {
        return EntryVerdict::reject(RejectionReason::InsufficientEdge, edge, None);
    }

    let floor = implied + config.survival_margin;
    let survival = model.survival(
        side_probability.to_f64().unwrap_or(0.0),
        floor.to_f64().unwrap_or(1.0),
        opp.seconds_remaining,
        opp.league,
    );
    trace!(
        game_id = %opp.game_id,
        team = %opp.side_team(),
        survival,
        floor = %floor,
        "survival computed"
    );
    let min_survival = config.min_survival.to_f64().unwrap_or(1.0);
    if survival < min_survival {
        return EntryVerdict::reject(RejectionReason::BelowSurvivalThreshold, edge, Some(survival));
    }

    if !period_allows_entry(opp, &config.period_gate) {
        return EntryVerdict::reject(RejectionReason::PeriodExcluded, edge, Some(survival));
    }

    let score = entry_score(
        edge.to_f64().unwrap_or(0.0),
        survival,
        opp.seconds_remaining,
        stake_fraction(opp, config),
        min_survival,
    );
    trace!(game_id = %opp.game_id, score = score.score, grade = %score.grade, "entry scored");
    if score.score < config.min_entry_score || !score.grade.allows_entry() {
        return EntryVerdict::reject(RejectionReason::LowEntryScore, edge, Some(survival))
            .with_score(score);
    }

    EntryVerdict::accept(edge, survival, score)
}

/// Drawdown-capped Kelly fraction at the fee-inclusive ask
fn stake_fraction(opp: &Opportunity, config: &TradingConfig) -> f64 {
    let price = Decimal::from(opp.kalshi_ask_cents) / Decimal::ONE_HUNDRED;
    let fee = FeeSchedule::kalshi()
        .per_contract(opp.kalshi_ask_cents, config.use_maker)
        .unwrap_or(Decimal::ZERO);
    admissible_fraction(opp.side_probability(), price + fee, &config.ruin)
}

/// Whether the game clock permits an entry
///
/// Before `lock_before_period` the side must lead by at least
/// `lock_lead_per_minute` points for every minute left.
pub fn period_allows_entry(opp: &Opportunity, gate: &PeriodGateConfig) -> bool {
    if gate.excluded_periods.contains(&opp.period) {
        return false;
    }
    if gate.final_seconds_cutoff > 0 && opp.seconds_remaining <= gate.final_seconds_cutoff {
        return false;
    }
    if opp.period < gate.lock_before_period {
        let minutes = Decimal::from(opp.seconds_remaining) / Decimal::from(SECONDS_PER_MINUTE);
        let required = gate.lock_lead_per_minute * minutes;
        if Decimal::from(opp.side_lead()) < required {
            return false;
        }
    }
    true
}
