//! Kelly criterion for binary contracts and the drawdown-probability cap
//!
//! A contract bought at all-in cost `c` (price plus fee) pays $1 on a win,
//! so the net odds are `b = (1 − c) / c` and the full-Kelly fraction is
//!
//! ```text
//! f* = (p·b − q) / b = (p − c) / (1 − c)
//! ```
//!
//! Full Kelly is aggressive for a small bankroll. [`ruin_constrained_fraction`]
//! finds the largest `f ≤ f*` for which the probability of ever drawing down
//! more than `D` stays under `1 − confidence`, using the continuous-time
//! approximation
//!
//! ```text
//! P(max drawdown > D) ≈ exp(−2μD / σ²) · (1 − exp(−n·μ))
//! ```
//!
//! where μ and σ² are the mean and variance of the per-bet log return.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::config::RuinConstraintConfig;

const BISECTION_TOLERANCE: f64 = 1e-6;
const BISECTION_MAX_ITERATIONS: usize = 200;

/// Net odds of a $1-payout contract bought at all-in cost `cost`
///
/// `None` when nothing is left to win.
pub fn binary_odds(cost: Decimal) -> Option<Decimal> {
    if cost <= Decimal::ZERO || cost >= Decimal::ONE {
        return None;
    }
    Some((Decimal::ONE - cost) / cost)
}

/// Full-Kelly fraction `(p·b − q) / b`; negative when there is no edge
pub fn full_kelly(win_probability: Decimal, odds: Decimal) -> Decimal {
    let q = Decimal::ONE - win_probability;
    (win_probability * odds - q) / odds
}

/// Mean and variance of the log return when staking `f` at odds `b`
fn log_return_moments(p: f64, b: f64, f: f64) -> (f64, f64) {
    let q = 1.0 - p;
    let drift = f * (b * p - q);
    let second = f * f * (b * b * p + q);
    (drift - second / 2.0, second - drift * drift)
}

/// Approximate probability of a drawdown deeper than `drawdown` over `horizon_bets`
pub fn drawdown_probability(p: f64, b: f64, f: f64, drawdown: f64, horizon_bets: u32) -> f64 {
    let (mu, var) = log_return_moments(p, b, f);
    if mu <= 0.0 || var <= 0.0 {
        return 1.0;
    }
    let p_ruin = (-2.0 * mu * drawdown / var).exp();
    let horizon = 1.0 - (-(horizon_bets as f64) * mu).exp();
    (p_ruin * horizon).clamp(0.0, 1.0)
}

/// Outcome of applying the drawdown constraint to a Kelly fraction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuinCap {
    /// Largest admissible fraction (`≤ f*`)
    pub fraction: f64,
    /// `fraction / f*`
    pub kelly_multiplier: f64,
    /// Drawdown probability at `fraction`
    pub drawdown_probability: f64,
    /// True when the constraint reduced the stake
    pub binding: bool,
}

/// Largest fraction `f ≤ f_star` satisfying the drawdown constraint
///
/// Returns `None` when `f_star` carries no edge or no admissible fraction
/// exists.
pub fn ruin_constrained_fraction(
    win_probability: Decimal,
    odds: Decimal,
    f_star: Decimal,
    config: &RuinConstraintConfig,
) -> Option<RuinCap> {
    let p = win_probability.to_f64()?;
    let b = odds.to_f64()?;
    let f_star = f_star.to_f64()?;
    if f_star <= 0.0 {
        return None;
    }

    let alpha = 1.0 - config.confidence;
    let ruin = |f: f64| drawdown_probability(p, b, f, config.drawdown, config.horizon_bets);

    let at_full = ruin(f_star);
    if at_full <= alpha {
        return Some(RuinCap {
            fraction: f_star,
            kelly_multiplier: 1.0,
            drawdown_probability: at_full,
            binding: false,
        });
    }

    let mut lo = BISECTION_TOLERANCE.min(f_star);
    let mut hi = f_star;
    if ruin(lo) > alpha {
        return None;
    }

    for _ in 0..BISECTION_MAX_ITERATIONS {
        if hi - lo <= BISECTION_TOLERANCE {
            break;
        }
        let mid = 0.5 * (lo + hi);
        if ruin(mid) <= alpha {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    Some(RuinCap {
        fraction: lo,
        kelly_multiplier: lo / f_star,
        drawdown_probability: ruin(lo),
        binding: true,
    })
}

/// Fraction the sizer would stake before the drawdown throttle
///
/// Full Kelly at all-in `cost`, capped by the drawdown constraint when it is
/// enabled. Zero when there is no edge or no admissible fraction.
pub fn admissible_fraction(
    win_probability: Decimal,
    cost: Decimal,
    config: &RuinConstraintConfig,
) -> f64 {
    let odds = match binary_odds(cost) {
        Some(odds) => odds,
        None => return 0.0,
    };
    let f_star = full_kelly(win_probability, odds);
    if f_star <= Decimal::ZERO {
        return 0.0;
    }
    if !config.enabled {
        return f_star.to_f64().unwrap_or(0.0);
    }
    ruin_constrained_fraction(win_probability, odds, f_star, config)
        .map(|cap| cap.fraction)
        .unwrap_or(0.0)
}
