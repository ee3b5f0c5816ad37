//! Probability that a favourite's win probability stays above the entry floor
//!
//! The default model treats the win probability as a Brownian path whose
//! volatility shrinks with the time left and with how decided the game
//! already is. Survival is the chance the path never touches the floor
//! (`ask + margin`) before the final buzzer: `Φ(z) − exp(−2z²)·Φ(−z)` with
//! `z` the cushion over the floor in units of remaining volatility. A path
//! already at or below the floor scores zero so the curve stays monotonic.

use crate::common::types::League;

/// Per-game volatility of the win-probability path for a full regulation game
pub const DEFAULT_GAME_VOLATILITY: f64 = 0.28;

/// Below this the path is treated as frozen
const MIN_VOLATILITY: f64 = 1e-6;

/// Survival curve consulted by the entry gate
///
/// Implementations must be pure and return a value in `[0, 1]`.
#[cfg_attr(test, mockall::automock)]
pub trait SurvivalModel: Send + Sync {
    /// Probability that `win_probability` stays above `floor` for the
    /// remaining `seconds_remaining` of a `league` game
    fn survival(
        &self,
        win_probability: f64,
        floor: f64,
        seconds_remaining: u32,
        league: League,
    ) -> f64;
}

impl<T: SurvivalModel + ?Sized> SurvivalModel for Box<T> {
    fn survival(&self, win_probability: f64, floor: f64, seconds_remaining: u32, league: League) -> f64 {
        (**self).survival(win_probability, floor, seconds_remaining, league)
    }
}

/// Reflected Brownian motion survival
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrownianSurvival {
    /// Volatility over one full regulation game
    pub game_volatility: f64,
}

impl BrownianSurvival {
    pub fn new(game_volatility: f64) -> Self {
        Self { game_volatility }
    }

    /// Remaining volatility of the probability path
    ///
    /// Scales with `sqrt(τ)` (fraction of regulation left) and with
    /// `sqrt(4p(1−p))`, which is 1 at a coin flip and 0 for a decided game.
    pub fn remaining_volatility(&self, win_probability: f64, seconds_remaining: u32, league: League) -> f64 {
        let tau = (f64::from(seconds_remaining) / f64::from(league.regulation_seconds())).max(0.0);
        let p = win_probability.clamp(0.0, 1.0);
        self.game_volatility * tau.sqrt() * (4.0 * p * (1.0 - p)).sqrt()
    }
}

impl Default for BrownianSurvival {
    fn default() -> Self {
        Self::new(DEFAULT_GAME_VOLATILITY)
    }
}

impl SurvivalModel for BrownianSurvival {
    fn survival(&self, win_probability: f64, floor: f64, seconds_remaining: u32, league: League) -> f64 {
        let cushion = win_probability - floor;
        let vol = self.remaining_volatility(win_probability, seconds_remaining, league);

        if seconds_remaining == 0 || vol < MIN_VOLATILITY {
            return if cushion >= 0.0 { 1.0 } else { 0.0 };
        }

        let z = cushion / vol;
        if z <= 0.0 {
            return 0.0;
        }
        (normal_cdf(z) - (-2.0 * z * z).exp() * normal_cdf(-z)).clamp(0.0, 1.0)
    }
}

/// Standard normal CDF
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Abramowitz and Stegun 7.1.26, max error 1.5e-7
fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_cdf_reference_points() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((normal_cdf(1.96) - 0.975).abs() < 1e-3);
        assert!((normal_cdf(-1.96) - 0.025).abs() < 1e-3);
        assert!((normal_cdf(1.0) + normal_cdf(-1.0) - 1.0).abs() < 1e-7);
        assert!(normal_cdf(8.0) > 0.999_999);
    }

    #[test]
    fn test_step_function_at_final_buzzer() {
        let model = BrownianSurvival::default();
        assert_eq!(model.survival(0.95, 0.82, 0, League::Nba), 1.0);
        assert_eq!(model.survival(0.80, 0.82, 0, League::Nba), 0.0);
        // Finishing exactly on the floor still counts as holding it
        assert_eq!(model.survival(0.82, 0.82, 0, League::Nba), 1.0);
    }

    #[test]
    fn test_late_fourth_quarter_reference_value() {
        // 11 minutes left, 8 points of cushion over the floor
        let model = BrownianSurvival::default();
        let s = model.survival(0.90, 0.82, 660, League::Nba);
        assert!((s - 0.818).abs() < 1e-3, "survival was {s}");
    }

    #[test]
    fn test_reflection_term_lowers_plain_tail() {
        let model = BrownianSurvival::default();
        let vol = model.remaining_volatility(0.90, 660, League::Nba);
        let z = (0.90 - 0.82) / vol;
        let s = model.survival(0.90, 0.82, 660, League::Nba);
        assert!(s < normal_cdf(z));
        assert!(s > 2.0 * normal_cdf(z) - 1.0);
    }

    #[test]
    fn test_zero_when_already_below_floor() {
        let model = BrownianSurvival::default();
        assert_eq!(model.survival(0.80, 0.82, 600, League::Nba), 0.0);
        assert_eq!(model.survival(0.82, 0.82, 600, League::Nba), 0.0);
    }

    #[test]
    fn test_survival_decreases_with_time_remaining() {
        let model = BrownianSurvival::default();
        let late = model.survival(0.92, 0.82, 120, League::Nba);
        let mid = model.survival(0.92, 0.82, 720, League::Nba);
        let early = model.survival(0.92, 0.82, 2400, League::Nba);
        assert!(late > mid, "{late} <= {mid}");
        assert!(mid > early, "{mid} <= {early}");
    }

    #[test]
    fn test_survival_increases_with_probability() {
        let model = BrownianSurvival::default();
        let mut previous = 0.0;
        for p in [0.84, 0.86, 0.88, 0.90, 0.93, 0.96, 0.99] {
            let s = model.survival(p, 0.82, 900, League::Nba);
            assert!((0.0..=1.0).contains(&s));
            assert!(s >= previous, "survival fell at p={p}");
            previous = s;
        }
    }

    #[test]
    fn test_college_games_are_shorter() {
        // Same clock reading is a larger share of a 40-minute game
        let model = BrownianSurvival::default();
        let nba = model.survival(0.90, 0.80, 1200, League::Nba);
        let ncaa = model.survival(0.90, 0.80, 1200, League::Ncaabbm);
        assert!(nba > ncaa);
    }

    #[test]
    fn test_decided_game_is_step() {
        let model = BrownianSurvival::default();
        assert_eq!(model.survival(1.0, 0.99, 1800, League::Nba), 1.0);
    }
}
