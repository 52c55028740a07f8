//! Acceptance probability curve for ransom offers.

use serde::{Deserialize, Serialize};

use crate::config::RansomConfig;
use crate::constants::{
    ADJUSTMENT_EXP_WEIGHT, ADJUSTMENT_MAX_PCT, ADJUSTMENT_MIN_PCT, CHANCE_EXP_BASE, CHANCE_SCALE,
    GOODWILL_EXP_WEIGHT,
};
use crate::numbers::clamp01;

/// Probability that the faction accepts the current demand.
///
/// Goodwill weights how hard a greedy demand is punished: the adjustment
/// term scales with `0.3 + goodwill / 1000`, so hostile factions shrug at
/// discounts while warmer ones react sharply to gouging. Negotiator skill
/// and the configured base adjustment shift the whole curve up or down.
/// The result is clamped into [0, 1].
#[must_use]
pub fn ransom_chance(
    goodwill: i32,
    social_skill: u32,
    adjustment_pct: f64,
    cfg: &RansomConfig,
) -> f64 {
    let goodwill_term = GOODWILL_EXP_WEIGHT.mul_add(f64::from(goodwill), ADJUSTMENT_EXP_WEIGHT);
    let exponent = (-adjustment_pct).mul_add(
        goodwill_term,
        cfg.base_adjustment + f64::from(social_skill),
    );
    clamp01(CHANCE_SCALE * CHANCE_EXP_BASE.powf(exponent))
}

/// One sampled point on the acceptance curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub adjustment_pct: f64,
    pub chance: f64,
}

/// Sample the acceptance curve across the demand adjustment span.
///
/// Hosts drive preview sliders from this; each point carries exactly the
/// value `ransom_chance` returns for the same adjustment.
#[must_use]
pub fn chance_curve(
    goodwill: i32,
    social_skill: u32,
    steps: u32,
    cfg: &RansomConfig,
) -> Vec<CurvePoint> {
    if steps == 0 {
        return Vec::new();
    }
    let span = ADJUSTMENT_MAX_PCT - ADJUSTMENT_MIN_PCT;
    let divisions = f64::from(steps.saturating_sub(1).max(1));
    (0..steps)
        .map(|step| {
            let adjustment_pct = if steps == 1 {
                ADJUSTMENT_MIN_PCT
            } else {
                ADJUSTMENT_MIN_PCT + span * f64::from(step) / divisions
            };
            CurvePoint {
                adjustment_pct,
                chance: ransom_chance(goodwill, social_skill, adjustment_pct, cfg),
            }
        })
        .collect()
}
