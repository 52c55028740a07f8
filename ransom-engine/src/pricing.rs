//! Ransom price shaping.

use crate::config::RansomConfig;
use crate::constants::LEADER_PRICE_FACTOR;
use crate::numbers::round_f64_to_i64;
use crate::world::Captive;

/// Silver demanded for a captive worth `base_value` on the open market.
///
/// The demand scales linearly with market value and the configured factor;
/// the demand adjustment shifts it by whole percentage points and the
/// result rounds to the nearest whole unit of silver.
#[must_use]
pub fn ransom_price(base_value: f64, adjustment_pct: f64, cfg: &RansomConfig) -> i64 {
    price_with_factor(base_value, cfg.factor, adjustment_pct)
}

/// Price a specific captive, applying the leader premium when it applies.
#[must_use]
pub fn ransom_price_for(captive: &Captive, adjustment_pct: f64, cfg: &RansomConfig) -> i64 {
    let factor = if captive.is_faction_leader {
        LEADER_PRICE_FACTOR
    } else {
        cfg.factor
    };
    price_with_factor(captive.market_value, factor, adjustment_pct)
}

fn price_with_factor(base_value: f64, factor: f64, adjustment_pct: f64) -> i64 {
    let demand = base_value.max(0.0) * factor * (1.0 + adjustment_pct / 100.0);
    round_f64_to_i64(demand)
}
