//! Centralized balance and tuning constants for the ransom engine.
//!
//! These values define the deterministic math for pricing and acceptance.
//! Keeping them together ensures that negotiation balance can only be
//! adjusted via code changes reviewed in version control, rather than
//! through external assets.

// Message keys -------------------------------------------------------------
pub(crate) const DEBUG_ENV_VAR: &str = "RANSOM_DEBUG_LOGS";
pub(crate) const MSG_RANSOM_DELIVERED: &str = "msg.ransom.delivered";
pub(crate) const MSG_RANSOM_REJECTED: &str = "msg.ransom.rejected";
pub(crate) const MENU_RANSOM_ENTRY: &str = "menu.ransom.entry";
pub(crate) const MENU_RANSOM_PROMPT: &str = "menu.ransom.choose-captive";
pub(crate) const MENU_NO_CAPTIVES: &str = "menu.ransom.no-captives";

// Pricing tuning -----------------------------------------------------------
pub(crate) const LEADER_PRICE_FACTOR: f64 = 4.0;

// Acceptance curve ---------------------------------------------------------
pub(crate) const CHANCE_SCALE: f64 = 1e-4;
pub(crate) const CHANCE_EXP_BASE: f64 = 1.1;
pub(crate) const GOODWILL_EXP_WEIGHT: f64 = 1.0 / 1000.0;
pub(crate) const ADJUSTMENT_EXP_WEIGHT: f64 = 0.3;

// Demand adjustment bounds -------------------------------------------------
pub(crate) const ADJUSTMENT_MIN_PCT: f64 = -50.0;
pub(crate) const ADJUSTMENT_MAX_PCT: f64 = 50.0;

// Raid scheduling ----------------------------------------------------------
pub(crate) const RAID_BUDGET_MIN_DIVISOR: f64 = 3.0;
pub(crate) const RAID_BUDGET_MAX_DIVISOR: f64 = 2.0;

#[cfg(test)]
pub(crate) const FLOAT_EPSILON: f64 = 1e-9;
