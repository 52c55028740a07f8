//! Negotiation session state machine.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chance::ransom_chance;
use crate::config::RansomConfig;
use crate::constants::{ADJUSTMENT_MAX_PCT, ADJUSTMENT_MIN_PCT};
use crate::numbers::unit_sample;
use crate::outcome::Outcome;
use crate::pricing::ransom_price_for;
use crate::world::{Captive, Faction, Negotiator};

#[cfg(debug_assertions)]
use crate::constants::DEBUG_ENV_VAR;

#[cfg(debug_assertions)]
fn debug_log_enabled() -> bool {
    matches!(std::env::var(DEBUG_ENV_VAR), Ok(val) if val != "0")
}

#[cfg(not(debug_assertions))]
const fn debug_log_enabled() -> bool {
    false
}

/// Lifecycle phase of a negotiation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Terms can still change and the offer has not gone out.
    Open,
    /// Terminal; reached by submitting or cancelling.
    Closed,
}

/// Errors raised when a session transition is rejected.
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("demand adjustment {pct:.1}% outside [{min:.0}%, {max:.0}%]")]
    InvalidAdjustment { pct: f64, min: f64, max: f64 },
    #[error("negotiation already closed")]
    Closed,
}

/// Diagnostic record of a single offer resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NegotiationTrace {
    /// Unit-interval roll compared against the chance.
    pub roll: f64,
    /// Acceptance chance at submission time.
    pub chance: f64,
    /// Silver demanded at submission time.
    pub price: i64,
    pub accepted: bool,
}

/// One open ransom negotiation for a single captive.
///
/// Sessions are single-owner and short-lived. The host opens one from its
/// current world snapshots, previews price and chance while the player
/// drags the demand slider, then submits the offer once or cancels. Both
/// paths close the session for good; a closed session refuses everything.
#[derive(Debug, Clone)]
pub struct NegotiationSession {
    captive: Captive,
    faction: Faction,
    negotiator: Negotiator,
    cfg: RansomConfig,
    adjustment_pct: f64,
    phase: SessionPhase,
}

impl NegotiationSession {
    /// Lower bound of the demand adjustment slider.
    pub const ADJUSTMENT_MIN: f64 = ADJUSTMENT_MIN_PCT;
    /// Upper bound of the demand adjustment slider.
    pub const ADJUSTMENT_MAX: f64 = ADJUSTMENT_MAX_PCT;

    /// Open a session at a neutral demand adjustment.
    #[must_use]
    pub const fn open(
        captive: Captive,
        faction: Faction,
        negotiator: Negotiator,
        cfg: RansomConfig,
    ) -> Self {
        Self {
            captive,
            faction,
            negotiator,
            cfg,
            adjustment_pct: 0.0,
            phase: SessionPhase::Open,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub const fn adjustment_pct(&self) -> f64 {
        self.adjustment_pct
    }

    #[must_use]
    pub const fn captive(&self) -> &Captive {
        &self.captive
    }

    #[must_use]
    pub const fn config(&self) -> &RansomConfig {
        &self.cfg
    }

    /// Move the demand slider.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidAdjustment` when `pct` falls outside
    /// the slider bounds, before any price or chance is computed, and
    /// `SessionError::Closed` once the session has ended.
    pub fn set_adjustment(&mut self, pct: f64) -> Result<(), SessionError> {
        self.ensure_open()?;
        if !pct.is_finite() || !(Self::ADJUSTMENT_MIN..=Self::ADJUSTMENT_MAX).contains(&pct) {
            return Err(SessionError::InvalidAdjustment {
                pct,
                min: Self::ADJUSTMENT_MIN,
                max: Self::ADJUSTMENT_MAX,
            });
        }
        self.adjustment_pct = pct;
        Ok(())
    }

    /// Silver demanded at the current slider position.
    ///
    /// Pure preview: repeated calls with unchanged inputs return the same
    /// value the eventual submission uses.
    #[must_use]
    pub fn price(&self) -> i64 {
        ransom_price_for(&self.captive, self.adjustment_pct, &self.cfg)
    }

    /// Probability the faction accepts at the current slider position.
    #[must_use]
    pub fn chance(&self) -> f64 {
        ransom_chance(
            self.faction.goodwill,
            self.negotiator.social_skill,
            self.adjustment_pct,
            &self.cfg,
        )
    }

    /// Submit the offer, consuming exactly one draw from `rng`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` when the session has already ended.
    pub fn submit_offer<R: RngCore>(&mut self, rng: &mut R) -> Result<Outcome, SessionError> {
        let (outcome, _) = self.submit_offer_with_trace(rng)?;
        Ok(outcome)
    }

    /// Submit the offer and return the decision trace alongside the outcome.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` when the session has already ended.
    pub fn submit_offer_with_trace<R: RngCore>(
        &mut self,
        rng: &mut R,
    ) -> Result<(Outcome, NegotiationTrace), SessionError> {
        self.ensure_open()?;
        let roll = unit_sample(rng.next_u32());
        Ok(self.resolve_submission(roll))
    }

    /// Submit with an explicit unit-interval sample instead of an RNG draw.
    ///
    /// Replays and boundary checks drive this directly. The comparison is
    /// strict, so a sample exactly equal to the chance rejects the offer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` when the session has already ended.
    pub fn submit_offer_with_sample(&mut self, sample: f64) -> Result<Outcome, SessionError> {
        self.ensure_open()?;
        Ok(self.resolve_submission(sample).0)
    }

    /// Walk away without making the offer. No outcome, no effects.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` when the session has already ended.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.phase = SessionPhase::Closed;
        Ok(())
    }

    fn resolve_submission(&mut self, roll: f64) -> (Outcome, NegotiationTrace) {
        let price = self.price();
        let chance = self.chance();
        let accepted = roll < chance;
        self.phase = SessionPhase::Closed;
        let outcome = if accepted {
            Outcome::Delivered { paid_amount: price }
        } else {
            Outcome::Rejected
        };
        if debug_log_enabled() {
            println!(
                "Ransom offer | captive {} roll {roll:.6} chance {chance:.6} price {price} accepted:{accepted}",
                self.captive.label
            );
        }
        let trace = NegotiationTrace {
            roll,
            chance,
            price,
            accepted,
        };
        (outcome, trace)
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Open => Ok(()),
            SessionPhase::Closed => Err(SessionError::Closed),
        }
    }
}
