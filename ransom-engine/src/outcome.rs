//! Offer outcomes and their world-visible consequences.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::config::RansomConfig;
use crate::constants::{
    MSG_RANSOM_DELIVERED, MSG_RANSOM_REJECTED, RAID_BUDGET_MAX_DIVISOR, RAID_BUDGET_MIN_DIVISOR,
};
use crate::numbers::{i64_to_f64, round_f64_to_i64};
use crate::pricing::ransom_price_for;
use crate::world::{Captive, CaptiveId, FactionId, SiteId};

/// Effect capacity stored inline; a resolved offer never yields more than two.
pub type EffectList = SmallVec<[ExternalEffect; 2]>;

/// Terminal result of a submitted ransom offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The faction pays; silver arrives and the captive walks free.
    Delivered { paid_amount: i64 },
    /// The faction refuses and retaliation follows.
    Rejected,
}

impl Outcome {
    /// Message key the host renders as a toast for this outcome.
    #[must_use]
    pub const fn message_key(self) -> &'static str {
        match self {
            Self::Delivered { .. } => MSG_RANSOM_DELIVERED,
            Self::Rejected => MSG_RANSOM_REJECTED,
        }
    }

    /// True when the faction agreed to pay.
    #[must_use]
    pub const fn is_delivered(self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// Raid points window the host draws from when retaliation fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaidBudget {
    pub min: i64,
    pub max: i64,
}

/// Host-applied consequence of a resolved offer.
///
/// Effects are data only. The engine orders them; the host mutates its own
/// world state while walking the list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalEffect {
    /// Drop the agreed payment at the captive's current site.
    SpawnPayment { amount: i64, site: SiteId },
    /// Release the captive from player custody.
    ReleaseCaptive { captive: CaptiveId },
    /// Queue a retaliation raid by the spurned faction.
    ScheduleRaid {
        faction: FactionId,
        delay_days: f64,
        cooldown_days: f64,
        budget: RaidBudget,
    },
}

impl ExternalEffect {
    /// Stable key identifying the effect kind in reports and logs.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::SpawnPayment { .. } => "effect.spawn-payment",
            Self::ReleaseCaptive { .. } => "effect.release-captive",
            Self::ScheduleRaid { .. } => "effect.schedule-raid",
        }
    }
}

/// Translate a terminal outcome into the effects the host must apply.
///
/// Delivery orders the payment before the release so a refused release
/// never strands an unpaid captive handover. Rejection schedules exactly
/// one raid carrying the configured delay and cooldown windows.
#[must_use]
pub fn resolve_outcome(outcome: Outcome, captive: &Captive, cfg: &RansomConfig) -> EffectList {
    let mut effects = EffectList::new();
    match outcome {
        Outcome::Delivered { paid_amount } => {
            effects.push(ExternalEffect::SpawnPayment {
                amount: paid_amount,
                site: captive.site,
            });
            effects.push(ExternalEffect::ReleaseCaptive {
                captive: captive.id,
            });
        }
        Outcome::Rejected => {
            effects.push(ExternalEffect::ScheduleRaid {
                faction: captive.faction,
                delay_days: cfg.raid_delay_days,
                cooldown_days: cfg.raid_cooldown_days,
                budget: raid_budget_for(captive, cfg),
            });
        }
    }
    effects
}

/// Raid points window derived from the captive's neutral asking price.
///
/// The host draws the actual point value from the window; the resolver
/// itself stays deterministic.
#[must_use]
pub fn raid_budget_for(captive: &Captive, cfg: &RansomConfig) -> RaidBudget {
    let asking = i64_to_f64(ransom_price_for(captive, 0.0, cfg));
    let min = round_f64_to_i64(asking / RAID_BUDGET_MIN_DIVISOR);
    let max = round_f64_to_i64(asking / RAID_BUDGET_MAX_DIVISOR);
    RaidBudget {
        min,
        max: max.max(min),
    }
}

/// Host-side mutator applying effects to the real game world.
///
/// Implementations decide what each effect means in their world; the
/// engine only cares whether the mutation was accepted.
pub trait EffectSink {
    /// Apply a single effect.
    ///
    /// # Errors
    ///
    /// Returns `EffectError::Rejected` when the world refuses the mutation.
    fn apply(&mut self, effect: &ExternalEffect) -> Result<(), EffectError>;
}

/// Errors raised while applying resolved effects.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EffectError {
    #[error("{effect} rejected: {reason}")]
    Rejected {
        effect: &'static str,
        reason: String,
    },
}

/// Result of pushing an effect list into a sink.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EffectReport {
    /// Count of effects the sink accepted.
    pub applied: usize,
    /// Refusals in application order.
    pub rejections: Vec<EffectError>,
}

impl EffectReport {
    /// True when every effect landed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.rejections.is_empty()
    }
}

/// Apply effects in order, reporting refusals without retry or rollback.
///
/// A refusal does not stop the walk; later effects still get their chance
/// and already-applied ones stay applied.
#[must_use]
pub fn apply_effects<S: EffectSink>(sink: &mut S, effects: &[ExternalEffect]) -> EffectReport {
    let mut report = EffectReport::default();
    for effect in effects {
        match sink.apply(effect) {
            Ok(()) => report.applied += 1,
            Err(err) => report.rejections.push(err),
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{CaptiveId, FactionId, SiteId};

    fn captive(market_value: f64, leader: bool) -> Captive {
        Captive {
            id: CaptiveId(11),
            label: String::from("Reed"),
            faction: FactionId(4),
            market_value,
            is_faction_leader: leader,
            site: SiteId(2),
        }
    }

    struct RecordingSink {
        seen: Vec<&'static str>,
        refuse: Option<&'static str>,
    }

    impl RecordingSink {
        fn accepting() -> Self {
            Self {
                seen: Vec::new(),
                refuse: None,
            }
        }

        fn refusing(key: &'static str) -> Self {
            Self {
                seen: Vec::new(),
                refuse: Some(key),
            }
        }
    }

    impl EffectSink for RecordingSink {
        fn apply(&mut self, effect: &ExternalEffect) -> Result<(), EffectError> {
            self.seen.push(effect.key());
            if self.refuse == Some(effect.key()) {
                return Err(EffectError::Rejected {
                    effect: effect.key(),
                    reason: String::from("test refusal"),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn delivery_pays_before_release() {
        let cfg = RansomConfig::default();
        let captive = captive(150.0, false);
        let effects = resolve_outcome(Outcome::Delivered { paid_amount: 300 }, &captive, &cfg);
        assert_eq!(effects.len(), 2);
        assert!(matches!(
            effects[0],
            ExternalEffect::SpawnPayment {
                amount: 300,
                site: SiteId(2)
            }
        ));
        assert!(matches!(
            effects[1],
            ExternalEffect::ReleaseCaptive {
                captive: CaptiveId(11)
            }
        ));
    }

    #[test]
    fn rejection_schedules_one_raid_with_config_windows() {
        let cfg = RansomConfig {
            raid_delay_days: 1.5,
            raid_cooldown_days: 4.0,
            ..RansomConfig::default()
        };
        let captive = captive(300.0, false);
        let effects = resolve_outcome(Outcome::Rejected, &captive, &cfg);
        assert_eq!(effects.len(), 1);
        let ExternalEffect::ScheduleRaid {
            faction,
            delay_days,
            cooldown_days,
            budget,
        } = effects[0]
        else {
            panic!("rejection must schedule a raid");
        };
        assert_eq!(faction, FactionId(4));
        assert!((delay_days - 1.5).abs() < f64::EPSILON);
        assert!((cooldown_days - 4.0).abs() < f64::EPSILON);
        // Neutral asking price is 600: budget spans a third to a half.
        assert_eq!(budget, RaidBudget { min: 200, max: 300 });
    }

    #[test]
    fn raid_budget_reflects_leader_premium() {
        let cfg = RansomConfig::default();
        let ordinary = raid_budget_for(&captive(300.0, false), &cfg);
        let leader = raid_budget_for(&captive(300.0, true), &cfg);
        assert_eq!(ordinary, RaidBudget { min: 200, max: 300 });
        assert_eq!(leader, RaidBudget { min: 400, max: 600 });
    }

    #[test]
    fn raid_budget_collapses_gracefully_for_worthless_captives() {
        let cfg = RansomConfig::default();
        let budget = raid_budget_for(&captive(0.0, false), &cfg);
        assert_eq!(budget, RaidBudget { min: 0, max: 0 });
    }

    #[test]
    fn outcome_message_keys_are_stable() {
        assert_eq!(
            Outcome::Delivered { paid_amount: 10 }.message_key(),
            "msg.ransom.delivered"
        );
        assert_eq!(Outcome::Rejected.message_key(), "msg.ransom.rejected");
        assert!(Outcome::Delivered { paid_amount: 10 }.is_delivered());
        assert!(!Outcome::Rejected.is_delivered());
    }

    #[test]
    fn sink_receives_effects_in_order() {
        let cfg = RansomConfig::default();
        let captive = captive(100.0, false);
        let effects = resolve_outcome(Outcome::Delivered { paid_amount: 200 }, &captive, &cfg);
        let mut sink = RecordingSink::accepting();
        let report = apply_effects(&mut sink, &effects);
        assert_eq!(sink.seen, vec!["effect.spawn-payment", "effect.release-captive"]);
        assert_eq!(report.applied, 2);
        assert!(report.is_clean());
    }

    #[test]
    fn refused_effect_is_reported_without_rollback() {
        let cfg = RansomConfig::default();
        let captive = captive(100.0, false);
        let effects = resolve_outcome(Outcome::Delivered { paid_amount: 200 }, &captive, &cfg);
        let mut sink = RecordingSink::refusing("effect.release-captive");
        let report = apply_effects(&mut sink, &effects);
        assert_eq!(report.applied, 1);
        assert_eq!(report.rejections.len(), 1);
        assert!(matches!(
            report.rejections[0],
            EffectError::Rejected {
                effect: "effect.release-captive",
                ..
            }
        ));
        // The payment stays applied; the sink saw both effects.
        assert_eq!(sink.seen.len(), 2);
    }
}
