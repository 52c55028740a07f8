//! Ransom tuning configuration shared by pricing, chance, and scheduling.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Host-adjustable negotiation tuning.
///
/// Exactly the four values the settings widget exposes. Formula shape and
/// adjustment bounds are compiled in and not configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RansomConfig {
    /// Multiplier applied to a captive's market value.
    #[serde(default = "RansomConfig::default_factor")]
    pub factor: f64,
    /// Baseline exponent shifting the whole acceptance curve.
    #[serde(default = "RansomConfig::default_base_adjustment")]
    pub base_adjustment: f64,
    /// In-game days between a rejected offer and the retaliation raid.
    #[serde(default = "RansomConfig::default_raid_delay_days")]
    pub raid_delay_days: f64,
    /// In-game days the retaliation marker blocks a repeat raid.
    #[serde(default = "RansomConfig::default_raid_cooldown_days")]
    pub raid_cooldown_days: f64,
}

impl RansomConfig {
    #[must_use]
    pub const fn default_factor() -> f64 {
        2.0
    }

    #[must_use]
    pub const fn default_base_adjustment() -> f64 {
        81.0
    }

    #[must_use]
    pub const fn default_raid_delay_days() -> f64 {
        2.0
    }

    #[must_use]
    pub const fn default_raid_cooldown_days() -> f64 {
        3.0
    }

    /// Validate configuration invariants before sanitization.
    ///
    /// # Errors
    ///
    /// Returns `RansomConfigError` when any field violates the documented
    /// bounds.
    pub fn validate(&self) -> Result<(), RansomConfigError> {
        Self::check_range("factor", self.factor, Self::FACTOR_RANGE)?;
        Self::check_range(
            "base_adjustment",
            self.base_adjustment,
            Self::BASE_ADJUSTMENT_RANGE,
        )?;
        Self::check_range("raid_delay_days", self.raid_delay_days, Self::DELAY_RANGE)?;
        Self::check_range(
            "raid_cooldown_days",
            self.raid_cooldown_days,
            Self::COOLDOWN_RANGE,
        )?;
        Ok(())
    }

    /// Clamp recoverable drift back into the documented bounds.
    ///
    /// Non-finite fields reset to their defaults; finite ones clamp.
    pub fn sanitize(&mut self) {
        self.factor = Self::clamp_field(self.factor, Self::default_factor(), Self::FACTOR_RANGE);
        self.base_adjustment = Self::clamp_field(
            self.base_adjustment,
            Self::default_base_adjustment(),
            Self::BASE_ADJUSTMENT_RANGE,
        );
        self.raid_delay_days = Self::clamp_field(
            self.raid_delay_days,
            Self::default_raid_delay_days(),
            Self::DELAY_RANGE,
        );
        self.raid_cooldown_days = Self::clamp_field(
            self.raid_cooldown_days,
            Self::default_raid_cooldown_days(),
            Self::COOLDOWN_RANGE,
        );
    }

    const FACTOR_RANGE: (f64, f64) = (1.0, 10.0);
    const BASE_ADJUSTMENT_RANGE: (f64, f64) = (0.0, 120.0);
    const DELAY_RANGE: (f64, f64) = (0.0, 30.0);
    const COOLDOWN_RANGE: (f64, f64) = (0.0, 60.0);

    fn check_range(
        field: &'static str,
        value: f64,
        (min, max): (f64, f64),
    ) -> Result<(), RansomConfigError> {
        if !value.is_finite() {
            return Err(RansomConfigError::NotFinite { field });
        }
        if !(min..=max).contains(&value) {
            return Err(RansomConfigError::RangeViolation {
                field,
                min,
                max,
                value,
            });
        }
        Ok(())
    }

    fn clamp_field(value: f64, default: f64, (min, max): (f64, f64)) -> f64 {
        if value.is_finite() {
            value.clamp(min, max)
        } else {
            default
        }
    }
}

impl Default for RansomConfig {
    fn default() -> Self {
        Self {
            factor: Self::default_factor(),
            base_adjustment: Self::default_base_adjustment(),
            raid_delay_days: Self::default_raid_delay_days(),
            raid_cooldown_days: Self::default_raid_cooldown_days(),
        }
    }
}

/// Errors raised when ransom configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum RansomConfigError {
    #[error("{field} must be between {min:.1} and {max:.1} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        let cfg = RansomConfig::default();
        assert!(cfg.validate().is_ok());
        assert!((cfg.factor - 2.0).abs() < f64::EPSILON);
        assert!((cfg.base_adjustment - 81.0).abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_range_factor_names_the_field() {
        let cfg = RansomConfig {
            factor: 0.5,
            ..RansomConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(RansomConfigError::RangeViolation {
                field: "factor",
                ..
            })
        ));
    }

    #[test]
    fn non_finite_fields_are_rejected() {
        let cfg = RansomConfig {
            base_adjustment: f64::NAN,
            ..RansomConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(RansomConfigError::NotFinite {
                field: "base_adjustment"
            })
        );
    }

    #[test]
    fn sanitize_clamps_and_resets() {
        let mut cfg = RansomConfig {
            factor: 99.0,
            base_adjustment: f64::INFINITY,
            raid_delay_days: -4.0,
            raid_cooldown_days: 3.0,
        };
        cfg.sanitize();
        assert!((cfg.factor - 10.0).abs() < f64::EPSILON);
        assert!(
            (cfg.base_adjustment - RansomConfig::default_base_adjustment()).abs() < f64::EPSILON
        );
        assert!((cfg.raid_delay_days - 0.0).abs() < f64::EPSILON);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: RansomConfig = serde_json::from_str(r#"{"factor": 3.0}"#).unwrap();
        assert!((cfg.factor - 3.0).abs() < f64::EPSILON);
        assert!((cfg.raid_delay_days - 2.0).abs() < f64::EPSILON);
        assert!((cfg.raid_cooldown_days - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn config_roundtrips_through_json() {
        let cfg = RansomConfig {
            factor: 2.5,
            base_adjustment: 70.0,
            raid_delay_days: 1.0,
            raid_cooldown_days: 5.0,
        };
        let encoded = serde_json::to_string(&cfg).unwrap();
        let decoded: RansomConfig = serde_json::from_str(&encoded).unwrap();
        assert_eq!(cfg, decoded);
    }
}
