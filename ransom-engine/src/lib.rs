//! Ransom Negotiation Engine
//!
//! Host-agnostic logic for ransoming captives back to their faction.
//! This crate provides the pricing, acceptance, and consequence mechanics
//! without UI or host-specific dependencies: the host supplies world
//! snapshots and a random source, and applies the effects the engine
//! hands back.

pub mod chance;
pub mod config;
pub mod constants;
pub mod dialog;
pub mod numbers;
pub mod outcome;
pub mod pricing;
pub mod seed;
pub mod session;
pub mod settings;
pub mod world;

// Re-export commonly used types
pub use chance::{CurvePoint, chance_curve, ransom_chance};
pub use config::{RansomConfig, RansomConfigError};
pub use dialog::{
    CaptiveChoice, DialogContext, EntryState, MenuExtension, RansomEntry, RansomMenu,
    build_ransom_entry,
};
pub use outcome::{
    EffectError, EffectList, EffectReport, EffectSink, ExternalEffect, Outcome, RaidBudget,
    apply_effects, raid_budget_for, resolve_outcome,
};
pub use pricing::{ransom_price, ransom_price_for};
pub use seed::{CountingRng, derive_stream_seed, negotiation_rng, negotiation_stream_seed};
pub use session::{NegotiationSession, NegotiationTrace, SessionError, SessionPhase};
pub use settings::{JsonFileStore, SettingsFileError, SettingsStore, load_or_default};
pub use world::{Captive, CaptiveId, Faction, FactionId, Negotiator, NegotiatorId, SiteId};

/// Engine facade binding settings persistence to live negotiation state.
///
/// Hosts construct one at boot, hand out menus and sessions from it, and
/// push settings-widget commits back through it.
pub struct RansomMod<S>
where
    S: SettingsStore,
{
    store: S,
    cfg: RansomConfig,
}

impl<S> RansomMod<S>
where
    S: SettingsStore,
{
    /// Boot the engine, pulling settings through the store.
    ///
    /// A failed or invalid load falls back to compiled-in defaults; boot
    /// itself never fails.
    #[must_use]
    pub fn boot(store: S) -> Self {
        let cfg = load_or_default(&store);
        Self { store, cfg }
    }

    /// Currently resolved settings.
    #[must_use]
    pub const fn config(&self) -> &RansomConfig {
        &self.cfg
    }

    /// Commit new settings from the host's widget, sanitized and saved.
    ///
    /// # Errors
    ///
    /// Returns the store's error when persisting fails; the in-memory
    /// settings still update so the running game keeps the new values.
    pub fn update_config(&mut self, cfg: RansomConfig) -> Result<(), S::Error> {
        let mut cfg = cfg;
        cfg.sanitize();
        self.cfg = cfg;
        self.store.save(&self.cfg)
    }

    /// Reload settings from the store, replacing the resolved config.
    ///
    /// Unlike [`RansomMod::boot`] this propagates store failures rather
    /// than falling back to defaults, so a host can surface a corrupt
    /// settings file to the player. `None` means nothing was stored and
    /// the current config stands.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot read or decode the payload.
    pub fn reload_config(&mut self) -> Result<Option<RansomConfig>, anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        if let Some(mut cfg) = self.store.load().map_err(Into::into)? {
            cfg.sanitize();
            self.cfg = cfg.clone();
            Ok(Some(cfg))
        } else {
            Ok(None)
        }
    }

    /// Ransom entry for one faction's interaction menu, if any applies.
    #[must_use]
    pub fn menu_for(
        &self,
        negotiator: &Negotiator,
        faction: &Faction,
        captives: &[Captive],
    ) -> Option<RansomEntry> {
        let ctx = DialogContext {
            negotiator,
            faction,
            captives,
            cfg: &self.cfg,
        };
        build_ransom_entry(&ctx)
    }

    /// Open a negotiation session for one captive.
    ///
    /// The session snapshots the current settings; later settings commits
    /// do not retroactively change an open negotiation.
    #[must_use]
    pub fn open_session(
        &self,
        captive: Captive,
        faction: Faction,
        negotiator: Negotiator,
    ) -> NegotiationSession {
        NegotiationSession::open(captive, faction, negotiator, self.cfg.clone())
    }
}
