//! Faction-dialog menu extension data.
//!
//! The engine never draws UI. It hands the host a data-only description
//! of the ransom entry for a faction interaction menu; the host renders
//! the labels, wires up the selection, and opens a session when the
//! player picks a captive.

use serde::Serialize;

use crate::chance::ransom_chance;
use crate::config::RansomConfig;
use crate::constants::{MENU_NO_CAPTIVES, MENU_RANSOM_ENTRY, MENU_RANSOM_PROMPT};
use crate::pricing::ransom_price_for;
use crate::world::{Captive, CaptiveId, Faction, Negotiator};

/// Inputs the host gathers while building one faction interaction menu.
#[derive(Debug, Clone, Copy)]
pub struct DialogContext<'a> {
    pub negotiator: &'a Negotiator,
    pub faction: &'a Faction,
    /// Every captive currently in player custody, any faction.
    pub captives: &'a [Captive],
    pub cfg: &'a RansomConfig,
}

/// Whether the ransom entry can currently be chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    Enabled,
    Disabled { reason_key: &'static str },
}

/// One selectable captive inside the ransom submenu.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptiveChoice {
    pub captive: CaptiveId,
    /// Rendered as "Name (price)" in the submenu.
    pub label: String,
    /// Neutral asking price, matching what a fresh session previews.
    pub price: i64,
    /// Neutral acceptance chance for the same session.
    pub chance: f64,
}

/// Data-only description of the ransom entry in a faction dialog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RansomEntry {
    pub label_key: &'static str,
    pub prompt_key: &'static str,
    pub state: EntryState,
    pub choices: Vec<CaptiveChoice>,
    /// The submenu always offers a way back to the parent menu.
    pub supports_back: bool,
}

impl RansomEntry {
    /// True when the entry can be picked right now.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        matches!(self.state, EntryState::Enabled)
    }
}

/// Build the ransom entry for one faction dialog, when one applies at all.
///
/// Non-hostile factions get no entry. Hostile factions with no captives
/// in custody get a disabled entry explaining why, so the option stays
/// discoverable without being selectable.
#[must_use]
pub fn build_ransom_entry(ctx: &DialogContext<'_>) -> Option<RansomEntry> {
    if !ctx.faction.hostile {
        return None;
    }
    let choices: Vec<CaptiveChoice> = ctx
        .captives
        .iter()
        .filter(|captive| captive.faction == ctx.faction.id)
        .map(|captive| priced_choice(captive, ctx))
        .collect();
    let state = if choices.is_empty() {
        EntryState::Disabled {
            reason_key: MENU_NO_CAPTIVES,
        }
    } else {
        EntryState::Enabled
    };
    Some(RansomEntry {
        label_key: MENU_RANSOM_ENTRY,
        prompt_key: MENU_RANSOM_PROMPT,
        state,
        choices,
        supports_back: true,
    })
}

fn priced_choice(captive: &Captive, ctx: &DialogContext<'_>) -> CaptiveChoice {
    let price = ransom_price_for(captive, 0.0, ctx.cfg);
    CaptiveChoice {
        captive: captive.id,
        label: format!("{} ({price})", captive.label),
        price,
        chance: ransom_chance(
            ctx.faction.goodwill,
            ctx.negotiator.social_skill,
            0.0,
            ctx.cfg,
        ),
    }
}

/// Extension point the host's dialog builder calls per faction menu.
///
/// Hosts that splice third-party entries into their menus hold a list of
/// these and append whatever each one returns.
pub trait MenuExtension {
    /// Entries to append after the host's own menu options.
    fn append_entries(&self, ctx: &DialogContext<'_>) -> Vec<RansomEntry>;
}

/// Shipped extension producing the ransom option.
#[derive(Debug, Clone, Copy, Default)]
pub struct RansomMenu;

impl MenuExtension for RansomMenu {
    fn append_entries(&self, ctx: &DialogContext<'_>) -> Vec<RansomEntry> {
        build_ransom_entry(ctx).into_iter().collect()
    }
}
