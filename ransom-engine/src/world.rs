//! Host-world snapshots consumed by the negotiation engine.
//!
//! The host owns its pawns, factions, and maps. The engine only ever sees
//! the immutable snapshots below and asks for mutations through effects;
//! it never reaches into host state directly.

use serde::{Deserialize, Serialize};

/// Identifier for a captive in player custody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaptiveId(pub u64);

/// Identifier for a faction known to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactionId(pub u64);

/// Identifier for the colonist speaking on the player's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NegotiatorId(pub u64);

/// Identifier for a host site; payments are dropped at the captive's site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(pub u64);

/// Snapshot of a captive eligible for ransom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Captive {
    pub id: CaptiveId,
    /// Display name the host renders in menus.
    pub label: String,
    pub faction: FactionId,
    /// Host-appraised market value, never negative.
    pub market_value: f64,
    /// Faction leaders command a steeper price.
    #[serde(default)]
    pub is_faction_leader: bool,
    pub site: SiteId,
}

/// Snapshot of the captive's home faction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faction {
    pub id: FactionId,
    pub label: String,
    /// Standing toward the player, conventionally within [-100, 100].
    pub goodwill: i32,
    /// Only hostile factions are offered ransom terms.
    pub hostile: bool,
}

/// Snapshot of the colonist conducting the negotiation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Negotiator {
    pub id: NegotiatorId,
    pub label: String,
    pub social_skill: u32,
}
