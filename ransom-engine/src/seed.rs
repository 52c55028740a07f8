//! Deterministic RNG stream derivation for negotiation hosts.
//!
//! A host replaying a save needs every negotiation to land on the same
//! outcome, and resolving one offer must never shift the rolls of the
//! next. Streams are carved out of a single world seed with HMAC-SHA256
//! under per-domain separation, so each captive's negotiations draw from
//! their own sequence.

use hmac::{Hmac, Mac};
use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;

use crate::world::CaptiveId;

const NEGOTIATION_DOMAIN: &[u8] = b"negotiation";

/// Derive an independent stream seed from the world seed and a domain tag.
#[must_use]
pub fn derive_stream_seed(world_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac = keyed_mac(world_seed);
    mac.update(domain_tag);
    finish_seed(mac)
}

/// Stream seed dedicated to one captive's negotiations.
#[must_use]
pub fn negotiation_stream_seed(world_seed: u64, captive: CaptiveId) -> u64 {
    let mut mac = keyed_mac(world_seed);
    mac.update(NEGOTIATION_DOMAIN);
    mac.update(&captive.0.to_le_bytes());
    finish_seed(mac)
}

/// Replay-stable RNG for one captive's negotiations.
///
/// ChaCha keeps the stream identical across platforms and releases, so a
/// host replaying a save reproduces every roll.
#[must_use]
pub fn negotiation_rng(world_seed: u64, captive: CaptiveId) -> CountingRng<ChaCha20Rng> {
    let stream = negotiation_stream_seed(world_seed, captive);
    CountingRng::new(ChaCha20Rng::seed_from_u64(stream))
}

fn keyed_mac(world_seed: u64) -> Hmac<Sha256> {
    Hmac::<Sha256>::new_from_slice(&world_seed.to_le_bytes()).expect("64-bit seed is a valid key")
}

fn finish_seed(mac: Hmac<Sha256>) -> u64 {
    let digest = mac.finalize().into_bytes();
    let seed_bytes: [u8; 8] = digest[..8].try_into().expect("digest slice length");
    u64::from_le_bytes(seed_bytes)
}

/// Counting wrapper instrumenting how many draws a stream consumed.
///
/// Submissions draw exactly once, so the draw count doubles as an offer
/// count when a harness replays whole negotiation batches.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    /// Fresh small RNG seeded from a derived stream seed.
    #[must_use]
    pub fn from_stream_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R> CountingRng<R> {
    #[must_use]
    pub const fn new(rng: R) -> Self {
        Self { rng, draws: 0 }
    }

    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: RngCore> RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}
