//! Scenario catalog and batch runner for the negotiation harness.
//!
//! Each scenario pairs a negotiation plan with expectations evaluated
//! against the summary of one batch. Batches draw from per-captive
//! streams derived off the world seed, so every run is replayable.

use anyhow::{Context, Result};
use colored::Colorize;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};

use ransom_engine::{
    Captive, CaptiveId, CountingRng, DialogContext, ExternalEffect, Faction, FactionId,
    NegotiationSession, Negotiator, NegotiatorId, Outcome, RansomConfig, SiteId,
    build_ransom_entry, negotiation_stream_seed, ransom_chance, ransom_price_for, resolve_outcome,
};

const ACCEPTANCE_SAMPLE_SIZE: u32 = 6000;
const ACCEPTANCE_TOLERANCE: f64 = 0.03;
const STANDARD_MARKET_VALUE: f64 = 100.0;

/// Per-iteration acceptance check evaluated against the batch summary.
pub type Expectation = fn(&BatchSummary) -> Result<()>;

/// Parameters for one negotiation batch.
#[derive(Debug, Clone)]
pub struct NegotiationPlan {
    pub goodwill: i32,
    pub social_skill: u32,
    pub adjustment_pct: f64,
    pub offers: u32,
    /// Run the batch twice on the same stream and compare transcripts.
    pub replay_check: bool,
    pub cfg: RansomConfig,
    pub expectations: Vec<Expectation>,
}

impl NegotiationPlan {
    #[must_use]
    pub fn new(goodwill: i32, social_skill: u32) -> Self {
        Self {
            goodwill,
            social_skill,
            adjustment_pct: 0.0,
            offers: 64,
            replay_check: false,
            cfg: RansomConfig::default(),
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_adjustment(mut self, pct: f64) -> Self {
        self.adjustment_pct = pct;
        self
    }

    #[must_use]
    pub fn with_offers(mut self, offers: u32) -> Self {
        self.offers = offers;
        self
    }

    #[must_use]
    pub fn with_replay_check(mut self) -> Self {
        self.replay_check = true;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }

    fn world(&self) -> (Captive, Faction, Negotiator) {
        standard_world(self.goodwill, self.social_skill)
    }
}

/// Aggregate of one batch run under a single derived stream.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub world_seed: u64,
    pub stream_seed: u64,
    pub offers: u32,
    pub delivered: u32,
    pub draws: u64,
    pub total_paid: i64,
    pub asking_price: i64,
    pub predicted_chance: f64,
    pub menu_enabled: bool,
    pub effects_consistent: bool,
    pub replay_consistent: bool,
    pub transcript_digest: [u8; 32],
}

/// Named scenario the CLI can select.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: NegotiationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn new(name: impl Into<String>, plan: NegotiationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

/// Outcome of running one scenario against one world seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
}

/// Drives scenarios across seeds and iterations.
pub struct ScenarioRunner {
    verbose: bool,
}

impl ScenarioRunner {
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for &seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing scenario: {} (seed {seed})",
                    scenario.name.bright_white()
                );
            }
            results.push(self.run_single_scenario(scenario, seed, iterations));
        }

        results
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut timings = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            match run_batch(&scenario.plan, iteration_seed) {
                Ok(summary) => {
                    if let Some(err) = evaluate_expectations(&scenario.plan, &summary) {
                        failures.push(format!(
                            "Iteration {} (seed {}, stream {:#x}, offers {}, delivered {}, price {}, chance {:.4}): {err}",
                            i + 1,
                            summary.world_seed,
                            summary.stream_seed,
                            summary.offers,
                            summary.delivered,
                            summary.asking_price,
                            summary.predicted_chance,
                        ));
                        if self.verbose {
                            println!(
                                "  ❌ Iteration {}/{} failed: {}",
                                i + 1,
                                iterations,
                                err.red()
                            );
                        }
                    } else {
                        successes += 1;
                        let duration = start_time.elapsed();
                        timings.push(duration);
                        if self.verbose {
                            println!(
                                "  ✅ Iteration {}/{} passed ({duration:?}) delivered:{}/{}",
                                i + 1,
                                iterations,
                                summary.delivered,
                                summary.offers
                            );
                        }
                    }
                }
                Err(err) => {
                    failures.push(format!(
                        "Iteration {} (seed {iteration_seed}): failed to run: {err:#}",
                        i + 1
                    ));
                }
            }
        }

        let average_duration = if timings.is_empty() {
            Duration::ZERO
        } else {
            timings.iter().sum::<Duration>() / u32::try_from(timings.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration,
        }
    }
}

fn evaluate_expectations(plan: &NegotiationPlan, summary: &BatchSummary) -> Option<String> {
    for expectation in &plan.expectations {
        if let Err(err) = expectation(summary) {
            return Some(err.to_string());
        }
    }
    None
}

fn run_batch(plan: &NegotiationPlan, world_seed: u64) -> Result<BatchSummary> {
    let (captive, faction, negotiator) = plan.world();
    let stream_seed = negotiation_stream_seed(world_seed, captive.id);

    let mut probe = NegotiationSession::open(
        captive.clone(),
        faction.clone(),
        negotiator.clone(),
        plan.cfg.clone(),
    );
    probe
        .set_adjustment(plan.adjustment_pct)
        .context("plan adjustment outside the slider bounds")?;
    let asking_price = probe.price();
    let predicted_chance = probe.chance();

    let primary = run_transcript(plan, stream_seed)?;
    let replay_consistent = if plan.replay_check {
        let replay = run_transcript(plan, stream_seed)?;
        replay.digest == primary.digest
    } else {
        true
    };

    let entry = build_ransom_entry(&DialogContext {
        negotiator: &negotiator,
        faction: &faction,
        captives: std::slice::from_ref(&captive),
        cfg: &plan.cfg,
    });
    let menu_enabled = entry.is_some_and(|entry| entry.is_enabled());

    log::debug!(
        "batch seed {world_seed} stream {stream_seed:#x} delivered {}/{}",
        primary.delivered,
        plan.offers
    );

    Ok(BatchSummary {
        world_seed,
        stream_seed,
        offers: plan.offers,
        delivered: primary.delivered,
        draws: primary.draws,
        total_paid: primary.total_paid,
        asking_price,
        predicted_chance,
        menu_enabled,
        effects_consistent: primary.effects_consistent,
        replay_consistent,
        transcript_digest: primary.digest,
    })
}

struct Transcript {
    delivered: u32,
    draws: u64,
    total_paid: i64,
    effects_consistent: bool,
    digest: [u8; 32],
}

fn run_transcript(plan: &NegotiationPlan, stream_seed: u64) -> Result<Transcript> {
    use std::fmt::Write as _;

    let (captive, faction, negotiator) = plan.world();
    let mut rng = CountingRng::new(ChaCha20Rng::seed_from_u64(stream_seed));

    let mut delivered = 0_u32;
    let mut total_paid = 0_i64;
    let mut effects_consistent = true;
    let mut lines = String::new();

    for offer in 0..plan.offers {
        let mut session = NegotiationSession::open(
            captive.clone(),
            faction.clone(),
            negotiator.clone(),
            plan.cfg.clone(),
        );
        session
            .set_adjustment(plan.adjustment_pct)
            .context("plan adjustment outside the slider bounds")?;
        let (outcome, trace) = session
            .submit_offer_with_trace(&mut rng)
            .context("offer on a session that should be open")?;

        if let Outcome::Delivered { paid_amount } = outcome {
            delivered += 1;
            total_paid = total_paid.saturating_add(paid_amount);
        }
        effects_consistent &= effect_shape_ok(outcome, &captive, &plan.cfg);

        writeln!(
            lines,
            "{offer},{:016x},{},{}",
            trace.roll.to_bits(),
            trace.price,
            u8::from(trace.accepted)
        )
        .context("append trace line")?;
    }

    let mut hasher = Sha256::new();
    hasher.update(lines.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 32];
    bytes.copy_from_slice(&digest);

    Ok(Transcript {
        delivered,
        draws: rng.draws(),
        total_paid,
        effects_consistent,
        digest: bytes,
    })
}

fn effect_shape_ok(outcome: Outcome, captive: &Captive, cfg: &RansomConfig) -> bool {
    let effects = resolve_outcome(outcome, captive, cfg);
    match outcome {
        Outcome::Delivered { paid_amount } => matches!(
            effects.as_slice(),
            [
                ExternalEffect::SpawnPayment { amount, site },
                ExternalEffect::ReleaseCaptive { captive: released },
            ] if *amount == paid_amount && *site == captive.site && *released == captive.id
        ),
        Outcome::Rejected => matches!(
            effects.as_slice(),
            [ExternalEffect::ScheduleRaid { faction, .. }] if *faction == captive.faction
        ),
    }
}

fn standard_world(goodwill: i32, social_skill: u32) -> (Captive, Faction, Negotiator) {
    let captive = Captive {
        id: CaptiveId(1),
        label: "Renn".to_string(),
        faction: FactionId(3),
        market_value: STANDARD_MARKET_VALUE,
        is_faction_leader: false,
        site: SiteId(7),
    };
    let faction = Faction {
        id: FactionId(3),
        label: "Crimson Pact".to_string(),
        goodwill,
        hostile: true,
    };
    let negotiator = Negotiator {
        id: NegotiatorId(11),
        label: "Sable".to_string(),
        social_skill,
    };
    (captive, faction, negotiator)
}

// Catalog ----------------------------------------------------------------

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    match name.to_lowercase().as_str() {
        "smoke" | "pipeline" => Some(smoke_scenario()),
        "curve" | "acceptance" => Some(curve_scenario()),
        "storm" | "replay" | "determinism" => Some(storm_scenario()),
        "boundary" | "edges" => Some(boundary_scenario()),
        _ => None,
    }
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("smoke", "Menu to effects pipeline on a small batch"),
        ("curve", "Observed acceptance tracks the predicted chance"),
        ("storm", "Derived streams replay to identical transcripts"),
        ("boundary", "Slider bounds and closed-session guarantees"),
    ]
}

fn smoke_scenario() -> TestScenario {
    TestScenario::new(
        "Smoke Negotiation",
        NegotiationPlan::new(-75, 10)
            .with_offers(64)
            .with_expectation(pipeline_expectation),
    )
}

fn curve_scenario() -> TestScenario {
    TestScenario::new(
        "Acceptance Curve Tracking",
        NegotiationPlan::new(-75, 10)
            .with_offers(ACCEPTANCE_SAMPLE_SIZE)
            .with_expectation(acceptance_expectation),
    )
}

fn storm_scenario() -> TestScenario {
    TestScenario::new(
        "Replay Determinism Storm",
        NegotiationPlan::new(-75, 10)
            .with_adjustment(30.0)
            .with_offers(256)
            .with_replay_check()
            .with_expectation(replay_expectation),
    )
}

fn boundary_scenario() -> TestScenario {
    TestScenario::new(
        "Boundary Conditions",
        NegotiationPlan::new(-75, 10)
            .with_offers(8)
            .with_expectation(boundary_expectation),
    )
}

fn pipeline_expectation(summary: &BatchSummary) -> Result<()> {
    anyhow::ensure!(
        summary.menu_enabled,
        "ransom entry should be enabled for a hostile faction holding captives"
    );
    anyhow::ensure!(summary.asking_price > 0, "asking price should be positive");
    anyhow::ensure!(
        summary.draws == u64::from(summary.offers),
        "each offer should draw exactly once, drew {} for {} offers",
        summary.draws,
        summary.offers
    );
    anyhow::ensure!(
        summary.effects_consistent,
        "every outcome should resolve to its canonical effect list"
    );
    anyhow::ensure!(
        summary.delivered > 0 && summary.delivered < summary.offers,
        "a mid-curve batch should see both deliveries and rejections, got {}/{}",
        summary.delivered,
        summary.offers
    );
    anyhow::ensure!(
        summary.total_paid == i64::from(summary.delivered) * summary.asking_price,
        "payments should equal deliveries times the asking price"
    );
    Ok(())
}

fn acceptance_expectation(summary: &BatchSummary) -> Result<()> {
    let predicted = summary.predicted_chance;
    anyhow::ensure!(
        predicted > 0.1 && predicted < 0.9,
        "predicted chance {predicted:.4} leaves no room for a two-sided tolerance"
    );
    let observed = f64::from(summary.delivered) / f64::from(summary.offers);
    let delta = (observed - predicted).abs();
    anyhow::ensure!(
        delta <= ACCEPTANCE_TOLERANCE,
        "observed acceptance {observed:.4} drifted {delta:.4} from predicted {predicted:.4}"
    );
    Ok(())
}

fn replay_expectation(summary: &BatchSummary) -> Result<()> {
    anyhow::ensure!(
        summary.replay_consistent,
        "replaying the same stream seed must reproduce the transcript digest"
    );
    anyhow::ensure!(
        summary.transcript_digest != [0_u8; 32],
        "transcript digest should cover the batch"
    );
    anyhow::ensure!(
        summary.draws == u64::from(summary.offers),
        "each offer should draw exactly once, drew {} for {} offers",
        summary.draws,
        summary.offers
    );
    Ok(())
}

fn boundary_expectation(_summary: &BatchSummary) -> Result<()> {
    let cfg = RansomConfig::default();
    let (captive, faction, negotiator) = standard_world(-75, 10);

    let mut session = NegotiationSession::open(
        captive.clone(),
        faction.clone(),
        negotiator.clone(),
        cfg.clone(),
    );
    anyhow::ensure!(
        session.set_adjustment(50.1).is_err(),
        "adjustment above the slider cap must be refused"
    );
    anyhow::ensure!(
        session.set_adjustment(f64::NAN).is_err(),
        "non-finite adjustment must be refused"
    );
    session.set_adjustment(NegotiationSession::ADJUSTMENT_MAX)?;
    session.set_adjustment(NegotiationSession::ADJUSTMENT_MIN)?;
    session.set_adjustment(0.0)?;

    let chance = session.chance();
    let outcome = session.submit_offer_with_sample(chance)?;
    anyhow::ensure!(
        !outcome.is_delivered(),
        "a roll exactly at the chance must reject"
    );
    anyhow::ensure!(
        session.cancel().is_err(),
        "a resolved session must refuse cancellation"
    );
    anyhow::ensure!(
        session.set_adjustment(0.0).is_err(),
        "a resolved session must refuse slider moves"
    );
    anyhow::ensure!(
        session.submit_offer_with_sample(0.0).is_err(),
        "a resolved session must refuse another offer"
    );

    let mut under = NegotiationSession::open(
        captive.clone(),
        faction.clone(),
        negotiator.clone(),
        cfg.clone(),
    );
    let chance = under.chance();
    let outcome = under.submit_offer_with_sample(chance / 2.0)?;
    anyhow::ensure!(
        outcome.is_delivered(),
        "a roll under the chance must deliver"
    );

    let leader = Captive {
        is_faction_leader: true,
        ..captive.clone()
    };
    anyhow::ensure!(
        ransom_price_for(&leader, 0.0, &cfg) == 400,
        "leader premium should quadruple a 100 silver captive"
    );

    let worthless = Captive {
        market_value: -50.0,
        ..captive.clone()
    };
    anyhow::ensure!(
        ransom_price_for(&worthless, 0.0, &cfg) == 0,
        "negative appraisals must floor at zero"
    );

    let saturated_cfg = RansomConfig {
        base_adjustment: 119.0,
        ..RansomConfig::default()
    };
    let certain = ransom_chance(0, 0, -50.0, &saturated_cfg);
    anyhow::ensure!(
        (certain - 1.0).abs() < 1e-12,
        "a saturated exponent must clamp to certainty, got {certain}"
    );

    let entry = build_ransom_entry(&DialogContext {
        negotiator: &negotiator,
        faction: &faction,
        captives: &[],
        cfg: &cfg,
    });
    let Some(entry) = entry else {
        anyhow::bail!("hostile faction should still surface a ransom entry");
    };
    anyhow::ensure!(
        !entry.is_enabled(),
        "an empty captive roster must disable the entry"
    );

    let friendly = Faction {
        hostile: false,
        ..faction
    };
    let entry = build_ransom_entry(&DialogContext {
        negotiator: &negotiator,
        faction: &friendly,
        captives: std::slice::from_ref(&captive),
        cfg: &cfg,
    });
    anyhow::ensure!(entry.is_none(), "friendly factions get no ransom entry");

    Ok(())
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}
