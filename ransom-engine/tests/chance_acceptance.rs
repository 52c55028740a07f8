use ransom_engine::{
    Captive, CaptiveId, Faction, FactionId, Negotiator, NegotiatorId, NegotiationSession,
    RansomConfig, SiteId, ransom_chance,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::convert::TryFrom;

const SAMPLE_SIZE: usize = 5000;
const TOLERANCE: f64 = 0.025;

fn open_session(goodwill: i32, skill: u32, adjustment: f64) -> NegotiationSession {
    let captive = Captive {
        id: CaptiveId(1),
        label: String::from("Mira"),
        faction: FactionId(7),
        market_value: 100.0,
        is_faction_leader: false,
        site: SiteId(5),
    };
    let faction = Faction {
        id: FactionId(7),
        label: String::from("Rust Hounds"),
        goodwill,
        hostile: true,
    };
    let negotiator = Negotiator {
        id: NegotiatorId(3),
        label: String::from("Sol"),
        social_skill: skill,
    };
    let mut session =
        NegotiationSession::open(captive, faction, negotiator, RansomConfig::default());
    session.set_adjustment(adjustment).expect("within bounds");
    session
}

fn observed_acceptance(template: &NegotiationSession, rng: &mut SmallRng) -> f64 {
    let mut accepted = 0usize;
    for _ in 0..SAMPLE_SIZE {
        let mut session = template.clone();
        if session.submit_offer(rng).expect("open session").is_delivered() {
            accepted += 1;
        }
    }
    let total = f64::from(u32::try_from(SAMPLE_SIZE).expect("sample size fits"));
    f64::from(u32::try_from(accepted).expect("count fits")) / total
}

#[test]
fn acceptance_rate_tracks_predicted_chance() {
    let cases = [(-75, 10, 0.0), (-75, 10, 30.0), (0, 5, -20.0)];
    let mut rng = SmallRng::seed_from_u64(0xACED);
    for (goodwill, skill, adjustment) in cases {
        let template = open_session(goodwill, skill, adjustment);
        let predicted = template.chance();
        assert!(
            predicted > 0.1 && predicted < 0.9,
            "case must sit away from the clamp ends: {predicted:.4}"
        );
        let observed = observed_acceptance(&template, &mut rng);
        assert!(
            (observed - predicted).abs() <= TOLERANCE,
            "acceptance drifted for goodwill {goodwill} skill {skill} adj {adjustment}: \
             observed {observed:.4}, predicted {predicted:.4}"
        );
    }
}

#[test]
fn greedier_demands_lose_more_offers() {
    let mut rng = SmallRng::seed_from_u64(0xACED_F00D);
    let neutral = observed_acceptance(&open_session(-75, 10, 0.0), &mut rng);
    let mut rng = SmallRng::seed_from_u64(0xACED_F00D);
    let greedy = observed_acceptance(&open_session(-75, 10, 50.0), &mut rng);
    assert!(
        neutral > greedy + 0.1,
        "gouging should cost acceptance (neutral {neutral:.4}, greedy {greedy:.4})"
    );
}

#[test]
fn skilled_negotiators_close_more_offers() {
    let mut rng = SmallRng::seed_from_u64(0xC0FFEE);
    let novice = observed_acceptance(&open_session(-75, 0, 0.0), &mut rng);
    let mut rng = SmallRng::seed_from_u64(0xC0FFEE);
    let veteran = observed_acceptance(&open_session(-75, 10, 0.0), &mut rng);
    assert!(
        veteran > novice + 0.1,
        "skill should raise acceptance (novice {novice:.4}, veteran {veteran:.4})"
    );
}

#[test]
fn certain_curves_behave_at_the_clamp_ends() {
    let ceiling_cfg = RansomConfig {
        base_adjustment: 120.0,
        ..RansomConfig::default()
    };
    assert!((ransom_chance(50, 15, -50.0, &ceiling_cfg) - 1.0).abs() < f64::EPSILON);

    // A clamped-to-one chance accepts every draw.
    let captive = Captive {
        id: CaptiveId(1),
        label: String::from("Mira"),
        faction: FactionId(7),
        market_value: 100.0,
        is_faction_leader: false,
        site: SiteId(5),
    };
    let faction = Faction {
        id: FactionId(7),
        label: String::from("Rust Hounds"),
        goodwill: 50,
        hostile: true,
    };
    let negotiator = Negotiator {
        id: NegotiatorId(3),
        label: String::from("Sol"),
        social_skill: 15,
    };
    let mut session = NegotiationSession::open(captive, faction, negotiator, ceiling_cfg);
    session.set_adjustment(-50.0).expect("within bounds");
    let mut rng = SmallRng::seed_from_u64(0xFACE);
    for _ in 0..200 {
        let mut run = session.clone();
        assert!(run.submit_offer(&mut rng).expect("open").is_delivered());
    }
}
