//! Chance outcome selection
//!
//! Every sample is drawn from a `SmallRng` seeded by the configured seed
//! mixed with the mask of cards already out, so the same position always
//! produces the same outcomes.

use cfrbot_engine::Card;
use rand::rngs::SmallRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use std::collections::BTreeMap;

/// Cards not in `dead`, in deck order
pub fn unseen(dead: u64) -> Vec<Card> {
    Card::deck().filter(|c| dead & (1u64 << c.value()) == 0).collect()
}

fn rng_for(seed: u64, dead: u64, salt: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed ^ dead.rotate_left(7) ^ salt)
}

/// Up to `samples` distinct opponent hands from the unseen cards.
///
/// All hands are listed when there are no more than `samples` of them.
pub fn opponent_hands(dead: u64, samples: usize, seed: u64) -> Vec<[Card; 2]> {
    let live = unseen(dead);
    let mut all = Vec::with_capacity(live.len() * live.len().saturating_sub(1) / 2);
    for (i, &a) in live.iter().enumerate() {
        for &b in &live[i + 1..] {
            all.push([a, b]);
        }
    }
    if all.len() <= samples {
        return all;
    }
    let mut rng = rng_for(seed, dead, 0xD1A1);
    let mut picks: Vec<usize> = sample(&mut rng, all.len(), samples).into_vec();
    picks.sort_unstable();
    picks.into_iter().map(|i| all[i]).collect()
}

/// Distinct sets of `count` community cards, each sorted.
///
/// Single-card reveals are listed in full when they fit in `samples`;
/// otherwise up to `samples` distinct reveals are drawn.
pub fn reveals(dead: u64, count: usize, samples: usize, seed: u64) -> Vec<Vec<Card>> {
    let live = unseen(dead);
    if count == 0 || live.len() < count {
        return Vec::new();
    }
    if count == 1 && live.len() <= samples {
        return live.into_iter().map(|c| vec![c]).collect();
    }

    let mut rng = rng_for(seed, dead, count as u64);
    let mut drawn: BTreeMap<u64, Vec<Card>> = BTreeMap::new();
    let mut attempts = 0;
    while drawn.len() < samples && attempts < samples * 4 {
        attempts += 1;
        let mut cards: Vec<Card> = sample(&mut rng, live.len(), count).iter().map(|i| live[i]).collect();
        cards.sort();
        drawn.entry(Card::mask(&cards)).or_insert(cards);
    }
    drawn.into_values().collect()
}
