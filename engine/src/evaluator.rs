//! Hand evaluator using Cactus Kev equivalence classes
//!
//! Every 5-card hand maps to one of 7462 equivalence classes, numbered 1
//! (royal flush) through 7462 (seven-high). Six and seven card hands take
//! the best of their 5-card subsets.
//!
//! Two paths, as in the classic evaluator:
//! - Rank-bit mask plus per-suit masks for flushes, straights and high cards
//! - Rank multiplicities for paired hands

use crate::card::Card;
use crate::error::{EngineError, Result};

/// Hand rank for poker evaluation
///
/// Lower values represent stronger hands (Royal Flush = 1, worst High Card = 7462).
/// Equal values are exact ties and split the pot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandRank(u16);

impl HandRank {
    /// Weakest possible rank value
    pub const WORST: u16 = 7462;

    /// Create a new hand rank
    pub fn new(rank: u16) -> Self {
        HandRank(rank)
    }

    /// Get the raw rank value
    pub fn value(self) -> u16 {
        self.0
    }

    /// True if this hand beats `other`
    pub fn beats(self, other: HandRank) -> bool {
        self.0 < other.0
    }

    pub fn category(self) -> HandCategory {
        match self.0 {
            0..=10 => HandCategory::StraightFlush,
            11..=166 => HandCategory::FourOfAKind,
            167..=322 => HandCategory::FullHouse,
            323..=1599 => HandCategory::Flush,
            1600..=1609 => HandCategory::Straight,
            1610..=2467 => HandCategory::ThreeOfAKind,
            2468..=3325 => HandCategory::TwoPair,
            3326..=6185 => HandCategory::OnePair,
            _ => HandCategory::HighCard,
        }
    }
}

/// Hand category, strongest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HandCategory {
    StraightFlush,
    FourOfAKind,
    FullHouse,
    Flush,
    Straight,
    ThreeOfAKind,
    TwoPair,
    OnePair,
    HighCard,
}

/// Hand evaluator trait
///
/// Called only while resolving terminal nodes. Implementations must be total
/// over any 5-7 distinct cards and must signal anything else as an
/// unresolved showdown rather than guess.
pub trait HandEvaluator {
    /// Rank the best 5-card hand contained in `cards`
    fn evaluate(&self, cards: &[Card]) -> Result<HandRank>;
}

/// Cactus Kev evaluator implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct CactusKevEvaluator;

impl CactusKevEvaluator {
    /// Create a new Cactus Kev evaluator
    pub fn new() -> Self {
        CactusKevEvaluator
    }

    /// Evaluate a 7-card hand (5 board + 2 hole cards)
    ///
    /// Returns the best 5-card hand rank by checking all 21 possible 5-card combinations.
    pub fn evaluate_7cards(&self, board: [Card; 5], hand: [Card; 2]) -> HandRank {
        let all_cards = [board[0], board[1], board[2], board[3], board[4], hand[0], hand[1]];
        HandRank::new(best_of(&all_cards))
    }

    /// Rank a 5-card hand
    ///
    /// 1. Build the rank-bit mask and per-suit masks
    /// 2. Five distinct ranks: straight / flush / high-card path
    /// 3. Otherwise: rank multiplicities decide the paired category
    fn rank_5cards(&self, cards: [Card; 5]) -> u16 {
        rank_five(cards)
    }
}

impl HandEvaluator for CactusKevEvaluator {
    fn evaluate(&self, cards: &[Card]) -> Result<HandRank> {
        if !(5..=7).contains(&cards.len()) {
            return Err(EngineError::UnresolvedShowdown(format!(
                "cannot rank {} cards (need 5-7)",
                cards.len()
            )));
        }
        if Card::mask(cards).count_ones() as usize != cards.len() {
            return Err(EngineError::UnresolvedShowdown(format!(
                "duplicate card in {}",
                cards.iter().map(Card::to_string).collect::<Vec<_>>().join(" ")
            )));
        }
        if cards.len() == 5 {
            return Ok(HandRank::new(
                self.rank_5cards([cards[0], cards[1], cards[2], cards[3], cards[4]]),
            ));
        }
        Ok(HandRank::new(best_of(cards)))
    }
}

/// Minimum class over all 5-card subsets of 5-7 cards.
fn best_of(cards: &[Card]) -> u16 {
    let n = cards.len();
    let mut best_rank = u16::MAX;
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                for l in (k + 1)..n {
                    for m in (l + 1)..n {
                        let rank = rank_five([cards[i], cards[j], cards[k], cards[l], cards[m]]);
                        best_rank = best_rank.min(rank);
                    }
                }
            }
        }
    }
    best_rank
}

fn rank_five(cards: [Card; 5]) -> u16 {
    let mut suit_masks = [0u16; 4];
    let mut counts = [0u8; 13];
    for card in cards.iter() {
        suit_masks[card.suit() as usize] |= 1u16 << card.rank();
        counts[card.rank() as usize] += 1;
    }
    let rank_mask = suit_masks.iter().fold(0u16, |m, s| m | s);
    let flush = suit_masks.iter().any(|m| m.count_ones() == 5);

    if rank_mask.count_ones() == 5 {
        return match (flush, tables::straight_high(rank_mask)) {
            (true, Some(high)) => 1 + (12 - high) as u16,
            (false, Some(high)) => 1600 + (12 - high) as u16,
            (true, None) => 323 + tables::distinct_class(rank_mask),
            (false, None) => 6186 + tables::distinct_class(rank_mask),
        };
    }
    tables::paired_class(&counts)
}

mod tables {
    //! Closed-form equivalence class indices
    //!
    //! Subsets of ranks are indexed with the combinatorial number system, whose
    //! colex order coincides with poker's high-card-first comparison.

    /// Binomial coefficient for the small arguments used here
    pub(crate) fn choose(n: u16, k: u16) -> u16 {
        if k > n {
            return 0;
        }
        let mut acc: u32 = 1;
        for i in 0..k as u32 {
            acc = acc * (n as u32 - i) / (i + 1);
        }
        acc as u16
    }

    /// The ten straight masks, ace-high first
    pub(crate) const STRAIGHTS: [u16; 10] = [
        0x1F00, 0x0F80, 0x07C0, 0x03E0, 0x01F0, 0x00F8, 0x007C, 0x003E, 0x001F, 0x100F,
    ];

    /// Highest rank of a five-rank straight mask; the wheel plays five-high.
    pub(crate) fn straight_high(rank_mask: u16) -> Option<u8> {
        STRAIGHTS
            .iter()
            .position(|&s| s == rank_mask)
            .map(|i| 12 - i as u8)
    }

    /// Class offset among the 1277 non-straight five-distinct-rank hands
    pub(crate) fn distinct_class(rank_mask: u16) -> u16 {
        let ranks = descending(rank_mask);
        let index = colex(&ranks);
        let straights_above = STRAIGHTS.iter().filter(|&&s| s > rank_mask).count() as u16;
        (choose(13, 5) - 1 - index) - straights_above
    }

    /// Class for hands with at least one repeated rank
    pub(crate) fn paired_class(counts: &[u8; 13]) -> u16 {
        let mut groups: Vec<(u8, u8)> = (0..13u8)
            .rev()
            .filter(|&r| counts[r as usize] > 0)
            .map(|r| (counts[r as usize], r))
            .collect();
        groups.sort_by(|a, b| b.cmp(a));
        let shape: Vec<u8> = groups.iter().map(|g| g.0).collect();
        let ranks: Vec<u8> = groups.iter().map(|g| g.1).collect();

        match shape.as_slice() {
            [4, 1] => {
                let (quad, kicker) = (ranks[0], ranks[1]);
                11 + (12 - quad) as u16 * 12 + (11 - reindex(kicker, &[quad])) as u16
            }
            [3, 2] => {
                let (trips, pair) = (ranks[0], ranks[1]);
                167 + (12 - trips) as u16 * 12 + (11 - reindex(pair, &[trips])) as u16
            }
            [3, 1, 1] => {
                let trips = ranks[0];
                let kickers = [reindex(ranks[1], &[trips]), reindex(ranks[2], &[trips])];
                1610 + (12 - trips) as u16 * 66 + (65 - colex(&kickers))
            }
            [2, 2, 1] => {
                let (high, low, kicker) = (ranks[0], ranks[1], ranks[2]);
                let pairs = colex(&[high, low]);
                2468 + (77 - pairs) * 11 + (10 - reindex(kicker, &[high, low])) as u16
            }
            _ => {
                let pair = ranks[0];
                let kickers = [
                    reindex(ranks[1], &[pair]),
                    reindex(ranks[2], &[pair]),
                    reindex(ranks[3], &[pair]),
                ];
                3326 + (12 - pair) as u16 * 220 + (219 - colex(&kickers))
            }
        }
    }

    /// Position of `rank` once the `excluded` ranks are removed from the ladder
    fn reindex(rank: u8, excluded: &[u8]) -> u8 {
        rank - excluded.iter().filter(|&&e| e < rank).count() as u8
    }

    /// Combinatorial index of a strictly descending rank list
    fn colex(ranks: &[u8]) -> u16 {
        let k = ranks.len() as u16;
        ranks
            .iter()
            .enumerate()
            .map(|(i, &r)| choose(r as u16, k - i as u16))
            .sum()
    }

    fn descending(rank_mask: u16) -> Vec<u8> {
        (0..13u8).rev().filter(|r| rank_mask & (1 << r) != 0).collect()
    }
}

/// Benchmark helper for CLI
///
/// Evaluates `sample_size` pseudo-random 7-card hands and returns
/// (evals_per_sec, duration_ms)
pub fn benchmark_throughput(sample_size: usize) -> (f64, u64) {
    use rand::rngs::SmallRng;
    use rand::seq::index::sample;
    use rand::SeedableRng;
    use std::time::Instant;

    let evaluator = CactusKevEvaluator::new();
    let mut rng = SmallRng::seed_from_u64(12345);

    let hands: Vec<[Card; 7]> = (0..sample_size)
        .map(|_| {
            let picks = sample(&mut rng, 52, 7);
            let mut cards = [Card::new(0); 7];
            for (slot, value) in cards.iter_mut().zip(picks.iter()) {
                *slot = Card::new(value as u8);
            }
            cards
        })
        .collect();

    let start = Instant::now();
    let mut checksum = 0u64;
    for hand in &hands {
        checksum += best_of(hand) as u64;
    }
    let duration = start.elapsed();
    log::debug!("benchmark checksum {}", checksum);

    let evals_per_sec = sample_size as f64 / duration.as_secs_f64();
    (evals_per_sec, duration.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::seq::index::sample;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn make_card(suit: u8, rank: u8) -> Card {
        // suit: 0=spades, 1=hearts, 2=diamonds, 3=clubs
        // rank: 0=2, 1=3, ..., 12=A
        Card::new(suit * 13 + rank)
    }

    fn eval7(board: [Card; 5], hand: [Card; 2]) -> HandRank {
        CactusKevEvaluator::new().evaluate_7cards(board, hand)
    }

    #[test]
    fn test_hand_rank_ordering() {
        let royal_flush = eval7(
            [make_card(0, 12), make_card(0, 11), make_card(0, 10), make_card(0, 9), make_card(0, 8)],
            [make_card(1, 7), make_card(1, 6)],
        );
        let straight_flush = eval7(
            [make_card(0, 11), make_card(0, 10), make_card(0, 9), make_card(0, 8), make_card(0, 7)],
            [make_card(1, 5), make_card(1, 4)],
        );
        let four_of_a_kind = eval7(
            [make_card(0, 12), make_card(1, 12), make_card(2, 12), make_card(3, 12), make_card(0, 11)],
            [make_card(1, 10), make_card(2, 9)],
        );
        let full_house = eval7(
            [make_card(0, 12), make_card(1, 12), make_card(2, 12), make_card(0, 11), make_card(1, 11)],
            [make_card(2, 10), make_card(3, 9)],
        );
        let flush = eval7(
            [make_card(0, 12), make_card(0, 10), make_card(0, 8), make_card(0, 6), make_card(0, 4)],
            [make_card(1, 11), make_card(2, 9)],
        );
        let straight = eval7(
            [make_card(0, 11), make_card(1, 10), make_card(2, 9), make_card(3, 8), make_card(0, 7)],
            [make_card(1, 2), make_card(2, 1)],
        );
        let three_of_a_kind = eval7(
            [make_card(0, 12), make_card(1, 12), make_card(2, 12), make_card(0, 11), make_card(1, 9)],
            [make_card(2, 7), make_card(3, 6)],
        );
        let two_pair = eval7(
            [make_card(0, 12), make_card(1, 12), make_card(0, 11), make_card(1, 11), make_card(0, 9)],
            [make_card(2, 7), make_card(3, 6)],
        );
        let one_pair = eval7(
            [make_card(0, 12), make_card(1, 12), make_card(0, 11), make_card(1, 9), make_card(2, 7)],
            [make_card(3, 6), make_card(0, 4)],
        );
        let high_card = eval7(
            [make_card(0, 12), make_card(1, 11), make_card(2, 9), make_card(3, 7), make_card(0, 6)],
            [make_card(1, 4), make_card(2, 2)],
        );

        assert_eq!(royal_flush.category(), HandCategory::StraightFlush);
        assert_eq!(straight.category(), HandCategory::Straight);
        assert_eq!(high_card.category(), HandCategory::HighCard);

        // Lower HandRank value = stronger hand
        assert!(royal_flush < straight_flush, "Royal flush should beat straight flush");
        assert!(straight_flush < four_of_a_kind, "Straight flush should beat four of a kind");
        assert!(four_of_a_kind < full_house, "Four of a kind should beat full house");
        assert!(full_house < flush, "Full house should beat flush");
        assert!(flush < straight, "Flush should beat straight");
        assert!(straight < three_of_a_kind, "Straight should beat three of a kind");
        assert!(three_of_a_kind < two_pair, "Three of a kind should beat two pair");
        assert!(two_pair < one_pair, "Two pair should beat one pair");
        assert!(one_pair < high_card, "One pair should beat high card");
    }

    #[test]
    fn test_known_hands() {
        let royal = eval7(
            [make_card(0, 12), make_card(0, 11), make_card(0, 10), make_card(0, 9), make_card(0, 8)],
            [make_card(1, 7), make_card(1, 6)],
        );
        assert_eq!(royal.value(), 1, "Royal flush should have rank 1");

        let seven_high = CactusKevEvaluator::new()
            .evaluate(&[make_card(0, 5), make_card(1, 3), make_card(2, 2), make_card(3, 1), make_card(0, 0)])
            .unwrap();
        assert_eq!(seven_high.value(), HandRank::WORST);

        let quads = eval7(
            [make_card(0, 12), make_card(1, 12), make_card(2, 12), make_card(3, 12), make_card(0, 11)],
            [make_card(1, 10), make_card(2, 9)],
        );
        assert_eq!(quads.value(), 11, "AAAA with a king kicker is the best quads");
    }

    #[test]
    fn test_wheel_is_lowest_straight() {
        let eval = CactusKevEvaluator::new();
        let wheel = eval
            .evaluate(&[make_card(0, 12), make_card(1, 0), make_card(2, 1), make_card(3, 2), make_card(0, 3)])
            .unwrap();
        let six_high = eval
            .evaluate(&[make_card(0, 4), make_card(1, 0), make_card(2, 1), make_card(3, 2), make_card(0, 3)])
            .unwrap();
        assert_eq!(wheel.value(), 1609);
        assert!(six_high.beats(wheel));
    }

    #[test]
    fn test_relative_ordering() {
        let aces = eval7(
            [make_card(0, 12), make_card(1, 12), make_card(0, 11), make_card(1, 10), make_card(2, 9)],
            [make_card(3, 7), make_card(0, 6)],
        );
        let kings = eval7(
            [make_card(0, 11), make_card(1, 11), make_card(0, 10), make_card(1, 9), make_card(2, 8)],
            [make_card(3, 6), make_card(0, 5)],
        );
        assert!(aces < kings, "Pair of Aces should beat pair of Kings");
    }

    #[test]
    fn test_consistency() {
        let hand1 = eval7(
            [make_card(0, 12), make_card(1, 11), make_card(2, 10), make_card(3, 9), make_card(0, 8)],
            [make_card(1, 7), make_card(2, 6)],
        );
        let hand2 = eval7(
            [make_card(2, 10), make_card(0, 12), make_card(1, 11), make_card(0, 8), make_card(3, 9)],
            [make_card(2, 6), make_card(1, 7)],
        );
        assert_eq!(hand1.value(), hand2.value(), "Same cards in different order should have same rank");
    }

    #[test]
    fn test_board_plays_is_a_tie() {
        let board = [make_card(0, 12), make_card(0, 11), make_card(0, 10), make_card(0, 9), make_card(0, 8)];
        let a = eval7(board, [make_card(1, 0), make_card(2, 1)]);
        let b = eval7(board, [make_card(3, 0), make_card(1, 1)]);
        assert_eq!(a, b);
        assert!(!a.beats(b) && !b.beats(a));
    }

    #[test]
    fn test_every_equivalence_class_is_reached() {
        let eval = CactusKevEvaluator::new();
        let mut seen = HashSet::new();

        // Every multiset of five ranks with at most four copies of each
        fn walk(start: u8, left: usize, acc: &mut Vec<u8>, out: &mut Vec<Vec<u8>>) {
            if left == 0 {
                out.push(acc.clone());
                return;
            }
            for r in start..13 {
                if acc.iter().filter(|&&x| x == r).count() < 4 {
                    acc.push(r);
                    walk(r, left - 1, acc, out);
                    acc.pop();
                }
            }
        }
        let mut multisets = Vec::new();
        walk(0, 5, &mut Vec::new(), &mut multisets);

        for ranks in multisets {
            let distinct = ranks.windows(2).all(|w| w[0] != w[1]);
            if distinct {
                let offsuit: Vec<Card> = ranks
                    .iter()
                    .zip([0u8, 1, 2, 3, 0])
                    .map(|(&r, s)| make_card(s, r))
                    .collect();
                let suited: Vec<Card> = ranks.iter().map(|&r| make_card(0, r)).collect();
                seen.insert(eval.evaluate(&offsuit).unwrap().value());
                seen.insert(eval.evaluate(&suited).unwrap().value());
            } else {
                let cards: Vec<Card> = ranks
                    .iter()
                    .enumerate()
                    .map(|(i, &r)| {
                        let occ = ranks[..i].iter().filter(|&&x| x == r).count() as u8;
                        make_card(occ, r)
                    })
                    .collect();
                seen.insert(eval.evaluate(&cards).unwrap().value());
            }
        }

        assert_eq!(seen.len(), 7462);
        assert_eq!(seen.iter().min(), Some(&1));
        assert_eq!(seen.iter().max(), Some(&7462));
    }

    #[test]
    fn test_large_sample_category_validation() {
        let eval = CactusKevEvaluator::new();

        let mut rng = SmallRng::seed_from_u64(12345);

        for _ in 0..2000 {
            let cards: Vec<Card> = sample(&mut rng, 52, 7).iter().map(|v| Card::new(v as u8)).collect();
            let rank = eval.evaluate(&cards).unwrap();

            let mut rank_counts = vec![0u8; 13];
            for card in &cards {
                rank_counts[card.rank() as usize] += 1;
            }
            rank_counts.sort();
            rank_counts.reverse();

            // A made category can only improve on the paired shape
            if rank_counts[0] == 4 {
                assert!(rank.category() <= HandCategory::FourOfAKind);
            } else if rank_counts[0] == 3 && rank_counts[1] >= 2 {
                assert!(rank.category() <= HandCategory::FullHouse);
            } else if rank_counts[0] == 3 {
                assert!(rank.category() <= HandCategory::ThreeOfAKind);
            } else if rank_counts[0] == 2 && rank_counts[1] == 2 {
                assert!(rank.category() <= HandCategory::TwoPair);
            } else if rank_counts[0] == 2 {
                assert!(rank.category() <= HandCategory::OnePair);
            }
            assert!(rank.value() >= 1 && rank.value() <= HandRank::WORST);
        }
    }

    #[test]
    fn test_rejects_wrong_sizes_and_duplicates() {
        let eval = CactusKevEvaluator::new();
        let four = [make_card(0, 1), make_card(0, 2), make_card(0, 3), make_card(0, 4)];
        assert!(matches!(eval.evaluate(&four), Err(EngineError::UnresolvedShowdown(_))));

        let dup = [make_card(0, 1), make_card(0, 1), make_card(0, 3), make_card(0, 4), make_card(1, 5)];
        assert!(matches!(eval.evaluate(&dup), Err(EngineError::UnresolvedShowdown(_))));
    }
}
