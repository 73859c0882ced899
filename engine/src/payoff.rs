//! Terminal node resolution
//!
//! Payoffs are chips won minus chips invested, per seat, so the two entries
//! of every resolved terminal sum to zero. Showdowns and truncated nodes are
//! the only places the hand evaluator is consulted.

use crate::card::Card;
use crate::config::SolverConfig;
use crate::error::{EngineError, Result};
use crate::evaluator::HandEvaluator;
use crate::node::{GameTree, Hands, Node, NodeId, Payoff, Seat};
use rand::rngs::SmallRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Pot share per seat at a showdown: the whole pot to the better hand, half
/// each on equal ranks.
pub fn showdown_shares<E: HandEvaluator>(
    evaluator: &E,
    pot: f64,
    board: &[Card],
    hands: [[Card; 2]; 2],
) -> Result<[f64; 2]> {
    Ok(match compare(evaluator, board, hands)? {
        Ordering::Greater => [pot, 0.0],
        Ordering::Less => [0.0, pot],
        Ordering::Equal => [pot / 2.0, pot / 2.0],
    })
}

/// Seat zero's hand against seat one's; Greater means seat zero wins.
fn compare<E: HandEvaluator>(evaluator: &E, board: &[Card], hands: [[Card; 2]; 2]) -> Result<Ordering> {
    let rank = |hand: &[Card; 2]| {
        let mut cards = board.to_vec();
        cards.extend_from_slice(hand);
        evaluator.evaluate(&cards)
    };
    let zero = rank(&hands[0])?;
    let one = rank(&hands[1])?;
    // Lower rank value is the stronger hand
    Ok(one.cmp(&zero))
}

/// Seat zero's share of the pot over possible run-outs of `board`.
///
/// Exact for a complete board or one card short; otherwise averaged over
/// `config.equity_samples` seeded run-outs.
pub fn equity<E: HandEvaluator>(
    evaluator: &E,
    board: &[Card],
    hands: [[Card; 2]; 2],
    config: &SolverConfig,
) -> Result<f64> {
    let missing = 5usize.checked_sub(board.len()).ok_or_else(|| {
        EngineError::UnresolvedShowdown(format!("board has {} cards", board.len()))
    })?;
    let score = |ord: Ordering| match ord {
        Ordering::Greater => 1.0,
        Ordering::Equal => 0.5,
        Ordering::Less => 0.0,
    };

    let mut dead = board.to_vec();
    dead.extend_from_slice(&hands[0]);
    dead.extend_from_slice(&hands[1]);
    let dead_mask = Card::mask(&dead);
    if dead_mask.count_ones() as usize != dead.len() {
        return Err(EngineError::UnresolvedShowdown("hole cards collide with board".into()));
    }
    let live: Vec<Card> = Card::deck().filter(|c| dead_mask & (1u64 << c.value()) == 0).collect();

    if missing == 0 {
        return Ok(score(compare(evaluator, board, hands)?));
    }

    let mut runout = board.to_vec();
    if missing == 1 {
        let mut total = 0.0;
        for &card in &live {
            runout.truncate(board.len());
            runout.push(card);
            total += score(compare(evaluator, &runout, hands)?);
        }
        return Ok(total / live.len() as f64);
    }

    let mut rng = SmallRng::seed_from_u64(config.seed ^ dead_mask);
    let mut total = 0.0;
    for _ in 0..config.equity_samples {
        runout.truncate(board.len());
        runout.extend(sample(&mut rng, live.len(), missing).iter().map(|i| live[i]));
        total += score(compare(evaluator, &runout, hands)?);
    }
    Ok(total / config.equity_samples as f64)
}

fn both_hands(hands: &Hands) -> Result<[[Card; 2]; 2]> {
    match hands {
        [Some(a), Some(b)] => Ok([*a, *b]),
        _ => Err(EngineError::UnresolvedShowdown("hole cards unknown at showdown".into())),
    }
}

/// Per-seat payoff of a terminal node
pub fn resolve<E: HandEvaluator>(node: &Node, evaluator: &E, config: &SolverConfig) -> Result<[f64; 2]> {
    resolve_with(node, evaluator, &mut |board: &[Card], hands: [[Card; 2]; 2]| {
        equity(evaluator, board, hands, config)
    })
}

fn resolve_with<E, F>(node: &Node, evaluator: &E, equity_of: &mut F) -> Result<[f64; 2]>
where
    E: HandEvaluator,
    F: FnMut(&[Card], [[Card; 2]; 2]) -> Result<f64>,
{
    let (state, payoff, hands, invested) = match node {
        Node::Terminal { state, payoff, hands, invested, .. } => (state, payoff, hands, invested),
        _ => return Err(EngineError::malformed(format!("node {} is not terminal", node.id()))),
    };
    let pot = state.pot() as f64;
    let shares = match payoff {
        Payoff::Fold { folder } => {
            let mut shares = [0.0; 2];
            shares[folder.opponent().index()] = pot;
            shares
        }
        Payoff::Showdown => showdown_shares(evaluator, pot, state.board(), both_hands(hands)?)?,
        Payoff::Truncated => {
            let eq = equity_of(state.board(), both_hands(hands)?)?;
            [eq * pot, (1.0 - eq) * pot]
        }
    };
    Ok([shares[0] - invested[0], shares[1] - invested[1]])
}

/// Resolve every terminal once, keyed by node, as seat zero's utility.
///
/// Truncated nodes reached by different betting lines share an equity
/// estimate when their board and hands match.
pub fn resolve_all<E: HandEvaluator>(
    tree: &GameTree,
    evaluator: &E,
    config: &SolverConfig,
) -> Result<HashMap<NodeId, f64>> {
    let mut cache: HashMap<(Vec<Card>, [[Card; 2]; 2]), f64> = HashMap::new();
    let mut cached = |board: &[Card], hands: [[Card; 2]; 2]| -> Result<f64> {
        let key = (board.to_vec(), hands);
        if let Some(&eq) = cache.get(&key) {
            return Ok(eq);
        }
        let eq = equity(evaluator, board, hands, config)?;
        cache.insert(key, eq);
        Ok(eq)
    };

    let mut table = HashMap::new();
    for node in tree.nodes.iter().filter(|n| n.is_terminal()) {
        let payoffs = resolve_with(node, evaluator, &mut cached)?;
        table.insert(node.id(), payoffs[Seat::Zero.index()]);
    }
    Ok(table)
}
