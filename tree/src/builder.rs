//! Depth-bounded game tree construction
//!
//! The tree is stored as a flat arena; a node is pushed before its children
//! so the root is always node 0 and every parent id is smaller than its
//! children's.

use crate::chance::{opponent_hands, reveals};
use cfrbot_engine::node::{ChanceEvent, ChanceOutcome, Hands, Payoff};
use cfrbot_engine::{
    Action, Card, Chips, EngineError, GameState, GameTree, InfosetKey, Node, NodeId, Result,
    SolverConfig, Status,
};
use log::debug;

/// Concrete "raise to" amounts for the acting seat, ascending.
///
/// Pot fractions are taken of the pot after calling and added to the current
/// high commitment; the minimum and all-in amounts are always included.
pub fn raise_amounts(state: &GameState, fractions: &[f64]) -> Vec<Chips> {
    let Some((min, max)) = state.raise_range() else {
        return Vec::new();
    };
    let high = state.committed()[state.to_act().opponent().index()];
    let pot_after_call = (state.pot() + state.to_call()) as f64;

    let mut amounts = vec![min, max];
    for &fraction in fractions {
        let to = high as f64 + (fraction * pot_after_call).round();
        amounts.push((to.min(max as f64) as Chips).clamp(min, max));
    }
    amounts.sort_unstable();
    amounts.dedup();
    amounts
}

/// Actions offered at a decision node, in tie-break order
pub fn node_actions(state: &GameState, fractions: &[f64]) -> Vec<Action> {
    let mut actions = Vec::new();
    if state.permits(Action::Fold) {
        actions.push(Action::Fold);
    }
    if state.permits(Action::Call) {
        actions.push(Action::Call);
    }
    actions.extend(raise_amounts(state, fractions).into_iter().map(Action::Raise));
    actions
}

/// Builds the local tree for one decision
pub struct TreeBuilder<'c> {
    config: &'c SolverConfig,
}

impl<'c> TreeBuilder<'c> {
    pub fn new(config: &'c SolverConfig) -> Self {
        TreeBuilder { config }
    }

    /// Build the tree for the seat to act at `state`, holding `hole_cards`.
    ///
    /// The root is a chance node dealing sampled opponent hands; below each
    /// deal the acting seat's first decision shares one information set.
    pub fn build(&self, state: &GameState, hole_cards: [Card; 2], max_depth: usize) -> Result<GameTree> {
        if state.status() != Status::Acting || state.legal().is_empty() {
            return Err(EngineError::malformed("no legal actions at the root"));
        }
        if max_depth == 0 {
            return Err(EngineError::malformed("max_depth must be at least 1"));
        }
        let hero = state.to_act();
        let mut known = state.board().to_vec();
        known.extend_from_slice(&hole_cards);
        let dead = Card::mask(&known);
        if dead.count_ones() as usize != known.len() {
            return Err(EngineError::malformed(format!(
                "hole cards {}{} collide with the board",
                hole_cards[0], hole_cards[1]
            )));
        }

        let root_pot = state.pot() as f64;
        let mut expansion = Expansion {
            config: self.config,
            root_half_pot: root_pot / 2.0,
            root_stacks: state.stacks(),
            max_depth,
            nodes: Vec::new(),
        };

        let root = expansion.push(Node::Chance {
            id: 0,
            parent: None,
            state: state.clone(),
            outcomes: Vec::new(),
        });
        let villains = opponent_hands(dead, self.config.opponent_samples, self.config.seed);
        if villains.is_empty() {
            return Err(EngineError::malformed("no cards left to deal the opponent"));
        }
        let probability = 1.0 / villains.len() as f64;
        let mut outcomes = Vec::with_capacity(villains.len());
        for villain in villains {
            let mut hands: Hands = [None, None];
            hands[hero.index()] = Some(hole_cards);
            hands[hero.opponent().index()] = Some(villain);
            let child = expansion.expand(state.clone(), hands, 0, root)?;
            outcomes.push(ChanceOutcome {
                event: ChanceEvent::Deal {
                    seat: hero.opponent(),
                    cards: villain,
                },
                probability,
                child,
            });
        }
        expansion.set_outcomes(root, outcomes);

        let tree = GameTree {
            nodes: expansion.nodes,
            root_infoset: InfosetKey::new(hero, hole_cards, state),
        };
        let (decisions, chances, terminals) = tree.census();
        debug!(
            "tree: {} nodes ({} decision, {} chance, {} terminal), depth {}",
            tree.len(),
            decisions,
            chances,
            terminals,
            max_depth
        );
        Ok(tree)
    }
}

/// Arena under construction plus the root accounting terminals need
struct Expansion<'c> {
    config: &'c SolverConfig,
    root_half_pot: f64,
    root_stacks: [Chips; 2],
    max_depth: usize,
    nodes: Vec<Node>,
}

impl Expansion<'_> {
    fn push(&mut self, node: Node) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        id
    }

    fn next_id(&self) -> NodeId {
        self.nodes.len() as NodeId
    }

    fn set_outcomes(&mut self, id: NodeId, new: Vec<ChanceOutcome>) {
        if let Some(Node::Chance { outcomes, .. }) = self.nodes.get_mut(id as usize) {
            *outcomes = new;
        }
    }

    fn set_children(&mut self, id: NodeId, new: Vec<NodeId>) {
        if let Some(Node::Decision { children, .. }) = self.nodes.get_mut(id as usize) {
            *children = new;
        }
    }

    /// Chips each seat has at stake in this tree: half the root pot plus what
    /// it added since the root.
    fn invested(&self, state: &GameState) -> [f64; 2] {
        let stacks = state.stacks();
        [0, 1].map(|p| self.root_half_pot + (self.root_stacks[p] as f64 - stacks[p] as f64))
    }

    fn terminal(&mut self, state: GameState, payoff: Payoff, hands: Hands, parent: NodeId) -> NodeId {
        let invested = self.invested(&state);
        let id = self.next_id();
        self.push(Node::Terminal {
            id,
            parent: Some(parent),
            state,
            payoff,
            hands,
            invested,
        })
    }

    /// Expand `state`; a decision found here sits `depth` levels below the root.
    fn expand(&mut self, state: GameState, hands: Hands, depth: usize, parent: NodeId) -> Result<NodeId> {
        match state.status() {
            Status::Folded(folder) => Ok(self.terminal(state, Payoff::Fold { folder }, hands, parent)),
            Status::Closed if state.board().len() == 5 => {
                Ok(self.terminal(state, Payoff::Showdown, hands, parent))
            }
            Status::Closed => self.reveal(state, hands, depth, parent),
            Status::Acting if depth >= self.max_depth => {
                Ok(self.terminal(state, Payoff::Truncated, hands, parent))
            }
            Status::Acting => self.decide(state, hands, depth, parent),
        }
    }

    fn decide(&mut self, state: GameState, hands: Hands, depth: usize, parent: NodeId) -> Result<NodeId> {
        let seat = state.to_act();
        let private = hands[seat.index()]
            .ok_or_else(|| EngineError::malformed(format!("no hole cards for {}", seat)))?;
        let actions = node_actions(&state, &self.config.raise_fractions);
        if actions.is_empty() {
            return Err(EngineError::malformed(format!("no actions for {} at depth {}", seat, depth)));
        }

        let id = self.next_id();
        self.push(Node::Decision {
            id,
            parent: Some(parent),
            infoset: InfosetKey::new(seat, private, &state),
            seat,
            state: state.clone(),
            actions: actions.clone(),
            children: Vec::new(),
        });
        let mut children = Vec::with_capacity(actions.len());
        for action in actions {
            let next = state.apply(action)?;
            children.push(self.expand(next, hands, depth + 1, id)?);
        }
        self.set_children(id, children);
        Ok(id)
    }

    /// Community cards after a closed street: the next street, or the whole
    /// run-out when a seat is all-in.
    fn reveal(&mut self, state: GameState, hands: Hands, depth: usize, parent: NodeId) -> Result<NodeId> {
        let shown = state.board().len();
        let target = match state.street().next() {
            Some(_) if state.is_all_in() => 5,
            Some(next) => next.board_size(),
            None => return Err(EngineError::malformed("closed river has no cards to reveal")),
        };

        let mut known = state.board().to_vec();
        known.extend(hands.iter().flatten().flatten());
        let dead = Card::mask(&known);
        let cards = reveals(dead, target - shown, self.config.chance_samples, self.config.seed);
        if cards.is_empty() {
            return Err(EngineError::malformed("no cards left to reveal"));
        }

        let id = self.next_id();
        self.push(Node::Chance {
            id,
            parent: Some(parent),
            state: state.clone(),
            outcomes: Vec::new(),
        });
        let probability = 1.0 / cards.len() as f64;
        let mut outcomes = Vec::with_capacity(cards.len());
        for reveal in cards {
            let next = state.deal(&reveal)?;
            let child = self.expand(next, hands, depth, id)?;
            outcomes.push(ChanceOutcome {
                event: ChanceEvent::Reveal(reveal),
                probability,
                child,
            });
        }
        self.set_outcomes(id, outcomes);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfrbot_engine::payoff::resolve;
    use cfrbot_engine::{CactusKevEvaluator, LegalAction, Seat, Snapshot};

    fn facing_turn_bet() -> GameState {
        GameState::from_snapshot(Snapshot {
            pot: 20,
            stacks: [100, 100],
            committed: [0, 10],
            board: Card::parse_many("Ad Kc 7h 2s").unwrap(),
            to_act: Seat::Zero,
            button: Seat::Zero,
            big_blind: 10,
            opponent_acted: true,
            legal: vec![
                LegalAction::Fold,
                LegalAction::Call { amount: 10 },
                LegalAction::Raise { min: 20, max: 100 },
            ],
        })
        .unwrap()
    }

    fn aces() -> [Card; 2] {
        let c = Card::parse_many("As Ah").unwrap();
        [c[0], c[1]]
    }

    fn small_config() -> SolverConfig {
        SolverConfig {
            opponent_samples: 4,
            chance_samples: 4,
            ..SolverConfig::default()
        }
    }

    #[test]
    fn test_raise_amounts() {
        // Pot after calling is 30; half pot raises to 25, pot to 40
        let amounts = raise_amounts(&facing_turn_bet(), &[0.5, 1.0]);
        assert_eq!(amounts, vec![20, 25, 40, 100]);
        // Oversized fractions clamp to all-in
        assert_eq!(raise_amounts(&facing_turn_bet(), &[10.0]), vec![20, 100]);
    }

    #[test]
    fn test_closed_state_is_malformed() {
        let config = small_config();
        let closed = facing_turn_bet().apply(Action::Call).unwrap();
        let result = TreeBuilder::new(&config).build(&closed, aces(), 2);
        assert!(matches!(result, Err(EngineError::MalformedState(_))));
    }

    #[test]
    fn test_hole_cards_on_board_are_malformed() {
        let config = small_config();
        let c = Card::parse_many("Ad Ah").unwrap();
        let result = TreeBuilder::new(&config).build(&facing_turn_bet(), [c[0], c[1]], 2);
        assert!(result.is_err());
    }

    #[test]
    fn test_root_actions_round_trip() {
        let config = small_config();
        let state = facing_turn_bet();
        let tree = TreeBuilder::new(&config).build(&state, aces(), 2).unwrap();

        let roots: Vec<&Node> = tree.root_decisions().collect();
        assert_eq!(roots.len(), 4);
        for node in roots {
            let Node::Decision { id, actions, .. } = node else {
                panic!("root decision expected");
            };
            assert_eq!(actions, &vec![
                Action::Fold,
                Action::Call,
                Action::Raise(20),
                Action::Raise(25),
                Action::Raise(40),
                Action::Raise(100),
            ]);
            for &action in actions {
                let expected = state.apply(action).unwrap();
                assert_eq!(tree.child_state(*id, action), Some(&expected));
            }
        }
    }

    #[test]
    fn test_terminals_are_zero_sum() {
        let config = small_config();
        let tree = TreeBuilder::new(&config).build(&facing_turn_bet(), aces(), 3).unwrap();
        let eval = CactusKevEvaluator::new();
        let mut seen = [false; 3];
        for node in tree.nodes.iter().filter(|n| n.is_terminal()) {
            let payoffs = resolve(node, &eval, &config).unwrap();
            assert!((payoffs[0] + payoffs[1]).abs() < 1e-9, "node {}: {:?}", node.id(), payoffs);
            if let Node::Terminal { payoff, .. } = node {
                let slot = match payoff {
                    Payoff::Fold { .. } => 0,
                    Payoff::Showdown => 1,
                    Payoff::Truncated => 2,
                };
                seen[slot] = true;
            }
        }
        assert_eq!(seen, [true, true, true]);
    }

    #[test]
    fn test_depth_one_truncates_every_reply() {
        let config = small_config();
        let tree = TreeBuilder::new(&config).build(&facing_turn_bet(), aces(), 1).unwrap();
        // Only the root decisions survive; everything after them is terminal
        // or a river reveal feeding truncated nodes.
        let decisions = tree.nodes.iter().filter(|n| n.is_decision()).count();
        assert_eq!(decisions, 4);
        for node in &tree.nodes {
            if let Some(parent) = node.parent() {
                assert!(parent < node.id());
            }
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let config = small_config();
        let a = TreeBuilder::new(&config).build(&facing_turn_bet(), aces(), 2).unwrap();
        let b = TreeBuilder::new(&config).build(&facing_turn_bet(), aces(), 2).unwrap();
        assert_eq!(a.census(), b.census());
        let events = |t: &GameTree| match t.root() {
            Some(Node::Chance { outcomes, .. }) => outcomes.iter().map(|o| o.event.clone()).collect::<Vec<_>>(),
            _ => Vec::new(),
        };
        assert_eq!(events(&a), events(&b));
    }

    #[test]
    fn test_all_in_runs_out_board() {
        let config = small_config();
        let state = facing_turn_bet();
        let tree = TreeBuilder::new(&config).build(&state, aces(), 3).unwrap();
        // Shove then call: both all-in on the turn, river dealt, showdown
        let shove_called = tree.nodes.iter().any(|n| match n {
            Node::Terminal { state, payoff: Payoff::Showdown, .. } => {
                state.is_all_in() && state.history() == [Action::Raise(100), Action::Call]
            }
            _ => false,
        });
        assert!(shove_called);
    }
}
