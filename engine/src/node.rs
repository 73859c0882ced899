//! Node definitions for the game tree
//!
//! This module defines the core Node types that represent positions in the
//! local decision tree. Nodes are immutable once built and separate from
//! solver state (regrets, strategies), which lives in [`crate::infoset`].

use crate::card::Card;
use crate::infoset::InfosetKey;
use crate::state::{Chips, GameState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seat at a heads-up table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Seat {
    Zero,
    One,
}

impl Seat {
    /// Get the opponent of this seat
    pub fn opponent(self) -> Seat {
        match self {
            Seat::Zero => Seat::One,
            Seat::One => Seat::Zero,
        }
    }

    /// Array index (0 or 1)
    pub fn index(self) -> usize {
        match self {
            Seat::Zero => 0,
            Seat::One => 1,
        }
    }

    /// Sign applied to a seat-zero utility to view it from this seat
    pub fn sign(self) -> f64 {
        match self {
            Seat::Zero => 1.0,
            Seat::One => -1.0,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.index())
    }
}

/// Betting street
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Street {
    /// No board cards
    Preflop,
    /// 3 board cards
    Flop,
    /// 4 board cards
    Turn,
    /// 5 board cards
    River,
}

impl Street {
    /// Number of community cards visible on this street
    pub fn board_size(self) -> usize {
        match self {
            Street::Preflop => 0,
            Street::Flop => 3,
            Street::Turn => 4,
            Street::River => 5,
        }
    }

    /// Street implied by a board of `len` cards
    pub fn from_board_size(len: usize) -> Option<Street> {
        match len {
            0 => Some(Street::Preflop),
            3 => Some(Street::Flop),
            4 => Some(Street::Turn),
            5 => Some(Street::River),
            _ => None,
        }
    }

    pub fn next(self) -> Option<Street> {
        match self {
            Street::Preflop => Some(Street::Flop),
            Street::Flop => Some(Street::Turn),
            Street::Turn => Some(Street::River),
            Street::River => None,
        }
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Street::Preflop => "preflop",
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
        };
        f.write_str(name)
    }
}

/// Action available at a decision node
///
/// The derived ordering (Fold < Call < Raise, smaller raises first) is the
/// tie-break order used when selecting among equally weighted actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    /// Give up the pot
    Fold,
    /// Match the current bet; a check when nothing is owed
    Call,
    /// Raise so the actor's street commitment becomes this many chips
    Raise(Chips),
}

impl Action {
    pub fn is_raise(&self) -> bool {
        matches!(self, Action::Raise(_))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Fold => f.write_str("F"),
            Action::Call => f.write_str("C"),
            Action::Raise(to) => write!(f, "R{}", to),
        }
    }
}

/// Node ID type (index into flat array storage)
pub type NodeId = u32;

/// Private hole cards per seat, `None` where unknown
pub type Hands = [Option<[Card; 2]>; 2];

/// What a chance node reveals
#[derive(Debug, Clone, PartialEq)]
pub enum ChanceEvent {
    /// Hidden hole cards for a seat
    Deal { seat: Seat, cards: [Card; 2] },
    /// Community cards
    Reveal(Vec<Card>),
}

/// One branch of a chance node
#[derive(Debug, Clone, PartialEq)]
pub struct ChanceOutcome {
    pub event: ChanceEvent,
    pub probability: f64,
    pub child: NodeId,
}

/// How a terminal node pays out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payoff {
    /// The named seat folded; the opponent takes the pot
    Fold { folder: Seat },
    /// Both hands are compared on a complete board
    Showdown,
    /// Depth limit reached; paid by equity estimate
    Truncated,
}

/// Represents a node in the game tree
///
/// Each node owns the game state it represents. Children are owned by index
/// into the tree's flat array; the whole arena is dropped after the decision.
#[derive(Debug, Clone)]
pub enum Node {
    /// Decision node where a seat must act
    Decision {
        /// Unique identifier for this node (index in flat array)
        id: NodeId,
        /// Parent node ID (None for root)
        parent: Option<NodeId>,
        /// Information set the acting seat sees here
        infoset: InfosetKey,
        /// Seat to act
        seat: Seat,
        /// Game state at this node
        state: GameState,
        /// Available actions, in tie-break order
        actions: Vec<Action>,
        /// Child node IDs parallel to `actions`
        children: Vec<NodeId>,
    },
    /// Chance node where cards are dealt
    Chance {
        id: NodeId,
        parent: Option<NodeId>,
        /// State before the cards are dealt
        state: GameState,
        outcomes: Vec<ChanceOutcome>,
    },
    /// Terminal node (fold, showdown or truncation)
    Terminal {
        id: NodeId,
        parent: Option<NodeId>,
        state: GameState,
        payoff: Payoff,
        /// Hole cards for each seat, indexed by [`Seat::index`]
        hands: Hands,
        /// Chips each seat has staked in this tree's accounting, including an
        /// even split of the pot that existed when the tree was built
        invested: [f64; 2],
    },
}

impl Node {
    /// Get the node ID
    pub fn id(&self) -> NodeId {
        match self {
            Node::Decision { id, .. } => *id,
            Node::Chance { id, .. } => *id,
            Node::Terminal { id, .. } => *id,
        }
    }

    /// Get the parent node ID
    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Decision { parent, .. } => *parent,
            Node::Chance { parent, .. } => *parent,
            Node::Terminal { parent, .. } => *parent,
        }
    }

    /// Game state this node represents
    pub fn state(&self) -> &GameState {
        match self {
            Node::Decision { state, .. } => state,
            Node::Chance { state, .. } => state,
            Node::Terminal { state, .. } => state,
        }
    }

    /// Get the information set key (only for Decision nodes)
    pub fn infoset(&self) -> Option<&InfosetKey> {
        match self {
            Node::Decision { infoset, .. } => Some(infoset),
            _ => None,
        }
    }

    /// Check if this is a terminal node
    pub fn is_terminal(&self) -> bool {
        matches!(self, Node::Terminal { .. })
    }

    /// Check if this is a decision node
    pub fn is_decision(&self) -> bool {
        matches!(self, Node::Decision { .. })
    }
}

/// Game tree wrapper
///
/// Contains a flat array of nodes; node 0 is the root.
#[derive(Debug, Clone)]
pub struct GameTree {
    /// Flat array of nodes indexed by NodeId
    pub nodes: Vec<Node>,
    /// Information set of the seat the tree was built for, at its first decision
    pub root_infoset: InfosetKey,
}

impl GameTree {
    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    /// The root node (node 0)
    pub fn root(&self) -> Option<&Node> {
        self.get(0)
    }

    /// Get the number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Decision nodes that belong to the root information set
    pub fn root_decisions(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .filter(move |n| n.infoset() == Some(&self.root_infoset))
    }

    /// State reached from decision node `id` by taking `action`
    pub fn child_state(&self, id: NodeId, action: Action) -> Option<&GameState> {
        match self.get(id)? {
            Node::Decision { actions, children, .. } => {
                let idx = actions.iter().position(|&a| a == action)?;
                self.get(children[idx]).map(Node::state)
            }
            _ => None,
        }
    }

    /// Count of (decision, chance, terminal) nodes
    pub fn census(&self) -> (usize, usize, usize) {
        self.nodes.iter().fold((0, 0, 0), |(d, c, t), n| match n {
            Node::Decision { .. } => (d + 1, c, t),
            Node::Chance { .. } => (d, c + 1, t),
            Node::Terminal { .. } => (d, c, t + 1),
        })
    }
}
