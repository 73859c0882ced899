//! What the host hands over for one decision, and what it gets back

use cfrbot_engine::{Card, Chips, GameState, LegalAction, Result, Seat, Snapshot};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Read-only view of the table at the moment a seat must act
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRequest {
    /// Seat that must act
    pub seat: Seat,
    pub hole_cards: [Card; 2],
    pub board: Vec<Card>,
    /// Chips in the middle, including this street's commitments
    pub pot: Chips,
    pub stacks: [Chips; 2],
    /// Chips each seat has put in on this street
    pub committed: [Chips; 2],
    pub big_blind: Chips,
    pub button: Seat,
    /// Whether the other seat has already acted on this street
    pub opponent_acted: bool,
    pub legal: Vec<LegalAction>,
}

impl DecisionRequest {
    /// Validated betting state for the acting seat
    pub fn state(&self) -> Result<GameState> {
        GameState::from_snapshot(Snapshot {
            pot: self.pot,
            stacks: self.stacks,
            committed: self.committed,
            board: self.board.clone(),
            to_act: self.seat,
            button: self.button,
            big_blind: self.big_blind,
            opponent_acted: self.opponent_acted,
            legal: self.legal.clone(),
        })
    }

    /// The raise range, if raising is legal
    pub fn raise_range(&self) -> Option<(Chips, Chips)> {
        self.legal.iter().find_map(|legal| match *legal {
            LegalAction::Raise { min, max } => Some((min, max)),
            _ => None,
        })
    }

    /// Chips needed to call, if calling is legal
    pub fn call_amount(&self) -> Option<Chips> {
        self.legal.iter().find_map(|legal| match *legal {
            LegalAction::Call { amount } => Some(amount),
            _ => None,
        })
    }

    pub fn can_fold(&self) -> bool {
        self.legal.contains(&LegalAction::Fold)
    }
}

/// Action label understood by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionLabel {
    Fold,
    Call,
    Raise,
}

impl fmt::Display for ActionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionLabel::Fold => "fold",
            ActionLabel::Call => "call",
            ActionLabel::Raise => "raise",
        };
        f.write_str(name)
    }
}

/// The single answer to a [`DecisionRequest`]; `amount` is 0 unless raising
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAction {
    pub label: ActionLabel,
    pub amount: Chips,
}

impl ExternalAction {
    pub fn fold() -> Self {
        ExternalAction {
            label: ActionLabel::Fold,
            amount: 0,
        }
    }

    pub fn call() -> Self {
        ExternalAction {
            label: ActionLabel::Call,
            amount: 0,
        }
    }

    pub fn raise(to: Chips) -> Self {
        ExternalAction {
            label: ActionLabel::Raise,
            amount: to,
        }
    }
}

impl fmt::Display for ExternalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label {
            ActionLabel::Raise => write!(f, "raise:{}", self.amount),
            label => write!(f, "{}", label),
        }
    }
}
