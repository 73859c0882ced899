//! Immutable betting state
//!
//! A [`GameState`] is created once per decision request from a [`Snapshot`]
//! and never mutated afterwards. Tree construction derives child states with
//! [`GameState::apply`] and [`GameState::deal`].

use crate::card::Card;
use crate::error::{EngineError, Result};
use crate::node::{Action, Seat, Street};
use serde::{Deserialize, Serialize};

/// Chip amounts
pub type Chips = u32;

/// Legal action as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LegalAction {
    Fold,
    /// Call (or check when `amount` is 0); `amount` is the chips added
    Call { amount: Chips },
    /// Raise to any street commitment in `[min, max]`
    Raise { min: Chips, max: Chips },
}

/// Where the betting stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// `to_act` must choose one of the legal actions
    Acting,
    /// The hand ended with this seat folding
    Folded(Seat),
    /// Betting on this street is over; cards come next (or showdown)
    Closed,
}

/// Raw betting inputs handed over by the host for one decision
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Chips in the middle, including this street's commitments
    pub pot: Chips,
    /// Chips behind for each seat
    pub stacks: [Chips; 2],
    /// Chips each seat has put in on the current street
    pub committed: [Chips; 2],
    pub board: Vec<Card>,
    pub to_act: Seat,
    /// Dealer seat; its opponent acts first after the flop
    pub button: Seat,
    pub big_blind: Chips,
    /// Whether the opponent has already acted voluntarily on this street
    pub opponent_acted: bool,
    pub legal: Vec<LegalAction>,
}

/// Immutable snapshot of a heads-up betting position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pot: Chips,
    stacks: [Chips; 2],
    committed: [Chips; 2],
    street: Street,
    board: Vec<Card>,
    to_act: Seat,
    button: Seat,
    big_blind: Chips,
    last_raise: Chips,
    acted: [bool; 2],
    legal: Vec<LegalAction>,
    history: Vec<Action>,
    status: Status,
}

impl GameState {
    /// Validate host inputs and build the root state
    pub fn from_snapshot(snap: Snapshot) -> Result<GameState> {
        if snap.legal.is_empty() {
            return Err(EngineError::malformed("legal action set is empty"));
        }
        let street = Street::from_board_size(snap.board.len()).ok_or_else(|| {
            EngineError::malformed(format!("{} community cards is not a street", snap.board.len()))
        })?;
        if Card::mask(&snap.board).count_ones() as usize != snap.board.len() {
            return Err(EngineError::malformed("duplicate community card"));
        }
        if snap.big_blind == 0 {
            return Err(EngineError::malformed("big blind must be positive"));
        }
        let committed_total = snap.committed[0] as u64 + snap.committed[1] as u64;
        if committed_total > snap.pot as u64 {
            return Err(EngineError::malformed(format!(
                "street commitments {:?} exceed pot {}",
                snap.committed, snap.pot
            )));
        }

        let me = snap.to_act.index();
        let opp = snap.to_act.opponent().index();
        if snap.committed[me] > snap.committed[opp] {
            return Err(EngineError::malformed(format!(
                "seat to act has committed more than its opponent: {:?}",
                snap.committed
            )));
        }
        let to_call = snap.committed[opp] - snap.committed[me];
        for legal in &snap.legal {
            match *legal {
                LegalAction::Fold => {}
                LegalAction::Call { amount } => {
                    if amount != to_call.min(snap.stacks[me]) {
                        return Err(EngineError::malformed(format!(
                            "call amount {} does not match {} owed with {} behind",
                            amount, to_call, snap.stacks[me]
                        )));
                    }
                }
                LegalAction::Raise { min, max } => {
                    if min > max || max > snap.committed[me] + snap.stacks[me] || min <= snap.committed[opp] {
                        return Err(EngineError::malformed(format!(
                            "raise range [{}, {}] inconsistent with stack {} and commitments {:?}",
                            min, max, snap.stacks[me], snap.committed
                        )));
                    }
                }
            }
        }

        let mut acted = [false; 2];
        acted[opp] = snap.opponent_acted;
        let diff = snap.committed[0].abs_diff(snap.committed[1]);
        Ok(GameState {
            pot: snap.pot,
            stacks: snap.stacks,
            committed: snap.committed,
            street,
            board: snap.board,
            to_act: snap.to_act,
            button: snap.button,
            big_blind: snap.big_blind,
            last_raise: diff.max(snap.big_blind),
            acted,
            legal: snap.legal,
            history: Vec::new(),
            status: Status::Acting,
        })
    }

    pub fn pot(&self) -> Chips {
        self.pot
    }

    pub fn stacks(&self) -> [Chips; 2] {
        self.stacks
    }

    pub fn committed(&self) -> [Chips; 2] {
        self.committed
    }

    pub fn street(&self) -> Street {
        self.street
    }

    pub fn board(&self) -> &[Card] {
        &self.board
    }

    pub fn to_act(&self) -> Seat {
        self.to_act
    }

    pub fn button(&self) -> Seat {
        self.button
    }

    pub fn big_blind(&self) -> Chips {
        self.big_blind
    }

    /// Legal actions for `to_act`; empty once the street closes or someone folds
    pub fn legal(&self) -> &[LegalAction] {
        &self.legal
    }

    /// Betting actions taken since this state was built from a snapshot
    pub fn history(&self) -> &[Action] {
        &self.history
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Whether `seat` has acted on the current street
    pub fn has_acted(&self, seat: Seat) -> bool {
        self.acted[seat.index()]
    }

    /// Chips the acting seat must add to call
    pub fn to_call(&self) -> Chips {
        let me = self.to_act.index();
        let opp = self.to_act.opponent().index();
        self.committed[opp].saturating_sub(self.committed[me])
    }

    /// True when either seat has no chips behind
    pub fn is_all_in(&self) -> bool {
        self.stacks.iter().any(|&s| s == 0)
    }

    /// True if `action` is allowed by the legal set
    pub fn permits(&self, action: Action) -> bool {
        self.legal.iter().any(|legal| match (action, *legal) {
            (Action::Fold, LegalAction::Fold) => true,
            (Action::Call, LegalAction::Call { .. }) => true,
            (Action::Raise(to), LegalAction::Raise { min, max }) => min <= to && to <= max,
            _ => false,
        })
    }

    /// The raise range, if raising is legal
    pub fn raise_range(&self) -> Option<(Chips, Chips)> {
        self.legal.iter().find_map(|legal| match *legal {
            LegalAction::Raise { min, max } => Some((min, max)),
            _ => None,
        })
    }

    /// Derive the state after `to_act` takes `action`
    pub fn apply(&self, action: Action) -> Result<GameState> {
        if self.status != Status::Acting {
            return Err(EngineError::malformed(format!(
                "no action allowed in status {:?}",
                self.status
            )));
        }
        if !self.permits(action) {
            return Err(EngineError::malformed(format!(
                "action {} is not legal here ({:?})",
                action, self.legal
            )));
        }

        let seat = self.to_act;
        let me = seat.index();
        let opp = seat.opponent().index();
        let mut next = self.clone();
        next.history.push(action);
        next.acted[me] = true;

        match action {
            Action::Fold => {
                next.status = Status::Folded(seat);
                next.legal.clear();
            }
            Action::Call => {
                next.commit(me, self.to_call().min(self.stacks[me]));
                if self.acted[opp] {
                    next.close_street();
                } else {
                    next.pass_turn();
                }
            }
            Action::Raise(to) => {
                let high = self.committed[opp];
                let added = to
                    .checked_sub(self.committed[me])
                    .ok_or_else(|| EngineError::malformed(format!("raise to {} is below own commitment", to)))?;
                let increment = to
                    .checked_sub(high)
                    .ok_or_else(|| EngineError::malformed(format!("raise to {} does not exceed {}", to, high)))?;
                next.commit(me, added);
                next.last_raise = self.last_raise.max(increment);
                next.pass_turn();
            }
        }
        Ok(next)
    }

    /// Derive the state after community cards are dealt on a closed street.
    ///
    /// Several cards at once run the board out (all-in). When nobody can bet
    /// any more the new state stays closed.
    pub fn deal(&self, cards: &[Card]) -> Result<GameState> {
        if self.status != Status::Closed {
            return Err(EngineError::malformed("cards can only be dealt once betting closes"));
        }
        let mut board = self.board.clone();
        board.extend_from_slice(cards);
        let street = Street::from_board_size(board.len())
            .filter(|&s| s > self.street)
            .ok_or_else(|| EngineError::malformed(format!("cannot deal {} cards on the {}", cards.len(), self.street)))?;
        if Card::mask(&board).count_ones() as usize != board.len() {
            return Err(EngineError::malformed("dealt card already on board"));
        }

        let mut next = self.clone();
        next.board = board;
        next.street = street;
        next.committed = [0, 0];
        next.acted = [false, false];
        next.last_raise = self.big_blind;
        if self.is_all_in() {
            next.legal.clear();
            next.status = Status::Closed;
        } else {
            next.to_act = self.button.opponent();
            next.status = Status::Acting;
            next.legal = next.derive_legal();
        }
        Ok(next)
    }

    fn commit(&mut self, seat: usize, chips: Chips) {
        self.stacks[seat] -= chips;
        self.committed[seat] += chips;
        self.pot += chips;
    }

    fn pass_turn(&mut self) {
        self.to_act = self.to_act.opponent();
        self.legal = self.derive_legal();
    }

    /// Close the street, returning any uncalled excess from a short all-in call
    fn close_street(&mut self) {
        let [a, b] = self.committed;
        if a != b {
            let over = if a > b { 0 } else { 1 };
            let excess = a.abs_diff(b);
            self.committed[over] -= excess;
            self.stacks[over] += excess;
            self.pot -= excess;
        }
        self.legal.clear();
        self.status = Status::Closed;
    }

    /// Betting rules for positions inside the tree
    fn derive_legal(&self) -> Vec<LegalAction> {
        let me = self.to_act.index();
        let opp = self.to_act.opponent().index();
        let to_call = self.to_call();
        let mut legal = Vec::with_capacity(3);
        if to_call > 0 {
            legal.push(LegalAction::Fold);
        }
        legal.push(LegalAction::Call {
            amount: to_call.min(self.stacks[me]),
        });
        if self.stacks[me] > to_call && self.stacks[opp] > 0 {
            let max = self.committed[me] + self.stacks[me];
            let min = (self.committed[opp] + self.last_raise.max(self.big_blind)).min(max);
            legal.push(LegalAction::Raise { min, max });
        }
        legal
    }
}
