//! Minimal heads-up table that drives two players through complete hands
//!
//! The table owns the deck, the stacks and the dealer button. Betting runs
//! through the engine's [`GameState`], so the players and the table agree on
//! every legal action.

use anyhow::{bail, Context, Result};
use cfrbot_agent::{from_external, DecisionRequest, Player};
use cfrbot_engine::{
    CactusKevEvaluator, Card, Chips, GameState, HandEvaluator, LegalAction, Seat, Snapshot, Status,
};
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use std::cmp::Ordering;

/// Match settings for one table
#[derive(Debug, Clone, Copy)]
pub struct TableConfig {
    pub rounds: u32,
    pub initial_stack: Chips,
    pub small_blind: Chips,
    pub seed: u64,
}

impl TableConfig {
    pub fn big_blind(&self) -> Chips {
        self.small_blind * 2
    }
}

/// Final result of a match
#[derive(Debug, Clone)]
pub struct TableSummary {
    pub names: [String; 2],
    pub hands: u32,
    pub stacks: [Chips; 2],
}

/// Two players, their stacks and a shuffled deck per hand
pub struct Table {
    players: [Box<dyn Player + Send>; 2],
    stacks: [Chips; 2],
    button: Seat,
    config: TableConfig,
    rng: SmallRng,
    evaluator: CactusKevEvaluator,
}

/// Cards for one hand: hole cards by seat, then the full board
struct Deal {
    holes: [[Card; 2]; 2],
    board: [Card; 5],
}

impl Table {
    pub fn new(players: [Box<dyn Player + Send>; 2], config: TableConfig) -> Self {
        Table {
            players,
            stacks: [config.initial_stack; 2],
            button: Seat::Zero,
            config,
            rng: SmallRng::seed_from_u64(config.seed),
            evaluator: CactusKevEvaluator::new(),
        }
    }

    /// Play up to `rounds` hands, stopping once a seat is out of chips
    pub fn play(mut self) -> Result<TableSummary> {
        let mut hands = 0;
        for round in 1..=self.config.rounds {
            if self.stacks.iter().any(|&s| s == 0) {
                info!("stopping after {} hands: a seat has no chips", hands);
                break;
            }
            self.play_hand().with_context(|| format!("hand {}", round))?;
            hands += 1;
            info!(
                "hand {}: {} {} | {} {}",
                round,
                self.players[0].name(),
                self.stacks[0],
                self.players[1].name(),
                self.stacks[1]
            );
            self.button = self.button.opponent();
        }
        Ok(TableSummary {
            names: [self.players[0].name().to_string(), self.players[1].name().to_string()],
            hands,
            stacks: self.stacks,
        })
    }

    fn shuffle(&mut self) -> Deal {
        let cards: Vec<Card> = sample(&mut self.rng, 52, 9)
            .iter()
            .map(|v| Card::new(v as u8))
            .collect();
        Deal {
            holes: [[cards[0], cards[1]], [cards[2], cards[3]]],
            board: [cards[4], cards[5], cards[6], cards[7], cards[8]],
        }
    }

    /// Post blinds and build the preflop state; the button acts first.
    fn open(&self) -> Result<GameState> {
        let button = self.button.index();
        let other = self.button.opponent().index();
        let big_blind = self.config.big_blind();

        let mut stacks = self.stacks;
        let mut committed = [0; 2];
        committed[button] = self.config.small_blind.min(stacks[button]);
        committed[other] = big_blind.min(stacks[other]);
        stacks[button] -= committed[button];
        stacks[other] -= committed[other];

        let to_call = committed[other].saturating_sub(committed[button]);
        let mut legal = Vec::with_capacity(3);
        if to_call > 0 {
            legal.push(LegalAction::Fold);
        }
        legal.push(LegalAction::Call {
            amount: to_call.min(stacks[button]),
        });
        if stacks[button] > to_call && stacks[other] > 0 {
            let max = committed[button] + stacks[button];
            legal.push(LegalAction::Raise {
                min: (committed[other] + big_blind).min(max),
                max,
            });
        }

        Ok(GameState::from_snapshot(Snapshot {
            pot: committed[0] + committed[1],
            stacks,
            committed,
            board: Vec::new(),
            to_act: self.button,
            button: self.button,
            big_blind,
            opponent_acted: false,
            legal,
        })?)
    }

    fn request(&self, state: &GameState, deal: &Deal) -> DecisionRequest {
        let seat = state.to_act();
        DecisionRequest {
            seat,
            hole_cards: deal.holes[seat.index()],
            board: state.board().to_vec(),
            pot: state.pot(),
            stacks: state.stacks(),
            committed: state.committed(),
            big_blind: state.big_blind(),
            button: state.button(),
            opponent_acted: state.has_acted(seat.opponent()),
            legal: state.legal().to_vec(),
        }
    }

    fn play_hand(&mut self) -> Result<()> {
        let deal = self.shuffle();
        let mut state = self.open()?;
        debug!(
            "button {}: {}{} vs {}{}",
            self.button, deal.holes[0][0], deal.holes[0][1], deal.holes[1][0], deal.holes[1][1]
        );

        loop {
            match state.status() {
                Status::Acting => {
                    let request = self.request(&state, &deal);
                    let seat = request.seat.index();
                    let external = self.players[seat]
                        .decide(&request)
                        .with_context(|| format!("{} failed to act", self.players[seat].name()))?;
                    let action = from_external(external, &request)?;
                    debug!("{} {}", self.players[seat].name(), external);
                    state = state.apply(action)?;
                }
                Status::Folded(folder) => {
                    let mut won = [0; 2];
                    won[folder.opponent().index()] = state.pot();
                    self.settle(&state, won);
                    return Ok(());
                }
                Status::Closed if state.board().len() == 5 => {
                    let won = self.showdown(&state, &deal)?;
                    self.settle(&state, won);
                    return Ok(());
                }
                Status::Closed => {
                    let shown = state.board().len();
                    let target = match state.street().next() {
                        Some(_) if state.is_all_in() => 5,
                        Some(next) => next.board_size(),
                        None => bail!("betting closed on the river without a showdown"),
                    };
                    state = state.deal(&deal.board[shown..target])?;
                }
            }
        }
    }

    /// Pot shares at showdown; the odd chip of a split goes to the seat out
    /// of position.
    fn showdown(&self, state: &GameState, deal: &Deal) -> Result<[Chips; 2]> {
        let mut ranks = Vec::with_capacity(2);
        for hole in &deal.holes {
            let mut cards = state.board().to_vec();
            cards.extend_from_slice(hole);
            ranks.push(self.evaluator.evaluate(&cards)?);
        }
        let pot = state.pot();
        // Lower rank value is the stronger hand
        Ok(match ranks[1].cmp(&ranks[0]) {
            Ordering::Greater => [pot, 0],
            Ordering::Less => [0, pot],
            Ordering::Equal => {
                let mut won = [pot / 2; 2];
                won[self.button.opponent().index()] += pot % 2;
                won
            }
        })
    }

    fn settle(&mut self, state: &GameState, won: [Chips; 2]) {
        let behind = state.stacks();
        self.stacks = [behind[0] + won[0], behind[1] + won[1]];
    }
}
