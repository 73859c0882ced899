//! Information sets and their regret/strategy accumulators
//!
//! Sets are created lazily, the first time an update for their key is
//! applied, and live only as long as the table of one CFR run.

use crate::card::Card;
use crate::node::{Action, Seat};
use crate::state::GameState;
use crate::strategy::Strategy;
use std::collections::HashMap;
use std::fmt;

/// What the acting seat knows: its seat, its hole cards, the board and the
/// betting history that led here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InfosetKey {
    pub seat: Seat,
    pub private: [Card; 2],
    pub board: Vec<Card>,
    pub history: Vec<Action>,
}

impl InfosetKey {
    /// Key for `seat` holding `private` at `state`
    pub fn new(seat: Seat, private: [Card; 2], state: &GameState) -> Self {
        let mut private = private;
        private.sort();
        InfosetKey {
            seat,
            private,
            board: state.board().to_vec(),
            history: state.history().to_vec(),
        }
    }
}

impl fmt::Display for InfosetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}{}|", self.seat, self.private[0], self.private[1])?;
        for card in &self.board {
            write!(f, "{}", card)?;
        }
        f.write_str("|")?;
        let history: Vec<String> = self.history.iter().map(Action::to_string).collect();
        f.write_str(&history.join("."))
    }
}

/// Regret matching: proportional to positive regret, uniform when none is positive.
pub fn regret_match(regrets: &[f64]) -> Vec<f64> {
    let positive_sum: f64 = regrets.iter().map(|&r| r.max(0.0)).sum();
    if positive_sum > 0.0 {
        regrets.iter().map(|&r| r.max(0.0) / positive_sum).collect()
    } else {
        let n = regrets.len();
        vec![1.0 / n as f64; n]
    }
}

/// Cumulative regret and strategy weight for one information set
#[derive(Debug, Clone, PartialEq)]
pub struct InformationSet {
    actions: Vec<Action>,
    /// cumulative_regret[a], may go negative
    cumulative_regret: Vec<f64>,
    /// cumulative_strategy[a], reach-weighted and never negative
    cumulative_strategy: Vec<f64>,
}

impl InformationSet {
    pub fn new(actions: Vec<Action>) -> Self {
        let n = actions.len();
        InformationSet {
            actions,
            cumulative_regret: vec![0.0; n],
            cumulative_strategy: vec![0.0; n],
        }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn cumulative_regret(&self) -> &[f64] {
        &self.cumulative_regret
    }

    pub fn cumulative_strategy(&self) -> &[f64] {
        &self.cumulative_strategy
    }

    /// Current strategy via regret matching
    pub fn current_strategy(&self) -> Strategy {
        Strategy::new(self.actions.clone(), regret_match(&self.cumulative_regret))
    }

    /// Average strategy: normalized cumulative strategy weight
    pub fn average_strategy(&self) -> Strategy {
        Strategy::from_weights(self.actions.clone(), &self.cumulative_strategy)
    }

    /// r(I,a) += regret[a]; S(I,a) += weighted_strategy[a]
    pub fn accumulate(&mut self, regrets: &[f64], weighted_strategy: &[f64]) {
        for (r, &delta) in self.cumulative_regret.iter_mut().zip(regrets) {
            *r += delta;
        }
        for (s, &w) in self.cumulative_strategy.iter_mut().zip(weighted_strategy) {
            *s += w;
        }
    }
}

/// All information sets touched during one CFR run
#[derive(Debug, Clone, Default)]
pub struct InfoSetTable {
    sets: HashMap<InfosetKey, InformationSet>,
}

impl InfoSetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &InfosetKey) -> Option<&InformationSet> {
        self.sets.get(key)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InfosetKey, &InformationSet)> {
        self.sets.iter()
    }

    /// Regret-matched probabilities for `key`; uniform over `n` actions for a
    /// set that has not been created yet.
    pub fn current_probabilities(&self, key: &InfosetKey, n: usize) -> Vec<f64> {
        match self.sets.get(key) {
            Some(set) => regret_match(&set.cumulative_regret),
            None => vec![1.0 / n as f64; n],
        }
    }

    /// Apply one update, creating the set on first use
    pub fn accumulate(&mut self, key: &InfosetKey, actions: &[Action], regrets: &[f64], weighted_strategy: &[f64]) {
        if let Some(set) = self.sets.get_mut(key) {
            set.accumulate(regrets, weighted_strategy);
            return;
        }
        let mut set = InformationSet::new(actions.to_vec());
        set.accumulate(regrets, weighted_strategy);
        self.sets.insert(key.clone(), set);
    }

    /// Average strategy of every information set
    pub fn average_strategies(&self) -> HashMap<InfosetKey, Strategy> {
        self.sets
            .iter()
            .map(|(key, set)| (key.clone(), set.average_strategy()))
            .collect()
    }
}
