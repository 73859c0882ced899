//! Strategies and final action selection

use crate::error::{EngineError, Result};
use crate::infoset::{InfoSetTable, InfosetKey};
use crate::node::Action;
use std::fmt;

/// Probability per legal action. Non-negative, sums to one.
#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    actions: Vec<Action>,
    probabilities: Vec<f64>,
}

impl Strategy {
    pub(crate) fn new(actions: Vec<Action>, probabilities: Vec<f64>) -> Self {
        Strategy { actions, probabilities }
    }

    /// Equal weight on every action
    pub fn uniform(actions: Vec<Action>) -> Self {
        let n = actions.len();
        Strategy {
            actions,
            probabilities: vec![1.0 / n as f64; n],
        }
    }

    /// Normalize non-negative weights; uniform when they sum to zero
    pub fn from_weights(actions: Vec<Action>, weights: &[f64]) -> Self {
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Strategy::uniform(actions);
        }
        let probabilities = weights.iter().map(|&w| w / total).collect();
        Strategy { actions, probabilities }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Probability of `action`, zero if it is not in the strategy
    pub fn probability(&self, action: Action) -> f64 {
        self.iter()
            .find(|(a, _)| *a == action)
            .map(|(_, p)| p)
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Action, f64)> + '_ {
        self.actions.iter().copied().zip(self.probabilities.iter().copied())
    }

    /// Highest-probability action; ties go to the smallest action in
    /// Fold < Call < Raise(small) < Raise(large) order.
    pub fn select(&self) -> Option<Action> {
        let mut best: Option<(Action, f64)> = None;
        for (action, p) in self.iter() {
            best = match best {
                None => Some((action, p)),
                Some((b, bp)) if p > bp || (p == bp && action < b) => Some((action, p)),
                keep => keep,
            };
        }
        best.map(|(action, _)| action)
    }

    /// True if all probabilities are non-negative and sum to 1 within `eps`
    pub fn is_distribution(&self, eps: f64) -> bool {
        let sum: f64 = self.probabilities.iter().sum();
        self.probabilities.iter().all(|&p| p >= 0.0) && (sum - 1.0).abs() <= eps
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(a, p)| format!("{}:{:.3}", a, p))
            .collect();
        write!(f, "[{}]", parts.join(" "))
    }
}

/// Average strategy of the root information set
pub fn extract(table: &InfoSetTable, root: &InfosetKey) -> Result<Strategy> {
    table
        .get(root)
        .map(|set| set.average_strategy())
        .ok_or_else(|| EngineError::malformed(format!("no information set for {}", root)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_weights_fall_back_to_uniform() {
        let s = Strategy::from_weights(vec![Action::Fold, Action::Call], &[0.0, 0.0]);
        assert_eq!(s.probabilities(), &[0.5, 0.5]);
    }

    #[test]
    fn test_average_strategy_sums_to_one() {
        let s = Strategy::from_weights(
            vec![Action::Fold, Action::Call, Action::Raise(20)],
            &[0.7, 1.6, 0.3],
        );
        assert!(s.is_distribution(1e-12));
        assert!((s.probability(Action::Call) - 1.6 / 2.6).abs() < 1e-12);
        assert_eq!(s.probability(Action::Raise(40)), 0.0);
    }

    #[test]
    fn test_select_argmax() {
        let s = Strategy::new(vec![Action::Fold, Action::Call, Action::Raise(20)], vec![0.2, 0.3, 0.5]);
        assert_eq!(s.select(), Some(Action::Raise(20)));
    }

    #[test]
    fn test_select_tie_break_order() {
        let s = Strategy::new(
            vec![Action::Raise(60), Action::Raise(20), Action::Call, Action::Fold],
            vec![0.25, 0.25, 0.25, 0.25],
        );
        assert_eq!(s.select(), Some(Action::Fold));

        let s = Strategy::new(vec![Action::Fold, Action::Raise(60), Action::Raise(20)], vec![0.2, 0.4, 0.4]);
        assert_eq!(s.select(), Some(Action::Raise(20)));
    }

    #[test]
    fn test_extract_unknown_key_is_error() {
        let table = InfoSetTable::new();
        let key = InfosetKey {
            seat: crate::node::Seat::Zero,
            private: [crate::card::Card::new(0), crate::card::Card::new(1)],
            board: vec![],
            history: vec![],
        };
        assert!(extract(&table, &key).is_err());
    }
}
