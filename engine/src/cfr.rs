//! Vanilla CFR over one decision's game tree
//!
//! All utilities throughout the traversal are from seat zero's perspective.
//! Seat one's regrets use a sign flip (seat one gains when seat zero's
//! utility falls).
//!
//! The traversal is a pure free function (`traverse`) that collects
//! regret/strategy updates rather than mutating the table mid-traversal, so
//! every information set plays the same current strategy for a whole
//! iteration. Updates are applied once the traversal returns.

use crate::config::SolverConfig;
use crate::error::{EngineError, Result};
use crate::evaluator::HandEvaluator;
use crate::infoset::{InfoSetTable, InfosetKey};
use crate::node::{GameTree, Node, NodeId};
use crate::payoff::resolve_all;
use crate::strategy::Strategy;
use log::debug;
use std::collections::HashMap;

/// A batched regret/strategy update produced during a single traversal.
///
/// Collected by `traverse` and applied sequentially in `run_iteration`
/// so that the traversal itself only needs shared (&) references.
#[derive(Debug, Clone)]
struct RegretUpdate {
    node: NodeId,
    regrets: Vec<f64>,
    weighted_strategy: Vec<f64>,
}

/// Read-only inputs of one traversal
struct Traversal<'a> {
    tree: &'a GameTree,
    table: &'a InfoSetTable,
    terminals: &'a HashMap<NodeId, f64>,
}

impl Traversal<'_> {
    fn node(&self, id: NodeId) -> Result<&Node> {
        self.tree
            .get(id)
            .ok_or_else(|| EngineError::malformed(format!("node {} is outside the tree", id)))
    }

    /// Returns seat zero's utility at `id`.
    ///
    /// `reach[s]` is seat `s`'s own contribution to the probability of
    /// reaching `id`; `chance` is the product of chance probabilities.
    fn traverse(&self, id: NodeId, reach: [f64; 2], chance: f64, updates: &mut Vec<RegretUpdate>) -> Result<f64> {
        match self.node(id)? {
            Node::Terminal { .. } => self
                .terminals
                .get(&id)
                .copied()
                .ok_or_else(|| EngineError::malformed(format!("terminal {} was never resolved", id))),

            Node::Chance { outcomes, .. } => {
                let mut value = 0.0;
                for outcome in outcomes {
                    let child = self.traverse(outcome.child, reach, chance * outcome.probability, updates)?;
                    value += outcome.probability * child;
                }
                Ok(value)
            }

            Node::Decision { infoset, seat, children, .. } => {
                let strategy = self.table.current_probabilities(infoset, children.len());
                let me = seat.index();
                let opp = seat.opponent().index();

                let mut child_values = Vec::with_capacity(children.len());
                for (&child, &p) in children.iter().zip(&strategy) {
                    let mut next = reach;
                    next[me] *= p;
                    child_values.push(self.traverse(child, next, chance, updates)?);
                }

                let value: f64 = strategy.iter().zip(&child_values).map(|(&p, &v)| p * v).sum();

                // Counterfactual regrets from the acting seat's perspective
                let weight = reach[opp] * chance;
                let regrets = child_values
                    .iter()
                    .map(|&v| weight * seat.sign() * (v - value))
                    .collect();
                let weighted_strategy = strategy.iter().map(|&p| reach[me] * p).collect();

                updates.push(RegretUpdate {
                    node: id,
                    regrets,
                    weighted_strategy,
                });
                Ok(value)
            }
        }
    }
}

/// CFR solver operating on a game tree.
///
/// Owns the information set table for one run; nothing outlives the
/// decision the tree was built for.
pub struct CfrSolver<'t> {
    tree: &'t GameTree,
    table: InfoSetTable,
    terminals: HashMap<NodeId, f64>,
    iteration: u32,
}

impl<'t> CfrSolver<'t> {
    /// Resolve every terminal payoff up front; an unrankable showdown or an
    /// unusable config fails here, before any update.
    pub fn new<E: HandEvaluator>(tree: &'t GameTree, evaluator: &E, config: &SolverConfig) -> Result<Self> {
        config.validate_search()?;
        let terminals = resolve_all(tree, evaluator, config)?;
        Ok(Self::with_terminals(tree, terminals))
    }

    /// Create a solver with precomputed seat-zero terminal utilities.
    pub fn with_terminals(tree: &'t GameTree, terminals: HashMap<NodeId, f64>) -> Self {
        CfrSolver {
            tree,
            table: InfoSetTable::new(),
            terminals,
            iteration: 0,
        }
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn table(&self) -> &InfoSetTable {
        &self.table
    }

    /// Seat zero's utility at the root under the current average strategies
    pub fn root_value(&self) -> Result<f64> {
        expected_value(self.tree, &self.table, &self.terminals)
    }

    /// Run one iteration: traverse from the root, then apply the collected
    /// updates.
    pub fn run_iteration(&mut self) -> Result<()> {
        self.iteration += 1;
        let mut updates = Vec::new();
        let traversal = Traversal {
            tree: self.tree,
            table: &self.table,
            terminals: &self.terminals,
        };
        traversal.traverse(0, [1.0, 1.0], 1.0, &mut updates)?;

        for update in updates {
            if let Some(Node::Decision { infoset, actions, .. }) = self.tree.get(update.node) {
                self.table
                    .accumulate(infoset, actions, &update.regrets, &update.weighted_strategy);
            }
        }
        Ok(())
    }

    /// Run `iterations` iterations and return the average strategy of every
    /// information set touched.
    pub fn run(&mut self, iterations: u32) -> Result<HashMap<InfosetKey, Strategy>> {
        if iterations == 0 {
            return Err(EngineError::InvalidIterationCount(iterations));
        }
        for _ in 0..iterations {
            self.run_iteration()?;
        }
        debug!(
            "cfr: {} iterations over {} nodes, {} information sets",
            self.iteration,
            self.tree.len(),
            self.table.len()
        );
        Ok(self.table.average_strategies())
    }
}

/// Seat zero's utility at the root under the average strategies in `table`
pub fn expected_value(tree: &GameTree, table: &InfoSetTable, terminals: &HashMap<NodeId, f64>) -> Result<f64> {
    fn value(tree: &GameTree, table: &InfoSetTable, terminals: &HashMap<NodeId, f64>, id: NodeId) -> Result<f64> {
        let node = tree
            .get(id)
            .ok_or_else(|| EngineError::malformed(format!("node {} is outside the tree", id)))?;
        match node {
            Node::Terminal { .. } => terminals
                .get(&id)
                .copied()
                .ok_or_else(|| EngineError::malformed(format!("terminal {} was never resolved", id))),
            Node::Chance { outcomes, .. } => outcomes.iter().try_fold(0.0, |acc, o| -> Result<f64> {
                Ok(acc + o.probability * value(tree, table, terminals, o.child)?)
            }),
            Node::Decision { infoset, actions, children, .. } => {
                let strategy = match table.get(infoset) {
                    Some(set) => set.average_strategy(),
                    None => Strategy::uniform(actions.clone()),
                };
                strategy.probabilities().iter().zip(children).try_fold(0.0, |acc, (&p, &child)| -> Result<f64> {
                    Ok(acc + p * value(tree, table, terminals, child)?)
                })
            }
        }
    }
    value(tree, table, terminals, 0)
}
