//! Players that answer decision requests

use crate::adapter::to_external;
use crate::journal::{DecisionLog, DecisionRecord};
use crate::request::{DecisionRequest, ExternalAction};
use cfrbot_engine::{
    extract, CactusKevEvaluator, CfrSolver, EngineError, LegalAction, Result, SolverConfig, Strategy,
};
use cfrbot_tree::TreeBuilder;
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Anything that can sit at a table and answer a [`DecisionRequest`]
pub trait Player {
    fn name(&self) -> &str;

    /// Exactly one action per request; an error means no action is taken
    fn decide(&mut self, request: &DecisionRequest) -> Result<ExternalAction>;
}

/// Solves every decision from scratch with CFR over a local tree
pub struct CfrPlayer {
    name: String,
    config: SolverConfig,
    evaluator: CactusKevEvaluator,
    log: DecisionLog,
}

impl CfrPlayer {
    pub fn new(name: impl Into<String>, config: SolverConfig) -> Self {
        Self::with_log(name, config, DecisionLog::new())
    }

    pub fn with_log(name: impl Into<String>, config: SolverConfig, log: DecisionLog) -> Self {
        CfrPlayer {
            name: name.into(),
            config,
            evaluator: CactusKevEvaluator::new(),
            log,
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn log(&self) -> &DecisionLog {
        &self.log
    }

    /// Root average strategy for `request` after `config.iterations` iterations
    pub fn solve(&self, request: &DecisionRequest) -> Result<Strategy> {
        self.config.validate_search()?;
        let state = request.state()?;
        let tree = TreeBuilder::new(&self.config).build(&state, request.hole_cards, self.config.max_depth)?;
        let mut solver = CfrSolver::new(&tree, &self.evaluator, &self.config)?;
        solver.run(self.config.iterations)?;
        let strategy = extract(solver.table(), &tree.root_infoset)?;
        debug!(
            "{}: {} after {} iterations -> {}",
            self.name,
            tree.root_infoset,
            solver.iteration(),
            strategy
        );
        Ok(strategy)
    }
}

impl Player for CfrPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&mut self, request: &DecisionRequest) -> Result<ExternalAction> {
        let strategy = self.solve(request)?;
        let action = strategy
            .select()
            .ok_or_else(|| EngineError::malformed("root strategy has no actions"))?;
        let external = to_external(action, request)?;
        info!("{} ({}{}): {}", self.name, request.hole_cards[0], request.hole_cards[1], external);
        self.log.append(DecisionRecord::new(
            &self.name,
            request,
            &strategy,
            external,
            self.config.iterations,
        ));
        Ok(external)
    }
}

/// Picks a uniformly random legal action; raises are always the minimum
pub struct RandomPlayer {
    name: String,
    rng: SmallRng,
}

impl RandomPlayer {
    pub fn new(name: impl Into<String>, seed: u64) -> Self {
        RandomPlayer {
            name: name.into(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Player for RandomPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&mut self, request: &DecisionRequest) -> Result<ExternalAction> {
        if request.legal.is_empty() {
            return Err(EngineError::malformed("legal action set is empty"));
        }
        let pick = request.legal[self.rng.random_range(0..request.legal.len())];
        let external = match pick {
            LegalAction::Fold => ExternalAction::fold(),
            LegalAction::Call { .. } => ExternalAction::call(),
            LegalAction::Raise { min, .. } => ExternalAction::raise(min),
        };
        debug!("{}: {}", self.name, external);
        Ok(external)
    }
}
