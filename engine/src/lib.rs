//! cfrbot Engine - Core solver types and logic
//!
//! This crate contains the betting state, node and tree types, the hand
//! evaluator, terminal payoff resolution and the CFR algorithm used to pick
//! one action for one decision.
//!
//! The engine performs no I/O beyond loading configuration and has zero UI
//! dependencies.

pub mod card;
pub mod cfr;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod infoset;
pub mod node;
pub mod payoff;
pub mod state;
pub mod strategy;

pub use card::Card;
pub use cfr::CfrSolver;
pub use config::{ConfigError, SolverConfig};
pub use error::{EngineError, Result};
pub use evaluator::{CactusKevEvaluator, HandCategory, HandEvaluator, HandRank};
pub use infoset::{InfoSetTable, InfosetKey, InformationSet};
pub use node::{Action, GameTree, Node, NodeId, Seat, Street};
pub use state::{Chips, GameState, LegalAction, Snapshot, Status};
pub use strategy::{extract, Strategy};
