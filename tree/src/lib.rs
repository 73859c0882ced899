//! cfrbot Tree Builder - Game tree construction module
//!
//! This crate builds the bounded-depth local tree for one decision from a
//! [`GameState`] and hands it to the engine's solver.

pub mod builder;
pub mod chance;

pub use builder::{node_actions, raise_amounts, TreeBuilder};
