//! cfrbot Agent - decision requests in, one action out
//!
//! Glues the tree builder and the engine's solver behind the [`Player`]
//! trait and translates between the host's action format and the engine's.

pub mod adapter;
pub mod journal;
pub mod player;
pub mod request;

pub use adapter::{from_external, to_external};
pub use journal::{DecisionLog, DecisionRecord};
pub use player::{CfrPlayer, Player, RandomPlayer};
pub use request::{ActionLabel, DecisionRequest, ExternalAction};
