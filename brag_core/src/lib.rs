//! # Three-Card Brag table engine
//!
//! This crate holds everything needed to play a hand of three-card brag:
//! cards and the deck, hand evaluation and comparison, the table state, the
//! betting state machine that runs a hand from ante to settlement, and the
//! built-in opponent policy.
//!
//! It performs no I/O. Front ends plug in through [`ActionResolver`] (one per
//! seat) and render the [`TableEvent`] log the engine writes for every hand.
//! All randomness comes from rngs the caller passes in, so a seeded run
//! replays exactly.

mod agent;
mod card;
mod error;
mod logic;
mod message;
mod state;

pub use agent::*;

pub use card::*;

pub use error::*;

pub use logic::*;

pub use message::*;

pub use state::*;
