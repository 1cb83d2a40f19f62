use crate::state::PlayerId;
use std::fmt;

pub type Result<T> = std::result::Result<T, BragError>;

/// Failures the table engine reports to its caller.
///
/// Degraded actions (a raise below the table, a challenge with nobody to
/// challenge) are not errors: the engine substitutes a call and logs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BragError {
    /// The deck cannot cover the requested deal.
    InsufficientCards { requested: usize, remaining: usize },
    /// Text that does not name a card, e.g. `"1x"`.
    InvalidCard(String),
    /// Text that does not name exactly three cards.
    InvalidHand(String),
    InvalidConfig(String),
    /// Seated player count outside 2..=6.
    PlayerCount(usize),
    UnknownPlayer(PlayerId),
    /// The player folded or lost a challenge earlier in this hand.
    PlayerNotInHand(PlayerId),
    /// A player was asked to act but nobody resolves their turns.
    MissingResolver(PlayerId),
    /// Fewer than two players hold chips, so no hand can start.
    NotEnoughSolventPlayers,
    HandNotInProgress,
}

impl fmt::Display for BragError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BragError::InsufficientCards { requested, remaining } => {
                write!(f, "cannot deal {} cards, only {} remain in the deck", requested, remaining)
            }
            BragError::InvalidCard(text) => write!(f, "invalid card: {:?}", text),
            BragError::InvalidHand(text) => write!(f, "invalid hand (need exactly 3 cards): {:?}", text),
            BragError::InvalidConfig(reason) => write!(f, "invalid table config: {}", reason),
            BragError::PlayerCount(n) => write!(f, "a table seats 2 to 6 players, got {}", n),
            BragError::UnknownPlayer(id) => write!(f, "no player {} at this table", id),
            BragError::PlayerNotInHand(id) => write!(f, "player {} is out of this hand", id),
            BragError::MissingResolver(id) => write!(f, "no action resolver registered for player {}", id),
            BragError::NotEnoughSolventPlayers => write!(f, "fewer than two players have chips left"),
            BragError::HandNotInProgress => write!(f, "no hand is being played"),
        }
    }
}

impl std::error::Error for BragError {}
