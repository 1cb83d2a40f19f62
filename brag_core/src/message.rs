use crate::card::{ComparisonKey, Hand};
use crate::state::{Action, PlayerId};
use serde::{Deserialize, Serialize};

// --- Engine -> front end ---
// Everything that happens during a hand is appended to `Table::events`.
// Front ends render these; the engine itself never prints.

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum TableEvent {
    /// A new hand began
    HandStarted {
        hand_number: u32,
        /// Seating order of everyone dealt in
        players: Vec<PlayerId>,
        current_call: u32,
    },
    AntePaid { player_id: PlayerId, amount: u32 },
    /// The player holds no chips and sits this hand out
    SatOut { player_id: PlayerId },
    /// Cards were dealt face down to every seat
    CardsDealt { cards_left: usize },
    RoundStarted { round: u32 },
    CardsViewed { player_id: PlayerId },
    Spoke { player_id: PlayerId, remark: Remark },
    Folded { player_id: PlayerId },
    Called { player_id: PlayerId, amount: u32, pot: u32 },
    Raised { player_id: PlayerId, to: u32, pot: u32 },
    /// The requested action could not apply and was replaced
    Redirected {
        player_id: PlayerId,
        requested: Action,
        applied: Action,
        reason: RedirectReason,
    },
    Challenged {
        challenger: PlayerId,
        target: PlayerId,
        fee: u32,
        challenger_hand: Hand,
        target_hand: Hand,
    },
    /// The loser of a challenge is out of the hand
    Eliminated { player_id: PlayerId, by: PlayerId },
    /// Full showdown between everyone still alive
    Showdown { results: Vec<ShowdownEntry> },
    PotAwarded {
        payouts: Vec<Payout>,
        /// Split remainder nobody receives
        undistributed: u32,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    /// Raise target below the current call
    RaiseTooSmall,
    /// Raise target above the raiser's stack
    RaiseTooLarge,
    /// Stack smaller than the current call
    CannotCoverCall,
    /// Nobody left to challenge
    NoChallengeTarget,
    /// Challenged someone who is not an alive opponent
    InvalidChallengeTarget,
    /// The resolver kept asking to look at the cards
    TooManyViewRequests,
}

/// One seat's hand at the final showdown.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShowdownEntry {
    pub player_id: PlayerId,
    pub hand: Hand,
    pub key: ComparisonKey,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    pub player_id: PlayerId,
    pub amount: u32,
}

// --- Table talk ---

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Sounds confident
    Strong,
    /// Sounds discouraged
    Weak,
    Silent,
}

/// Something said at the table. Whether it is honest is up to the speaker.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Remark {
    pub tone: Tone,
    pub text: String,
}

impl Remark {
    pub fn new(tone: Tone, text: impl Into<String>) -> Remark {
        Remark { tone, text: text.into() }
    }
}
