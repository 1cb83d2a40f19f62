use crate::card::{Deck, Hand};
use crate::error::{BragError, Result};
use crate::message::TableEvent;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PlayerId = Uuid;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;

/// Table settings. Every field has a default, so a partial JSON document
/// is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub ante: u32,        // paid by everyone before the deal
    pub min_bet: u32,     // opening call amount of every hand
    pub max_rounds: u32,  // betting rounds before a forced showdown
    pub starting_chips: u32,
    pub agents: usize,    // automated opponents seated next to the human
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            ante: 10,
            min_bet: 20,
            max_rounds: 3,
            starting_chips: 200,
            agents: 2,
        }
    }
}

impl TableConfig {
    pub fn validate(&self) -> Result<()> {
        fn check(ok: bool, reason: &str) -> Result<()> {
            if ok { Ok(()) } else { Err(BragError::InvalidConfig(reason.to_string())) }
        }
        check((1..=1000).contains(&self.ante), "ante must be between 1 and 1000")?;
        check((1..=10000).contains(&self.min_bet), "min_bet must be between 1 and 10000")?;
        check((1..=5).contains(&self.max_rounds), "max_rounds must be between 1 and 5")?;
        check((20..=100_000).contains(&self.starting_chips), "starting_chips must be between 20 and 100000")?;
        check(
            (MIN_PLAYERS - 1..=MAX_PLAYERS - 1).contains(&self.agents),
            "agents must be between 1 and 5",
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PlayerKind {
    /// Turns come from outside the engine (a person at a terminal).
    Human,
    /// Turns come from the built-in policy.
    Agent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub kind: PlayerKind,
    pub chips: u32,
    pub alive: bool,  // still contesting this hand
    pub seen: bool,   // has looked at own cards
    pub hand: Option<Hand>,
    pub last_spoke_round: Option<u32>,
}

impl Player {
    pub fn new(name: impl Into<String>, kind: PlayerKind, chips: u32) -> Player {
        Player {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            chips,
            alive: false,
            seen: false,
            hand: None,
            last_spoke_round: None,
        }
    }

    pub fn human(name: impl Into<String>, chips: u32) -> Player {
        Player::new(name, PlayerKind::Human, chips)
    }

    pub fn agent(name: impl Into<String>, chips: u32) -> Player {
        Player::new(name, PlayerKind::Agent, chips)
    }

    pub fn is_human(&self) -> bool {
        self.kind == PlayerKind::Human
    }

    /// Alive and holding chips, i.e. gets a turn this round.
    pub fn can_act(&self) -> bool {
        self.alive && self.chips > 0
    }

    /// Moves up to `amount` chips out of this player's stack, returning what
    /// was actually paid. Never goes below zero.
    pub(crate) fn pay(&mut self, amount: u32) -> u32 {
        let paid = amount.min(self.chips);
        self.chips -= paid;
        paid
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GamePhase {
    /// Seated, no hand in progress
    Waiting,
    AnteCollection,
    Dealing,
    /// Betting round, counted from 1
    Round(u32),
    Settlement,
    /// A hand finished and the pot was paid out
    HandOver,
}

/// Whether the session can deal another hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    /// Only this player can still pay
    Winner(PlayerId),
    /// Nobody has chips left
    Bust,
}

impl SessionState {
    pub fn is_over(self) -> bool {
        self != SessionState::Running
    }
}

/// A resolved turn, as handed to the engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Action {
    Fold,
    Call,
    /// Raise the call to this total amount
    Raise(u32),
    /// Pay the call and force a showdown with this opponent
    Challenge(PlayerId),
    /// Look at own cards; the turn continues afterwards
    ViewCards,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub config: TableConfig,
    // Seating order is turn order
    pub players: Vec<Player>,
    pub phase: GamePhase,
    pub pot: u32,
    pub current_call: u32,
    pub last_raiser: Option<PlayerId>,
    pub hands_played: u32,
    #[serde(skip)]
    pub deck: Deck,
    // Log of the hand in progress, cleared at every new hand
    pub events: Vec<TableEvent>,
}

impl Table {
    pub fn new(config: TableConfig, players: Vec<Player>) -> Result<Table> {
        config.validate()?;
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players.len()) {
            return Err(BragError::PlayerCount(players.len()));
        }
        Ok(Table {
            current_call: config.min_bet,
            config,
            players,
            phase: GamePhase::Waiting,
            pot: 0,
            last_raiser: None,
            hands_played: 0,
            deck: Deck::new(),
            events: Vec::new(),
        })
    }

    /// One human seat named `name` followed by `config.agents` bots, all
    /// holding the configured starting stack.
    pub fn with_human(config: TableConfig, name: impl Into<String>) -> Result<Table> {
        let mut players = vec![Player::human(name, config.starting_chips)];
        for i in 0..config.agents {
            players.push(Player::agent(format!("Bot{}", i + 1), config.starting_chips));
        }
        Table::new(config, players)
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == *id)
    }

    pub fn seat_of(&self, id: &PlayerId) -> Result<usize> {
        self.players.iter().position(|p| p.id == *id).ok_or(BragError::UnknownPlayer(*id))
    }

    /// Players still contesting the current hand, in seating order.
    pub fn alive_players(&self) -> Vec<PlayerId> {
        self.players.iter().filter(|p| p.alive).map(|p| p.id).collect()
    }

    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| p.alive).count()
    }

    /// Opponents `id` could challenge right now.
    pub fn challenge_targets(&self, id: &PlayerId) -> Vec<&Player> {
        self.players.iter().filter(|p| p.alive && p.id != *id).collect()
    }

    pub fn solvent_players(&self) -> Vec<PlayerId> {
        self.players.iter().filter(|p| p.chips > 0).map(|p| p.id).collect()
    }

    /// Total chips at the table, including the pot.
    pub fn total_chips(&self) -> u64 {
        self.players.iter().map(|p| p.chips as u64).sum::<u64>() + self.pot as u64
    }

    /// The session is over once fewer than two players can still pay.
    pub fn session_state(&self) -> SessionState {
        match self.solvent_players().as_slice() {
            [] => SessionState::Bust,
            [last] => SessionState::Winner(*last),
            _ => SessionState::Running,
        }
    }

    pub fn hand_in_progress(&self) -> bool {
        matches!(self.phase, GamePhase::Round(_))
    }
}
