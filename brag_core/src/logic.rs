use crate::card::{compare, Deck, Outcome};
use crate::error::{BragError, Result};
use crate::message::*;
use crate::state::*;
use rand::Rng;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// How many times one turn may ask to look at the cards before the engine
/// calls on the player's behalf.
const MAX_VIEW_REQUESTS: usize = 3;

// --- Turn resolution seam ---

/// What a resolver gets to see when it is asked for an action.
pub struct TurnContext<'a> {
    pub table: &'a Table,
    pub player: &'a Player,
    pub round: u32,
}

impl<'a> TurnContext<'a> {
    pub fn current_call(&self) -> u32 {
        self.table.current_call
    }

    /// Alive opponents, in seating order.
    pub fn targets(&self) -> Vec<&'a Player> {
        self.table.challenge_targets(&self.player.id)
    }
}

/// Turns one player's turn into an `Action`.
///
/// The engine does not care who is behind it: the built-in `Agent`, a
/// terminal prompt, or a test script.
pub trait ActionResolver {
    fn resolve(&mut self, turn: &TurnContext) -> Action;

    /// Asked at most once per round, and only once the player has seen
    /// their cards.
    fn remark(&mut self, _turn: &TurnContext) -> Option<Remark> {
        None
    }
}

impl<F> ActionResolver for F
where
    F: FnMut(&TurnContext) -> Action,
{
    fn resolve(&mut self, turn: &TurnContext) -> Action {
        self(turn)
    }
}

/// One resolver per seated player.
pub type Resolvers = HashMap<PlayerId, Box<dyn ActionResolver>>;

// --- Hand flow ---

/// Plays one whole hand: ante, deal, up to `max_rounds` betting rounds and
/// settlement. Returns what each winner received.
pub fn play_hand<R: Rng + ?Sized>(table: &mut Table, resolvers: &mut Resolvers, rng: &mut R) -> Result<Vec<Payout>> {
    play_hand_with(table, resolvers, rng, |_, _| {})
}

/// Same as `play_hand`, but calls `between_rounds` with the table and the
/// upcoming round number before every round after the first.
pub fn play_hand_with<R, F>(table: &mut Table, resolvers: &mut Resolvers, rng: &mut R, mut between_rounds: F) -> Result<Vec<Payout>>
where
    R: Rng + ?Sized,
    F: FnMut(&Table, u32),
{
    if let Some(p) = table.players.iter().find(|p| !resolvers.contains_key(&p.id)) {
        return Err(BragError::MissingResolver(p.id));
    }

    start_new_hand(table, rng)?;
    for round in 1..=table.config.max_rounds {
        if table.alive_count() <= 1 {
            break;
        }
        if round > 1 {
            between_rounds(table, round);
        }
        run_betting_round(table, round, resolvers)?;
    }
    settle(table)
}

/// Starts a new hand.
///
/// - Resets the pot, the call amount and the event log.
/// - Players without chips are dealt in but sit the hand out.
/// - Collects the ante, then shuffles a fresh deck and deals three cards
///   to every seat.
pub fn start_new_hand<R: Rng + ?Sized>(table: &mut Table, rng: &mut R) -> Result<()> {
    // 1. Need two players who can pay
    if table.solvent_players().len() < MIN_PLAYERS {
        return Err(BragError::NotEnoughSolventPlayers);
    }

    // 2. Reset hand state
    table.pot = 0;
    table.current_call = table.config.min_bet;
    table.last_raiser = None;
    table.hands_played += 1;
    table.events.clear();
    table.events.push(TableEvent::HandStarted {
        hand_number: table.hands_played,
        players: table.players.iter().map(|p| p.id).collect(),
        current_call: table.current_call,
    });
    for player in table.players.iter_mut() {
        player.alive = player.chips > 0;
        if !player.alive {
            table.events.push(TableEvent::SatOut { player_id: player.id });
        }
    }
    info!("hand {} started, {} players in", table.hands_played, table.alive_count());

    // 3. Ante, then cards
    collect_ante(table);
    deal_hands(table, rng)?;

    table.phase = GamePhase::Round(1);
    Ok(())
}

/// Everyone pays the ante, or whatever they have left.
pub fn collect_ante(table: &mut Table) {
    table.phase = GamePhase::AnteCollection;
    let ante = table.config.ante;
    for player in table.players.iter_mut() {
        let paid = player.pay(ante);
        if paid > 0 {
            table.pot += paid;
            table.events.push(TableEvent::AntePaid { player_id: player.id, amount: paid });
        }
    }
    debug!("ante collected, pot {}", table.pot);
}

/// Shuffles a fresh deck and deals three cards to every seat.
pub fn deal_hands<R: Rng + ?Sized>(table: &mut Table, rng: &mut R) -> Result<()> {
    table.phase = GamePhase::Dealing;
    let mut deck = Deck::shuffled(rng);
    for player in table.players.iter_mut() {
        player.hand = Some(deck.deal_hand()?);
        player.seen = false;
        player.last_spoke_round = None;
    }
    table.events.push(TableEvent::CardsDealt { cards_left: deck.len() });
    table.deck = deck;
    Ok(())
}

/// Gives every player who can act one turn, in seating order.
///
/// Players who are out of the hand or out of chips are skipped. The round
/// ends early once at most one player is left.
pub fn run_betting_round(table: &mut Table, round: u32, resolvers: &mut Resolvers) -> Result<()> {
    if !table.hand_in_progress() {
        return Err(BragError::HandNotInProgress);
    }
    table.phase = GamePhase::Round(round);
    table.events.push(TableEvent::RoundStarted { round });
    debug!("round {} starts, pot {}, call {}", round, table.pot, table.current_call);

    for seat in 0..table.players.len() {
        if table.alive_count() <= 1 {
            break;
        }
        if !table.players[seat].can_act() {
            continue;
        }
        let id = table.players[seat].id;
        let resolver = resolvers.get_mut(&id).ok_or(BragError::MissingResolver(id))?;
        play_turn(table, seat, round, resolver.as_mut())?;
    }
    Ok(())
}

/// One player's turn. Looking at the cards does not end the turn, so the
/// resolver is asked again afterwards.
fn play_turn(table: &mut Table, seat: usize, round: u32, resolver: &mut dyn ActionResolver) -> Result<Action> {
    let id = table.players[seat].id;
    let mut view_requests = 0;
    loop {
        maybe_speak(table, seat, round, resolver);

        let action = {
            let view: &Table = table;
            resolver.resolve(&TurnContext { table: view, player: &view.players[seat], round })
        };
        if action != Action::ViewCards {
            return handle_player_action(table, id, action);
        }

        view_requests += 1;
        if view_requests > MAX_VIEW_REQUESTS {
            redirect(table, id, action, Action::Call, RedirectReason::TooManyViewRequests);
            return handle_player_action(table, id, Action::Call);
        }
        handle_player_action(table, id, action)?;
    }
}

fn maybe_speak(table: &mut Table, seat: usize, round: u32, resolver: &mut dyn ActionResolver) {
    let player = &table.players[seat];
    if !player.seen || player.last_spoke_round == Some(round) {
        return;
    }
    let remark = resolver.remark(&TurnContext { table: &*table, player, round });

    let player = &mut table.players[seat];
    player.last_spoke_round = Some(round);
    if let Some(remark) = remark {
        debug!("{} says {:?}", player.name, remark.text);
        table.events.push(TableEvent::Spoke { player_id: player.id, remark });
    }
}

/// Applies one resolved action and returns the action that actually took
/// effect.
///
/// Raises that cannot stand (below the current call, above the raiser's
/// stack, or from a stack that cannot even cover the call) become calls, as
/// does a challenge with nobody to challenge. Substitutions are logged as
/// `TableEvent::Redirected`.
pub fn handle_player_action(table: &mut Table, player_id: PlayerId, action: Action) -> Result<Action> {
    if !table.hand_in_progress() {
        return Err(BragError::HandNotInProgress);
    }
    let seat = table.seat_of(&player_id)?;
    if !table.players[seat].alive {
        return Err(BragError::PlayerNotInHand(player_id));
    }

    let applied = match action {
        Action::Fold => {
            table.players[seat].alive = false;
            table.events.push(TableEvent::Folded { player_id });
            debug!("{} folds", table.players[seat].name);
            Action::Fold
        }
        Action::Call => call(table, seat),
        Action::Raise(amount) => raise(table, seat, amount),
        Action::Challenge(target) => challenge(table, seat, target)?,
        Action::ViewCards => {
            let player = &mut table.players[seat];
            if !player.seen {
                player.seen = true;
                table.events.push(TableEvent::CardsViewed { player_id });
            }
            Action::ViewCards
        }
    };

    // Nobody left to play against: the hand goes straight to settlement
    if table.alive_count() <= 1 {
        table.phase = GamePhase::Settlement;
        debug!("one player left, hand {} moves to settlement", table.hands_played);
    }
    Ok(applied)
}

fn call(table: &mut Table, seat: usize) -> Action {
    let player = &mut table.players[seat];
    let paid = player.pay(table.current_call);
    table.pot += paid;
    table.events.push(TableEvent::Called { player_id: player.id, amount: paid, pot: table.pot });
    debug!("{} calls {}", player.name, paid);
    Action::Call
}

fn raise(table: &mut Table, seat: usize, amount: u32) -> Action {
    let id = table.players[seat].id;
    let chips = table.players[seat].chips;
    let rejected = if chips < table.current_call {
        Some(RedirectReason::CannotCoverCall)
    } else if amount < table.current_call {
        Some(RedirectReason::RaiseTooSmall)
    } else if amount > chips {
        Some(RedirectReason::RaiseTooLarge)
    } else {
        None
    };
    if let Some(reason) = rejected {
        redirect(table, id, Action::Raise(amount), Action::Call, reason);
        return call(table, seat);
    }

    let paid = table.players[seat].pay(amount);
    table.pot += paid;
    table.current_call = amount;
    table.last_raiser = Some(id);
    table.events.push(TableEvent::Raised { player_id: id, to: amount, pot: table.pot });
    debug!("{} raises to {}", table.players[seat].name, amount);
    Action::Raise(amount)
}

/// Pays the call as a fee and settles a two-player showdown on the spot.
/// The challenger wins ties; the loser is out of the hand.
fn challenge(table: &mut Table, seat: usize, target: PlayerId) -> Result<Action> {
    let challenger = table.players[seat].id;
    let targets: Vec<PlayerId> = table.challenge_targets(&challenger).iter().map(|p| p.id).collect();
    let Some(&fallback) = targets.first() else {
        redirect(table, challenger, Action::Challenge(target), Action::Call, RedirectReason::NoChallengeTarget);
        return Ok(call(table, seat));
    };
    let target = if targets.contains(&target) {
        target
    } else {
        redirect(
            table,
            challenger,
            Action::Challenge(target),
            Action::Challenge(fallback),
            RedirectReason::InvalidChallengeTarget,
        );
        fallback
    };

    let target_seat = table.seat_of(&target)?;
    let (Some(challenger_hand), Some(target_hand)) = (table.players[seat].hand, table.players[target_seat].hand) else {
        return Err(BragError::HandNotInProgress);
    };

    let fee = table.players[seat].pay(table.current_call);
    table.pot += fee;
    table.events.push(TableEvent::Challenged { challenger, target, fee, challenger_hand, target_hand });

    let (winner_seat, loser_seat) = match compare(&challenger_hand.evaluate(), &target_hand.evaluate()) {
        Outcome::B => (target_seat, seat),
        Outcome::A | Outcome::Tie => (seat, target_seat),
    };
    table.players[loser_seat].alive = false;
    let (winner, loser) = (table.players[winner_seat].id, table.players[loser_seat].id);
    table.events.push(TableEvent::Eliminated { player_id: loser, by: winner });
    debug!(
        "{} challenges {} for {}: {} is out",
        table.players[seat].name, table.players[target_seat].name, fee, table.players[loser_seat].name
    );
    Ok(Action::Challenge(target))
}

fn redirect(table: &mut Table, player_id: PlayerId, requested: Action, applied: Action, reason: RedirectReason) {
    warn!("{:?} from {} redirected to {:?}: {:?}", requested, player_id, applied, reason);
    table.events.push(TableEvent::Redirected { player_id, requested, applied, reason });
}

/// Pays out the pot.
///
/// - A lone survivor takes everything.
/// - Otherwise all alive hands are shown and the best comparison key wins.
/// - Tied winners split by integer division; the remainder is not paid out
///   to anyone. There are no side pots, so an all-in player can win the
///   whole pot.
///
/// Runs once per hand: outside a hand, or after the pot was already paid,
/// it fails with `HandNotInProgress`.
pub fn settle(table: &mut Table) -> Result<Vec<Payout>> {
    if !matches!(table.phase, GamePhase::Round(_) | GamePhase::Settlement) {
        return Err(BragError::HandNotInProgress);
    }
    table.phase = GamePhase::Settlement;
    let alive: Vec<usize> = (0..table.players.len()).filter(|&s| table.players[s].alive).collect();

    let winners: Vec<usize> = match alive.as_slice() {
        [] => {
            warn!("nobody left to take a pot of {}", table.pot);
            vec![]
        }
        [only] => vec![*only],
        _ => {
            let entries: Vec<(usize, ShowdownEntry)> = alive
                .iter()
                .filter_map(|&s| {
                    let player = &table.players[s];
                    player.hand.map(|hand| (s, ShowdownEntry { player_id: player.id, hand, key: hand.evaluate() }))
                })
                .collect();
            let best = entries.iter().map(|(_, e)| &e.key).max().cloned();
            let winners: Vec<usize> = entries.iter().filter(|(_, e)| Some(&e.key) == best.as_ref()).map(|(s, _)| *s).collect();
            table.events.push(TableEvent::Showdown { results: entries.into_iter().map(|(_, e)| e).collect() });
            winners
        }
    };

    Ok(distribute_pot(table, &winners))
}

fn distribute_pot(table: &mut Table, winners: &[usize]) -> Vec<Payout> {
    let pot = table.pot;
    let (share, undistributed) = match winners.len() as u32 {
        0 => (0, pot),
        n => (pot / n, pot % n),
    };

    let payouts: Vec<Payout> = winners
        .iter()
        .map(|&s| {
            let player = &mut table.players[s];
            player.chips += share;
            Payout { player_id: player.id, amount: share }
        })
        .collect();

    for payout in &payouts {
        if let Some(p) = table.player(&payout.player_id) {
            info!("{} wins {}", p.name, payout.amount);
        }
    }
    table.pot = 0;
    table.events.push(TableEvent::PotAwarded { payouts: payouts.clone(), undistributed });
    table.phase = GamePhase::HandOver;
    payouts
}

// --- Unit tests ---
