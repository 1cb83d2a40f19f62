//! Built-in opponent policy.
//!
//! An agent scores its hand once per turn and then makes a handful of weighted
//! coin flips. Every flip draws from the agent's own rng, so a seeded agent
//! replays the same decisions given the same table.

use crate::card::{Hand, HandCategory};
use crate::logic::{ActionResolver, Resolvers, TurnContext};
use crate::message::{Remark, Tone};
use crate::state::{Action, PlayerId, PlayerKind, Table};
use rand::prelude::*;
use rand::rngs::StdRng;

const STRONG_PHRASES: [&str; 4] = [
    "Not bad at all, haha~ 😏",
    "Heh, this could be dangerous for you.",
    "Solid. Very solid.",
    "Don't worry, my hand is just okay. 😌",
];

const WEAK_PHRASES: [&str; 4] = [
    "Hmm… a bit awkward.",
    "Uh-oh, that's rough.",
    "Luck isn't great today.",
    "(Silent smile.)",
];

/// Strength every hand of a category starts from.
pub fn base_strength(category: HandCategory) -> f64 {
    match category {
        HandCategory::HighCard => 0.35,
        HandCategory::Pair => 0.6,
        HandCategory::Straight => 0.75,
        HandCategory::Flush => 0.78,
        HandCategory::StraightFlush => 0.92,
        HandCategory::Trips => 0.98,
    }
}

/// Rough strength in `[0, 1]`: the category's base score nudged by the
/// highest rank held (a 6 is neutral, an ace adds 0.08).
pub fn estimate_strength(hand: &Hand) -> f64 {
    let base = base_strength(hand.evaluate().category);
    let bonus = (hand.high_rank().value() as f64 - 6.0) / 10.0;
    (base + bonus * 0.1).clamp(0.0, 1.0)
}

/// What the policy needs to know about the table.
#[derive(Debug, Clone)]
pub struct DecisionContext {
    pub chips: u32,
    pub current_call: u32,
    pub alive_count: usize,
    /// Alive opponents in seating order
    pub targets: Vec<(PlayerId, PlayerKind)>,
}

impl DecisionContext {
    pub fn from_turn(turn: &TurnContext) -> DecisionContext {
        DecisionContext {
            chips: turn.player.chips,
            current_call: turn.table.current_call,
            alive_count: turn.table.alive_count(),
            targets: turn
                .table
                .challenge_targets(&turn.player.id)
                .into_iter()
                .map(|p| (p.id, p.kind))
                .collect(),
        }
    }
}

/// Picks the action for a hand of the given strength.
///
/// 1. strength >= 0.9 and double the call is affordable: raise to double, p = 0.7
/// 2. strength <= 0.25: fold, p = 0.5
/// 3. strength >= 0.6 with an opponent alive: challenge, p = 0.2
/// 4. call
///
/// A branch whose flip misses falls through to the next one.
pub fn decide<R: Rng + ?Sized>(strength: f64, ctx: &DecisionContext, rng: &mut R) -> Action {
    let double = ctx.current_call.saturating_mul(2);
    if strength >= 0.9 && ctx.chips >= double && rng.random::<f64>() < 0.7 {
        return Action::Raise(double);
    }
    if strength <= 0.25 && rng.random::<f64>() < 0.5 {
        return Action::Fold;
    }
    if strength >= 0.6 && rng.random::<f64>() < 0.2 && ctx.alive_count >= 2 {
        if let Some(target) = pick_target(ctx, rng) {
            return Action::Challenge(target);
        }
    }
    Action::Call
}

/// The human if one is still in, otherwise any alive opponent.
fn pick_target<R: Rng + ?Sized>(ctx: &DecisionContext, rng: &mut R) -> Option<PlayerId> {
    ctx.targets
        .iter()
        .find(|(_, kind)| *kind == PlayerKind::Human)
        .or_else(|| ctx.targets.choose(rng))
        .map(|(id, _)| *id)
}

/// Whether to look at the cards before acting. Strong hands always look.
pub fn should_view<R: Rng + ?Sized>(strength: f64, rng: &mut R) -> bool {
    strength >= 0.75 || rng.random::<f64>() < 0.35
}

/// Table talk. Strong hands usually sound strong and weak hands usually
/// sound weak, but about a third of the time the agent bluffs the other way.
pub fn remark<R: Rng + ?Sized>(strength: f64, rng: &mut R) -> Remark {
    let honest = rng.random::<f64>() > 0.35;
    let tone = match (strength > 0.7, honest) {
        (true, true) | (false, false) => Tone::Strong,
        _ => Tone::Weak,
    };
    let pool = if tone == Tone::Strong { &STRONG_PHRASES } else { &WEAK_PHRASES };
    let text = pool.choose(rng).copied().unwrap_or_default();
    Remark::new(tone, text)
}

/// An automated player. Owns its rng so it can be seeded on its own.
#[derive(Debug, Clone)]
pub struct Agent {
    rng: StdRng,
}

impl Agent {
    pub fn new(seed: u64) -> Agent {
        Agent { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn from_os_rng() -> Agent {
        Agent { rng: StdRng::from_os_rng() }
    }
}

impl ActionResolver for Agent {
    fn resolve(&mut self, turn: &TurnContext) -> Action {
        let Some(hand) = turn.player.hand else {
            return Action::Call;
        };
        let strength = estimate_strength(&hand);
        if !turn.player.seen && should_view(strength, &mut self.rng) {
            return Action::ViewCards;
        }
        decide(strength, &DecisionContext::from_turn(turn), &mut self.rng)
    }

    fn remark(&mut self, turn: &TurnContext) -> Option<Remark> {
        let hand = turn.player.hand?;
        Some(remark(estimate_strength(&hand), &mut self.rng))
    }
}

/// An `Agent` for every agent seat at the table. With a seed, seat `i` is
/// seeded with `seed + i` so every agent replays on its own.
pub fn seat_agents(table: &Table, seed: Option<u64>) -> Resolvers {
    table
        .players
        .iter()
        .enumerate()
        .filter(|(_, p)| p.kind == PlayerKind::Agent)
        .map(|(seat, p)| {
            let agent = match seed {
                Some(seed) => Agent::new(seed.wrapping_add(seat as u64)),
                None => Agent::from_os_rng(),
            };
            (p.id, Box::new(agent) as Box<dyn ActionResolver>)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::TableEvent;
    use rand::RngCore;
    use uuid::Uuid;

    /// Yields the same word forever: `Low` makes every flip hit, `High`
    /// makes every flip miss.
    enum FixedRng {
        Low,
        High,
    }

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            self.next_u64() as u32
        }

        fn next_u64(&mut self) -> u64 {
            match self {
                FixedRng::Low => 0,
                FixedRng::High => u64::MAX,
            }
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            let byte = self.next_u64() as u8;
            dest.iter_mut().for_each(|b| *b = byte);
        }
    }

    fn strength(text: &str) -> f64 {
        estimate_strength(&text.parse().unwrap())
    }

    fn context(chips: u32, current_call: u32, targets: Vec<(PlayerId, PlayerKind)>) -> DecisionContext {
        DecisionContext { chips, current_call, alive_count: targets.len() + 1, targets }
    }

    #[test]
    fn test_strength_estimates() {
        assert!((strength("2♦ 3♣ 5♥") - 0.34).abs() < 1e-9);
        assert!((strength("9♠ 9♥ 2♦") - 0.63).abs() < 1e-9);
        assert!((strength("4♠ 5♥ 6♦") - 0.75).abs() < 1e-9);
        assert_eq!(strength("A♠ A♥ A♦"), 1.0);
        assert!(strength("K♠ K♥ K♦") <= 1.0);
    }

    #[test]
    fn test_strong_hand_raises_to_double() {
        let ctx = context(100, 20, vec![(Uuid::new_v4(), PlayerKind::Agent)]);
        assert_eq!(decide(0.95, &ctx, &mut FixedRng::Low), Action::Raise(40));
    }

    #[test]
    fn test_strong_hand_that_cannot_afford_double_challenges_the_human() {
        let human = Uuid::new_v4();
        let ctx = context(30, 20, vec![(Uuid::new_v4(), PlayerKind::Agent), (human, PlayerKind::Human)]);
        assert_eq!(decide(0.95, &ctx, &mut FixedRng::Low), Action::Challenge(human));
    }

    #[test]
    fn test_challenge_without_human_picks_an_opponent() {
        let bots = vec![(Uuid::new_v4(), PlayerKind::Agent), (Uuid::new_v4(), PlayerKind::Agent)];
        let ctx = context(100, 20, bots.clone());
        match decide(0.7, &ctx, &mut StdRng::seed_from_u64(3)) {
            Action::Challenge(id) => assert!(bots.iter().any(|(b, _)| *b == id)),
            Action::Call => {}
            other => panic!("unexpected {:?}", other),
        }
        match decide(0.7, &ctx, &mut FixedRng::Low) {
            Action::Challenge(id) => assert!(bots.iter().any(|(b, _)| *b == id)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_weak_hand_folds() {
        let ctx = context(100, 20, vec![(Uuid::new_v4(), PlayerKind::Agent)]);
        assert_eq!(decide(0.2, &ctx, &mut FixedRng::Low), Action::Fold);
        assert_eq!(decide(0.2, &ctx, &mut FixedRng::High), Action::Call);
    }

    #[test]
    fn test_missed_flips_fall_back_to_call() {
        let ctx = context(100, 20, vec![(Uuid::new_v4(), PlayerKind::Human)]);
        assert_eq!(decide(0.95, &ctx, &mut FixedRng::High), Action::Call);
        assert_eq!(decide(0.5, &ctx, &mut FixedRng::Low), Action::Call);
    }

    #[test]
    fn test_no_challenge_when_alone() {
        let ctx = DecisionContext { chips: 10, current_call: 20, alive_count: 1, targets: vec![] };
        assert_eq!(decide(0.95, &ctx, &mut FixedRng::Low), Action::Call);
    }

    #[test]
    fn test_view_decision() {
        assert!(should_view(0.8, &mut FixedRng::High));
        assert!(!should_view(0.5, &mut FixedRng::High));
        assert!(should_view(0.5, &mut FixedRng::Low));
    }

    #[test]
    fn test_raise_frequency() {
        let ctx = context(1000, 20, vec![(Uuid::new_v4(), PlayerKind::Agent)]);
        let mut rng = StdRng::seed_from_u64(11);
        let raises = (0..10_000)
            .filter(|_| matches!(decide(0.95, &ctx, &mut rng), Action::Raise(40)))
            .count();
        assert!((6_700..=7_300).contains(&raises), "raised {} times", raises);
    }

    #[test]
    fn test_remark_tone_follows_strength_unless_bluffing() {
        // High rng means honest
        assert_eq!(remark(0.9, &mut FixedRng::High).tone, Tone::Strong);
        assert_eq!(remark(0.4, &mut FixedRng::High).tone, Tone::Weak);
        assert_eq!(remark(0.9, &mut FixedRng::Low).tone, Tone::Weak);
        assert_eq!(remark(0.4, &mut FixedRng::Low).tone, Tone::Strong);
        assert!(!remark(0.4, &mut FixedRng::Low).text.is_empty());
    }

    #[test]
    fn test_seeded_agents_agree() {
        let ctx = context(500, 20, vec![(Uuid::new_v4(), PlayerKind::Agent), (Uuid::new_v4(), PlayerKind::Agent)]);
        let mut a = Agent::new(99);
        let mut b = Agent::new(99);
        let run = |agent: &mut Agent| -> Vec<Action> {
            (0..50).map(|i| decide(0.5 + i as f64 / 100.0, &ctx, &mut agent.rng)).collect()
        };
        assert_eq!(run(&mut a), run(&mut b));
    }

    // Helper: a hand in progress between agents holding the given cards
    fn dealt_table(hands: &[&str]) -> Table {
        let players = (0..hands.len()).map(|i| crate::state::Player::agent(format!("Bot{}", i + 1), 200)).collect();
        let config = crate::state::TableConfig { agents: hands.len() - 1, ..Default::default() };
        let mut table = Table::new(config, players).unwrap();
        crate::logic::start_new_hand(&mut table, &mut StdRng::seed_from_u64(0)).unwrap();
        for (player, text) in table.players.iter_mut().zip(hands) {
            player.hand = Some(text.parse().unwrap());
        }
        table
    }

    #[test]
    fn test_strong_agent_looks_before_it_acts() {
        let mut table = dealt_table(&["A♠ A♥ A♦", "2♠ 5♥ 9♦"]);
        let mut agent = Agent::new(17);

        let first = agent.resolve(&TurnContext { table: &table, player: &table.players[0], round: 1 });
        assert_eq!(first, Action::ViewCards);

        table.players[0].seen = true;
        let mut twin = agent.clone();
        let turn = TurnContext { table: &table, player: &table.players[0], round: 1 };
        let expected = decide(1.0, &DecisionContext::from_turn(&turn), &mut twin.rng);
        assert_eq!(agent.resolve(&turn), expected);
        assert_ne!(expected, Action::ViewCards);
    }

    #[test]
    fn test_blind_weak_agent_keeps_considering_a_look() {
        let table = dealt_table(&["2♦ 3♣ 5♥", "K♠ K♥ 3♦"]);
        let turn = TurnContext { table: &table, player: &table.players[0], round: 1 };
        let mut agent = Agent::new(5);

        let actions: Vec<Action> = (0..50).map(|_| agent.resolve(&turn)).collect();
        // Too strong to fold, too weak to challenge
        assert!(actions.iter().all(|a| matches!(a, Action::ViewCards | Action::Call)));
        assert!(actions.contains(&Action::ViewCards));
        assert!(actions.contains(&Action::Call));
    }

    #[test]
    fn test_agent_views_then_acts_in_a_betting_round() {
        let mut table = dealt_table(&["A♠ A♥ A♦", "2♦ 3♣ 5♥"]);
        let mut resolvers = seat_agents(&table, Some(8));
        let p0 = table.players[0].id;

        crate::logic::run_betting_round(&mut table, 1, &mut resolvers).unwrap();
        assert!(table.players[0].seen);
        let acted = |e: &TableEvent| match e {
            TableEvent::Called { player_id, .. } | TableEvent::Raised { player_id, .. } => *player_id == p0,
            TableEvent::Challenged { challenger, .. } => *challenger == p0,
            _ => false,
        };
        let viewed = table.events.iter().position(|e| *e == TableEvent::CardsViewed { player_id: p0 });
        let played = table.events.iter().position(acted);
        assert!(viewed.is_some() && played.is_some());
        assert!(viewed < played);
    }

    #[test]
    fn test_seat_agents_skips_the_human() {
        let table = Table::with_human(crate::state::TableConfig::default(), "You").unwrap();
        let resolvers = seat_agents(&table, Some(1));
        assert_eq!(resolvers.len(), 2);
        assert!(!resolvers.contains_key(&table.players[0].id));
    }
}
