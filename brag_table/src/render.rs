use brag_core::{PlayerId, RedirectReason, Table, TableEvent};

/// Prints the event log of the hand in progress, picking up where it left
/// off the last time it was flushed.
#[derive(Debug, Default)]
pub struct EventPrinter {
    hand: u32,
    cursor: usize,
}

impl EventPrinter {
    pub fn flush(&mut self, table: &Table) {
        if table.hands_played != self.hand {
            self.hand = table.hands_played;
            self.cursor = 0;
        }
        for event in &table.events[self.cursor.min(table.events.len())..] {
            if let Some(line) = describe(event, table) {
                println!("{}", line);
            }
        }
        self.cursor = table.events.len();
    }
}

fn name(table: &Table, id: &PlayerId) -> String {
    table.player(id).map_or_else(|| id.to_string(), |p| p.name.clone())
}

fn describe(event: &TableEvent, table: &Table) -> Option<String> {
    let line = match event {
        TableEvent::HandStarted { hand_number, current_call, .. } => {
            format!("\n================= Hand {} (call {}) =================", hand_number, current_call)
        }
        TableEvent::AntePaid { player_id, amount } => format!("{} antes {}", name(table, player_id), amount),
        TableEvent::SatOut { player_id } => format!("{} has no chips and sits this hand out", name(table, player_id)),
        TableEvent::CardsDealt { .. } => return None,
        TableEvent::RoundStarted { round } => format!("\n— Round {} —", round),
        TableEvent::CardsViewed { player_id } => format!("{} looks at their cards", name(table, player_id)),
        TableEvent::Spoke { player_id, remark } => format!("{} says: {}", name(table, player_id), remark.text),
        TableEvent::Folded { player_id } => format!("{} folds.", name(table, player_id)),
        TableEvent::Called { player_id, amount, .. } => format!("{} calls {}", name(table, player_id), amount),
        TableEvent::Raised { player_id, to, .. } => format!("{} raises to {}", name(table, player_id), to),
        TableEvent::Redirected { player_id, reason, .. } => {
            let why = match reason {
                RedirectReason::RaiseTooSmall => "too small to raise, calling instead",
                RedirectReason::RaiseTooLarge => "not that many chips, calling instead",
                RedirectReason::CannotCoverCall => "not enough chips to raise, calling instead",
                RedirectReason::NoChallengeTarget => "no one to compare with, calling instead",
                RedirectReason::InvalidChallengeTarget => "invalid choice, comparing with the first player",
                RedirectReason::TooManyViewRequests => "still undecided, calling",
            };
            format!("{}: {}", name(table, player_id), why)
        }
        TableEvent::Challenged { challenger, target, fee, challenger_hand, target_hand } => {
            let (a, b) = (name(table, challenger), name(table, target));
            format!(
                "{} challenges {}! (compare fee {})\n  {} shows: {}\n  {} shows: {}",
                a, b, fee, a, challenger_hand, b, target_hand
            )
        }
        TableEvent::Eliminated { player_id, by } => {
            format!("  {} wins. {} is out.", name(table, by), name(table, player_id))
        }
        TableEvent::Showdown { results } => {
            let mut text = String::from("\n--- Showdown ---");
            for entry in results {
                text.push_str(&format!("\n{}: {} ({})", name(table, &entry.player_id), entry.hand, entry.key.category));
            }
            text
        }
        TableEvent::PotAwarded { payouts, undistributed } => {
            let names: Vec<String> = payouts.iter().map(|p| name(table, &p.player_id)).collect();
            let share = payouts.first().map_or(0, |p| p.amount);
            let mut text = format!("*** Winner(s): {}, each receives {} ***", names.join(", "), share);
            if *undistributed > 0 {
                text.push_str(&format!(" ({} left over from the split)", undistributed));
            }
            text
        }
    };
    Some(line)
}

pub fn print_state(table: &Table) {
    println!("\n==== Table ====");
    println!("Pot: {} | Current call: {}", table.pot, table.current_call);
    for p in &table.players {
        let status = if p.alive { "In" } else { "Out" };
        let seen = if p.seen { "Seen" } else { "Blind" };
        let me = if p.is_human() { " (You)" } else { "" };
        println!("- {}{}: chips {} | {} | {}", p.name, me, p.chips, status, seen);
    }
    println!("================");
}

pub fn print_balances(table: &Table) {
    println!("\n--- Balances ---");
    for p in &table.players {
        println!("{}: {}", p.name, p.chips);
    }
}
