use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use brag_core::{Action, ActionResolver, Remark, Tone, TurnContext};

use crate::render::{self, EventPrinter};

/// The human seat: shows the table on stdout and reads commands from stdin.
/// End of input folds the hand.
pub struct Console {
    printer: Rc<RefCell<EventPrinter>>,
}

impl Console {
    pub fn new(printer: Rc<RefCell<EventPrinter>>) -> Console {
        Console { printer }
    }
}

/// Reads one trimmed line, `None` at end of input.
pub fn prompt(text: &str) -> Option<String> {
    print!("{}", text);
    io::stdout().flush().ok()?;
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

/// Yes unless the answer starts with `n`.
pub fn confirm(text: &str) -> bool {
    prompt(text).is_some_and(|answer| !answer.to_lowercase().starts_with('n'))
}

impl ActionResolver for Console {
    fn resolve(&mut self, turn: &TurnContext) -> Action {
        self.printer.borrow_mut().flush(turn.table);
        render::print_state(turn.table);

        let me = turn.player;
        match (me.seen, me.hand) {
            (true, Some(hand)) => println!("\nYour hand: {}", hand),
            _ => println!("\nYour hand: (hidden, press K to view)"),
        }

        loop {
            let Some(command) = prompt(&format!(
                "[F]old  [C]all({})  [R]aise  [V] Compare  [K] View\nYour move: ",
                turn.current_call()
            )) else {
                return Action::Fold;
            };
            match command.to_lowercase().as_str() {
                "f" => return Action::Fold,
                "c" => return Action::Call,
                "r" => {
                    let text = format!("Raise to (>= {}, <= {}): ", turn.current_call(), me.chips);
                    // Anything unreadable is a call
                    return prompt(&text)
                        .and_then(|amount| amount.parse().ok())
                        .map_or(Action::Call, Action::Raise);
                }
                "v" => {
                    let targets = turn.targets();
                    // An empty list leaves the engine to turn this into a call
                    let Some(first) = targets.first() else {
                        return Action::Challenge(me.id);
                    };
                    for (i, p) in targets.iter().enumerate() {
                        println!("{}) {}{}", i + 1, p.name, if p.seen { "" } else { " (Blind)" });
                    }
                    let choice = prompt("Choose a player to compare with: ")
                        .and_then(|n| n.parse::<usize>().ok())
                        .and_then(|n| n.checked_sub(1))
                        .and_then(|i| targets.get(i));
                    return Action::Challenge(choice.unwrap_or(first).id);
                }
                "k" if me.seen => println!("You have already viewed your cards."),
                "k" => return Action::ViewCards,
                _ => println!("Invalid command. Try again."),
            }
        }
    }

    fn remark(&mut self, turn: &TurnContext) -> Option<Remark> {
        self.printer.borrow_mut().flush(turn.table);
        if let Some(hand) = turn.player.hand {
            println!("\nYou see: {}", hand);
        }
        println!("\nChoose your speech (bluff) strategy:");
        println!("1) Boast (intimidate others)");
        println!("2) Act disappointed (pretend weak)");
        println!("3) Be honest: sigh (weak hand)");
        println!("4) Be honest: confident (strong hand)");
        println!("5) Stay silent");

        let remark = match prompt("Your choice (1-5): ")?.as_str() {
            "1" => Remark::new(Tone::Strong, "Haha, this hand is almost too good to play. 😏"),
            "2" => Remark::new(Tone::Weak, "Sigh… luck's not on my side today…"),
            "3" => Remark::new(Tone::Weak, "Oh no… I can already tell this is bad."),
            "4" => Remark::new(Tone::Strong, "Is that it? Feels rock-solid to me. 😎"),
            _ => Remark::new(Tone::Silent, "(silence)"),
        };
        Some(remark)
    }
}
