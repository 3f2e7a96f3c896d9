use colored::Colorize;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use crate::action::Action;
use crate::cards::{Card, Suit};
use crate::history::{History, LogEntry};
use crate::tables::StrategyStore;

pub fn cards_display(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|card| {
            let text = format!("{}{}", card.rank.to_char(), card.suit.symbol());
            match card.suit {
                Suit::Spades => text.white().to_string(),
                Suit::Hearts => text.red().to_string(),
                Suit::Diamonds => text.blue().to_string(),
                Suit::Clubs => text.green().to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn probability_bar(p: f64, width: usize) -> String {
    let filled = ((p.clamp(0.0, 1.0)) * width as f64).round() as usize;
    let bar: String = "\u{2588}".repeat(filled) + &"\u{2591}".repeat(width - filled);
    let pct = format!("{:5.1}%", p * 100.0);

    if p >= 0.5 {
        format!("{} {}", bar.green(), pct)
    } else if p >= 0.2 {
        format!("{} {}", bar.yellow(), pct)
    } else {
        format!("{} {}", bar.dimmed(), pct)
    }
}

pub fn styled_action(action: Action) -> String {
    let text = action.shorthand();
    match action {
        Action::Bet(_) | Action::Raise(_) => text.red().bold().to_string(),
        Action::Call => text.green().bold().to_string(),
        Action::Check => text.yellow().bold().to_string(),
        Action::Fold => text.dimmed().bold().to_string(),
    }
}

pub fn strategy_table(distribution: &[(Action, f64)]) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Action").set_alignment(CellAlignment::Left),
        Cell::new("Frequency").set_alignment(CellAlignment::Left),
    ]);
    for &(action, p) in distribution {
        table.add_row(vec![
            Cell::new(styled_action(action)),
            Cell::new(probability_bar(p, 24)),
        ]);
    }
    table.to_string()
}

pub fn stats_table(store: &StrategyStore) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Table").set_alignment(CellAlignment::Left),
        Cell::new("Infosets").set_alignment(CellAlignment::Right),
        Cell::new("Cells").set_alignment(CellAlignment::Right),
    ]);
    for (name, rows) in [("regrets", store.regrets()), ("strategy", store.strategy())] {
        let cells: usize = rows.values().map(|r| r.len()).sum();
        table.add_row(vec![
            Cell::new(name.bold().to_string()),
            Cell::new(rows.len()).set_alignment(CellAlignment::Right),
            Cell::new(cells).set_alignment(CellAlignment::Right),
        ]);
    }
    table.to_string()
}

fn entry_line(entry: &LogEntry) -> String {
    match entry {
        LogEntry::Hands { hands, equity } => {
            let seat = |p: usize| match &hands[p] {
                Some(cards) => format!("{} ({:.3})", cards_display(cards), equity[p]),
                None => "?? ".to_string(),
            };
            format!("{}  P0 {}  P1 {}", "deal".cyan().bold(), seat(0), seat(1))
        }
        LogEntry::Board {
            street,
            board,
            equity,
        } => format!(
            "{}  {}  ({:.3} / {:.3})",
            street.tag().cyan().bold(),
            cards_display(board),
            equity[0],
            equity[1]
        ),
        LogEntry::Discard { player } => format!("P{} discards", player),
        LogEntry::StandPat { player } => format!("P{} keeps", player),
        LogEntry::Reveal {
            player,
            hand,
            equity,
        } => match hand {
            Some(cards) => format!("P{} now {} ({:.3})", player, cards_display(cards), equity),
            None => format!("P{} draws", player),
        },
        LogEntry::Act { player, action } => format!("P{} {}", player, styled_action(*action)),
    }
}

/// Multi-line replay of a finished hand with its payoff.
pub fn hand_replay(h: &History, utilities: [f64; 2]) -> String {
    let mut lines: Vec<String> = h.log().iter().map(|e| format!("  {}", entry_line(e))).collect();
    let payoff = |u: f64| {
        let text = format!("{:+.0}", u);
        if u > 0.0 {
            text.green().bold().to_string()
        } else if u < 0.0 {
            text.red().bold().to_string()
        } else {
            text.bold().to_string()
        }
    };
    lines.push(format!(
        "  {}  P0 {}  P1 {}  (pot {})",
        "result".cyan().bold(),
        payoff(utilities[0]),
        payoff(utilities[1]),
        h.pot()
    ));
    lines.join("\n")
}

pub fn print_section(title: &str, content: &str) {
    println!("\n{}", title.cyan().bold());
    println!("  {}", content);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}

pub fn print_success(msg: &str) {
    println!("{}", msg.green().bold());
}
