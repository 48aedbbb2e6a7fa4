use std::io::{self, BufRead, Write};
use std::path::Path;

use advent_fiction::{Mode, SessionConfig};
use colored::Colorize;

pub fn run(path: &Path, seed: u64, urgency_step: u32) -> Result<(), String> {
    let config = SessionConfig::default()
        .with_seed(seed)
        .with_urgency_step(urgency_step);
    let mut session = super::load_session(path, config)?;

    let mut intro = session.intro().map_err(|e| e.to_string())?.into_iter();
    if let Some(title) = intro.next() {
        println!("  {}", title.bold());
    }
    for line in intro {
        println!("{line}");
    }
    println!("\n  Type 'help' for commands, 'quit' to exit.\n");

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    while !session.is_finished() {
        let prompt = match session.mode() {
            Mode::Exploring => ">",
            Mode::Conversation { .. } => "?",
            Mode::Vending { .. } => "$",
        };
        print!("{} ", prompt.cyan());
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break, // EOF
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match session.process(input) {
            Ok(output) => {
                for text in output {
                    println!("{text}");
                }
                println!();
            }
            Err(e) => {
                println!("{}\n", e.to_string().yellow());
            }
        }
    }

    println!(
        "  {} turns | {} | urgency {}",
        session.turns(),
        session.money(),
        session.urgency().level()
    );
    Ok(())
}
