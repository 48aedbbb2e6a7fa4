use std::path::Path;

use advent_fiction::{SessionConfig, Target};

pub fn run(path: &Path, input: &str) -> Result<(), String> {
    let session = super::load_session(path, SessionConfig::default())?;
    let tree = session.parse(input);

    let direct = match &tree.direct {
        Some(Target::Entity(key)) => key.to_string(),
        Some(Target::Direction(direction)) => direction.to_string(),
        None => "-".to_string(),
    };
    let indirect = tree
        .indirect
        .as_ref()
        .map_or_else(|| "-".to_string(), ToString::to_string);

    println!("  Input:    {}", tree.raw);
    println!("  Tokens:   {}", tree.tokens.join(" | "));
    println!("  Verb:     {}", tree.action.as_deref().unwrap_or("-"));
    println!("  Direct:   {direct}");
    println!("  Indirect: {indirect}");
    match &tree.failure {
        Some(failure) => println!("  Failed:   {failure}"),
        None => println!("  Parsed:   {}", tree.response),
    }

    Ok(())
}
