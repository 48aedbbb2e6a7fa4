use std::collections::BTreeMap;
use std::path::Path;

use advent_core::NOWHERE;
use advent_fiction::SessionConfig;
use comfy_table::{ContentArrangement, Table};

pub fn run(path: &Path) -> Result<(), String> {
    let scenario = super::load_scenario(path)?;
    let title = scenario.world.title.clone();
    let behaviors = scenario.behaviors.len();
    let dialogues = scenario.dialogues.len();
    let products: usize = scenario.vendors.values().map(|m| m.products.len()).sum();
    let vendors = scenario.vendors.len();

    let session = scenario
        .into_session(SessionConfig::default())
        .map_err(|e| format!("{}: {e}", path.display()))?;

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for entity in session
        .world()
        .entities()
        .filter(|e| e.key.as_str() != NOWHERE)
    {
        *counts.entry(entity.kind.label()).or_default() += 1;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Kind", "Count"]);
    for (kind, count) in &counts {
        table.add_row(vec![kind.to_string(), count.to_string()]);
    }
    table.add_row(vec!["behavior".to_string(), behaviors.to_string()]);
    table.add_row(vec!["dialogue".to_string(), dialogues.to_string()]);
    table.add_row(vec![
        "vending machine".to_string(),
        format!("{vendors} ({products} products)"),
    ]);

    println!("{table}");
    println!();
    println!("  All checks passed for '{title}'.");
    println!(
        "  Player '{}' starts with {}.",
        session.player(),
        session.money()
    );

    Ok(())
}
