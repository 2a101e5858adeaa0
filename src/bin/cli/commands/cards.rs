use std::collections::HashMap;

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, user: Uuid, owned_only: bool, format: &OutputFormat) -> Result<()> {
    let unlocks = app
        .storage
        .list_unlocks(user)
        .context("Failed to list unlocks")?;
    let owned: HashMap<Uuid, _> = unlocks.iter().map(|u| (u.card_id, u.unlocked_at)).collect();

    let cards: Vec<_> = app
        .catalog
        .cards
        .iter()
        .filter(|c| !owned_only || owned.contains_key(&c.id))
        .collect();

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = cards
                .iter()
                .map(|card| {
                    serde_json::json!({
                        "id": card.id.to_string(),
                        "name": card.name,
                        "condition": card.condition,
                        "unlockedAt": owned.get(&card.id).map(|d| d.to_rfc3339()),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if cards.is_empty() {
                println!("No cards{}.", if owned_only { " owned" } else { "" });
                return Ok(());
            }

            let name_width = cards.iter().map(|c| c.name.len()).max().unwrap_or(4).clamp(4, 32);
            for card in &cards {
                match owned.get(&card.id) {
                    Some(at) => println!(
                        "[x] {:<nw$} unlocked {}",
                        card.name,
                        at.format("%Y-%m-%d"),
                        nw = name_width
                    ),
                    None => println!(
                        "[ ] {:<nw$} {}",
                        card.name,
                        card.condition.type_name(),
                        nw = name_width
                    ),
                }
            }
        }
    }

    Ok(())
}
