use std::time::Duration;

use anyhow::Result;
use dialoguer::Select;
use gather_core::Backend;
use gather_core::navigation::{Route, Tab};
use gather_core::screens::FavoritesScreen;
use owo_colors::OwoColorize;

use super::Outcome;
use crate::render::Render;

pub async fn run(backend: &Backend, refresh: Duration) -> Result<Outcome> {
    let mut screen = FavoritesScreen::open(backend.data()).await?;

    loop {
        println!("\n{}", FavoritesScreen::TITLE.bold());
        let rows = screen.rows();
        if rows.is_empty() {
            println!("  {}", "Nothing here yet".dimmed());
        }
        for event in &rows {
            println!("  {}", event.render());
        }

        let choice = Select::new()
            .items(&[FavoritesScreen::REMOVE_LABEL, "Go to Events", "Quit"])
            .default(if rows.is_empty() { 1 } else { 0 })
            .interact()?;

        match choice {
            0 if rows.is_empty() => {}
            0 => {
                let items: Vec<String> = rows.iter().map(|e| e.render()).collect();
                let picked = Select::new()
                    .with_prompt("  Remove which event?")
                    .items(&items)
                    .default(0)
                    .interact_opt()?;
                if let Some(i) = picked {
                    screen.remove(&rows[i].id).await;
                    screen.refresh(refresh).await;
                }
            }
            1 => return Ok(Outcome::Go(Route::Home(Tab::Events))),
            _ => return Ok(Outcome::Quit),
        }
    }
}
