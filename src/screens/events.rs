use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use dialoguer::{Confirm, Input, Select};
use gather_core::Backend;
use gather_core::navigation::{Route, Tab};
use gather_core::screens::{EventRow, EventScreen};
use owo_colors::OwoColorize;

use super::Outcome;
use crate::datetime::{format_local, parse_datetime};
use crate::render::Render;

const ACTIONS: [&str; 7] = [
    "Add event",
    "Edit event",
    "Delete event",
    "Favorite / unfavorite",
    "Go to Favorites",
    "Log out",
    "Quit",
];

/// Prompt until the input parses. Empty input keeps `current`.
fn prompt_when(prompt: &str, current: DateTime<Utc>) -> Result<DateTime<Utc>> {
    loop {
        let input: String = Input::new()
            .with_prompt(format!("  {prompt} ({})", format_local(&current)))
            .allow_empty(true)
            .interact_text()?;
        if input.trim().is_empty() {
            return Ok(current);
        }
        match parse_datetime(&input) {
            Ok(dt) => return Ok(dt),
            Err(e) => eprintln!("  {}", e.to_string().red()),
        }
    }
}

fn prompt_text(prompt: &str, initial: &str) -> Result<String> {
    Ok(Input::new()
        .with_prompt(format!("  {prompt}"))
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()?)
}

/// Let the user pick one of `rows`. Returns the event id.
fn pick(prompt: &str, rows: &[EventRow]) -> Result<Option<String>> {
    if rows.is_empty() {
        println!("  {}", "No events to choose from".dimmed());
        return Ok(None);
    }
    let items: Vec<String> = rows.iter().map(|r| r.render()).collect();
    let index = Select::new()
        .with_prompt(format!("  {prompt}"))
        .items(&items)
        .default(0)
        .interact_opt()?;
    Ok(index.map(|i| rows[i].event.id.clone()))
}

fn owned(rows: Vec<EventRow>) -> Vec<EventRow> {
    rows.into_iter().filter(|r| r.can_edit).collect()
}

fn print_rows(screen: &EventScreen) {
    println!("\n{}", "Events".bold());
    let rows = screen.rows();
    if rows.is_empty() {
        println!("  {}", "No events yet".dimmed());
    }
    for row in rows {
        println!("  {}  {}", row.render(), row.favorite_label().dimmed());
    }
}

/// Returns whether a mutation was sent.
async fn add(screen: &mut EventScreen) -> Result<bool> {
    screen.form.name = prompt_text("Event name", "")?;
    screen.form.venue = prompt_text("Venue", "")?;
    screen.form.date_time = prompt_when("When?", screen.form.date_time)?;

    if screen.add_event().await {
        println!("{}", "  Event added".green());
        Ok(true)
    } else {
        eprintln!("  {}", "Name and venue are required".red());
        Ok(false)
    }
}

async fn edit(screen: &mut EventScreen) -> Result<bool> {
    let Some(id) = pick("Edit which event?", &owned(screen.rows()))? else {
        return Ok(false);
    };
    if !screen.begin_edit(&id) {
        return Ok(false);
    }

    if let Some(form) = screen.editing.as_mut() {
        form.name = prompt_text("Event name", &form.name)?;
        form.venue = prompt_text("Venue", &form.venue)?;
        form.date_time = prompt_when("When?", form.date_time)?;
    }

    if screen.save_edit().await {
        println!("{}", "  Event updated".green());
        Ok(true)
    } else {
        screen.cancel_edit();
        eprintln!("  {}", "Name is required; edit discarded".red());
        Ok(false)
    }
}

async fn delete(screen: &mut EventScreen) -> Result<bool> {
    let Some(id) = pick("Delete which event?", &owned(screen.rows()))? else {
        return Ok(false);
    };
    let confirmed = Confirm::new()
        .with_prompt("  Delete this event?")
        .default(false)
        .interact()?;
    if confirmed && screen.delete_event(&id).await {
        println!("{}", "  Event deleted".green());
        return Ok(true);
    }
    Ok(false)
}

/// `refresh` bounds the wait for a mutation to come back through the live
/// queries before the list is printed again.
pub async fn run(backend: &Backend, refresh: Duration) -> Result<Outcome> {
    let mut screen = EventScreen::open(backend.data()).await?;
    println!("  Signed in as {}", screen.user().email.cyan());

    loop {
        print_rows(&screen);

        let choice = Select::new()
            .items(&ACTIONS)
            .default(0)
            .interact()?;

        let mutated = match choice {
            0 => add(&mut screen).await?,
            1 => edit(&mut screen).await?,
            2 => delete(&mut screen).await?,
            3 => match pick("Which event?", &screen.rows())? {
                Some(id) => {
                    screen.toggle_favorite(&id).await;
                    true
                }
                None => false,
            },
            4 => return Ok(Outcome::Go(Route::Home(Tab::Favorites))),
            5 => match screen.log_out().await {
                Ok(()) => return Ok(Outcome::SessionChanged),
                Err(alert) => {
                    eprintln!("  {}", alert.render());
                    false
                }
            },
            _ => return Ok(Outcome::Quit),
        };

        if mutated {
            screen.refresh(refresh).await;
        }
    }
}
