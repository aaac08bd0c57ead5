use anyhow::Result;
use dialoguer::{Input, Password, Select};
use gather_core::Backend;
use gather_core::navigation::Route;
use gather_core::screens::SignUpScreen;
use owo_colors::OwoColorize;

use super::Outcome;
use crate::render::Render;
use crate::utils::tui::create_spinner;

fn prompt_text(label: &str) -> Result<String> {
    Ok(Input::new()
        .with_prompt(format!("  {label}"))
        .allow_empty(true)
        .interact_text()?)
}

pub async fn run(backend: &Backend) -> Result<Outcome> {
    println!("\n{}", SignUpScreen::TITLE.bold());

    let choice = Select::new()
        .items(&[SignUpScreen::SUBMIT_LABEL, SignUpScreen::SWITCH_LABEL, "Quit"])
        .default(0)
        .interact()?;
    match choice {
        1 => return Ok(Outcome::Go(Route::Login)),
        2 => return Ok(Outcome::Quit),
        _ => {}
    }

    let mut screen = SignUpScreen::new();
    screen.form.name = prompt_text("Name")?;
    screen.form.email = prompt_text("Email")?;
    screen.form.password = Password::new()
        .with_prompt("  Password")
        .allow_empty_password(true)
        .interact()?;

    let spinner = create_spinner(SignUpScreen::PENDING_LABEL);
    let result = screen.submit(backend).await;
    spinner.finish_and_clear();

    match result {
        Ok(user) => {
            println!("{}", format!("  Signed up as {}", user.name).green());
            Ok(Outcome::SessionChanged)
        }
        Err(alert) => {
            eprintln!("  {}", alert.render());
            Ok(Outcome::Stay)
        }
    }
}
