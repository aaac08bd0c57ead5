use anyhow::Result;
use dialoguer::{Input, Password, Select};
use gather_core::Backend;
use gather_core::navigation::Route;
use gather_core::screens::LoginScreen;
use owo_colors::OwoColorize;

use super::Outcome;
use crate::render::Render;
use crate::utils::tui::create_spinner;

pub async fn run(backend: &Backend) -> Result<Outcome> {
    println!("\n{}", LoginScreen::TITLE.bold());

    let choice = Select::new()
        .items(&[LoginScreen::SUBMIT_LABEL, LoginScreen::SWITCH_LABEL, "Quit"])
        .default(0)
        .interact()?;
    match choice {
        1 => return Ok(Outcome::Go(Route::SignUp)),
        2 => return Ok(Outcome::Quit),
        _ => {}
    }

    let screen = LoginScreen {
        email: Input::new()
            .with_prompt("  Email")
            .allow_empty(true)
            .interact_text()?,
        password: Password::new()
            .with_prompt("  Password")
            .allow_empty_password(true)
            .interact()?,
    };

    let spinner = create_spinner(LoginScreen::PENDING_LABEL);
    let result = screen.submit(backend).await;
    spinner.finish_and_clear();

    match result {
        Ok(user) => {
            println!("{}", format!("  Welcome back, {}", user.name).green());
            Ok(Outcome::SessionChanged)
        }
        Err(alert) => {
            eprintln!("  {}", alert.render());
            Ok(Outcome::Stay)
        }
    }
}
