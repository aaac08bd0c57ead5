use std::time::Duration;

use anyhow::{Context, Result};
use gather_core::Backend;
use gather_core::config::{BackendKind, GatherConfig};
use gather_core::navigation::{Navigator, Route, Session, Tab};

use crate::screens::{self, Outcome};
use crate::utils::tui::create_spinner;

const SPLASH_TITLE: &str = "Event Organize App";
const SPLASH_DURATION: Duration = Duration::from_millis(1500);

/// How long to wait for a mutation to show up in the live queries.
fn refresh_wait(config: &GatherConfig) -> Duration {
    match (config.backend, &config.firebase) {
        (BackendKind::Firebase, Some(firebase)) => {
            firebase.poll_interval() + firebase.request_timeout()
        }
        _ => Duration::from_millis(250),
    }
}

async fn splash() {
    let spinner = create_spinner(SPLASH_TITLE);
    tokio::time::sleep(SPLASH_DURATION).await;
    spinner.finish_and_clear();
}

/// Connect, show the splash, then run screens until the user quits.
pub async fn run(config: &GatherConfig) -> Result<()> {
    let backend = Backend::connect(config).context("Could not connect to the backend")?;
    let refresh = refresh_wait(config);
    splash().await;

    let mut nav = Navigator::new(Session::from_auth(backend.auth.as_ref()));
    tracing::debug!(route = ?nav.route(), "starting");

    loop {
        let outcome = match nav.route() {
            Route::Login => screens::login::run(&backend).await?,
            Route::SignUp => screens::sign_up::run(&backend).await?,
            Route::Home(Tab::Events) => screens::events::run(&backend, refresh).await?,
            Route::Home(Tab::Favorites) => screens::favorites::run(&backend, refresh).await?,
        };

        match outcome {
            Outcome::Stay => {}
            Outcome::Go(route) => {
                nav.navigate(route);
            }
            Outcome::SessionChanged => nav.sync(backend.auth.as_ref()),
            Outcome::Quit => break,
        }
    }

    Ok(())
}
