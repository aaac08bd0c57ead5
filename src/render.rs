//! Terminal rendering for gather-core types using owo_colors.

use gather_core::Event;
use gather_core::screens::{Alert, EventRow};
use owo_colors::OwoColorize;

use crate::datetime::format_local;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for Event {
    fn render(&self) -> String {
        let when = self
            .date_time
            .as_ref()
            .map(format_local)
            .unwrap_or_else(|| "no date".to_string());
        let venue = self.venue.as_deref().unwrap_or("no venue");

        format!("{} {}", self.name.bold(), format!("@ {venue}, {when}").dimmed())
    }
}

impl Render for EventRow {
    fn render(&self) -> String {
        let star = if self.is_favorite {
            "★".yellow().to_string()
        } else {
            "☆".dimmed().to_string()
        };
        let mine = if self.can_edit {
            " (yours)".cyan().to_string()
        } else {
            String::new()
        };

        format!("{} {}{}", star, self.event.render(), mine)
    }
}

impl Render for Alert {
    fn render(&self) -> String {
        format!("{} {}", format!("{}:", self.title).red().bold(), self.message)
    }
}
