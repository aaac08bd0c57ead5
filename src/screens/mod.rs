//! Interactive front-ends for the gather-core screens.
//!
//! Each `run` shows one screen until the user does something that leaves it.

pub mod events;
pub mod favorites;
pub mod login;
pub mod sign_up;

use gather_core::navigation::Route;

/// What the app loop should do after a screen returns.
pub enum Outcome {
    Stay,
    Go(Route),
    /// Sign-in or sign-out went through; re-read the provider's session.
    SessionChanged,
    Quit,
}
