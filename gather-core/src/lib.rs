//! Core library for gather, a small event organizer.
//!
//! This crate provides everything except the terminal front-end:
//! - `backend` with the auth provider and document store abstractions, plus the
//!   in-memory and Firebase implementations
//! - `data` for the event and favorite operations
//! - `auth` for the sign-up and login flows
//! - `screens` and `navigation` for UI state derived from live subscriptions

pub mod auth;
pub mod backend;
pub mod config;
pub mod data;
pub mod error;
pub mod live;
pub mod model;
pub mod navigation;
pub mod screens;

pub use backend::Backend;
pub use data::DataAccess;
pub use error::{GatherError, GatherResult};
pub use model::*;
