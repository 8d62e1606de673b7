//! Interaction core for the fin launcher.
//!
//! A [`Session`] turns query edits and key actions into provider calls,
//! merged result lists, selection moves and dispatched actions, and reports
//! every change as a [`UiUpdate`](fin_types::UiUpdate).

pub mod config;
pub mod dispatch;
pub mod geometry;
pub mod history;
pub mod keymap;
pub mod merge;
pub mod poll;
pub mod provider;
pub mod selection;
pub mod session;

mod error;

#[cfg(test)]
mod tests;

pub use config::{Config, Directories};
pub use dispatch::{ActionDispatcher, Effect, Shell, SystemShell};
pub use error::{Error, Result};
pub use geometry::geometry_for;
pub use history::HistoryRing;
pub use keymap::{Key, KeyAction, KeyChord, Keymap};
pub use merge::merge;
pub use poll::PollLoop;
pub use provider::ResultProvider;
pub use selection::Selection;
pub use session::{Page, Phase, Session, SessionEvent, SessionState};

pub use fin_types::*;
