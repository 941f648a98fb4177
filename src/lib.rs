//! flap-track: a Flappy Bird clone for the terminal that logs every game.
//!
//! Each finished game appends one row to a CSV session log. The in-game
//! statistics screen and the analytics dashboard are both computed from
//! that log, so they survive restarts.
//!
//! Everything is drawn into a [`render::PixelBuf`] and flushed to the
//! terminal with half-block characters, two pixels per cell.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod app;
pub mod audio;
pub mod cli;
pub mod collision;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod font;
pub mod game;
pub mod logging;
pub mod render;
pub mod sessions;
pub mod stats;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::{Verbosity, init_file_logging, init_logging};
pub use sessions::{SessionLog, SessionRecord};
pub use stats::Summary;
