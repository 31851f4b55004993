//! Headless front end for the image transform pipeline.
//!
//! Plays the part of the menu/slider window: it loads an image, selects a
//! transform and its parameters, optionally picks an "I Spy" template, and
//! writes the result and a display-sized preview.

#[macro_use]
extern crate derivative;

pub mod cli;
pub mod config;
pub mod session;

pub use cli::Cli;
pub use config::Config;
pub use session::{Session, SessionError};

/// Sets up a logger with timestamp, log level, file name, line number and message.
pub fn init_logger() {
    use std::io::Write;

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            let ts = chrono::Local::now().format("%H:%M:%S");

            writeln!(
                buf,
                "[{} {style}{}{style:#} {} {}] {}",
                ts,
                record.level(),
                record
                    .file()
                    .unwrap_or("None")
                    .split('/')
                    .next_back()
                    .unwrap_or("None"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}
