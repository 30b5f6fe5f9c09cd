mod app;
mod assets;
mod config;
mod error;
mod game;
mod menu;
mod snake;
mod term;
mod widget;
#[cfg(test)]
mod test_support;

use std::fs::File;

use anyhow::Context;
use log::info;
use simplelog::{ConfigBuilder, WriteLogger};

use crate::assets::FileAssets;
use crate::config::Settings;
use crate::term::{chain_panic_hook, reset_terminal, TermManager};

pub type TermInt = u16;
/// `(row, col)`
pub type Position = (i32, i32);

fn main() -> anyhow::Result<()> {
    let settings = config::load_settings(&config::settings_path())?;
    init_logging(&settings)?;
    info!("starting with {settings:?}");

    let assets = FileAssets::new(".");
    chain_panic_hook(reset_terminal);
    let score = {
        // Dropping `term` restores the terminal, on errors and panics too
        let mut term = TermManager::setup().context("could not take over the terminal")?;
        app::run(&mut term, &assets, &settings, rand::thread_rng())?
    };

    match score {
        Some(score) => println!("Done! Score: {}", score),
        None => println!("Done"),
    }

    Ok(())
}

/// The screen belongs to the game, so logs go to a file. If that fails the
/// game still runs, just without logs, and says so on stderr before the
/// terminal is taken over.
fn init_logging(settings: &Settings) -> anyhow::Result<bool> {
    let level = settings.level_filter()?;
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    let log_file = match File::create(&settings.log_file) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("logging disabled, cannot create {}: {err}", settings.log_file.display());
            return Ok(false);
        }
    };

    if let Err(err) = WriteLogger::init(level, log_config, log_file) {
        eprintln!("logging disabled: {err}");
        return Ok(false);
    }

    Ok(true)
}
