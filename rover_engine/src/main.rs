#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** Rover **
//! Remote rover mission console

use rover_engine::style::GameStyle;
use rover_engine::{ROVER_VERSION, load_catalog, run_repl};

use anyhow::{Context, Result};
use log::info;

use std::io::Write;

fn main() -> Result<()> {
    env_logger::init();
    info!("Start: loading level catalog...");
    let catalog = load_catalog().context("while loading level catalog")?;
    info!("Level catalog loaded: {} levels.", catalog.level_count());

    // clear the screen
    print!("\x1B[2J\x1B[H");
    std::io::stdout().flush().context("flushing stdout")?;

    println!(
        "{:^84}",
        format!("ROVER MISSION CONTROL v{ROVER_VERSION}").heading_style()
    );
    println!(
        "\n{}\n",
        "Your primary objective: retrieve mineral samples and return to base.".control_style()
    );

    let outcome = run_repl(catalog)?;
    info!("Session finished: {outcome:?}");
    Ok(())
}
