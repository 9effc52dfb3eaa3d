mod food;
mod game;
mod grid;
mod input;
mod snake;
mod term;

use std::io::{stderr, IsTerminal};

use anyhow::Result;
use tracing::error;

/// Field units: pixels on a 600x600 board, always multiples of the cell size.
pub type Coords = (i32, i32);
pub type TermInt = u16;
pub type TermCoords = (TermInt, TermInt);

fn main() -> Result<()> {
    // Logs would garble the game screen, so they're only kept when redirected
    if !stderr().is_terminal() {
        tracing_subscriber::fmt()
            .with_writer(stderr)
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    let mut term = term::TermManager::new()?;
    let mut game = game::SnakeGame::new();
    let res = term.setup().and_then(|_| game.run(&mut term));

    // The terminal has to be handed back even if the game loop failed
    if let Err(err) = term.restore() {
        error!(?err, "failed to restore terminal");
    }

    res
}
