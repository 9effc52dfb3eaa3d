use crate::{Coords, TermCoords, TermInt};
use crate::game::{SnakeGame, State};
use crate::grid::{self, GRID_HEIGHT, GRID_WIDTH};
use std::{io::{Stdout, Write, stdout}, time::Duration};

use anyhow::{bail, Context, Result};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::style::Color;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, read, poll};

const BACKGROUND: Color = Color::Black;
const SNAKE_COLOR: Color = Color::Green;
const FOOD_COLOR: Color = Color::Red;
const TEXT_COLOR: Color = Color::White;
const BORDER_COLOR: Color = Color::DarkGrey;

const CELL_CHAR: char = '█';
// Terminal characters are about twice as tall as wide
const CELL_COLUMNS: TermInt = 2;

// Score line, then the bordered field
const FIELD_TOP: TermInt = 2;
const FIELD_LEFT: TermInt = 1;
pub const SCREEN_WIDTH: TermInt = GRID_WIDTH as TermInt * CELL_COLUMNS + 2;
pub const SCREEN_HEIGHT: TermInt = GRID_HEIGHT as TermInt + 3;

const PAUSED_MSG: &str = "Paused";
const GAME_OVER_MSG: &str = "Game Over! Press R to restart";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Glyph {
    ch: char,
    color: Color,
}

const BLANK: Glyph = Glyph { ch: ' ', color: TEXT_COLOR };

/// An off-screen frame, composed from scratch every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    glyphs: Vec<Glyph>,
}

impl Canvas {
    fn blank() -> Self {
        Canvas { glyphs: vec![BLANK; SCREEN_WIDTH as usize * SCREEN_HEIGHT as usize] }
    }

    pub fn compose<R>(game: &SnakeGame<R>) -> Self {
        let mut canvas = Canvas::blank();

        canvas.draw_borders();
        canvas.print_text((1, 0), &format!("Score: {}  High score: {}", game.snake().score(), game.high_score()));

        for pos in game.snake().segments() {
            canvas.fill_cell(*pos, SNAKE_COLOR);
        }
        canvas.fill_cell(game.food().position(), FOOD_COLOR);

        match game.state() {
            State::Paused => canvas.show_message(PAUSED_MSG),
            State::GameOver => canvas.show_message(GAME_OVER_MSG),
            State::Running => {},
        }

        canvas
    }

    #[cfg(test)]
    pub fn char_at(&self, pos: TermCoords) -> char {
        self.glyph(pos).ch
    }

    #[cfg(test)]
    pub fn color_at(&self, pos: TermCoords) -> Color {
        self.glyph(pos).color
    }

    /// Screen coordinates of the left half of a field cell
    pub fn cell_origin(pos: Coords) -> TermCoords {
        let (col, row) = grid::to_cell(pos);
        (FIELD_LEFT + col as TermInt * CELL_COLUMNS, FIELD_TOP + row as TermInt)
    }

    fn glyph(&self, pos: TermCoords) -> Glyph {
        self.glyphs[index(pos)]
    }

    fn put(&mut self, pos: TermCoords, ch: char, color: Color) {
        if pos.0 < SCREEN_WIDTH && pos.1 < SCREEN_HEIGHT {
            self.glyphs[index(pos)] = Glyph { ch, color };
        }
    }

    fn fill_cell(&mut self, pos: Coords, color: Color) {
        let origin = Canvas::cell_origin(pos);
        for x_diff in 0..CELL_COLUMNS {
            self.put((origin.0 + x_diff, origin.1), CELL_CHAR, color);
        }
    }

    fn print_text(&mut self, pos: TermCoords, text: &str) {
        for (x_diff, ch) in text.chars().enumerate() {
            self.put((pos.0 + x_diff as TermInt, pos.1), ch, TEXT_COLOR);
        }
    }

    fn draw_borders(&mut self) {
        let (top, bottom) = (FIELD_TOP - 1, SCREEN_HEIGHT - 1);
        let end_x = SCREEN_WIDTH - 1;

        for x in 0..SCREEN_WIDTH {
            let ch = if x == 0 || x == end_x {'+'} else {'-'};
            self.put((x, top), ch, BORDER_COLOR);
            self.put((x, bottom), ch, BORDER_COLOR);
        }

        for y in FIELD_TOP..bottom {
            self.put((0, y), '|', BORDER_COLOR);
            self.put((end_x, y), '|', BORDER_COLOR);
        }
    }

    // A padded box in the middle of the field, over whatever is below it
    fn show_message(&mut self, msg: &str) {
        let msg_width = msg.chars().count() as TermInt + 2;
        let center = (SCREEN_WIDTH / 2, FIELD_TOP + GRID_HEIGHT as TermInt / 2);
        let left = center.0 - msg_width / 2;

        for y in center.1 - 1..=center.1 + 1 {
            for x_diff in 0..msg_width {
                self.put((left + x_diff, y), ' ', TEXT_COLOR);
            }
        }

        self.print_text((left + 1, center.1), msg);
    }
}

type Step<'a> = Box<dyn FnOnce() -> Result<()> + 'a>;

fn first_error(steps: Vec<Step<'_>>) -> Result<()> {
    steps.into_iter().fold(Ok(()), |res, step| {
        let step_res = step();
        res.and(step_res)
    })
}

fn index(pos: TermCoords) -> usize {
    SCREEN_WIDTH as usize * pos.1 as usize + pos.0 as usize
}

pub struct TermManager {
    stdout: Stdout,
    screen: Option<Canvas>,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size().context("Error reading terminal size")?;
        if width < SCREEN_WIDTH || height < SCREEN_HEIGHT {
            bail!(
                "Terminal is {}x{}, the game needs at least {}x{}",
                width, height, SCREEN_WIDTH, SCREEN_HEIGHT
            );
        }

        Ok(TermManager { stdout: stdout(), screen: None })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen, terminal::SetTitle("Snake"))
            .context("Error entering alt screen")?;
        terminal::enable_raw_mode().context("Error enabling raw mode")?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking, style::SetBackgroundColor(BACKGROUND))
            .context("Error hiding cursor")?;
        self.clear()
    }

    /// Attempts every step even if an earlier one fails, then reports the first error.
    pub fn restore(&mut self) -> Result<()> {
        let steps: Vec<Step<'_>> = vec![
            Box::new(|| -> Result<()> { terminal::disable_raw_mode().context("Error disabling raw mode") }),
            Box::new(|| -> Result<()> {
                execute!(self.stdout, style::ResetColor, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
                    .context("Error leaving alt screen")
            }),
        ];
        first_error(steps)
    }

    /// Every key event waiting in the queue, in arrival order.
    pub fn read_key_events_queue(&self) -> Result<Vec<KeyEvent>> {
        let mut events = vec![];

        while poll(Duration::from_millis(0)).context("Error polling events")? {
            if let Event::Key(ev) = read().context("Error reading event")? {
                events.push(ev);
            }
        }

        Ok(events)
    }

    /// Draws the current frame, writing only the cells that changed since the last one.
    pub fn render<R>(&mut self, game: &SnakeGame<R>) -> Result<()> {
        let frame = Canvas::compose(game);
        let mut last_color = None;

        for y in 0..SCREEN_HEIGHT {
            for x in 0..SCREEN_WIDTH {
                let glyph = frame.glyph((x, y));
                if let Some(prev) = &self.screen {
                    if prev.glyph((x, y)) == glyph {
                        continue;
                    }
                }

                if last_color != Some(glyph.color) {
                    queue!(self.stdout, style::SetForegroundColor(glyph.color)).context("Error setting color")?;
                    last_color = Some(glyph.color);
                }
                queue!(self.stdout, cursor::MoveTo(x, y), style::Print(glyph.ch)).context("Error drawing")?;
            }
        }

        self.screen = Some(frame);
        self.flush()
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(terminal::ClearType::All)).context("Error clearing")?;
        self.screen = None;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush().context("Error flushing")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Direction::Right;
    use crate::input::Command;
    use rand::{rngs::StdRng, SeedableRng};

    fn row_text(canvas: &Canvas, y: TermInt) -> String {
        (0..SCREEN_WIDTH).map(|x| canvas.char_at((x, y))).collect()
    }

    #[test]
    fn test_restore_steps_all_run() {
        let mut ran = vec![];
        let res = {
            let ran = &mut ran;
            let steps: Vec<Step<'_>> = vec![
                Box::new(|| -> Result<()> { bail!("raw mode") }),
                Box::new(|| -> Result<()> { bail!("alt screen") }),
                Box::new(move || -> Result<()> {
                    ran.push("cursor");
                    Ok(())
                }),
            ];
            first_error(steps)
        };

        assert_eq!(ran, vec!["cursor"]);
        assert_eq!(res.unwrap_err().to_string(), "raw mode");
        let steps: Vec<Step<'_>> = vec![Box::new(|| -> Result<()> { Ok(()) })];
        assert!(first_error(steps).is_ok());
    }

    #[test]
    fn test_layout_fits_field() {
        assert_eq!(SCREEN_WIDTH, 62);
        assert_eq!(SCREEN_HEIGHT, 33);
        assert_eq!(Canvas::cell_origin((0, 0)), (1, 2));
        assert_eq!(Canvas::cell_origin((580, 580)), (59, 31));
    }

    #[test]
    fn test_compose_new_game() {
        let game = SnakeGame::new_with_rng(StdRng::seed_from_u64(1));
        let canvas = Canvas::compose(&game);

        assert!(row_text(&canvas, 0).starts_with(" Score: 0  High score: 0"));
        assert_eq!(row_text(&canvas, 1), format!("+{}+", "-".repeat(60)));
        assert_eq!(canvas.char_at((0, 10)), '|');

        let head = Canvas::cell_origin((300, 300));
        assert_eq!(canvas.char_at(head), CELL_CHAR);
        assert_eq!(canvas.char_at((head.0 + 1, head.1)), CELL_CHAR);
        let food = Canvas::cell_origin(game.food().position());
        assert_eq!(canvas.color_at(food), FOOD_COLOR);
        if game.food().position() != (300, 300) {
            assert_eq!(canvas.color_at(head), SNAKE_COLOR);
        }

        assert!(!row_text(&canvas, FIELD_TOP + 15).contains(PAUSED_MSG));
    }

    #[test]
    fn test_compose_overlays() {
        let mut game = SnakeGame::new_with_rng(StdRng::seed_from_u64(1));
        game.handle_command(Command::TogglePause);
        let canvas = Canvas::compose(&game);
        assert!(row_text(&canvas, FIELD_TOP + 15).contains(PAUSED_MSG));

        game.handle_command(Command::TogglePause);
        for _ in 0..GRID_WIDTH {
            game.update();
        }
        assert_eq!(game.state(), State::GameOver);
        let canvas = Canvas::compose(&game);
        assert!(row_text(&canvas, FIELD_TOP + 15).contains(GAME_OVER_MSG));
    }

    #[test]
    fn test_compose_is_fresh_each_frame() {
        let mut game = SnakeGame::new_with_rng(StdRng::seed_from_u64(9));
        let before = Canvas::compose(&game);
        game.handle_command(Command::Turn(Right));
        game.update();
        let after = Canvas::compose(&game);
        assert_ne!(before, after);
    }
}
