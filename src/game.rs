use std::{thread::sleep, time::{Duration, Instant}};

use anyhow::Result;
use rand::{rngs::ThreadRng, Rng};
use tracing::{debug, info};

use crate::food::Food;
use crate::input::Command;
use crate::snake::{MoveResult::{self, *}, Snake};
use crate::term::TermManager;

// Ticks per second with a single segment; one more per unit of length.
const BASE_TICK_RATE: f64 = 10.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum State {
    Running,
    Paused,
    GameOver,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct SnakeGame<R = ThreadRng> {
    rng: R,
    snake: Snake,
    food: Food,
    state: State,
    high_score: u32,
}

impl SnakeGame<ThreadRng> {
    pub fn new() -> Self {
        SnakeGame::new_with_rng(rand::thread_rng())
    }
}

impl<R> SnakeGame<R> {
    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> &Food {
        &self.food
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / (BASE_TICK_RATE + self.snake.length() as f64))
    }
}

impl<R: Rng> SnakeGame<R> {
    pub fn new_with_rng(mut rng: R) -> Self {
        let snake = Snake::new(&mut rng);
        let food = Food::new(&mut rng);
        SnakeGame { rng, snake, food, state: State::Running, high_score: 0 }
    }

    /// Runs until the player quits. Every iteration drains the pending input,
    /// advances one tick if running and redraws the whole field.
    pub fn run(&mut self, term: &mut TermManager) -> Result<()> {
        info!(direction = ?self.snake.direction(), food = ?self.food.position(), "game started");
        let mut next_tick = Instant::now();

        loop {
            for key_ev in term.read_key_events_queue()? {
                let flow = match Command::from_key_event(&key_ev) {
                    Some(cmd) => self.handle_command(cmd),
                    None => Flow::Continue,
                };
                if flow == Flow::Quit {
                    info!(high_score = self.high_score, "quitting");
                    return Ok(());
                }
            }

            self.update();
            term.render(self)?;

            next_tick += self.tick_interval();
            let now = Instant::now();
            if next_tick > now {
                sleep(next_tick - now);
            } else {
                // Fell behind, don't try to catch up with a burst of ticks
                next_tick = now;
            }
        }
    }

    pub fn handle_command(&mut self, cmd: Command) -> Flow {
        match (cmd, self.state) {
            (Command::Quit, _) => return Flow::Quit,
            (Command::TogglePause, State::Running) => {
                debug!("paused");
                self.state = State::Paused;
            },
            (Command::TogglePause, State::Paused) => {
                debug!("resumed");
                self.state = State::Running;
            },
            (Command::Restart, State::GameOver) => self.restart(),
            (Command::Turn(dir), State::Running) => self.snake.turn(dir),
            _ => {}
        }

        Flow::Continue
    }

    /// Advances the simulation by one tick. Returns `None` when not running.
    pub fn update(&mut self) -> Option<MoveResult> {
        if self.state != State::Running {
            return None;
        }

        let move_res = self.snake.move_step();

        match &move_res {
            Crashed(cause) => {
                info!(?cause, score = self.snake.score(), high_score = self.high_score, "game over");
                self.state = State::GameOver;
            },
            Moved { new_head } => {
                if *new_head == self.food.position() {
                    self.snake.eat();
                    self.food.randomize_position(&mut self.rng);
                    self.high_score = self.high_score.max(self.snake.score());
                    debug!(
                        score = self.snake.score(),
                        length = self.snake.length(),
                        food = ?self.food.position(),
                        "food eaten"
                    );
                }
            },
        }

        Some(move_res)
    }

    fn restart(&mut self) {
        self.snake.reset(&mut self.rng);
        self.food.randomize_position(&mut self.rng);
        self.state = State::Running;
        info!(high_score = self.high_score, "game restarted");
    }

    #[cfg(test)]
    fn set_snake(&mut self, snake: Snake) {
        self.snake = snake;
    }

    #[cfg(test)]
    fn food_mut(&mut self) -> &mut Food {
        &mut self.food
    }
}
