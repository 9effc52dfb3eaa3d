use std::collections::VecDeque;

use crate::Coords;
use crate::grid::{self, Direction, CELL_SIZE};
use MoveResult::*;

use rand::Rng;

const SCORE_PER_FOOD: u32 = 10;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Crash {
    Wall,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveResult {
    Moved { new_head: Coords },
    Crashed(Crash),
}

/// The player's snake. `segments[0]` is the head.
///
/// `length` is the target length: the body only reaches it by lagging, i.e.
/// the tail is kept on each move until the segment count catches up.
#[derive(Debug, Clone)]
pub struct Snake {
    segments: VecDeque<Coords>,
    direction: Direction,
    length: usize,
    score: u32,
}

impl Snake {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Snake::with_body(grid::center(), &[], random_direction(rng))
    }

    /// A snake whose target length matches the given body, `head` first.
    pub fn with_body(head: Coords, tail: &[Coords], direction: Direction) -> Self {
        let mut segments = VecDeque::with_capacity(tail.len() + 1);
        segments.push_back(head);
        segments.extend(tail.iter().copied());

        let length = segments.len();
        Snake { segments, direction, length, score: 0 }
    }

    pub fn head(&self) -> Coords {
        self.segments[0]
    }

    pub fn segments(&self) -> &VecDeque<Coords> {
        &self.segments
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn turn(&mut self, new_direction: Direction) {
        // A single segment has nothing behind it to run into
        if self.length > 1 && new_direction == self.direction.opposite() {
            return;
        }
        self.direction = new_direction;
    }

    pub fn move_step(&mut self) -> MoveResult {
        let head = self.head();
        let (dx, dy) = self.direction.delta();
        let new_head = (head.0 + dx * CELL_SIZE, head.1 + dy * CELL_SIZE);

        if !grid::in_bounds(new_head) {
            return Crashed(Crash::Wall);
        }

        if self.length > 2 && self.segments.iter().skip(1).any(|pos| *pos == new_head) {
            return Crashed(Crash::Body);
        }

        self.segments.push_front(new_head);
        if self.segments.len() > self.length {
            self.segments.pop_back();
        }

        Moved { new_head }
    }

    /// Takes effect on the geometry only at the next `move_step`.
    pub fn eat(&mut self) {
        self.length += 1;
        self.score += SCORE_PER_FOOD;
    }

    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        *self = Snake::new(rng);
    }
}

fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Direction {
    Direction::ALL[rng.gen_range(0..Direction::ALL.len())]
}
