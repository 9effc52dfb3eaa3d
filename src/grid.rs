use crate::Coords;
use Direction::*;

pub const FIELD_WIDTH: i32 = 600;
pub const FIELD_HEIGHT: i32 = 600;
pub const CELL_SIZE: i32 = 20;
pub const GRID_WIDTH: i32 = FIELD_WIDTH / CELL_SIZE;
pub const GRID_HEIGHT: i32 = FIELD_HEIGHT / CELL_SIZE;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub const ALL: [Direction; 4] = [Up, Down, Left, Right];

    /// Unit vector in grid cells. `y` grows downwards.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }
}

pub fn center() -> Coords {
    (FIELD_WIDTH / 2, FIELD_HEIGHT / 2)
}

pub fn in_bounds(pos: Coords) -> bool {
    (0..FIELD_WIDTH).contains(&pos.0) && (0..FIELD_HEIGHT).contains(&pos.1)
}

/// Column and row of the logical cell containing `pos`
pub fn to_cell(pos: Coords) -> (i32, i32) {
    (pos.0 / CELL_SIZE, pos.1 / CELL_SIZE)
}
