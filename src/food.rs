use crate::Coords;
use crate::grid::{CELL_SIZE, GRID_HEIGHT, GRID_WIDTH};

use rand::Rng;

#[derive(Debug, Clone)]
pub struct Food {
    position: Coords,
}

impl Food {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut food = Food { position: (0, 0) };
        food.randomize_position(rng);
        food
    }

    pub fn position(&self) -> Coords {
        self.position
    }

    /// Picks any cell of the grid, including ones under the snake.
    pub fn randomize_position<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.position = (
            rng.gen_range(0..GRID_WIDTH) * CELL_SIZE,
            rng.gen_range(0..GRID_HEIGHT) * CELL_SIZE,
        );
    }

    #[cfg(test)]
    pub fn place_at(&mut self, position: Coords) {
        self.position = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_positions_are_grid_aligned() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut food = Food::new(&mut rng);
        for _ in 0..500 {
            let (x, y) = food.position();
            assert!(grid::in_bounds((x, y)));
            assert_eq!(x % CELL_SIZE, 0);
            assert_eq!(y % CELL_SIZE, 0);
            food.randomize_position(&mut rng);
        }
    }

    #[test]
    fn test_same_seed_same_position() {
        let a = Food::new(&mut StdRng::seed_from_u64(42));
        let b = Food::new(&mut StdRng::seed_from_u64(42));
        assert_eq!(a.position(), b.position());
    }

    #[test]
    fn test_covers_whole_grid() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut food = Food::new(&mut rng);
        let (mut max_x, mut max_y) = (0, 0);
        for _ in 0..5000 {
            food.randomize_position(&mut rng);
            max_x = max_x.max(food.position().0);
            max_y = max_y.max(food.position().1);
        }
        assert_eq!((max_x, max_y), ((GRID_WIDTH - 1) * CELL_SIZE, (GRID_HEIGHT - 1) * CELL_SIZE));
    }
}
