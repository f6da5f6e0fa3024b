//! Common components used across multiple entity types.

use serde::{Deserialize, Serialize};

/// Grid position component - the cell an entity currently occupies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Position shifted by a delta (may fall outside the board)
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Cardinal direction for player movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Single-step delta; screen coordinates, so Up is -y
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Parse the classic WASD keys
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_uppercase() {
            'W' => Some(Direction::Up),
            'S' => Some(Direction::Down),
            'A' => Some(Direction::Left),
            'D' => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Axis-aligned rectangle of cells, used for terrain authoring and population
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Iterate the region's cells after clamping it to a `board_width` x `board_height` board
    pub fn clamped_cells(
        &self,
        board_width: u32,
        board_height: u32,
    ) -> impl Iterator<Item = Position> {
        let x_end = board_width.min(self.x.saturating_add(self.width));
        let y_end = board_height.min(self.y.saturating_add(self.height));
        let (x0, y0) = (self.x, self.y);
        (x0..x_end).flat_map(move |x| (y0..y_end).map(move |y| Position::new(x as i32, y as i32)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_deltas() {
        assert_eq!(Direction::Up.delta(), (0, -1));
        assert_eq!(Direction::Right.delta(), (1, 0));
        assert_eq!(Direction::from_key('w'), Some(Direction::Up));
        assert_eq!(Direction::from_key('x'), None);
    }

    #[test]
    fn test_region_clamps_to_board() {
        let region = Region::new(8, 8, 5, 5);
        let cells: Vec<Position> = region.clamped_cells(10, 10).collect();
        assert_eq!(cells.len(), 4);
        assert!(cells.iter().all(|p| p.x < 10 && p.y < 10));
    }

    #[test]
    fn test_region_outside_board_is_empty() {
        let region = Region::new(20, 0, 3, 3);
        assert_eq!(region.clamped_cells(10, 10).count(), 0);
    }
}
