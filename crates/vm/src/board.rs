//! Othello board queries.
//!
//! The board is 8x8, row-major, square 0 in the upper left. A placement at
//! an empty square is valid in a direction when one or more OPPONENT pieces
//! run from the square in that direction and the run ends on a PLAYER piece.

use evocpu_common::BOARD_SIZE;

use crate::hardware::Hardware;

pub const PLAYER: f64 = 1.0;
pub const OPPONENT: f64 = -1.0;
pub const EMPTY: f64 = 0.0;

const WIDTH: i64 = 8;

/// One of the eight lines out of a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction {
    /// (row, column) step.
    fn step(self) -> (i64, i64) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::UpLeft => (-1, -1),
            Direction::UpRight => (-1, 1),
            Direction::DownLeft => (1, -1),
            Direction::DownRight => (1, 1),
        }
    }
}

impl Hardware {
    /// Piece at `pos`, wrapping around the board.
    pub fn square(&self, pos: i64) -> f64 {
        self.board[pos.rem_euclid(BOARD_SIZE as i64) as usize]
    }

    /// Whether placing at `pos` flanks opponent pieces in direction `dir`.
    /// Off-board and occupied squares never flank.
    pub fn flanks(&self, pos: i64, dir: Direction) -> bool {
        if !(0..BOARD_SIZE as i64).contains(&pos) || self.board[pos as usize] != EMPTY {
            return false;
        }

        let (dr, dc) = dir.step();
        let (mut row, mut col) = (pos / WIDTH, pos % WIDTH);
        let mut seen_opponent = false;
        loop {
            row += dr;
            col += dc;
            if !(0..WIDTH).contains(&row) || !(0..WIDTH).contains(&col) {
                return false;
            }
            let piece = self.board[(row * WIDTH + col) as usize];
            if piece == OPPONENT {
                seen_opponent = true;
            } else if piece == PLAYER {
                return seen_opponent;
            } else {
                return false;
            }
        }
    }
}
