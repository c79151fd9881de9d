// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use num_traits::{FromPrimitive, ToPrimitive};
use serde::{Serialize, Serializer};
use std::convert::TryFrom;
use std::fmt::{self, Display, Write};

// TableIndex is a trait for all types that can serve as an index into a table.
// Per-side tables (captured lists, clocks) are indexed by Team through this trait.
pub trait TableIndex {
    fn as_index(self) -> usize;
    fn from_index(idx: usize) -> Self;
}

impl<T> TableIndex for T
where
    T: FromPrimitive + ToPrimitive,
{
    fn as_index(self) -> usize {
        self.to_u32().unwrap() as usize
    }

    fn from_index(idx: usize) -> T {
        <T as FromPrimitive>::from_u64(idx as u64).unwrap()
    }
}

const FILE_NAMES: [char; 8] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];
const RANK_NAMES: [char; 8] = ['1', '2', '3', '4', '5', '6', '7', '8'];

/// A square on the board. `x` is the file (0 = a) and `y` is the rank (0 = rank 1, the rank
/// that `Team::Our` starts on). Coordinates are plain values and are never mutated in place.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Coordinate {
    x: u8,
    y: u8,
}

impl Coordinate {
    pub fn new(x: u8, y: u8) -> Coordinate {
        debug_assert!(x < 8 && y < 8, "coordinate ({}, {}) off the board", x, y);
        Coordinate { x, y }
    }

    pub fn x(self) -> u8 {
        self.x
    }

    pub fn y(self) -> u8 {
        self.y
    }

    /// Returns the coordinate `(x + dx, y + dy)`, or None if that lies outside the board.
    pub fn offset(self, dx: i8, dy: i8) -> Option<Coordinate> {
        let x = self.x as i8 + dx;
        let y = self.y as i8 + dy;
        if x < 0 || x > 7 || y < 0 || y > 7 {
            return None;
        }

        Some(Coordinate::new(x as u8, y as u8))
    }

    pub fn towards(self, dir: Direction) -> Option<Coordinate> {
        let (dx, dy) = dir.as_vector();
        self.offset(dx, dy)
    }

    /// Iterates every coordinate on the board, rank by rank starting from a1.
    pub fn all() -> impl Iterator<Item = Coordinate> {
        (0..64u8).map(|idx| Coordinate::new(idx & 7, idx >> 3))
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_char(FILE_NAMES[self.x as usize])?;
        f.write_char(RANK_NAMES[self.y as usize])
    }
}

impl TryFrom<&str> for Coordinate {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut chars = value.chars();
        let (file, rank) = match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None) => (file, rank),
            _ => return Err(()),
        };

        let x = FILE_NAMES.iter().position(|&c| c == file).ok_or(())?;
        let y = RANK_NAMES.iter().position(|&c| c == rank).ok_or(())?;
        Ok(Coordinate::new(x as u8, y as u8))
    }
}

impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive, Serialize)]
pub enum Team {
    Our,
    Opponent,
}

impl Team {
    pub fn toggle(self) -> Team {
        match self {
            Team::Our => Team::Opponent,
            Team::Opponent => Team::Our,
        }
    }

    /// The rank delta of a single pawn advance.
    pub fn pawn_direction(self) -> i8 {
        match self {
            Team::Our => 1,
            Team::Opponent => -1,
        }
    }

    pub fn pawn_start_rank(self) -> u8 {
        match self {
            Team::Our => 1,
            Team::Opponent => 6,
        }
    }

    pub fn promotion_rank(self) -> u8 {
        match self {
            Team::Our => 7,
            Team::Opponent => 0,
        }
    }
}

impl Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Team::Our => f.write_str("white"),
            Team::Opponent => f.write_str("black"),
        }
    }
}

impl TryFrom<&str> for Team {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(Team::Our),
            "black" | "b" => Ok(Team::Opponent),
            _ => Err(()),
        }
    }
}

pub static TEAMS: [Team; 2] = [Team::Our, Team::Opponent];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive, Serialize)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// The piece letter used in move notation. Pawns have none.
    pub fn symbol(self) -> &'static str {
        match self {
            PieceKind::Pawn => "",
            PieceKind::Knight => "N",
            PieceKind::Bishop => "B",
            PieceKind::Rook => "R",
            PieceKind::Queen => "Q",
            PieceKind::King => "K",
        }
    }

    /// Whether a pawn may be promoted into this kind.
    pub fn is_promotion_choice(self) -> bool {
        match self {
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => true,
            PieceKind::Pawn | PieceKind::King => false,
        }
    }
}

impl Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let chr = match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        f.write_char(chr)
    }
}

impl TryFrom<char> for PieceKind {
    type Error = ();

    fn try_from(value: char) -> Result<Self, Self::Error> {
        let res = match value.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return Err(()),
        };
        Ok(res)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// (file delta, rank delta) of a single step. North points towards `Team::Opponent`'s
    /// back rank.
    pub fn as_vector(self) -> (i8, i8) {
        match self {
            Direction::North => (0, 1),
            Direction::NorthEast => (1, 1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, -1),
            Direction::South => (0, -1),
            Direction::SouthWest => (-1, -1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, 1),
        }
    }
}

pub static ROOK_DIRECTIONS: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

pub static BISHOP_DIRECTIONS: [Direction; 4] = [
    Direction::NorthEast,
    Direction::SouthEast,
    Direction::SouthWest,
    Direction::NorthWest,
];

pub static DIRECTIONS: [Direction; 8] = [
    Direction::North,
    Direction::NorthEast,
    Direction::East,
    Direction::SouthEast,
    Direction::South,
    Direction::SouthWest,
    Direction::West,
    Direction::NorthWest,
];

pub static KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];
