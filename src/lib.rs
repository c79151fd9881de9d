// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#[macro_use]
extern crate num_derive;
#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

mod board;
mod clock;
mod config;
mod game;
mod history;
mod moves;
mod perft;
mod piece;
pub mod rules;
mod types;

pub use board::{Board, FenParseError};
pub use clock::Clock;
pub use config::GameConfig;
pub use game::{Game, GameObserver, GameState, Outcome};
pub use history::MoveHistory;
pub use moves::{Move, MoveFlags};
pub use perft::perft;
pub use piece::{LegalMoves, MoveVec, Piece};
pub use types::{Coordinate, Direction, PieceKind, TableIndex, Team, TEAMS};
