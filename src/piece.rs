// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::convert::TryFrom;
use std::fmt::{self, Display, Write};

use arrayvec::ArrayVec;

use crate::types::{Coordinate, PieceKind, Team};

/// A list of destinations for a single piece. A queen in the middle of an empty board has 27
/// moves, which is the most any piece can have.
pub type MoveVec = ArrayVec<[Coordinate; 32]>;

/// The cached legal destinations of a piece. Every structural change to a board invalidates
/// them; they are only ever brought back to `Computed` by recomputing the whole board.
#[derive(Clone, Debug, PartialEq)]
pub enum LegalMoves {
    Unknown,
    Computed(MoveVec),
}

impl LegalMoves {
    pub fn as_slice(&self) -> Option<&[Coordinate]> {
        match self {
            LegalMoves::Unknown => None,
            LegalMoves::Computed(moves) => Some(&moves[..]),
        }
    }
}

impl Default for LegalMoves {
    fn default() -> LegalMoves {
        LegalMoves::Unknown
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Piece {
    position: Coordinate,
    kind: PieceKind,
    team: Team,
    has_moved: bool,
    en_passant: bool,
    legal_moves: LegalMoves,
}

impl Piece {
    pub fn new(position: Coordinate, kind: PieceKind, team: Team, has_moved: bool) -> Piece {
        Piece {
            position,
            kind,
            team,
            has_moved,
            en_passant: false,
            legal_moves: LegalMoves::Unknown,
        }
    }

    pub fn position(&self) -> Coordinate {
        self.position
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn has_moved(&self) -> bool {
        self.has_moved
    }

    pub fn is_pawn(&self) -> bool {
        self.kind == PieceKind::Pawn
    }

    pub fn is_king(&self) -> bool {
        self.kind == PieceKind::King
    }

    /// True only for a pawn that advanced two squares on the move just played.
    pub fn is_en_passant_eligible(&self) -> bool {
        self.is_pawn() && self.en_passant
    }

    /// The cached legal destinations, or None if they have not been computed for this board.
    pub fn legal_moves(&self) -> Option<&[Coordinate]> {
        self.legal_moves.as_slice()
    }

    pub fn can_move_to(&self, destination: Coordinate) -> bool {
        self.legal_moves()
            .map_or(false, |moves| moves.contains(&destination))
    }

    pub(crate) fn set_position(&mut self, position: Coordinate) {
        self.position = position;
        self.has_moved = true;
    }

    pub(crate) fn set_en_passant(&mut self, eligible: bool) {
        self.en_passant = eligible && self.is_pawn();
    }

    pub(crate) fn set_legal_moves(&mut self, moves: LegalMoves) {
        self.legal_moves = moves;
    }
}

impl TryFrom<char> for Piece {
    type Error = ();

    /// Parses a FEN piece letter into an unplaced piece standing on a1; uppercase letters are
    /// `Team::Our`.
    fn try_from(c: char) -> Result<Self, Self::Error> {
        let kind = PieceKind::try_from(c)?;
        let team = if c.is_ascii_uppercase() {
            Team::Our
        } else {
            Team::Opponent
        };
        Ok(Piece::new(Coordinate::new(0, 0), kind, team, false))
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let chr = match self.kind {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };

        match self.team {
            Team::Our => f.write_char(chr.to_ascii_uppercase()),
            Team::Opponent => f.write_char(chr),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use super::{LegalMoves, MoveVec, Piece};
    use crate::types::{Coordinate, PieceKind, Team};

    #[test]
    fn fresh_piece_has_unknown_moves() {
        let piece = Piece::new(Coordinate::new(4, 1), PieceKind::Pawn, Team::Our, false);
        assert!(piece.legal_moves().is_none());
        assert!(!piece.can_move_to(Coordinate::new(4, 2)));
    }

    #[test]
    fn computed_moves_are_queryable() {
        let mut piece = Piece::new(Coordinate::new(4, 1), PieceKind::Pawn, Team::Our, false);
        let mut moves = MoveVec::default();
        moves.push(Coordinate::new(4, 2));
        piece.set_legal_moves(LegalMoves::Computed(moves));
        assert!(piece.can_move_to(Coordinate::new(4, 2)));
        assert!(!piece.can_move_to(Coordinate::new(4, 3)));
    }

    #[test]
    fn en_passant_only_sticks_to_pawns() {
        let mut knight = Piece::new(Coordinate::new(1, 0), PieceKind::Knight, Team::Our, false);
        knight.set_en_passant(true);
        assert!(!knight.is_en_passant_eligible());

        let mut pawn = Piece::new(Coordinate::new(1, 3), PieceKind::Pawn, Team::Our, true);
        pawn.set_en_passant(true);
        assert!(pawn.is_en_passant_eligible());
    }

    #[test]
    fn moving_marks_piece_as_moved() {
        let mut rook = Piece::new(Coordinate::new(0, 0), PieceKind::Rook, Team::Our, false);
        rook.set_position(Coordinate::new(0, 4));
        assert!(rook.has_moved());
        assert_eq!(Coordinate::new(0, 4), rook.position());
    }

    #[test]
    fn fen_letters() {
        let piece = Piece::try_from('q').unwrap();
        assert_eq!(PieceKind::Queen, piece.kind());
        assert_eq!(Team::Opponent, piece.team());
        assert_eq!("N", Piece::try_from('N').unwrap().to_string());
        assert!(Piece::try_from('x').is_err());
    }
}
