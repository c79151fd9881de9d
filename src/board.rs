// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::convert::TryFrom;
use std::fmt;

use hashbrown::HashSet;

use crate::piece::{LegalMoves, MoveVec, Piece};
use crate::rules;
use crate::types::{Coordinate, PieceKind, Team};

/// Possible errors that can arise when parsing a FEN string into a `Board`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FenParseError {
    UnexpectedChar(char),
    UnexpectedEnd,
    InvalidDigit,
    FileDoesNotSumToEight,
    UnknownPiece,
    InvalidSideToMove,
    InvalidCastle,
    InvalidEnPassant,
    EmptyHalfmove,
    InvalidHalfmove,
    EmptyFullmove,
    InvalidFullmove,
}

static BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

lazy_static! {
    static ref INITIAL_BOARD: Board = {
        let mut pieces = Vec::with_capacity(32);
        for &(team, back, front) in &[(Team::Our, 0, 1), (Team::Opponent, 7, 6)] {
            for (x, &kind) in BACK_RANK.iter().enumerate() {
                pieces.push(Piece::new(Coordinate::new(x as u8, back), kind, team, false));
            }

            for x in 0..8 {
                pieces.push(Piece::new(Coordinate::new(x, front), PieceKind::Pawn, team, false));
            }
        }

        Board::new(pieces, 1)
    };
}

/// A snapshot of a game: the pieces on the board, the number of moves played so far and, once
/// the game has ended, the winner.
///
/// Boards are values. Callers that want to change one clone it and mutate the clone; nothing
/// is shared between a board and its clones.
#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    pieces: Vec<Piece>,
    total_turns: u32,
    winning_team: Option<Team>,
}

//
// Board state getters
//

impl Board {
    /// Builds a board from a list of pieces and computes every piece's legal moves.
    pub fn new(pieces: Vec<Piece>, total_turns: u32) -> Board {
        let mut board = Board {
            pieces,
            total_turns,
            winning_team: None,
        };

        debug_assert!(board.has_unique_positions(), "two pieces share a square");
        board.calculate_all_moves();
        board
    }

    /// The standard starting arrangement with `total_turns = 1`.
    pub fn initial() -> Board {
        INITIAL_BOARD.clone()
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn total_turns(&self) -> u32 {
        self.total_turns
    }

    pub fn winning_team(&self) -> Option<Team> {
        self.winning_team
    }

    /// The team whose move it is: `Team::Our` on odd turns, `Team::Opponent` on even ones.
    pub fn side_to_move(&self) -> Team {
        if self.total_turns % 2 == 1 {
            Team::Our
        } else {
            Team::Opponent
        }
    }

    pub fn piece_at(&self, at: Coordinate) -> Option<&Piece> {
        rules::piece_at(&self.pieces, at)
    }

    pub fn king(&self, team: Team) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.is_king() && p.team() == team)
    }

    /// Every (from, to) pair currently legal for the side to move.
    pub fn legal_move_pairs(&self) -> Vec<(Coordinate, Coordinate)> {
        let side = self.side_to_move();
        self.pieces
            .iter()
            .filter(|p| p.team() == side)
            .flat_map(|p| {
                let from = p.position();
                p.legal_moves()
                    .unwrap_or(&[])
                    .iter()
                    .map(move |&to| (from, to))
            })
            .collect()
    }

    pub fn has_legal_moves(&self, team: Team) -> bool {
        self.pieces
            .iter()
            .filter(|p| p.team() == team)
            .any(|p| p.legal_moves().map_or(false, |moves| !moves.is_empty()))
    }

    pub fn has_unique_positions(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.pieces.len());
        self.pieces.iter().all(|p| seen.insert(p.position()))
    }
}

//
// Legality and outcome
//

impl Board {
    /// Recomputes the legal moves of every piece against the current piece list.
    ///
    /// Pieces of the side to move get their geometric moves minus any move that would leave
    /// their own king attacked. Pieces of the other side get an empty set.
    pub fn calculate_all_moves(&mut self) {
        let side = self.side_to_move();
        let computed: Vec<MoveVec> = self
            .pieces
            .iter()
            .map(|piece| {
                if piece.team() != side {
                    return MoveVec::default();
                }

                rules::possible_moves(piece, &self.pieces)
                    .into_iter()
                    .filter(|&dest| king_is_safe_after(&self.pieces, piece, dest))
                    .collect()
            })
            .collect();

        for (piece, moves) in self.pieces.iter_mut().zip(computed) {
            piece.set_legal_moves(LegalMoves::Computed(moves));
        }
    }

    pub fn is_check(&self, team: Team) -> bool {
        match self.king(team) {
            Some(king) => rules::is_attacked(king.position(), team.toggle(), &self.pieces),
            None => false,
        }
    }

    /// Whether the side to move is checkmated on this board.
    pub fn is_checkmate(&self) -> bool {
        let side = self.side_to_move();
        self.is_check(side) && !self.has_legal_moves(side)
    }

    fn evaluate_checkmate(&mut self) {
        if self.winning_team.is_some() {
            return;
        }

        if self.is_checkmate() {
            let winner = self.side_to_move().toggle();
            info!("checkmate on turn {}, {} wins", self.total_turns, winner);
            self.winning_team = Some(winner);
        }
    }

    fn invalidate_moves(&mut self) {
        for piece in &mut self.pieces {
            piece.set_legal_moves(LegalMoves::Unknown);
        }
    }
}

//
// Move application and board manipulation
//

impl Board {
    /// Advances the turn counter. The controller does this on its fresh clone before
    /// delegating to `play_move`.
    pub fn advance_turn(&mut self) {
        // parity survives wrap-around.
        self.total_turns = self.total_turns.wrapping_add(1);
    }

    /// Applies a move that has already been validated by the caller. Returns false, leaving the
    /// board untouched, when `validated` is false or there is no piece on the source square.
    ///
    /// `piece` is the moving piece as seen on the board the move was validated against; it is
    /// matched to this board by position.
    pub fn play_move(
        &mut self,
        en_passant: bool,
        validated: bool,
        piece: &Piece,
        destination: Coordinate,
    ) -> bool {
        if !validated {
            return false;
        }

        let from = piece.position();
        if self.piece_at(from).is_none() {
            warn!("play_move: no piece on {}", from);
            return false;
        }

        if let Some(captured) = relocate(&mut self.pieces, from, destination, en_passant) {
            debug!(
                "{} {} captures {} {} on {}",
                piece.team(),
                piece.kind(),
                captured.team(),
                captured.kind(),
                captured.position()
            );
        }

        let double_step = piece.is_pawn() && (destination.y() as i8 - from.y() as i8).abs() == 2;
        for p in &mut self.pieces {
            p.set_en_passant(double_step && p.position() == destination);
        }

        trace!("played {}{}-{}", piece.kind().symbol(), from, destination);
        self.invalidate_moves();
        self.calculate_all_moves();
        self.evaluate_checkmate();
        debug_assert!(self.has_unique_positions(), "two pieces share a square");
        true
    }

    /// Replaces the pawn on `at` with a new piece of `kind`, owned by the same team and marked
    /// as moved. Returns false if there is no pawn there or `kind` is not a promotion choice.
    pub fn promote(&mut self, at: Coordinate, kind: PieceKind) -> bool {
        if !kind.is_promotion_choice() {
            return false;
        }

        let index = match self.pieces.iter().position(|p| p.position() == at) {
            Some(index) if self.pieces[index].is_pawn() => index,
            _ => return false,
        };

        let team = self.pieces[index].team();
        self.pieces[index] = Piece::new(at, kind, team, true);
        debug!("{} pawn on {} promoted to {:?}", team, at, kind);
        self.invalidate_moves();
        self.calculate_all_moves();
        self.evaluate_checkmate();
        debug_assert!(self.has_unique_positions(), "two pieces share a square");
        true
    }

    /// Ends the game in favor of `team` unless a winner is already recorded.
    pub fn award_win(&mut self, team: Team) -> bool {
        if self.winning_team.is_some() {
            return false;
        }

        self.winning_team = Some(team);
        true
    }
}

/// Moves the piece on `from` to `to`, removing whatever it captures. Returns the captured piece.
fn relocate(
    pieces: &mut Vec<Piece>,
    from: Coordinate,
    to: Coordinate,
    en_passant: bool,
) -> Option<Piece> {
    let mover = pieces.iter().position(|p| p.position() == from)?;
    let victim_square = if en_passant {
        let dir = pieces[mover].team().pawn_direction();
        to.offset(0, -dir)
    } else {
        Some(to)
    };

    let captured = victim_square
        .and_then(|square| pieces.iter().position(|p| p.position() == square))
        .map(|index| pieces.remove(index));

    // The removal may have shifted the mover.
    if let Some(piece) = pieces.iter_mut().find(|p| p.position() == from) {
        piece.set_position(to);
    }

    captured
}

fn king_is_safe_after(pieces: &[Piece], piece: &Piece, destination: Coordinate) -> bool {
    let en_passant = rules::is_en_passant_move(piece, destination, pieces);
    let mut scratch = pieces.to_vec();
    relocate(&mut scratch, piece.position(), destination, en_passant);
    let team = piece.team();
    match scratch.iter().find(|p| p.is_king() && p.team() == team) {
        Some(king) => !rules::is_attacked(king.position(), team.toggle(), &scratch),
        None => true,
    }
}

//
// FEN parsing and generation.
//
// Only the parts of FEN this engine models are kept: castling rights are validated and
// dropped, the halfmove clock is validated and dropped, and the en passant target marks the
// pawn that just advanced two squares.
//

impl Board {
    pub fn from_fen<S: AsRef<str>>(fen: S) -> Result<Board, FenParseError> {
        use std::iter::Peekable;
        use std::str::Chars;

        type Stream<'a> = Peekable<Chars<'a>>;

        fn eat<'a>(iter: &mut Stream<'a>, expected: char) -> Result<(), FenParseError> {
            match iter.next() {
                Some(c) if c == expected => Ok(()),
                Some(c) => Err(FenParseError::UnexpectedChar(c)),
                None => Err(FenParseError::UnexpectedEnd),
            }
        }

        fn peek<'a>(iter: &mut Stream<'a>) -> Result<char, FenParseError> {
            iter.peek().cloned().ok_or(FenParseError::UnexpectedEnd)
        }

        fn eat_number<'a>(iter: &mut Stream<'a>) -> Option<Result<u32, ()>> {
            let mut buf = String::new();
            while let Some(&c) = iter.peek() {
                if !c.is_digit(10) {
                    break;
                }

                buf.push(c);
                iter.next();
            }

            if buf.is_empty() {
                return None;
            }

            Some(buf.parse::<u32>().map_err(|_| ()))
        }

        let mut pieces = Vec::new();
        let iter = &mut fen.as_ref().chars().peekable();
        for y in (0..8u8).rev() {
            let mut x = 0u8;
            while x < 8 {
                let c = peek(iter)?;
                // digits 1 through 8 indicate empty squares.
                if c.is_digit(10) {
                    if c < '1' || c > '8' {
                        return Err(FenParseError::InvalidDigit);
                    }

                    x += c as u8 - b'0';
                    if x > 8 {
                        return Err(FenParseError::FileDoesNotSumToEight);
                    }

                    iter.next();
                    continue;
                }

                let letter = Piece::try_from(c).map_err(|_| FenParseError::UnknownPiece)?;
                let square = Coordinate::new(x, y);
                let has_moved =
                    letter.is_pawn() && square.y() != letter.team().pawn_start_rank();
                pieces.push(Piece::new(square, letter.kind(), letter.team(), has_moved));
                iter.next();
                x += 1;
            }

            if y != 0 {
                eat(iter, '/')?;
            }
        }

        eat(iter, ' ')?;
        let side = match iter.next() {
            Some('w') => Team::Our,
            Some('b') => Team::Opponent,
            Some(_) => return Err(FenParseError::InvalidSideToMove),
            None => return Err(FenParseError::UnexpectedEnd),
        };

        eat(iter, ' ')?;
        if peek(iter)? == '-' {
            iter.next();
        } else {
            let mut seen = 0;
            while let Some(&c) = iter.peek() {
                match c {
                    'K' | 'Q' | 'k' | 'q' if seen < 4 => seen += 1,
                    ' ' => break,
                    _ => return Err(FenParseError::InvalidCastle),
                }

                iter.next();
            }
        }

        eat(iter, ' ')?;
        let en_passant_target = if peek(iter)? == '-' {
            iter.next();
            None
        } else {
            let name: String = iter.by_ref().take(2).collect();
            Some(Coordinate::try_from(name.as_str()).map_err(|_| FenParseError::InvalidEnPassant)?)
        };

        eat(iter, ' ')?;
        match eat_number(iter) {
            Some(Ok(_)) => {}
            Some(Err(_)) => return Err(FenParseError::InvalidHalfmove),
            None => return Err(FenParseError::EmptyHalfmove),
        }

        eat(iter, ' ')?;
        let fullmove = match eat_number(iter) {
            Some(Ok(n)) => n.max(1),
            Some(Err(_)) => return Err(FenParseError::InvalidFullmove),
            None => return Err(FenParseError::EmptyFullmove),
        };

        if let Some(target) = en_passant_target {
            // The pawn that just moved belongs to the side that is not to move and stands one
            // step past the target square.
            let mover = side.toggle();
            let square = target
                .offset(0, mover.pawn_direction())
                .ok_or(FenParseError::InvalidEnPassant)?;
            match pieces.iter_mut().find(|p| p.position() == square) {
                Some(pawn) if pawn.is_pawn() && pawn.team() == mover => pawn.set_en_passant(true),
                _ => return Err(FenParseError::InvalidEnPassant),
            }
        }

        let black = if side == Team::Opponent { 1 } else { 0 };
        let total_turns = fullmove
            .checked_sub(1)
            .and_then(|n| n.checked_mul(2))
            .and_then(|n| n.checked_add(1 + black))
            .ok_or(FenParseError::InvalidFullmove)?;
        Ok(Board::new(pieces, total_turns))
    }

    pub fn as_fen(&self) -> String {
        let mut buf = String::new();
        for y in (0..8u8).rev() {
            let mut empty_squares = 0;
            for x in 0..8u8 {
                if let Some(piece) = self.piece_at(Coordinate::new(x, y)) {
                    if empty_squares != 0 {
                        buf.push_str(&empty_squares.to_string());
                    }
                    buf.push_str(&piece.to_string());
                    empty_squares = 0;
                } else {
                    empty_squares += 1;
                }
            }

            if empty_squares != 0 {
                buf.push_str(&empty_squares.to_string());
            }

            if y != 0 {
                buf.push('/');
            }
        }

        buf.push(' ');
        match self.side_to_move() {
            Team::Our => buf.push('w'),
            Team::Opponent => buf.push('b'),
        }

        buf.push_str(" - ");
        let target = self
            .pieces
            .iter()
            .find(|p| p.is_en_passant_eligible())
            .and_then(|p| p.position().offset(0, -p.team().pawn_direction()));
        match target {
            Some(square) => buf.push_str(&square.to_string()),
            None => buf.push('-'),
        }

        buf.push_str(&format!(" 0 {}", self.total_turns.saturating_sub(1) / 2 + 1));
        buf
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in (0..8u8).rev() {
            for x in 0..8u8 {
                if let Some(piece) = self.piece_at(Coordinate::new(x, y)) {
                    write!(f, " {} ", piece)?;
                } else {
                    write!(f, " . ")?;
                }
            }

            writeln!(f, "| {}", y + 1)?;
        }

        for _ in 0..8 {
            write!(f, "---")?;
        }

        writeln!(f)?;
        for file in "abcdefgh".chars() {
            write!(f, " {} ", file)?;
        }

        writeln!(f)?;
        Ok(())
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::initial()
    }
}
