// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Movement geometry for every piece kind.
//!
//! Everything in this module is a pure function of a piece and the full piece list. Nothing
//! here knows whose turn it is, and nothing here considers the safety of the mover's own king;
//! the board layers both of those on top. Each kind has a single-move test (`<kind>_move`) and
//! a full enumeration (`possible_<kind>_moves`); the two always agree.
use crate::piece::{MoveVec, Piece};
use crate::types::{Coordinate, Direction, PieceKind, Team};
use crate::types::{BISHOP_DIRECTIONS, DIRECTIONS, KNIGHT_OFFSETS, ROOK_DIRECTIONS};

pub fn piece_at(pieces: &[Piece], at: Coordinate) -> Option<&Piece> {
    pieces.iter().find(|p| p.position() == at)
}

fn is_occupied(pieces: &[Piece], at: Coordinate) -> bool {
    piece_at(pieces, at).is_some()
}

fn is_occupied_by_opponent(pieces: &[Piece], at: Coordinate, team: Team) -> bool {
    piece_at(pieces, at).map_or(false, |p| p.team() != team)
}

fn is_empty_or_occupied_by_opponent(pieces: &[Piece], at: Coordinate, team: Team) -> bool {
    piece_at(pieces, at).map_or(true, |p| p.team() != team)
}

fn delta(from: Coordinate, to: Coordinate) -> (i8, i8) {
    (
        to.x() as i8 - from.x() as i8,
        to.y() as i8 - from.y() as i8,
    )
}

//
// Pawns
//

/// Returns the pawn that `piece` would capture en passant by moving to `destination`, if any.
///
/// The victim is an opposing pawn standing beside the mover (on the destination file, one rank
/// behind the destination) that advanced two squares on the move just played.
pub fn en_passant_victim<'a>(
    piece: &Piece,
    destination: Coordinate,
    pieces: &'a [Piece],
) -> Option<&'a Piece> {
    if !piece.is_pawn() {
        return None;
    }

    let dir = piece.team().pawn_direction();
    let (dx, dy) = delta(piece.position(), destination);
    if dx.abs() != 1 || dy != dir || is_occupied(pieces, destination) {
        return None;
    }

    let victim_square = destination.offset(0, -dir)?;
    piece_at(pieces, victim_square)
        .filter(|p| p.team() != piece.team() && p.is_en_passant_eligible())
}

pub fn is_en_passant_move(piece: &Piece, destination: Coordinate, pieces: &[Piece]) -> bool {
    en_passant_victim(piece, destination, pieces).is_some()
}

pub fn pawn_move(piece: &Piece, destination: Coordinate, pieces: &[Piece]) -> bool {
    let team = piece.team();
    let dir = team.pawn_direction();
    let (dx, dy) = delta(piece.position(), destination);

    if dx == 0 {
        if dy == dir {
            return !is_occupied(pieces, destination);
        }

        if dy == 2 * dir {
            let on_start_rank = piece.position().y() == team.pawn_start_rank();
            let passing = match piece.position().offset(0, dir) {
                Some(square) => square,
                None => return false,
            };
            return on_start_rank
                && !piece.has_moved()
                && !is_occupied(pieces, passing)
                && !is_occupied(pieces, destination);
        }

        return false;
    }

    if dx.abs() == 1 && dy == dir {
        return is_occupied_by_opponent(pieces, destination, team)
            || is_en_passant_move(piece, destination, pieces);
    }

    false
}

pub fn possible_pawn_moves(piece: &Piece, pieces: &[Piece]) -> MoveVec {
    let mut moves = MoveVec::default();
    let team = piece.team();
    let dir = team.pawn_direction();
    let position = piece.position();

    if let Some(single) = position.offset(0, dir) {
        if !is_occupied(pieces, single) {
            moves.push(single);
            if position.y() == team.pawn_start_rank() && !piece.has_moved() {
                if let Some(double) = single.offset(0, dir) {
                    if !is_occupied(pieces, double) {
                        moves.push(double);
                    }
                }
            }
        }
    }

    for &dx in &[-1, 1] {
        if let Some(diagonal) = position.offset(dx, dir) {
            if is_occupied_by_opponent(pieces, diagonal, team)
                || is_en_passant_move(piece, diagonal, pieces)
            {
                moves.push(diagonal);
            }
        }
    }

    moves
}

//
// Knights and kings: fixed offsets.
//

pub fn knight_move(piece: &Piece, destination: Coordinate, pieces: &[Piece]) -> bool {
    let offset = delta(piece.position(), destination);
    KNIGHT_OFFSETS.contains(&offset)
        && is_empty_or_occupied_by_opponent(pieces, destination, piece.team())
}

pub fn possible_knight_moves(piece: &Piece, pieces: &[Piece]) -> MoveVec {
    KNIGHT_OFFSETS
        .iter()
        .filter_map(|&(dx, dy)| piece.position().offset(dx, dy))
        .filter(|&square| is_empty_or_occupied_by_opponent(pieces, square, piece.team()))
        .collect()
}

pub fn king_move(piece: &Piece, destination: Coordinate, pieces: &[Piece]) -> bool {
    let (dx, dy) = delta(piece.position(), destination);
    dx.abs() <= 1
        && dy.abs() <= 1
        && (dx, dy) != (0, 0)
        && is_empty_or_occupied_by_opponent(pieces, destination, piece.team())
}

pub fn possible_king_moves(piece: &Piece, pieces: &[Piece]) -> MoveVec {
    DIRECTIONS
        .iter()
        .filter_map(|&dir| piece.position().towards(dir))
        .filter(|&square| is_empty_or_occupied_by_opponent(pieces, square, piece.team()))
        .collect()
}

//
// Sliding pieces.
//

fn slides_to(piece: &Piece, destination: Coordinate, pieces: &[Piece], dirs: &[Direction]) -> bool {
    let (dx, dy) = delta(piece.position(), destination);
    if (dx, dy) == (0, 0) || (dx != 0 && dy != 0 && dx.abs() != dy.abs()) {
        return false;
    }

    let step = (dx.signum(), dy.signum());
    if !dirs.iter().any(|dir| dir.as_vector() == step) {
        return false;
    }

    // Every square strictly between the piece and its destination has to be empty.
    let mut square = piece.position();
    loop {
        square = match square.offset(step.0, step.1) {
            Some(next) => next,
            None => return false,
        };

        if square == destination {
            return is_empty_or_occupied_by_opponent(pieces, destination, piece.team());
        }

        if is_occupied(pieces, square) {
            return false;
        }
    }
}

fn slides(piece: &Piece, pieces: &[Piece], dirs: &[Direction]) -> MoveVec {
    let mut moves = MoveVec::default();
    for &dir in dirs {
        let mut square = piece.position();
        while let Some(next) = square.towards(dir) {
            square = next;
            match piece_at(pieces, square) {
                None => moves.push(square),
                Some(blocker) => {
                    if blocker.team() != piece.team() {
                        moves.push(square);
                    }

                    break;
                }
            }
        }
    }

    moves
}

pub fn bishop_move(piece: &Piece, destination: Coordinate, pieces: &[Piece]) -> bool {
    slides_to(piece, destination, pieces, &BISHOP_DIRECTIONS)
}

pub fn possible_bishop_moves(piece: &Piece, pieces: &[Piece]) -> MoveVec {
    slides(piece, pieces, &BISHOP_DIRECTIONS)
}

pub fn rook_move(piece: &Piece, destination: Coordinate, pieces: &[Piece]) -> bool {
    slides_to(piece, destination, pieces, &ROOK_DIRECTIONS)
}

pub fn possible_rook_moves(piece: &Piece, pieces: &[Piece]) -> MoveVec {
    slides(piece, pieces, &ROOK_DIRECTIONS)
}

pub fn queen_move(piece: &Piece, destination: Coordinate, pieces: &[Piece]) -> bool {
    slides_to(piece, destination, pieces, &DIRECTIONS)
}

pub fn possible_queen_moves(piece: &Piece, pieces: &[Piece]) -> MoveVec {
    slides(piece, pieces, &DIRECTIONS)
}

//
// Dispatch over piece kinds.
//

/// Single-move legality test, ignoring the safety of the mover's king.
pub fn is_legal_move(piece: &Piece, destination: Coordinate, pieces: &[Piece]) -> bool {
    match piece.kind() {
        PieceKind::Pawn => pawn_move(piece, destination, pieces),
        PieceKind::Knight => knight_move(piece, destination, pieces),
        PieceKind::Bishop => bishop_move(piece, destination, pieces),
        PieceKind::Rook => rook_move(piece, destination, pieces),
        PieceKind::Queen => queen_move(piece, destination, pieces),
        PieceKind::King => king_move(piece, destination, pieces),
    }
}

/// Every square the piece could move to, ignoring the safety of the mover's king.
pub fn possible_moves(piece: &Piece, pieces: &[Piece]) -> MoveVec {
    match piece.kind() {
        PieceKind::Pawn => possible_pawn_moves(piece, pieces),
        PieceKind::Knight => possible_knight_moves(piece, pieces),
        PieceKind::Bishop => possible_bishop_moves(piece, pieces),
        PieceKind::Rook => possible_rook_moves(piece, pieces),
        PieceKind::Queen => possible_queen_moves(piece, pieces),
        PieceKind::King => possible_king_moves(piece, pieces),
    }
}

/// Whether any piece of team `by` could capture on `target`. The target square is expected to
/// hold a piece of the other team (in practice, a king).
pub fn is_attacked(target: Coordinate, by: Team, pieces: &[Piece]) -> bool {
    pieces
        .iter()
        .filter(|p| p.team() == by)
        .any(|p| is_legal_move(p, target, pieces))
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use super::*;
    use crate::board::Board;

    fn sq(name: &str) -> Coordinate {
        Coordinate::try_from(name).unwrap()
    }

    fn sorted(moves: &[Coordinate]) -> Vec<String> {
        let mut names: Vec<_> = moves.iter().map(|c| c.to_string()).collect();
        names.sort();
        names
    }

    fn moves_of(fen: &str, square: &str) -> Vec<String> {
        let board = Board::from_fen(fen).unwrap();
        let piece = board.piece_at(sq(square)).unwrap();
        sorted(&possible_moves(piece, board.pieces()))
    }

    #[test]
    fn pawn_opening_moves() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1";
        assert_eq!(vec!["e3", "e4"], moves_of(fen, "e2"));
        assert_eq!(vec!["d5", "d6"], moves_of(fen, "d7"));
    }

    #[test]
    fn pawn_blocked_double_step() {
        // a knight on e3 blocks both advances, one on e4 only the double step.
        assert!(moves_of("8/8/8/8/8/4n3/4P3/8 w - - 0 1", "e2").is_empty());
        assert_eq!(vec!["e3"], moves_of("8/8/8/8/4n3/8/4P3/8 w - - 0 1", "e2"));
    }

    #[test]
    fn pawn_captures_only_opponents() {
        let fen = "8/8/8/8/8/3p1P2/4P3/8 w - - 0 1";
        assert_eq!(vec!["d3", "e3", "e4"], moves_of(fen, "e2"));
    }

    #[test]
    fn moved_pawn_on_start_rank_has_no_double_step() {
        let pawn = Piece::new(sq("e2"), PieceKind::Pawn, Team::Our, true);
        let pieces = vec![pawn.clone()];
        assert_eq!(vec!["e3"], sorted(&possible_moves(&pawn, &pieces)));
        assert!(!pawn_move(&pawn, sq("e4"), &pieces));
    }

    #[test]
    fn en_passant_square_offered() {
        // black just played d7-d5 next to the white pawn on e5.
        let fen = "8/8/8/3pP3/8/8/8/8 w - d6 0 1";
        assert_eq!(vec!["d6", "e6"], moves_of(fen, "e5"));

        let board = Board::from_fen(fen).unwrap();
        let pawn = board.piece_at(sq("e5")).unwrap();
        let victim = en_passant_victim(pawn, sq("d6"), board.pieces()).unwrap();
        assert_eq!(sq("d5"), victim.position());
    }

    #[test]
    fn no_en_passant_without_double_step() {
        assert_eq!(vec!["e6"], moves_of("8/8/8/3pP3/8/8/8/8 w - - 0 1", "e5"));
    }

    #[test]
    fn knight_in_corner() {
        assert_eq!(vec!["b3", "c2"], moves_of("8/8/8/8/8/8/8/N7 w - - 0 1", "a1"));
        assert_eq!(vec!["b3"], moves_of("8/8/8/8/8/8/2P5/N7 w - - 0 1", "a1"));
    }

    #[test]
    fn rook_stops_at_blockers() {
        let fen = "8/8/8/8/R2p4/8/8/P7 w - - 0 1";
        assert_eq!(
            vec!["a2", "a3", "a5", "a6", "a7", "a8", "b4", "c4", "d4"],
            moves_of(fen, "a4")
        );
    }

    #[test]
    fn bishop_diagonals() {
        let fen = "8/8/8/8/8/2p5/1B6/8 w - - 0 1";
        assert_eq!(vec!["a1", "a3", "c1", "c3"], moves_of(fen, "b2"));
    }

    #[test]
    fn queen_in_open_board() {
        assert_eq!(27, moves_of("8/8/8/3Q4/8/8/8/8 w - - 0 1", "d5").len());
    }

    #[test]
    fn king_ignores_own_safety() {
        // geometry only: the king may step next to the opposing rook's file.
        let fen = "8/8/8/8/8/8/r7/4K3 w - - 0 1";
        assert_eq!(vec!["d1", "d2", "e2", "f1", "f2"], moves_of(fen, "e1"));
    }

    #[test]
    fn single_move_test_agrees_with_enumeration() {
        let fens = [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w - - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "8/8/8/3pP3/8/8/8/8 w - d6 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w - - 1 8",
        ];

        for fen in fens.iter() {
            let board = Board::from_fen(fen).unwrap();
            for piece in board.pieces() {
                let enumerated = possible_moves(piece, board.pieces());
                for square in Coordinate::all() {
                    assert_eq!(
                        enumerated.contains(&square),
                        is_legal_move(piece, square, board.pieces()),
                        "{} {} -> {} in {}",
                        piece,
                        piece.position(),
                        square,
                        fen
                    );
                }
            }
        }
    }

    #[test]
    fn attacked_king() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4R1K1 b - - 0 1").unwrap();
        assert!(is_attacked(sq("e8"), Team::Our, board.pieces()));
        assert!(!is_attacked(sq("g1"), Team::Opponent, board.pieces()));
    }
}
