// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::convert::TryFrom;

use arbiter::{Board, Coordinate, Game, GameConfig, GameState, Outcome, PieceKind, Team};

fn sq(name: &str) -> Coordinate {
    Coordinate::try_from(name).unwrap()
}

fn play_all(game: &mut Game, moves: &[(&str, &str)]) {
    for &(from, to) in moves {
        assert!(
            game.attempt_move(sq(from), sq(to)),
            "{}-{} was rejected",
            from,
            to
        );
    }
}

#[test]
fn opening_pawn_push() {
    let mut game = Game::default();
    assert_eq!(1, game.board().total_turns());
    assert_eq!(Team::Our, game.board().side_to_move());

    assert!(game.attempt_move(Coordinate::new(4, 1), Coordinate::new(4, 3)));
    assert_eq!(2, game.board().total_turns());
    assert_eq!(Team::Opponent, game.board().side_to_move());

    let record = game.history().last().unwrap();
    assert_eq!(PieceKind::Pawn, record.piece());
    assert_eq!(Team::Our, record.team());
    assert_eq!("e2", record.from().to_string());
    assert_eq!("e4", record.to().to_string());
    assert_eq!(None, record.captured());

    // there should be a pawn on e4 and nothing on e2.
    let pawn = game.board().piece_at(sq("e4")).unwrap();
    assert_eq!(Team::Our, pawn.team());
    assert!(pawn.has_moved());
    assert!(pawn.is_en_passant_eligible());
    assert!(game.board().piece_at(sq("e2")).is_none());
}

#[test]
fn en_passant_removes_the_passed_pawn() {
    let mut game = Game::default();
    play_all(
        &mut game,
        &[
            ("a2", "a3"),
            ("d7", "d5"),
            ("a3", "a4"),
            ("d5", "d4"),
            ("e2", "e4"),
        ],
    );

    assert!(game.attempt_move(sq("d4"), sq("e3")));
    assert!(game.board().piece_at(sq("e4")).is_none());
    assert_eq!(31, game.board().pieces().len());
    let capturer = game.board().piece_at(sq("e3")).unwrap();
    assert_eq!(Team::Opponent, capturer.team());

    let record = game.history().last().unwrap();
    assert_eq!(Some(PieceKind::Pawn), record.captured());
    assert!(record.is_en_passant());
    assert_eq!("e3", record.to().to_string());
    assert_eq!(&[PieceKind::Pawn][..], game.captured(Team::Our));
}

#[test]
fn en_passant_window_closes() {
    let mut game = Game::default();
    play_all(
        &mut game,
        &[
            ("a2", "a3"),
            ("d7", "d5"),
            ("a3", "a4"),
            ("d5", "d4"),
            ("e2", "e4"),
            ("b8", "c6"),
            ("h2", "h3"),
        ],
    );

    assert!(!game.board().piece_at(sq("e4")).unwrap().is_en_passant_eligible());
    assert!(!game.attempt_move(sq("d4"), sq("e3")));
}

#[test]
fn promotion_to_queen() {
    let mut game = Game::default();
    play_all(
        &mut game,
        &[
            ("h2", "h4"),
            ("g7", "g5"),
            ("h4", "g5"),
            ("h7", "h6"),
            ("g5", "h6"),
            ("f8", "g7"),
            ("h6", "g7"),
            ("g8", "f6"),
            ("g7", "h8"),
        ],
    );

    match game.state() {
        GameState::AwaitingPromotionChoice { pawn } => {
            assert_eq!(sq("h8"), pawn.position());
            assert_eq!(Team::Our, pawn.team());
        }
        other => panic!("unexpected state {:?}", other),
    }

    // nothing else may move while the choice is pending.
    assert!(!game.attempt_move(sq("f6"), sq("g8")));

    assert!(game.resolve_promotion(PieceKind::Queen));
    assert_eq!(GameState::AwaitingMove, *game.state());

    let queen = game.board().piece_at(sq("h8")).unwrap();
    assert_eq!(PieceKind::Queen, queen.kind());
    assert_eq!(Team::Our, queen.team());
    assert!(queen.has_moved());
    assert!(!game.board().pieces().iter().any(|p| p.is_pawn() && p.position() == sq("h8")));

    let record = game.history().last().unwrap();
    assert!(record.is_promotion());
    assert_eq!(Some(PieceKind::Rook), record.captured());
    assert_eq!(Some(PieceKind::Queen), record.promoted());
    assert_eq!("g7-h8x=Q+", record.to_string());

    // the queen checks along the emptied back rank.
    assert!(game.board().is_check(Team::Opponent));
    assert!(game.attempt_move(sq("f6"), sq("g8")));
}

#[test]
fn timeout_ends_the_game() {
    let mut game = Game::default();
    play_all(&mut game, &[("e2", "e4"), ("e7", "e5"), ("d1", "h5")]);

    game.timeout(Team::Opponent);
    assert_eq!(Some(Team::Our), game.board().winning_team());
    assert_eq!(
        Some(Outcome {
            winner: Team::Our,
            checkmate: false
        }),
        game.outcome()
    );
    assert!(!game.attempt_move(sq("g8"), sq("f6")));
}

#[test]
fn clocks_drive_timeouts() {
    let mut game = Game::new(GameConfig {
        clock_seconds: Some(3),
    });
    game.tick(1);
    play_all(&mut game, &[("e2", "e4")]);
    game.tick(2);
    assert!(game.outcome().is_none());
    game.tick(1);
    assert_eq!(Some(Team::Our), game.board().winning_team());
    assert_eq!("0:00", game.clock(Team::Opponent).unwrap().to_string());
}

#[test]
fn restart_from_any_state() {
    let mut game = Game::default();
    play_all(
        &mut game,
        &[
            ("h2", "h4"),
            ("g7", "g5"),
            ("h4", "g5"),
            ("h7", "h6"),
            ("g5", "h6"),
            ("f8", "g7"),
            ("h6", "g7"),
            ("g8", "f6"),
            ("g7", "h8"),
        ],
    );
    assert!(game.pending_promotion().is_some());

    game.restart();
    assert_eq!(&Board::initial(), game.board());
    assert_eq!(1, game.board().total_turns());
    assert_eq!(Team::Our, game.board().side_to_move());
    assert!(game.history().is_empty());
    assert!(game.captured(Team::Our).is_empty());
    assert!(game.captured(Team::Opponent).is_empty());
    assert_eq!(GameState::AwaitingMove, *game.state());

    game.timeout(Team::Our);
    game.restart();
    assert!(game.outcome().is_none());
    assert!(game.attempt_move(sq("e2"), sq("e4")));
}
