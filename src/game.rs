// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The game session: the only place that knows whose turn it is.
//!
//! A `Game` owns the authoritative `Board` snapshot together with the move history, the
//! captured-piece lists and the clocks. User intents (a move attempt, a promotion choice, a
//! clock running out, a restart) come in through its methods; every accepted intent replaces
//! the board with a freshly derived clone. Rule violations are reported as `false` and leave
//! the session untouched.
use crate::board::Board;
use crate::clock::Clock;
use crate::config::GameConfig;
use crate::history::MoveHistory;
use crate::moves::{Move, MoveFlags};
use crate::piece::Piece;
use crate::rules;
use crate::types::{Coordinate, PieceKind, TableIndex, Team};

/// How a game ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub winner: Team,
    /// False when the game ended on time.
    pub checkmate: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameState {
    AwaitingMove,
    /// A pawn reached the far rank and is waiting for its replacement kind. `pawn` is a copy
    /// of that pawn, standing on its destination.
    AwaitingPromotionChoice { pawn: Piece },
    GameOver(Outcome),
}

/// Receives the outputs of a game session. Every method defaults to doing nothing.
pub trait GameObserver {
    fn board_changed(&self, _board: &Board) {}
    fn move_played(&self, _mov: &Move) {}
    fn promotion_requested(&self, _team: Team, _at: Coordinate) {}
    fn game_over(&self, _outcome: Outcome) {}
}

pub struct Game {
    config: GameConfig,
    board: Board,
    state: GameState,
    history: MoveHistory,
    captured: [Vec<PieceKind>; 2],
    clocks: Option<[Clock; 2]>,
    observers: Vec<Box<dyn GameObserver>>,
}

impl Game {
    pub fn new(config: GameConfig) -> Game {
        let clocks = config
            .clock_seconds
            .map(|seconds| [Clock::new(seconds), Clock::new(seconds)]);
        Game {
            config,
            board: Board::initial(),
            state: GameState::AwaitingMove,
            history: MoveHistory::new(),
            captured: [Vec::new(), Vec::new()],
            clocks,
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn GameObserver>) {
        self.observers.push(observer);
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    /// Pieces of `team` that have been captured so far, in capture order.
    pub fn captured(&self, team: Team) -> &[PieceKind] {
        &self.captured[team.as_index()]
    }

    pub fn clock(&self, team: Team) -> Option<&Clock> {
        self.clocks.as_ref().map(|clocks| &clocks[team.as_index()])
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.state {
            GameState::GameOver(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn pending_promotion(&self) -> Option<&Piece> {
        match &self.state {
            GameState::AwaitingPromotionChoice { pawn } => Some(pawn),
            _ => None,
        }
    }

    /// Attempts to move the piece standing on `from` to `to`. Returns false, changing nothing,
    /// if the game is not waiting for a move, there is no piece on `from`, it is not that
    /// piece's turn, or `to` is not one of its legal moves.
    pub fn attempt_move(&mut self, from: Coordinate, to: Coordinate) -> bool {
        if self.state != GameState::AwaitingMove {
            debug!("rejecting {}-{}: not awaiting a move", from, to);
            return false;
        }

        let piece = match self.board.piece_at(from) {
            Some(piece) => piece.clone(),
            None => return false,
        };

        let legal = match piece.legal_moves() {
            Some(moves) => moves,
            None => return false,
        };

        if piece.team() != self.board.side_to_move() {
            debug!("rejecting {}-{}: {} is not to move", from, to, piece.team());
            return false;
        }

        if !legal.contains(&to) {
            debug!("rejecting {}-{}: not a legal move", from, to);
            return false;
        }

        let en_passant = rules::is_en_passant_move(&piece, to, self.board.pieces());
        let captured = if en_passant {
            rules::en_passant_victim(&piece, to, self.board.pieces()).cloned()
        } else {
            self.board
                .piece_at(to)
                .filter(|p| p.team() != piece.team())
                .cloned()
        };

        let mut next = self.board.clone();
        next.advance_turn();
        if !next.play_move(en_passant, true, &piece, to) {
            return false;
        }

        let promotes = piece.is_pawn() && to.y() == piece.team().promotion_rank();
        let mut flags = MoveFlags::NONE;
        if en_passant {
            flags |= MoveFlags::EN_PASSANT;
        }
        if promotes {
            flags |= MoveFlags::PROMOTION;
        }
        if next.is_check(next.side_to_move()) {
            flags |= MoveFlags::CHECK;
        }
        if next.winning_team().is_some() {
            flags |= MoveFlags::CHECKMATE;
        }

        let record = Move::new(
            piece.kind(),
            piece.team(),
            from,
            to,
            captured.as_ref().map(|p| p.kind()),
            flags,
        );
        info!("turn {}: {} plays {}", self.board.total_turns(), piece.team(), record);
        self.history.push(record);
        if let Some(victim) = captured {
            self.captured[victim.team().as_index()].push(victim.kind());
        }

        self.board = next;
        for observer in &self.observers {
            observer.move_played(&record);
            observer.board_changed(&self.board);
        }

        if let Some(winner) = self.board.winning_team() {
            self.finish(Outcome {
                winner,
                checkmate: true,
            });
        } else if promotes {
            if let Some(pawn) = self.board.piece_at(to).cloned() {
                debug!("{} pawn on {} awaiting promotion", pawn.team(), to);
                for observer in &self.observers {
                    observer.promotion_requested(pawn.team(), to);
                }
                self.state = GameState::AwaitingPromotionChoice { pawn };
            }
        }

        true
    }

    /// Replaces the pawn awaiting promotion with a piece of `kind`. Returns false, changing
    /// nothing, if no promotion is pending or `kind` is not a knight, bishop, rook or queen.
    pub fn resolve_promotion(&mut self, kind: PieceKind) -> bool {
        let at = match self.pending_promotion() {
            Some(pawn) => pawn.position(),
            None => return false,
        };

        if !kind.is_promotion_choice() {
            return false;
        }

        let mut next = self.board.clone();
        if !next.promote(at, kind) {
            return false;
        }

        let mut flags = MoveFlags::NONE;
        if next.is_check(next.side_to_move()) {
            flags |= MoveFlags::CHECK;
        }
        if next.winning_team().is_some() {
            flags |= MoveFlags::CHECKMATE;
        }

        self.history.record_promotion(kind, flags);
        self.board = next;
        self.state = GameState::AwaitingMove;
        for observer in &self.observers {
            observer.board_changed(&self.board);
        }

        if let Some(winner) = self.board.winning_team() {
            self.finish(Outcome {
                winner,
                checkmate: true,
            });
        }

        true
    }

    /// The clock of `team` ran out: the other team wins, whatever the state of the board. Has
    /// no effect once the game is over.
    pub fn timeout(&mut self, team: Team) {
        if self.outcome().is_some() {
            return;
        }

        let winner = team.toggle();
        let mut next = self.board.clone();
        next.award_win(winner);
        self.board = next;
        for observer in &self.observers {
            observer.board_changed(&self.board);
        }

        self.finish(Outcome {
            winner,
            checkmate: false,
        });
    }

    /// Charges `seconds` to the clock of the side to move, ending the game if it runs out.
    pub fn tick(&mut self, seconds: u32) {
        if self.outcome().is_some() {
            return;
        }

        let side = self.board.side_to_move();
        let expired = match self.clocks.as_mut() {
            Some(clocks) => clocks[side.as_index()].tick(seconds),
            None => false,
        };

        if expired {
            info!("{} ran out of time", side);
            self.timeout(side);
        }
    }

    /// Resets the session to the initial arrangement, from any state.
    pub fn restart(&mut self) {
        info!("restarting game");
        self.board = Board::initial();
        self.state = GameState::AwaitingMove;
        self.history.clear();
        for list in &mut self.captured {
            list.clear();
        }

        if let Some(clocks) = self.clocks.as_mut() {
            for clock in clocks.iter_mut() {
                clock.reset();
            }
        }

        for observer in &self.observers {
            observer.board_changed(&self.board);
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        info!(
            "game over: {} wins{}",
            outcome.winner,
            if outcome.checkmate { " by checkmate" } else { " on time" }
        );
        self.state = GameState::GameOver(outcome);
        for observer in &self.observers {
            observer.game_over(outcome);
        }
    }
}

impl Default for Game {
    fn default() -> Game {
        Game::new(GameConfig::default())
    }
}
