// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::io::Write;

use csv::Writer;

use crate::moves::{Move, MoveFlags};
use crate::types::PieceKind;

/// The moves accepted so far in a game, oldest first. Records are only ever appended; the last
/// one is completed in place when its promotion is resolved.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MoveHistory {
    moves: Vec<Move>,
}

impl MoveHistory {
    pub fn new() -> MoveHistory {
        MoveHistory { moves: Vec::new() }
    }

    pub(crate) fn push(&mut self, mov: Move) {
        self.moves.push(mov);
    }

    pub(crate) fn record_promotion(&mut self, kind: PieceKind, flags: MoveFlags) {
        if let Some(last) = self.moves.last_mut() {
            *last = last.with_promotion(kind, flags);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.moves.clear();
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn last(&self) -> Option<&Move> {
        self.moves.last()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Renders the history one full move per line, e.g. `1. e2-e4 e7-e5`.
    pub fn numbered(&self) -> String {
        let mut buf = String::new();
        for (number, pair) in self.moves.chunks(2).enumerate() {
            buf.push_str(&format!("{}.", number + 1));
            for mov in pair {
                buf.push(' ');
                buf.push_str(&mov.to_string());
            }
            buf.push('\n');
        }

        buf
    }

    /// Writes every record as CSV, with a header row.
    pub fn write_csv<W: Write>(&self, writer: W) -> csv::Result<()> {
        let mut writer = Writer::from_writer(writer);
        for mov in &self.moves {
            writer.serialize(mov)?;
        }

        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use super::MoveHistory;
    use crate::moves::{Move, MoveFlags};
    use crate::types::{Coordinate, PieceKind, Team};

    fn record(team: Team, kind: PieceKind, from: &str, to: &str, captured: Option<PieceKind>) -> Move {
        Move::new(
            kind,
            team,
            Coordinate::try_from(from).unwrap(),
            Coordinate::try_from(to).unwrap(),
            captured,
            MoveFlags::NONE,
        )
    }

    fn sample() -> MoveHistory {
        let mut history = MoveHistory::new();
        history.push(record(Team::Our, PieceKind::Pawn, "e2", "e4", None));
        history.push(record(Team::Opponent, PieceKind::Pawn, "d7", "d5", None));
        history.push(record(
            Team::Our,
            PieceKind::Pawn,
            "e4",
            "d5",
            Some(PieceKind::Pawn),
        ));
        history
    }

    #[test]
    fn numbered_lines() {
        assert_eq!("1. e2-e4 d7-d5\n2. e4-d5x\n", sample().numbered());
    }

    #[test]
    fn csv_export() {
        let mut buf = Vec::new();
        sample().write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            vec![
                "piece,team,from,to,captured,promoted,flags",
                "Pawn,Our,e2,e4,,,0",
                "Pawn,Opponent,d7,d5,,,0",
                "Pawn,Our,e4,d5,Pawn,,1",
            ],
            lines
        );
    }

    #[test]
    fn promotion_completes_last_record() {
        let mut history = sample();
        history.push(record(Team::Opponent, PieceKind::Pawn, "b2", "b1", None));
        history.record_promotion(PieceKind::Knight, MoveFlags::NONE);
        let last = history.last().unwrap();
        assert_eq!(Some(PieceKind::Knight), last.promoted());
        assert_eq!("1. e2-e4 d7-d5\n2. e4-d5x b2-b1=N\n", history.numbered());
        assert_eq!(None, history.moves()[0].promoted());
    }

    #[test]
    fn empty_history() {
        let history = MoveHistory::new();
        assert!(history.is_empty());
        assert_eq!("", history.numbered());
        assert!(history.last().is_none());
    }
}
