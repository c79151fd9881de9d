// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::fmt;

use serde::Serializer;

use crate::types::{Coordinate, PieceKind, Team};

bitflags! {
    pub struct MoveFlags: u8 {
        const NONE = 0;
        const CAPTURE = 0b0000_0001;
        const EN_PASSANT = 0b0000_0010;
        const PROMOTION = 0b0000_0100;
        const CHECK = 0b0000_1000;
        const CHECKMATE = 0b0001_0000;
    }
}

fn serialize_flags<S: Serializer>(flags: &MoveFlags, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(flags.bits())
}

/// A record of a move that was accepted by the game, as shown in the move history.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Move {
    piece: PieceKind,
    team: Team,
    from: Coordinate,
    to: Coordinate,
    captured: Option<PieceKind>,
    promoted: Option<PieceKind>,
    #[serde(serialize_with = "serialize_flags")]
    flags: MoveFlags,
}

impl Move {
    pub fn new(
        piece: PieceKind,
        team: Team,
        from: Coordinate,
        to: Coordinate,
        captured: Option<PieceKind>,
        flags: MoveFlags,
    ) -> Move {
        let flags = if captured.is_some() {
            flags | MoveFlags::CAPTURE
        } else {
            flags
        };

        Move {
            piece,
            team,
            from,
            to,
            captured,
            promoted: None,
            flags,
        }
    }

    /// Completes the record of a pawn move once the pawn's replacement is chosen. `flags`
    /// carries the check state of the board after the replacement.
    pub fn with_promotion(self, kind: PieceKind, flags: MoveFlags) -> Move {
        let keep = MoveFlags::CAPTURE | MoveFlags::EN_PASSANT;
        Move {
            promoted: Some(kind),
            flags: (self.flags & keep) | MoveFlags::PROMOTION | flags,
            ..self
        }
    }

    pub fn piece(&self) -> PieceKind {
        self.piece
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn from(&self) -> Coordinate {
        self.from
    }

    pub fn to(&self) -> Coordinate {
        self.to
    }

    pub fn captured(&self) -> Option<PieceKind> {
        self.captured
    }

    /// The kind a promoted pawn became, once chosen.
    pub fn promoted(&self) -> Option<PieceKind> {
        self.promoted
    }

    pub fn flags(&self) -> MoveFlags {
        self.flags
    }

    pub fn is_capture(&self) -> bool {
        self.flags.contains(MoveFlags::CAPTURE)
    }

    pub fn is_en_passant(&self) -> bool {
        self.flags.contains(MoveFlags::EN_PASSANT)
    }

    pub fn is_promotion(&self) -> bool {
        self.flags.contains(MoveFlags::PROMOTION)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}-{}", self.piece.symbol(), self.from, self.to)?;
        if self.is_capture() {
            write!(f, "x")?;
        }

        if let Some(kind) = self.promoted {
            write!(f, "={}", kind.symbol())?;
        }

        if self.flags.contains(MoveFlags::CHECKMATE) {
            write!(f, "#")
        } else if self.flags.contains(MoveFlags::CHECK) {
            write!(f, "+")
        } else {
            Ok(())
        }
    }
}
