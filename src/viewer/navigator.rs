use shakmaty::{Chess, Color, Position};
use std::fmt;

use super::error::ViewerError;
use super::types::{Ply, PlyList};

/// Enabled state of the four navigation affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub start: bool,
    pub prev: bool,
    pub next: bool,
    pub end: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
    Check { side: Color },
    ToMove { side: Color },
}

fn side_name(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checkmate { winner } => write!(f, "Checkmate! {} wins", side_name(*winner)),
            Self::Stalemate => write!(f, "Stalemate - draw"),
            Self::InsufficientMaterial => write!(f, "Draw by insufficient material"),
            Self::Check { side } => write!(f, "{} to move - check!", side_name(*side)),
            Self::ToMove { side } => write!(f, "{} to move", side_name(*side)),
        }
    }
}

/// Cursor over a loaded mainline, driving a position from the start.
///
/// The cursor is `None` for the initial position, otherwise the index of the
/// last ply applied. Positions have no undo, so any backward motion replays
/// from the initial position.
#[derive(Debug, Clone)]
pub struct Navigator {
    plies: PlyList,
    position: Chess,
    cursor: Option<usize>,
}

impl Navigator {
    pub fn new(plies: PlyList) -> Self {
        Self {
            plies,
            position: Chess::default(),
            cursor: None,
        }
    }

    pub fn len(&self) -> usize {
        self.plies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plies.is_empty()
    }

    pub fn plies(&self) -> &[Ply] {
        &self.plies
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn current_ply(&self) -> Option<&Ply> {
        self.cursor.and_then(|i| self.plies.get(i))
    }

    fn last_index(&self) -> Option<usize> {
        self.plies.len().checked_sub(1)
    }

    pub fn go_to_start(&mut self) {
        self.position = Chess::default();
        self.cursor = None;
    }

    pub fn go_to_end(&mut self) {
        self.replay_through(self.last_index());
    }

    /// Applies the next ply. Returns `false` at the last ply.
    pub fn step_forward(&mut self) -> bool {
        let next = self.cursor.map_or(0, |i| i + 1);
        let Some(ply) = self.plies.get(next) else {
            return false;
        };

        self.position.play_unchecked(ply.mv.clone());
        self.cursor = Some(next);
        true
    }

    /// Moves back one ply by replaying from the start. Returns `false` at the
    /// initial position.
    pub fn step_backward(&mut self) -> bool {
        let Some(current) = self.cursor else {
            return false;
        };

        self.replay_through(current.checked_sub(1));
        true
    }

    /// Jumps to `target` (`None` = initial position). Out-of-range targets
    /// leave the navigator untouched.
    pub fn go_to(&mut self, target: Option<usize>) -> Result<(), ViewerError> {
        if let Some(index) = target
            && index >= self.plies.len()
        {
            return Err(ViewerError::OutOfRange {
                requested: index,
                len: self.plies.len(),
            });
        }

        self.replay_through(target);
        Ok(())
    }

    fn replay_through(&mut self, target: Option<usize>) {
        let mut position = Chess::default();
        if let Some(last) = target {
            for ply in &self.plies[..=last] {
                position.play_unchecked(ply.mv.clone());
            }
        }
        self.position = position;
        self.cursor = target;
    }

    pub fn controls(&self) -> Controls {
        let at_start = self.cursor.is_none();
        let at_end = self.cursor == self.last_index() || self.plies.is_empty();
        Controls {
            start: !at_start,
            prev: !at_start,
            next: !at_end,
            end: !at_end,
        }
    }

    pub fn status(&self) -> GameStatus {
        let pos = &self.position;
        let side = pos.turn();
        if pos.is_checkmate() {
            GameStatus::Checkmate { winner: !side }
        } else if pos.is_stalemate() {
            GameStatus::Stalemate
        } else if pos.is_insufficient_material() {
            GameStatus::InsufficientMaterial
        } else if pos.is_check() {
            GameStatus::Check { side }
        } else {
            GameStatus::ToMove { side }
        }
    }
}
