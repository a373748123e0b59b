use shakmaty::{Move, san::SanPlus};
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// One half-move of the loaded mainline. White plies have even indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ply {
    pub index: usize,
    /// SAN as re-derived from the position, including check suffixes.
    pub san: SanPlus,
    pub mv: Move,
}

/// `12.` before White's ply at `index`, `12...` before Black's.
pub fn move_prefix(index: usize) -> String {
    let dots = if index.is_multiple_of(2) { "." } else { "..." };
    format!("{}{}", index / 2 + 1, dots)
}

pub type PlyList = SmallVec<[Ply; 64]>;

/// Ply index -> comment that follows it. Absence means "no comment".
pub type CommentMap = BTreeMap<usize, String>;
