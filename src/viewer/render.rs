use shakmaty::fen::Fen;
use shakmaty::{Chess, Color, EnPassantMode, File, Piece, Position, Rank, Role, Square};
use std::fmt::Write;

use super::navigator::{Controls, GameStatus};
use super::types::{Ply, move_prefix};

/// Everything a host redraws after a navigation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub fen: String,
    pub status: GameStatus,
    pub controls: Controls,
    /// Index of the last applied ply, `None` at the initial position.
    pub ply: Option<usize>,
    pub san: Option<String>,
    pub comment: Option<String>,
}

pub trait Renderer {
    fn render(&mut self, position: &Chess, frame: &Frame);
}

pub fn position_fen(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}

pub fn piece_glyph(piece: Piece) -> char {
    match (piece.color, piece.role) {
        (Color::White, Role::King) => '♔',
        (Color::White, Role::Queen) => '♕',
        (Color::White, Role::Rook) => '♖',
        (Color::White, Role::Bishop) => '♗',
        (Color::White, Role::Knight) => '♘',
        (Color::White, Role::Pawn) => '♙',
        (Color::Black, Role::King) => '♚',
        (Color::Black, Role::Queen) => '♛',
        (Color::Black, Role::Rook) => '♜',
        (Color::Black, Role::Bishop) => '♝',
        (Color::Black, Role::Knight) => '♞',
        (Color::Black, Role::Pawn) => '♟',
    }
}

/// Numbered move list rows: `1. e4 e5`, `2. Nf3`.
pub fn move_list_rows(plies: &[Ply]) -> Vec<String> {
    plies
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| {
            let mut row = format!("{}.", i + 1);
            for ply in pair {
                let _ = write!(row, " {}", ply.san);
            }
            row
        })
        .collect()
}

/// Draws the board as text, rank 8 first, with rank and file labels.
#[derive(Debug, Default)]
pub struct TextRenderer {
    pub output: String,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for TextRenderer {
    fn render(&mut self, position: &Chess, frame: &Frame) {
        let board = position.board();
        let mut out = String::with_capacity(256);

        for rank in (0..8u32).rev() {
            let _ = write!(out, "{} ", rank + 1);
            for file in 0..8u32 {
                let square = Square::from_coords(File::new(file), Rank::new(rank));
                let glyph = board.piece_at(square).map_or('·', piece_glyph);
                out.push(glyph);
                if file < 7 {
                    out.push(' ');
                }
            }
            out.push('\n');
        }
        out.push_str("  a b c d e f g h\n");

        if let (Some(ply), Some(san)) = (frame.ply, frame.san.as_deref()) {
            let _ = writeln!(out, "{} {}", move_prefix(ply), san);
        }
        let _ = writeln!(out, "{}", frame.status);
        if let Some(comment) = &frame.comment {
            let _ = writeln!(out, "{{ {} }}", comment);
        }

        self.output = out;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::filter::parse_mainline;
    use crate::viewer::navigator::Navigator;

    fn frame_for(nav: &Navigator, comment: Option<&str>) -> Frame {
        Frame {
            fen: position_fen(nav.position()),
            status: nav.status(),
            controls: nav.controls(),
            ply: nav.cursor(),
            san: nav.current_ply().map(|p| p.san.to_string()),
            comment: comment.map(str::to_string),
        }
    }

    #[test]
    fn test_start_position_fen() {
        assert_eq!(
            position_fen(&Chess::default()),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
    }

    #[test]
    fn test_move_list_rows() {
        let mainline = parse_mainline("1. e4 e5 2. Nf3 Nc6 3. Bb5").unwrap();
        assert_eq!(
            move_list_rows(&mainline.plies),
            vec!["1. e4 e5", "2. Nf3 Nc6", "3. Bb5"]
        );
    }

    #[test]
    fn test_text_renderer_initial_board() {
        let nav = Navigator::new(parse_mainline("1. e4").unwrap().plies);
        let mut renderer = TextRenderer::new();
        renderer.render(nav.position(), &frame_for(&nav, None));

        let lines: Vec<&str> = renderer.output.lines().collect();
        assert_eq!(lines[0], "8 ♜ ♞ ♝ ♛ ♚ ♝ ♞ ♜");
        assert_eq!(lines[4], "4 · · · · · · · ·");
        assert_eq!(lines[7], "1 ♖ ♘ ♗ ♕ ♔ ♗ ♘ ♖");
        assert_eq!(lines[8], "  a b c d e f g h");
        assert_eq!(lines[9], "White to move");
    }

    #[test]
    fn test_text_renderer_shows_move_and_comment() {
        let mut nav = Navigator::new(parse_mainline("1. e4 e5").unwrap().plies);
        nav.go_to_end();
        let mut renderer = TextRenderer::new();
        renderer.render(nav.position(), &frame_for(&nav, Some("symmetrical")));

        let lines: Vec<&str> = renderer.output.lines().collect();
        assert_eq!(lines[3], "5 · · · · ♟ · · ·");
        assert_eq!(lines[4], "4 · · · · ♙ · · ·");
        assert_eq!(lines[9], "1... e5");
        assert_eq!(lines[10], "White to move");
        assert_eq!(lines[11], "{ symmetrical }");
    }
}
