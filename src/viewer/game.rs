use shakmaty::san::SanPlus;

use super::comments::{extract_comments, mainline_sans};
use super::error::ViewerError;
use super::filter::{parse_mainline, split_pgn, strip_comments};
use super::headers::{HeaderSet, extract_headers};
use super::navigator::Navigator;
use super::render::{Frame, move_list_rows, position_fen};
use super::types::{CommentMap, Ply, move_prefix};

/// One loaded game: headers, mainline, comments and the navigation cursor,
/// all derived from the same source text.
#[derive(Debug, Clone)]
pub struct Game {
    headers: HeaderSet,
    comments: CommentMap,
    outcome: Option<String>,
    navigator: Navigator,
}

impl Game {
    /// Parses `pgn` in full before anything is returned, so a failure never
    /// leaves a half-built game behind.
    pub fn load(pgn: &str) -> Result<Self, ViewerError> {
        let headers = extract_headers(pgn);
        let mainline = parse_mainline(&strip_comments(pgn))?;

        let movetext = split_pgn(pgn).movetext;
        check_alignment(&movetext, &mainline.plies)?;

        let ply_count = mainline.plies.len();
        let mut comments = extract_comments(&movetext);
        comments.retain(|ply, _| *ply < ply_count);

        Ok(Self {
            headers,
            comments,
            outcome: mainline.outcome,
            navigator: Navigator::new(mainline.plies),
        })
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    pub fn comments(&self) -> &CommentMap {
        &self.comments
    }

    pub fn comment_at(&self, ply: usize) -> Option<&str> {
        self.comments.get(&ply).map(String::as_str)
    }

    /// Termination marker from the movetext, else the `Result` tag.
    pub fn result(&self) -> Option<&str> {
        self.outcome
            .as_deref()
            .or_else(|| self.headers.get("Result"))
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut Navigator {
        &mut self.navigator
    }

    pub fn move_list(&self) -> Vec<String> {
        move_list_rows(self.navigator.plies())
    }

    pub fn frame(&self) -> Frame {
        let nav = &self.navigator;
        Frame {
            fen: position_fen(nav.position()),
            status: nav.status(),
            controls: nav.controls(),
            ply: nav.cursor(),
            san: nav.current_ply().map(|p| p.san.to_string()),
            comment: nav
                .cursor()
                .and_then(|i| self.comment_at(i))
                .map(str::to_string),
        }
    }
}

/// Every mainline token must be the SAN of the ply at the same index.
/// Anything the parser skipped would shift comments onto the wrong plies.
fn check_alignment(movetext: &str, plies: &[Ply]) -> Result<(), ViewerError> {
    let sans = mainline_sans(movetext);

    for (index, token) in sans.iter().enumerate() {
        let matches = match (token.parse::<SanPlus>(), plies.get(index)) {
            (Ok(parsed), Some(ply)) => parsed.san == ply.san.san,
            _ => false,
        };
        if !matches {
            return Err(ViewerError::MalformedPgn(format!(
                "unexpected token '{}' at move {}",
                token,
                move_prefix(index)
            )));
        }
    }

    if sans.len() != plies.len() {
        return Err(ViewerError::MalformedPgn(format!(
            "parsed {} moves from {} move tokens",
            plies.len(),
            sans.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANNOTATED: &str = r#"[Event "Casual Game"]
[White "Anderssen"]
[Black "Kieseritzky"]
[Result "1-0"]

1. e4 {King's pawn} e5 {Symmetrical} 2. f4 {The King's Gambit}
exf4 (2... Bc5 {declined}) 3. Bc4 $1 Qh4+ {forcing} 1-0"#;

    #[test]
    fn test_load_annotated_game() {
        let game = Game::load(ANNOTATED).unwrap();

        assert_eq!(game.headers().get("White"), Some("Anderssen"));
        assert_eq!(game.navigator().len(), 6);
        assert_eq!(game.result(), Some("1-0"));
        assert_eq!(game.comment_at(0), Some("King's pawn"));
        assert_eq!(game.comment_at(1), Some("Symmetrical"));
        assert_eq!(game.comment_at(2), Some("The King's Gambit"));
        assert_eq!(game.comment_at(3), None);
        assert_eq!(game.comment_at(5), Some("forcing"));
        assert_eq!(
            game.move_list(),
            vec!["1. e4 e5", "2. f4 exf4", "3. Bc4 Qh4+"]
        );
    }

    #[test]
    fn test_frame_tracks_cursor_and_comment() {
        let mut game = Game::load(ANNOTATED).unwrap();

        let frame = game.frame();
        assert_eq!(frame.ply, None);
        assert_eq!(frame.comment, None);
        assert!(!frame.controls.prev);

        game.navigator_mut().go_to(Some(2)).unwrap();
        let frame = game.frame();
        assert_eq!(frame.ply, Some(2));
        assert_eq!(frame.san.as_deref(), Some("f4"));
        assert_eq!(frame.comment.as_deref(), Some("The King's Gambit"));

        game.navigator_mut().step_forward();
        assert_eq!(game.frame().comment, None);
    }

    #[test]
    fn test_comments_beyond_last_ply_are_dropped() {
        let game = Game::load("1. e4 e5 2. Nf3 {real} 40. {phantom}").unwrap_or_else(|e| {
            panic!("load failed: {e}");
        });
        assert_eq!(game.comments().len(), 1);
        assert_eq!(game.comment_at(2), Some("real"));
    }

    #[test]
    fn test_load_rejects_illegal_game() {
        assert!(matches!(
            Game::load("[Event \"x\"]\n\n1. e4 e5 2. Bb6"),
            Err(ViewerError::MalformedPgn(_))
        ));
    }

    fn malformed_message(pgn: &str) -> String {
        match Game::load(pgn) {
            Err(ViewerError::MalformedPgn(msg)) => msg,
            other => panic!("expected MalformedPgn, got {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_unparsed_word_in_movetext() {
        let msg = malformed_message("1. e4 {c1} hello e5 {c2} 2. Nf3 {c3}");
        assert!(msg.contains("'hello'"), "{msg}");
    }

    #[test]
    fn test_load_rejects_bare_piece_letter() {
        let msg = malformed_message("1. e4 e5 2. Nf3 N {nov} Nc6 {c}");
        assert!(msg.contains("'N'"), "{msg}");
    }

    #[test]
    fn test_en_passant_annotation_keeps_comments_aligned() {
        let game =
            Game::load("1. e4 Nf6 2. e5 d5 3. exd6 e.p. {ep} exd6 {recapture} 4. Nf3 {dev}")
                .unwrap();
        assert_eq!(game.navigator().len(), 7);
        assert_eq!(game.comment_at(4), Some("ep"));
        assert_eq!(game.comment_at(5), Some("recapture"));
        assert_eq!(game.comment_at(6), Some("dev"));
    }

    #[test]
    fn test_huge_move_number_loads_without_comment() {
        let game = Game::load(&format!("{}. e4 {{c}} e5", usize::MAX)).unwrap();
        assert_eq!(game.navigator().len(), 2);
        assert!(game.comments().is_empty());
    }

    #[test]
    fn test_semicolon_comment_does_not_truncate_game() {
        let game = Game::load("1. e4 ; rest of line\ne5 {c} 2. Nf3").unwrap();
        assert_eq!(game.navigator().len(), 3);
        assert_eq!(game.comment_at(1), Some("c"));
    }

    #[test]
    fn test_result_falls_back_to_header() {
        let game = Game::load("[Result \"0-1\"]\n\n1. f3 e5 2. g4 Qh4#").unwrap();
        assert_eq!(game.result(), Some("0-1"));
        assert_eq!(game.navigator().len(), 4);
    }
}
