//! Recovers which ply each `{...}` comment belongs to without replaying the
//! game. Move-number markers resynchronize the ply counter, so movetext that
//! starts mid-game (`12... Nf6`) still lands on the right indices.

use std::sync::LazyLock;

use super::filter::is_result_marker;
use super::types::CommentMap;

static TOKEN_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"(?P<ep>e\.p\.)|(?P<num>\d+)\.{1,3}|(?P<nag>\$\d+)|(?P<open>\()|(?P<close>\))|(?P<star>\*)|(?P<san>[A-Za-z0-9][A-Za-z0-9+#=/\-]*)",
    )
    .expect("valid movetext token regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Brace comment body, braces removed and trimmed.
    Comment(&'a str),
    /// `12.` or `12...`
    MoveNumber(usize),
    San(&'a str),
    /// `$n`, or the `e.p.` annotation some books print after a capture.
    Nag,
    Result(&'a str),
    VariationStart,
    VariationEnd,
}

/// Splits movetext into brace comments and the tokens between them.
/// Comments do not nest; an unterminated comment runs to the end of input.
pub fn lex_movetext(movetext: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = movetext;

    while !rest.is_empty() {
        let Some(open) = rest.find('{') else {
            lex_segment(rest, &mut tokens);
            break;
        };

        lex_segment(&rest[..open], &mut tokens);
        let body = &rest[open + 1..];
        match body.find('}') {
            Some(close) => {
                tokens.push(Token::Comment(body[..close].trim()));
                rest = &body[close + 1..];
            }
            None => {
                tokens.push(Token::Comment(body.trim()));
                break;
            }
        }
    }

    tokens
}

fn lex_segment<'a>(segment: &'a str, tokens: &mut Vec<Token<'a>>) {
    for caps in TOKEN_RE.captures_iter(segment) {
        let token = if caps.name("ep").is_some() {
            Token::Nag
        } else if let Some(num) = caps.name("num") {
            match num.as_str().parse() {
                Ok(n) => Token::MoveNumber(n),
                Err(_) => continue,
            }
        } else if caps.name("nag").is_some() {
            Token::Nag
        } else if caps.name("open").is_some() {
            Token::VariationStart
        } else if caps.name("close").is_some() {
            Token::VariationEnd
        } else if let Some(star) = caps.name("star") {
            Token::Result(star.as_str())
        } else if let Some(san) = caps.name("san") {
            if is_result_marker(san.as_str()) {
                Token::Result(san.as_str())
            } else {
                Token::San(san.as_str())
            }
        } else {
            continue;
        };
        tokens.push(token);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// No ply has been assigned yet; comments here are dropped.
    AwaitingMove,
    /// A move number was read; `ply` is the index the next SAN will take.
    InMoveNumber { ply: usize },
    AfterMove { ply: usize },
}

#[derive(Debug)]
struct CommentScanner {
    state: ScanState,
    next_ply: usize,
    variation_depth: usize,
    comments: CommentMap,
}

impl CommentScanner {
    fn new() -> Self {
        Self {
            state: ScanState::AwaitingMove,
            next_ply: 0,
            variation_depth: 0,
            comments: CommentMap::new(),
        }
    }

    fn feed(&mut self, token: Token<'_>) {
        match token {
            Token::VariationStart => {
                self.variation_depth += 1;
                return;
            }
            Token::VariationEnd => {
                self.variation_depth = self.variation_depth.saturating_sub(1);
                return;
            }
            _ if self.variation_depth > 0 => return,
            _ => {}
        }

        match token {
            Token::MoveNumber(n) => {
                self.next_ply = n.saturating_sub(1).saturating_mul(2);
                self.state = ScanState::InMoveNumber {
                    ply: self.next_ply,
                };
            }
            Token::San(_) => {
                self.state = ScanState::AfterMove {
                    ply: self.next_ply,
                };
                self.next_ply = self.next_ply.saturating_add(1);
            }
            Token::Comment(text) => match self.state {
                ScanState::AwaitingMove => {}
                ScanState::InMoveNumber { ply } | ScanState::AfterMove { ply } => {
                    if !text.is_empty() {
                        self.comments.insert(ply, text.to_string());
                    }
                }
            },
            Token::Nag | Token::Result(_) | Token::VariationStart | Token::VariationEnd => {}
        }
    }
}

/// SAN tokens of the mainline in order; variations and result markers are
/// left out.
pub fn mainline_sans(movetext: &str) -> Vec<&str> {
    let mut depth = 0usize;
    let mut sans = Vec::new();
    for token in lex_movetext(movetext) {
        match token {
            Token::VariationStart => depth += 1,
            Token::VariationEnd => depth = depth.saturating_sub(1),
            Token::San(san) if depth == 0 => sans.push(san),
            _ => {}
        }
    }
    sans
}

/// Maps ply index -> the comment following that ply. A later comment for the
/// same ply replaces the earlier one. Comments inside variations are ignored.
pub fn extract_comments(movetext: &str) -> CommentMap {
    let mut scanner = CommentScanner::new();
    for token in lex_movetext(movetext) {
        scanner.feed(token);
    }
    scanner.comments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(usize, &str)]) -> CommentMap {
        entries
            .iter()
            .map(|(ply, text)| (*ply, text.to_string()))
            .collect()
    }

    #[test]
    fn test_lex_movetext_tokens() {
        let tokens = lex_movetext("12... Nf6 {good} $1 13.O-O (13. h3) 1/2-1/2");
        assert_eq!(
            tokens,
            vec![
                Token::MoveNumber(12),
                Token::San("Nf6"),
                Token::Comment("good"),
                Token::Nag,
                Token::MoveNumber(13),
                Token::San("O-O"),
                Token::VariationStart,
                Token::MoveNumber(13),
                Token::San("h3"),
                Token::VariationEnd,
                Token::Result("1/2-1/2"),
            ]
        );
    }

    #[test]
    fn test_comment_after_every_ply() {
        assert_eq!(
            extract_comments("1. e4 {c1} e5 {c2} 2. Nf3 {c3}"),
            map(&[(0, "c1"), (1, "c2"), (2, "c3")])
        );
    }

    #[test]
    fn test_black_continuation_resynchronizes_to_ply_22() {
        assert_eq!(extract_comments("12... Nf6 {c}"), map(&[(22, "c")]));
    }

    #[test]
    fn test_repeated_move_number_resets_counter() {
        // `12...` resets to (12 - 1) * 2 just like `12.` does.
        let comments = extract_comments("12. Nd5 {white} 12... Nf6 {black} 13. c3 {next}");
        assert_eq!(comments, map(&[(22, "black"), (24, "next")]));
    }

    #[test]
    fn test_move_number_alone_offsets_following_move() {
        assert_eq!(extract_comments("30. {to play} Rd1"), map(&[(58, "to play")]));
        assert_eq!(extract_comments("30. Rd1 Kf8 {x}"), map(&[(59, "x")]));
    }

    #[test]
    fn test_comment_before_first_move_is_dropped() {
        assert_eq!(
            extract_comments("{Opening notes} e4 {c1}"),
            map(&[(0, "c1")])
        );
    }

    #[test]
    fn test_last_comment_for_a_ply_wins() {
        assert_eq!(
            extract_comments("1. e4 {first} {second} e5"),
            map(&[(0, "second")])
        );
    }

    #[test]
    fn test_result_markers_do_not_consume_plies() {
        let comments = extract_comments("1. e4 e5 {c} 1-0 {after result}");
        assert_eq!(comments, map(&[(1, "after result")]));

        let comments = extract_comments("1. e4 e5 * {trailing}");
        assert_eq!(comments, map(&[(1, "trailing")]));
    }

    #[test]
    fn test_variation_comments_are_ignored() {
        let comments = extract_comments(
            "18. Nd5 {main} (18. Nxe7+ {side line} Rxe7 19. Nh4) Qd7 {reply}",
        );
        assert_eq!(comments, map(&[(34, "main"), (35, "reply")]));
    }

    #[test]
    fn test_counter_continues_after_variation_without_move_number() {
        let comments = extract_comments("1. e4 (1. d4 d5) e5 {black}");
        assert_eq!(comments, map(&[(1, "black")]));
    }

    #[test]
    fn test_nags_and_annotation_glyphs_are_skipped() {
        let comments = extract_comments("1. e4!? $1 {bold} e5?! {dubious}");
        assert_eq!(comments, map(&[(0, "bold"), (1, "dubious")]));
    }

    #[test]
    fn test_empty_and_unterminated_comments() {
        let comments = extract_comments("1. e4 {} e5 {cut off");
        assert_eq!(comments, map(&[(1, "cut off")]));
    }

    #[test]
    fn test_en_passant_annotation_is_not_a_move() {
        let movetext = "3. exd6 e.p. {ep} exd6 {recapture}";
        assert_eq!(mainline_sans(movetext), vec!["exd6", "exd6"]);
        assert_eq!(
            extract_comments(movetext),
            map(&[(4, "ep"), (5, "recapture")])
        );
    }

    #[test]
    fn test_mainline_sans_skip_variations_and_results() {
        assert_eq!(
            mainline_sans("1. e4 (1. d4 {x} d5) e5 2. Nf3 hello 1-0"),
            vec!["e4", "e5", "Nf3", "hello"]
        );
    }

    #[test]
    fn test_huge_move_number_saturates() {
        let movetext = format!("{}. e4 {{c}} e5 {{d}}", usize::MAX);
        assert_eq!(
            extract_comments(&movetext),
            map(&[(usize::MAX, "d")])
        );
    }

    #[test]
    fn test_multiline_comment_is_trimmed() {
        let comments = extract_comments("1. d4 {  [%eval 0.25]\n  strong center  } Nf6");
        assert_eq!(comments, map(&[(0, "[%eval 0.25]\n  strong center")]));
    }
}
