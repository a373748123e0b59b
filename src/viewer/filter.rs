use pgn_reader::{Outcome, Reader, SanPlus, Skip, Visitor};
use shakmaty::san::Suffix;
use shakmaty::{Chess, Position};
use std::io;
use std::ops::ControlFlow;
use std::sync::LazyLock;

use super::error::{ErrorAccumulator, ViewerError};
use super::types::{Ply, PlyList, move_prefix};

/// `$n` NAGs and the `e.p.` annotation.
static ANNOTATION_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"\$\d+|\be\.p\.").expect("valid annotation regex")
});

const RESULT_MARKERS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

pub(crate) fn is_result_marker(token: &str) -> bool {
    RESULT_MARKERS.contains(&token)
}

/// PGN text split into its header lines and its movetext.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PgnParts<'a> {
    pub header_lines: Vec<&'a str>,
    /// Movetext lines joined by single spaces, comments still in place.
    pub movetext: String,
}

/// Separates bracketed header lines from movetext.
///
/// A line opens the movetext when it starts with a move number (`12.`) or is
/// any other non-blank, non-header line. From then on every line is movetext,
/// even if it looks like a tag (comments may quote bracketed text).
/// `;` rest-of-line comments are dropped before lines are joined.
pub fn split_pgn(text: &str) -> PgnParts<'_> {
    let mut parts = PgnParts::default();
    let mut in_movetext = false;
    let mut in_brace = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if !in_movetext && line.starts_with('[') {
            parts.header_lines.push(line);
            continue;
        }

        in_movetext = true;
        let line = cut_line_comment(line, &mut in_brace).trim_end();
        if line.is_empty() {
            continue;
        }
        if !parts.movetext.is_empty() {
            parts.movetext.push(' ');
        }
        parts.movetext.push_str(line);
    }

    parts
}

/// Truncates `line` at a `;` that is not inside a brace comment. `in_brace`
/// carries an open `{` over to the next line.
fn cut_line_comment<'a>(line: &'a str, in_brace: &mut bool) -> &'a str {
    for (i, c) in line.char_indices() {
        match c {
            '{' if !*in_brace => *in_brace = true,
            '}' if *in_brace => *in_brace = false,
            ';' if !*in_brace => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Removes `{...}` comments, `(...)` variations (nested), `$n` NAGs and
/// `e.p.` from movetext and collapses whitespace. An unterminated comment
/// swallows the rest of the text; a stray `)` is dropped.
pub fn strip_movetext(movetext: &str) -> String {
    let mut out = String::with_capacity(movetext.len());
    let mut in_comment = false;
    let mut depth = 0usize;

    for c in movetext.chars() {
        if in_comment {
            if c == '}' {
                in_comment = false;
                out.push(' ');
            }
            continue;
        }

        match c {
            '{' => in_comment = true,
            '(' => depth += 1,
            ')' => {
                if depth > 0 {
                    depth -= 1;
                    out.push(' ');
                }
            }
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }

    let without_annotations = ANNOTATION_RE.replace_all(&out, " ");
    without_annotations
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rebuilds a PGN the strict parser accepts: the original header lines, a
/// blank line, then the stripped movetext on a single line.
pub fn strip_comments(pgn: &str) -> String {
    let parts = split_pgn(pgn);
    let movetext = strip_movetext(&parts.movetext);

    if parts.header_lines.is_empty() {
        movetext
    } else {
        format!("{}\n\n{}", parts.header_lines.join("\n"), movetext)
    }
}

/// Mainline of a strictly parsed game.
#[derive(Debug, Clone, Default)]
pub struct Mainline {
    pub plies: PlyList,
    pub outcome: Option<String>,
}

/// Parses cleaned PGN and replays every mainline SAN against the standard
/// starting position. The first illegal or ambiguous move rejects the game.
pub fn parse_mainline(pgn: &str) -> Result<Mainline, ViewerError> {
    let mut reader = Reader::new(io::Cursor::new(pgn.as_bytes()));
    let mut visitor = MainlineVisitor::default();

    match reader.read_game(&mut visitor) {
        Ok(Some(())) => {}
        Ok(None) => visitor.errors.push("no game found"),
        Err(e) => visitor.errors.push(&format!("read error: {e}")),
    }

    if visitor.plies.is_empty() && visitor.errors.is_empty() && has_unparsed_movetext(pgn) {
        visitor.errors.push("no moves found");
    }

    match visitor.errors.take() {
        Some(msg) => Err(ViewerError::MalformedPgn(msg)),
        None => Ok(Mainline {
            plies: visitor.plies,
            outcome: visitor.outcome,
        }),
    }
}

fn has_unparsed_movetext(pgn: &str) -> bool {
    split_pgn(pgn)
        .movetext
        .split_whitespace()
        .any(|token| !is_result_marker(token))
}

#[derive(Default)]
struct MainlineVisitor {
    position: Chess,
    plies: PlyList,
    outcome: Option<String>,
    errors: ErrorAccumulator,
}

impl Visitor for MainlineVisitor {
    type Tags = ();
    type Movetext = ();
    type Output = ();

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        self.position = Chess::default();
        self.plies.clear();
        self.outcome = None;
        self.errors = ErrorAccumulator::default();
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, _tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(())
    }

    fn san(
        &mut self,
        _movetext: &mut Self::Movetext,
        san_plus: SanPlus,
    ) -> ControlFlow<Self::Output> {
        let index = self.plies.len();
        let mv = match san_plus.san.to_move(&self.position) {
            Ok(mv) => mv,
            Err(e) => {
                self.errors
                    .push(&format!("move {} {}: {}", move_prefix(index), san_plus, e));
                return ControlFlow::Break(());
            }
        };

        self.position.play_unchecked(mv.clone());

        let suffix = if self.position.is_checkmate() {
            Some(Suffix::Checkmate)
        } else if self.position.is_check() {
            Some(Suffix::Check)
        } else {
            None
        };

        self.plies.push(Ply {
            index,
            san: SanPlus {
                san: san_plus.san,
                suffix,
            },
            mv,
        });
        ControlFlow::Continue(())
    }

    fn begin_variation(&mut self, _: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn outcome(
        &mut self,
        _movetext: &mut Self::Movetext,
        outcome: Outcome,
    ) -> ControlFlow<Self::Output> {
        self.outcome = Some(outcome.to_string());
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, _movetext: Self::Movetext) -> Self::Output {}
}
