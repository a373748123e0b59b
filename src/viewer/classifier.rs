use std::sync::LazyLock;

/// Standard PGN opens with an `[Event` tag or at least two adjacent tags.
static PGN_PREAMBLE_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^\s*(?:\[Event\b|\[[^\]\n]*\]\s*\[)").expect("valid pgn preamble regex")
});

/// Game citation: `(1) Smith–Jones London, 1851`.
static CITATION_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"\(\d+\)\s*\p{Lu}[\p{L}'.]*\s*[–—-]\s*\p{Lu}[\p{L}'.]*[^\n]{0,80}?\b(?:1[5-9]|20)\d{2}\b")
        .expect("valid game citation regex")
});

/// A move followed by a run of plain lowercase words outside any comment.
static PROSE_AFTER_MOVE_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"\b\d+\.{1,3}\s*[^\s{}()]+(?:\s+[^\s{}()\d][^\s{}()]*)?\s+\p{Lu}?\p{Ll}{2,}(?:\s+\p{Ll}+){3,}",
    )
    .expect("valid prose after move regex")
});

/// ECO code in brackets outside of a tag pair: `[D06]`.
static BARE_ECO_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"\[[A-E]\d{2}\]").expect("valid bare eco regex"));

static COMMENTARY_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"(?i)\b(?:this move|the idea|with the idea|threatening|better was|stakes a claim|is considered|was considered|white should|black should|the point is|intending)\b",
    )
    .expect("valid commentary keyword regex")
});

/// Opening names as written in book headings.
static OPENING_NAME_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"\b(?:Gambit|Defen[cs]e|Opening|Attack|Variation|Counter-Gambit)\b")
        .expect("valid opening name regex")
});

const PROSE_THRESHOLD: usize = 2;

/// Heuristic gate: does the text read like chess book prose rather than PGN?
///
/// Needs at least two independent signals so that well-commented PGN without
/// tags is still treated as PGN. No accuracy guarantee either way.
pub fn looks_like_prose(text: &str) -> bool {
    if PGN_PREAMBLE_RE.is_match(text) {
        return false;
    }

    prose_signal_count(text) >= PROSE_THRESHOLD
}

pub fn prose_signal_count(text: &str) -> usize {
    [
        &*CITATION_RE,
        &*PROSE_AFTER_MOVE_RE,
        &*BARE_ECO_RE,
        &*COMMENTARY_RE,
        &*OPENING_NAME_RE,
    ]
    .iter()
    .filter(|re| re.is_match(text))
    .count()
}
