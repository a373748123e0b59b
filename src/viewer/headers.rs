use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::LazyLock;

static TAG_PAIR_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r#"\[(\w+)\s+"([^"]+)"\]"#).expect("valid tag pair regex")
});

/// Tag name -> tag value, built once per load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    tags: HashMap<String, String>,
}

impl HeaderSet {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn info(&self) -> GameInfo<'_> {
        GameInfo { headers: self }
    }
}

/// Scans the whole text for `[Name "Value"]` pairs, not only a leading header
/// block. Tag names are case-sensitive and a repeated tag keeps its last value.
pub fn extract_headers(text: &str) -> HeaderSet {
    let mut tags = HashMap::new();
    for caps in TAG_PAIR_RE.captures_iter(text) {
        tags.insert(caps[1].to_string(), caps[2].to_string());
    }
    HeaderSet { tags }
}

/// The subset of tags shown in the game information panel.
#[derive(Debug, Clone, Copy)]
pub struct GameInfo<'a> {
    headers: &'a HeaderSet,
}

impl<'a> GameInfo<'a> {
    pub fn white(&self) -> Option<&'a str> {
        self.headers.get("White")
    }

    pub fn black(&self) -> Option<&'a str> {
        self.headers.get("Black")
    }

    pub fn event(&self) -> Option<&'a str> {
        self.headers.get("Event")
    }

    pub fn result(&self) -> Option<&'a str> {
        self.headers.get("Result")
    }

    pub fn raw_date(&self) -> Option<&'a str> {
        self.headers.get("Date")
    }

    /// `Date` as a calendar date. Unknown month or day (`??`) default to 01,
    /// an unknown year yields `None`.
    pub fn date(&self) -> Option<NaiveDate> {
        parse_pgn_date(self.raw_date()?)
    }

    /// Label/value rows in display order. Players are only listed as a pair.
    pub fn lines(&self) -> Vec<(&'static str, String)> {
        let mut lines = Vec::new();

        if let (Some(white), Some(black)) = (self.white(), self.black()) {
            lines.push(("White", white.to_string()));
            lines.push(("Black", black.to_string()));
        }
        if let Some(event) = self.event() {
            lines.push(("Event", event.to_string()));
        }
        if let Some(raw) = self.raw_date() {
            let shown = match self.date() {
                Some(date) => date.format("%Y-%m-%d").to_string(),
                None => raw.to_string(),
            };
            lines.push(("Date", shown));
        }
        if let Some(result) = self.result() {
            lines.push(("Result", result.to_string()));
        }

        lines
    }
}

fn parse_pgn_date(raw: &str) -> Option<NaiveDate> {
    let norm = raw.trim().replace('.', "-");
    let parts: Vec<&str> = norm.split('-').collect();
    if parts.len() != 3 || parts[0].contains('?') {
        return None;
    }

    let field = |s: &str| -> Option<u32> {
        if s.contains('?') {
            Some(1)
        } else {
            s.parse().ok()
        }
    };

    let year = parts[0].parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, field(parts[1])?, field(parts[2])?)
}
