// ── Batch rule codec ──
//
// Turns one line of batch input into a canonical `{local_port, remote}`
// pair. Two grammars are accepted and tried in a fixed order; the first
// one that matches wins.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;
use crate::model::Rule;

/// Which grammar recognized a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// `localPort, remoteHost, remotePort`
    Csv,
    /// `localPort:remote` with `remote` taken verbatim.
    LegacyColon,
}

/// A successfully parsed batch line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub syntax: Syntax,
    pub local_port: String,
    pub remote_address: String,
}

impl ParsedLine {
    /// The rule to submit: listen on `0.0.0.0:{local_port}`.
    pub fn to_rule(&self) -> Rule {
        Rule::forward(&self.local_port, self.remote_address.clone())
    }
}

type Strategy = fn(&str) -> Option<ParsedLine>;

/// Parser strategies in priority order.
const STRATEGIES: [Strategy; 2] = [parse_csv, parse_legacy_colon];

static LEGACY_COLON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+):(\[.*?\]:[0-9]+|\S+)$").expect("legacy rule pattern is valid")
});

fn parse_csv(line: &str) -> Option<ParsedLine> {
    let parts: Vec<&str> = line
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    let [port, host, remote_port] = parts.as_slice() else {
        return None;
    };
    Some(ParsedLine {
        syntax: Syntax::Csv,
        local_port: (*port).to_owned(),
        remote_address: format!("{host}:{remote_port}"),
    })
}

fn parse_legacy_colon(line: &str) -> Option<ParsedLine> {
    let caps = LEGACY_COLON.captures(line)?;
    Some(ParsedLine {
        syntax: Syntax::LegacyColon,
        local_port: caps.get(1)?.as_str().to_owned(),
        remote_address: caps.get(2)?.as_str().to_owned(),
    })
}

/// Parse one line. The line is matched as given; callers trim.
pub fn parse_line(line: &str) -> Result<ParsedLine, CoreError> {
    STRATEGIES
        .iter()
        .find_map(|strategy| strategy(line))
        .ok_or_else(|| CoreError::MalformedRuleLine {
            line: line.to_owned(),
        })
}

/// Non-blank, trimmed lines of a batch submission, each with its 1-based
/// line number in `text`. Blank lines are skipped but still counted.
pub fn batch_lines(text: &str) -> Vec<(usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(idx, l)| (idx + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty())
        .collect()
}
