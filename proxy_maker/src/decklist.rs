//! Decklist text parsing
//!
//! Accepts the usual export formats: `4 Shock`, `3 x Dovin's Veto`,
//! `1x Fire // Ice` or a bare card name. Anything else (blank lines, section
//! headers, comments, names with unsupported characters) is skipped.

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LINE_RE: Regex =
        Regex::new(r"^\s*(?:(\d+)\s*(?:[xX]\s+)?)?([a-zA-Z0-9][a-zA-Z0-9\s.,'\-/]*?)\s*$")
            .expect("decklist pattern is valid");
}

/// Section headers written by deck builders, not card names
const SECTION_HEADERS: [&str; 6] = [
    "deck",
    "sideboard",
    "commander",
    "companion",
    "maybeboard",
    "mainboard",
];

/// Largest quantity accepted on one line
pub const MAX_QUANTITY: u32 = 9999;

/// One accepted decklist line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecklistEntry {
    /// 1-based line number in the input
    pub line: usize,
    pub quantity: u32,
    pub name: String,
}

/// Parse a single line. Missing quantity means one copy; zero or more than
/// [`MAX_QUANTITY`] copies skips the line.
pub fn parse_line(line: &str) -> Option<(u32, String)> {
    let captures = LINE_RE.captures(line)?;
    let name = captures.get(2)?.as_str().trim();
    if SECTION_HEADERS.contains(&name.to_lowercase().as_str()) {
        return None;
    }

    let quantity = match captures.get(1) {
        Some(digits) => digits.as_str().parse::<u32>().ok()?,
        None => 1,
    };
    if quantity == 0 {
        return None;
    }
    if quantity > MAX_QUANTITY {
        log::warn!("Skipping {:?}: more than {} copies", name, MAX_QUANTITY);
        return None;
    }

    Some((quantity, name.to_string()))
}

/// Parse decklist text, one card per line (LF or CRLF)
pub fn parse_decklist(text: &str) -> Vec<DecklistEntry> {
    text.lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let (quantity, name) = parse_line(line)?;
            Some(DecklistEntry {
                line: index + 1,
                quantity,
                name,
            })
        })
        .collect()
}

/// Read and parse a decklist file
pub fn read_decklist(path: impl AsRef<Path>) -> std::io::Result<Vec<DecklistEntry>> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_decklist(&text))
}
