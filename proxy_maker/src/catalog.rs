//! Selectable options and default choice for one card's printings
//!
//! Everything here except [`load`] is a pure function of the printing list.
//! Lookups return positions into the [`PrintingSet`] so callers can tell
//! whether a different printing became current.

use std::sync::Arc;

use crate::error::CatalogError;
use crate::printing::CardPrinting;
use crate::source::CardSource;

/// Language tried when the requested one is not printed
pub const FALLBACK_LANGUAGE: &str = "en";

/// Every printing of one identity, in source order. Never empty.
#[derive(Debug, Clone)]
pub struct PrintingSet {
    identity: String,
    printings: Vec<Arc<CardPrinting>>,
}

impl PrintingSet {
    /// Returns `None` for an empty list
    pub fn new(identity: impl Into<String>, printings: Vec<CardPrinting>) -> Option<Self> {
        if printings.is_empty() {
            return None;
        }
        Some(Self {
            identity: identity.into(),
            printings: printings.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn len(&self) -> usize {
        self.printings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.printings.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<CardPrinting>> {
        self.printings.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<CardPrinting>> {
        self.printings.iter()
    }

    fn position(&self, pred: impl Fn(&CardPrinting) -> bool) -> Option<usize> {
        self.printings.iter().position(|p| pred(p.as_ref()))
    }
}

/// Fetch all printings of `identity` from the card source.
///
/// Records that cannot be read are skipped; a result with no readable record
/// is `NotFound`. No retry.
pub async fn load<S: CardSource + ?Sized>(
    source: &S,
    identity: &str,
) -> Result<PrintingSet, CatalogError> {
    let records = source
        .fetch_printings(identity)
        .await
        .map_err(|e| CatalogError::from_source(identity, e))?;

    let total = records.len();
    let printings: Vec<CardPrinting> = records
        .into_iter()
        .filter_map(|record| match CardPrinting::from_record(record, identity) {
            Ok(printing) => Some(printing),
            Err(e) => {
                log::warn!("Skipping printing of {}: {}", identity, e);
                None
            }
        })
        .collect();

    log::debug!(
        "Loaded {} of {} printings for {}",
        printings.len(),
        total,
        identity
    );

    PrintingSet::new(identity, printings).ok_or_else(|| CatalogError::NotFound(identity.to_string()))
}

/// Distinct set names in first-seen order
pub fn available_sets(printings: &PrintingSet) -> Vec<&str> {
    dedupe(printings.iter().map(|p| p.set_name.as_str()))
}

/// Distinct languages printed in `set`, first-seen order. Unknown set gives an empty list.
pub fn available_languages<'a>(printings: &'a PrintingSet, set: &str) -> Vec<&'a str> {
    dedupe(
        printings
            .iter()
            .filter(|p| p.set_name == set)
            .map(|p| p.language.as_str()),
    )
}

/// Default printing: preferred language, else English, else the first printing
pub fn pick_default_printing(printings: &PrintingSet, preferred_language: &str) -> usize {
    printings
        .position(|p| p.language == preferred_language)
        .or_else(|| printings.position(|p| p.language == FALLBACK_LANGUAGE))
        .unwrap_or(0)
}

/// Printing for (set, language): exact match, else English in that set, else
/// the first printing of that set. A set with no printing at all falls back
/// to the first printing of the list.
pub fn resolve_printing(printings: &PrintingSet, set: &str, language: &str) -> usize {
    printings
        .position(|p| p.set_name == set && p.language == language)
        .or_else(|| printings.position(|p| p.set_name == set && p.language == FALLBACK_LANGUAGE))
        .or_else(|| printings.position(|p| p.set_name == set))
        .unwrap_or(0)
}

/// Language to keep when switching to a set that may not print the current one
pub fn language_for_set<'a>(printings: &'a PrintingSet, set: &str, current: &'a str) -> Option<&'a str> {
    let languages = available_languages(printings, set);
    if languages.contains(&current) {
        Some(current)
    } else if languages.contains(&FALLBACK_LANGUAGE) {
        Some(FALLBACK_LANGUAGE)
    } else {
        languages.first().copied()
    }
}

fn dedupe<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
