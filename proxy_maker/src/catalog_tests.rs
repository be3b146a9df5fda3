//! Tests for printing catalog derivations and fallback chains

use super::*;
use crate::error::SourceError;
use crate::source::CardSource;
use crate::test_support::{printing, printing_set, record, IDENTITY};

fn set_and_lang(printings: &PrintingSet, index: usize) -> (&str, &str) {
    let p = printings.get(index).unwrap();
    (p.set_name.as_str(), p.language.as_str())
}

/// Card source answering every identity with a fixed result
struct FixedSource(std::result::Result<Vec<serde_json::Value>, fn() -> SourceError>);

impl CardSource for FixedSource {
    async fn resolve_name(&self, name: &str) -> std::result::Result<String, SourceError> {
        Err(SourceError::NotFound(name.to_string()))
    }

    async fn fetch_printings(
        &self,
        _identity: &str,
    ) -> std::result::Result<Vec<serde_json::Value>, SourceError> {
        match &self.0 {
            Ok(records) => Ok(records.clone()),
            Err(make) => Err(make()),
        }
    }
}

// ── PrintingSet ──────────────────────────────────────────────────────

#[test]
fn printing_set_rejects_empty_list() {
    assert!(PrintingSet::new(IDENTITY, Vec::new()).is_none());

    let set = PrintingSet::new(IDENTITY, vec![printing("Alpha", "en")]).unwrap();
    assert_eq!(set.len(), 1);
    assert!(!set.is_empty());
    assert_eq!(set.identity(), IDENTITY);
}

// ── available_sets / available_languages ─────────────────────────────

#[test]
fn available_sets_dedupes_in_first_seen_order() {
    let printings = printing_set(&[
        ("Beta", "en"),
        ("Alpha", "en"),
        ("Beta", "ja"),
        ("Gamma", "fr"),
        ("Alpha", "de"),
    ]);
    assert_eq!(available_sets(&printings), vec!["Beta", "Alpha", "Gamma"]);
}

#[test]
fn available_languages_filters_by_set() {
    let printings = printing_set(&[
        ("Alpha", "ja"),
        ("Beta", "fr"),
        ("Alpha", "en"),
        ("Alpha", "ja"),
        ("Alpha", "de"),
    ]);
    assert_eq!(available_languages(&printings, "Alpha"), vec!["ja", "en", "de"]);
    assert_eq!(available_languages(&printings, "Beta"), vec!["fr"]);
}

#[test]
fn available_languages_unknown_set_is_empty() {
    let printings = printing_set(&[("Alpha", "en")]);
    assert!(available_languages(&printings, "Omega").is_empty());
}

#[test]
fn available_languages_order_follows_permutation() {
    let forward = printing_set(&[("Alpha", "en"), ("Beta", "ko"), ("Alpha", "ja")]);
    let reversed = printing_set(&[("Alpha", "ja"), ("Beta", "ko"), ("Alpha", "en")]);

    let mut a = available_languages(&forward, "Alpha");
    let mut b = available_languages(&reversed, "Alpha");
    assert_eq!(a, vec!["en", "ja"]);
    assert_eq!(b, vec!["ja", "en"]);

    a.sort_unstable();
    b.sort_unstable();
    assert_eq!(a, b);
}

// ── pick_default_printing ────────────────────────────────────────────

#[test]
fn default_prefers_requested_language() {
    let printings = printing_set(&[("Alpha", "en"), ("Alpha", "ja"), ("Beta", "en")]);
    let index = pick_default_printing(&printings, "ja");
    assert_eq!(set_and_lang(&printings, index), ("Alpha", "ja"));
}

#[test]
fn default_takes_first_match_in_source_order() {
    let printings = printing_set(&[("Beta", "en"), ("Alpha", "ko"), ("Gamma", "ko")]);
    assert_eq!(pick_default_printing(&printings, "ko"), 1);
}

#[test]
fn default_falls_back_to_english() {
    let printings = printing_set(&[("Alpha", "fr"), ("Beta", "en"), ("Gamma", "en")]);
    let index = pick_default_printing(&printings, "ja");
    assert_eq!(set_and_lang(&printings, index), ("Beta", "en"));
}

#[test]
fn default_falls_back_to_first_printing() {
    let printings = printing_set(&[("Alpha", "fr")]);
    let index = pick_default_printing(&printings, "ja");
    assert_eq!(set_and_lang(&printings, index), ("Alpha", "fr"));

    let printings = printing_set(&[("Alpha", "fr"), ("Beta", "de")]);
    assert_eq!(pick_default_printing(&printings, "ja"), 0);
}

#[test]
fn default_is_always_a_member() {
    let cases: [&[(&str, &str)]; 4] = [
        &[("A", "en")],
        &[("A", "de"), ("B", "fr")],
        &[("A", "ja"), ("A", "en"), ("B", "ja")],
        &[("A", "px"), ("B", "grc"), ("C", "sa")],
    ];
    for pairs in cases {
        let printings = printing_set(pairs);
        for lang in ["en", "ja", "zz", ""] {
            let index = pick_default_printing(&printings, lang);
            assert!(index < printings.len());
        }
    }
}

// ── resolve_printing ─────────────────────────────────────────────────

#[test]
fn resolve_exact_match() {
    let printings = printing_set(&[("Alpha", "en"), ("Beta", "ja"), ("Beta", "en")]);
    let index = resolve_printing(&printings, "Beta", "ja");
    assert_eq!(set_and_lang(&printings, index), ("Beta", "ja"));
}

#[test]
fn resolve_english_in_same_set() {
    let printings = printing_set(&[("Alpha", "ja"), ("Beta", "fr"), ("Beta", "en")]);
    let index = resolve_printing(&printings, "Beta", "ja");
    assert_eq!(set_and_lang(&printings, index), ("Beta", "en"));
}

#[test]
fn resolve_first_in_set_when_no_english() {
    let printings = printing_set(&[("Alpha", "en"), ("Beta", "fr"), ("Beta", "de")]);
    let index = resolve_printing(&printings, "Beta", "ja");
    assert_eq!(set_and_lang(&printings, index), ("Beta", "fr"));
}

#[test]
fn resolve_unknown_set_uses_first_printing() {
    let printings = printing_set(&[("Alpha", "fr"), ("Beta", "en")]);
    assert_eq!(resolve_printing(&printings, "Omega", "en"), 0);
}

#[test]
fn resolve_duplicate_pairs_pick_first() {
    let printings = printing_set(&[("Alpha", "en"), ("Alpha", "en")]);
    assert_eq!(resolve_printing(&printings, "Alpha", "en"), 0);
}

// ── language_for_set ─────────────────────────────────────────────────

#[test]
fn language_for_set_keeps_available_language() {
    let printings = printing_set(&[("Alpha", "ja"), ("Beta", "ja"), ("Beta", "en")]);
    assert_eq!(language_for_set(&printings, "Beta", "ja"), Some("ja"));
    assert_eq!(language_for_set(&printings, "Beta", "ko"), Some("en"));
}

#[test]
fn language_for_set_uses_first_without_english() {
    let printings = printing_set(&[("Alpha", "en"), ("Beta", "de"), ("Beta", "fr")]);
    assert_eq!(language_for_set(&printings, "Beta", "ja"), Some("de"));
    assert_eq!(language_for_set(&printings, "Omega", "ja"), None);
}

// ── load ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn load_builds_printing_set() {
    let source = FixedSource(Ok(vec![record("Alpha", "en"), record("Beta", "ja")]));
    let printings = load(&source, IDENTITY).await.unwrap();
    assert_eq!(printings.len(), 2);
    assert_eq!(available_sets(&printings), vec!["Alpha", "Beta"]);
}

#[tokio::test]
async fn load_empty_result_is_not_found() {
    let source = FixedSource(Ok(Vec::new()));
    let err = load(&source, IDENTITY).await.unwrap_err();
    assert_eq!(err, CatalogError::NotFound(IDENTITY.to_string()));
}

#[tokio::test]
async fn load_skips_unreadable_records() {
    let source = FixedSource(Ok(vec![
        serde_json::json!({ "unexpected": true }),
        record("Beta", "ja"),
    ]));
    let printings = load(&source, IDENTITY).await.unwrap();
    assert_eq!(printings.len(), 1);

    let source = FixedSource(Ok(vec![serde_json::json!(42)]));
    assert!(matches!(
        load(&source, IDENTITY).await,
        Err(CatalogError::NotFound(_))
    ));
}

#[tokio::test]
async fn load_malformed_body_is_not_found() {
    let source = FixedSource(Err(|| SourceError::Malformed("not an array".to_string())));
    assert!(matches!(
        load(&source, IDENTITY).await,
        Err(CatalogError::NotFound(_))
    ));
}

#[tokio::test]
async fn load_server_error_is_source_unavailable() {
    let source = FixedSource(Err(|| {
        SourceError::HttpStatus(reqwest::StatusCode::SERVICE_UNAVAILABLE)
    }));
    assert!(matches!(
        load(&source, IDENTITY).await,
        Err(CatalogError::SourceUnavailable(_))
    ));
}
