//! Fixtures shared by unit tests

use crate::catalog::PrintingSet;
use crate::printing::CardPrinting;

pub const IDENTITY: &str = "713332c1-5bd8-400f-bfff-c1ca0697a043";

/// Minimal source record for a printing
pub fn record(set: &str, lang: &str) -> serde_json::Value {
    serde_json::json!({
        "id": format!("{}-{}", set, lang),
        "name": "Test Card",
        "set_name": set,
        "lang": lang,
        "mana_cost": "{1}{R}",
        "type_line": "Instant",
        "image_uris": { "small": format!("https://img/{}/{}.jpg", set, lang) }
    })
}

pub fn printing(set: &str, lang: &str) -> CardPrinting {
    CardPrinting::from_record(record(set, lang), IDENTITY).unwrap()
}

/// Printing set built from (set, language) pairs in order
pub fn printing_set(pairs: &[(&str, &str)]) -> PrintingSet {
    let printings = pairs.iter().map(|(set, lang)| printing(set, lang)).collect();
    PrintingSet::new(IDENTITY, printings).unwrap()
}
