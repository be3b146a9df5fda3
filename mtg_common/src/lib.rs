//! Shared MTG types used by the proxy maker.
//!
//! Holds the Scryfall wire format (as served both by Scryfall itself and by
//! the local card database mirror) and the fixed table of card languages.

pub mod language;
pub mod scryfall;

pub use language::{display_name, is_known_language, LANGUAGES};
pub use scryfall::{CardFace, ImageUris, RecordError, ScryfallCard, ScryfallError, ScryfallPrices};
