//! Proxy Maker - MTG decklist to printable proxies
//!
//! Resolves every decklist line to a card, lets the user choose the printed
//! set and language of each card, and sends the chosen printings to a render
//! backend for a PDF or image download.

pub mod catalog;
pub mod deck;
pub mod decklist;
pub mod error;
pub mod export;
pub mod printing;
pub mod selection;
pub mod session;
pub mod source;
pub mod web;

#[cfg(test)]
mod test_support;

pub use catalog::PrintingSet;
pub use deck::{DeckAggregator, ExportEntry, Generation, SlotNotifier};
pub use decklist::{parse_decklist, read_decklist, DecklistEntry};
pub use error::{CatalogError, ExportError, ProxyError, Result, SelectionError, SourceError};
pub use export::{ExportClient, FileType};
pub use printing::{CardFaces, CardPrinting, Face};
pub use selection::{SelectionController, SelectionObserver, SelectionState};
pub use session::{load_all, DeckSession, DeckView, LoadSummary, Pick};
pub use source::{CardSource, HttpCardSource};
