//! One decklist submission and the slots built from it
//!
//! Submitting a decklist throws away every previous slot and starts a new
//! generation. Name lookups and printing loads complete asynchronously;
//! completions tagged with an older generation are dropped.

use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::catalog::{self, PrintingSet};
use crate::deck::{DeckAggregator, ExportEntry, Generation};
use crate::decklist::{parse_decklist, DecklistEntry};
use crate::error::{CatalogError, ProxyError, SelectionError, SourceError};
use crate::selection::{SelectionController, SelectionState};
use crate::source::CardSource;

/// Image tier shown next to each slot
const PREVIEW_QUALITY: &str = "small";

/// One accepted decklist line and its selection
pub struct DeckSlot {
    pub entry: DecklistEntry,
    identity: Option<String>,
    controller: SelectionController,
}

impl DeckSlot {
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn controller(&self) -> &SelectionController {
        &self.controller
    }
}

pub struct DeckSession {
    deck: Arc<Mutex<DeckAggregator>>,
    slots: Vec<DeckSlot>,
    generation: Generation,
    preferred_language: String,
    export_unavailable: bool,
}

impl Default for DeckSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DeckSession {
    pub fn new() -> Self {
        Self {
            deck: Arc::new(Mutex::new(DeckAggregator::new())),
            slots: Vec::new(),
            generation: 0,
            preferred_language: catalog::FALLBACK_LANGUAGE.to_string(),
            export_unavailable: false,
        }
    }

    /// Parse `decklist` and rebuild every slot from scratch
    pub fn submit(&mut self, decklist: &str, preferred_language: &str) -> Generation {
        self.submit_entries(parse_decklist(decklist), preferred_language)
    }

    pub fn submit_entries(
        &mut self,
        entries: Vec<DecklistEntry>,
        preferred_language: &str,
    ) -> Generation {
        self.generation = {
            let mut deck = lock(&self.deck);
            deck.reset(entries.len());
            deck.generation()
        };
        self.preferred_language = preferred_language.to_string();
        self.export_unavailable = false;
        self.slots = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| DeckSlot {
                controller: SelectionController::new(
                    index,
                    entry.quantity,
                    DeckAggregator::notifier(&self.deck),
                ),
                identity: None,
                entry,
            })
            .collect();

        log::info!(
            "Accepted {} decklist lines (generation {}, language {})",
            self.slots.len(),
            self.generation,
            self.preferred_language
        );
        self.generation
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn preferred_language(&self) -> &str {
        &self.preferred_language
    }

    pub fn slots(&self) -> &[DeckSlot] {
        &self.slots
    }

    /// Record the identity a slot's name resolved to. Returns false for a
    /// stale generation.
    pub fn complete_resolution(
        &mut self,
        generation: Generation,
        slot_index: usize,
        resolved: Result<String, SourceError>,
    ) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        let Some(slot) = self.slots.get_mut(slot_index) else {
            return false;
        };

        match resolved {
            Ok(identity) => {
                log::debug!("{:?} resolved to {}", slot.entry.name, identity);
                slot.identity = Some(identity);
                slot.controller.begin_loading();
            }
            Err(e) => {
                let reason = CatalogError::from_source(&slot.entry.name, e);
                slot.controller.initialize(Err(reason), &self.preferred_language);
            }
        }
        true
    }

    /// Hand loaded printings to a slot. Returns false for a stale generation.
    pub fn complete_load(
        &mut self,
        generation: Generation,
        slot_index: usize,
        loaded: Result<PrintingSet, CatalogError>,
    ) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        match self.slots.get_mut(slot_index) {
            Some(slot) => {
                slot.controller.initialize(loaded, &self.preferred_language);
                true
            }
            None => false,
        }
    }

    pub fn change_set(&mut self, slot_index: usize, set: &str) -> Result<(), SelectionError> {
        self.slot_mut(slot_index)?.controller.on_set_changed(set)
    }

    pub fn change_language(&mut self, slot_index: usize, language: &str) -> Result<(), SelectionError> {
        self.slot_mut(slot_index)?.controller.on_language_changed(language)
    }

    /// Apply a set choice and then, if given, a language choice
    pub fn apply_pick(&mut self, pick: &Pick) -> Result<(), SelectionError> {
        self.change_set(pick.slot_index, &pick.set)?;
        if let Some(language) = &pick.language {
            self.change_language(pick.slot_index, language)?;
        }
        Ok(())
    }

    /// Selected printings of every ready slot, in decklist order
    pub fn snapshot_for_export(&self) -> Vec<ExportEntry> {
        lock(&self.deck).snapshot_for_export()
    }

    pub fn export_unavailable(&self) -> bool {
        self.export_unavailable
    }

    /// Remember whether the last export attempt reached the backend
    pub fn record_export_outcome(&mut self, reached_backend: bool) {
        self.export_unavailable = !reached_backend;
    }

    pub fn view(&self) -> DeckView {
        DeckView {
            generation: self.generation,
            preferred_language: self.preferred_language.clone(),
            export_unavailable: self.export_unavailable,
            card_count: lock(&self.deck).card_count(),
            slots: self.slots.iter().map(SlotView::from_slot).collect(),
        }
    }

    fn is_current(&self, generation: Generation) -> bool {
        if generation != self.generation {
            log::debug!(
                "Dropping completion from generation {} (current {})",
                generation,
                self.generation
            );
            return false;
        }
        true
    }

    fn slot_mut(&mut self, slot_index: usize) -> Result<&mut DeckSlot, SelectionError> {
        self.slots
            .get_mut(slot_index)
            .ok_or(SelectionError::SlotOutOfRange(slot_index))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A command line selection, written `SLOT:SET[:LANG]` with a 1-based slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pick {
    pub slot_index: usize,
    pub set: String,
    pub language: Option<String>,
}

impl FromStr for Pick {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProxyError::InvalidPick(s.to_string());
        let (slot, rest) = s.split_once(':').ok_or_else(invalid)?;
        let slot: usize = slot
            .trim()
            .parse()
            .ok()
            .filter(|slot| *slot > 0)
            .ok_or_else(invalid)?;

        // Set names may contain colons; only a known language code ends the pick
        let (set, language) = match rest.rsplit_once(':') {
            Some((set, lang)) => {
                let lang = lang.trim().to_lowercase();
                if mtg_common::is_known_language(&lang) {
                    (set.trim(), Some(lang))
                } else {
                    (rest.trim(), None)
                }
            }
            None => (rest.trim(), None),
        };
        if set.is_empty() {
            return Err(invalid());
        }

        Ok(Pick {
            slot_index: slot - 1,
            set: set.to_string(),
            language,
        })
    }
}

/// Outcome of [`load_all`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub generation: Generation,
    pub ready: usize,
    pub invalid: usize,
    /// A newer decklist was submitted while loading
    pub superseded: bool,
}

/// Resolve names and load printings for every slot of `generation`, the
/// value returned by [`DeckSession::submit`]. The session is only locked
/// between requests. Stops as soon as a newer decklist replaces it.
pub async fn load_all<S: CardSource + ?Sized>(
    session: &Mutex<DeckSession>,
    generation: Generation,
    source: &S,
) -> LoadSummary {
    let names: Option<Vec<String>> = {
        let session = lock(session);
        let current = session.generation == generation;
        let names = current.then(|| session.slots.iter().map(|s| s.entry.name.clone()).collect());
        names
    };
    let Some(names) = names else {
        log::info!("Generation {} was replaced before loading started", generation);
        return LoadSummary {
            generation,
            ready: 0,
            invalid: 0,
            superseded: true,
        };
    };

    let mut superseded = false;
    for (index, name) in names.iter().enumerate() {
        let resolved = source.resolve_name(name).await;
        let identity = resolved.as_ref().ok().cloned();
        let accepted = lock(session).complete_resolution(generation, index, resolved);
        if !accepted {
            superseded = true;
            break;
        }
        let Some(identity) = identity else {
            continue;
        };

        let loaded = catalog::load(source, &identity).await;
        let accepted = lock(session).complete_load(generation, index, loaded);
        if !accepted {
            superseded = true;
            break;
        }
    }

    let session = lock(session);
    let count = |state| {
        session
            .slots
            .iter()
            .filter(|s| s.controller.state() == state)
            .count()
    };
    let summary = LoadSummary {
        generation,
        ready: count(SelectionState::Ready),
        invalid: count(SelectionState::Invalid),
        superseded,
    };
    if superseded {
        log::info!("Load of generation {} superseded by a newer decklist", generation);
    } else {
        log::info!(
            "Loaded generation {}: {} ready, {} invalid",
            generation,
            summary.ready,
            summary.invalid
        );
    }
    summary
}

/// Serialisable state of the whole deck
#[derive(Debug, Serialize)]
pub struct DeckView {
    pub generation: Generation,
    pub preferred_language: String,
    pub export_unavailable: bool,
    pub card_count: u64,
    pub slots: Vec<SlotView>,
}

#[derive(Debug, Serialize)]
pub struct LanguageOption {
    pub code: String,
    pub name: String,
}

/// Serialisable state of one slot
#[derive(Debug, Serialize)]
pub struct SlotView {
    pub index: usize,
    pub line: usize,
    pub name: String,
    pub quantity: u32,
    pub state: SelectionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chosen_set: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chosen_language: Option<String>,
    pub available_sets: Vec<String>,
    pub available_languages: Vec<LanguageOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mana_cost: Option<String>,
    /// Coloured mana symbols of the front face, WUBRG order
    pub colors: Vec<&'static str>,
    pub double_faced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_minor: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SlotView {
    fn from_slot(slot: &DeckSlot) -> Self {
        let controller = &slot.controller;
        let printing = controller.current_printing();
        Self {
            index: controller.slot_index(),
            line: slot.entry.line,
            name: printing
                .map(|p| p.name().to_string())
                .unwrap_or_else(|| slot.entry.name.clone()),
            quantity: controller.quantity(),
            state: controller.state(),
            identity: slot.identity.clone(),
            chosen_set: controller.chosen_set().map(str::to_string),
            chosen_language: controller.chosen_language().map(str::to_string),
            available_sets: controller
                .available_sets()
                .into_iter()
                .map(str::to_string)
                .collect(),
            available_languages: controller
                .available_languages()
                .into_iter()
                .map(|code| LanguageOption {
                    code: code.to_string(),
                    name: mtg_common::display_name(code).unwrap_or(code).to_string(),
                })
                .collect(),
            image_url: printing.map(|p| p.image_url(PREVIEW_QUALITY).to_string()),
            type_line: printing.and_then(|p| p.type_line()).map(str::to_string),
            mana_cost: printing.and_then(|p| p.mana_cost()).map(str::to_string),
            colors: printing.map(|p| p.colors()).unwrap_or_default(),
            double_faced: printing.is_some_and(|p| p.faces.is_double_faced()),
            price_minor: printing.and_then(|p| p.price_minor),
            error: controller.invalid_reason().map(|e| e.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
