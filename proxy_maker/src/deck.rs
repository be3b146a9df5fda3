//! Ordered collection of the printings chosen for each decklist slot
//!
//! Slots start empty and are filled as their controllers become ready.
//! `record_selection` is the only writer. Every `reset` starts a new
//! generation; notifiers created for an older generation are ignored.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::printing::CardPrinting;
use crate::selection::SelectionObserver;

/// Identifies one decklist submission
pub type Generation = u64;

/// One line of the export request
#[derive(Debug, Clone, PartialEq)]
pub struct ExportEntry {
    pub printing: Arc<CardPrinting>,
    pub quantity: u32,
}

/// Wire form of an export entry: `{quantity, cardJson}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDicEntry<'a> {
    pub quantity: u32,
    pub card_json: &'a serde_json::Value,
}

impl ExportEntry {
    pub fn to_card_dic(&self) -> CardDicEntry<'_> {
        CardDicEntry {
            quantity: self.quantity,
            card_json: self.printing.record(),
        }
    }
}

#[derive(Debug, Default)]
pub struct DeckAggregator {
    slots: Vec<Option<ExportEntry>>,
    generation: Generation,
}

impl DeckAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every recorded selection and size for `slot_count` empty slots
    pub fn reset(&mut self, slot_count: usize) {
        self.generation += 1;
        self.slots = vec![None; slot_count];
        log::debug!(
            "Deck reset to {} slots (generation {})",
            slot_count,
            self.generation
        );
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Overwrite or fill `slot_index`. Indices past the current size are ignored.
    pub fn record_selection(&mut self, slot_index: usize, printing: Arc<CardPrinting>, quantity: u32) {
        match self.slots.get_mut(slot_index) {
            Some(slot) => {
                *slot = Some(ExportEntry { printing, quantity });
            }
            None => log::warn!(
                "Ignoring selection for slot {} of a {}-slot deck",
                slot_index,
                self.slots.len()
            ),
        }
    }

    /// Filled slots in index order, without gaps
    pub fn snapshot_for_export(&self) -> Vec<ExportEntry> {
        self.slots.iter().flatten().cloned().collect()
    }

    /// Total number of cards over all filled slots
    pub fn card_count(&self) -> u64 {
        self.slots
            .iter()
            .flatten()
            .map(|entry| u64::from(entry.quantity))
            .sum()
    }

    /// Handle for a controller of the current generation
    pub fn notifier(deck: &Arc<Mutex<DeckAggregator>>) -> SlotNotifier {
        let generation = lock(deck).generation;
        SlotNotifier {
            deck: Arc::clone(deck),
            generation,
        }
    }
}

/// Forwards a controller's selections into the shared deck
pub struct SlotNotifier {
    deck: Arc<Mutex<DeckAggregator>>,
    generation: Generation,
}

impl SlotNotifier {
    pub fn generation(&self) -> Generation {
        self.generation
    }
}

impl SelectionObserver for SlotNotifier {
    fn selection_changed(&self, slot_index: usize, printing: &Arc<CardPrinting>, quantity: u32) {
        let mut deck = lock(&self.deck);
        if deck.generation != self.generation {
            log::debug!(
                "Discarding selection for slot {} from generation {} (current {})",
                slot_index,
                self.generation,
                deck.generation
            );
            return;
        }
        deck.record_selection(slot_index, Arc::clone(printing), quantity);
    }
}

/// Lock the deck, recovering it if a previous holder panicked
fn lock(deck: &Mutex<DeckAggregator>) -> MutexGuard<'_, DeckAggregator> {
    deck.lock().unwrap_or_else(PoisonError::into_inner)
}
