//! Per-slot set/language selection
//!
//! A [`SelectionController`] owns the printings of one decklist slot and the
//! user's current (set, language) choice. It moves through
//! `Uninitialized -> Loading -> Ready | Invalid`; changing the identity or the
//! preferred language means building a new controller.
//!
//! While `Ready`, the current printing always belongs to the chosen set and
//! the chosen language is always one that set was printed in.

use std::sync::Arc;

use serde::Serialize;

use crate::catalog::{self, PrintingSet};
use crate::error::{CatalogError, SelectionError};
use crate::printing::CardPrinting;
use crate::source::CardSource;

/// Receives the printing a slot currently points at
pub trait SelectionObserver: Send {
    fn selection_changed(&self, slot_index: usize, printing: &Arc<CardPrinting>, quantity: u32);
}

/// Lifecycle state of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionState {
    Uninitialized,
    Loading,
    Ready,
    Invalid,
}

enum Phase {
    Uninitialized,
    Loading,
    Ready(Choice),
    Invalid(CatalogError),
}

struct Choice {
    printings: PrintingSet,
    chosen_set: String,
    chosen_language: String,
    current: usize,
}

impl Choice {
    fn current_printing(&self) -> Option<&Arc<CardPrinting>> {
        self.printings.get(self.current)
    }
}

pub struct SelectionController {
    slot_index: usize,
    quantity: u32,
    observer: Box<dyn SelectionObserver>,
    phase: Phase,
}

impl SelectionController {
    pub fn new(slot_index: usize, quantity: u32, observer: impl SelectionObserver + 'static) -> Self {
        Self {
            slot_index,
            quantity,
            observer: Box::new(observer),
            phase: Phase::Uninitialized,
        }
    }

    pub fn slot_index(&self) -> usize {
        self.slot_index
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn state(&self) -> SelectionState {
        match self.phase {
            Phase::Uninitialized => SelectionState::Uninitialized,
            Phase::Loading => SelectionState::Loading,
            Phase::Ready(_) => SelectionState::Ready,
            Phase::Invalid(_) => SelectionState::Invalid,
        }
    }

    /// Mark the slot as waiting for its printings
    pub fn begin_loading(&mut self) {
        match self.phase {
            Phase::Uninitialized => self.phase = Phase::Loading,
            Phase::Loading => {}
            _ => log::warn!(
                "Slot {} already loaded, ignoring a new load",
                self.slot_index
            ),
        }
    }

    /// Apply the outcome of loading the slot's printings.
    ///
    /// On success the default printing for `preferred_language` becomes
    /// current and the observer is notified.
    pub fn initialize(
        &mut self,
        loaded: Result<PrintingSet, CatalogError>,
        preferred_language: &str,
    ) {
        if matches!(self.phase, Phase::Ready(_) | Phase::Invalid(_)) {
            log::warn!(
                "Slot {} already loaded, ignoring a late result",
                self.slot_index
            );
            return;
        }

        match loaded {
            Ok(printings) => {
                let current = catalog::pick_default_printing(&printings, preferred_language);
                let Some((chosen_set, chosen_language)) = printings
                    .get(current)
                    .map(|p| (p.set_name.clone(), p.language.clone()))
                else {
                    let identity = printings.identity().to_string();
                    self.phase = Phase::Invalid(CatalogError::NotFound(identity));
                    return;
                };
                log::debug!(
                    "Slot {} ready with {} printings, default {} / {}",
                    self.slot_index,
                    printings.len(),
                    chosen_set,
                    chosen_language
                );
                self.phase = Phase::Ready(Choice {
                    printings,
                    chosen_set,
                    chosen_language,
                    current,
                });
                self.notify();
            }
            Err(e) => {
                log::warn!("Slot {} is invalid: {}", self.slot_index, e);
                self.phase = Phase::Invalid(e);
            }
        }
    }

    /// Load the printings of `identity` and initialize from them
    pub async fn load<S: CardSource + ?Sized>(
        &mut self,
        source: &S,
        identity: &str,
        preferred_language: &str,
    ) {
        self.begin_loading();
        let loaded = catalog::load(source, identity).await;
        self.initialize(loaded, preferred_language);
    }

    /// Switch to another set, keeping the language when that set has it,
    /// else English, else the set's first language.
    pub fn on_set_changed(&mut self, new_set: &str) -> Result<(), SelectionError> {
        let choice = self.choice_mut()?;

        let language = catalog::language_for_set(&choice.printings, new_set, &choice.chosen_language)
            .map(str::to_string)
            .ok_or_else(|| SelectionError::UnknownSet(new_set.to_string()))?;

        let current = catalog::resolve_printing(&choice.printings, new_set, &language);
        choice.chosen_set = new_set.to_string();
        choice.chosen_language = language;
        self.replace_current(current);
        Ok(())
    }

    /// Switch language within the chosen set. A language the set was not
    /// printed in resolves to English or the set's first printing, and the
    /// chosen language follows the printing actually selected.
    pub fn on_language_changed(&mut self, new_language: &str) -> Result<(), SelectionError> {
        let choice = self.choice_mut()?;

        let current = catalog::resolve_printing(&choice.printings, &choice.chosen_set, new_language);
        if let Some(printing) = choice.printings.get(current) {
            if printing.language != new_language {
                log::info!(
                    "{} is not printed in {:?} in {}, using {:?}",
                    printing.name(),
                    new_language,
                    choice.chosen_set,
                    printing.language
                );
            }
            choice.chosen_language = printing.language.clone();
        }
        self.replace_current(current);
        Ok(())
    }

    pub fn chosen_set(&self) -> Option<&str> {
        self.choice().map(|c| c.chosen_set.as_str())
    }

    pub fn chosen_language(&self) -> Option<&str> {
        self.choice().map(|c| c.chosen_language.as_str())
    }

    pub fn current_printing(&self) -> Option<&Arc<CardPrinting>> {
        self.choice().and_then(Choice::current_printing)
    }

    pub fn available_sets(&self) -> Vec<&str> {
        self.choice()
            .map(|c| catalog::available_sets(&c.printings))
            .unwrap_or_default()
    }

    /// Languages of the chosen set
    pub fn available_languages(&self) -> Vec<&str> {
        self.choice()
            .map(|c| catalog::available_languages(&c.printings, &c.chosen_set))
            .unwrap_or_default()
    }

    pub fn invalid_reason(&self) -> Option<&CatalogError> {
        match &self.phase {
            Phase::Invalid(reason) => Some(reason),
            _ => None,
        }
    }

    fn choice(&self) -> Option<&Choice> {
        match &self.phase {
            Phase::Ready(choice) => Some(choice),
            _ => None,
        }
    }

    fn choice_mut(&mut self) -> Result<&mut Choice, SelectionError> {
        match &mut self.phase {
            Phase::Ready(choice) => Ok(choice),
            _ => Err(SelectionError::NotReady(self.slot_index)),
        }
    }

    /// Point at another printing, notifying only on an actual change
    fn replace_current(&mut self, current: usize) {
        let changed = match &mut self.phase {
            Phase::Ready(choice) if choice.current != current => {
                choice.current = current;
                true
            }
            _ => false,
        };
        if changed {
            self.notify();
        }
    }

    fn notify(&self) {
        if let Some(printing) = self.current_printing() {
            self.observer
                .selection_changed(self.slot_index, printing, self.quantity);
        }
    }
}

#[cfg(test)]
#[path = "selection_tests.rs"]
mod tests;
