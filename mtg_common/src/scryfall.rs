//! Scryfall card records
//!
//! The same shape is returned by `api.scryfall.com` and by the local card
//! database that serves every printing of one oracle id.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scryfall card response
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScryfallCard {
    /// Printing id, unique per set/collector number/language
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub oracle_id: Option<String>,
    /// Absent on some multi-faced layouts, see `card_faces`
    #[serde(default)]
    pub name: Option<String>,
    pub set_name: String,
    pub lang: String,
    #[serde(default)]
    pub prices: ScryfallPrices,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
    /// For double-faced cards, names and images are in card_faces
    #[serde(default)]
    pub card_faces: Option<Vec<CardFace>>,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub type_line: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ScryfallPrices {
    pub eur: Option<String>,
    pub eur_foil: Option<String>,
    pub usd: Option<String>,
    pub usd_foil: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ImageUris {
    pub small: Option<String>,
    pub normal: Option<String>,
    pub large: Option<String>,
    pub png: Option<String>,
    pub art_crop: Option<String>,
    pub border_crop: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CardFace {
    pub name: String,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub type_line: Option<String>,
}

/// Scryfall API error response
#[derive(Debug, Deserialize)]
pub struct ScryfallError {
    pub status: u16,
    pub code: String,
    pub details: String,
}

/// Why a raw JSON record could not be read as a card
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid card record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("card record {0:?} has no name")]
    MissingName(String),
}

impl ImageUris {
    /// Look up a quality tier by its Scryfall key ("small", "normal", ...)
    pub fn get(&self, quality: &str) -> Option<&str> {
        match quality {
            "small" => self.small.as_deref(),
            "normal" => self.normal.as_deref(),
            "large" => self.large.as_deref(),
            "png" => self.png.as_deref(),
            "art_crop" => self.art_crop.as_deref(),
            "border_crop" => self.border_crop.as_deref(),
            _ => None,
        }
    }
}

impl ScryfallCard {
    /// Parse a raw record, requiring a usable name on the card or its first face
    pub fn from_value(value: &serde_json::Value) -> Result<Self, RecordError> {
        let card: ScryfallCard = serde_json::from_value(value.clone())?;
        if card.front_name().is_none() {
            return Err(RecordError::MissingName(card.id));
        }
        Ok(card)
    }

    /// Name of the front face for multi-faced cards, the card name otherwise
    pub fn front_name(&self) -> Option<&str> {
        match self.card_faces.as_deref() {
            Some([face, ..]) => Some(face.name.as_str()),
            _ => self.name.as_deref(),
        }
    }
}

#[cfg(test)]
#[path = "scryfall_tests.rs"]
mod tests;
