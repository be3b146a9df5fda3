//! One printed, localized version of a card
//!
//! Records arrive as loosely shaped Scryfall JSON. They are read once into
//! [`CardPrinting`], where the single/double faced distinction is explicit
//! and the front face is always face 0.

use mtg_common::{ImageUris, RecordError, ScryfallCard};

/// Shown when a printing has no image for the requested quality
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/488x680.png";

/// Coloured mana symbols in WUBRG order
const COLOR_SYMBOLS: [&str; 5] = ["{W}", "{U}", "{B}", "{R}", "{G}"];

/// One side of a card
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub name: String,
    pub type_line: Option<String>,
    pub mana_cost: Option<String>,
    pub image_refs: ImageUris,
}

/// Printed faces of a card
#[derive(Debug, Clone, PartialEq)]
pub enum CardFaces {
    Single(Face),
    Double([Face; 2]),
}

impl CardFaces {
    /// The face shown on the front of the proxy
    pub fn front(&self) -> &Face {
        match self {
            CardFaces::Single(face) => face,
            CardFaces::Double([front, _]) => front,
        }
    }

    pub fn is_double_faced(&self) -> bool {
        matches!(self, CardFaces::Double(_))
    }
}

/// A single (set, language) printing of a card
#[derive(Debug, Clone, PartialEq)]
pub struct CardPrinting {
    /// Printing id from the source, may be empty
    pub id: String,
    /// Oracle id shared by every printing of the card
    pub identity: String,
    pub set_name: String,
    pub language: String,
    pub faces: CardFaces,
    /// USD price in cents
    pub price_minor: Option<u64>,
    record: serde_json::Value,
}

impl CardPrinting {
    /// Read a source record belonging to `identity`
    pub fn from_record(record: serde_json::Value, identity: &str) -> Result<Self, RecordError> {
        let card = ScryfallCard::from_value(&record)?;
        let faces = build_faces(&card);
        let price_minor = card.prices.usd.as_deref().and_then(parse_price_minor);

        Ok(Self {
            id: card.id,
            identity: identity.to_string(),
            set_name: card.set_name,
            language: card.lang,
            faces,
            price_minor,
            record,
        })
    }

    pub fn front_face(&self) -> &Face {
        self.faces.front()
    }

    pub fn name(&self) -> &str {
        &self.front_face().name
    }

    pub fn type_line(&self) -> Option<&str> {
        self.front_face().type_line.as_deref()
    }

    pub fn mana_cost(&self) -> Option<&str> {
        self.front_face().mana_cost.as_deref()
    }

    /// Front face image for a quality tier, or the placeholder
    pub fn image_url(&self, quality: &str) -> &str {
        self.front_face()
            .image_refs
            .get(quality)
            .unwrap_or(PLACEHOLDER_IMAGE_URL)
    }

    /// Coloured mana symbols present in the front face mana cost
    pub fn colors(&self) -> Vec<&'static str> {
        let mana_cost = self.mana_cost().unwrap_or_default();
        COLOR_SYMBOLS
            .iter()
            .copied()
            .filter(|symbol| mana_cost.contains(symbol))
            .collect()
    }

    /// The untouched source record, forwarded as-is to the export backend
    pub fn record(&self) -> &serde_json::Value {
        &self.record
    }
}

fn build_faces(card: &ScryfallCard) -> CardFaces {
    // Split and adventure cards list faces but keep their images on the card
    let fallback_images = card.image_uris.clone().unwrap_or_default();
    let to_face = |face: &mtg_common::CardFace| Face {
        name: face.name.clone(),
        type_line: face.type_line.clone(),
        mana_cost: face.mana_cost.clone(),
        image_refs: face
            .image_uris
            .clone()
            .unwrap_or_else(|| fallback_images.clone()),
    };

    match card.card_faces.as_deref() {
        Some([front, back, ..]) => CardFaces::Double([to_face(front), to_face(back)]),
        Some([front]) => CardFaces::Single(to_face(front)),
        _ => CardFaces::Single(Face {
            name: card.front_name().unwrap_or_default().to_string(),
            type_line: card.type_line.clone(),
            mana_cost: card.mana_cost.clone(),
            image_refs: fallback_images,
        }),
    }
}

/// Parse a decimal price string ("2.5", "0.07") into cents
fn parse_price_minor(price: &str) -> Option<u64> {
    let price = price.trim();
    let (whole, fraction) = price.split_once('.').unwrap_or((price, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    let whole: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let cents = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<u64>().ok()? * 10,
        _ => fraction.get(..2)?.parse::<u64>().ok()?,
    };
    whole.checked_mul(100)?.checked_add(cents)
}
