//! Card-data source: name lookup and printing lists
//!
//! Uses async reqwest for non-blocking HTTP requests. Fuzzy name lookups go
//! to Scryfall; the printings of one oracle id come from the local card
//! database, which answers with a JSON array of Scryfall card objects.

use std::future::Future;
use std::time::Duration;

use mtg_common::ScryfallError;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::SourceError;

pub const SCRYFALL_API_URL: &str = "https://api.scryfall.com";
pub const LOCAL_CARD_DB_URL: &str = "http://localhost:8000/api/";
const USER_AGENT: &str = "D2D-Automations-ProxyMaker/1.0";

/// Scryfall asks clients to keep 50-100 ms between requests
pub const DEFAULT_REQUEST_INTERVAL: Duration = Duration::from_millis(100);

/// Where card names and printings come from
pub trait CardSource {
    /// Resolve a (possibly misspelled) card name to its oracle id
    fn resolve_name(&self, name: &str) -> impl Future<Output = Result<String, SourceError>> + Send;

    /// Every printing record of an oracle id, in source order
    fn fetch_printings(
        &self,
        identity: &str,
    ) -> impl Future<Output = Result<Vec<serde_json::Value>, SourceError>> + Send;
}

/// Only the field we need from `/cards/named`
#[derive(Debug, Deserialize)]
struct NamedCard {
    #[serde(default)]
    oracle_id: Option<String>,
}

/// HTTP card source backed by Scryfall and the local card database
pub struct HttpCardSource {
    client: reqwest::Client,
    printings_url: String,
    scryfall_url: String,
    request_interval: Duration,
    last_lookup: Mutex<Option<Instant>>,
}

impl HttpCardSource {
    /// `printings_url` is used as a prefix, the identity is appended to it
    pub fn new(printings_url: impl Into<String>, scryfall_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            printings_url: printings_url.into(),
            scryfall_url: scryfall_url.into().trim_end_matches('/').to_string(),
            request_interval: DEFAULT_REQUEST_INTERVAL,
            last_lookup: Mutex::new(None),
        }
    }

    /// Minimum time between two Scryfall name lookups
    pub fn with_request_interval(mut self, interval: Duration) -> Self {
        self.request_interval = interval;
        self
    }

    /// Wait until the next Scryfall request is allowed
    async fn throttle(&self) {
        let mut last = self.last_lookup.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.request_interval;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

impl Default for HttpCardSource {
    fn default() -> Self {
        Self::new(LOCAL_CARD_DB_URL, SCRYFALL_API_URL)
    }
}

impl CardSource for HttpCardSource {
    async fn resolve_name(&self, name: &str) -> Result<String, SourceError> {
        let url = format!(
            "{}/cards/named?fuzzy={}",
            self.scryfall_url,
            urlencoding::encode(name)
        );

        self.throttle().await;
        log::debug!("Resolving card name on Scryfall: {}", name);

        let response = self
            .client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            match response.json::<ScryfallError>().await {
                Ok(error) => log::info!("No card named {:?}: {}", name, error.details),
                Err(_) => log::info!("No card named {:?}", name),
            }
            return Err(SourceError::NotFound(name.to_string()));
        }
        if !status.is_success() {
            return Err(SourceError::HttpStatus(status));
        }

        let body = response.text().await?;
        let card: NamedCard =
            serde_json::from_str(&body).map_err(|e| SourceError::Malformed(e.to_string()))?;
        card.oracle_id
            .ok_or_else(|| SourceError::Malformed(format!("{:?} has no oracle_id", name)))
    }

    async fn fetch_printings(&self, identity: &str) -> Result<Vec<serde_json::Value>, SourceError> {
        let url = format!("{}{}", self.printings_url, urlencoding::encode(identity));
        log::debug!("Fetching printings: {}", url);

        let response = self
            .client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(identity.to_string()));
        }
        if !status.is_success() {
            return Err(SourceError::HttpStatus(status));
        }

        let body = response.text().await?;
        match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(serde_json::Value::Array(records)) => Ok(records),
            Ok(other) => Err(SourceError::Malformed(format!(
                "expected an array of printings, got {}",
                json_kind(&other)
            ))),
            Err(e) => Err(SourceError::Malformed(e.to_string())),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
