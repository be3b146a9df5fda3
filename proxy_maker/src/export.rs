//! Client for the render/export backend
//!
//! A render request returns a download token; the finished PDF or image
//! archive is fetched with that token.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::deck::{CardDicEntry, ExportEntry};
use crate::error::ExportError;

pub const LOCAL_EXPORT_URL: &str = "http://localhost:8000/api";
const USER_AGENT: &str = "D2D-Automations-ProxyMaker/1.0";

/// Output format of the render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    #[default]
    Pdf,
    Img,
}

impl FileType {
    /// File extension of the downloaded artifact
    pub fn extension(&self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Img => "zip",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderRequest<'a> {
    card_dic: Vec<CardDicEntry<'a>>,
    filetype: FileType,
    #[serde(skip_serializing_if = "Option::is_none")]
    paper_size: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct RenderResponse {
    token: String,
}

pub struct ExportClient {
    client: reqwest::Client,
    base_url: String,
}

impl ExportClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Ask the backend to render `entries`, returning the download token
    pub async fn request_render(
        &self,
        entries: &[ExportEntry],
        filetype: FileType,
        paper_size: Option<&str>,
    ) -> Result<String, ExportError> {
        if entries.is_empty() {
            return Err(ExportError::NothingToExport);
        }

        let body = RenderRequest {
            card_dic: entries.iter().map(ExportEntry::to_card_dic).collect(),
            filetype,
            paper_size,
        };
        let url = format!("{}/render", self.base_url);
        log::info!(
            "Requesting {:?} render of {} entries from {}",
            filetype,
            entries.len(),
            url
        );

        let response = self
            .client
            .post(&url)
            .header("User-Agent", USER_AGENT)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::error!("Render request failed with status {}: {}", status, error_text);
            return Err(ExportError::Unavailable(format!("HTTP {}", status)));
        }

        let rendered: RenderResponse = response.json().await?;
        log::debug!("Render token: {}", rendered.token);
        Ok(rendered.token)
    }

    /// Fetch the rendered artifact
    pub async fn download(&self, token: &str) -> Result<Vec<u8>, ExportError> {
        let url = format!("{}/download/{}", self.base_url, urlencoding::encode(token));
        log::debug!("Downloading render: {}", url);

        let response = self
            .client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::Unavailable(format!("HTTP {}", status)));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::test_support::printing;

    fn entries() -> Vec<ExportEntry> {
        vec![
            ExportEntry {
                printing: Arc::new(printing("Alpha", "ja")),
                quantity: 4,
            },
            ExportEntry {
                printing: Arc::new(printing("Beta", "en")),
                quantity: 1,
            },
        ]
    }

    #[tokio::test]
    async fn request_render_posts_card_dic() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/render"))
            .and(body_partial_json(serde_json::json!({
                "filetype": "pdf",
                "paperSize": "a4",
                "cardDic": [
                    { "quantity": 4, "cardJson": { "set_name": "Alpha", "lang": "ja" } },
                    { "quantity": 1, "cardJson": { "set_name": "Beta", "lang": "en" } }
                ]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": "abc123" })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ExportClient::new(mock_server.uri());
        let token = client
            .request_render(&entries(), FileType::Pdf, Some("a4"))
            .await
            .unwrap();
        assert_eq!(token, "abc123");
    }

    #[tokio::test]
    async fn request_render_omits_missing_paper_size() {
        let body = RenderRequest {
            card_dic: Vec::new(),
            filetype: FileType::Img,
            paper_size: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"filetype\":\"img\""));
        assert!(!json.contains("paperSize"));
    }

    #[tokio::test]
    async fn request_render_rejects_empty_deck() {
        let client = ExportClient::new("http://127.0.0.1:9");
        assert!(matches!(
            client.request_render(&[], FileType::Pdf, None).await,
            Err(ExportError::NothingToExport)
        ));
    }

    #[tokio::test]
    async fn request_render_server_error_is_unavailable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/render"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let client = ExportClient::new(mock_server.uri());
        assert!(matches!(
            client.request_render(&entries(), FileType::Img, None).await,
            Err(ExportError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn download_returns_bytes() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/download/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7".to_vec()))
            .mount(&mock_server)
            .await;

        let client = ExportClient::new(format!("{}/", mock_server.uri()));
        let bytes = client.download("abc123").await.unwrap();
        assert_eq!(bytes, b"%PDF-1.7");
    }

    #[tokio::test]
    async fn download_unknown_token_is_unavailable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/download/expired"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = ExportClient::new(mock_server.uri());
        assert!(matches!(
            client.download("expired").await,
            Err(ExportError::Unavailable(_))
        ));
    }

    #[test]
    fn file_type_extension() {
        assert_eq!(FileType::Pdf.extension(), "pdf");
        assert_eq!(FileType::Img.extension(), "zip");
    }
}
