//! REST card repository
//!
//! Endpoints, relative to the configured base URL:
//! - `GET  /api/decks/{deck_id}/cards?study_mode=&mixed_order=&prioritize_overdue=`
//! - `POST /api/cards/{card_id}/progress` with `{"success": bool}`
//! - `GET  /api/settings`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use uuid::Uuid;

use super::errors::{RepositoryError, RepositoryResult};
use super::models::{CardsResponse, FetchOptions};
use super::repository::CardRepository;
use super::settings::UserSettings;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Serialize)]
struct ProgressUpdate {
    success: bool,
}

/// Card repository backed by the study server's HTTP API
pub struct HttpCardRepository {
    client: Client,
    base_url: String,
    api_token: Option<String>,
    timeout: Duration,
}

impl HttpCardRepository {
    pub fn new(base_url: &str, api_token: Option<String>, timeout: Duration) -> RepositoryResult<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(RepositoryError::InvalidUrl(format!(
                "{} (URL must start with http:// or https://)",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_token: api_token.filter(|t| !t.is_empty()),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, resource: &str) -> RepositoryResult<Response> {
        let response = self.authorize(request).send().await.map_err(|e| {
            if e.is_timeout() {
                RepositoryError::Timeout(self.timeout.as_millis() as u64)
            } else {
                RepositoryError::Http(e)
            }
        })?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(RepositoryError::Unauthorized),
            StatusCode::NOT_FOUND => Err(RepositoryError::NotFound(resource.to_string())),
            status if !status.is_success() => Err(RepositoryError::Status {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
            _ => Ok(response),
        }
    }
}

#[async_trait]
impl CardRepository for HttpCardRepository {
    async fn get_cards(&self, deck_id: Uuid, options: FetchOptions) -> RepositoryResult<CardsResponse> {
        let resource = format!("api/decks/{}/cards", deck_id);
        let request = self.client.get(self.url(&resource)).query(&[
            ("study_mode", options.study_mode.as_str().to_string()),
            ("mixed_order", options.mixed_order.to_string()),
            ("prioritize_overdue", options.prioritize_overdue.to_string()),
        ]);

        let response = self.send(request, &resource).await?;
        let body = response.text().await?;
        let cards: CardsResponse = serde_json::from_str(&body)?;

        log::debug!("Fetched {} cards for deck {}", cards.cards.len(), deck_id);
        Ok(cards)
    }

    async fn update_card_progress(&self, card_id: Uuid, success: bool) -> RepositoryResult<()> {
        let resource = format!("api/cards/{}/progress", card_id);
        let request = self
            .client
            .post(self.url(&resource))
            .json(&ProgressUpdate { success });

        self.send(request, &resource).await?;
        Ok(())
    }

    async fn get_user_settings(&self) -> RepositoryResult<UserSettings> {
        let resource = "api/settings";
        let response = self.send(self.client.get(self.url(resource)), resource).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and hand back the raw request
    async fn serve_once(status_line: &'static str, body: String) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            request
        });

        (format!("http://{}", addr), handle)
    }

    /// Read headers plus a Content-Length body
    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut raw = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&raw).to_string();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if raw.len() >= header_end + 4 + content_length {
                    return text;
                }
            }
        }
        String::from_utf8_lossy(&raw).to_string()
    }

    fn repository(base_url: &str, token: Option<&str>) -> HttpCardRepository {
        HttpCardRepository::new(base_url, token.map(str::to_string), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_rejects_invalid_url() {
        let result = HttpCardRepository::new("ftp://cards.example", None, Duration::from_secs(1));
        assert!(matches!(result, Err(RepositoryError::InvalidUrl(_))));
    }

    #[test]
    fn test_url_normalization() {
        let repo = repository("https://cards.example/", None);
        assert_eq!(repo.base_url(), "https://cards.example");
        assert_eq!(repo.url("/api/settings"), "https://cards.example/api/settings");
    }

    #[tokio::test]
    async fn test_get_cards_sends_options_and_token() {
        let deck_id = Uuid::new_v4();
        let body = format!(
            r#"{{"cards":[{{"id":"{}","deck_id":"{}","front_text":"Katze","back_text":"cat","learned":true}}],
                "study_session":{{"study_mode":"smart","recommendations":["review verbs"]}}}}"#,
            Uuid::new_v4(),
            deck_id
        );
        let (base, handle) = serve_once("200 OK", body).await;
        let repo = repository(&base, Some("secret"));

        let response = repo.get_cards(deck_id, FetchOptions::default()).await.unwrap();
        let request = handle.await.unwrap();

        assert_eq!(response.cards.len(), 1);
        assert_eq!(response.served_mode(), crate::study::models::StudyMode::Smart);
        assert!(request.starts_with(&format!(
            "GET /api/decks/{}/cards?study_mode=smart&mixed_order=false&prioritize_overdue=true",
            deck_id
        )));
        assert!(request.to_lowercase().contains("authorization: bearer secret"));
    }

    #[tokio::test]
    async fn test_progress_posts_outcome() {
        let card_id = Uuid::new_v4();
        let (base, handle) = serve_once("204 No Content", String::new()).await;
        let repo = repository(&base, None);

        repo.update_card_progress(card_id, false).await.unwrap();
        let request = handle.await.unwrap();

        assert!(request.starts_with(&format!("POST /api/cards/{}/progress", card_id)));
        assert!(request.ends_with(r#"{"success":false}"#));
        assert!(!request.to_lowercase().contains("authorization"));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let (base, _handle) = serve_once("401 Unauthorized", String::new()).await;
        let result = repository(&base, None).get_user_settings().await;
        assert!(matches!(result, Err(RepositoryError::Unauthorized)));

        let (base, _handle) = serve_once("404 Not Found", String::new()).await;
        let result = repository(&base, None).get_user_settings().await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));

        let (base, _handle) = serve_once("500 Internal Server Error", "boom".to_string()).await;
        let result = repository(&base, None).get_user_settings().await;
        match result {
            Err(RepositoryError::Status { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected result {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_settings_with_missing_fields() {
        let (base, _handle) = serve_once("200 OK", r#"{"cards_per_session":12}"#.to_string()).await;
        let settings = repository(&base, None).get_user_settings().await.unwrap();
        assert_eq!(settings.cards_per_session, 12);
        assert_eq!(settings.audio_speed, 0.9);
    }
}
