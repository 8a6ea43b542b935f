//! Live adapter for the Pixabay photo search API.

use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::error::ServiceError;
use crate::ports::image_service::{
    CandidatesFuture, CandidatesResult, GenerateFuture, ImageRequest, ImageService, Page,
};

const PIXABAY_API_URL: &str = "https://pixabay.com/api/";

/// Pixabay caps the query string at 100 characters.
const MAX_QUERY_CHARS: usize = 100;

/// Smallest `per_page` Pixabay accepts.
pub const MIN_PER_PAGE: u32 = 3;

/// Largest `per_page` Pixabay accepts.
pub const MAX_PER_PAGE: u32 = 200;

/// Stock photo backend that searches Pixabay with the phrase text and tags.
pub struct PixabayImageService {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl PixabayImageService {
    /// Create a new Pixabay backend with the given API key.
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            endpoint: PIXABAY_API_URL.to_string(),
        }
    }

    /// Point the backend at a different endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn search(&self, request: &ImageRequest, page: Page) -> CandidatesResult {
        let query = search_query(request);
        let page_number = page.number.max(1).to_string();
        let per_page = page.size.clamp(MIN_PER_PAGE, MAX_PER_PAGE).to_string();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", query.as_str()),
                ("image_type", "photo"),
                ("orientation", "vertical"),
                ("safesearch", "true"),
                ("page", page_number.as_str()),
                ("per_page", per_page.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if is_past_last_page(status, &response_text) {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message: response_text,
            });
        }

        let parsed: PixabayResponse =
            serde_json::from_str(&response_text).map_err(|e| ServiceError::Api {
                status: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        let urls = parsed
            .hits
            .into_iter()
            .map(PixabayHit::best_url)
            .filter(|url| !url.is_empty());
        let limit = usize::try_from(page.size).unwrap_or(usize::MAX);
        Ok(urls.take(limit).collect())
    }
}

fn search_query(request: &ImageRequest) -> String {
    request.query().chars().take(MAX_QUERY_CHARS).collect()
}

/// Pixabay answers 400 when asked for a page beyond the last result.
fn is_past_last_page(status: StatusCode, body: &str) -> bool {
    status == StatusCode::BAD_REQUEST && body.contains("out of valid range")
}

impl ImageService for PixabayImageService {
    fn name(&self) -> &str {
        "pixabay"
    }

    fn generate(&self, request: &ImageRequest) -> GenerateFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let hits = self.search(&request, Page::first(MIN_PER_PAGE)).await?;
            Ok(hits.into_iter().next())
        })
    }

    fn candidates(&self, request: &ImageRequest, page: Page) -> CandidatesFuture<'_> {
        let request = request.clone();
        Box::pin(async move { self.search(&request, page).await })
    }
}

// --- Pixabay API response types ---

#[derive(Deserialize)]
struct PixabayResponse {
    #[serde(default)]
    hits: Vec<PixabayHit>,
}

#[derive(Deserialize)]
struct PixabayHit {
    #[serde(rename = "webformatURL", default)]
    webformat_url: String,
    #[serde(rename = "largeImageURL", default)]
    large_image_url: String,
}

impl PixabayHit {
    fn best_url(self) -> String {
        if self.large_image_url.is_empty() {
            self.webformat_url
        } else {
            self.large_image_url
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_truncated_by_characters() {
        let long = "あ".repeat(150);
        let query = search_query(&ImageRequest::new(long));
        assert_eq!(query.chars().count(), MAX_QUERY_CHARS);
    }

    #[test]
    fn query_includes_tags() {
        let query = search_query(&ImageRequest::new("sunset").with_tags(["ocean"]));
        assert_eq!(query, "sunset ocean");
    }

    #[test]
    fn parses_hits() {
        let json = r#"{
            "total": 2,
            "hits": [
                {"id": 1, "webformatURL": "https://pixabay.com/get/abc_640.jpg", "largeImageURL": "https://pixabay.com/get/abc_1280.jpg"},
                {"id": 2, "webformatURL": "https://pixabay.com/get/def_640.jpg"}
            ]
        }"#;
        let parsed: PixabayResponse = serde_json::from_str(json).unwrap();
        let urls: Vec<String> = parsed.hits.into_iter().map(PixabayHit::best_url).collect();
        assert_eq!(
            urls,
            [
                "https://pixabay.com/get/abc_1280.jpg",
                "https://pixabay.com/get/def_640.jpg"
            ]
        );
    }

    #[test]
    fn no_hits_parses_to_empty() {
        let body = r#"{"total": 0, "hits": []}"#;
        let parsed: PixabayResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.hits.is_empty());
    }

    #[test]
    fn out_of_range_page_is_the_end() {
        let body = "[ERROR 400] \"page\" is out of valid range.";
        assert!(is_past_last_page(StatusCode::BAD_REQUEST, body));
        let bad_key = "[ERROR 400] Invalid API key";
        assert!(!is_past_last_page(StatusCode::BAD_REQUEST, bad_key));
        assert!(!is_past_last_page(StatusCode::OK, body));
    }
}
