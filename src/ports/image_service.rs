//! Image service port: turns phrase text into an image locator.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// A request for an image matching some text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRequest {
    /// The phrase text the image should illustrate.
    pub text: String,
    /// Free-form labels passed through to the backend.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ImageRequest {
    /// Build a request with no tags.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tags: Vec::new(),
        }
    }

    /// Attach tags to the request.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Text and tags joined by spaces, for backends that take a single query.
    #[must_use]
    pub fn query(&self) -> String {
        std::iter::once(self.text.as_str())
            .chain(self.tags.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A 1-based page of candidate images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Page number, starting at 1.
    pub number: u32,
    /// Maximum number of candidates on the page.
    pub size: u32,
}

impl Page {
    /// The first page with the given size.
    #[must_use]
    pub fn first(size: u32) -> Self {
        Self { number: 1, size }
    }
}

/// Outcome of a single backend call.
///
/// `Ok(Some(locator))` is a hit, `Ok(None)` means the backend has nothing to
/// offer for this request, `Err` is a hard failure.
pub type GenerateResult = Result<Option<String>, ServiceError>;

/// Boxed future type returned by [`ImageService::generate`].
pub type GenerateFuture<'a> = Pin<Box<dyn Future<Output = GenerateResult> + Send + 'a>>;

/// Candidate locators for one page; empty when the backend has nothing more.
pub type CandidatesResult = Result<Vec<String>, ServiceError>;

/// Boxed future type returned by [`ImageService::candidates`].
pub type CandidatesFuture<'a> = Pin<Box<dyn Future<Output = CandidatesResult> + Send + 'a>>;

/// Produces an image locator (usually a URL) for a piece of text.
pub trait ImageService: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &str;

    /// Look up or generate an image for the given request.
    fn generate(&self, request: &ImageRequest) -> GenerateFuture<'_>;

    /// One page of candidate images for the request, best first.
    ///
    /// Backends that cannot page offer their single answer on page 1 and
    /// nothing after it.
    fn candidates(&self, request: &ImageRequest, page: Page) -> CandidatesFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            if page.number > 1 || page.size == 0 {
                return Ok(Vec::new());
            }
            Ok(self.generate(&request).await?.into_iter().collect())
        })
    }
}

/// Check that a backend answer is something a client can load.
///
/// Accepts absolute `http` and `https` URLs with a host, and `data` URLs
/// with a non-empty payload.
#[must_use]
pub fn is_valid_locator(locator: &str) -> bool {
    if locator.trim().is_empty() {
        return false;
    }
    reqwest::Url::parse(locator).is_ok_and(|url| match url.scheme() {
        "http" | "https" => url.host_str().is_some(),
        "data" => url
            .path()
            .split_once(',')
            .is_some_and(|(_, payload)| !payload.is_empty()),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<&'static str>);

    impl ImageService for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn generate(&self, _request: &ImageRequest) -> GenerateFuture<'_> {
            let answer = self.0.map(str::to_string);
            Box::pin(async move { Ok(answer) })
        }
    }

    #[test]
    fn query_joins_text_and_tags() {
        let request = ImageRequest::new("sunny beach").with_tags(["summer", "sea"]);
        assert_eq!(request.query(), "sunny beach summer sea");
    }

    #[test]
    fn query_without_tags_is_text() {
        assert_eq!(ImageRequest::new("テスト").query(), "テスト");
    }

    #[test]
    fn tags_default_when_missing_in_json() {
        let request: ImageRequest = serde_json::from_str(r#"{"text":"a cat"}"#).unwrap();
        assert_eq!(request.text, "a cat");
        assert!(request.tags.is_empty());
    }

    #[test]
    fn locator_validation() {
        assert!(is_valid_locator("http://example.com/ok.jpg"));
        assert!(is_valid_locator("https://cdn.example.com/photo/abc.jpg"));
        assert!(is_valid_locator("data:image/png;base64,iVBORw0KGgo="));
        assert!(!is_valid_locator(""));
        assert!(!is_valid_locator("   "));
        assert!(!is_valid_locator("ok.jpg"));
        assert!(!is_valid_locator("ftp://example.com/ok.jpg"));
    }

    #[test]
    fn data_locator_needs_payload() {
        assert!(!is_valid_locator("data:"));
        assert!(!is_valid_locator("data:image/png;base64,"));
        assert!(!is_valid_locator("data:image/png"));
        assert!(is_valid_locator("data:,x"));
    }

    #[tokio::test]
    async fn default_candidates_offer_single_answer_on_first_page() {
        let service = Fixed(Some("http://example.com/a.jpg"));
        let request = ImageRequest::new("test");

        let first = service.candidates(&request, Page::first(10)).await.unwrap();
        assert_eq!(first, ["http://example.com/a.jpg"]);

        let second = Page {
            number: 2,
            size: 10,
        };
        let rest = service.candidates(&request, second).await.unwrap();
        assert!(rest.is_empty());
    }

    #[tokio::test]
    async fn default_candidates_empty_on_miss() {
        let candidates = Fixed(None)
            .candidates(&ImageRequest::new("test"), Page::first(10))
            .await
            .unwrap();
        assert!(candidates.is_empty());
    }
}
