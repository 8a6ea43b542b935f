//! Ordered fallback chain over image backends.
//!
//! Backends are awaited one at a time in the order given at construction.
//! The first valid locator wins and nothing after it is called. A backend
//! error aborts the chain; a timeout or an unusable answer counts as a miss.

use std::future::Future;
use std::time::Duration;

use crate::error::ServiceError;
use crate::ports::image_service::{
    is_valid_locator, CandidatesFuture, CandidatesResult, GenerateFuture, ImageRequest,
    ImageService, Page,
};

/// Tries each backend in priority order and returns the first hit.
pub struct FallbackImageService {
    backends: Vec<Box<dyn ImageService>>,
    timeout: Option<Duration>,
}

impl FallbackImageService {
    /// Create a chain from backends in priority order.
    #[must_use]
    pub fn new(backends: Vec<Box<dyn ImageService>>) -> Self {
        Self {
            backends,
            timeout: None,
        }
    }

    /// Bound every backend call; a call that runs past the limit is a miss.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Number of backends in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Whether the chain has no backends.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Backend names in priority order.
    #[must_use]
    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Return the first locator produced by the chain.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NoImageAvailable`] when every backend misses,
    /// or the first hard failure raised by a backend.
    pub async fn generate(&self, request: &ImageRequest) -> Result<String, ServiceError> {
        for (index, backend) in self.backends.iter().enumerate() {
            let name = backend.name();
            let answer = self
                .bounded(name, backend.generate(request))
                .await
                .map(Option::flatten);
            match answer {
                Ok(Some(locator)) if is_valid_locator(&locator) => {
                    tracing::debug!(backend = name, index, "image backend hit");
                    return Ok(locator);
                }
                Ok(Some(locator)) => {
                    tracing::warn!(
                        backend = name,
                        index,
                        locator = %locator,
                        "image backend returned an unusable locator"
                    );
                }
                Ok(None) => {
                    tracing::debug!(backend = name, index, "image backend miss");
                }
                Err(e) => {
                    tracing::warn!(backend = name, index, error = %e, "image backend failed");
                    return Err(e);
                }
            }
        }
        Err(ServiceError::NoImageAvailable {
            tried: self.backends.len(),
        })
    }

    /// Shorthand for a request without tags.
    ///
    /// # Errors
    ///
    /// See [`FallbackImageService::generate`].
    pub async fn generate_text(&self, text: &str) -> Result<String, ServiceError> {
        self.generate(&ImageRequest::new(text)).await
    }

    /// One page of candidates from the first backend that has any for it.
    ///
    /// Unusable locators are dropped. An empty list means no backend has
    /// candidates on this page.
    ///
    /// # Errors
    ///
    /// Returns the first hard failure raised by a backend.
    pub async fn candidates(&self, request: &ImageRequest, page: Page) -> CandidatesResult {
        for (index, backend) in self.backends.iter().enumerate() {
            let name = backend.name();
            let found = self
                .bounded(name, backend.candidates(request, page))
                .await
                .inspect_err(|e| {
                    tracing::warn!(backend = name, index, error = %e, "image backend failed");
                })?
                .unwrap_or_default();
            let usable: Vec<String> = found.into_iter().filter(|l| is_valid_locator(l)).collect();
            if !usable.is_empty() {
                tracing::debug!(
                    backend = name,
                    index,
                    count = usable.len(),
                    "candidates found"
                );
                return Ok(usable);
            }
        }
        Ok(Vec::new())
    }

    /// Await one backend call, turning an elapsed timeout into a miss.
    async fn bounded<T>(
        &self,
        backend: &str,
        call: impl Future<Output = Result<T, ServiceError>>,
    ) -> Result<Option<T>, ServiceError> {
        let Some(limit) = self.timeout else {
            return call.await.map(Some);
        };
        if let Ok(result) = tokio::time::timeout(limit, call).await {
            result.map(Some)
        } else {
            tracing::warn!(
                backend,
                timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                "image backend timed out"
            );
            Ok(None)
        }
    }
}

/// A chain is itself a backend; exhaustion maps to a miss so chains nest.
impl ImageService for FallbackImageService {
    fn name(&self) -> &str {
        "fallback"
    }

    fn generate(&self, request: &ImageRequest) -> GenerateFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            match FallbackImageService::generate(self, &request).await {
                Ok(locator) => Ok(Some(locator)),
                Err(ServiceError::NoImageAvailable { .. }) => Ok(None),
                Err(e) => Err(e),
            }
        })
    }

    fn candidates(&self, request: &ImageRequest, page: Page) -> CandidatesFuture<'_> {
        let request = request.clone();
        Box::pin(async move { FallbackImageService::candidates(self, &request, page).await })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::adapters::dummy::DummyImageService;
    use crate::adapters::placeholder::PlaceholderImageService;

    const OK_URL: &str = "http://example.com/ok.jpg";

    type CallLog = Arc<Mutex<Vec<String>>>;

    /// Backend that logs the start and end of each call and then answers with a fixed outcome.
    struct Traced {
        name: &'static str,
        answer: Option<&'static str>,
        fail: bool,
        delay: Duration,
        log: CallLog,
        calls: Arc<AtomicUsize>,
    }

    impl Traced {
        fn new(name: &'static str, answer: Option<&'static str>, log: &CallLog) -> Self {
            Self {
                name,
                answer,
                fail: false,
                delay: Duration::from_millis(5),
                log: Arc::clone(log),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing(mut self) -> Self {
            self.fail = true;
            self
        }

        fn slow(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    impl ImageService for Traced {
        fn name(&self) -> &str {
            self.name
        }

        fn generate(&self, _request: &ImageRequest) -> GenerateFuture<'_> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                let name = self.name;
                self.log.lock().unwrap().push(format!("start:{name}"));
                tokio::time::sleep(self.delay).await;
                self.log.lock().unwrap().push(format!("end:{name}"));
                if self.fail {
                    return Err(ServiceError::Api {
                        status: 503,
                        message: "down".into(),
                    });
                }
                Ok(self.answer.map(str::to_string))
            })
        }
    }

    /// Backend with a fixed list of candidates per page.
    struct Paged(Vec<Vec<&'static str>>);

    impl ImageService for Paged {
        fn name(&self) -> &str {
            "paged"
        }

        fn generate(&self, _request: &ImageRequest) -> GenerateFuture<'_> {
            let first = self.0.first().and_then(|p| p.first().copied());
            Box::pin(async move { Ok(first.map(str::to_string)) })
        }

        fn candidates(&self, _request: &ImageRequest, page: Page) -> CandidatesFuture<'_> {
            let index = usize::try_from(page.number - 1).unwrap();
            let urls = self.0.get(index).cloned().unwrap_or_default();
            Box::pin(async move {
                let urls = urls.into_iter().map(str::to_string).collect();
                Ok(urls)
            })
        }
    }

    fn log() -> CallLog {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn placeholder() -> Box<dyn ImageService> {
        Box::new(PlaceholderImageService::new(OK_URL))
    }

    fn page(number: u32) -> Page {
        Page { number, size: 10 }
    }

    #[tokio::test]
    async fn fallback_returns_first_available() {
        let service = FallbackImageService::new(vec![Box::new(DummyImageService), placeholder()]);
        let url = service.generate_text("test").await.unwrap();
        assert!(url.ends_with("ok.jpg"));
    }

    #[tokio::test]
    async fn later_backends_not_invoked_after_hit() {
        let log = log();
        let first = Traced::new("first", Some("http://example.com/first.jpg"), &log);
        let second = Traced::new("second", Some("http://example.com/second.jpg"), &log);
        let second_calls = Arc::clone(&second.calls);

        let service = FallbackImageService::new(vec![Box::new(first), Box::new(second)]);
        let url = service.generate_text("test").await.unwrap();

        assert_eq!(url, "http://example.com/first.jpg");
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn leading_misses_do_not_change_result() {
        let bare = FallbackImageService::new(vec![placeholder()]);
        let padded = FallbackImageService::new(vec![
            Box::new(DummyImageService),
            Box::new(DummyImageService),
            Box::new(DummyImageService),
            placeholder(),
        ]);

        let request = ImageRequest::new("test").with_tags(["beach"]);
        let expected = bare.generate(&request).await.unwrap();
        assert_eq!(padded.generate(&request).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn all_misses_exhaust_the_chain() {
        let service = FallbackImageService::new(vec![
            Box::new(DummyImageService),
            Box::new(DummyImageService),
        ]);
        let err = service.generate_text("test").await.unwrap_err();
        assert!(matches!(err, ServiceError::NoImageAvailable { tried: 2 }));
    }

    #[tokio::test]
    async fn empty_chain_is_exhausted() {
        let service = FallbackImageService::new(Vec::new());
        assert!(service.is_empty());
        let err = service.generate_text("test").await.unwrap_err();
        assert!(matches!(err, ServiceError::NoImageAvailable { tried: 0 }));
    }

    #[tokio::test]
    async fn repeated_calls_are_deterministic() {
        let service = FallbackImageService::new(vec![Box::new(DummyImageService), placeholder()]);
        let first = service.generate_text("same").await.unwrap();
        for _ in 0..5 {
            assert_eq!(service.generate_text("same").await.unwrap(), first);
        }
    }

    #[tokio::test]
    async fn backends_run_one_after_another() {
        let log = log();
        let service = FallbackImageService::new(vec![
            Box::new(Traced::new("a", None, &log)),
            Box::new(Traced::new("b", None, &log)),
            Box::new(Traced::new("c", Some("http://example.com/c.jpg"), &log)),
        ]);

        service.generate_text("test").await.unwrap();

        let calls = log.lock().unwrap().clone();
        assert_eq!(
            calls,
            ["start:a", "end:a", "start:b", "end:b", "start:c", "end:c"]
        );
    }

    #[tokio::test]
    async fn hard_failure_stops_the_chain() {
        let log = log();
        let broken = Traced::new("broken", None, &log).failing();
        let next = Traced::new("next", Some(OK_URL), &log);
        let next_calls = Arc::clone(&next.calls);

        let service = FallbackImageService::new(vec![Box::new(broken), Box::new(next)]);
        let err = service.generate_text("test").await.unwrap_err();

        assert!(matches!(err, ServiceError::Api { status: 503, .. }));
        assert_eq!(next_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn timeout_counts_as_miss() {
        let log = log();
        let slow = Traced::new("slow", Some("http://example.com/slow.jpg"), &log)
            .slow(Duration::from_secs(5));
        let service = FallbackImageService::new(vec![Box::new(slow), placeholder()])
            .with_timeout(Duration::from_millis(20));

        let url = service.generate_text("test").await.unwrap();
        assert_eq!(url, OK_URL);
    }

    #[tokio::test]
    async fn unusable_locator_counts_as_miss() {
        let service = FallbackImageService::new(vec![
            Box::new(PlaceholderImageService::new("")),
            Box::new(PlaceholderImageService::new("not a url")),
            Box::new(PlaceholderImageService::new("data:")),
            placeholder(),
        ]);
        assert_eq!(service.generate_text("test").await.unwrap(), OK_URL);
    }

    #[tokio::test]
    async fn nested_chain_maps_exhaustion_to_miss() {
        let inner = FallbackImageService::new(vec![Box::new(DummyImageService)]);
        let request = ImageRequest::new("test");
        let result = ImageService::generate(&inner, &request).await.unwrap();
        assert!(result.is_none());

        let outer = FallbackImageService::new(vec![Box::new(inner), placeholder()]);
        assert_eq!(outer.backend_names(), ["fallback", "placeholder"]);
        let url = outer.generate_text("test").await.unwrap();
        assert!(url.ends_with("ok.jpg"));
    }

    #[tokio::test]
    async fn concurrent_calls_share_the_chain() {
        let service = Arc::new(FallbackImageService::new(vec![
            Box::new(DummyImageService),
            placeholder(),
        ]));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    service.generate_text(&format!("phrase {i}")).await
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), OK_URL);
        }
    }

    #[tokio::test]
    async fn candidates_come_from_first_backend_with_a_page() {
        let paged = Paged(vec![
            vec![
                "http://img.test/1.jpg",
                "not a url",
                "http://img.test/2.jpg",
            ],
            vec!["http://img.test/3.jpg"],
        ]);
        let service = FallbackImageService::new(vec![
            Box::new(DummyImageService),
            Box::new(paged),
            placeholder(),
        ]);
        let request = ImageRequest::new("test");

        let first = service.candidates(&request, page(1)).await.unwrap();
        assert_eq!(first, ["http://img.test/1.jpg", "http://img.test/2.jpg"]);

        let second = service.candidates(&request, page(2)).await.unwrap();
        assert_eq!(second, ["http://img.test/3.jpg"]);

        let third = service.candidates(&request, page(3)).await.unwrap();
        assert!(third.is_empty());
    }

    #[tokio::test]
    async fn candidates_fall_back_to_single_answers() {
        let service = FallbackImageService::new(vec![Box::new(DummyImageService), placeholder()]);
        let request = ImageRequest::new("test");

        let first = service.candidates(&request, page(1)).await.unwrap();
        assert_eq!(first, [OK_URL]);
        let second = service.candidates(&request, page(2)).await.unwrap();
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn candidates_stop_on_hard_failure() {
        let log = log();
        let broken = Traced::new("broken", None, &log).failing();
        let service = FallbackImageService::new(vec![Box::new(broken), placeholder()]);

        let err = service
            .candidates(&ImageRequest::new("test"), page(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Api { status: 503, .. }));
    }
}
