//! Fetch module.
//!
//! Downloads a reference dataset over HTTP, retrying failed attempts with
//! exponential backoff.

mod ureq_client;

pub use ureq_client::{UreqClient, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};

use std::io;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::error::{FetchErrorKind, Result, SuffixError};
use crate::types::RetryPolicy;

/// Status code of a successful fetch
const HTTP_OK: u16 = 200;

/// Response of a single GET attempt, body fully buffered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// HTTP client interface.
pub trait HttpClient: Send + Sync {
    /// Perform one GET request.
    ///
    /// Non-200 statuses are returned as responses. Transport faults
    /// (refused, timeout, DNS) are returned as errors.
    fn get(&self, url: &str) -> io::Result<HttpResponse>;
}

/// Blocking wait between attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Sleeper that blocks the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// A failed attempt, kept until retries run out
struct AttemptFailure {
    kind: FetchErrorKind,
    status: Option<u16>,
    message: String,
}

impl AttemptFailure {
    fn into_error(self, url: &str, attempts: u32) -> SuffixError {
        SuffixError::FetchExhausted {
            kind: self.kind,
            url: url.to_string(),
            status: self.status,
            attempts,
            message: self.message,
        }
    }
}

fn classify(outcome: io::Result<HttpResponse>) -> std::result::Result<Vec<u8>, AttemptFailure> {
    match outcome {
        Ok(response) if response.status == HTTP_OK => Ok(response.body),
        Ok(response) => Err(AttemptFailure {
            kind: FetchErrorKind::Status,
            status: Some(response.status),
            message: format!("HTTP status {}", response.status),
        }),
        Err(e) => Err(AttemptFailure {
            kind: FetchErrorKind::Transport,
            status: None,
            message: e.to_string(),
        }),
    }
}

/// Fetcher with retry and exponential backoff.
#[derive(Clone)]
pub struct Fetcher {
    client: Arc<dyn HttpClient>,
    sleeper: Arc<dyn Sleeper>,
}

impl Fetcher {
    /// Create a fetcher using ureq and real sleeps.
    pub fn new() -> Self {
        Self::with_client(Arc::new(UreqClient::new()))
    }

    /// Create a fetcher with a custom HTTP client.
    pub fn with_client(client: Arc<dyn HttpClient>) -> Self {
        Self {
            client,
            sleeper: Arc::new(ThreadSleeper),
        }
    }

    /// Replace the sleeper used between attempts.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Fetch `url`, retrying until a 200 response or the policy runs out.
    ///
    /// Blocks the calling thread for every backoff wait.
    pub fn fetch(&self, url: &str, policy: &RetryPolicy) -> Result<Vec<u8>> {
        policy.validate()?;

        let mut schedule = policy.backoff_schedule();
        let mut attempts = 0;

        loop {
            attempts += 1;
            let failure = match classify(self.client.get(url)) {
                Ok(body) => {
                    debug!("Fetched {} ({} bytes, attempt {})", url, body.len(), attempts);
                    return Ok(body);
                }
                Err(failure) => failure,
            };

            let Some(backoff) = schedule.next() else {
                return Err(failure.into_error(url, attempts));
            };

            warn!(
                "Fetch of {} failed ({}), retrying in {:?} ({} retries left after this one)",
                url,
                failure.message,
                backoff,
                schedule.remaining()
            );
            self.sleeper.sleep(backoff);
        }
    }

    /// Async variant of [`Fetcher::fetch`].
    ///
    /// Each attempt runs on the blocking pool and waits use the tokio timer,
    /// so the configured sleeper is not consulted.
    #[cfg(feature = "async")]
    pub async fn fetch_async(&self, url: &str, policy: &RetryPolicy) -> Result<Vec<u8>> {
        policy.validate()?;

        let mut schedule = policy.backoff_schedule();
        let mut attempts = 0;

        loop {
            attempts += 1;
            let client = self.client.clone();
            let target = url.to_string();
            let outcome = tokio::task::spawn_blocking(move || client.get(&target))
                .await
                .unwrap_or_else(|e| Err(io::Error::other(e)));

            let failure = match classify(outcome) {
                Ok(body) => return Ok(body),
                Err(failure) => failure,
            };

            let Some(backoff) = schedule.next() else {
                return Err(failure.into_error(url, attempts));
            };

            warn!(
                "Fetch of {} failed ({}), retrying in {:?} ({} retries left after this one)",
                url,
                failure.message,
                backoff,
                schedule.remaining()
            );
            tokio::time::sleep(backoff).await;
        }
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;

    use parking_lot::Mutex;

    use super::*;

    /// Client that replays queued outcomes, then fails with a transport error.
    #[derive(Default)]
    pub struct ScriptedClient {
        outcomes: Mutex<VecDeque<io::Result<HttpResponse>>>,
        requests: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_status(&self, status: u16) {
            self.outcomes
                .lock()
                .push_back(Ok(HttpResponse::new(status, Vec::new())));
        }

        pub fn push_ok(&self, body: &str) {
            self.outcomes
                .lock()
                .push_back(Ok(HttpResponse::new(HTTP_OK, body.as_bytes())));
        }

        pub fn push_refused(&self) {
            self.outcomes.lock().push_back(Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().clone()
        }
    }

    impl HttpClient for ScriptedClient {
        fn get(&self, url: &str) -> io::Result<HttpResponse> {
            self.requests.lock().push(url.to_string());
            self.outcomes.lock().pop_front().unwrap_or_else(|| {
                Err(io::Error::new(io::ErrorKind::TimedOut, "script exhausted"))
            })
        }
    }

    /// Sleeper that records requested waits instead of blocking.
    #[derive(Default)]
    pub struct RecordingSleeper {
        waits: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        pub fn waits(&self) -> Vec<Duration> {
            self.waits.lock().clone()
        }
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) {
            self.waits.lock().push(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{RecordingSleeper, ScriptedClient};
    use super::*;

    const URL: &str = "https://publicsuffix.org/list/public_suffix_list.dat";

    fn fetcher(client: &Arc<ScriptedClient>, sleeper: &Arc<RecordingSleeper>) -> Fetcher {
        Fetcher::with_client(client.clone()).with_sleeper(sleeper.clone())
    }

    #[test]
    fn test_fetch_first_attempt_succeeds() {
        let client = Arc::new(ScriptedClient::new());
        let sleeper = Arc::new(RecordingSleeper::default());
        client.push_ok("com\n");

        let body = fetcher(&client, &sleeper)
            .fetch(URL, &RetryPolicy::default())
            .unwrap();

        assert_eq!(body, b"com\n");
        assert_eq!(client.requests().len(), 1);
        assert!(sleeper.waits().is_empty());
    }

    #[test]
    fn test_fetch_recovers_after_four_failures() {
        let client = Arc::new(ScriptedClient::new());
        let sleeper = Arc::new(RecordingSleeper::default());
        for _ in 0..4 {
            client.push_status(503);
        }
        client.push_ok("co.uk\n");

        let policy = RetryPolicy::new(5, Duration::from_millis(200), 1.5);
        let body = fetcher(&client, &sleeper).fetch(URL, &policy).unwrap();

        assert_eq!(body, b"co.uk\n");
        assert_eq!(client.requests().len(), 5);

        let waits = sleeper.waits();
        assert_eq!(waits.len(), 4);
        // initial_backoff * factor^3
        let last = waits.last().unwrap().as_secs_f64();
        assert!((last - 0.2 * 1.5f64.powi(3)).abs() < 1e-6, "got {}", last);
        let expected: Vec<Duration> = policy.backoff_schedule().take(4).collect();
        assert_eq!(waits, expected);
    }

    #[test]
    fn test_fetch_treats_transport_errors_like_bad_status() {
        let client = Arc::new(ScriptedClient::new());
        let sleeper = Arc::new(RecordingSleeper::default());
        client.push_refused();
        client.push_status(404);
        client.push_ok("net\n");

        let body = fetcher(&client, &sleeper)
            .fetch(URL, &RetryPolicy::default())
            .unwrap();

        assert_eq!(body, b"net\n");
        assert_eq!(sleeper.waits().len(), 2);
    }

    #[test]
    fn test_fetch_exhausted_with_status() {
        let client = Arc::new(ScriptedClient::new());
        let sleeper = Arc::new(RecordingSleeper::default());
        for _ in 0..4 {
            client.push_status(500);
        }

        let policy = RetryPolicy::new(3, Duration::from_millis(10), 2.0);
        let err = fetcher(&client, &sleeper).fetch(URL, &policy).unwrap_err();

        match err {
            SuffixError::FetchExhausted {
                kind,
                url,
                status,
                attempts,
                ..
            } => {
                assert_eq!(kind, FetchErrorKind::Status);
                assert_eq!(url, URL);
                assert_eq!(status, Some(500));
                assert_eq!(attempts, 4);
            }
            other => panic!("expected FetchExhausted, got {:?}", other),
        }
        assert_eq!(client.requests().len(), 4);
        assert_eq!(sleeper.waits().len(), 3);
    }

    #[test]
    fn test_fetch_exhausted_with_transport_error() {
        let client = Arc::new(ScriptedClient::new());
        let sleeper = Arc::new(RecordingSleeper::default());
        client.push_refused();

        let err = fetcher(&client, &sleeper)
            .fetch(URL, &RetryPolicy::no_retry())
            .unwrap_err();

        assert_eq!(err.fetch_kind(), Some(FetchErrorKind::Transport));
        assert!(sleeper.waits().is_empty());
    }

    #[test]
    fn test_fetch_huge_backoff_factor_does_not_panic() {
        let client = Arc::new(ScriptedClient::new());
        let sleeper = Arc::new(RecordingSleeper::default());
        client.push_status(503);
        client.push_ok("com\n");

        let policy = RetryPolicy::new(2, Duration::from_millis(200), 1e300);
        let body = fetcher(&client, &sleeper).fetch(URL, &policy).unwrap();

        assert_eq!(body, b"com\n");
        assert_eq!(sleeper.waits(), vec![Duration::from_millis(200)]);
    }

    #[test]
    fn test_fetch_many_retries_exhausts_without_panic() {
        let client = Arc::new(ScriptedClient::new());
        let sleeper = Arc::new(RecordingSleeper::default());

        // An empty script fails every attempt with a transport error
        let policy = RetryPolicy::new(200, Duration::from_millis(200), 1.5);
        let err = fetcher(&client, &sleeper).fetch(URL, &policy).unwrap_err();

        match err {
            SuffixError::FetchExhausted { kind, attempts, .. } => {
                assert_eq!(kind, FetchErrorKind::Transport);
                assert_eq!(attempts, 201);
            }
            other => panic!("expected FetchExhausted, got {:?}", other),
        }
        let waits = sleeper.waits();
        assert_eq!(waits, policy.backoff_schedule().collect::<Vec<_>>());
        assert_eq!(*waits.last().unwrap(), Duration::MAX);
    }

    #[test]
    fn test_fetch_rejects_invalid_policy_without_requesting() {
        let client = Arc::new(ScriptedClient::new());
        let sleeper = Arc::new(RecordingSleeper::default());

        let policy = RetryPolicy::default().with_backoff_factor(1.0);
        let err = fetcher(&client, &sleeper).fetch(URL, &policy).unwrap_err();

        assert!(matches!(err, SuffixError::InvalidRetryPolicy(_)));
        assert!(client.requests().is_empty());
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_async_fetch_retries() {
        let client = Arc::new(ScriptedClient::new());
        client.push_status(502);
        client.push_refused();
        client.push_ok("org\n");

        let policy = RetryPolicy::new(2, Duration::from_millis(1), 2.0);
        let body = Fetcher::with_client(client.clone())
            .fetch_async(URL, &policy)
            .await
            .unwrap();

        assert_eq!(body, b"org\n");
        assert_eq!(client.requests().len(), 3);
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_async_fetch_exhausted() {
        let client = Arc::new(ScriptedClient::new());
        client.push_status(502);
        client.push_status(502);

        let policy = RetryPolicy::new(1, Duration::from_millis(1), 2.0);
        let err = Fetcher::with_client(client.clone())
            .fetch_async(URL, &policy)
            .await
            .unwrap_err();

        match err {
            SuffixError::FetchExhausted {
                status, attempts, ..
            } => {
                assert_eq!(status, Some(502));
                assert_eq!(attempts, 2);
            }
            other => panic!("expected FetchExhausted, got {:?}", other),
        }
    }
}
