//! Integration tests using a mock transport.
//!
//! We script transport results upfront and capture every message handed to it.
//! No real mail server required.

use std::{
    collections::VecDeque,
    fmt,
    sync::{Arc, Mutex},
    time::Duration,
};

use simple_mailer::{
    Attachment, ComposedMessage, Error, MailConfig, Mailer, Priority, SendOutcome, Transport,
    mailer::CANCELLED,
};

// ══════════════════════════════════════════════════════════════════════════════
// Mock Error Type
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct MockError(String);

impl MockError {
    pub fn new(msg: impl Into<String>) -> Self {
        MockError(msg.into())
    }
}

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MockError: {}", self.0)
    }
}

impl std::error::Error for MockError {}

// ══════════════════════════════════════════════════════════════════════════════
// MockTransport - our fake Transport impl
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct MockState {
    /// Queued results, one per send. An empty queue means success.
    results: VecDeque<Result<(), MockError>>,
    /// Every message the mailer handed over
    sent: Vec<ComposedMessage>,
    /// How often close() was called
    closes: usize,
    /// If set, async sends never complete
    hang: bool,
}

/// A transport that records messages instead of sending them.
///
/// Clones share their state, so a test can keep one to inspect what happened
/// after the mailer (and its copy) is gone.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next send fail with `err`.
    pub fn inject_error(&self, err: MockError) -> &Self {
        self.state.lock().unwrap().results.push_back(Err(err));
        self
    }

    /// Make async sends hang until cancelled.
    pub fn hang(&self) -> &Self {
        self.state.lock().unwrap().hang = true;
        self
    }

    pub fn sent(&self) -> Vec<ComposedMessage> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn closes(&self) -> usize {
        self.state.lock().unwrap().closes
    }

    fn record(&self, message: &ComposedMessage) -> (bool, Result<(), MockError>) {
        let mut state = self.state.lock().unwrap();
        state.sent.push(message.clone());
        let result = state.results.pop_front().unwrap_or(Ok(()));
        (state.hang, result)
    }
}

impl Transport for MockTransport {
    type Error = MockError;

    fn send(&mut self, message: &ComposedMessage) -> Result<(), Self::Error> {
        self.record(message).1
    }

    async fn send_async(&mut self, message: &ComposedMessage) -> Result<(), Self::Error> {
        let (hang, result) = self.record(message);
        if hang {
            std::future::pending::<()>().await;
        }
        // give the runtime a chance to run something else, like a real socket would
        tokio::task::yield_now().await;
        result
    }

    fn close(&mut self) {
        self.state.lock().unwrap().closes += 1;
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Helper functions
// ══════════════════════════════════════════════════════════════════════════════

fn config() -> MailConfig {
    MailConfig::new("sender@example.com", "secret", "mail.example.com")
}

fn hello(recipients: &str) -> MailConfig {
    config()
        .with_recipients(recipients)
        .with_subject("Hi")
        .with_body("<p>hi</p>")
}

/// Collects whatever the completion callback is called with.
#[derive(Clone, Default)]
struct Callbacks(Arc<Mutex<Vec<String>>>);

impl Callbacks {
    fn hook(&self) -> impl FnOnce(String) + Send + 'static {
        let calls = self.0.clone();
        move |msg| calls.lock().unwrap().push(msg)
    }

    fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Tests: Synchronous Send
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_send_two_recipients() {
    let mock = MockTransport::new();
    Mailer::new(hello("a@x.com,b@x.com"), mock.clone())
        .send()
        .expect("send() should succeed");

    let sent = mock.sent();
    assert_eq!(sent.len(), 1);
    let message = &sent[0];
    assert_eq!(message.to(), ["a@x.com", "b@x.com"]);
    assert_eq!(message.subject(), "Hi");
    assert_eq!(message.body(), "<p>hi</p>");
    assert!(message.is_html());
    assert_eq!(message.priority(), Priority::High);
    assert_eq!(message.from().name(), "sender@example.com");
    assert_eq!(mock.closes(), 1);
}

#[test]
fn test_send_empty_recipients_is_noop() {
    let mock = MockTransport::new();
    Mailer::new(config().with_recipients(""), mock.clone())
        .send()
        .expect("an empty send is not an error");

    assert!(mock.sent().is_empty());
}

#[test]
fn test_send_keeps_cc_and_bcc() {
    let mock = MockTransport::new();
    let config = hello("a@x.com")
        .with_cc("c1@x.com")
        .with_cc("c2@x.com")
        .with_bcc("b1@x.com");
    Mailer::new(config, mock.clone()).send().unwrap();

    let message = &mock.sent()[0];
    assert_eq!(message.cc(), ["c1@x.com", "c2@x.com"]);
    assert_eq!(message.bcc(), ["b1@x.com"]);
}

#[test]
fn test_send_filters_absent_attachments() {
    let first = Attachment::new("first.txt", b"1".to_vec());
    let second = Attachment::new("second.csv", b"2".to_vec()).with_content_type("text/csv");
    let config = hello("a@x.com").with_attachments([
        None,
        Some(first.clone()),
        None,
        None,
        Some(second.clone()),
    ]);

    let mock = MockTransport::new();
    Mailer::new(config, mock.clone()).send().unwrap();

    let message = &mock.sent()[0];
    assert_eq!(message.attachments(), [first, second]);
}

#[test]
fn test_send_propagates_transport_error() {
    let mock = MockTransport::new();
    mock.inject_error(MockError::new("connection refused"));

    let err = Mailer::new(hello("a@x.com"), mock.clone())
        .send()
        .expect_err("send() should fail");
    assert!(matches!(err, Error::TransportError(_)));
    assert!(err.to_string().contains("connection refused"));
    // released on the error path too
    assert_eq!(mock.closes(), 1);
}

#[test]
fn test_dropped_mailer_releases_once() {
    let mock = MockTransport::new();
    let mut mailer = Mailer::new(hello("a@x.com"), mock.clone());
    assert!(mailer.message().is_some());
    mailer.release();
    mailer.release();
    drop(mailer);

    assert!(mock.sent().is_empty());
    assert_eq!(mock.closes(), 1);
}

#[test]
fn test_send_async_without_runtime() {
    let callbacks = Callbacks::default();
    let mock = MockTransport::new();
    let err = Mailer::new(hello("a@x.com"), mock.clone())
        .send_async("job-1", callbacks.hook())
        .expect_err("there is no runtime to spawn on");

    assert!(matches!(err, Error::NoRuntime));
    assert!(mock.sent().is_empty());
    assert!(callbacks.calls().is_empty());
    assert_eq!(mock.closes(), 1);
}

// ══════════════════════════════════════════════════════════════════════════════
// Tests: Asynchronous Send
// ══════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_send_async_delivered_passes_token_through() {
    let callbacks = Callbacks::default();
    let mock = MockTransport::new();
    let handle = Mailer::new(hello("a@x.com,b@x.com"), mock.clone())
        .send_async("job-7", callbacks.hook())
        .unwrap()
        .expect("there is something to send");

    assert_eq!(handle.outcome().await, SendOutcome::Delivered);
    assert_eq!(callbacks.calls(), ["job-7"]);
    assert_eq!(mock.sent()[0].to(), ["a@x.com", "b@x.com"]);
    assert_eq!(mock.closes(), 1);
}

#[tokio::test]
async fn test_send_async_releases_before_callback() {
    let mock = MockTransport::new();
    let seen = Arc::new(Mutex::new(None));
    let (closes, seen_in_callback) = (mock.clone(), seen.clone());
    let handle = Mailer::new(hello("a@x.com"), mock.clone())
        .send_async("job-8", move |_| {
            *seen_in_callback.lock().unwrap() = Some(closes.closes());
        })
        .unwrap()
        .expect("there is something to send");

    assert_eq!(handle.outcome().await, SendOutcome::Delivered);
    assert_eq!(*seen.lock().unwrap(), Some(1));
}

#[tokio::test]
async fn test_send_async_failure_reports_token_and_detail() {
    let callbacks = Callbacks::default();
    let mock = MockTransport::new();
    mock.inject_error(MockError::new("connection refused"));

    let handle = Mailer::new(hello("a@x.com"), mock.clone())
        .send_async("job-42", callbacks.hook())
        .unwrap()
        .unwrap();

    let outcome = handle.outcome().await;
    assert!(matches!(&outcome, SendOutcome::Failed(detail) if detail.contains("connection refused")));

    let calls = callbacks.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].contains("job-42"));
    assert!(calls[0].contains("connection refused"));
    assert_eq!(mock.closes(), 1);
}

#[tokio::test]
async fn test_send_async_cancelled() {
    let callbacks = Callbacks::default();
    let mock = MockTransport::new();
    mock.hang();

    let handle = Mailer::new(hello("a@x.com"), mock.clone())
        .send_async("job-9", callbacks.hook())
        .unwrap()
        .unwrap();

    // let the send reach the transport before pulling the plug
    while mock.sent().is_empty() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    handle.cancel();

    assert_eq!(handle.outcome().await, SendOutcome::Cancelled);
    assert_eq!(callbacks.calls(), [CANCELLED]);
    // the aborted send still released everything
    assert_eq!(mock.closes(), 1);
}

#[tokio::test]
async fn test_send_async_empty_recipients_never_calls_back() {
    let callbacks = Callbacks::default();
    let mock = MockTransport::new();
    let handle = Mailer::new(config(), mock.clone())
        .send_async("job-0", callbacks.hook())
        .unwrap();

    assert!(handle.is_none());
    tokio::task::yield_now().await;
    assert!(mock.sent().is_empty());
    assert!(callbacks.calls().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_send_async_fire_and_forget() {
    let (tx, rx) = tokio::sync::oneshot::channel();
    let mock = MockTransport::new();
    let handle = Mailer::new(hello("a@x.com"), mock.clone())
        .send_async("job-5", move |msg| {
            let _ = tx.send(msg);
        })
        .unwrap()
        .unwrap();
    // nobody waits on the handle, the callback still fires
    drop(handle);

    let msg = tokio::time::timeout(Duration::from_secs(5), rx)
        .await
        .expect("callback should fire")
        .unwrap();
    assert_eq!(msg, "job-5");
    assert_eq!(mock.sent().len(), 1);
}
