//! Shared stubs for the integration tests

#![allow(dead_code)]

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use wazo_rest_client::{
    ClientError, ClientResult, Connection, DiscoveryResult, EntryPoints, HttpError, HttpRequest,
    HttpResponse, PluginDiscovery, SessionSettings, Transport, TransportError,
};

/// What the stub connection answers to every request
#[derive(Debug, Clone)]
pub enum Reply {
    /// A response with this status and body
    Status(u16, &'static str),
    /// An HTTP error raised by the transport itself
    HttpError(u16),
    /// No answer at all
    Unreachable,
}

#[derive(Debug)]
struct Recorded {
    reply: Reply,
    opened: Vec<SessionSettings>,
    requests: Vec<HttpRequest>,
}

/// Transport recording every session it opens and every request it sends
#[derive(Debug, Clone)]
pub struct RecordingTransport {
    state: Arc<Mutex<Recorded>>,
}

impl RecordingTransport {
    pub fn new(reply: Reply) -> Self {
        Self {
            state: Arc::new(Mutex::new(Recorded {
                reply,
                opened: Vec::new(),
                requests: Vec::new(),
            })),
        }
    }

    pub fn ok() -> Self {
        Self::new(Reply::Status(200, "{}"))
    }

    pub fn set_reply(&self, reply: Reply) {
        self.state.lock().reply = reply;
    }

    pub fn opened(&self) -> Vec<SessionSettings> {
        self.state.lock().opened.clone()
    }

    pub fn last_opened(&self) -> SessionSettings {
        self.state.lock().opened.last().cloned().expect("no session opened")
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().requests.clone()
    }
}

impl Transport for RecordingTransport {
    fn open(&self, settings: &SessionSettings) -> ClientResult<Box<dyn Connection>> {
        self.state.lock().opened.push(settings.clone());
        Ok(Box::new(RecordingConnection {
            state: Arc::clone(&self.state),
        }))
    }
}

#[derive(Debug)]
struct RecordingConnection {
    state: Arc<Mutex<Recorded>>,
}

impl Connection for RecordingConnection {
    fn send(&self, request: HttpRequest) -> ClientResult<HttpResponse> {
        let mut state = self.state.lock();
        let url = request.url.clone();
        state.requests.push(request);
        match state.reply.clone() {
            Reply::Status(code, body) => Ok(HttpResponse::new(
                StatusCode::from_u16(code).expect("valid status"),
                url,
                HeaderMap::new(),
                Bytes::from_static(body.as_bytes()),
            )),
            Reply::HttpError(code) => {
                let status = StatusCode::from_u16(code).expect("valid status");
                Err(ClientError::Http(HttpError {
                    status,
                    reason: status.canonical_reason().unwrap_or_default().to_string(),
                    url,
                    body: Bytes::new(),
                }))
            }
            Reply::Unreachable => Err(TransportError::Connection("connection refused".into()).into()),
        }
    }
}

/// Discovery backend counting how often it is queried
#[derive(Debug, Default)]
pub struct CountingDiscovery {
    pub entry_points: EntryPoints,
    pub calls: AtomicUsize,
    pub delay: Option<Duration>,
}

impl CountingDiscovery {
    pub fn new(entry_points: EntryPoints) -> Self {
        Self {
            entry_points,
            ..Default::default()
        }
    }

    pub fn slow(entry_points: EntryPoints, delay: Duration) -> Self {
        Self {
            entry_points,
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PluginDiscovery for CountingDiscovery {
    fn discover(&self, namespace: &str) -> DiscoveryResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.entry_points.discover(namespace)
    }
}

/// Discovery backend that always fails
#[derive(Debug, Default)]
pub struct FailingDiscovery;

impl PluginDiscovery for FailingDiscovery {
    fn discover(&self, _namespace: &str) -> DiscoveryResult {
        Err("registry unavailable".into())
    }
}

/// Layer counting warn-level events
#[derive(Debug, Clone, Default)]
pub struct WarnCounter {
    count: Arc<AtomicUsize>,
}

impl WarnCounter {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Run `f` with a subscriber counting warnings, returning the count
pub fn count_warnings<T>(f: impl FnOnce() -> T) -> (T, usize) {
    use tracing_subscriber::layer::SubscriberExt;

    let counter = WarnCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, counter.count())
}
