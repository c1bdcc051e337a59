//! Topic-based callback fan-out
//!
//! Delivery is synchronous and in subscription order. A failing or panicking
//! callback is logged and never prevents delivery to the others. Panics are
//! only caught when the final binary is built with `panic = "unwind"`.

use parking_lot::RwLock;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error};

/// Error type callbacks may return
pub type CallbackError = Box<dyn Error + Send + Sync>;

/// A subscriber callback
pub type Callback = Arc<dyn Fn(Option<&Value>) -> Result<(), CallbackError> + Send + Sync>;

/// Publish/subscribe hub keyed by topic
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use wazo_rest_client::Pubsub;
///
/// let pubsub = Pubsub::new();
/// let received = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&received);
/// pubsub.subscribe("token_renewed", move |_| {
///     counter.fetch_add(1, Ordering::SeqCst);
///     Ok(())
/// });
///
/// pubsub.publish("token_renewed", Some(&serde_json::json!({"token": "abc"})));
/// pubsub.publish("nobody_listens", None);
/// assert_eq!(received.load(Ordering::SeqCst), 1);
/// ```
#[derive(Default)]
pub struct Pubsub {
    subscribers: RwLock<HashMap<String, Vec<Callback>>>,
}

impl Pubsub {
    /// Create a hub without subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `callback` to the subscribers of `topic`
    pub fn subscribe<F>(&self, topic: impl Into<String>, callback: F)
    where
        F: Fn(Option<&Value>) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        let topic = topic.into();
        debug!("Subscribing callback to topic \"{}\"", topic);
        self.subscribers
            .write()
            .entry(topic)
            .or_default()
            .push(Arc::new(callback));
    }

    /// Deliver `message` to every subscriber of `topic`
    pub fn publish(&self, topic: &str, message: Option<&Value>) {
        debug!("Publishing to topic \"{}\": {:?}", topic, message);
        // Callbacks may subscribe; never hold the lock while running them.
        let callbacks = self
            .subscribers
            .read()
            .get(topic)
            .cloned()
            .unwrap_or_default();
        for callback in &callbacks {
            Self::publish_one(callback.as_ref(), message);
        }
    }

    /// Deliver `message` to a single callback, logging its failure or panic
    pub fn publish_one<F>(callback: &F, message: Option<&Value>)
    where
        F: Fn(Option<&Value>) -> Result<(), CallbackError> + ?Sized,
    {
        match panic::catch_unwind(AssertUnwindSafe(|| callback(message))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Subscriber callback failed: {}", e),
            Err(payload) => error!("Subscriber callback panicked: {}", panic_message(&*payload)),
        }
    }

    /// Number of callbacks subscribed to `topic`
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.subscribers.read().get(topic).map_or(0, Vec::len)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

impl fmt::Debug for Pubsub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscribers = self.subscribers.read();
        let mut topics: Vec<&str> = subscribers.keys().map(String::as_str).collect();
        topics.sort_unstable();
        f.debug_struct("Pubsub").field("topics", &topics).finish()
    }
}
