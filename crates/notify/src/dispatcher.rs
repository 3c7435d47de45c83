//! Delivers one alert to every configured channel.
//!
//! Channels are tried in configuration order. Individual channel failures
//! don't block other channels; the caller decides what a partial failure
//! means.

use crate::templating::AlertContext;
use crate::traits::{DispatchResult, Notifier};

/// Dispatches alerts to an ordered list of channels.
pub struct Dispatcher {
    channels: Vec<Box<dyn Notifier>>,
}

impl Dispatcher {
    pub fn new(channels: Vec<Box<dyn Notifier>>) -> Self {
        Self { channels }
    }

    /// Create an empty dispatcher.
    pub fn empty() -> Self {
        Self {
            channels: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.channel_name()).collect()
    }

    /// Deliver an alert to all channels.
    ///
    /// Returns one result per channel, in channel order.
    pub async fn dispatch(&self, alert: &AlertContext) -> Vec<DispatchResult> {
        if self.channels.is_empty() {
            tracing::warn!("No notification channels configured");
            return Vec::new();
        }

        let mut results = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            let start = std::time::Instant::now();
            let result = channel.send(alert).await;
            results.push(Self::record(channel.as_ref(), result, start, "Notification"));
        }
        results
    }

    /// Send the test alert through every channel.
    pub async fn test_all(&self) -> Vec<DispatchResult> {
        let mut results = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            let start = std::time::Instant::now();
            let result = channel.test().await;
            results.push(Self::record(channel.as_ref(), result, start, "Test notification"));
        }
        results
    }

    fn record(
        channel: &dyn Notifier,
        result: Result<(), crate::NotifyError>,
        start: std::time::Instant,
        what: &str,
    ) -> DispatchResult {
        let duration_ms = start.elapsed().as_millis() as u64;
        let (success, error) = match result {
            Ok(()) => {
                tracing::info!(
                    channel = channel.channel_name(),
                    duration_ms,
                    "{what} delivered"
                );
                (true, None)
            }
            Err(e) => {
                tracing::warn!(
                    channel = channel.channel_name(),
                    error = %e,
                    duration_ms,
                    "{what} delivery failed"
                );
                (false, Some(e.to_string()))
            }
        };

        DispatchResult {
            channel: channel.channel_name().to_string(),
            success,
            error,
            duration_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::NotifyError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct MockNotifier {
        name: String,
        send_count: Arc<AtomicUsize>,
        last_test_flag: Arc<Mutex<Option<bool>>>,
        should_fail: bool,
    }

    impl MockNotifier {
        fn new(name: &str, should_fail: bool) -> (Self, Arc<AtomicUsize>) {
            let count = Arc::new(AtomicUsize::new(0));
            let mock = Self {
                name: name.to_string(),
                send_count: count.clone(),
                last_test_flag: Arc::new(Mutex::new(None)),
                should_fail,
            };
            (mock, count)
        }
    }

    #[async_trait::async_trait]
    impl Notifier for MockNotifier {
        async fn send(&self, alert: &AlertContext) -> Result<(), NotifyError> {
            self.send_count.fetch_add(1, Ordering::SeqCst);
            *self.last_test_flag.lock().unwrap() = Some(alert.test);
            if self.should_fail {
                Err(NotifyError::Config("mock failure".to_string()))
            } else {
                Ok(())
            }
        }
        fn channel_name(&self) -> &str {
            &self.name
        }
    }

    fn alert() -> AlertContext {
        AlertContext {
            keyword: "happening".to_string(),
            count: 41,
            threshold: 40,
            board: "/pol/".to_string(),
            source_url: "https://example.test/catalog.json".to_string(),
            now: "2026-02-16 12:00 UTC".to_string(),
            test: false,
        }
    }

    #[tokio::test]
    async fn dispatch_to_all_channels() {
        let (a, count_a) = MockNotifier::new("a", false);
        let (b, count_b) = MockNotifier::new("b", false);
        let dispatcher = Dispatcher::new(vec![Box::new(a), Box::new(b)]);

        let results = dispatcher.dispatch(&alert()).await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.success));
        assert_eq!(results[0].channel, "a");
        assert_eq!(results[1].channel, "b");
        assert_eq!(count_a.load(Ordering::SeqCst), 1);
        assert_eq!(count_b.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn partial_failure_doesnt_block() {
        let (fail, _) = MockNotifier::new("fail", true);
        let (ok, count) = MockNotifier::new("ok", false);
        let dispatcher = Dispatcher::new(vec![Box::new(fail), Box::new(ok)]);

        let results = dispatcher.dispatch(&alert()).await;
        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        assert_eq!(results[0].error.as_deref(), Some("Configuration error: mock failure"));
        assert!(results[1].success);
        assert_eq!(count.load(Ordering::SeqCst), 1); // second channel still sent
    }

    #[tokio::test]
    async fn test_all_sends_marked_sample() {
        let (mock, count) = MockNotifier::new("a", false);
        let flag = mock.last_test_flag.clone();
        let dispatcher = Dispatcher::new(vec![Box::new(mock)]);

        let results = dispatcher.test_all().await;
        assert!(results[0].success);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(*flag.lock().unwrap(), Some(true));
    }

    #[tokio::test]
    async fn empty_dispatcher_returns_empty() {
        let dispatcher = Dispatcher::empty();
        assert!(dispatcher.is_empty());
        assert!(dispatcher.dispatch(&alert()).await.is_empty());
    }
}
