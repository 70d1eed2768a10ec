//! Search-as-you-type debouncing.
//!
//! The search box emits a raw string on every edit. [`SearchDebouncer`] holds
//! back the most recent one until no newer edit arrived for a full
//! quiescence window, then sends it on its channel. Anything typed earlier is
//! dropped, never queued.

use std::time::Duration;
use tokio::{
    sync::mpsc::UnboundedSender,
    task::JoinHandle,
    time::{Instant, sleep_until},
};
use tracing::trace;

/// Default quiescence window of the search box.
pub const QUIESCENCE_WINDOW: Duration = Duration::from_millis(1200);

/// Queries shorter than this are never looked up.
pub const MIN_QUERY_CHARS: usize = 3;

/// True when `query` is long enough to be worth a lookup.
pub fn is_searchable(query: &str) -> bool {
    query.chars().count() >= MIN_QUERY_CHARS
}

#[derive(Debug)]
pub struct SearchDebouncer {
    window: Duration,
    settled: UnboundedSender<String>,
    pending: Option<JoinHandle<()>>,
}

impl SearchDebouncer {
    pub fn new(window: Duration, settled: UnboundedSender<String>) -> Self {
        Self { window, settled, pending: None }
    }

    /// Record a new input. Supersedes whatever was pending, even when the new
    /// input is itself too short to be dispatched.
    pub fn submit(&mut self, input: impl Into<String>) {
        self.cancel();

        let input = input.into();
        if !is_searchable(&input) {
            trace!(len = input.chars().count(), "query too short, not scheduling lookup");
            return;
        }

        let deadline = Instant::now() + self.window;
        let settled = self.settled.clone();
        self.pending = Some(tokio::spawn(async move {
            sleep_until(deadline).await;
            trace!(query = %input, "query settled");
            // Receiver gone means the view was torn down.
            let _ = settled.send(input);
        }));
    }

    /// Drop the pending input without dispatching it.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{
        sync::mpsc::{UnboundedReceiver, unbounded_channel},
        time::{advance, timeout},
    };

    fn debouncer() -> (SearchDebouncer, UnboundedReceiver<String>) {
        let (tx, rx) = unbounded_channel();
        (SearchDebouncer::new(QUIESCENCE_WINDOW, tx), rx)
    }

    async fn nothing_within(rx: &mut UnboundedReceiver<String>, wait: Duration) -> bool {
        timeout(wait, rx.recv()).await.is_err()
    }

    #[test]
    fn searchable_counts_characters_not_bytes() {
        assert!(!is_searchable(""));
        assert!(!is_searchable("Pa"));
        assert!(!is_searchable("Öl"));
        assert!(is_searchable("Ösl"));
        assert!(is_searchable("Par"));
    }

    #[tokio::test(start_paused = true)]
    async fn short_inputs_are_never_dispatched() {
        let (mut debouncer, mut rx) = debouncer();

        for input in ["", "P", "Pa", "   ".trim(), "日本"] {
            debouncer.submit(input);
            assert!(!debouncer.is_pending());
        }

        assert!(nothing_within(&mut rx, Duration::from_secs(10)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn burst_dispatches_once_with_final_text() {
        let (mut debouncer, mut rx) = debouncer();

        for input in ["Par", "Pari", "Paris"] {
            debouncer.submit(input);
            advance(Duration::from_millis(400)).await;
        }

        assert_eq!(rx.recv().await.as_deref(), Some("Paris"));
        assert!(nothing_within(&mut rx, Duration::from_secs(10)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_the_full_window() {
        let (mut debouncer, mut rx) = debouncer();

        debouncer.submit("Lahore");
        assert!(nothing_within(&mut rx, Duration::from_millis(1100)).await);
        assert_eq!(rx.recv().await.as_deref(), Some("Lahore"));
    }

    #[tokio::test(start_paused = true)]
    async fn short_input_supersedes_pending_query() {
        let (mut debouncer, mut rx) = debouncer();

        debouncer.submit("Paris");
        advance(Duration::from_millis(300)).await;
        debouncer.submit("Pa");

        assert!(nothing_within(&mut rx, Duration::from_secs(10)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn settled_inputs_each_dispatch() {
        let (mut debouncer, mut rx) = debouncer();

        debouncer.submit("Oslo");
        assert_eq!(rx.recv().await.as_deref(), Some("Oslo"));

        debouncer.submit("Osaka");
        assert_eq!(rx.recv().await.as_deref(), Some("Osaka"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_dispatch() {
        let (mut debouncer, mut rx) = debouncer();

        debouncer.submit("Paris");
        debouncer.cancel();

        assert!(!debouncer.is_pending());
        assert!(nothing_within(&mut rx, Duration::from_secs(10)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_prevents_dispatch() {
        let (mut debouncer, mut rx) = debouncer();

        debouncer.submit("Paris");
        drop(debouncer);

        // Every sender is gone once the aborted task is reaped.
        assert_eq!(rx.recv().await, None);
    }
}
