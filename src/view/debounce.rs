//! Search input debouncing
//!
//! Every keystroke takes a [`SearchTicket`]. A ticket settles after the quiet
//! period and yields its text only if no newer keystroke arrived meanwhile,
//! so the last keystroke wins and the earlier tickets resolve to `None`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tracing::debug;

/// Last-keystroke-wins debouncer for one search box
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    latest: Arc<AtomicU64>,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a keystroke; earlier tickets become void
    pub fn input(&self, text: impl Into<String>) -> SearchTicket {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        SearchTicket {
            id,
            text: text.into(),
            deadline: Instant::now() + self.delay,
            latest: self.latest.clone(),
        }
    }

    /// Void every outstanding ticket
    pub fn cancel(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

/// A pending search keystroke
#[derive(Debug)]
pub struct SearchTicket {
    id: u64,
    text: String,
    deadline: Instant,
    latest: Arc<AtomicU64>,
}

impl SearchTicket {
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.id
    }

    /// Wait out the quiet period; `Some(text)` if this is still the last keystroke
    pub async fn settled(self) -> Option<String> {
        sleep_until(self.deadline).await;
        if self.is_current() {
            Some(self.text)
        } else {
            debug!("Search input {:?} superseded", self.text);
            None
        }
    }
}
