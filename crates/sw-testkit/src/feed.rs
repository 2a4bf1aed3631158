//! Scripted feed: returns queued responses in order, then repeats the last.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use sw_feed::{FeedError, OrderFeed};
use sw_schemas::FeedPage;

pub struct ScriptedFeed {
    script: Mutex<VecDeque<Result<FeedPage, FeedError>>>,
    last: Mutex<Option<Result<FeedPage, FeedError>>>,
    delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<u32>>,
}

impl Default for ScriptedFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
            delay: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Feed that always answers with `page`.
    pub fn always(page: FeedPage) -> Self {
        let f = Self::new();
        f.push(Ok(page));
        f
    }

    pub fn push(&self, resp: Result<FeedPage, FeedError>) {
        self.script.lock().unwrap().push_back(resp);
    }

    pub fn push_page(&self, page: FeedPage) {
        self.push(Ok(page));
    }

    /// Sleep this long inside every fetch (to exercise timeouts and overlap).
    pub fn set_delay(&self, d: Duration) {
        *self.delay.lock().unwrap() = Some(d);
    }

    /// `limit` argument of every fetch so far.
    pub fn calls(&self) -> Vec<u32> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn next_response(&self) -> Result<FeedPage, FeedError> {
        let mut script = self.script.lock().unwrap();
        let mut last = self.last.lock().unwrap();
        if let Some(r) = script.pop_front() {
            *last = Some(r.clone());
            return r;
        }
        last.clone().unwrap_or_else(|| Ok(FeedPage::empty()))
    }
}

#[async_trait::async_trait]
impl OrderFeed for ScriptedFeed {
    fn source_name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch_recent_orders(&self, limit: u32) -> Result<FeedPage, FeedError> {
        self.calls.lock().unwrap().push(limit);
        let delay = *self.delay.lock().unwrap();
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        self.next_response()
    }
}
