use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use rankscope::models::SearchAnalyticsRow;
use rankscope::provider::{ProviderError, QueryRequest, SearchAnalyticsApi};

type Behavior =
    Box<dyn Fn(&QueryRequest) -> Result<Vec<SearchAnalyticsRow>, ProviderError> + Send + Sync>;

/// In-memory provider scripted per test. Records every request it sees so
/// tests can assert on chunk boundaries and row limits.
pub struct ScriptedProvider {
    pub calls: Mutex<Vec<QueryRequest>>,
    behavior: Behavior,
    delay: Duration,
}

impl ScriptedProvider {
    pub fn new(
        behavior: impl Fn(&QueryRequest) -> Result<Vec<SearchAnalyticsRow>, ProviderError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            behavior: Box::new(behavior),
            delay: Duration::ZERO,
        }
    }

    /// Delay every response, for simulating a slow in-flight harvest.
    #[allow(dead_code)]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchAnalyticsApi for ScriptedProvider {
    async fn query(
        &self,
        _site: &str,
        request: &QueryRequest,
    ) -> Result<Vec<SearchAnalyticsRow>, ProviderError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.calls.lock().unwrap().push(request.clone());
        (self.behavior)(request)
    }
}

pub fn row(query: &str, clicks: f64, impressions: f64, position: f64) -> SearchAnalyticsRow {
    SearchAnalyticsRow {
        keys: vec![query.to_string()],
        clicks,
        impressions,
        ctr: if impressions > 0.0 { clicks / impressions } else { 0.0 },
        position,
    }
}

/// `count` unique rows, usable as a saturated chunk response.
pub fn rows(count: usize) -> Vec<SearchAnalyticsRow> {
    (0..count)
        .map(|i| row(&format!("query {i}"), 1.0, 10.0, 5.0))
        .collect()
}
