//! Request ids and rolling latency windows behind `GET /metrics`.
//!
//! Backend calls and fan-outs are keyed by backend name, so the cloud and
//! chat providers report separately (`backend_call.aws-translate`,
//! `fanout.openai-chat`, ...). Each key keeps the most recent samples for
//! percentiles plus all-time call and failure counters.

use std::collections::{BTreeMap, VecDeque};
use std::future::Future;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;

/// Samples kept per key for percentile estimates.
pub const DEFAULT_WINDOW: usize = 512;

/// Identifiers attached to every HTTP request's tracing span.
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub trace_id: String,
    pub request_id: String,
}

impl RequestIds {
    pub fn new() -> Self {
        Self {
            trace_id: uuid::Uuid::new_v4().to_string(),
            request_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

impl Default for RequestIds {
    fn default() -> Self {
        Self::new()
    }
}

/// What a latency sample measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// One provider call for one target language.
    BackendCall(&'static str),
    /// One request fanned out over all of its target languages.
    Fanout(&'static str),
    /// A product request, decoding included.
    Product,
}

impl Metric {
    pub fn key(&self) -> String {
        match self {
            Metric::BackendCall(backend) => format!("backend_call.{backend}"),
            Metric::Fanout(backend) => format!("fanout.{backend}"),
            Metric::Product => "product".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Failed,
}

struct LatencyWindow {
    recent: VecDeque<Duration>,
    limit: usize,
    total: u64,
    failures: u64,
}

impl LatencyWindow {
    fn new(limit: usize) -> Self {
        Self {
            recent: VecDeque::with_capacity(limit),
            limit,
            total: 0,
            failures: 0,
        }
    }

    fn observe(&mut self, elapsed: Duration, outcome: Outcome) {
        if self.recent.len() == self.limit {
            self.recent.pop_front();
        }
        self.recent.push_back(elapsed);
        self.total += 1;
        if outcome == Outcome::Failed {
            self.failures += 1;
        }
    }

    fn summarize(&self) -> LatencySummary {
        let mut sorted: Vec<Duration> = self.recent.iter().copied().collect();
        sorted.sort_unstable();
        LatencySummary {
            count: self.total,
            failures: self.failures,
            window: sorted.len(),
            p50_ms: nearest_rank(&sorted, 50),
            p95_ms: nearest_rank(&sorted, 95),
            p99_ms: nearest_rank(&sorted, 99),
            max_ms: sorted.last().copied().map(as_ms).unwrap_or(0.0),
        }
    }
}

/// Nearest-rank `percent`ile of an ascending slice, in milliseconds.
fn nearest_rank(sorted: &[Duration], percent: usize) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (percent * sorted.len()).div_ceil(100);
    as_ms(sorted[rank.clamp(1, sorted.len()) - 1])
}

fn as_ms(d: Duration) -> f64 {
    d.as_micros() as f64 / 1000.0
}

/// One key's entry in the `/metrics` response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencySummary {
    /// Calls observed since startup.
    pub count: u64,
    pub failures: u64,
    /// Samples currently in the percentile window.
    pub window: usize,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub max_ms: f64,
}

pub struct MetricsRegistry {
    windows: Mutex<BTreeMap<String, LatencyWindow>>,
    window: usize,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }

    pub fn with_window(window: usize) -> Self {
        Self {
            windows: Mutex::new(BTreeMap::new()),
            window: window.max(1),
        }
    }

    pub fn observe(&self, metric: Metric, elapsed: Duration, outcome: Outcome) {
        self.windows
            .lock()
            .entry(metric.key())
            .or_insert_with(|| LatencyWindow::new(self.window))
            .observe(elapsed, outcome);
    }

    /// Await `fut`, recording its latency under `metric` and whether it
    /// returned `Ok`.
    pub async fn timed<T, E, F>(&self, metric: Metric, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let start = Instant::now();
        let result = fut.await;
        let outcome = if result.is_ok() {
            Outcome::Ok
        } else {
            Outcome::Failed
        };
        self.observe(metric, start.elapsed(), outcome);
        result
    }

    pub fn get(&self, metric: Metric) -> Option<LatencySummary> {
        self.windows
            .lock()
            .get(&metric.key())
            .map(LatencyWindow::summarize)
    }

    /// Every key seen so far, sorted by key.
    pub fn snapshot(&self) -> BTreeMap<String, LatencySummary> {
        self.windows
            .lock()
            .iter()
            .map(|(key, window)| (key.clone(), window.summarize()))
            .collect()
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
