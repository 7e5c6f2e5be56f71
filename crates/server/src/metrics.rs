//! In-memory service metrics
//!
//! A process-scoped collector owned by the HTTP facade and handed to
//! the handlers by reference. Counters cover request traffic, search
//! and file-read outcomes, and a bounded ring of recent errors.

use std::collections::{BTreeMap, VecDeque};
use std::time::Instant;

use serde::Serialize;
use tokio::sync::RwLock;

/// Samples kept per response-time window; older samples fall off.
const MAX_RESPONSE_TIMES: usize = 100;

/// Entries kept in the recent-error ring, newest first.
const MAX_RECENT_ERRORS: usize = 50;

/// Collects counters for the lifetime of the process.
#[derive(Debug)]
pub struct Metrics {
    inner: RwLock<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    started: Instant,
    requests_total: u64,
    by_endpoint: BTreeMap<String, u64>,
    by_status: BTreeMap<u16, u64>,
    total_searches: u64,
    failed_searches: u64,
    total_results: u64,
    search_times: VecDeque<u64>,
    total_reads: u64,
    failed_reads: u64,
    read_times: VecDeque<u64>,
    errors_total: u64,
    recent_errors: VecDeque<RecentError>,
}

impl MetricsInner {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            requests_total: 0,
            by_endpoint: BTreeMap::new(),
            by_status: BTreeMap::new(),
            total_searches: 0,
            failed_searches: 0,
            total_results: 0,
            search_times: VecDeque::new(),
            total_reads: 0,
            failed_reads: 0,
            read_times: VecDeque::new(),
            errors_total: 0,
            recent_errors: VecDeque::new(),
        }
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MetricsInner::new()),
        }
    }

    /// Counts one handled request against its endpoint and status code.
    pub async fn record_request(&self, endpoint: &str, status: u16) {
        let mut inner = self.inner.write().await;
        inner.requests_total += 1;
        *inner.by_endpoint.entry(endpoint.to_string()).or_insert(0) += 1;
        *inner.by_status.entry(status).or_insert(0) += 1;
    }

    /// Records one search outcome. Response time and result count only
    /// accumulate for successful searches.
    pub async fn record_search(&self, elapsed_ms: u64, result_count: usize, success: bool) {
        let mut inner = self.inner.write().await;
        inner.total_searches += 1;
        if success {
            push_sample(&mut inner.search_times, elapsed_ms);
            inner.total_results += result_count as u64;
        } else {
            inner.failed_searches += 1;
        }
    }

    /// Records one file-read outcome.
    pub async fn record_file_read(&self, elapsed_ms: u64, success: bool) {
        let mut inner = self.inner.write().await;
        inner.total_reads += 1;
        if success {
            push_sample(&mut inner.read_times, elapsed_ms);
        } else {
            inner.failed_reads += 1;
        }
    }

    /// Appends to the recent-error ring, newest entry first.
    pub async fn record_error(&self, error: &str, endpoint: &str) {
        let mut inner = self.inner.write().await;
        inner.errors_total += 1;
        inner.recent_errors.push_front(RecentError {
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            error: error.to_string(),
            endpoint: endpoint.to_string(),
        });
        inner.recent_errors.truncate(MAX_RECENT_ERRORS);
    }

    /// Returns a point-in-time copy of every counter, with averages
    /// computed over the retained response-time windows.
    pub async fn snapshot(&self) -> MetricsData {
        let inner = self.inner.read().await;
        MetricsData {
            uptime: inner.started.elapsed().as_secs(),
            requests: RequestMetrics {
                total: inner.requests_total,
                by_endpoint: inner.by_endpoint.clone(),
                by_status: inner.by_status.clone(),
            },
            search: SearchMetrics {
                total_searches: inner.total_searches,
                average_response_time: average(&inner.search_times),
                total_results: inner.total_results,
                failed_searches: inner.failed_searches,
            },
            file: FileMetrics {
                total_reads: inner.total_reads,
                average_response_time: average(&inner.read_times),
                failed_reads: inner.failed_reads,
            },
            errors: ErrorMetrics {
                total: inner.errors_total,
                recent: inner.recent_errors.iter().cloned().collect(),
            },
        }
    }

    /// Classifies the collected counters into an overall health tier.
    ///
    /// Thresholds: error rate below 5% of requests, search success above
    /// 90%, average search response under 2000 ms. Any warning degrades
    /// the overall status.
    pub async fn health_status(&self) -> MetricsHealth {
        let snapshot = self.snapshot().await;
        let mut checks = BTreeMap::new();

        let error_rate = if snapshot.requests.total > 0 {
            snapshot.errors.total as f64 / snapshot.requests.total as f64
        } else {
            0.0
        };
        checks.insert(
            "errorRate".to_string(),
            if error_rate < 0.05 {
                HealthCheck::pass()
            } else {
                HealthCheck::warn(format!("Error rate: {:.2}%", error_rate * 100.0))
            },
        );

        let search_success = if snapshot.search.total_searches > 0 {
            1.0 - snapshot.search.failed_searches as f64 / snapshot.search.total_searches as f64
        } else {
            1.0
        };
        checks.insert(
            "searchSuccess".to_string(),
            if search_success > 0.9 {
                HealthCheck::pass()
            } else {
                HealthCheck::warn(format!("Search success: {:.2}%", search_success * 100.0))
            },
        );

        checks.insert(
            "responseTime".to_string(),
            if snapshot.search.average_response_time < 2000.0 {
                HealthCheck::pass()
            } else {
                HealthCheck::warn(format!(
                    "Slow response: {:.0}ms",
                    snapshot.search.average_response_time
                ))
            },
        );

        let has_failures = checks.values().any(|c| c.status == "fail");
        let has_warnings = checks.values().any(|c| c.status == "warn");
        let status = if has_failures {
            "unhealthy"
        } else if has_warnings {
            "degraded"
        } else {
            "healthy"
        };

        MetricsHealth { status, checks }
    }

    /// Zeroes every counter and restarts the uptime clock.
    #[allow(dead_code)]
    pub async fn reset(&self) {
        let mut inner = self.inner.write().await;
        *inner = MetricsInner::new();
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

fn push_sample(window: &mut VecDeque<u64>, sample: u64) {
    window.push_back(sample);
    if window.len() > MAX_RESPONSE_TIMES {
        window.pop_front();
    }
}

fn average(window: &VecDeque<u64>) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    window.iter().sum::<u64>() as f64 / window.len() as f64
}

/// Point-in-time metrics snapshot served by `GET /metrics`.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsData {
    pub uptime: u64,
    pub requests: RequestMetrics,
    pub search: SearchMetrics,
    pub file: FileMetrics,
    pub errors: ErrorMetrics,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetrics {
    pub total: u64,
    pub by_endpoint: BTreeMap<String, u64>,
    pub by_status: BTreeMap<u16, u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMetrics {
    pub total_searches: u64,
    pub average_response_time: f64,
    pub total_results: u64,
    pub failed_searches: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetrics {
    pub total_reads: u64,
    pub average_response_time: f64,
    pub failed_reads: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorMetrics {
    pub total: u64,
    pub recent: Vec<RecentError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentError {
    pub timestamp: String,
    pub error: String,
    pub endpoint: String,
}

/// Aggregate health classification derived from the counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsHealth {
    pub status: &'static str,
    pub checks: BTreeMap<String, HealthCheck>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthCheck {
    fn pass() -> Self {
        Self {
            status: "pass",
            message: None,
        }
    }

    fn warn(message: String) -> Self {
        Self {
            status: "warn",
            message: Some(message),
        }
    }
}
