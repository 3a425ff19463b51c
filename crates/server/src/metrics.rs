//! Prometheus metrics for observability.
//!
//! Covers HTTP traffic, authentication failures, and the live shape of the
//! queue. Queue gauges are collected from an engine snapshot at scrape time
//! rather than updated transactionally, so the engine stays metrics-free.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
    Opts, Registry, TextEncoder,
};

use lobbyline_core::TicketStatus;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "lobbyline_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("lobbyline_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "lobbyline_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

/// Authentication failures.
pub static AUTH_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "lobbyline_auth_failures_total",
            "Total authentication failures",
        ),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// Queue Metrics
// =============================================================================

/// Tickets issued since startup.
pub static TICKETS_ISSUED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "lobbyline_tickets_issued_total",
        "Total tickets issued since startup",
    )
    .unwrap()
});

/// Staff actions by name and outcome ("applied" or a rejection reason).
pub static QUEUE_ACTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("lobbyline_queue_actions_total", "Queue actions by outcome"),
        &["action", "outcome"],
    )
    .unwrap()
});

/// Queue resets since startup.
pub static QUEUE_RESETS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "lobbyline_queue_resets_total",
        "Total queue resets since startup",
    )
    .unwrap()
});

/// Tickets by current status (collected from a snapshot at scrape time).
pub static TICKETS_BY_STATUS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new(
            "lobbyline_tickets_by_status",
            "Current ticket count by status",
        ),
        &["status"],
    )
    .unwrap()
});

/// Current queue mode (0 = one-stage, 1 = two-stage).
pub static QUEUE_MODE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "lobbyline_queue_mode",
        "Current queue mode (0 = one-stage, 1 = two-stage)",
    )
    .unwrap()
});

/// Tickets queued per room (collected at scrape time).
pub static ROOM_QUEUE_DEPTH: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("lobbyline_room_queue_depth", "Tickets queued per room"),
        &["room"],
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(AUTH_FAILURES_TOTAL.clone()))
        .unwrap();

    // Queue
    registry
        .register(Box::new(TICKETS_ISSUED_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(QUEUE_ACTIONS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(QUEUE_RESETS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(TICKETS_BY_STATUS.clone()))
        .unwrap();
    registry.register(Box::new(QUEUE_MODE.clone())).unwrap();
    registry
        .register(Box::new(ROOM_QUEUE_DEPTH.clone()))
        .unwrap();
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Refresh queue gauges from the current engine snapshot.
///
/// Called before encoding so the gauges reflect the queue at scrape time.
pub fn collect_queue_metrics(state: &crate::state::AppState) {
    let snapshot = state.engine().snapshot();

    for status in TicketStatus::ALL {
        TICKETS_BY_STATUS
            .with_label_values(&[status.as_str()])
            .set(snapshot.count_by_status(status) as i64);
    }

    QUEUE_MODE.set(match snapshot.mode {
        lobbyline_core::QueueMode::OneStage => 0,
        lobbyline_core::QueueMode::TwoStage => 1,
    });

    for room in &snapshot.rooms {
        ROOM_QUEUE_DEPTH
            .with_label_values(&[room.id.as_str()])
            .set(room.queue.len() as i64);
    }
}

/// Normalize a path for metric labels (replace ticket numbers with a
/// placeholder so labels stay low-cardinality).
pub fn normalize_path(path: &str) -> String {
    let numeric_regex = regex_lite::Regex::new(r"/\d+(/|$)").unwrap();
    numeric_regex.replace_all(path, "/{id}$1").to_string()
}
