use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static MEMORY_OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "noah_memory_operations_total",
        "Memory store operations by kind and outcome",
        &["op", "outcome"]
    )
    .expect("register memory_operations_total")
});

pub static CHAT_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "noah_chat_requests_total",
        "Chat completion requests by outcome",
        &["outcome"]
    )
    .expect("register chat_requests_total")
});

fn outcome<T, E>(res: &Result<T, E>) -> &'static str {
    if res.is_ok() { "ok" } else { "error" }
}

pub fn record_memory_op<T, E>(op: &str, res: &Result<T, E>) {
    MEMORY_OPERATIONS_TOTAL.with_label_values(&[op, outcome(res)]).inc();
}

pub fn record_chat<T, E>(res: &Result<T, E>) {
    CHAT_REQUESTS_TOTAL.with_label_values(&[outcome(res)]).inc();
}

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
