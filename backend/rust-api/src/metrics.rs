use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder, HistogramVec,
    IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Business Metrics
    pub static ref ACCESS_CHECKS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "access_checks_total",
        "Total number of exam access checks by resulting status",
        &["status"]
    )
    .unwrap();

    pub static ref SUBMISSIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "submissions_total",
        "Total number of exam submissions",
        &["auto_submitted"]
    )
    .unwrap();

    pub static ref GRADES_RECORDED_TOTAL: IntCounter = register_int_counter!(
        "grades_recorded_total",
        "Total number of short-answer grading writes"
    )
    .unwrap();

    pub static ref EXAMS_FINALIZED_TOTAL: IntCounter = register_int_counter!(
        "exams_finalized_total",
        "Total number of exams finalized"
    )
    .unwrap();

    pub static ref RESULTS_VIEWED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "results_viewed_total",
        "Total number of student result views",
        &["released"]
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        let _ = ACCESS_CHECKS_TOTAL.with_label_values(&["active"]).get();
        let _ = SUBMISSIONS_TOTAL.with_label_values(&["false"]).get();
    }

    #[test]
    fn test_render_metrics() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let result = render_metrics();
        assert!(result.is_ok());
        let output = result.unwrap();
        assert!(output.contains("http_requests_total"));
    }
}
