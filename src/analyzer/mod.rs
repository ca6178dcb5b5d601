//! Analyzer stage: evaluates every rule against each `ParsedLog`, enriches
//! with Bloom-filter "known pattern" and window-count metadata, and emits
//! Alerts onto Q3. A sibling ticker task resets the window counter on a
//! fixed interval (`spec.md` §4.3).

use crate::bloom::BloomFilter;
use crate::domain::{Alert, ParsedLog, DEFAULT_RULES};
use crate::window::WindowCounter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Handle to the running Analyzer. Owns the Bloom filter and window counter
/// exclusively, as required by `spec.md` §3's ownership rules.
pub struct Analyzer {
    eval_handle: JoinHandle<()>,
    ticker_handle: JoinHandle<()>,
    shutdown: CancellationToken,
}

impl Analyzer {
    pub fn start(
        parsed_rx: mpsc::Receiver<ParsedLog>,
        alert_tx: mpsc::Sender<Alert>,
        window_duration: Duration,
        bloom_size_bits: usize,
        bloom_hash_count: u8,
        shutdown: CancellationToken,
    ) -> Self {
        let bloom = Arc::new(BloomFilter::new(bloom_size_bits, bloom_hash_count));
        let window = Arc::new(WindowCounter::new());

        let eval_handle = tokio::spawn(eval_loop(
            parsed_rx,
            alert_tx,
            bloom.clone(),
            window.clone(),
            shutdown.clone(),
        ));
        let ticker_handle = tokio::spawn(reset_loop(window, window_duration, shutdown.clone()));

        Self {
            eval_handle,
            ticker_handle,
            shutdown,
        }
    }

    /// Signal both the evaluation loop and the reset ticker to stop, and
    /// wait for them to join. The evaluation loop drains whatever is left
    /// on Q2 from a closed channel before exiting.
    pub async fn stop(self) {
        self.shutdown.cancel();
        let _ = self.eval_handle.await;
        let _ = self.ticker_handle.await;
        info!("Analyzer stopped");
    }
}

async fn eval_loop(
    mut parsed_rx: mpsc::Receiver<ParsedLog>,
    alert_tx: mpsc::Sender<Alert>,
    bloom: Arc<BloomFilter>,
    window: Arc<WindowCounter>,
    shutdown: CancellationToken,
) {
    while let Some(log) = parsed_rx.recv().await {
        evaluate(&log, &bloom, &window, &alert_tx, &shutdown).await;
    }
    info!("Analyzer evaluation loop exiting");
}

/// Evaluate every rule against `log` in registration order, emitting zero
/// or more Alerts. Each firing rule is sampled against the Bloom filter
/// *before* it is added, so a key's first occurrence always yields
/// `is_known_pattern = false`.
async fn evaluate(
    log: &ParsedLog,
    bloom: &BloomFilter,
    window: &WindowCounter,
    alert_tx: &mpsc::Sender<Alert>,
    shutdown: &CancellationToken,
) {
    for rule in DEFAULT_RULES {
        if !(rule.predicate)(log) {
            continue;
        }

        let key = format!("{}:{}", rule.name, log.source);
        let known = bloom.contains(&key);
        bloom.add(&key);
        let count = window.increment(&key);

        let alert = Alert::new(rule.severity, rule.name, log.clone(), known, count);

        tokio::select! {
            res = alert_tx.send(alert) => {
                if res.is_err() {
                    return;
                }
            }
            () = shutdown.cancelled() => return,
        }
    }
}

async fn reset_loop(window: Arc<WindowCounter>, interval: Duration, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            () = tokio::time::sleep(interval) => {
                window.reset();
                info!("window counter reset");
            }
            () = shutdown.cancelled() => break,
        }
    }
    info!("Analyzer reset ticker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Severity;

    fn log_with(level: &str, source: &str, message: &str) -> ParsedLog {
        ParsedLog {
            timestamp: "2024-01-15T10:30:00Z".into(),
            level: level.into(),
            source: source.into(),
            message: message.into(),
            ip: crate::parser::extract_ip(message),
            error_code: crate::parser::extract_error_code(message),
            keywords: crate::parser::extract_keywords(message),
        }
    }

    async fn start_analyzer(
        window_duration: Duration,
    ) -> (Analyzer, mpsc::Sender<ParsedLog>, mpsc::Receiver<Alert>) {
        let (parsed_tx, parsed_rx) = mpsc::channel(16);
        let (alert_tx, alert_rx) = mpsc::channel(16);
        let analyzer = Analyzer::start(
            parsed_rx,
            alert_tx,
            window_duration,
            1000,
            3,
            CancellationToken::new(),
        );
        (analyzer, parsed_tx, alert_rx)
    }

    #[tokio::test]
    async fn s1_critical_path_emits_two_alerts() {
        let (analyzer, parsed_tx, mut alert_rx) = start_analyzer(Duration::from_secs(60)).await;

        parsed_tx
            .send(log_with("FATAL", "db", "Security breach from 10.0.0.1"))
            .await
            .unwrap();

        let first = alert_rx.recv().await.unwrap();
        let second = alert_rx.recv().await.unwrap();
        let reasons: Vec<&str> = vec![first.reason.as_str(), second.reason.as_str()];
        assert!(reasons.contains(&"Critical Error Level"));
        assert!(reasons.contains(&"Suspicious Keywords"));
        assert_eq!(first.metadata.count_in_window, 1);
        assert!(!first.metadata.is_known_pattern);
        assert_eq!(first.log.ip, "10.0.0.1");
        assert!(first.log.keywords.contains(&"breach".to_string()));

        drop(parsed_tx);
        analyzer.stop().await;
    }

    #[tokio::test]
    async fn s2_5xx_detection_emits_both_rules() {
        let (analyzer, parsed_tx, mut alert_rx) = start_analyzer(Duration::from_secs(60)).await;

        parsed_tx
            .send(log_with("ERROR", "gateway", "upstream returned 503 timeout"))
            .await
            .unwrap();

        let first = alert_rx.recv().await.unwrap();
        let second = alert_rx.recv().await.unwrap();
        let reasons: Vec<&str> = vec![first.reason.as_str(), second.reason.as_str()];
        assert!(reasons.contains(&"Error Code 5xx"));
        assert!(reasons.contains(&"Error Rate Threshold"));

        drop(parsed_tx);
        analyzer.stop().await;
    }

    #[tokio::test]
    async fn s3_known_pattern_flips_on_second_occurrence() {
        let (analyzer, parsed_tx, mut alert_rx) = start_analyzer(Duration::from_secs(60)).await;

        parsed_tx
            .send(log_with("CRITICAL", "api", "system failure"))
            .await
            .unwrap();
        parsed_tx
            .send(log_with("CRITICAL", "api", "system failure"))
            .await
            .unwrap();

        let first = alert_rx.recv().await.unwrap();
        assert_eq!(first.reason, "Critical Error Level");
        assert!(!first.metadata.is_known_pattern);
        assert_eq!(first.metadata.count_in_window, 1);

        let second = alert_rx.recv().await.unwrap();
        assert_eq!(second.reason, "Critical Error Level");
        assert!(second.metadata.is_known_pattern);
        assert_eq!(second.metadata.count_in_window, 2);

        drop(parsed_tx);
        analyzer.stop().await;
    }

    #[tokio::test]
    async fn s4_window_reset_restarts_count_but_bloom_remembers() {
        let (analyzer, parsed_tx, mut alert_rx) = start_analyzer(Duration::from_millis(30)).await;

        parsed_tx
            .send(log_with("CRITICAL", "api", "system failure"))
            .await
            .unwrap();
        let first = alert_rx.recv().await.unwrap();
        assert_eq!(first.metadata.count_in_window, 1);

        tokio::time::sleep(Duration::from_millis(80)).await;

        parsed_tx
            .send(log_with("CRITICAL", "api", "system failure"))
            .await
            .unwrap();
        let second = alert_rx.recv().await.unwrap();
        assert_eq!(second.metadata.count_in_window, 1);
        assert!(second.metadata.is_known_pattern);

        drop(parsed_tx);
        analyzer.stop().await;
    }

    #[tokio::test]
    async fn multiple_rules_firing_produce_one_alert_each_in_registration_order() {
        let (analyzer, parsed_tx, mut alert_rx) = start_analyzer(Duration::from_secs(60)).await;

        parsed_tx
            .send(log_with(
                "FATAL",
                "svc",
                "malicious attack returned 503 error",
            ))
            .await
            .unwrap();

        let mut reasons = Vec::new();
        for _ in 0..3 {
            reasons.push(alert_rx.recv().await.unwrap().reason);
        }
        assert_eq!(
            reasons,
            vec!["Critical Error Level", "Error Code 5xx", "Suspicious Keywords"]
        );

        drop(parsed_tx);
        analyzer.stop().await;
    }

    #[tokio::test]
    async fn non_matching_log_produces_no_alerts() {
        let (analyzer, parsed_tx, mut alert_rx) = start_analyzer(Duration::from_secs(60)).await;

        parsed_tx
            .send(log_with("INFO", "svc", "all quiet on the western front"))
            .await
            .unwrap();
        drop(parsed_tx);
        analyzer.stop().await;

        assert!(alert_rx.recv().await.is_none());
    }

    #[test]
    fn severity_is_carried_from_the_firing_rule() {
        assert_eq!(DEFAULT_RULES[0].severity, Severity::High);
        assert_eq!(DEFAULT_RULES[2].severity, Severity::Medium);
    }
}
