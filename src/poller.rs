use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::error::ExporterError;
use crate::metrics::{DerivedMetric, derive_lenient};
use crate::oozie::{JobSource, OozieError, RawJobRecord};
use crate::pushgateway::MetricSink;
use crate::selector::{SelectionPolicy, select};
use crate::status::normalize_all;

/// Counts for one completed poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub jobs: usize,
    pub workflows: usize,
    pub pushed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Exported(CycleReport),
    /// The query came back empty and `skip_empty` is set.
    Skipped,
}

/// Normalize, select and derive: everything between fetch and export.
///
/// Any bad record fails the whole batch, so a cycle never exports a
/// partial view.
pub fn build_metrics(
    raw: &[RawJobRecord],
    policy: SelectionPolicy,
    now: DateTime<Utc>,
) -> Result<Vec<DerivedMetric>, ExporterError> {
    let normalized = normalize_all(raw)?;
    let selected = select(normalized, policy);
    Ok(selected
        .values()
        .map(|rep| derive_lenient(rep, now))
        .collect())
}

/// Fetches and derives without exporting, as the `show` command does.
/// An empty query yields no metrics when `skip_empty` is set.
pub async fn fetch_metrics(
    source: &impl JobSource,
    policy: SelectionPolicy,
    skip_empty: bool,
    now: DateTime<Utc>,
) -> Result<Vec<DerivedMetric>, ExporterError> {
    match source.fetch_workflows().await {
        Ok(raw) => build_metrics(&raw, policy, now),
        Err(err @ OozieError::EmptyResultSet { .. }) if skip_empty => {
            warn!(%err, "nothing to show");
            Ok(Vec::new())
        }
        Err(err) => Err(err.into()),
    }
}

/// Drives fetch → derive → push cycles with a fixed pause in between.
pub struct Poller<S, K> {
    source: S,
    sink: K,
    selection: SelectionPolicy,
    skip_empty: bool,
    delay: Duration,
}

impl<S: JobSource, K: MetricSink> Poller<S, K> {
    pub fn new(source: S, sink: K, selection: SelectionPolicy, skip_empty: bool, delay: Duration) -> Self {
        Self {
            source,
            sink,
            selection,
            skip_empty,
            delay,
        }
    }

    pub async fn run_cycle(&self) -> Result<CycleOutcome, ExporterError> {
        self.run_cycle_at(Utc::now()).await
    }

    /// One cycle with an explicit "now" for the age computation.
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> Result<CycleOutcome, ExporterError> {
        let raw = match self.source.fetch_workflows().await {
            Ok(raw) => raw,
            Err(err @ OozieError::EmptyResultSet { .. }) if self.skip_empty => {
                warn!(%err, "skipping cycle");
                return Ok(CycleOutcome::Skipped);
            }
            Err(err) => return Err(err.into()),
        };

        let metrics = build_metrics(&raw, self.selection, now)?;
        let mut report = CycleReport {
            jobs: raw.len(),
            workflows: metrics.len(),
            pushed: 0,
            failed: 0,
        };

        for metric in &metrics {
            match self.sink.push(metric).await {
                Ok(()) => report.pushed += 1,
                Err(err) => {
                    error!(workflow = %metric.workflow_name, %err, "push failed");
                    report.failed += 1;
                }
            }
        }

        Ok(CycleOutcome::Exported(report))
    }

    /// Runs cycles until Ctrl-C. A failed cycle is logged and retried after
    /// the usual delay; a cycle in progress is never interrupted.
    pub async fn run(&self) {
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            match self.run_cycle().await {
                Ok(CycleOutcome::Exported(report)) => info!(
                    jobs = report.jobs,
                    workflows = report.workflows,
                    pushed = report.pushed,
                    failed = report.failed,
                    "poll cycle finished"
                ),
                Ok(CycleOutcome::Skipped) => {}
                Err(err) => error!(%err, "poll cycle failed"),
            }

            tokio::select! {
                _ = sleep(self.delay) => {}
                _ = &mut shutdown => {
                    info!("received Ctrl-C, stopping");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oozie::OozieClient;
    use chrono::TimeZone;
    use std::sync::Mutex;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct MockSource {
        response: Result<Vec<RawJobRecord>, u16>,
    }

    impl JobSource for MockSource {
        async fn fetch_workflows(&self) -> Result<Vec<RawJobRecord>, OozieError> {
            match &self.response {
                Ok(records) if records.is_empty() => Err(OozieError::EmptyResultSet { depth: 0 }),
                Ok(records) => Ok(records.clone()),
                Err(status) => Err(OozieError::Unavailable {
                    status: *status,
                    url: "mock".into(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        pushed: Mutex<Vec<DerivedMetric>>,
        reject: Option<&'static str>,
    }

    impl MetricSink for RecordingSink {
        async fn push(&self, metric: &DerivedMetric) -> Result<(), ExporterError> {
            if self.reject == Some(metric.workflow_name.as_str()) {
                return Err(ExporterError::Push {
                    job: metric.workflow_name.clone(),
                    status: 500,
                });
            }
            self.pushed.lock().unwrap().push(metric.clone());
            Ok(())
        }
    }

    fn raw(name: &str, status: &str, start: &str, end: Option<&str>) -> RawJobRecord {
        RawJobRecord {
            app_name: name.into(),
            status: status.into(),
            console_url: format!("http://oozie/{name}"),
            start_time: start.into(),
            end_time: end.map(Into::into),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn poller<S: JobSource>(source: S, skip_empty: bool) -> Poller<S, RecordingSink> {
        Poller::new(
            source,
            RecordingSink::default(),
            SelectionPolicy::FirstSeen,
            skip_empty,
            Duration::from_secs(300),
        )
    }

    #[tokio::test]
    async fn duplicate_runs_collapse_to_first_record() {
        let source = MockSource {
            response: Ok(vec![
                raw("wfA", "RUNNING", "Mon, 01 Jan 2024 10:00:00 UTC", None),
                raw(
                    "wfA",
                    "SUCCEEDED",
                    "Mon, 01 Jan 2024 09:00:00 UTC",
                    Some("Mon, 01 Jan 2024 09:30:00 UTC"),
                ),
            ]),
        };
        let poller = poller(source, true);

        let outcome = poller.run_cycle_at(now()).await.unwrap();
        assert_eq!(
            outcome,
            CycleOutcome::Exported(CycleReport {
                jobs: 2,
                workflows: 1,
                pushed: 1,
                failed: 0,
            })
        );

        let pushed = poller.sink.pushed.lock().unwrap();
        assert_eq!(pushed[0].workflow_name, "wfA");
        assert_eq!(pushed[0].state_code, 5);
        assert_eq!(pushed[0].duration_seconds, None);
        assert_eq!(pushed[0].age_seconds, 2 * 3600);
    }

    #[tokio::test]
    async fn pushes_one_metric_set_per_workflow_in_name_order() {
        let source = MockSource {
            response: Ok(vec![
                raw("wfB", "KILLED", "Mon, 01 Jan 2024 10:00:00 GMT", Some("Mon, 01 Jan 2024 10:00:10 GMT")),
                raw("wfA", "RUNNING", "Mon, 01 Jan 2024 11:00:00 GMT", None),
                raw("wfB", "SUCCEEDED", "Mon, 01 Jan 2024 08:00:00 GMT", Some("Mon, 01 Jan 2024 08:01:00 GMT")),
            ]),
        };
        let poller = poller(source, true);
        poller.run_cycle_at(now()).await.unwrap();

        let pushed = poller.sink.pushed.lock().unwrap();
        let names: Vec<&str> = pushed.iter().map(|m| m.workflow_name.as_str()).collect();
        assert_eq!(names, vec!["wfA", "wfB"]);
        assert_eq!(pushed[1].status_symbol, "KILLED");
        assert_eq!(pushed[1].duration_seconds, Some(10));
    }

    #[tokio::test]
    async fn unknown_status_aborts_before_any_push() {
        let source = MockSource {
            response: Ok(vec![
                raw("wfA", "RUNNING", "Mon, 01 Jan 2024 10:00:00 GMT", None),
                raw("wfB", "UNKNOWN_STATE", "Mon, 01 Jan 2024 10:00:00 GMT", None),
            ]),
        };
        let poller = poller(source, true);

        let err = poller.run_cycle_at(now()).await.unwrap_err();
        assert!(matches!(err, ExporterError::UnknownStatus(_)));
        assert!(poller.sink.pushed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn upstream_503_aborts_before_any_push() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = OozieClient::with_base_url(server.uri(), 0, 10000).unwrap();
        let poller = poller(client, true);

        let err = poller.run_cycle_at(now()).await.unwrap_err();
        assert!(matches!(
            err,
            ExporterError::Oozie(OozieError::Unavailable { status: 503, .. })
        ));
        assert!(poller.sink.pushed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_result_set_is_skipped_when_allowed() {
        let poller = poller(MockSource { response: Ok(Vec::new()) }, true);
        assert_eq!(poller.run_cycle_at(now()).await.unwrap(), CycleOutcome::Skipped);
    }

    #[tokio::test]
    async fn empty_result_set_fails_when_not_skipped() {
        let poller = poller(MockSource { response: Ok(Vec::new()) }, false);
        let err = poller.run_cycle_at(now()).await.unwrap_err();
        assert!(matches!(err, ExporterError::Oozie(OozieError::EmptyResultSet { .. })));
    }

    #[tokio::test]
    async fn one_failed_push_does_not_stop_the_others() {
        let source = MockSource {
            response: Ok(vec![
                raw("wfA", "RUNNING", "Mon, 01 Jan 2024 10:00:00 GMT", None),
                raw("wfB", "RUNNING", "Mon, 01 Jan 2024 10:00:00 GMT", None),
            ]),
        };
        let sink = RecordingSink {
            reject: Some("wfA"),
            ..Default::default()
        };
        let poller = Poller::new(source, sink, SelectionPolicy::FirstSeen, true, Duration::ZERO);

        let outcome = poller.run_cycle_at(now()).await.unwrap();
        assert!(matches!(
            outcome,
            CycleOutcome::Exported(CycleReport { pushed: 1, failed: 1, .. })
        ));
        assert_eq!(poller.sink.pushed.lock().unwrap()[0].workflow_name, "wfB");
    }

    #[tokio::test]
    async fn fetch_metrics_follows_skip_empty() {
        let source = MockSource { response: Ok(Vec::new()) };
        let shown = fetch_metrics(&source, SelectionPolicy::FirstSeen, true, now())
            .await
            .unwrap();
        assert!(shown.is_empty());

        let err = fetch_metrics(&source, SelectionPolicy::FirstSeen, false, now())
            .await
            .unwrap_err();
        assert!(matches!(err, ExporterError::Oozie(OozieError::EmptyResultSet { .. })));
    }

    #[tokio::test]
    async fn fetch_metrics_derives_without_pushing() {
        let source = MockSource {
            response: Ok(vec![raw("wfA", "RUNNING", "Mon, 01 Jan 2024 10:00:00 GMT", None)]),
        };
        let shown = fetch_metrics(&source, SelectionPolicy::FirstSeen, true, now())
            .await
            .unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].status_symbol, "RUNNING");
    }

    #[test]
    fn build_metrics_honours_latest_policy() {
        let raw = vec![
            raw("wfA", "SUCCEEDED", "Mon, 01 Jan 2024 09:00:00 GMT", Some("Mon, 01 Jan 2024 09:30:00 GMT")),
            raw("wfA", "RUNNING", "Mon, 01 Jan 2024 10:00:00 GMT", None),
        ];
        let first = build_metrics(&raw, SelectionPolicy::FirstSeen, now()).unwrap();
        let latest = build_metrics(&raw, SelectionPolicy::Latest, now()).unwrap();
        assert_eq!(first[0].status_symbol, "SUCCEEDED");
        assert_eq!(latest[0].status_symbol, "RUNNING");
    }
}
