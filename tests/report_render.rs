use std::sync::{Arc, Mutex};

use asset_squeeze::process::{BatchResults, OutcomeRecord};
use asset_squeeze::report::{
    log_errors, log_stats, render_errors, render_stats, ErrorReport, RenderOptions, RowStatus,
    StatsReport, ERRORS_HEADER, STATS_HEADER,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};

const PLAIN: RenderOptions = RenderOptions { ansi_colors: false };

fn record(old_kb: f64, new_kb: f64, ratio: i64, is_cached: bool) -> OutcomeRecord {
    OutcomeRecord {
        size: new_kb,
        old_size: old_kb,
        ratio,
        skip_write: new_kb >= old_kb,
        is_cached,
    }
}

fn sample_results() -> BatchResults {
    let mut results = BatchResults::new();
    results.record_success("img/hero.png", record(100.0, 60.0, -40, false));
    results.record_success("logo.svg", record(10.0, 12.0, 20, false));
    results.record_success("img/cached.webp", record(50.0, 25.0, -50, true));
    results.record_error("broken.jpg", "corrupt input".into());
    results.record_error("assets/deeply/nested.gif", "unsupported".into());
    results
}

#[test]
fn test_totals_exclude_skipped_rows() {
    let report = StatsReport::from_results(&sample_results());

    assert_eq!(report.rows.len(), 3);
    assert_eq!(report.total_original, 150.0);
    assert_eq!(report.total_saved, 65.0);

    let summary = report.summary().expect("savings should be reported");
    assert_eq!(summary.percent, 43);
}

#[test]
fn test_row_status_and_order() {
    let report = StatsReport::from_results(&sample_results());
    let paths: Vec<_> = report.rows.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["img/hero.png", "logo.svg", "img/cached.webp"]);

    assert_eq!(
        report.rows[0].status,
        RowStatus::Resized {
            old_size: 100.0,
            size: 60.0
        }
    );
    assert_eq!(report.rows[1].status, RowStatus::Skipped);
    assert_eq!(report.rows[2].status, RowStatus::Cached);
}

#[test]
fn test_skipped_wins_over_cached() {
    let mut results = BatchResults::new();
    results.record_success("a.png", record(1.0, 2.0, 100, true));
    let report = StatsReport::from_results(&results);
    assert_eq!(report.rows[0].status, RowStatus::Skipped);
    assert_eq!(report.total_original, 0.0);
}

#[test]
fn test_no_summary_without_savings() {
    let mut results = BatchResults::new();
    results.record_success("a.png", record(1.0, 1.0, 0, false));
    let report = StatsReport::from_results(&results);
    assert!(report.summary().is_none());

    let lines = render_stats(&report, PLAIN);
    assert!(!lines.iter().any(|l| l.contains("total savings")));
}

#[test]
fn test_render_stats_plain() {
    let report = StatsReport::from_results(&sample_results());
    let lines = render_stats(&report, PLAIN);

    assert_eq!(lines[0], STATS_HEADER);
    assert_eq!(lines[1], "img/hero.png     -40%  100.00 kB -> 60.00 kB");
    assert_eq!(lines[2], "logo.svg         +20%  skipped");
    assert_eq!(lines[3], "img/cached.webp  -50%  cached");
    assert_eq!(lines[4], "total savings = 65.00kB/150.00kB ≈ 43%");
    assert_eq!(lines.len(), 5);
}

#[test]
fn test_render_errors_aligns_messages() {
    let report = ErrorReport::from_results(&sample_results());
    assert_eq!(report.name_width(), "assets/deeply/nested.gif".len());

    let lines = render_errors(&report, PLAIN);
    assert_eq!(lines[0], ERRORS_HEADER);
    assert_eq!(lines[1], "broken.jpg               corrupt input");
    assert_eq!(lines[2], "assets/deeply/nested.gif unsupported");

    let column = |line: &str, msg: &str| line.find(msg).unwrap();
    assert_eq!(column(&lines[1], "corrupt"), column(&lines[2], "unsupported"));
}

#[test]
fn test_colored_rendering_keeps_text() {
    let report = StatsReport::from_results(&sample_results());
    let lines = render_stats(&report, RenderOptions { ansi_colors: true });
    assert!(lines[1].contains("\u{1b}["), "expected ANSI escapes: {:?}", lines[1]);
    assert!(lines[1].contains("-40%"));
    assert!(lines[2].contains("skipped"));
}

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut msg = format!("{} ", event.metadata().level());
        let mut visitor = MessageVisitor(&mut msg);
        event.record(&mut visitor);
        self.events.lock().unwrap().push(msg);
    }
}

struct MessageVisitor<'a>(&'a mut String);

impl tracing::field::Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0.push_str(&format!("{value:?}"));
        }
    }
}

#[test]
fn test_reports_are_emitted_through_the_logger() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    let results = sample_results();
    let stats = log_stats(&results, PLAIN);
    let errors = log_errors(&results, PLAIN);
    assert_eq!(stats.rows.len(), 3);
    assert_eq!(errors.rows.len(), 2);

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs
            .iter()
            .any(|m| m.starts_with("INFO") && m.contains("total savings")),
        "Expected the savings summary at info level, got: {:?}",
        event_msgs
    );
    assert!(
        event_msgs
            .iter()
            .any(|m| m.starts_with("ERROR") && m.contains("corrupt input")),
        "Expected error rows at error level, got: {:?}",
        event_msgs
    );
}
