#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Barrier};
use std::thread;

use telemetrics_core::{AggregationKind, ErrorCode, MetricConfiguration, MetricIdentifier, DEFAULT_METRIC_NAMESPACE};
use telemetrics_registry::{Metric, MetricRegistry};

fn ident(ns: &str, id: &str, dims: &[&str]) -> MetricIdentifier {
    MetricIdentifier::with_namespace(ns, id, dims.iter().copied()).unwrap()
}

#[test]
fn requests_example() {
    let reg = MetricRegistry::default();
    let m1 = reg.get_or_create(&ident("default", "Requests", &["region"]), None).unwrap();
    let again = reg.get_or_create(&ident("default", "Requests", &["region"]), None).unwrap();
    let m2 = reg.get_or_create(&ident("default", "Requests", &["region", "env"]), None).unwrap();

    assert!(Arc::ptr_eq(&m1, &again));
    assert!(!Arc::ptr_eq(&m1, &m2));
}

#[test]
fn omitted_namespace_resolves_to_default() {
    let reg = MetricRegistry::default();
    let implicit = MetricIdentifier::from_positional(None, "Requests", &[Some("region")]).unwrap();
    let explicit = ident(DEFAULT_METRIC_NAMESPACE, "Requests", &["region"]);

    let a = reg.get_or_create(&implicit, None).unwrap();
    let b = reg.get_or_create(&explicit, None).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn equal_configuration_reuses() {
    let reg = MetricRegistry::default();
    let cfg = MetricConfiguration::new(50, 5, AggregationKind::Gauge).unwrap();
    let id = ident("app", "Depth", &[]);

    let a = reg.get_or_create(&id, Some(&cfg)).unwrap();
    let same = MetricConfiguration::new(50, 5, AggregationKind::Gauge).unwrap();
    let b = reg.get_or_create(&id, Some(&same)).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn conflicting_configuration_fails_and_keeps_original() {
    let reg = MetricRegistry::default();
    let id = ident("app", "Depth", &["queue"]);

    let original = reg.get_or_create(&id, Some(&MetricConfiguration::gauge())).unwrap();
    original.track_value(3.0, &["q1"]).unwrap();

    let err = reg
        .get_or_create(&id, Some(&MetricConfiguration::measurement()))
        .expect_err("must conflict");
    assert_eq!(err.code(), ErrorCode::ConfigurationConflict);
    assert!(err.to_string().contains("app/Depth(queue)"));

    let reused = reg.get_or_create(&id, None).unwrap();
    assert!(Arc::ptr_eq(&original, &reused));
    assert_eq!(*reused.configuration(), MetricConfiguration::gauge());
    assert_eq!(reused.series_count(), 1);
}

#[test]
fn distinct_identifiers_distinct_metrics() {
    let reg = MetricRegistry::default();
    let ids = [
        ident("a", "m", &["x"]),
        ident("b", "m", &["x"]),
        ident("a", "n", &["x"]),
        ident("a", "m", &["y"]),
        ident("a", "m", &["x", "y"]),
        ident("a", "m", &[]),
    ];
    let metrics: Vec<Arc<Metric>> = ids.iter().map(|i| reg.get_or_create(i, None).unwrap()).collect();
    for (i, a) in metrics.iter().enumerate() {
        for b in &metrics[i + 1..] {
            assert!(!Arc::ptr_eq(a, b));
        }
    }
    assert_eq!(reg.len(), ids.len());
}

#[test]
fn concurrent_first_lookup_constructs_once() {
    const THREADS: usize = 16;

    let reg = Arc::new(MetricRegistry::default());
    let barrier = Arc::new(Barrier::new(THREADS));
    let id = ident("app", "Requests", &["region"]);

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let reg = Arc::clone(&reg);
            let barrier = Arc::clone(&barrier);
            let id = id.clone();
            thread::spawn(move || {
                barrier.wait();
                reg.get_or_create(&id, None).unwrap()
            })
        })
        .collect();

    let metrics: Vec<Arc<Metric>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(metrics.len(), THREADS);
    assert!(metrics.iter().all(|m| Arc::ptr_eq(m, &metrics[0])));
    assert_eq!(reg.created_count(), 1);
    assert_eq!(reg.len(), 1);
}

#[test]
fn concurrent_tracking_is_not_lost() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 500;

    let reg = Arc::new(MetricRegistry::default());
    let id = ident("app", "Hits", &["route"]);

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let reg = Arc::clone(&reg);
            let id = id.clone();
            thread::spawn(move || {
                let m = reg.get_or_create(&id, None).unwrap();
                let route = if t % 2 == 0 { "/even" } else { "/odd" };
                for _ in 0..PER_THREAD {
                    assert!(m.track_value(1.0, &[route]).unwrap());
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let total: u64 = reg.flush().iter().map(|a| a.count).sum();
    assert_eq!(total, (THREADS * PER_THREAD) as u64);
}
