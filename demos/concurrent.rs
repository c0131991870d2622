//! Many threads asking for the same expensive value at once.

use memento::{InFlightPolicy, MemoOptions, SyncMemoized};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

fn run(policy: InFlightPolicy) {
    let computations = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&computations);
    let report = Arc::new(SyncMemoized::with_options(
        move |region: String| {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(250));
            format!("report for {region}")
        },
        MemoOptions::new().name("report"),
        policy,
    ));

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let start = Instant::now();
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let report = Arc::clone(&report);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                report.call("emea".to_string())
            })
        })
        .collect();

    for handle in handles {
        if let Ok(value) = handle.join() {
            assert_eq!(value, "report for emea");
        }
    }

    println!(
        "{policy:?}: {threads} callers, {} computation(s), {:?}",
        computations.load(Ordering::SeqCst),
        start.elapsed()
    );
    #[cfg(feature = "stats")]
    println!(
        "  misses {}, coalesced {}, hits {}",
        report.stats().misses(),
        report.stats().coalesced(),
        report.stats().hits()
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    run(InFlightPolicy::Coalesce);
    run(InFlightPolicy::Duplicate);
}
