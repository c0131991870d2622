//! Basic memoization: repeated calls, distinct argument lists, failures and
//! recursion.
//!
//! Run with `RUST_LOG=trace cargo run --example basic` to see hit/miss events.

use memento::{memoize, memoize_recursive, try_memoize, wrap, BoundedStore, EvictionPolicy, MemoOptions};
use std::thread::sleep;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

fn slow_add((a, b): (i32, i32)) -> i32 {
    sleep(Duration::from_millis(200));
    a + b
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Memoized add ===\n");
    let add = memoize(slow_add);
    for args in [(12, 3), (1, 23), (12, 3), (1, 23)] {
        let start = Instant::now();
        let sum = add.call(args);
        println!("add{args:?} = {sum} ({:?})", start.elapsed());
    }
    println!("cached entries: {}\n", add.len());

    println!("=== Failures are not cached ===\n");
    let parse = try_memoize(|s: &'static str| s.parse::<u16>());
    for input in ["8080", "http", "8080"] {
        match parse.try_call(input) {
            Ok(port) => println!("{input:>6} -> port {port}"),
            Err(err) => println!("{input:>6} -> error: {err}"),
        }
    }
    println!("cached entries: {}\n", parse.len());

    println!("=== Recursion through the cache ===\n");
    let fib = memoize_recursive(|fib: &dyn Fn(u32) -> u128, n: u32| {
        if n < 2 {
            n as u128
        } else {
            fib(n - 1) + fib(n - 2)
        }
    });
    println!("fib(150) = {}", fib.call(150));
    println!("cached entries: {}\n", fib.len());

    println!("=== Bounded store ===\n");
    let shout = wrap(
        |s: String| s.to_uppercase(),
        MemoOptions::new()
            .name("shout")
            .cache_factory(|| BoundedStore::new(2, EvictionPolicy::LRU)),
    );
    for word in ["alpha", "beta", "alpha", "gamma"] {
        println!("{word} -> {}", shout.call(word.to_string()));
    }
    println!(
        "alpha cached: {}, beta cached: {}",
        shout.contains(&"alpha".to_string()),
        shout.contains(&"beta".to_string())
    );

    #[cfg(feature = "stats")]
    {
        let stats = shout.stats();
        println!(
            "\n{}: {} hits, {} misses, hit rate {:.0}%",
            shout.name(),
            stats.hits(),
            stats.misses(),
            stats.hit_rate() * 100.0
        );
    }
}
