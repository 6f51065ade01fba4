//! SPSC ring buffer throughput/latency measurement
//!
//! one pinned producer, one pinned consumer, a stream of sequential
//! timestamped values; reports per-element cost for the wait-free SPSC
//! variant and the lock-free concurrent variant side by side.
//!
//! run with: cargo run --release --example latency

use std::hint::black_box;
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tape_cpu::{cpu_count, set_cpu_affinity, wait_backoff};
use tape_ring::{spsc, RingBuffer};

const COUNT: u64 = 10_000_000;
const WARMUP: u64 = 100_000;
const CAPACITY: usize = 4096;

/// pin the calling thread, unless the machine is too small to bother
fn pin(core: usize) {
    match cpu_count() {
        Ok(n) if n > core => {
            if let Err(e) = set_cpu_affinity([core]) {
                eprintln!("warning: failed to pin to core {}: {}", core, e);
            }
        }
        _ => {}
    }
}

fn bench_spsc() -> (u128, u64) {
    let (mut tx, mut rx) = spsc::ring_buffer::<u64>(CAPACITY);

    let producer = thread::spawn(move || {
        pin(0);

        for i in 0..WARMUP + COUNT {
            let mut iter = 0u32;
            while !tx.push(black_box(i)) {
                wait_backoff(&mut iter);
            }
        }
        tx.drop_count()
    });

    let consumer = thread::spawn(move || {
        pin(1);

        // drain the warmup stream before starting the clock
        let mut next = 0u64;
        let mut iter = 0u32;
        while next < WARMUP {
            if rx.pop().is_some() {
                next += 1;
                iter = 0;
            } else {
                wait_backoff(&mut iter);
            }
        }

        let start = Instant::now();
        let mut sum = 0u64;
        while next < WARMUP + COUNT {
            if let Some(v) = rx.pop() {
                sum = sum.wrapping_add(v);
                next += 1;
                iter = 0;
            } else {
                wait_backoff(&mut iter);
            }
        }
        let elapsed = start.elapsed().as_nanos();

        black_box(sum);
        elapsed
    });

    let drops = producer.join().unwrap();
    let elapsed_ns = consumer.join().unwrap();
    (elapsed_ns, drops)
}

fn bench_concurrent() -> u128 {
    let rb: Arc<RingBuffer<u64>> = Arc::new(RingBuffer::new(CAPACITY));

    let producer = {
        let rb = Arc::clone(&rb);
        thread::spawn(move || {
            pin(0);

            for i in 0..WARMUP + COUNT {
                let mut iter = 0u32;
                while !rb.push(black_box(i)) {
                    wait_backoff(&mut iter);
                }
            }
        })
    };

    let consumer = {
        let rb = Arc::clone(&rb);
        thread::spawn(move || {
            pin(1);

            let mut next = 0u64;
            let mut iter = 0u32;
            while next < WARMUP {
                if rb.pop().is_some() {
                    next += 1;
                    iter = 0;
                } else {
                    wait_backoff(&mut iter);
                }
            }

            let start = Instant::now();
            let mut sum = 0u64;
            while next < WARMUP + COUNT {
                if let Some(v) = rb.pop() {
                    sum = sum.wrapping_add(v);
                    next += 1;
                    iter = 0;
                } else {
                    wait_backoff(&mut iter);
                }
            }
            let elapsed = start.elapsed().as_nanos();

            black_box(sum);
            elapsed
        })
    };

    producer.join().unwrap();
    consumer.join().unwrap()
}

fn report(name: &str, elapsed_ns: u128) {
    let per_elem = elapsed_ns as f64 / COUNT as f64;
    let throughput = COUNT as f64 / (elapsed_ns as f64 / 1e9) / 1e6;
    println!(
        "  {:<12} {:>7.1} ns/elem   {:>8.1} M elem/s",
        name, per_elem, throughput
    );
}

fn main() {
    println!("=== ring buffer transfer benchmark ===");
    println!(
        "{} elements, capacity {}, producer on core 0, consumer on core 1",
        COUNT, CAPACITY
    );
    println!();

    let (spsc_ns, drops) = bench_spsc();
    report("spsc", spsc_ns);
    println!("  (producer saw {} full-buffer refusals, all retried)", drops);

    let conc_ns = bench_concurrent();
    report("concurrent", conc_ns);
}
