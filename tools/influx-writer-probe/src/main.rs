// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! influx-writer-probe - Load generator for influx-writer
//!
//! Pushes synthetic samples through a writer at a fixed rate, optionally
//! alongside the runtime collector, then prints the writer counters.

use clap::Parser;
use influx_writer::{
    ProcessStats, Registry, RuntimeCollector, Sample, Sink, StdoutSink, Writer, WriterConfig,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// influx-writer load probe
#[derive(Parser, Debug)]
#[command(name = "influx-writer-probe")]
#[command(version = "0.1.0")]
#[command(about = "Generate metric load through influx-writer")]
struct Args {
    /// Writer configuration file (YAML, or JSON with a .json extension)
    config: PathBuf,

    /// Print Line Protocol to stdout instead of posting to the endpoint
    #[arg(long)]
    stdout: bool,

    /// Run duration in seconds
    #[arg(short, long, default_value = "10")]
    duration: u64,

    /// Samples per second
    #[arg(short, long, default_value = "1000")]
    rate: u64,

    /// Probability of keeping each sample (0.0 - 1.0)
    #[arg(short, long, default_value = "1.0")]
    probability: f64,

    /// Runtime collector interval in milliseconds (0 disables it)
    #[arg(long, default_value = "1000")]
    runtime_interval: u64,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = WriterConfig::from_file(&args.config)?;

    let writer = if args.stdout {
        let sink: Arc<dyn Sink> = Arc::new(StdoutSink);
        Writer::new(&config, sink)?
    } else {
        Writer::from_config(&config)?
    };
    let writer = Arc::new(writer);

    let collector = if args.runtime_interval > 0 {
        let registry = Arc::new(Registry::new());
        let stats = ProcessStats::register(&registry)?;
        Some(RuntimeCollector::start(
            writer.clone(),
            registry,
            stats,
            Duration::from_millis(args.runtime_interval),
        )?)
    } else {
        None
    };

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    eprintln!(
        "=== influx-writer probe: {} samples/s for {}s ({} workers, queue {}) ===",
        args.rate,
        args.duration,
        writer.worker_count(),
        writer.queue_capacity()
    );

    let period = Duration::from_secs_f64(1.0 / args.rate.max(1) as f64);
    let start = Instant::now();
    let end_time = start + Duration::from_secs(args.duration);
    let mut next = start;
    let mut seq: i64 = 0;

    while running.load(Ordering::SeqCst) && Instant::now() < end_time {
        let sample = Sample::new("probe")
            .tag("worker", "main")
            .field("seq", seq)
            .field("elapsed_ms", start.elapsed().as_millis() as i64)
            .field("phase", (seq as f64 / 100.0).sin());
        writer.write_sample(sample, args.probability);
        seq += 1;

        next += period;
        if let Some(wait) = next.checked_duration_since(Instant::now()) {
            std::thread::sleep(wait);
        }
    }

    if !running.load(Ordering::SeqCst) {
        eprintln!("Interrupted by user");
    }

    if let Some(collector) = collector {
        collector.stop();
    }
    writer.close()?;

    let stats = writer.stats();
    let elapsed = start.elapsed();
    eprintln!("Generated:   {} samples in {:?}", seq, elapsed);
    eprintln!("Enqueued:    {}", stats.enqueued);
    eprintln!("Dropped:     {}", stats.dropped);
    eprintln!("Flushes:     {} ({} failed)", stats.flushes, stats.flush_errors);
    eprintln!("Written:     {} points", stats.points_written);
    eprintln!("Lost:        {} points", stats.points_lost);
    eprintln!("Invalid:     {}", stats.conversion_errors);
    Ok(())
}
