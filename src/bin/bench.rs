//! simple-kv-bench - Write load generator for a running simple-kv server
//!
//! Opens `--concurrency` connections and keeps each one busy with batches of
//! `PUT` requests. Every `--report-duration` milliseconds a CSV row with
//! round-trip latency percentiles (nanoseconds) is printed to stdout.

use anyhow::{anyhow, bail, Context};
use hdrhistogram::Histogram;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::task::JoinSet;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Latencies above this (one minute) are clamped before recording
const MAX_LATENCY_NS: u64 = 60_000_000_000;

/// Significant figures kept by the latency histogram
const LATENCY_SIGFIGS: u8 = 3;

/// Benchmark configuration
#[derive(Debug, Clone)]
struct BenchConfig {
    /// Server port on localhost
    port: u16,
    /// Number of concurrent connections
    concurrency: u32,
    /// Size of each value in bytes
    val_size: usize,
    /// Requests written per connection before reading the replies
    batch_size: usize,
    /// Entries to write in total, 0 for unlimited
    count: u64,
    /// How often to print a report row
    report_duration: Duration,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            port: simple_kv::DEFAULT_PORT,
            concurrency: 16,
            val_size: 48,
            batch_size: 10,
            count: 0,
            report_duration: Duration::from_millis(1000),
        }
    }
}

impl BenchConfig {
    /// Parse configuration from command-line arguments
    fn from_args() -> Self {
        let mut config = BenchConfig::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            let flag = args[i].as_str();
            match flag {
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("simple-kv-bench version {}", simple_kv::VERSION);
                    std::process::exit(0);
                }
                "--port" | "--concurrency" | "--val-size" | "--batch-size" | "--count"
                | "--report-duration" => {
                    let Some(value) = args.get(i + 1) else {
                        eprintln!("Error: {} requires a value", flag);
                        std::process::exit(1);
                    };
                    config.apply(flag, value);
                    i += 2;
                }
                _ => {
                    eprintln!("Unknown argument: {}", flag);
                    print_help();
                    std::process::exit(1);
                }
            }
        }

        if config.concurrency == 0 || config.batch_size == 0 {
            eprintln!("Error: --concurrency and --batch-size must be at least 1");
            std::process::exit(1);
        }

        config
    }

    /// Sets one numeric option, exiting on a malformed value.
    fn apply(&mut self, flag: &str, value: &str) {
        fn number<T: std::str::FromStr>(flag: &str, value: &str) -> T {
            value.parse().unwrap_or_else(|_| {
                eprintln!("Error: invalid value for {}: {}", flag, value);
                std::process::exit(1);
            })
        }

        match flag {
            "--port" => self.port = number(flag, value),
            "--concurrency" => self.concurrency = number(flag, value),
            "--val-size" => self.val_size = number(flag, value),
            "--batch-size" => self.batch_size = number(flag, value),
            "--count" => self.count = number(flag, value),
            "--report-duration" => {
                self.report_duration = Duration::from_millis(number(flag, value))
            }
            _ => unreachable!("unhandled flag {}", flag),
        }
    }

    fn server_address(&self) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], self.port))
    }
}

fn print_help() {
    println!(
        r#"
simple-kv-bench - Write benchmark for a simple-kv server

USAGE:
    simple-kv-bench [OPTIONS]

OPTIONS:
        --port <PORT>                Server port on 127.0.0.1 (default: 5556)
        --concurrency <N>            Concurrent connections (default: 16)
        --val-size <BYTES>           Size of each value (default: 48)
        --batch-size <N>             PUTs per connection per round trip (default: 10)
        --count <N>                  Entries to write, 0 for unlimited (default: 0)
        --report-duration <MS>       Report interval in milliseconds (default: 1000)
    -v, --version                    Print version information
    -h, --help                       Print this help message

OUTPUT:
    CSV rows of: time, count, p50, p90, p99 (all times in nanoseconds)
"#
    );
}

/// Latency histogram shared by every connection, drained by the reporter.
type Samples = Arc<Mutex<Histogram<u64>>>;

fn new_histogram() -> anyhow::Result<Histogram<u64>> {
    Histogram::new_with_bounds(1, MAX_LATENCY_NS, LATENCY_SIGFIGS)
        .map_err(|e| anyhow!("unable to create latency histogram: {:?}", e))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(BenchConfig::from_args());

    // Logs go to stderr so stdout stays pure CSV
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    info!(
        port = config.port,
        concurrency = config.concurrency,
        val_size = config.val_size,
        batch_size = config.batch_size,
        count = config.count,
        report_ms = config.report_duration.as_millis() as u64,
        "Starting benchmark of simple-kv server"
    );

    let written = Arc::new(AtomicU64::new(0));
    let samples: Samples = Arc::new(Mutex::new(new_histogram()?));

    let mut workers = JoinSet::new();
    for id in 0..config.concurrency {
        let stream = TcpStream::connect(config.server_address())
            .await
            .with_context(|| format!("unable to connect to {}", config.server_address()))?;
        stream.set_nodelay(true)?;

        workers.spawn(run_worker(
            id,
            stream,
            Arc::clone(&config),
            Arc::clone(&written),
            Arc::clone(&samples),
        ));
    }

    println!("time, count, p50, p90, p99");

    let mut ticker = tokio::time::interval(config.report_duration);
    // The first tick completes immediately
    ticker.tick().await;
    let mut mark = Instant::now();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                report(mark.elapsed(), &drain(&samples));
                mark = Instant::now();
            }
            joined = workers.join_next() => match joined {
                None => break,
                Some(Ok(Ok(()))) => {}
                Some(Ok(Err(e))) => return Err(e),
                Some(Err(e)) => return Err(e).context("benchmark worker panicked"),
            },
        }
    }

    report(mark.elapsed(), &drain(&samples));

    let total = written.load(Ordering::Relaxed);
    let total = if config.count > 0 { total.min(config.count) } else { total };
    info!(entries = total, "Benchmark complete");

    Ok(())
}

/// Drives one connection until the entry budget is used up.
async fn run_worker(
    id: u32,
    stream: TcpStream,
    config: Arc<BenchConfig>,
    written: Arc<AtomicU64>,
    samples: Samples,
) -> anyhow::Result<()> {
    let (reader, writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut writer = BufWriter::new(writer);

    let mut request = Vec::with_capacity(config.batch_size * request_len(config.val_size));
    let mut line = String::new();
    let mut rng = StdRng::from_entropy();

    loop {
        request.clear();
        let mut sent: u64 = 0;
        for _ in 0..config.batch_size {
            let entry = written.fetch_add(1, Ordering::Relaxed);
            if config.count > 0 && entry >= config.count {
                break;
            }
            write_put(&mut request, &mut rng, entry, config.val_size);
            sent += 1;
        }

        if sent == 0 {
            debug!(worker = id, "Entry budget exhausted");
            return Ok(());
        }

        let start = Instant::now();
        writer.write_all(&request).await?;
        writer.flush().await?;

        for _ in 0..sent {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                bail!("server closed connection {}", id);
            }
            if line.trim_end_matches(['\r', '\n']) != "OK" {
                bail!("unexpected response on connection {}: {:?}", id, line);
            }
        }

        // Every request in the batch shares the batch round-trip time
        let nanos = (start.elapsed().as_nanos() as u64).clamp(1, MAX_LATENCY_NS);
        samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record_n(nanos, sent)
            .map_err(|e| anyhow!("unable to record latency {}: {:?}", nanos, e))?;
    }
}

/// Size of one request line: `PUT ` + 16 hex digits + space + value + newline.
fn request_len(val_size: usize) -> usize {
    22 + val_size
}

/// Appends `PUT <16 hex digit key> <random alphanumeric value>\n` to `buf`.
fn write_put<R: Rng>(buf: &mut Vec<u8>, rng: &mut R, entry: u64, val_size: usize) {
    buf.extend_from_slice(format!("PUT {:016X} ", entry).as_bytes());
    buf.extend(rng.sample_iter(Alphanumeric).take(val_size));
    buf.push(b'\n');
}

/// Takes the samples gathered since the last call, leaving the shared
/// histogram empty.
fn drain(samples: &Samples) -> Histogram<u64> {
    let mut hist = samples.lock().unwrap_or_else(PoisonError::into_inner);
    let taken = hist.clone();
    hist.reset();
    taken
}

/// Prints one CSV report row.
fn report(elapsed: Duration, hist: &Histogram<u64>) {
    println!(
        "{}, {}, {}, {}, {}",
        elapsed.as_nanos(),
        hist.len(),
        hist.value_at_quantile(0.5),
        hist.value_at_quantile(0.9),
        hist.value_at_quantile(0.99),
    );
}
