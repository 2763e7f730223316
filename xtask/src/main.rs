//! Load generator for the gateway: `cargo run -p xtask -- [base_url] [clients] [total]`.
//!
//! Each client fires `GET /ask?prompt=...` back to back and keeps its own
//! latency histogram; failures are split into gateway rejections (4xx),
//! backend failures surfaced by the gateway (5xx) and transport errors.

use std::time::{Duration, Instant};
use rand::{seq::SliceRandom, thread_rng};
use reqwest::Client;
use hdrhistogram::Histogram;

const PROMPTS: &[&str] = &[
    "Why is the sky blue?",
    "Name three prime numbers.",
    "Translate 'good morning' to French.",
    "What is Rust's borrow checker?",
    "Summarize the water cycle in one sentence.",
    "hello",
];

#[derive(Default)]
struct Tally {
    ok: usize,
    rejected: usize,
    upstream: usize,
    transport: usize,
    completion_bytes: usize,
}

impl Tally {
    fn merge(&mut self, other: &Tally) {
        self.ok += other.ok;
        self.rejected += other.rejected;
        self.upstream += other.upstream;
        self.transport += other.transport;
        self.completion_bytes += other.completion_bytes;
    }
}

async fn run_client(client: Client, url: String, requests: usize) -> anyhow::Result<(Histogram<u64>, Tally)> {
    let mut hist = Histogram::<u64>::new(3)?;
    let mut tally = Tally::default();

    for _ in 0..requests {
        let prompt = PROMPTS.choose(&mut thread_rng()).copied().unwrap_or("hello");
        let t0 = Instant::now();
        match client.get(&url).query(&[("prompt", prompt)]).send().await {
            Ok(r) if r.status().is_success() => {
                let body = r.bytes().await?;
                hist.record(t0.elapsed().as_millis() as u64).ok();
                tally.ok += 1;
                tally.completion_bytes += body.len();
            }
            Ok(r) if r.status().is_client_error() => tally.rejected += 1,
            Ok(_) => tally.upstream += 1,
            Err(_) => tally.transport += 1,
        }
    }
    Ok((hist, tally))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let base = args.next().unwrap_or_else(|| "http://127.0.0.1:8000".to_string());
    let clients = args.next().map(|s| s.parse::<usize>()).transpose()?.unwrap_or(8).max(1);
    let total = args.next().map(|s| s.parse::<usize>()).transpose()?.unwrap_or(200);
    let url = format!("{}/ask", base.trim_end_matches('/'));

    let client = Client::builder().pool_idle_timeout(Duration::from_secs(10)).build()?;

    let start = Instant::now();
    let workers: Vec<_> = (0..clients)
        .map(|i| {
            // spread the remainder so exactly `total` requests are sent
            let share = total / clients + usize::from(i < total % clients);
            tokio::spawn(run_client(client.clone(), url.clone(), share))
        })
        .collect();

    let mut hist = Histogram::<u64>::new(3)?;
    let mut tally = Tally::default();
    for w in workers {
        let (h, t) = w.await??;
        hist.add(&h)?;
        tally.merge(&t);
    }
    let elapsed = start.elapsed();

    println!("{} GET {} from {} clients in {:?}", total, url, clients, elapsed);
    println!(
        "ok: {}  rejected(4xx): {}  backend(5xx): {}  transport: {}",
        tally.ok, tally.rejected, tally.upstream, tally.transport
    );
    if tally.ok > 0 {
        println!("throughput: {:.2} ok/s", tally.ok as f64 / elapsed.as_secs_f64());
        println!("avg reply: {} bytes", tally.completion_bytes / tally.ok);
        for q in [0.50, 0.95, 0.99] {
            println!("p{}: {} ms", (q * 100.0) as u32, hist.value_at_quantile(q));
        }
        println!("max: {} ms", hist.max());
    }
    Ok(())
}
