//! Sign/verify timing table for every supported scheme.
//!
//! Usage: `cryptoplay-speed [iterations] [message]`

use std::{env, process::ExitCode};

use anyhow::{Context, Result};
use cryptoplay_core::signature::SchemeKind;
use cryptoplay_core::speed::{self, DEFAULT_MESSAGE};
use tracing_subscriber::EnvFilter;

fn run() -> Result<()> {
    let mut args = env::args().skip(1);
    let iterations: u32 = match args.next() {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("iterations must be a positive integer, got {raw:?}"))?,
        None => 10,
    };
    let message = args.next().unwrap_or_else(|| DEFAULT_MESSAGE.to_string());

    println!("message: {message:?}, {iterations} iterations\n");
    println!(
        "{:<16} {:>12} {:>12} {:>10} {:>10}  {}",
        "scheme", "sign ms", "verify ms", "sign/s", "verify/s", "ok"
    );
    for timing in speed::compare(&SchemeKind::ALL, message.as_bytes(), iterations)? {
        let per_sec = |ms: f64| if ms > 0.0 { 1_000.0 / ms } else { f64::INFINITY };
        println!(
            "{:<16} {:>12.3} {:>12.3} {:>10.0} {:>10.0}  {}",
            timing.scheme.name(),
            timing.sign_ms,
            timing.verify_ms,
            per_sec(timing.sign_ms),
            per_sec(timing.verify_ms),
            if timing.valid { "yes" } else { "NO" }
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
