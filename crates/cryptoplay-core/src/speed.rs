//! Wall-clock sign/verify timings for the scheme comparison table.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PlaygroundError;
use crate::signature::SchemeKind;

/// Message signed by the comparison when the caller has no preference.
pub const DEFAULT_MESSAGE: &str = "Benchmarking cryptographic speed!";

/// Mean timings for one scheme.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    pub scheme: SchemeKind,
    pub iterations: u32,
    pub sign_ms: f64,
    pub verify_ms: f64,
    pub valid: bool,
}

fn mean_ms(total: Duration, iterations: u32) -> f64 {
    total.as_secs_f64() * 1_000.0 / f64::from(iterations)
}

/// Generate one key pair, then time `iterations` signatures and verifications.
pub fn measure(
    scheme: SchemeKind,
    message: &[u8],
    iterations: u32,
) -> Result<Timing, PlaygroundError> {
    if iterations == 0 {
        return Err(PlaygroundError::InvalidIterations);
    }
    let pair = scheme.generate()?;

    let mut signature = Vec::new();
    let started = Instant::now();
    for _ in 0..iterations {
        signature = scheme.sign(pair.secret(), message)?;
    }
    let sign_total = started.elapsed();

    let mut valid = false;
    let started = Instant::now();
    for _ in 0..iterations {
        valid = scheme.verify(pair.public(), message, &signature)?;
    }
    let verify_total = started.elapsed();

    let timing = Timing {
        scheme,
        iterations,
        sign_ms: mean_ms(sign_total, iterations),
        verify_ms: mean_ms(verify_total, iterations),
        valid,
    };
    debug!(
        %scheme,
        iterations,
        sign_ms = timing.sign_ms,
        verify_ms = timing.verify_ms,
        "measured scheme"
    );
    Ok(timing)
}

/// Run [`measure`] for every scheme in `schemes`, in order.
pub fn compare(
    schemes: &[SchemeKind],
    message: &[u8],
    iterations: u32,
) -> Result<Vec<Timing>, PlaygroundError> {
    schemes
        .iter()
        .map(|&scheme| measure(scheme, message, iterations))
        .collect()
}
