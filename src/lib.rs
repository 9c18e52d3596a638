// src/lib.rs

pub mod acquisition;
pub mod common;
pub mod config;
pub mod error;
pub mod render;
pub mod stream;

use std::future::Future;

use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{debug, info, trace, warn};

use crate::acquisition::{Clock, DataSource, ScanSettings};
use crate::config::DisplayConfig;
use crate::error::StreamError;
use crate::render::Renderer;
use crate::stream::{Lifecycle, SampleStream, StreamSummary, TickOutcome};

/// Main sampling loop.
/// Starts the scan, then polls the source once per tick, redrawing every
/// `redraw_every` ticks until `shutdown` resolves. The stream is stopped,
/// redrawn one last time, and the scan cleaned up before returning.
///
/// Read failures never end the loop; only a lifecycle violation does.
pub async fn run_stream<S, C, R, F>(
    stream: &mut SampleStream,
    source: &mut S,
    clock: &C,
    renderer: &mut R,
    scan: &ScanSettings,
    display_cfg: &DisplayConfig,
    shutdown: F,
) -> Result<StreamSummary, StreamError>
where
    S: DataSource + ?Sized,
    C: Clock + ?Sized,
    R: Renderer + ?Sized,
    F: Future<Output = ()>,
{
    source.start_scan(scan).map_err(StreamError::ScanStart)?;

    let result = sample_until(stream, source, clock, renderer, display_cfg, shutdown).await;

    // Late ticks from here on are no-ops.
    stream.stop();
    redraw(renderer, stream);

    if let Err(e) = source.stop_scan() {
        warn!("Failed to stop scan cleanly: {}", e);
    }

    let summary = stream.summary();
    info!(
        "Stream stopped: {} ticks, {} samples, {} empty reads, {} read errors",
        summary.ticks, summary.appended, summary.empty_reads, summary.read_failures
    );

    result.map(|_| summary)
}

async fn sample_until<S, C, R, F>(
    stream: &mut SampleStream,
    source: &mut S,
    clock: &C,
    renderer: &mut R,
    display_cfg: &DisplayConfig,
    shutdown: F,
) -> Result<(), StreamError>
where
    S: DataSource + ?Sized,
    C: Clock + ?Sized,
    R: Renderer + ?Sized,
    F: Future<Output = ()>,
{
    if stream.lifecycle() == Lifecycle::NotStarted {
        stream.start(clock.now())?;
    }

    let mut ticker = interval(Duration::from_millis(display_cfg.tick_interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let redraw_every = display_cfg.redraw_every.max(1);

    info!(
        "✅ Sampling every {} ms (capacity {} points, redraw every {} ticks)",
        display_cfg.tick_interval_ms,
        stream.capacity(),
        redraw_every
    );

    tokio::pin!(shutdown);
    let mut frame: u64 = 0;

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                info!("🛑 Shutdown requested.");
                return Ok(());
            }
            _ = ticker.tick() => {
                frame += 1;
                match stream.poll(source, clock)? {
                    TickOutcome::Appended(sample) => {
                        trace!("Frame {}: {:.6} V at {:.3}s", frame, sample.value, sample.elapsed);
                    }
                    TickOutcome::Ignored => {
                        debug!("Stream already stopped, leaving loop.");
                        return Ok(());
                    }
                    TickOutcome::Empty | TickOutcome::ReadFailed => {}
                }

                if frame % redraw_every == 0 {
                    redraw(renderer, stream);
                }
            }
        }
    }
}

fn redraw<R: Renderer + ?Sized>(renderer: &mut R, stream: &SampleStream) {
    if let Err(e) = renderer.draw(&stream.visible_window()) {
        warn!("Redraw failed: {}", e);
    }
}
