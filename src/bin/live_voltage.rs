use std::process::ExitCode;

use tokio::time::{Duration, sleep};
use tracing::{error, info};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

use live_voltage::acquisition::ScanSettings;
use live_voltage::acquisition::clock::MonotonicClock;
use live_voltage::acquisition::simulated::SimulatedSource;
use live_voltage::config::{RendererKind, StreamConfig};
use live_voltage::render::{AsciiChartRenderer, JsonLinesRenderer, Renderer};
use live_voltage::run_stream;
use live_voltage::stream::SampleStream;

/// Custom timer implementation to format log timestamps using the system's local timezone.
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Local::now();
        write!(w, "{}", now.format("%Y-%m-%dT%H:%M:%S%.3f"))
    }
}

/// Resolves on Ctrl-C, or after `max_duration_secs` when configured.
async fn shutdown_signal(max_duration_secs: Option<u64>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    match max_duration_secs {
        Some(secs) => {
            tokio::select! {
                _ = ctrl_c => {}
                _ = sleep(Duration::from_secs(secs)) => {
                    info!("⏱️ Reached configured duration of {}s.", secs);
                }
            }
        }
        None => ctrl_c.await,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout stays free for the chart / JSON frames.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_timer(LocalTimer)
        .with_writer(std::io::stderr)
        .init();

    // Fail fast: nothing works without a valid config.
    let loaded = match std::env::args().nth(1) {
        Some(path) => StreamConfig::load_from(path),
        None => StreamConfig::load(),
    };
    let cfg = match loaded {
        Ok(c) => c,
        Err(e) => {
            error!("❌ Critical Error: Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let scan = ScanSettings::from(&cfg.acquisition);
    let clock = MonotonicClock::new();
    let mut source = SimulatedSource::new(cfg.source.clone(), clock);

    let mut renderer: Box<dyn Renderer> = match cfg.display.renderer {
        RendererKind::Ascii => Box::new(AsciiChartRenderer::new(&cfg.display, std::io::stdout())),
        RendererKind::Json => Box::new(JsonLinesRenderer::new(std::io::stdout())),
    };

    let mut stream = match SampleStream::new(
        cfg.capacity(),
        cfg.display.window_seconds as f64,
        cfg.acquisition.samples_per_channel,
    ) {
        Ok(s) => s,
        Err(e) => {
            error!("❌ Critical Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "🚀 Starting live voltage stream ({} Hz, channels {:?}, {}s window)",
        cfg.acquisition.sample_rate, cfg.acquisition.channels, cfg.display.window_seconds
    );

    let result = run_stream(
        &mut stream,
        &mut source,
        &clock,
        &mut renderer,
        &scan,
        &cfg.display,
        shutdown_signal(cfg.max_duration_secs),
    )
    .await;

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ Stream aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}
