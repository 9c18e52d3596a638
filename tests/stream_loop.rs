use std::time::Duration;

use live_voltage::acquisition::clock::MonotonicClock;
use live_voltage::acquisition::scripted::ScriptedSource;
use live_voltage::acquisition::{DataSource, ScanSettings};
use live_voltage::config::DisplayConfig;
use live_voltage::error::{RenderError, SourceError, StreamError};
use live_voltage::render::Renderer;
use live_voltage::run_stream;
use live_voltage::stream::{Lifecycle, ReadFailure, SampleStream, VisibleWindow};

#[derive(Default)]
struct RecordingRenderer {
    frames: Vec<VisibleWindow>,
}

impl Renderer for RecordingRenderer {
    fn draw(&mut self, window: &VisibleWindow) -> Result<(), RenderError> {
        self.frames.push(window.clone());
        Ok(())
    }
}

fn scan() -> ScanSettings {
    ScanSettings {
        sample_rate: 100,
        samples_per_channel: 25,
        channel_mask: 0b1,
    }
}

fn display(redraw_every: u64) -> DisplayConfig {
    DisplayConfig {
        tick_interval_ms: 50,
        redraw_every,
        ..DisplayConfig::default()
    }
}

fn quiet_stream(capacity: usize) -> SampleStream {
    SampleStream::new(capacity, 300.0, 25)
        .unwrap()
        .with_reporter(|_: ReadFailure<'_>| {})
}

#[tokio::test(start_paused = true)]
async fn ticks_until_shutdown_and_keeps_last_points() {
    let mut source = ScriptedSource::new((0..40).map(|i| Ok(vec![i as f64, i as f64 + 2.0])));
    let clock = MonotonicClock::new();
    let mut renderer = RecordingRenderer::default();
    let mut stream = quiet_stream(8);

    let summary = run_stream(
        &mut stream,
        &mut source,
        &clock,
        &mut renderer,
        &scan(),
        &display(5),
        tokio::time::sleep(Duration::from_millis(1000)),
    )
    .await
    .unwrap();

    assert_eq!(stream.lifecycle(), Lifecycle::Stopped);
    assert!((20..=21).contains(&summary.ticks), "ticks = {}", summary.ticks);
    assert_eq!(summary.ticks as usize, source.reads());
    assert_eq!(summary.appended, summary.ticks);

    let window = stream.visible_window();
    assert_eq!(window.times.len(), 8);
    assert_eq!(window.values.len(), 8);

    // Means of [i, i + 2] are i + 1, oldest first.
    let last = summary.ticks as f64;
    let expected: Vec<f64> = (0..8).map(|k| last - 7.0 + k as f64).collect();
    assert_eq!(window.values, expected);
    assert!(window.times.windows(2).all(|w| w[0] < w[1]));

    // Periodic redraws plus the one after stop.
    assert_eq!(renderer.frames.len() as u64, summary.ticks / 5 + 1);
    assert_eq!(renderer.frames.last(), Some(&window));
}

#[tokio::test(start_paused = true)]
async fn read_errors_do_not_stop_the_loop() {
    let reads = (0..10)
        .map(|_| Err(SourceError::Disconnected))
        .chain((0..10).map(|i| Ok(vec![i as f64])));
    let mut source = ScriptedSource::new(reads);
    let clock = MonotonicClock::new();
    let mut renderer = RecordingRenderer::default();
    let mut stream = quiet_stream(100);

    let summary = run_stream(
        &mut stream,
        &mut source,
        &clock,
        &mut renderer,
        &scan(),
        &display(100),
        tokio::time::sleep(Duration::from_millis(1000)),
    )
    .await
    .unwrap();

    assert_eq!(summary.read_failures, 10);
    assert_eq!(summary.appended, 10);
    // Source ran dry after 20 reads; the remaining ticks are empty reads.
    assert_eq!(summary.empty_reads, summary.ticks - 20);
    assert_eq!(stream.len(), 10);
    assert_eq!(renderer.frames.len(), 1);
}

struct DeadBoard;

impl DataSource for DeadBoard {
    fn read(&mut self, _max_samples: usize) -> Result<Vec<f64>, SourceError> {
        Err(SourceError::NotScanning)
    }

    fn start_scan(&mut self, _settings: &ScanSettings) -> Result<(), SourceError> {
        Err(SourceError::Disconnected)
    }
}

#[tokio::test(start_paused = true)]
async fn failed_scan_start_is_fatal() {
    let clock = MonotonicClock::new();
    let mut renderer = RecordingRenderer::default();
    let mut stream = quiet_stream(4);

    let err = run_stream(
        &mut stream,
        &mut DeadBoard,
        &clock,
        &mut renderer,
        &scan(),
        &display(1),
        std::future::pending::<()>(),
    )
    .await
    .unwrap_err();

    assert_eq!(err, StreamError::ScanStart(SourceError::Disconnected));
    assert_eq!(stream.lifecycle(), Lifecycle::NotStarted);
    assert!(renderer.frames.is_empty());
}

#[tokio::test(start_paused = true)]
async fn stopped_stream_exits_on_first_tick() {
    let mut source = ScriptedSource::new([Ok(vec![1.0])]);
    let clock = MonotonicClock::new();
    let mut renderer = RecordingRenderer::default();
    let mut stream = quiet_stream(4);
    stream.stop();

    let summary = run_stream(
        &mut stream,
        &mut source,
        &clock,
        &mut renderer,
        &scan(),
        &display(1),
        std::future::pending::<()>(),
    )
    .await
    .unwrap();

    assert_eq!(summary.ticks, 0);
    assert_eq!(source.reads(), 0);
    assert!(stream.is_empty());
}
