//! Bounded time/voltage series fed by periodic polls.
//!
//! `SampleStream` owns two ring buffers (elapsed seconds, averaged value)
//! that grow and evict together. Each tick folds one raw batch into a single
//! point; the renderer reads the most recent window back out.

use tracing::{debug, warn};

use crate::acquisition::{Clock, DataSource};
use crate::common::ring_buffer::RingBuffer;
use crate::error::{SourceError, StreamError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    NotStarted,
    Running,
    Stopped,
}

/// One averaged reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Seconds since `start`.
    pub elapsed: f64,
    pub value: f64,
}

/// What a tick did to the stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    Appended(Sample),
    /// The source had nothing ready.
    Empty,
    /// The read failed; reported through the hook, buffers untouched.
    ReadFailed,
    /// Tick arrived after `stop`.
    Ignored,
}

/// Snapshot handed to a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleWindow {
    pub times: Vec<f64>,
    pub values: Vec<f64>,
    /// Suggested x-axis range, `[max(0, latest - window), latest]`.
    pub range: (f64, f64),
}

impl VisibleWindow {
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Context passed along with a failed read.
#[derive(Debug, Clone, Copy)]
pub struct ReadFailure<'a> {
    pub error: &'a SourceError,
    /// Tick number the failure happened on (1-based).
    pub tick: u64,
    /// Failures in a row, this one included.
    pub consecutive: u64,
}

/// Receives transient read failures. Deciding whether a run of failures means
/// the device is gone is up to the implementor.
pub trait ReadErrorReporter {
    fn report(&mut self, failure: ReadFailure<'_>);
}

impl<F: FnMut(ReadFailure<'_>)> ReadErrorReporter for F {
    fn report(&mut self, failure: ReadFailure<'_>) {
        self(failure)
    }
}

/// Default reporter: one warning per failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ReadErrorReporter for LogReporter {
    fn report(&mut self, failure: ReadFailure<'_>) {
        warn!(
            "Error reading data on tick {}: {} ({} in a row)",
            failure.tick, failure.error, failure.consecutive
        );
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub ticks: u64,
    pub appended: u64,
    pub empty_reads: u64,
    pub read_failures: u64,
    pub consecutive_failures: u64,
}

pub struct SampleStream {
    time_buffer: RingBuffer<f64>,
    voltage_buffer: RingBuffer<f64>,
    window_seconds: f64,
    samples_per_read: usize,
    lifecycle: Lifecycle,
    start_time: Option<f64>,
    summary: StreamSummary,
    reporter: Box<dyn ReadErrorReporter>,
}

impl SampleStream {
    /// Fails with `ZeroCapacity` when `capacity` is 0 (see `StreamConfig::capacity`).
    pub fn new(
        capacity: usize,
        window_seconds: f64,
        samples_per_read: usize,
    ) -> Result<Self, StreamError> {
        if capacity == 0 {
            return Err(StreamError::ZeroCapacity);
        }
        Ok(Self {
            time_buffer: RingBuffer::new(capacity),
            voltage_buffer: RingBuffer::new(capacity),
            window_seconds,
            samples_per_read,
            lifecycle: Lifecycle::NotStarted,
            start_time: None,
            summary: StreamSummary::default(),
            reporter: Box::new(LogReporter),
        })
    }

    pub fn with_reporter(mut self, reporter: impl ReadErrorReporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn start(&mut self, now: f64) -> Result<(), StreamError> {
        if self.lifecycle != Lifecycle::NotStarted {
            return Err(StreamError::InvalidState {
                operation: "start",
                state: self.lifecycle,
            });
        }
        self.start_time = Some(now);
        self.lifecycle = Lifecycle::Running;
        debug!("Stream started at t={:.3}s", now);
        Ok(())
    }

    /// Folds the result of one source read into the series.
    pub fn on_tick(
        &mut self,
        raw_batch: Result<&[f64], SourceError>,
        now: f64,
    ) -> Result<TickOutcome, StreamError> {
        let start_time = match (self.lifecycle, self.start_time) {
            (Lifecycle::Running, Some(t)) => t,
            (Lifecycle::Stopped, _) => return Ok(TickOutcome::Ignored),
            (state, _) => {
                return Err(StreamError::InvalidState {
                    operation: "tick",
                    state,
                });
            }
        };

        self.summary.ticks += 1;

        let batch = match raw_batch {
            Ok(batch) => batch,
            Err(error) => {
                self.summary.read_failures += 1;
                self.summary.consecutive_failures += 1;
                self.reporter.report(ReadFailure {
                    error: &error,
                    tick: self.summary.ticks,
                    consecutive: self.summary.consecutive_failures,
                });
                return Ok(TickOutcome::ReadFailed);
            }
        };
        self.summary.consecutive_failures = 0;

        if batch.is_empty() {
            self.summary.empty_reads += 1;
            debug!("No data returned on tick {}", self.summary.ticks);
            return Ok(TickOutcome::Empty);
        }

        let value = batch.iter().sum::<f64>() / batch.len() as f64;
        let elapsed = now - start_time;

        self.time_buffer.push(elapsed);
        self.voltage_buffer.push(value);
        self.summary.appended += 1;

        Ok(TickOutcome::Appended(Sample { elapsed, value }))
    }

    /// Reads one batch from `source` and ticks with it.
    pub fn poll<S, C>(&mut self, source: &mut S, clock: &C) -> Result<TickOutcome, StreamError>
    where
        S: DataSource + ?Sized,
        C: Clock + ?Sized,
    {
        match self.lifecycle {
            Lifecycle::Running => {}
            Lifecycle::Stopped => return Ok(TickOutcome::Ignored),
            state => {
                return Err(StreamError::InvalidState {
                    operation: "tick",
                    state,
                });
            }
        }

        let read = source.read(self.samples_per_read);
        let now = clock.now();
        match read {
            Ok(batch) => self.on_tick(Ok(batch.as_slice()), now),
            Err(e) => self.on_tick(Err(e), now),
        }
    }

    pub fn visible_window(&self) -> VisibleWindow {
        let range = match self.time_buffer.last() {
            Some(&latest) => ((latest - self.window_seconds).max(0.0), latest),
            None => (0.0, 0.0),
        };
        VisibleWindow {
            times: self.time_buffer.get_as_vec(),
            values: self.voltage_buffer.get_as_vec(),
            range,
        }
    }

    /// Idempotent. A stream stopped before it ever started stays stopped.
    pub fn stop(&mut self) {
        if self.lifecycle != Lifecycle::Stopped {
            debug!("Stream stopped after {} ticks", self.summary.ticks);
        }
        self.lifecycle = Lifecycle::Stopped;
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    pub fn tick_count(&self) -> u64 {
        self.summary.ticks
    }

    pub fn len(&self) -> usize {
        self.time_buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.time_buffer.capacity()
    }

    pub fn summary(&self) -> StreamSummary {
        self.summary
    }
}
