//! Acquisition collaborators
//!
//! - `clock`: monotonic and manual clocks
//! - `scripted`: deterministic replay source
//! - `simulated`: stand-in for the analog input board

pub mod clock;
pub mod scripted;
pub mod simulated;

use crate::config::AcquisitionConfig;
use crate::error::SourceError;

/// Continuous-scan parameters handed to a source before the first read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSettings {
    pub sample_rate: u32,
    pub samples_per_channel: usize,
    pub channel_mask: u8,
}

impl ScanSettings {
    pub fn channel_count(&self) -> usize {
        self.channel_mask.count_ones() as usize
    }
}

impl From<&AcquisitionConfig> for ScanSettings {
    fn from(cfg: &AcquisitionConfig) -> Self {
        Self {
            sample_rate: cfg.sample_rate,
            samples_per_channel: cfg.samples_per_channel,
            channel_mask: cfg.channel_mask(),
        }
    }
}

/// Pull-based sample source.
pub trait DataSource {
    /// Returns up to `max_samples` per enabled channel, flattened across
    /// channels. Must not block: returns an empty batch when nothing is ready.
    fn read(&mut self, max_samples: usize) -> Result<Vec<f64>, SourceError>;

    /// Clears any scan left over from a previous run and starts a continuous scan.
    fn start_scan(&mut self, _settings: &ScanSettings) -> Result<(), SourceError> {
        Ok(())
    }

    /// Stops the scan and releases its buffers.
    fn stop_scan(&mut self) -> Result<(), SourceError> {
        Ok(())
    }
}

impl<S: DataSource + ?Sized> DataSource for Box<S> {
    fn read(&mut self, max_samples: usize) -> Result<Vec<f64>, SourceError> {
        (**self).read(max_samples)
    }

    fn start_scan(&mut self, settings: &ScanSettings) -> Result<(), SourceError> {
        (**self).start_scan(settings)
    }

    fn stop_scan(&mut self) -> Result<(), SourceError> {
        (**self).stop_scan()
    }
}

/// Monotonic time source, in seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> f64 {
        (**self).now()
    }
}
