use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::{Clock, DataSource, ScanSettings};
use crate::config::{MAX_CHANNELS, SourceConfig};
use crate::error::SourceError;

/// Software stand-in for the analog input board: a sine wave plus uniform
/// noise, produced at the scan's sample rate as wall time passes.
///
/// Reads never block. Samples that became due since the last read are
/// returned (at most `max_samples` per channel); the remainder stays queued
/// for the next read, like the board's scan buffer.
pub struct SimulatedSource<C: Clock> {
    cfg: SourceConfig,
    clock: C,
    rng: StdRng,
    scan: Option<ActiveScan>,
}

struct ActiveScan {
    settings: ScanSettings,
    started_at: f64,
    // Per-channel samples already handed out.
    produced: u64,
}

impl<C: Clock> SimulatedSource<C> {
    pub fn new(cfg: SourceConfig, clock: C) -> Self {
        Self {
            cfg,
            clock,
            rng: StdRng::from_entropy(),
            scan: None,
        }
    }

    pub fn with_seed(cfg: SourceConfig, clock: C, seed: u64) -> Self {
        Self {
            cfg,
            clock,
            rng: StdRng::seed_from_u64(seed),
            scan: None,
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.scan.is_some()
    }

    fn sample_at(&mut self, t: f64, channel: u8) -> f64 {
        let noise = if self.cfg.noise > 0.0 {
            self.rng.gen_range(-self.cfg.noise..=self.cfg.noise)
        } else {
            0.0
        };
        // Channels are phase-shifted so a multi-channel mean is not trivially identical.
        let phase = channel as f64 * TAU / 8.0;
        self.cfg.offset + self.cfg.amplitude * (TAU * self.cfg.frequency_hz * t + phase).sin() + noise
    }
}

impl<C: Clock> DataSource for SimulatedSource<C> {
    fn read(&mut self, max_samples: usize) -> Result<Vec<f64>, SourceError> {
        let now = self.clock.now();
        let (settings, started_at, produced) = match &self.scan {
            Some(scan) => (scan.settings, scan.started_at, scan.produced),
            None => return Err(SourceError::NotScanning),
        };

        if self.cfg.fault_rate > 0.0 && self.rng.gen_bool(self.cfg.fault_rate) {
            return Err(SourceError::Device("simulated read fault".into()));
        }

        let rate = settings.sample_rate as f64;
        let due = ((now - started_at).max(0.0) * rate).floor() as u64;
        let take = due.saturating_sub(produced).min(max_samples as u64);

        let channels: Vec<u8> = (0..MAX_CHANNELS)
            .filter(|&ch| settings.channel_mask & (1u8 << ch) != 0)
            .collect();
        let mut batch = Vec::with_capacity(take as usize * settings.channel_count());
        for i in 0..take {
            let t = (produced + i) as f64 / rate;
            for &ch in &channels {
                batch.push(self.sample_at(t, ch));
            }
        }

        if let Some(scan) = self.scan.as_mut() {
            scan.produced += take;
        }
        Ok(batch)
    }

    fn start_scan(&mut self, settings: &ScanSettings) -> Result<(), SourceError> {
        if self.scan.take().is_some() {
            debug!("Cleared a scan left over from a previous run.");
        }
        self.scan = Some(ActiveScan {
            settings: *settings,
            started_at: self.clock.now(),
            produced: 0,
        });
        info!(
            "Simulated scan started: {} Hz, {} samples/channel, mask {:#04b}",
            settings.sample_rate, settings.samples_per_channel, settings.channel_mask
        );
        Ok(())
    }

    fn stop_scan(&mut self) -> Result<(), SourceError> {
        if let Some(scan) = self.scan.take() {
            info!("Simulated scan stopped after {} samples/channel.", scan.produced);
        }
        Ok(())
    }
}
