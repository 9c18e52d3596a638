use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Number of analog inputs on the board.
pub const MAX_CHANNELS: u8 = 8;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Per-channel sample clock in Hz.
    pub sample_rate: u32,
    /// Samples requested per channel on each poll.
    pub samples_per_channel: usize,
    pub channels: Vec<u8>,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            sample_rate: 100,
            samples_per_channel: 25,
            channels: vec![0],
        }
    }
}

impl AcquisitionConfig {
    /// Bit mask with one bit set per enabled channel.
    pub fn channel_mask(&self) -> u8 {
        self.channels
            .iter()
            .filter(|&&ch| ch < MAX_CHANNELS)
            .fold(0u8, |mask, &ch| mask | (1u8 << ch))
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RendererKind {
    Ascii,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    pub window_seconds: u32,
    pub tick_interval_ms: u64,
    /// Redraw once every N ticks.
    pub redraw_every: u64,
    pub renderer: RendererKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub y_min: f64,
    pub y_max: f64,
    pub width: usize,
    pub height: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_seconds: 300,
            tick_interval_ms: 50,
            redraw_every: 20,
            renderer: RendererKind::Ascii,
            title: "Live Voltage Output".to_string(),
            x_label: "Time in Sec".to_string(),
            y_label: "Voltage (V)".to_string(),
            y_min: -0.01,
            y_max: 0.01,
            width: 72,
            height: 16,
        }
    }
}

/// Parameters of the simulated board.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourceConfig {
    pub amplitude: f64,
    pub frequency_hz: f64,
    pub offset: f64,
    pub noise: f64,
    /// Probability that a read fails, in [0, 1].
    pub fault_rate: f64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            amplitude: 0.005,
            frequency_hz: 0.2,
            offset: 0.0,
            noise: 0.0005,
            fault_rate: 0.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct StreamConfig {
    pub acquisition: AcquisitionConfig,
    pub display: DisplayConfig,
    pub source: SourceConfig,
    /// Stop on its own after this many seconds. Runs until Ctrl-C when absent.
    pub max_duration_secs: Option<u64>,
}

impl StreamConfig {
    /// Loads configuration from the 'config.yaml' file in the current working directory.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config.yaml")
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml_content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml_content)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: StreamConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Ring buffer capacity: one slot per poll across the display window.
    pub fn capacity(&self) -> usize {
        let acq = &self.acquisition;
        if acq.samples_per_channel == 0 {
            return 0;
        }
        self.display.window_seconds as usize * acq.sample_rate as usize / acq.samples_per_channel
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let acq = &self.acquisition;
        let display = &self.display;

        if acq.sample_rate == 0 {
            return Err(ConfigError::Invalid("acquisition.sample_rate must be > 0".into()));
        }
        if acq.samples_per_channel == 0 {
            return Err(ConfigError::Invalid(
                "acquisition.samples_per_channel must be > 0".into(),
            ));
        }
        if acq.channels.is_empty() {
            return Err(ConfigError::Invalid("acquisition.channels is empty".into()));
        }
        if let Some(ch) = acq.channels.iter().find(|&&ch| ch >= MAX_CHANNELS) {
            return Err(ConfigError::Invalid(format!(
                "channel {ch} out of range (board has {MAX_CHANNELS})"
            )));
        }
        if acq.channel_mask().count_ones() as usize != acq.channels.len() {
            return Err(ConfigError::Invalid("acquisition.channels has duplicates".into()));
        }
        if display.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("display.tick_interval_ms must be > 0".into()));
        }
        if display.redraw_every == 0 {
            return Err(ConfigError::Invalid("display.redraw_every must be > 0".into()));
        }
        if !(display.y_min < display.y_max) {
            return Err(ConfigError::Invalid(format!(
                "display.y_min ({}) must be below display.y_max ({})",
                display.y_min, display.y_max
            )));
        }
        if !(self.source.noise >= 0.0) {
            return Err(ConfigError::Invalid("source.noise must be >= 0".into()));
        }
        if !(0.0..=1.0).contains(&self.source.fault_rate) {
            return Err(ConfigError::Invalid("source.fault_rate must be within [0, 1]".into()));
        }
        if self.capacity() == 0 {
            return Err(ConfigError::Invalid(format!(
                "window of {}s at {} Hz holds no {}-sample polls",
                display.window_seconds, acq.sample_rate, acq.samples_per_channel
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = StreamConfig::from_yaml_str("{}").unwrap();
        assert_eq!(cfg.acquisition.sample_rate, 100);
        assert_eq!(cfg.acquisition.samples_per_channel, 25);
        assert_eq!(cfg.display.window_seconds, 300);
        assert_eq!(cfg.display.tick_interval_ms, 50);
        assert_eq!(cfg.display.renderer, RendererKind::Ascii);
        // 300 s * 100 Hz / 25 per poll
        assert_eq!(cfg.capacity(), 1200);
        assert!(cfg.max_duration_secs.is_none());
    }

    #[test]
    fn parses_dual_channel_setup() {
        let yaml = r#"
acquisition:
  sample_rate: 200
  samples_per_channel: 50
  channels: [0, 1]
display:
  window_seconds: 60
  renderer: json
max_duration_secs: 10
"#;
        let cfg = StreamConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.acquisition.channel_mask(), 0b11);
        assert_eq!(cfg.display.renderer, RendererKind::Json);
        assert_eq!(cfg.capacity(), 240);
        assert_eq!(cfg.max_duration_secs, Some(10));
    }

    #[test]
    fn capacity_uses_integer_division() {
        let mut cfg = StreamConfig::default();
        cfg.display.window_seconds = 1;
        cfg.acquisition.sample_rate = 100;
        cfg.acquisition.samples_per_channel = 30;
        assert_eq!(cfg.capacity(), 3);
    }

    #[test]
    fn rejects_zero_capacity() {
        let yaml = "display: { window_seconds: 0 }";
        assert!(matches!(StreamConfig::from_yaml_str(yaml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_bad_channels() {
        for yaml in [
            "acquisition: { channels: [] }",
            "acquisition: { channels: [8] }",
            "acquisition: { channels: [1, 1] }",
        ] {
            assert!(
                matches!(StreamConfig::from_yaml_str(yaml), Err(ConfigError::Invalid(_))),
                "{yaml} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_inverted_y_range() {
        let yaml = "display: { y_min: 1.0, y_max: -1.0 }";
        assert!(matches!(StreamConfig::from_yaml_str(yaml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_malformed_yaml() {
        assert!(matches!(
            StreamConfig::from_yaml_str("acquisition: [not, a, map]"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = StreamConfig::load_from("/nonexistent/live_voltage.yaml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/live_voltage.yaml"));
    }
}
