//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files, and building
//! the immutable [`FrameTranscoder`] it describes.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::controller::button::{ButtonMapping, ButtonRemapper, ButtonRoute};
use crate::controller::calibration::{
    AxisCalibration, DeadZone, SampleEncoding, BREAKPOINTS, DEFAULT_DEAD_ZONE, DEFAULT_FULL_SCALE,
    DEFAULT_SOURCE_HALF_RANGE,
};
use crate::controller::transcoder::FrameTranscoder;
use crate::controller::MappingError;
use crate::error::{RemapError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub adapter: AdapterConfig,
    #[serde(default)]
    pub dead_zone: DeadZoneConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub buttons: Vec<ButtonConfig>,
    #[serde(default)]
    pub axes: Vec<AxisConfig>,
}

/// Source frame configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_frame_len")]
    pub frame_len: usize,
}

/// Adapter frame configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AdapterConfig {
    #[serde(default)]
    pub unmapped_axis: u8,
}

/// Dead zone configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DeadZoneConfig {
    #[serde(default = "default_dead_zone")]
    pub value: f32,

    #[serde(default = "default_full_scale")]
    pub full_scale: f32,

    #[serde(default = "default_source_half_range")]
    pub source_half_range: f32,
}

/// Polling loop configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    #[serde(default = "default_rate_hz")]
    pub rate_hz: u32,

    #[serde(default = "default_log_interval_frames")]
    pub log_interval_frames: u64,
}

/// Capture replay configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CaptureConfig {
    #[serde(default)]
    pub input: Option<PathBuf>,

    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub repeat: bool,
}

/// One `[[buttons]]` entry
#[derive(Debug, Deserialize, Clone)]
pub struct ButtonConfig {
    pub name: String,
    pub source_field: usize,
    pub source_mask: u8,
    pub dest_mask: u16,
}

/// One `[[axes]]` entry
///
/// `source` lists either all six breakpoints, or the four outer ones
/// (`S1, S2, S5, S6`) together with `dead_zone_neutral`, in which case
/// `S3`/`S4` are derived from `[dead_zone]`.
#[derive(Debug, Deserialize, Clone)]
pub struct AxisConfig {
    pub name: String,
    pub source_field: usize,
    pub dest_field: usize,

    #[serde(default)]
    pub encoding: SampleEncoding,

    pub source: Vec<f32>,
    pub dest: Vec<f32>,

    #[serde(default)]
    pub dead_zone_neutral: Option<f32>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { frame_len: default_frame_len() }
    }
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self { unmapped_axis: 0 }
    }
}

impl Default for DeadZoneConfig {
    fn default() -> Self {
        Self {
            value: default_dead_zone(),
            full_scale: default_full_scale(),
            source_half_range: default_source_half_range(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            rate_hz: default_rate_hz(),
            log_interval_frames: default_log_interval_frames(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: default_output(),
            repeat: false,
        }
    }
}

// Default value functions
fn default_frame_len() -> usize { 8 }

fn default_dead_zone() -> f32 { DEFAULT_DEAD_ZONE }
fn default_full_scale() -> f32 { DEFAULT_FULL_SCALE }
fn default_source_half_range() -> f32 { DEFAULT_SOURCE_HALF_RANGE }

fn default_rate_hz() -> u32 { 125 }
fn default_log_interval_frames() -> u64 { 1000 }

fn default_output() -> String { "-".to_string() }

/// Highest supported polling rate
pub const MAX_RATE_HZ: u32 = 1000;

/// Longest supported source frame
pub const MAX_FRAME_LEN: usize = 64;

fn invalid(msg: impl std::fmt::Display) -> RemapError {
    RemapError::Config(toml::de::Error::custom(msg))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pad_transcoder::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// let transcoder = config.build_transcoder()?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;
        info!(
            "Loaded configuration from {} ({} buttons, {} axes)",
            path.display(),
            config.buttons.len(),
            config.axes.len()
        );
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// File-level checks only. Per-mapping contracts are enforced when the
    /// transcoder is built.
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        // Validate source frame
        if self.source.frame_len == 0 || self.source.frame_len > MAX_FRAME_LEN {
            return Err(invalid(format!(
                "frame_len must be between 1 and {}",
                MAX_FRAME_LEN
            )));
        }

        // Validate polling
        if self.poll.rate_hz == 0 || self.poll.rate_hz > MAX_RATE_HZ {
            return Err(invalid(format!(
                "rate_hz must be between 1 and {}",
                MAX_RATE_HZ
            )));
        }

        if self.poll.log_interval_frames == 0 {
            return Err(invalid("log_interval_frames must be greater than 0"));
        }

        // Validate capture
        if self.capture.output.is_empty() {
            return Err(invalid("capture output cannot be empty (use \"-\" for stdout)"));
        }

        // Validate dead zone
        self.dead_zone()?;

        // Validate axis entry shapes
        for axis in &self.axes {
            if axis.dest.len() != BREAKPOINTS {
                return Err(invalid(format!(
                    "axis '{}': dest must list {} breakpoints",
                    axis.name, BREAKPOINTS
                )));
            }
            match (axis.source.len(), axis.dead_zone_neutral) {
                (BREAKPOINTS, None) | (4, Some(_)) => {}
                (BREAKPOINTS, Some(_)) => {
                    return Err(invalid(format!(
                        "axis '{}': dead_zone_neutral requires 4 outer source breakpoints",
                        axis.name
                    )));
                }
                _ => {
                    return Err(invalid(format!(
                        "axis '{}': source must list {} breakpoints, or 4 with dead_zone_neutral",
                        axis.name, BREAKPOINTS
                    )));
                }
            }
        }

        // Validate names are unique
        let mut names: Vec<&str> = self
            .buttons
            .iter()
            .map(|b| b.name.as_str())
            .chain(self.axes.iter().map(|a| a.name.as_str()))
            .collect();
        names.sort_unstable();
        if let Some(pair) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(invalid(format!("mapping name '{}' is used twice", pair[0])));
        }

        Ok(())
    }

    /// The configured dead zone
    ///
    /// # Errors
    ///
    /// Returns error if the dead zone parameters are invalid
    pub fn dead_zone(&self) -> Result<DeadZone> {
        DeadZone::new(
            self.dead_zone.value,
            self.dead_zone.full_scale,
            self.dead_zone.source_half_range,
        )
        .map_err(|e| RemapError::mapping("dead_zone", e))
    }

    /// Builds the calibration for one axis entry
    ///
    /// # Errors
    ///
    /// Returns a `Mapping` error naming the entry if its breakpoints are invalid
    pub fn axis_calibration(&self, axis: &AxisConfig) -> Result<AxisCalibration> {
        let dest = to_breakpoints(&axis.name, &axis.dest)?;
        let source = match axis.dead_zone_neutral {
            Some(neutral) => {
                let outer: [f32; 4] = axis
                    .source
                    .as_slice()
                    .try_into()
                    .map_err(|_| {
                        invalid(format!(
                            "axis '{}': expected 4 outer source breakpoints",
                            axis.name
                        ))
                    })?;
                self.dead_zone()?.source_breakpoints(outer, neutral)
            }
            None => to_breakpoints(&axis.name, &axis.source)?,
        };

        debug!(
            "Axis '{}': field {} -> axis {}, S = {:?}, D = {:?}",
            axis.name, axis.source_field, axis.dest_field, source, dest
        );

        AxisCalibration::with_encoding(
            axis.source_field,
            axis.dest_field,
            axis.encoding,
            source,
            dest,
        )
            .map_err(|e| RemapError::mapping(&axis.name, e))
    }

    /// Builds the immutable frame transcoder described by this configuration
    ///
    /// Every mapping is checked here. Nothing is transcoded if any entry is
    /// malformed.
    ///
    /// # Errors
    ///
    /// Returns a `Mapping` error naming the first offending entry
    pub fn build_transcoder(&self) -> Result<FrameTranscoder> {
        let frame_len = self.source.frame_len;

        let mut routes = Vec::with_capacity(self.buttons.len());
        for button in &self.buttons {
            let mapping =
                ButtonMapping::new(button.source_field, button.source_mask, button.dest_mask);
            let route = ButtonRoute::compile(mapping, frame_len)
                .map_err(|e| RemapError::mapping(&button.name, e))?;
            routes.push(route);
        }

        let axes = self
            .axes
            .iter()
            .map(|axis| self.axis_calibration(axis))
            .collect::<Result<Vec<_>>>()?;

        FrameTranscoder::from_parts(
            ButtonRemapper::from_routes(routes),
            axes,
            frame_len,
            self.adapter.unmapped_axis,
        )
        .map_err(|e| {
            let name = self.offending_axis(&e).unwrap_or("axes").to_string();
            RemapError::mapping(name, e)
        })
    }

    /// Name of the axis entry a layout error refers to
    fn offending_axis(&self, err: &MappingError) -> Option<&str> {
        let found = match *err {
            MappingError::SourceFieldOutOfBounds { field, .. } => {
                self.axes.iter().find(|a| a.source_field == field)
            }
            MappingError::DestFieldOutOfBounds { field, .. } => {
                self.axes.iter().find(|a| a.dest_field == field)
            }
            MappingError::DuplicateDestField { field } => {
                self.axes.iter().filter(|a| a.dest_field == field).nth(1)
            }
            _ => None,
        };
        found.map(|a| a.name.as_str())
    }
}

fn to_breakpoints(name: &str, values: &[f32]) -> Result<[f32; BREAKPOINTS]> {
    values
        .try_into()
        .map_err(|_| invalid(format!("axis '{}': expected {} breakpoints", name, BREAKPOINTS)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
[source]
frame_len = 8

[dead_zone]
value = 4960

[[buttons]]
name = "Z"
source_field = 0
source_mask = 0x40
dest_mask = 0x0008

[[buttons]]
name = "START"
source_field = 1
source_mask = 0x02
dest_mask = 0x0001

[[axes]]
name = "stick_x"
source_field = 3
dest_field = 0
source = [25, 71, 185, 231]
dead_zone_neutral = 128
dest = [48, 88, 128, 128, 168, 208]

[[axes]]
name = "c_x"
source_field = 5
dest_field = 2
source = [0, 51, 102, 153, 204, 255]
dest = [0, 51, 102, 153, 204, 255]
"#;

    fn valid() -> Config {
        Config::from_toml(VALID).unwrap()
    }

    // ==================== Parsing Tests ====================

    #[test]
    fn test_parse_valid() {
        let config = valid();
        assert_eq!(config.source.frame_len, 8);
        assert_eq!(config.buttons.len(), 2);
        assert_eq!(config.buttons[0].source_mask, 0x40);
        assert_eq!(config.buttons[0].dest_mask, 0x0008);
        assert_eq!(config.axes.len(), 2);
        assert_eq!(config.axes[0].dead_zone_neutral, Some(128.0));
        assert_eq!(config.axes[0].encoding, SampleEncoding::Unsigned);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.source.frame_len, 8);
        assert_eq!(config.adapter.unmapped_axis, 0);
        assert_eq!(config.poll.rate_hz, 125);
        assert_eq!(config.poll.log_interval_frames, 1000);
        assert_eq!(config.capture.output, "-");
        assert!(config.capture.input.is_none());
        assert!(!config.capture.repeat);
        assert!(config.buttons.is_empty());
        assert!(config.axes.is_empty());
    }

    #[test]
    fn test_signed_encoding_parses() {
        let toml = r#"
[[axes]]
name = "stick_x"
source_field = 0
dest_field = 0
encoding = "signed"
source = [-63, -47, -19, 19, 47, 63]
dest = [48, 88, 128, 128, 168, 208]
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.axes[0].encoding, SampleEncoding::Signed);
        assert!(config.build_transcoder().is_ok());
    }

    #[test]
    fn test_unknown_encoding_rejected() {
        let toml = r#"
[[axes]]
name = "stick_x"
source_field = 0
dest_field = 0
encoding = "gray"
source = [0, 51, 102, 153, 204, 255]
dest = [0, 51, 102, 153, 204, 255]
"#;
        assert!(Config::from_toml(toml).is_err());
    }

    #[test]
    fn test_mask_wider_than_byte_rejected() {
        let toml = r#"
[[buttons]]
name = "Z"
source_field = 0
source_mask = 0x100
dest_mask = 0x0008
"#;
        assert!(matches!(Config::from_toml(toml), Err(RemapError::Config(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(VALID.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let result = Config::load(temp_file.path());
        assert!(result.is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Config::load("/nonexistent/pad-transcoder.toml"),
            Err(RemapError::Io(_))
        ));
    }

    #[test]
    fn test_shipped_default_config() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/default.toml");
        let config = Config::load(path).unwrap();
        let transcoder = config.build_transcoder().unwrap();
        assert_eq!(transcoder.button_count(), 6);
        assert_eq!(transcoder.axes().len(), 4);

        let neutral = transcoder.transcode(&[0, 0, 8, 128, 127, 128, 127, 0]);
        assert_eq!(neutral.buttons, 0);
        assert_eq!(neutral.axes, [128, 128, 128, 128, 0, 0]);
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_frame_len_zero() {
        let mut config = valid();
        config.source.frame_len = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_frame_len_too_long() {
        let mut config = valid();
        config.source.frame_len = MAX_FRAME_LEN + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rate_hz_zero() {
        let mut config = valid();
        config.poll.rate_hz = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rate_hz_too_high() {
        let mut config = valid();
        config.poll.rate_hz = 1001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_rates() {
        for rate in [125, 250, 500, 1000] {
            let mut config = valid();
            config.poll.rate_hz = rate;
            assert!(config.validate().is_ok(), "rate {} should be valid", rate);
        }
    }

    #[test]
    fn test_log_interval_zero() {
        let mut config = valid();
        config.poll.log_interval_frames = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_output() {
        let mut config = valid();
        config.capture.output = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_dead_zone() {
        let mut config = valid();
        config.dead_zone.value = -1.0;
        assert!(matches!(
            config.validate(),
            Err(RemapError::Mapping { ref name, .. }) if name == "dead_zone"
        ));
    }

    #[test]
    fn test_dest_wrong_length() {
        let mut config = valid();
        config.axes[1].dest.pop();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_source_wrong_length() {
        let mut config = valid();
        config.axes[1].source.truncate(5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_six_source_with_neutral_rejected() {
        let mut config = valid();
        config.axes[1].dead_zone_neutral = Some(128.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_four_source_without_neutral_rejected() {
        let mut config = valid();
        config.axes[0].dead_zone_neutral = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut config = valid();
        config.axes[1].name = "Z".to_string();
        assert!(config.validate().is_err());
    }

    // ==================== Build Tests ====================

    #[test]
    fn test_build_transcoder() {
        let transcoder = valid().build_transcoder().unwrap();
        let frame = transcoder.transcode(&[0x40, 0x02, 8, 255, 127, 10, 127, 0]);
        assert_eq!(frame.buttons, 0x0009);
        assert_eq!(frame.axes[0], 208);
        assert_eq!(frame.axes[2], 10);
    }

    #[test]
    fn test_derived_dead_zone_breakpoints() {
        let config = valid();
        let cal = config.axis_calibration(&config.axes[0]).unwrap();
        assert!((cal.source()[2] - 108.625).abs() < 1e-4);
        assert!((cal.source()[3] - 147.375).abs() < 1e-4);
    }

    #[test]
    fn test_dead_zone_widens_inner_breakpoints() {
        let mut config = valid();
        config.dead_zone.value = 6272.0;
        let cal = config.axis_calibration(&config.axes[0]).unwrap();
        assert!((cal.source()[2] - 103.5).abs() < 1e-4);
        assert!((cal.source()[3] - 152.5).abs() < 1e-4);
    }

    #[test]
    fn test_bad_button_mask_names_entry() {
        let mut config = valid();
        config.buttons[1].source_mask = 0x03;
        match config.build_transcoder() {
            Err(RemapError::Mapping { name, source }) => {
                assert_eq!(name, "START");
                assert!(matches!(source, MappingError::InvalidMask { .. }));
            }
            other => panic!("expected mapping error, got {:?}", other),
        }
    }

    #[test]
    fn test_button_field_outside_frame() {
        let mut config = valid();
        config.buttons[0].source_field = 8;
        assert!(matches!(
            config.build_transcoder(),
            Err(RemapError::Mapping { ref name, .. }) if name == "Z"
        ));
    }

    #[test]
    fn test_dead_zone_overlapping_outer_breakpoints() {
        let mut config = valid();
        // offset = 128 * 16384 / 32768 = 64, so S3 = 64 < S2 = 71
        config.dead_zone.value = 16384.0;
        assert!(matches!(
            config.build_transcoder(),
            Err(RemapError::Mapping {
                ref name,
                source: MappingError::NonMonotonicBreakpoints { .. }
            }) if name == "stick_x"
        ));
    }

    #[test]
    fn test_duplicate_dest_field_names_entry() {
        let mut config = valid();
        config.axes[1].dest_field = 0;
        assert!(matches!(
            config.build_transcoder(),
            Err(RemapError::Mapping {
                ref name,
                source: MappingError::DuplicateDestField { field: 0 }
            }) if name == "c_x"
        ));
    }

    #[test]
    fn test_axis_dest_field_out_of_range() {
        let mut config = valid();
        config.axes[1].dest_field = 9;
        assert!(config.build_transcoder().is_err());
    }

    #[test]
    fn test_unmapped_axis_value_applied() {
        let mut config = valid();
        config.adapter.unmapped_axis = 128;
        let transcoder = config.build_transcoder().unwrap();
        assert_eq!(transcoder.neutral_frame().axes[5], 128);
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_frame_len(), 8);
        assert_eq!(default_dead_zone(), 4960.0);
        assert_eq!(default_full_scale(), 32768.0);
        assert_eq!(default_source_half_range(), 128.0);
        assert_eq!(default_rate_hz(), 125);
        assert_eq!(default_log_interval_frames(), 1000);
        assert_eq!(default_output(), "-");
    }
}
