//! # Calibration Module
//!
//! Six-point axis calibration tables and the dead zone that shapes their
//! inner breakpoints.
//!
//! ## Breakpoints
//!
//! An [`AxisCalibration`] pairs six ordered source positions `S1..S6` with six
//! adapter values `D1..D6`. The pairs describe, from one physical extreme to
//! the other:
//!
//! | Pair | Role |
//! |------|------|
//! | S1/D1 | low saturation point |
//! | S2/D2 | outer ramp / inner ramp knee |
//! | S3/D3 | low edge of the dead zone |
//! | S4/D4 | high edge of the dead zone |
//! | S5/D5 | inner ramp / outer ramp knee |
//! | S6/D6 | high saturation point |
//!
//! `S` must be non-decreasing. `D` may run in either direction, which is how an
//! inverted axis is expressed.
//!
//! ## Dead Zone
//!
//! The dead zone is configured as a single value against a full-scale range
//! (4960 out of 32768 by default) and converted to source units around the
//! axis neutral point:
//!
//! `offset = source_half_range * value / full_scale`, `S3 = neutral - offset`,
//! `S4 = neutral + offset`
//!
//! ## Usage
//!
//! ```
//! use pad_transcoder::controller::calibration::{AxisCalibration, DeadZone};
//!
//! let dead_zone = DeadZone::default();
//! let (s3, s4) = dead_zone.inner_breakpoints(128.0);
//!
//! let cal = AxisCalibration::new(
//!     3,
//!     0,
//!     [25.0, 71.0, s3, s4, 185.0, 231.0],
//!     [48.0, 88.0, 128.0, 128.0, 168.0, 208.0],
//! )?;
//! assert_eq!(cal.neutral(), 128);
//! # Ok::<(), pad_transcoder::controller::MappingError>(())
//! ```

use serde::Deserialize;

use super::MappingError;

/// Number of breakpoints per axis.
pub const BREAKPOINTS: usize = 6;

/// Number of ramp segments between consecutive breakpoints.
pub const SEGMENTS: usize = BREAKPOINTS - 1;

/// Smallest representable adapter axis value.
pub const DEST_MIN: f32 = 0.0;

/// Largest representable adapter axis value.
pub const DEST_MAX: f32 = 255.0;

/// Default dead zone, in full-scale units.
pub const DEFAULT_DEAD_ZONE: f32 = 4960.0;

/// Default full-scale range the dead zone is expressed against.
pub const DEFAULT_FULL_SCALE: f32 = 32768.0;

/// Default half-range of the source axis, in raw units.
pub const DEFAULT_SOURCE_HALF_RANGE: f32 = 128.0;

/// How a source axis byte is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleEncoding {
    /// 0..=255, neutral near 128.
    #[default]
    Unsigned,
    /// Two's complement -128..=127, neutral near 0.
    Signed,
}

impl SampleEncoding {
    /// Reads a raw byte as a sample in this encoding.
    ///
    /// # Examples
    ///
    /// ```
    /// use pad_transcoder::controller::calibration::SampleEncoding;
    ///
    /// assert_eq!(SampleEncoding::Unsigned.decode(0xff), 255);
    /// assert_eq!(SampleEncoding::Signed.decode(0xff), -1);
    /// ```
    #[inline]
    #[must_use]
    pub fn decode(self, raw: u8) -> i32 {
        match self {
            Self::Unsigned => i32::from(raw),
            Self::Signed => i32::from(raw as i8),
        }
    }
}

/// Dead zone parameter used to derive `S3`/`S4`.
///
/// Only consulted while building calibrations; the transcoder never sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeadZone {
    value: f32,
    full_scale: f32,
    source_half_range: f32,
}

impl Default for DeadZone {
    fn default() -> Self {
        Self {
            value: DEFAULT_DEAD_ZONE,
            full_scale: DEFAULT_FULL_SCALE,
            source_half_range: DEFAULT_SOURCE_HALF_RANGE,
        }
    }
}

impl DeadZone {
    /// Creates a dead zone.
    ///
    /// # Arguments
    ///
    /// * `value` - Dead zone in full-scale units (e.g. 4960)
    /// * `full_scale` - The range `value` is expressed against (e.g. 32768)
    /// * `source_half_range` - Half the source axis range in raw units (e.g. 128)
    ///
    /// # Errors
    ///
    /// Returns `InvalidDeadZone` if any parameter is non-finite, `value` is
    /// negative, `value` exceeds `full_scale`, or either range is not positive.
    pub fn new(value: f32, full_scale: f32, source_half_range: f32) -> Result<Self, MappingError> {
        let finite = value.is_finite() && full_scale.is_finite() && source_half_range.is_finite();
        if !finite
            || value < 0.0
            || full_scale <= 0.0
            || source_half_range <= 0.0
            || value > full_scale
        {
            return Err(MappingError::InvalidDeadZone { value, full_scale });
        }
        Ok(Self {
            value,
            full_scale,
            source_half_range,
        })
    }

    /// Returns the configured dead zone value.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Half-width of the dead zone in source units.
    ///
    /// # Examples
    ///
    /// ```
    /// use pad_transcoder::controller::calibration::DeadZone;
    ///
    /// let dz = DeadZone::new(4960.0, 32768.0, 128.0)?;
    /// assert!((dz.offset() - 19.375).abs() < 1e-4);
    /// # Ok::<(), pad_transcoder::controller::MappingError>(())
    /// ```
    #[must_use]
    pub fn offset(&self) -> f32 {
        self.source_half_range * self.value / self.full_scale
    }

    /// Returns `(S3, S4)` placed symmetrically around `neutral`.
    #[must_use]
    pub fn inner_breakpoints(&self, neutral: f32) -> (f32, f32) {
        let offset = self.offset();
        (neutral - offset, neutral + offset)
    }

    /// Builds all six source breakpoints from the four outer ones.
    ///
    /// # Arguments
    ///
    /// * `outer` - `[S1, S2, S5, S6]`
    /// * `neutral` - Source value at rest
    #[must_use]
    pub fn source_breakpoints(&self, outer: [f32; 4], neutral: f32) -> [f32; BREAKPOINTS] {
        let (s3, s4) = self.inner_breakpoints(neutral);
        [outer[0], outer[1], s3, s4, outer[2], outer[3]]
    }
}

/// Immutable calibration for one axis, with each ramp's rise and width precomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisCalibration {
    source_field: usize,
    dest_field: usize,
    encoding: SampleEncoding,
    source: [f32; BREAKPOINTS],
    dest: [f32; BREAKPOINTS],
    rises: [f32; SEGMENTS],
    widths: [f32; SEGMENTS],
}

impl AxisCalibration {
    /// Creates an unsigned-encoded calibration.
    ///
    /// # Arguments
    ///
    /// * `source_field` - Byte index of the axis in the source frame
    /// * `dest_field` - Axis index in the adapter frame
    /// * `source` - `S1..S6`, non-decreasing
    /// * `dest` - `D1..D6`, each within 0..=255
    ///
    /// # Errors
    ///
    /// - `NonFiniteBreakpoint` if any breakpoint is NaN or infinite
    /// - `NonMonotonicBreakpoints` if `S` decreases anywhere
    /// - `DestinationOutOfRange` if a `D` value cannot be an axis byte
    pub fn new(
        source_field: usize,
        dest_field: usize,
        source: [f32; BREAKPOINTS],
        dest: [f32; BREAKPOINTS],
    ) -> Result<Self, MappingError> {
        Self::with_encoding(source_field, dest_field, SampleEncoding::Unsigned, source, dest)
    }

    /// Creates a calibration reading its source byte with `encoding`.
    ///
    /// # Errors
    ///
    /// Same as [`AxisCalibration::new`].
    pub fn with_encoding(
        source_field: usize,
        dest_field: usize,
        encoding: SampleEncoding,
        source: [f32; BREAKPOINTS],
        dest: [f32; BREAKPOINTS],
    ) -> Result<Self, MappingError> {
        for (index, value) in source.iter().chain(dest.iter()).enumerate() {
            if !value.is_finite() {
                return Err(MappingError::NonFiniteBreakpoint { index });
            }
        }

        for i in 0..SEGMENTS {
            if source[i] > source[i + 1] {
                return Err(MappingError::NonMonotonicBreakpoints {
                    lower: i + 1,
                    upper: i + 2,
                    low: source[i],
                    high: source[i + 1],
                });
            }
        }

        for (i, &value) in dest.iter().enumerate() {
            if !(DEST_MIN..=DEST_MAX).contains(&value) {
                return Err(MappingError::DestinationOutOfRange {
                    index: i + 1,
                    value,
                });
            }
        }

        // The ramp multiplies by rise before dividing by width.
        let mut rises = [0.0; SEGMENTS];
        let mut widths = [0.0; SEGMENTS];
        for i in 0..SEGMENTS {
            rises[i] = dest[i + 1] - dest[i];
            widths[i] = source[i + 1] - source[i];
        }

        Ok(Self {
            source_field,
            dest_field,
            encoding,
            source,
            dest,
            rises,
            widths,
        })
    }

    /// Builds a straight calibration from `[source_min, source_max]` to
    /// `[dest_start, dest_end]` with evenly spaced breakpoints.
    ///
    /// Passing `dest_start > dest_end` yields an inverted pass-through.
    ///
    /// # Errors
    ///
    /// Same as [`AxisCalibration::new`].
    ///
    /// # Examples
    ///
    /// ```
    /// use pad_transcoder::controller::axis::AxisRemapper;
    /// use pad_transcoder::controller::calibration::AxisCalibration;
    ///
    /// // Adapter axis 3 = 255 - source byte 6
    /// let cal = AxisCalibration::linear(6, 3, 0.0, 255.0, 255.0, 0.0)?;
    /// assert_eq!(AxisRemapper::remap(40, &cal), 215);
    /// # Ok::<(), pad_transcoder::controller::MappingError>(())
    /// ```
    pub fn linear(
        source_field: usize,
        dest_field: usize,
        source_min: f32,
        source_max: f32,
        dest_start: f32,
        dest_end: f32,
    ) -> Result<Self, MappingError> {
        let steps = SEGMENTS as f32;
        let mut source = [0.0; BREAKPOINTS];
        let mut dest = [0.0; BREAKPOINTS];
        for i in 0..BREAKPOINTS {
            let step = i as f32;
            source[i] = source_min + (source_max - source_min) * step / steps;
            dest[i] = dest_start + (dest_end - dest_start) * step / steps;
        }
        Self::new(source_field, dest_field, source, dest)
    }

    /// Byte index of the axis in the source frame.
    #[must_use]
    pub fn source_field(&self) -> usize {
        self.source_field
    }

    /// Axis index in the adapter frame.
    #[must_use]
    pub fn dest_field(&self) -> usize {
        self.dest_field
    }

    /// How the source byte is read.
    #[must_use]
    pub fn encoding(&self) -> SampleEncoding {
        self.encoding
    }

    /// Source breakpoints `S1..S6`.
    #[must_use]
    pub fn source(&self) -> &[f32; BREAKPOINTS] {
        &self.source
    }

    /// Destination breakpoints `D1..D6`.
    #[must_use]
    pub fn dest(&self) -> &[f32; BREAKPOINTS] {
        &self.dest
    }

    /// `D(i+1) - D(i)` for each ramp segment.
    #[must_use]
    pub fn rises(&self) -> &[f32; SEGMENTS] {
        &self.rises
    }

    /// `S(i+1) - S(i)` for each ramp segment. A zero width is never selected
    /// by the ramp ladder, so it is never divided by.
    #[must_use]
    pub fn widths(&self) -> &[f32; SEGMENTS] {
        &self.widths
    }

    /// Adapter value emitted when the source field is missing: the midpoint of
    /// `D3` and `D4`, truncated.
    #[must_use]
    pub fn neutral(&self) -> u8 {
        let mid = (self.dest[2] + self.dest[3]) / 2.0;
        mid.clamp(DEST_MIN, DEST_MAX) as u8
    }
}
