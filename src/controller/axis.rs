//! # Axis Remapper Module
//!
//! Six-point piecewise-linear transfer from a raw source sample to an adapter
//! axis byte.
//!
//! The source domain is split by the calibration breakpoints and evaluated in
//! order against the sample `v`:
//!
//! | Region | Condition | Output |
//! |--------|-----------|--------|
//! | low saturation | `v < S1` | `D1` |
//! | ramp 1..=5 | `S(i) <= v < S(i+1)` | `D(i) + (v - S(i)) * (D(i+1) - D(i)) / (S(i+1) - S(i))` |
//! | high saturation | `v >= S6` | `D6` |
//!
//! Each segment's upper bound is strict, so a sample equal to `S(i+1)` belongs to
//! the next segment. A zero-width segment can never satisfy its condition and is
//! crossed in a single step, so its zero width is never divided by.
//!
//! The ramp is evaluated in `f32`, clamped to the adapter range and truncated.
//!
//! ## Usage
//!
//! ```
//! use pad_transcoder::controller::axis::AxisRemapper;
//! use pad_transcoder::controller::calibration::AxisCalibration;
//!
//! let cal = AxisCalibration::new(
//!     3,
//!     0,
//!     [65.0, 81.0, 97.0, 159.0, 175.0, 191.0],
//!     [48.0, 88.0, 128.0, 128.0, 168.0, 208.0],
//! )?;
//!
//! assert_eq!(AxisRemapper::remap(0, &cal), 48);    // saturate low
//! assert_eq!(AxisRemapper::remap(97, &cal), 128);  // start of dead zone
//! assert_eq!(AxisRemapper::remap(255, &cal), 208); // saturate high
//! # Ok::<(), pad_transcoder::controller::MappingError>(())
//! ```

use super::calibration::{AxisCalibration, DEST_MAX, DEST_MIN, SEGMENTS};

/// Region of the source domain a sample falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Below `S1`.
    LowSaturation,
    /// Inside ramp segment `n` (0-based, between `S(n+1)` and `S(n+2)`).
    Ramp(usize),
    /// At or above `S6`.
    HighSaturation,
}

/// Stateless piecewise-linear axis transcoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct AxisRemapper;

impl AxisRemapper {
    /// Finds the region of `value` under the strict-upper-bound ladder.
    #[must_use]
    pub fn locate(value: f32, cal: &AxisCalibration) -> Region {
        let s = cal.source();
        if value < s[0] {
            return Region::LowSaturation;
        }
        (0..SEGMENTS)
            .find(|&i| value < s[i + 1])
            .map_or(Region::HighSaturation, Region::Ramp)
    }

    /// Evaluates the transfer function without clamping or truncation.
    ///
    /// # Examples
    ///
    /// ```
    /// use pad_transcoder::controller::axis::AxisRemapper;
    /// use pad_transcoder::controller::calibration::AxisCalibration;
    ///
    /// let cal = AxisCalibration::new(
    ///     3,
    ///     0,
    ///     [65.0, 81.0, 97.0, 159.0, 175.0, 191.0],
    ///     [48.0, 88.0, 128.0, 128.0, 168.0, 208.0],
    /// )?;
    /// assert_eq!(AxisRemapper::transfer(80.0, &cal), 85.5);
    /// # Ok::<(), pad_transcoder::controller::MappingError>(())
    /// ```
    #[inline]
    #[must_use]
    pub fn transfer(value: f32, cal: &AxisCalibration) -> f32 {
        let d = cal.dest();
        match Self::locate(value, cal) {
            Region::LowSaturation => d[0],
            Region::HighSaturation => d[SEGMENTS],
            Region::Ramp(i) => {
                d[i] + (value - cal.source()[i]) * cal.rises()[i] / cal.widths()[i]
            }
        }
    }

    /// Maps one raw source sample to an adapter axis byte.
    ///
    /// Never fails: out-of-range samples saturate, the result is clamped to
    /// `0..=255` and truncated toward zero.
    #[inline]
    #[must_use]
    pub fn remap(sample: i32, cal: &AxisCalibration) -> u8 {
        Self::to_axis_byte(Self::transfer(sample as f32, cal))
    }

    /// Reads the calibration's source byte from `frame` and maps it.
    ///
    /// Returns `None` if the frame is too short to contain the field.
    #[inline]
    #[must_use]
    pub fn remap_frame(frame: &[u8], cal: &AxisCalibration) -> Option<u8> {
        frame
            .get(cal.source_field())
            .map(|&raw| Self::remap(cal.encoding().decode(raw), cal))
    }

    /// Clamps to the adapter range and truncates.
    #[inline]
    fn to_axis_byte(value: f32) -> u8 {
        if value.is_nan() {
            return DEST_MIN as u8;
        }
        value.clamp(DEST_MIN, DEST_MAX) as u8
    }
}
