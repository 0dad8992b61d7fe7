//! # Frame Transcoder Module
//!
//! Turns one raw source frame into one complete adapter frame.
//!
//! ## Adapter Frame Layout
//!
//! | Field | Width | Default |
//! |-------|-------|---------|
//! | buttons | 16-bit | 0 (no buttons) |
//! | axes[0..6] | 8-bit each | calibration neutral, or `unmapped_axis` |
//!
//! Every mapping is validated when the transcoder is built, so
//! [`FrameTranscoder::transcode`] cannot fail. A frame shorter than expected
//! still produces a full adapter frame: missing buttons read as released and
//! missing axes stay at their neutral default.
//!
//! ## Usage
//!
//! ```
//! use pad_transcoder::controller::button::ButtonMapping;
//! use pad_transcoder::controller::calibration::AxisCalibration;
//! use pad_transcoder::controller::transcoder::FrameTranscoder;
//!
//! let buttons = [ButtonMapping::new(0, 0x40, 0x0008)];
//! let axes = vec![AxisCalibration::new(
//!     3,
//!     0,
//!     [65.0, 81.0, 97.0, 159.0, 175.0, 191.0],
//!     [48.0, 88.0, 128.0, 128.0, 168.0, 208.0],
//! )?];
//! let transcoder = FrameTranscoder::new(&buttons, axes, 8, 0)?;
//!
//! let frame = transcoder.transcode(&[0x40, 0, 8, 255, 127, 128, 127, 0]);
//! assert_eq!(frame.buttons, 0x0008);
//! assert_eq!(frame.axes[0], 208);
//! # Ok::<(), pad_transcoder::controller::MappingError>(())
//! ```

use serde::Serialize;
use tracing::debug;

use super::axis::AxisRemapper;
use super::button::{ButtonMapping, ButtonRemapper};
use super::calibration::AxisCalibration;
use super::MappingError;

/// Number of analog axes in an adapter port frame.
pub const ADAPTER_AXIS_COUNT: usize = 6;

/// Adapter axes array type (6 axes, 8-bit values).
pub type AdapterAxes = [u8; ADAPTER_AXIS_COUNT];

/// One frame in the adapter's port layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DestFrame {
    /// Adapter button bits.
    pub buttons: u16,
    /// Adapter axis bytes.
    pub axes: AdapterAxes,
}

/// Composes one [`ButtonRemapper`] with one [`AxisCalibration`] per axis.
///
/// Immutable after construction and safe to share between ports.
#[derive(Debug, Clone)]
pub struct FrameTranscoder {
    buttons: ButtonRemapper,
    axes: Vec<AxisCalibration>,
    defaults: AdapterAxes,
}

impl FrameTranscoder {
    /// Validates and compiles every mapping.
    ///
    /// # Arguments
    ///
    /// * `buttons` - Button mappings
    /// * `axes` - One calibration per mapped adapter axis
    /// * `source_len` - Declared source frame length in bytes
    /// * `unmapped_axis` - Value for adapter axes no calibration writes
    ///
    /// # Errors
    ///
    /// - Any button compile error (see [`ButtonRemapper::new`])
    /// - `SourceFieldOutOfBounds` if an axis reads beyond `source_len`
    /// - `DestFieldOutOfBounds` if an axis writes beyond the adapter frame
    /// - `DuplicateDestField` if two axes write the same adapter axis
    pub fn new(
        buttons: &[ButtonMapping],
        axes: Vec<AxisCalibration>,
        source_len: usize,
        unmapped_axis: u8,
    ) -> Result<Self, MappingError> {
        let buttons = ButtonRemapper::new(buttons, source_len)?;
        Self::from_parts(buttons, axes, source_len, unmapped_axis)
    }

    /// Builds a transcoder from an already compiled button remapper.
    ///
    /// # Errors
    ///
    /// Same axis errors as [`FrameTranscoder::new`].
    pub fn from_parts(
        buttons: ButtonRemapper,
        axes: Vec<AxisCalibration>,
        source_len: usize,
        unmapped_axis: u8,
    ) -> Result<Self, MappingError> {
        let mut defaults = [unmapped_axis; ADAPTER_AXIS_COUNT];
        let mut written = [false; ADAPTER_AXIS_COUNT];

        for cal in &axes {
            if cal.source_field() >= source_len {
                return Err(MappingError::SourceFieldOutOfBounds {
                    field: cal.source_field(),
                    frame_len: source_len,
                });
            }
            let field = cal.dest_field();
            if field >= ADAPTER_AXIS_COUNT {
                return Err(MappingError::DestFieldOutOfBounds {
                    field,
                    axis_count: ADAPTER_AXIS_COUNT,
                });
            }
            if written[field] {
                return Err(MappingError::DuplicateDestField { field });
            }
            written[field] = true;
            defaults[field] = cal.neutral();
        }

        debug!(
            "Frame transcoder ready: {} buttons, {} axes, defaults {:?}",
            buttons.len(),
            axes.len(),
            defaults
        );

        Ok(Self {
            buttons,
            axes,
            defaults,
        })
    }

    /// Adapter frame emitted before any source field is applied.
    #[must_use]
    pub fn neutral_frame(&self) -> DestFrame {
        DestFrame {
            buttons: 0,
            axes: self.defaults,
        }
    }

    /// The axis calibrations, in configuration order.
    #[must_use]
    pub fn axes(&self) -> &[AxisCalibration] {
        &self.axes
    }

    /// Number of mapped buttons.
    #[must_use]
    pub fn button_count(&self) -> usize {
        self.buttons.len()
    }

    /// Transcodes one raw source frame.
    #[must_use]
    pub fn transcode(&self, frame: &[u8]) -> DestFrame {
        let mut out = self.neutral_frame();
        out.buttons = self.buttons.remap(frame);
        for cal in &self.axes {
            if let Some(value) = AxisRemapper::remap_frame(frame, cal) {
                out.axes[cal.dest_field()] = value;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::calibration::DeadZone;

    /// Neutral frame as reported by the N64 pad behind the adapter.
    const NEUTRAL: [u8; 8] = [0, 0, 8, 128, 127, 128, 127, 0];

    fn buttons() -> Vec<ButtonMapping> {
        vec![
            ButtonMapping::new(0, 0x40, 0x0008),
            ButtonMapping::new(0, 0x20, 0x0004),
            ButtonMapping::new(0, 0x10, 0x1000),
            ButtonMapping::new(0, 0x04, 0x0100),
            ButtonMapping::new(0, 0x02, 0x0200),
            ButtonMapping::new(1, 0x02, 0x0001),
        ]
    }

    fn axes() -> Vec<AxisCalibration> {
        let dz = DeadZone::default();
        vec![
            AxisCalibration::new(
                3,
                0,
                dz.source_breakpoints([25.0, 71.0, 185.0, 231.0], 128.0),
                [48.0, 88.0, 128.0, 128.0, 168.0, 208.0],
            )
            .unwrap(),
            AxisCalibration::new(
                4,
                1,
                dz.source_breakpoints([27.0, 71.0, 185.0, 229.0], 128.0),
                [208.0, 168.0, 128.0, 128.0, 88.0, 48.0],
            )
            .unwrap(),
            AxisCalibration::linear(5, 2, 0.0, 255.0, 0.0, 255.0).unwrap(),
            AxisCalibration::linear(6, 3, 0.0, 255.0, 255.0, 0.0).unwrap(),
        ]
    }

    fn transcoder() -> FrameTranscoder {
        FrameTranscoder::new(&buttons(), axes(), 8, 0).unwrap()
    }

    // ==================== Construction Tests ====================

    #[test]
    fn test_neutral_frame_defaults() {
        let t = transcoder();
        let frame = t.neutral_frame();
        assert_eq!(frame.buttons, 0);
        // Sticks at D3/D4 midpoint, C-stick at its linear midpoint, triggers unmapped
        assert_eq!(frame.axes, [128, 128, 127, 127, 0, 0]);
    }

    #[test]
    fn test_unmapped_axis_value() {
        let t = FrameTranscoder::new(&[], vec![], 8, 42).unwrap();
        assert_eq!(t.neutral_frame().axes, [42; ADAPTER_AXIS_COUNT]);
        assert_eq!(t.button_count(), 0);
        assert!(t.axes().is_empty());
    }

    #[test]
    fn test_rejects_bad_button() {
        let mut b = buttons();
        b.push(ButtonMapping::new(0, 0x60, 0x0008));
        assert!(matches!(
            FrameTranscoder::new(&b, axes(), 8, 0),
            Err(MappingError::InvalidMask { .. })
        ));
    }

    #[test]
    fn test_rejects_axis_source_outside_frame() {
        let err = FrameTranscoder::new(&buttons(), axes(), 6, 0).unwrap_err();
        assert_eq!(
            err,
            MappingError::SourceFieldOutOfBounds {
                field: 6,
                frame_len: 6
            }
        );
    }

    #[test]
    fn test_rejects_axis_dest_outside_frame() {
        let mut a = axes();
        a.push(AxisCalibration::linear(7, 6, 0.0, 255.0, 0.0, 255.0).unwrap());
        assert!(matches!(
            FrameTranscoder::new(&buttons(), a, 8, 0),
            Err(MappingError::DestFieldOutOfBounds { field: 6, .. })
        ));
    }

    #[test]
    fn test_rejects_duplicate_dest_field() {
        let mut a = axes();
        a.push(AxisCalibration::linear(7, 0, 0.0, 255.0, 0.0, 255.0).unwrap());
        assert_eq!(
            FrameTranscoder::new(&buttons(), a, 8, 0).unwrap_err(),
            MappingError::DuplicateDestField { field: 0 }
        );
    }

    // ==================== Transcode Tests ====================

    #[test]
    fn test_transcode_neutral_frame() {
        let frame = transcoder().transcode(&NEUTRAL);
        assert_eq!(frame.buttons, 0);
        assert_eq!(frame.axes, [128, 128, 128, 128, 0, 0]);
    }

    #[test]
    fn test_transcode_z_button() {
        let mut raw = NEUTRAL;
        raw[0] = 0x40;
        assert_eq!(transcoder().transcode(&raw).buttons, 0x0008);
    }

    #[test]
    fn test_transcode_full_deflection() {
        let raw = [0x76, 0x02, 8, 255, 0, 0, 0, 0];
        let frame = transcoder().transcode(&raw);
        assert_eq!(frame.buttons, 0x130d);
        assert_eq!(frame.axes[0], 208); // right
        assert_eq!(frame.axes[1], 208); // up (inverted)
        assert_eq!(frame.axes[2], 0);
        assert_eq!(frame.axes[3], 255);
    }

    #[test]
    fn test_transcode_short_frame_keeps_defaults() {
        let frame = transcoder().transcode(&[0x40, 0x02, 8, 255]);
        assert_eq!(frame.buttons, 0x0009);
        assert_eq!(frame.axes, [208, 128, 127, 127, 0, 0]);
    }

    #[test]
    fn test_transcode_empty_frame() {
        let t = transcoder();
        assert_eq!(t.transcode(&[]), t.neutral_frame());
    }

    #[test]
    fn test_transcode_ignores_trailing_bytes() {
        let mut raw = NEUTRAL.to_vec();
        raw.extend_from_slice(&[0xff; 8]);
        assert_eq!(transcoder().transcode(&raw), transcoder().transcode(&NEUTRAL));
    }

    #[test]
    fn test_axis_order_irrelevant() {
        let mut reversed = axes();
        reversed.reverse();
        let a = FrameTranscoder::new(&buttons(), axes(), 8, 0).unwrap();
        let b = FrameTranscoder::new(&buttons(), reversed, 8, 0).unwrap();
        for v in [0u8, 40, 100, 128, 160, 220, 255] {
            let raw = [0, 0, 8, v, 255 - v, v, v, 0];
            assert_eq!(a.transcode(&raw), b.transcode(&raw));
        }
    }

    #[test]
    fn test_dest_frame_serializes() {
        let frame = DestFrame {
            buttons: 0x0008,
            axes: [128, 128, 128, 128, 0, 0],
        };
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(json, r#"{"buttons":8,"axes":[128,128,128,128,0,0]}"#);
    }
}
