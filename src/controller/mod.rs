//! # Controller Module
//!
//! Controller signal remapping between two device protocols.
//!
//! This module handles:
//! - Relocating digital button bits from the source layout to the adapter layout
//! - Six-point piecewise-linear axis calibration with dead zone and saturation
//! - Assembling complete adapter frames from raw source frames
//! - Deriving the console pad view from an adapter frame
//!
//! Every type here is built once from configuration and is immutable afterwards.
//! Contract violations are rejected at construction with a [`MappingError`];
//! the per-frame path has no failure mode.

use thiserror::Error;

pub mod axis;
pub mod button;
pub mod calibration;
pub mod pad;
pub mod transcoder;

/// Configuration-time contract violations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    /// A button mask does not have exactly one bit set.
    #[error("{role} mask {mask:#06x} must have exactly one bit set")]
    InvalidMask {
        /// "source" or "destination"
        role: &'static str,
        /// The offending mask
        mask: u16,
    },

    /// A breakpoint is NaN or infinite.
    #[error("breakpoint {index} is not a finite number")]
    NonFiniteBreakpoint {
        /// Zero-based breakpoint index
        index: usize,
    },

    /// Source breakpoints decrease somewhere.
    #[error("source breakpoints must be non-decreasing (S{lower} = {low} > S{upper} = {high})")]
    NonMonotonicBreakpoints {
        /// One-based index of the first breakpoint
        lower: usize,
        /// One-based index of the second breakpoint
        upper: usize,
        /// Value of the first breakpoint
        low: f32,
        /// Value of the second breakpoint
        high: f32,
    },

    /// A destination breakpoint cannot be represented by the adapter axis byte.
    #[error("destination breakpoint D{index} = {value} is outside 0..=255")]
    DestinationOutOfRange {
        /// One-based breakpoint index
        index: usize,
        /// The offending value
        value: f32,
    },

    /// A source field index lies beyond the declared source frame.
    #[error("source field {field} is outside the {frame_len}-byte source frame")]
    SourceFieldOutOfBounds {
        /// Field index
        field: usize,
        /// Declared source frame length
        frame_len: usize,
    },

    /// A destination axis index lies beyond the adapter frame.
    #[error("destination axis {field} is outside the {axis_count}-axis adapter frame")]
    DestFieldOutOfBounds {
        /// Axis index
        field: usize,
        /// Adapter axis count
        axis_count: usize,
    },

    /// Two axis calibrations write the same destination axis.
    #[error("destination axis {field} is written by more than one calibration")]
    DuplicateDestField {
        /// Axis index
        field: usize,
    },

    /// The dead zone parameters cannot produce inner breakpoints.
    #[error("dead zone {value} with full scale {full_scale} is invalid")]
    InvalidDeadZone {
        /// Raw dead zone value
        value: f32,
        /// Full-scale value it is expressed against
        full_scale: f32,
    },
}
