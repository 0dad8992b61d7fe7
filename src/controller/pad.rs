//! # Console Pad Module
//!
//! Derives the console's pad view from an adapter frame.
//!
//! ## Button Translation
//!
//! | Adapter bit | Console bit | Button |
//! |-------------|-------------|--------|
//! | 0x0001 | 0x1000 | START |
//! | 0x0008 | 0x2000 | Z |
//! | 0x0004 | 0x0010 | R |
//! | 0x0100 | 0x8000 | A |
//! | 0x0200 | 0x4000 | B |
//! | 0x1000 | 0x0020 | L |
//!
//! C-buttons come from adapter axes 2 and 3 crossing a quarter-range
//! threshold, and the main stick is re-centered on 128 and scaled by 3/2.

use serde::Serialize;

use super::transcoder::DestFrame;

/// Console button bits.
pub mod buttons {
    /// A button.
    pub const A: u16 = 0x8000;
    /// B button.
    pub const B: u16 = 0x4000;
    /// Z trigger.
    pub const Z: u16 = 0x2000;
    /// START button.
    pub const START: u16 = 0x1000;
    /// L trigger.
    pub const L: u16 = 0x0020;
    /// R trigger.
    pub const R: u16 = 0x0010;
    /// C-up.
    pub const C_UP: u16 = 0x0008;
    /// C-down.
    pub const C_DOWN: u16 = 0x0004;
    /// C-left.
    pub const C_LEFT: u16 = 0x0002;
    /// C-right.
    pub const C_RIGHT: u16 = 0x0001;
}

/// Adapter bit → console bit.
const BUTTON_TABLE: [(u16, u16); 6] = [
    (0x0001, buttons::START),
    (0x0008, buttons::Z),
    (0x0004, buttons::R),
    (0x0100, buttons::A),
    (0x0200, buttons::B),
    (0x1000, buttons::L),
];

/// Adapter axis value below which a C-button reads as pressed in the low direction.
pub const C_LOW_THRESHOLD: u8 = 0x40;

/// Adapter axis value above which a C-button reads as pressed in the high direction.
pub const C_HIGH_THRESHOLD: u8 = 0xC0;

/// Adapter axis center.
const AXIS_CENTER: i32 = 128;

/// Console pad state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ConsolePad {
    /// Console button bits.
    pub buttons: u16,
    /// Stick X, -128..=127.
    pub stick_x: i8,
    /// Stick Y, -128..=127.
    pub stick_y: i8,
}

impl ConsolePad {
    /// Builds the console pad from an adapter frame.
    ///
    /// # Examples
    ///
    /// ```
    /// use pad_transcoder::controller::pad::{buttons, ConsolePad};
    /// use pad_transcoder::controller::transcoder::DestFrame;
    ///
    /// let frame = DestFrame { buttons: 0x0008, axes: [208, 48, 128, 128, 0, 0] };
    /// let pad = ConsolePad::from_frame(&frame);
    ///
    /// assert_eq!(pad.buttons, buttons::Z);
    /// assert_eq!(pad.stick_x, 120);
    /// assert_eq!(pad.stick_y, -120);
    /// ```
    #[must_use]
    pub fn from_frame(frame: &DestFrame) -> Self {
        let mut pad_buttons = BUTTON_TABLE
            .iter()
            .filter(|(adapter, _)| frame.buttons & adapter != 0)
            .fold(0u16, |acc, (_, console)| acc | console);

        let c_x = frame.axes[2];
        let c_y = frame.axes[3];
        if c_x < C_LOW_THRESHOLD {
            pad_buttons |= buttons::C_LEFT;
        }
        if c_x > C_HIGH_THRESHOLD {
            pad_buttons |= buttons::C_RIGHT;
        }
        if c_y < C_LOW_THRESHOLD {
            pad_buttons |= buttons::C_DOWN;
        }
        if c_y > C_HIGH_THRESHOLD {
            pad_buttons |= buttons::C_UP;
        }

        Self {
            buttons: pad_buttons,
            stick_x: saturate(i32::from(frame.axes[0]) - AXIS_CENTER),
            stick_y: saturate(i32::from(frame.axes[1]) - AXIS_CENTER),
        }
    }

    /// Returns `true` if the stick is away from center.
    #[must_use]
    pub fn stick_moved(&self) -> bool {
        self.stick_x != 0 || self.stick_y != 0
    }
}

/// Scales a centered axis by 3/2 and clamps to the signed byte range.
#[inline]
fn saturate(v: i32) -> i8 {
    (v * 3 / 2).clamp(i32::from(i8::MIN), i32::from(i8::MAX)) as i8
}
