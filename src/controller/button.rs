//! # Button Remapper Module
//!
//! Relocates single digital-button bits from the source frame layout into the
//! adapter's 16-bit button field.
//!
//! Each [`ButtonMapping`] names one source byte, one source bit and one
//! destination bit. At construction it is compiled into a [`ButtonRoute`]
//! holding the mask and a precomputed shift, so the per-frame work is a mask,
//! a shift and an OR.
//!
//! ## Usage
//!
//! ```
//! use pad_transcoder::controller::button::{ButtonMapping, ButtonRemapper};
//!
//! // Z: source byte 0 bit 0x40 -> adapter bit 0x0008
//! let z = ButtonMapping::new(0, 0x40, 0x0008);
//! let remapper = ButtonRemapper::new(&[z], 8)?;
//!
//! assert_eq!(remapper.remap(&[0x40, 0, 0, 0, 0, 0, 0, 0]), 0x0008);
//! assert_eq!(remapper.remap(&[0x00, 0, 0, 0, 0, 0, 0, 0]), 0x0000);
//! # Ok::<(), pad_transcoder::controller::MappingError>(())
//! ```

use super::MappingError;

/// One logical button: a single source bit and the adapter bit it lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonMapping {
    /// Byte index in the source frame.
    pub source_field: usize,
    /// Single-bit mask within that byte.
    pub source_mask: u8,
    /// Single-bit mask in the adapter button field.
    pub dest_mask: u16,
}

impl ButtonMapping {
    /// Creates a mapping. Masks are checked when the mapping is compiled.
    #[must_use]
    pub const fn new(source_field: usize, source_mask: u8, dest_mask: u16) -> Self {
        Self {
            source_field,
            source_mask,
            dest_mask,
        }
    }
}

/// Direction and distance a source bit travels to reach its adapter bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    /// Destination bit is more significant.
    Left(u32),
    /// Destination bit is less significant (or equal, with a zero shift).
    Right(u32),
}

/// A compiled [`ButtonMapping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonRoute {
    field: usize,
    mask: u8,
    shift: Shift,
}

impl ButtonRoute {
    /// Compiles a mapping, rejecting masks that are not a single bit or fields
    /// outside the declared source frame.
    ///
    /// # Errors
    ///
    /// - `InvalidMask` if either mask is zero or has more than one bit set
    /// - `SourceFieldOutOfBounds` if `source_field >= frame_len`
    pub fn compile(mapping: ButtonMapping, frame_len: usize) -> Result<Self, MappingError> {
        if !mapping.source_mask.is_power_of_two() {
            return Err(MappingError::InvalidMask {
                role: "source",
                mask: u16::from(mapping.source_mask),
            });
        }
        if !mapping.dest_mask.is_power_of_two() {
            return Err(MappingError::InvalidMask {
                role: "destination",
                mask: mapping.dest_mask,
            });
        }
        if mapping.source_field >= frame_len {
            return Err(MappingError::SourceFieldOutOfBounds {
                field: mapping.source_field,
                frame_len,
            });
        }

        let from = mapping.source_mask.trailing_zeros();
        let to = mapping.dest_mask.trailing_zeros();
        let shift = if to > from {
            Shift::Left(to - from)
        } else {
            Shift::Right(from - to)
        };

        Ok(Self {
            field: mapping.source_field,
            mask: mapping.source_mask,
            shift,
        })
    }

    /// Returns the precomputed shift.
    #[must_use]
    pub fn shift(&self) -> Shift {
        self.shift
    }

    /// Extracts this route's bit from `frame` and moves it to its adapter position.
    ///
    /// A frame too short to contain the field contributes nothing.
    #[inline]
    #[must_use]
    pub fn apply(&self, frame: &[u8]) -> u16 {
        let Some(&byte) = frame.get(self.field) else {
            return 0;
        };
        let bit = u16::from(byte & self.mask);
        match self.shift {
            Shift::Left(n) => bit << n,
            Shift::Right(n) => bit >> n,
        }
    }
}

/// Stateless transcoder between the source and adapter button layouts.
#[derive(Debug, Clone, Default)]
pub struct ButtonRemapper {
    routes: Vec<ButtonRoute>,
}

impl ButtonRemapper {
    /// Compiles every mapping against a source frame of `frame_len` bytes.
    ///
    /// # Errors
    ///
    /// Returns the first [`MappingError`] encountered.
    pub fn new(mappings: &[ButtonMapping], frame_len: usize) -> Result<Self, MappingError> {
        let routes = mappings
            .iter()
            .map(|&m| ButtonRoute::compile(m, frame_len))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { routes })
    }

    /// Builds a remapper from already compiled routes.
    #[must_use]
    pub fn from_routes(routes: Vec<ButtonRoute>) -> Self {
        Self { routes }
    }

    /// Number of mapped buttons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` when no buttons are mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Produces the adapter button field for one source frame.
    ///
    /// Bits not covered by a route are always zero.
    #[must_use]
    pub fn remap(&self, frame: &[u8]) -> u16 {
        self.routes
            .iter()
            .fold(0u16, |acc, route| acc | route.apply(frame))
    }
}
