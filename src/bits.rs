//! Bit values and MSB-first extraction from bytes.
//!
//! The codec's convention throughout is that bit position 0 within a byte
//! is the most significant bit, so extraction reverses the position as
//! `7 - pos` before shifting. Any numeric bit value other than 0 or 1 is
//! rejected, never coerced.

use crate::{XsError, XsResult};

/// A single binary value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bit {
    Clear,
    Set,
}

impl Bit {
    /// Integer value of the bit (0 or 1).
    #[inline]
    pub fn value(self) -> u16 {
        match self {
            Bit::Clear => 0,
            Bit::Set => 1,
        }
    }

    #[inline]
    pub fn is_set(self) -> bool {
        matches!(self, Bit::Set)
    }
}

impl From<bool> for Bit {
    #[inline]
    fn from(v: bool) -> Self {
        if v {
            Bit::Set
        } else {
            Bit::Clear
        }
    }
}

impl TryFrom<u8> for Bit {
    type Error = XsError;

    /// Accepts exactly 0 or 1; anything else is `XsError::InvalidBit`.
    fn try_from(v: u8) -> XsResult<Self> {
        match v {
            0 => Ok(Bit::Clear),
            1 => Ok(Bit::Set),
            _ => Err(XsError::InvalidBit),
        }
    }
}

/// Extract the bit at `pos` from `byte`, where position 0 is the MSB.
///
/// Fails with `XsError::OutOfRange` when `pos > 7`.
pub fn bit_at(byte: u8, pos: u8) -> XsResult<Bit> {
    if pos > 7 {
        return Err(XsError::OutOfRange);
    }
    Ok(Bit::from((byte >> (7 - pos)) & 1 == 1))
}
