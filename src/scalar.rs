//! UTF-16 scalar decoding.
//!
//! Resolves the code unit at a given position (and, for a high surrogate, the
//! unit after it) into a single Unicode scalar value. Malformed input never
//! produces an error; lone surrogates are resolved by [`LoneSurrogates`].

use log::trace;

/// U+FFFD REPLACEMENT CHARACTER.
pub const REPLACEMENT_CHARACTER: u32 = 0xFFFD;

/// What to do with a surrogate code unit that is not part of a well-formed pair.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum LoneSurrogates {
    /// Substitute U+FFFD (`%EF%BF%BD` once escaped).
    #[default]
    Replace,
    /// Encode the raw 16-bit value as if it were a scalar (WTF-8 style).
    PassThrough,
    /// Drop the unit.
    Skip,
}

/// A decoded scalar together with the number of UTF-16 units it was read from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub scalar: u32,
    pub consumed: usize,
}

/// Random access to a sequence of UTF-16 code units.
pub trait CodeUnits {
    fn num_units(&self) -> usize;

    /// The unit at `idx`, or `None` past the end.
    fn get_unit(&self, idx: usize) -> Option<u16>;
}

impl CodeUnits for [u16] {
    #[inline(always)]
    fn num_units(&self) -> usize {
        self.len()
    }

    #[inline(always)]
    fn get_unit(&self, idx: usize) -> Option<u16> {
        self.get(idx).copied()
    }
}

/// Little-endian UTF-16 code units stored as raw bytes.
///
/// Reads at most `num_units` units; a trailing odd byte is ignored.
#[derive(Debug, Copy, Clone)]
pub struct Utf16Le<'a> {
    bytes: &'a [u8],
    num_units: usize,
}

impl<'a> Utf16Le<'a> {
    pub fn new(bytes: &'a [u8], num_units: usize) -> Self {
        Utf16Le {
            bytes,
            num_units: core::cmp::min(num_units, bytes.len() / 2),
        }
    }
}

impl CodeUnits for Utf16Le<'_> {
    #[inline(always)]
    fn num_units(&self) -> usize {
        self.num_units
    }

    #[inline(always)]
    fn get_unit(&self, idx: usize) -> Option<u16> {
        if idx >= self.num_units {
            return None;
        }
        let offset = idx * 2;
        Some(u16::from_le_bytes([
            self.bytes[offset],
            self.bytes[offset + 1],
        ]))
    }
}

#[inline(always)]
pub fn is_high_surrogate(code_unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&code_unit)
}

#[inline(always)]
pub fn is_low_surrogate(code_unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&code_unit)
}

#[inline(always)]
fn is_surrogate(code_unit: u16) -> bool {
    (0xD800..=0xDFFF).contains(&code_unit)
}

#[inline(always)]
pub fn is_surrogate_pair(hi: u16, lo: u16) -> bool {
    is_high_surrogate(hi) && is_low_surrogate(lo)
}

/// Combine a high and a low surrogate into a scalar in `0x10000..=0x10FFFF`.
///
/// Both units must already be known to be in range (see [`is_surrogate_pair`]).
#[inline(always)]
pub fn decode_surrogate_pair(hi: u16, lo: u16) -> u32 {
    debug_assert!(is_surrogate_pair(hi, lo));
    let hi = (hi as u32) - 0xD800;
    let lo = (lo as u32) - 0xDC00;
    0x10000 + ((hi << 10) | lo)
}

/// Decode the scalar starting at `units[idx]`.
///
/// A high surrogate followed by a low surrogate is consumed as a pair. Any
/// other unit is consumed alone. Returns `None` only for a lone surrogate under
/// [`LoneSurrogates::Skip`]; the caller still advances by one unit in that case.
///
/// # Panics
/// If `idx` is out of bounds.
#[inline]
pub fn decode_scalar<U: CodeUnits + ?Sized>(
    units: &U,
    idx: usize,
    policy: LoneSurrogates,
) -> Option<Decoded> {
    let Some(code_unit) = units.get_unit(idx) else {
        panic!(
            "unit index {idx} out of bounds for {} units",
            units.num_units()
        );
    };

    if !is_surrogate(code_unit) {
        return Some(Decoded {
            scalar: code_unit as u32,
            consumed: 1,
        });
    }

    if is_high_surrogate(code_unit)
        && let Some(lo) = units.get_unit(idx + 1)
        && is_low_surrogate(lo)
    {
        return Some(Decoded {
            scalar: decode_surrogate_pair(code_unit, lo),
            consumed: 2,
        });
    }

    trace!("lone surrogate {code_unit:#06X} at unit {idx}, policy {policy:?}");
    let scalar = match policy {
        LoneSurrogates::Replace => REPLACEMENT_CHARACTER,
        LoneSurrogates::PassThrough => code_unit as u32,
        LoneSurrogates::Skip => return None,
    };

    Some(Decoded {
        scalar,
        consumed: 1,
    })
}
