//! The decode -> encode -> escape pipeline.
//!
//! Every input position is decoded into a scalar (one unit, or two for a
//! surrogate pair), encoded as 1-4 UTF-8 bytes, and each byte is appended to the
//! output as `%XX`. Nothing is left unescaped, ASCII included.

use std::io;

use crate::buffer::EscapeBuffer;
use crate::err::{EscapeError, Result};
use crate::percent::{ESCAPED_BYTE_LEN, escape_byte, push_escaped_utf8};
use crate::scalar::{CodeUnits, Utf16Le, decode_scalar};
use crate::settings::EscapeSettings;
use crate::utf8::encode_utf8;

/// Upper bound on the escaped length of `num_units` UTF-16 code units.
///
/// A single unit encodes to at most 3 UTF-8 bytes (a surrogate pair spends 4
/// bytes on 2 units), and every byte becomes 3 output bytes.
#[inline]
pub fn max_escaped_len(num_units: usize) -> usize {
    num_units.saturating_mul(3 * ESCAPED_BYTE_LEN)
}

/// Escape the scalar that starts at `units[idx]` and return the index of the
/// next unit to process.
#[inline]
pub fn escape_unit_at<U: CodeUnits + ?Sized>(
    units: &U,
    idx: usize,
    out: &mut EscapeBuffer<'_>,
    settings: &EscapeSettings,
) -> usize {
    match decode_scalar(units, idx, settings.get_lone_surrogates()) {
        Some(decoded) => {
            let encoded = encode_utf8(decoded.scalar);
            push_escaped_utf8(&encoded, out);
            idx + decoded.consumed
        }
        None => idx + 1,
    }
}

fn escape_units<U: CodeUnits + ?Sized>(
    units: &U,
    out: &mut EscapeBuffer<'_>,
    settings: &EscapeSettings,
) -> usize {
    let mut end = units.num_units();
    if settings.should_stop_at_nul() {
        end = (0..end)
            .find(|&idx| units.get_unit(idx) == Some(0))
            .unwrap_or(end);
    }

    // A unit at `end` is either past the input or NUL, so no pair straddles it.
    let mut idx = 0;
    while idx < end {
        idx = escape_unit_at(units, idx, out, settings);
    }

    out.len()
}

/// Escape all of `utf16` into `out` and return the resulting length of `out`.
#[inline]
pub fn escape_utf16(utf16: &[u16], out: &mut EscapeBuffer<'_>) -> usize {
    escape_units(utf16, out, &EscapeSettings::default())
}

#[inline]
pub fn escape_utf16_with_settings(
    utf16: &[u16],
    out: &mut EscapeBuffer<'_>,
    settings: &EscapeSettings,
) -> usize {
    escape_units(utf16, out, settings)
}

/// Escape little-endian UTF-16 bytes into `out`.
///
/// - `num_units` is the number of code units to read (not bytes); it is
///   clamped to `utf16le.len() / 2`.
///
/// Returns the resulting length of `out`.
#[inline]
pub fn escape_utf16le(utf16le: &[u8], num_units: usize, out: &mut EscapeBuffer<'_>) -> usize {
    escape_units(
        &Utf16Le::new(utf16le, num_units),
        out,
        &EscapeSettings::default(),
    )
}

#[inline]
pub fn escape_utf16le_with_settings(
    utf16le: &[u8],
    num_units: usize,
    out: &mut EscapeBuffer<'_>,
    settings: &EscapeSettings,
) -> usize {
    escape_units(&Utf16Le::new(utf16le, num_units), out, settings)
}

/// Escape a Rust string.
///
/// A `str` is already valid UTF-8, so its bytes are escaped directly; the
/// result is the same as running its UTF-16 form through [`escape_utf16`].
pub fn escape_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * ESCAPED_BYTE_LEN);
    for &byte in s.as_bytes() {
        out.extend(escape_byte(byte).map(char::from));
    }
    out
}

/// Convert a UTF-16LE byte slice into code units, rejecting odd lengths.
pub fn units_from_utf16le(bytes: &[u8]) -> Result<Vec<u16>> {
    if !bytes.len().is_multiple_of(2) {
        return Err(EscapeError::OddLength { len: bytes.len() });
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect())
}

/// Reusable escaper that keeps its output allocation between calls.
#[derive(Debug, Default)]
pub struct Escaper {
    settings: EscapeSettings,
    out: EscapeBuffer<'static>,
}

impl Escaper {
    pub fn new() -> Self {
        Escaper::default()
    }

    pub fn with_settings(settings: EscapeSettings) -> Self {
        Escaper {
            settings,
            out: EscapeBuffer::default(),
        }
    }

    pub fn settings(&self) -> &EscapeSettings {
        &self.settings
    }

    /// Escape UTF-16 code units and return a borrowed view of the output.
    pub fn escape_utf16(&mut self, utf16: &[u16]) -> &str {
        self.out.clear();
        escape_units(utf16, &mut self.out, &self.settings);
        self.out.as_str()
    }

    /// Escape UTF-16LE bytes and return a borrowed view of the output.
    pub fn escape_utf16le(&mut self, utf16le: &[u8], num_units: usize) -> &str {
        self.out.clear();
        escape_units(
            &Utf16Le::new(utf16le, num_units),
            &mut self.out,
            &self.settings,
        );
        self.out.as_str()
    }

    /// Write escaped UTF-16 code units into an `io::Write`, reusing the internal buffer.
    pub fn write_utf16_to<W: io::Write + ?Sized>(
        &mut self,
        writer: &mut W,
        utf16: &[u16],
    ) -> Result<()> {
        let out = self.escape_utf16(utf16);
        writer.write_all(out.as_bytes())?;
        Ok(())
    }

    /// Write escaped UTF-16LE bytes into an `io::Write`, reusing the internal buffer.
    pub fn write_utf16le_to<W: io::Write + ?Sized>(
        &mut self,
        writer: &mut W,
        utf16le: &[u8],
        num_units: usize,
    ) -> Result<()> {
        let out = self.escape_utf16le(utf16le, num_units);
        writer.write_all(out.as_bytes())?;
        Ok(())
    }
}
