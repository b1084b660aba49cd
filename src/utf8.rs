//! Scalar value -> UTF-8 encoding.
//!
//! Branches on the magnitude of the scalar rather than counting bits, writing
//! straight into a 4-byte buffer.

use core::fmt;
use core::ops::Deref;

/// The longest UTF-8 encoding of any scalar value.
pub const MAX_UTF8_LEN: usize = 4;

#[inline(always)]
pub fn utf8_len(value: u32) -> usize {
    if value <= 0x7F {
        1
    } else if value <= 0x7FF {
        2
    } else if value <= 0xFFFF {
        3
    } else {
        4
    }
}

/// Encode `value` into `dst`, returning the number of bytes written.
///
/// `value` must be at most `0x10FFFF`. Surrogate-range values are encoded like
/// any other 3-byte value.
#[inline(always)]
pub fn encode_utf8_into(value: u32, dst: &mut [u8; MAX_UTF8_LEN]) -> usize {
    debug_assert!(value <= 0x10FFFF, "{value:#X} is not a Unicode scalar");

    let written = if value <= 0x7F {
        dst[0] = value as u8;
        1
    } else if value <= 0x7FF {
        dst[0] = 0xC0 | (value >> 6) as u8;
        dst[1] = 0x80 | (value & 0x3F) as u8;
        2
    } else if value <= 0xFFFF {
        dst[0] = 0xE0 | (value >> 12) as u8;
        dst[1] = 0x80 | ((value >> 6) & 0x3F) as u8;
        dst[2] = 0x80 | (value & 0x3F) as u8;
        3
    } else {
        dst[0] = 0xF0 | (value >> 18) as u8;
        dst[1] = 0x80 | ((value >> 12) & 0x3F) as u8;
        dst[2] = 0x80 | ((value >> 6) & 0x3F) as u8;
        dst[3] = 0x80 | (value & 0x3F) as u8;
        4
    };

    debug_assert!(written <= MAX_UTF8_LEN);
    written
}

/// The UTF-8 encoding of one scalar, held inline.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Utf8Bytes {
    buf: [u8; MAX_UTF8_LEN],
    len: u8,
}

impl Utf8Bytes {
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Never true: every scalar encodes to at least one byte.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len as usize]
    }
}

impl Deref for Utf8Bytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for Utf8Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Utf8Bytes({:02X?})", self.as_bytes())
    }
}

#[inline(always)]
pub fn encode_utf8(value: u32) -> Utf8Bytes {
    let mut buf = [0u8; MAX_UTF8_LEN];
    let len = encode_utf8_into(value, &mut buf);
    Utf8Bytes {
        buf,
        len: len as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn std_encode(value: u32) -> Vec<u8> {
        let ch = char::from_u32(value).expect("valid scalar");
        let mut buf = [0u8; 4];
        ch.encode_utf8(&mut buf).as_bytes().to_vec()
    }

    fn all_scalars() -> impl Iterator<Item = u32> {
        (0..=0x10FFFFu32).filter(|v| !(0xD800..=0xDFFF).contains(v))
    }

    #[test]
    fn test_one_byte_range() {
        for v in 0..=0x7Fu32 {
            assert_eq!(encode_utf8(v).as_bytes(), &[v as u8]);
        }
    }

    #[test]
    fn test_two_byte_range() {
        for v in 0x80..=0x7FFu32 {
            let out = encode_utf8(v);
            assert_eq!(out.len(), 2);
            assert_eq!(out[0] >> 5, 0b110);
            assert!((0x80..=0xBF).contains(&out[1]));
        }
    }

    #[test]
    fn test_three_byte_range() {
        for v in 0x800..=0xFFFFu32 {
            let out = encode_utf8(v);
            assert_eq!(out.len(), 3);
            assert_eq!(out[0] >> 4, 0b1110);
        }
    }

    #[test]
    fn test_four_byte_range() {
        for v in (0x10000..=0x10FFFFu32).step_by(0x101) {
            let out = encode_utf8(v);
            assert_eq!(out.len(), 4);
            assert_eq!(out[0] >> 3, 0b11110);
        }
        assert_eq!(encode_utf8(0x10FFFF).len(), 4);
    }

    #[test]
    fn test_matches_std_for_every_scalar() {
        for v in all_scalars() {
            let out = encode_utf8(v);
            assert_eq!(out.len(), utf8_len(v), "length for {v:#X}");
            assert_eq!(out.as_bytes(), std_encode(v).as_slice(), "bytes for {v:#X}");
        }
    }

    #[test]
    fn test_boundaries_decode_back() {
        for v in [0x7F, 0x80, 0x7FF, 0x800, 0xFFFF, 0x10000, 0x10FFFF] {
            let out = encode_utf8(v);
            let s = std::str::from_utf8(&out).unwrap();
            let mut chars = s.chars();
            assert_eq!(chars.next().map(|c| c as u32), Some(v));
            assert_eq!(chars.next(), None);
        }
    }

    #[test]
    fn test_surrogate_value_encodes_as_three_bytes() {
        assert_eq!(encode_utf8(0xD800).as_bytes(), &[0xED, 0xA0, 0x80]);
    }

    #[test]
    fn test_into_leaves_tail_untouched() {
        let mut buf = [0xAA; MAX_UTF8_LEN];
        assert_eq!(encode_utf8_into(0xE9, &mut buf), 2);
        assert_eq!(buf, [0xC3, 0xA9, 0xAA, 0xAA]);
    }
}
