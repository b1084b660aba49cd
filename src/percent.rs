//! `%XX` escaping of single bytes.

use crate::buffer::EscapeBuffer;

pub const HEX_UPPER: [u8; 16] = *b"0123456789ABCDEF";

/// Length of one escape sequence.
pub const ESCAPED_BYTE_LEN: usize = 3;

#[inline(always)]
pub fn escape_byte(byte: u8) -> [u8; ESCAPED_BYTE_LEN] {
    [
        b'%',
        HEX_UPPER[(byte >> 4) as usize],
        HEX_UPPER[(byte & 0x0F) as usize],
    ]
}

/// Append `%XX` for `byte` to `out`.
///
/// Room for all three bytes is reserved before anything is written.
#[inline(always)]
pub fn push_escaped(byte: u8, out: &mut EscapeBuffer<'_>) {
    out.extend_from_slice(&escape_byte(byte));
}

/// Append the escape sequence of every byte in `bytes`, in order.
#[inline]
pub fn push_escaped_utf8(bytes: &[u8], out: &mut EscapeBuffer<'_>) {
    out.reserve(bytes.len() * ESCAPED_BYTE_LEN);
    for &byte in bytes {
        push_escaped(byte, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_byte() {
        assert_eq!(&escape_byte(0xAB), b"%AB");
        assert_eq!(&escape_byte(0x00), b"%00");
        assert_eq!(&escape_byte(0xFF), b"%FF");
        assert_eq!(&escape_byte(b'a'), b"%61");
    }

    #[test]
    fn test_matches_format_for_all_bytes() {
        for byte in 0..=u8::MAX {
            let expected = format!("%{byte:02X}");
            assert_eq!(&escape_byte(byte), expected.as_bytes());
        }
    }

    #[test]
    fn test_push_escaped_appends_three() {
        let mut backing = [0u8; 32];
        let mut buf = EscapeBuffer::new(&mut backing);
        push_escaped(0xAB, &mut buf);
        assert_eq!(buf.len(), 3);
        push_escaped(0x00, &mut buf);
        push_escaped(0xFF, &mut buf);
        assert_eq!(buf.as_str(), "%AB%00%FF");
    }

    #[test]
    fn test_push_never_splits_across_spill() {
        // Two bytes of room: the whole triple must land on the heap.
        let mut backing = [0u8; 5];
        let mut buf = EscapeBuffer::new(&mut backing);
        push_escaped(0x12, &mut buf);
        push_escaped(0x34, &mut buf);
        assert!(buf.is_spilled());
        assert_eq!(buf.as_str(), "%12%34");
    }

    #[test]
    fn test_push_escaped_utf8() {
        let mut buf = EscapeBuffer::default();
        push_escaped_utf8("\u{20AC}".as_bytes(), &mut buf);
        assert_eq!(buf.as_str(), "%E2%82%AC");
    }
}
