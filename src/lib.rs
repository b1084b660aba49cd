//! Percent-escaping of UTF-16 text.
//!
//! Each UTF-16 position is decoded into a Unicode scalar (combining surrogate
//! pairs), encoded as UTF-8, and every UTF-8 byte is appended to an output
//! buffer as `%XX` with uppercase hex digits.
//!
//! ```
//! use utf16_pct_escape::{EscapeBuffer, escape_utf16};
//!
//! let input: Vec<u16> = "a\u{1F600}".encode_utf16().collect();
//! let mut backing = [0u8; 64];
//! let mut out = EscapeBuffer::new(&mut backing);
//!
//! assert_eq!(escape_utf16(&input, &mut out), 15);
//! assert_eq!(out.as_str(), "%61%F0%9F%98%80");
//! ```
//!
//! The output buffer starts over caller-provided storage and moves to the heap
//! only if that storage runs out (see [`EscapeBuffer`]).

pub mod buffer;
pub mod err;
pub mod escape;
pub mod percent;
pub mod scalar;
pub mod settings;
pub mod utf8;

pub use buffer::EscapeBuffer;
pub use err::{EscapeError, Result};
pub use escape::{
    Escaper, escape_str, escape_unit_at, escape_utf16, escape_utf16_with_settings,
    escape_utf16le, escape_utf16le_with_settings, max_escaped_len, units_from_utf16le,
};
pub use percent::{HEX_UPPER, escape_byte, push_escaped, push_escaped_utf8};
pub use scalar::{
    CodeUnits, Decoded, LoneSurrogates, Utf16Le, decode_scalar, decode_surrogate_pair,
    is_high_surrogate, is_low_surrogate, is_surrogate_pair,
};
pub use settings::EscapeSettings;
pub use utf8::{MAX_UTF8_LEN, Utf8Bytes, encode_utf8, encode_utf8_into, utf8_len};

// Helpers for tests
#[cfg(test)]
mod tests {
    use std::sync::Once;

    static LOGGER_INIT: Once = Once::new();

    // Rust runs the tests concurrently, so unless we synchronize logging access
    // it will crash when attempting to run `cargo test` with some logging facilities.
    pub fn ensure_env_logger_initialized() {
        LOGGER_INIT.call_once(env_logger::init);
    }

    #[test]
    fn test_spill_is_logged_without_panicking() {
        ensure_env_logger_initialized();

        let input: Vec<u16> = [0xD83F, 0xDFFE].repeat(10);
        let mut backing = [0u8; 16];
        let mut out = crate::EscapeBuffer::new(&mut backing);
        assert_eq!(crate::escape_utf16(&input, &mut out), 120);
        assert!(out.is_spilled());
    }
}
