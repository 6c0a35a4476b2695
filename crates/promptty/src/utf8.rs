//! Assembling UTF-8 characters from single bytes.
//!
//! Keystrokes arrive from a Unix terminal one byte at a time, yet a single
//! key may produce a multi-byte character. [`CharAssembler`] buffers the
//! leading bytes until the character is complete.

use crate::err::{ErrorKind, Result};

/// Determine the length of the UTF-8 character starting the byte slice.
///
/// On success, this function returns the number of bytes of the character. On
/// failure, it returns the number of bytes examined. A failure index no smaller
/// than the slice length means the character is incomplete.
pub(crate) fn scan_utf8(bytes: &[u8]) -> std::result::Result<usize, usize> {
    // See https://github.com/rust-lang/rust/blob/master/library/core/src/str/validations.rs
    let mut index = 0;
    let len = bytes.len();

    macro_rules! next {
        () => {{
            index += 1;
            if index >= len {
                return Err(index);
            }
            bytes[index]
        }};
    }

    if len == 0 {
        return Err(0);
    }
    let first = bytes[0];
    if first < 0x80 {
        return Ok(1);
    }

    let width = UTF8_CHAR_WIDTH[(first - 0x80) as usize];
    // 2-byte encoding is for codepoints  \u{0080} to  \u{07ff}
    //        first  C2 80        last DF BF
    // 3-byte encoding is for codepoints  \u{0800} to  \u{ffff}
    //        first  E0 A0 80     last EF BF BF
    //   excluding surrogates codepoints  \u{d800} to  \u{dfff}
    //               ED A0 80 to       ED BF BF
    // 4-byte encoding is for codepoints \u{10000} to \u{10ffff}
    //        first  F0 90 80 80  last F4 8F BF BF
    //
    // Use the UTF-8 syntax from the RFC
    //
    // https://tools.ietf.org/html/rfc3629
    // UTF8-1      = %x00-7F
    // UTF8-2      = %xC2-DF UTF8-tail
    // UTF8-3      = %xE0 %xA0-BF UTF8-tail / %xE1-EC 2( UTF8-tail ) /
    //               %xED %x80-9F UTF8-tail / %xEE-EF 2( UTF8-tail )
    // UTF8-4      = %xF0 %x90-BF 2( UTF8-tail ) / %xF1-F3 3( UTF8-tail ) /
    //               %xF4 %x80-8F 2( UTF8-tail )
    match width {
        2 => {
            if next!() as i8 >= -64 {
                return Err(1);
            }
        }
        3 => {
            match (first, next!()) {
                (0xE0, 0xA0..=0xBF)
                | (0xE1..=0xEC, 0x80..=0xBF)
                | (0xED, 0x80..=0x9F)
                | (0xEE..=0xEF, 0x80..=0xBF) => {}
                _ => return Err(1),
            }
            if next!() as i8 >= -64 {
                return Err(2);
            }
        }
        4 => {
            match (first, next!()) {
                (0xF0, 0x90..=0xBF) | (0xF1..=0xF3, 0x80..=0xBF) | (0xF4, 0x80..=0x8F) => {}
                _ => return Err(1),
            }
            if next!() as i8 >= -64 {
                return Err(2);
            }
            if next!() as i8 >= -64 {
                return Err(3);
            }
        }
        _ => return Err(1),
    }

    Ok(width as usize)
}

#[rustfmt::skip]
const UTF8_CHAR_WIDTH: &[u8; 128] = &[
    // 1  2  3  4  5  6  7  8  9  A  B  C  D  E  F
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 8
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 9
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // A
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // B
    0, 0, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, // C
    2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, // D
    3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, // E
    4, 4, 4, 4, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // F
];

/// An assembler of characters from individual bytes.
#[derive(Debug, Default)]
pub(crate) struct CharAssembler {
    bytes: [u8; 4],
    len: usize,
}

impl CharAssembler {
    /// Create a new assembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the next byte.
    ///
    /// This method returns the character once it is complete and `None`
    /// while more bytes are needed. Upon malformed input, it discards the
    /// buffered bytes and fails.
    pub fn push(&mut self, byte: u8) -> Result<Option<char>> {
        if self.len == 0 && 0x80 <= byte && UTF8_CHAR_WIDTH[(byte - 0x80) as usize] == 0 {
            return Err(ErrorKind::MalformedUtf8.into());
        }

        self.bytes[self.len] = byte;
        self.len += 1;

        match scan_utf8(&self.bytes[..self.len]) {
            Ok(width) => {
                let decoded = core::str::from_utf8(&self.bytes[..width])
                    .ok()
                    .and_then(|s| s.chars().next());
                self.len = 0;
                decoded.map(Some).ok_or_else(|| ErrorKind::MalformedUtf8.into())
            }
            Err(index) if self.len <= index && self.len < self.bytes.len() => Ok(None),
            Err(_) => {
                self.len = 0;
                Err(ErrorKind::MalformedUtf8.into())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn assemble(bytes: &[u8]) -> Result<Vec<char>> {
        let mut assembler = CharAssembler::new();
        let mut chars = Vec::new();
        for byte in bytes {
            if let Some(c) = assembler.push(*byte)? {
                chars.push(c);
            }
        }
        Ok(chars)
    }

    #[test]
    fn test_assemble() -> Result<()> {
        assert_eq!(assemble(b"ab")?, vec!['a', 'b']);
        assert_eq!(assemble("ü€😜".as_bytes())?, vec!['ü', '€', '😜']);
        Ok(())
    }

    #[test]
    fn test_incomplete() -> Result<()> {
        let mut assembler = CharAssembler::new();
        assert_eq!(assembler.push(0xe2)?, None);
        assert_eq!(assembler.push(0x82)?, None);
        assert_eq!(assembler.push(0xac)?, Some('€'));
        Ok(())
    }

    #[test]
    fn test_malformed() {
        let mut assembler = CharAssembler::new();
        assert!(assembler.push(0x80).is_err());
        assert!(matches!(assembler.push(0xc3), Ok(None)));
        assert!(assembler.push(b'A').is_err());
        assert!(matches!(assembler.push(b'A'), Ok(Some('A'))));
    }
}
