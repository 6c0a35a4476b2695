//! Helpers for formatting console text.
//!
//! Lengths are counted in characters, not bytes, so that padded text lines
//! up for the common case of single-width characters.

use crate::cmd::{Format, ResetStyle};
use crate::err::{ErrorKind, Result};

/// Get the single padding character.
fn padding(pad: &str) -> Result<char> {
    let mut chars = pad.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ErrorKind::InvalidArgument.into()),
    }
}

fn fill(text: &str, length: usize, pad: char) -> String {
    let count = length.saturating_sub(text.chars().count());
    std::iter::repeat(pad).take(count).collect()
}

/// Pad the text on the right to the given length.
///
/// The pad must be exactly one character. Otherwise, this function fails
/// with [`ErrorKind::InvalidArgument`]. Text that already is as long as or
/// longer than the length is returned unchanged.
///
/// # Example
///
/// ```
/// # use promptty::util::pad_right;
/// assert_eq!(pad_right("abc", 6, "X")?, "abcXXX");
/// assert!(pad_right("abc", 6, "XY").is_err());
/// # Ok::<(), promptty::err::Error>(())
/// ```
pub fn pad_right(text: &str, length: usize, pad: &str) -> Result<String> {
    let pad = padding(pad)?;
    let mut result = text.to_owned();
    result.push_str(&fill(text, length, pad));
    Ok(result)
}

/// Pad the text on the left to the given length.
///
/// This function enforces the same constraints as [`pad_right`].
pub fn pad_left(text: &str, length: usize, pad: &str) -> Result<String> {
    let pad = padding(pad)?;
    let mut result = fill(text, length, pad);
    result.push_str(text);
    Ok(result)
}

/// Create a line separator with optional embedded text.
///
/// The separator is the text padded with spaces to the length and then
/// underlined.
pub fn line_separator(text: &str, length: usize) -> String {
    format!(
        "{}{}{}{}",
        Format::Underlined,
        text,
        fill(text, length, ' '),
        ResetStyle
    )
}

// =====================================================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_padding() -> Result<()> {
        assert_eq!(pad_right("abc", 10, "X")?, "abcXXXXXXX");
        assert_eq!(pad_left("abc", 10, "X")?, "XXXXXXXabc");
        assert_eq!(pad_left("abcdef", 3, " ")?, "abcdef");
        assert_eq!(pad_right("", 2, "·")?, "··");
        assert_eq!(pad_right("äö", 3, "-")?, "äö-");
        Ok(())
    }

    #[test]
    fn test_invalid_padding() {
        for pad in ["", "ab"] {
            let result = pad_right("abc", 5, pad);
            assert_eq!(result.map_err(|e| e.kind()), Err(ErrorKind::InvalidArgument));
            let result = pad_left("abc", 5, pad);
            assert_eq!(result.map_err(|e| e.kind()), Err(ErrorKind::InvalidArgument));
        }
    }

    #[test]
    fn test_line_separator() {
        assert_eq!(line_separator("Title", 8), "\x1b[4mTitle   \x1b[m");
        assert_eq!(line_separator("", 2), "\x1b[4m  \x1b[m");
    }
}
