//! Value operand resolution
//!
//! A value is given as trailing positional words, or as `-` to read it from
//! piped standard input.

use std::io;

use crate::infrastructure::traits::InputSource;

/// Operand that requests the value from standard input.
pub const STDIN_MARKER: &str = "-";

/// Resolve the value operand of `put` and `cas`.
///
/// The words are joined with single spaces and trimmed. A lone `-` with
/// piped input reads the input instead, drops one trailing newline and
/// trims surrounding whitespace. With a terminal attached `-` is taken
/// literally.
pub fn resolve_value(words: &[String], input: &dyn InputSource) -> io::Result<Vec<u8>> {
    let joined = words.join(" ");
    let arg = joined.trim();
    if arg == STDIN_MARKER && !input.is_terminal() {
        let raw = input.read_all()?;
        let raw = raw.strip_suffix(b"\n").unwrap_or(&raw[..]);
        return Ok(raw.trim_ascii().to_vec());
    }
    Ok(arg.as_bytes().to_vec())
}
