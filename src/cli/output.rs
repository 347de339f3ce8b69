//! Terminal output formatting
//!
//! Data goes to stdout undecorated. Errors go to stderr; colors respect
//! NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use std::io::{self, Write};

use colored::Colorize;

use crate::cli::CliError;
use crate::domain::KvPair;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print a command failure to stderr.
///
/// Fixed messages scripts match on (`false`, `key is already set`) are
/// printed bare; everything else gets the error prefix.
pub fn report(err: &CliError) {
    if err.is_plain() {
        eprintln!("{}", err);
    } else {
        error(err);
    }
}

/// Write one line of `list` output: the key, or `key=value` with the value
/// bytes as stored.
pub fn write_list_line(out: &mut dyn Write, pair: &KvPair, show_value: bool) -> io::Result<()> {
    out.write_all(pair.key.as_bytes())?;
    if show_value {
        out.write_all(b"=")?;
        out.write_all(&pair.value)?;
    }
    out.write_all(b"\n")
}
