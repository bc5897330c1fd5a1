//! Argument handling shared by the binaries.

use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;

/// Parse `args`, or print the problem plus an example invocation.
///
/// Returns `None` when the program should exit without doing anything: on a
/// usage error as well as after `--help` or `--version`.
pub fn parse_args<C, I, T>(args: I, example: &str) -> Option<C>
where
    C: Parser,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match C::try_parse_from(args) {
        Ok(cli) => Some(cli),
        Err(err) => {
            let _ = err.print();
            if !matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                eprintln!("\nExample: {}", example);
            }
            None
        }
    }
}
