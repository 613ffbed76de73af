//! Command-line surface of `gibbergen`.

use std::path::PathBuf;

use clap::{ArgAction, CommandFactory, Parser};
use log::warn;

use gibber_core::GibberError;

const ABOUT: &str = "Generate language specific pronounceable non-dictionary words";

const LONG_ABOUT: &str = "\
Generates new pronounceable words in the language of your choice. Language rules are
built from a template text file, then random words are generated from those rules:
a french template gives french-sounding words. Generated words never include words
from the template file. A text file of words-to-exclude can be supplied to keep
generated words out of an existing dictionary.

Options run in this order whatever their position: -r -t -x -s -l -b -n -m -c -f.
Each option runs once; when one is repeated, its last value wins.";

/// Flags accepted by `gibbergen`.
///
/// Value flags are `Option<Option<_>>`: the outer `None` means the flag was
/// absent, `Some(None)` means it was given without a value.
#[derive(Parser, Debug, Default)]
#[command(
	name = "gibbergen",
	before_help = concat!("gibbergen ", env!("CARGO_PKG_VERSION")),
	about = ABOUT,
	long_about = LONG_ABOUT,
	disable_help_flag = true,
	args_override_self = true
)]
pub struct Cli {
	/// Build language rules from this text file
	#[arg(short = 't', short_alias = 'T', value_name = "FILE", num_args = 0..=1)]
	pub train: Option<Option<PathBuf>>,

	/// Exclude all words in this text file from generated words
	#[arg(short = 'x', short_alias = 'X', value_name = "FILE", num_args = 0..=1)]
	pub exclude: Option<Option<PathBuf>>,

	/// Save unique words from the language file as a dictionary
	#[arg(short = 'l', short_alias = 'L', value_name = "FILE", num_args = 0..=1)]
	pub save_language: Option<Option<PathBuf>>,

	/// Save all excluded (bad) words to file as a dictionary
	#[arg(short = 'b', short_alias = 'B', value_name = "FILE", num_args = 0..=1)]
	pub save_excluded: Option<Option<PathBuf>>,

	/// Generate words no shorter than this many characters
	#[arg(short = 'n', short_alias = 'N', value_name = "N", num_args = 0..=1)]
	pub min_len: Option<Option<String>>,

	/// Generate words no longer than this many characters
	#[arg(short = 'm', short_alias = 'M', value_name = "N", num_args = 0..=1)]
	pub max_len: Option<Option<String>>,

	/// Count. Generate this many unique words
	#[arg(short = 'c', short_alias = 'C', value_name = "N", num_args = 0..=1)]
	pub count: Option<Option<String>>,

	/// Output generated words to file instead of stdout
	#[arg(short = 'f', short_alias = 'F', value_name = "FILE", num_args = 0..=1)]
	pub output: Option<Option<PathBuf>>,

	/// Save the language rules and dictionaries to a snapshot file
	#[arg(short = 's', short_alias = 'S', value_name = "FILE", num_args = 0..=1)]
	pub save_snapshot: Option<Option<PathBuf>>,

	/// Restore language rules and dictionaries from a snapshot file
	#[arg(short = 'r', short_alias = 'R', value_name = "FILE", num_args = 0..=1)]
	pub restore_snapshot: Option<Option<PathBuf>>,

	/// Be verbose
	#[arg(short = 'v', short_alias = 'V', action = ArgAction::SetTrue)]
	pub verbose: bool,

	/// Be very verbose
	#[arg(short = 'w', short_alias = 'W', action = ArgAction::SetTrue)]
	pub very_verbose: bool,

	/// Print this message
	#[arg(short = 'h', short_alias = 'H', action = ArgAction::SetTrue)]
	pub help: bool,
}

/// Value of a flag that takes an argument.
///
/// A flag given without its value logs `MissingArgument` and counts as absent.
pub fn flag_value<T>(value: &Option<Option<T>>, flag: char) -> Option<&T> {
	match value {
		None => None,
		Some(None) => {
			warn!("{}", GibberError::MissingArgument { flag });
			None
		}
		Some(Some(value)) => Some(value),
	}
}

/// Parses a number the way `atol` does: optional sign, leading digits, and
/// zero when nothing numeric is found.
pub fn parse_lenient(raw: &str) -> i64 {
	let trimmed = raw.trim_start();
	let (negative, digits) = match trimmed.as_bytes().first() {
		Some(b'-') => (true, &trimmed[1..]),
		Some(b'+') => (false, &trimmed[1..]),
		_ => (false, trimmed),
	};
	let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
	let value = digits[..end].parse::<i64>().unwrap_or(0);
	if negative { -value } else { value }
}

/// Full usage banner.
pub fn usage() -> String {
	Cli::command().render_long_help().to_string()
}
