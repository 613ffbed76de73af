use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::dictionary::Dictionary;
use crate::error::{GibberError, Result};
use crate::tokenizer::Tokenizer;

/// Opens a text source for tokenizing.
///
/// # Errors
/// Returns `FileOpen` carrying the path when the file cannot be opened.
pub fn open_source<P: AsRef<Path>>(path: P) -> Result<Tokenizer<File>> {
	let path = path.as_ref();
	let file = File::open(path).map_err(|err| GibberError::file_open(err, path))?;
	Ok(Tokenizer::new(file))
}

/// Writes one word per line.
pub fn write_words<'a, W, I>(mut writer: W, words: I) -> io::Result<usize>
where
	W: Write,
	I: IntoIterator<Item = &'a str>,
{
	let mut count = 0;
	for word in words {
		writeln!(writer, "{word}")?;
		count += 1;
	}
	writer.flush()?;
	Ok(count)
}

/// Saves a dictionary to `path`, one word per line in insertion order.
///
/// Returns the number of words written.
///
/// # Errors
/// - `FileOpen` when the destination cannot be created
/// - `Io` when writing fails part way
pub fn save_dictionary<P: AsRef<Path>>(dictionary: &Dictionary, path: P) -> Result<usize> {
	let path = path.as_ref();
	let file = File::create(path).map_err(|err| GibberError::file_open(err, path))?;
	write_words(BufWriter::new(file), dictionary).map_err(|err| GibberError::io(err, Some(path.to_path_buf())))
}
