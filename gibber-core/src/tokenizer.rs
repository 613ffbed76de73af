use std::io::{self, BufReader, Bytes, Read};

/// First byte of the Latin-1 range that is folded to ASCII letters.
const FOLD_START: u8 = 192;

/// Base letter for every byte in `192..=255`.
///
/// Multiplication and division signs (215, 247) fold to `x` like the rest of
/// their column.
const FOLD_PRIMARY: [u8; 64] = *b"AAAAAAACEEEEIIIIDNOOOOOXOUUUUYPSaaaaaaaceeeeiiiidnoooooxouuuuypy";

/// Second letter for the bytes that decompose into two letters.
fn fold_secondary(byte: u8) -> Option<u8> {
	match byte {
		198 => Some(b'E'), // Æ
		223 => Some(b'S'), // ß
		230 => Some(b'e'), // æ
		_ => None,
	}
}

/// Folds a raw byte to one or two bytes.
///
/// Bytes below 192 pass through unchanged. Bytes from 192 up are mapped onto
/// ASCII letters, in upper or lower case as found in the table.
pub fn fold_byte(byte: u8) -> (u8, Option<u8>) {
	if byte >= FOLD_START {
		(FOLD_PRIMARY[(byte - FOLD_START) as usize], fold_secondary(byte))
	} else {
		(byte, None)
	}
}

/// Lazy splitter turning a byte stream into lowercase alphabetic words.
///
/// A word ends at the first byte that is not an ASCII letter after folding,
/// or at end of stream. Runs of separators never produce empty words.
///
/// The stream is read once; the tokenizer is not restartable.
pub struct Tokenizer<R: Read> {
	bytes: Bytes<BufReader<R>>,
	exhausted: bool,
}

impl<R: Read> Tokenizer<R> {
	/// Wraps a reader. Input is buffered internally.
	pub fn new(reader: R) -> Self {
		Self {
			bytes: BufReader::new(reader).bytes(),
			exhausted: false,
		}
	}

	/// Returns the next non-empty word, or `None` once the stream is exhausted.
	///
	/// # Errors
	/// Propagates read failures. The tokenizer is exhausted afterwards.
	pub fn next_token(&mut self) -> io::Result<Option<String>> {
		let mut token = String::new();

		while !self.exhausted {
			let byte = match self.bytes.next() {
				Some(Ok(byte)) => byte,
				Some(Err(err)) => {
					self.exhausted = true;
					return Err(err);
				}
				None => {
					self.exhausted = true;
					break;
				}
			};

			let (first, second) = fold_byte(byte);
			if !first.is_ascii_alphabetic() {
				if token.is_empty() {
					continue;
				}
				return Ok(Some(token));
			}

			token.push(char::from(first.to_ascii_lowercase()));
			if let Some(second) = second {
				token.push(char::from(second.to_ascii_lowercase()));
			}
		}

		Ok((!token.is_empty()).then_some(token))
	}
}

impl<R: Read> Iterator for Tokenizer<R> {
	type Item = io::Result<String>;

	fn next(&mut self) -> Option<Self::Item> {
		self.next_token().transpose()
	}
}
