use serde::{Deserialize, Serialize};

use crate::error::{GibberError, Result};

/// Byte written after every stored word.
pub const TERMINATOR: char = '\0';

/// Longest word the pool accepts, in bytes.
pub const MAX_WORD_LEN: usize = 1024;

/// Append-only arena of terminated words.
///
/// Words are addressed by the byte offset returned from [`StringPool::append`].
/// The buffer may be reallocated as it grows, offsets stay valid because they
/// are relative to the start of the buffer. Nothing is ever removed.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct StringPool {
	buf: String,
}

impl StringPool {
	/// Creates an empty pool.
	pub fn new() -> Self {
		Self::default()
	}

	/// Checks that `word` can be stored without corrupting the pool.
	pub fn check(word: &str) -> Result<()> {
		if word.len() > MAX_WORD_LEN {
			return Err(GibberError::WordTooLong { len: word.len(), max: MAX_WORD_LEN });
		}
		if word.contains(TERMINATOR) {
			return Err(GibberError::InvalidWord);
		}
		Ok(())
	}

	/// Stores `word` followed by the terminator and returns its offset.
	///
	/// # Errors
	/// - `WordTooLong` / `InvalidWord` if the word fails [`StringPool::check`]
	/// - `OutOfMemory` if the buffer cannot grow
	///
	/// On error the pool is left untouched.
	pub fn append(&mut self, word: &str) -> Result<usize> {
		Self::check(word)?;
		self.buf
			.try_reserve(word.len() + 1)
			.map_err(|_| GibberError::out_of_memory("string pool"))?;

		let offset = self.buf.len();
		self.buf.push_str(word);
		self.buf.push(TERMINATOR);
		Ok(offset)
	}

	/// Returns the word starting at `offset`.
	///
	/// Returns `None` for an offset past the end or inside a multi-byte character.
	pub fn get(&self, offset: usize) -> Option<&str> {
		let tail = self.buf.get(offset..)?;
		tail.split(TERMINATOR).next()
	}

	/// Total stored bytes, terminators included.
	pub fn len(&self) -> usize {
		self.buf.len()
	}

	/// True when nothing has been stored.
	pub fn is_empty(&self) -> bool {
		self.buf.is_empty()
	}
}
