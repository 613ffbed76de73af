//! Deduplicating word set backed by a string pool and a fixed hash index.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::{GibberError, Result};

/// Append-only arena holding the dictionary's words.
pub mod pool;

pub use pool::{MAX_WORD_LEN, StringPool};

/// Number of hash chains in a dictionary.
///
/// The index is never resized. Chains grow without bound instead, so lookups
/// degrade linearly once a dictionary holds many times this many words.
pub const BUCKET_COUNT: usize = 2048;

const HASH_INCREMENT: usize = 1;
const HASH_MULTIPLIER: usize = 857;

/// Polynomial hash of `word` reduced to `bucket_count` chains.
pub fn hash_word(word: &str, bucket_count: usize) -> usize {
	word.bytes().fold(0, |h, byte| {
		((h + HASH_INCREMENT) * HASH_MULTIPLIER + usize::from(byte)) % bucket_count
	})
}

/// Position of a word in insertion order.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(usize);

impl EntryId {
	/// Zero-based insertion index.
	pub fn index(self) -> usize {
		self.0
	}
}

/// Outcome of [`Dictionary::insert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Insertion {
	/// The word was new and now lives at this entry.
	Added(EntryId),
	/// The word was already present; nothing changed.
	Existing(EntryId),
}

impl Insertion {
	/// Entry holding the word, whether it was added or found.
	pub fn id(self) -> EntryId {
		match self {
			Insertion::Added(id) | Insertion::Existing(id) => id,
		}
	}

	/// True if the insert changed the dictionary.
	pub fn is_new(self) -> bool {
		matches!(self, Insertion::Added(_))
	}
}

/// Insertion-ordered set of words.
///
/// # Invariants
/// - No two entries hold equal words
/// - `entries[i]` is the pool offset of the i-th inserted word
/// - Every entry id appears in exactly one chain, the one its word hashes to
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Dictionary {
	pool: StringPool,
	entries: Vec<usize>,
	chains: Vec<Vec<EntryId>>,
}

impl Default for Dictionary {
	fn default() -> Self {
		Self::new()
	}
}

impl Dictionary {
	/// Creates an empty dictionary with [`BUCKET_COUNT`] chains.
	pub fn new() -> Self {
		Self::with_bucket_count(BUCKET_COUNT)
	}

	/// Creates an empty dictionary with a custom number of chains.
	///
	/// A count of zero is treated as one.
	pub fn with_bucket_count(bucket_count: usize) -> Self {
		Self {
			pool: StringPool::new(),
			entries: Vec::new(),
			chains: vec![Vec::new(); bucket_count.max(1)],
		}
	}

	/// Looks `word` up, comparing full contents within its chain.
	pub fn contains(&self, word: &str) -> Option<EntryId> {
		let chain = &self.chains[hash_word(word, self.chains.len())];
		chain.iter().copied().find(|id| self.get(*id) == Some(word))
	}

	/// Adds `word` unless it is already present.
	///
	/// # Errors
	/// - `WordTooLong` / `InvalidWord` for words the pool cannot store
	/// - `OutOfMemory` if the pool, entry list or chain cannot grow
	///
	/// Existing entries are never affected by a failed insert.
	pub fn insert(&mut self, word: &str) -> Result<Insertion> {
		if let Some(id) = self.contains(word) {
			return Ok(Insertion::Existing(id));
		}

		let h = hash_word(word, self.chains.len());
		self.entries
			.try_reserve(1)
			.map_err(|_| GibberError::out_of_memory("dictionary entries"))?;
		self.chains[h]
			.try_reserve(1)
			.map_err(|_| GibberError::out_of_memory("hash chain"))?;

		let offset = self.pool.append(word)?;
		let id = EntryId(self.entries.len());
		self.entries.push(offset);
		self.chains[h].push(id);

		trace!("Added {word} at entry {} in chain {h}", id.0);
		Ok(Insertion::Added(id))
	}

	/// Returns the word stored at `id`.
	pub fn get(&self, id: EntryId) -> Option<&str> {
		self.pool.get(*self.entries.get(id.0)?)
	}

	/// Number of distinct words.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// True when no word has been inserted.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Words in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
		self.entries.iter().filter_map(|offset| self.pool.get(*offset))
	}

	/// Bytes held by the string pool, terminators included.
	pub fn pool_bytes(&self) -> usize {
		self.pool.len()
	}

	/// Length of the longest hash chain.
	pub fn longest_chain(&self) -> usize {
		self.chains.iter().map(Vec::len).max().unwrap_or(0)
	}

	/// Verifies the invariants of a dictionary decoded from outside the process.
	pub(crate) fn check_integrity(&self) -> Result<()> {
		let corrupt = |what: &str| Err(GibberError::Serialization(format!("corrupt dictionary: {what}")));

		if self.chains.is_empty() {
			return corrupt("no hash chains");
		}
		let chained: usize = self.chains.iter().map(Vec::len).sum();
		if chained != self.entries.len() {
			return corrupt("chain and entry counts differ");
		}
		let mut seen = vec![false; self.entries.len()];
		for (h, chain) in self.chains.iter().enumerate() {
			for (pos, id) in chain.iter().enumerate() {
				let word = match self.get(*id) {
					Some(word) if hash_word(word, self.chains.len()) == h => word,
					_ => return corrupt("entry in the wrong chain"),
				};
				if std::mem::replace(&mut seen[id.0], true) {
					return corrupt("entry chained twice");
				}
				// Equal words hash alike, so duplicates share a chain.
				if chain[..pos].iter().any(|other| self.get(*other) == Some(word)) {
					return corrupt("duplicate word");
				}
			}
		}
		Ok(())
	}
}

impl<'a> IntoIterator for &'a Dictionary {
	type Item = &'a str;
	type IntoIter = Box<dyn Iterator<Item = &'a str> + 'a>;

	fn into_iter(self) -> Self::IntoIter {
		Box::new(self.iter())
	}
}
