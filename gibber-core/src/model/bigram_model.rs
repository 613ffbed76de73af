use std::collections::HashMap;

use log::trace;
use serde::{Deserialize, Serialize};

use super::lcg::Lcg;
use super::state::{State, Window};
use super::{BOUNDARY, SENTINEL};
use crate::error::{GibberError, Result};

/// Second-order character transition model ("usage rules").
///
/// Each state maps the two previous bytes of a word to every byte seen
/// right after them. Frequencies are encoded by repetition inside a state.
///
/// # Invariants
/// - Each state is stored under its own key
/// - No state is empty
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct BigramModel {
	/// Mapping from a window to its followers
	states: HashMap<Window, State>,
}

impl BigramModel {
	/// Creates an empty model.
	pub fn new() -> Self {
		Self::default()
	}

	/// Folds one training word into the model.
	///
	/// The word is read as if padded with two leading boundary bytes and one
	/// trailing boundary byte: `"cat"` records `"  "→c`, `" c"→a`, `"ca"→t`
	/// and `"at"→' '`.
	///
	/// # Errors
	/// Returns `OutOfMemory` if a state cannot grow. States touched before
	/// the failure keep their new followers.
	pub fn add_word(&mut self, word: &str) -> Result<()> {
		let mut window = Window::START;
		for next in word.bytes().chain(std::iter::once(BOUNDARY)) {
			if !self.states.contains_key(&window) {
				trace!("Creating state ({:?} {:?})", char::from(window.prev2()), char::from(window.prev1()));
				self.states
					.try_reserve(1)
					.map_err(|_| GibberError::out_of_memory("transition table"))?;
			}
			self.states
				.entry(window)
				.or_insert_with(|| State::new(window))
				.add_follower(next)?;
			window = window.shift(next);
		}
		Ok(())
	}

	/// Returns the state for `window`, if any word produced it.
	pub fn state(&self, window: Window) -> Option<&State> {
		self.states.get(&window)
	}

	/// Next byte after `window` using the generator's current value.
	///
	/// Falls back to [`SENTINEL`] when the window was never observed.
	/// The generator is not advanced.
	pub fn predict(&self, window: Window, rng: &Lcg) -> u8 {
		self.state(window).and_then(|state| state.predict(rng)).unwrap_or(SENTINEL)
	}

	/// True when no word has been learned.
	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	/// Number of distinct windows.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	/// Number of recorded transitions across all states.
	pub fn transitions(&self) -> usize {
		self.states.values().map(|state| state.followers().len()).sum()
	}

	/// Verifies the invariants of a model decoded from outside the process.
	pub(crate) fn check_integrity(&self) -> Result<()> {
		for (window, state) in &self.states {
			if state.key() != *window || state.followers().is_empty() {
				return Err(GibberError::Serialization(format!(
					"corrupt transition state {:?}",
					window
				)));
			}
		}
		Ok(())
	}
}
