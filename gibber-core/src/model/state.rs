use serde::{Deserialize, Serialize};

use super::lcg::Lcg;
use super::BOUNDARY;
use crate::error::{GibberError, Result};

/// The two most recent bytes of a word, packed as `prev2 << 8 | prev1`.
///
/// Sliding the window mixes a new byte into the low half and drops the
/// oldest one, so the packed value doubles as the model's lookup key.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Window(u16);

impl Window {
	/// Window at the start of every word: two boundary bytes.
	pub const START: Window = Window::new(BOUNDARY, BOUNDARY);

	/// Builds a window from the byte before last and the last byte.
	pub const fn new(prev2: u8, prev1: u8) -> Self {
		Self(((prev2 as u16) << 8) | prev1 as u16)
	}

	/// Window after `next` follows the current one.
	pub const fn shift(self, next: u8) -> Self {
		Self((self.0 << 8) | next as u16)
	}

	/// Byte before last.
	pub const fn prev2(self) -> u8 {
		(self.0 >> 8) as u8
	}

	/// Last byte.
	pub const fn prev1(self) -> u8 {
		self.0 as u8
	}
}

/// Bytes observed after one window across the training words.
///
/// A byte seen `k` times appears `k` times in `followers`, so picking a
/// uniform index samples the next byte proportionally to its frequency.
///
/// ## Invariants
/// - `followers` is never empty once the state is in a model
/// - Entries are only appended, their order is the order of observation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct State {
	/// Window this state belongs to.
	key: Window,
	/// Every byte seen after `key`, repeats included.
	followers: Vec<u8>,
}

impl State {
	/// Creates a new state with no followers.
	pub fn new(key: Window) -> Self {
		Self { key, followers: Vec::new() }
	}

	/// Window this state belongs to.
	pub fn key(&self) -> Window {
		self.key
	}

	/// Observed followers in insertion order.
	pub fn followers(&self) -> &[u8] {
		&self.followers
	}

	/// Records one more occurrence of `next` after this window.
	///
	/// # Errors
	/// Returns `OutOfMemory` if the follower list cannot grow.
	pub fn add_follower(&mut self, next: u8) -> Result<()> {
		self.followers
			.try_reserve(1)
			.map_err(|_| GibberError::out_of_memory("transition bucket"))?;
		self.followers.push(next);
		Ok(())
	}

	/// Picks a follower with the generator's current value.
	///
	/// Does not advance the generator. Returns `None` for an empty state.
	pub fn predict(&self, rng: &Lcg) -> Option<u8> {
		let index = rng.pick(self.followers.len())?;
		self.followers.get(index).copied()
	}
}
