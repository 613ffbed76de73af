//! Generation parameters and their command-line fallbacks.

use serde::{Deserialize, Serialize};

use crate::error::{GibberError, Result};
use crate::model::lcg::{DEFAULT_SEED, RANGE};

/// Source words shorter than this are ignored.
pub const DEFAULT_MIN_SOURCE_LEN: usize = 5;
/// Default number of unique generated words.
pub const DEFAULT_TARGET_COUNT: usize = 8192;
/// Default minimum generated word length.
pub const DEFAULT_MIN_LEN: usize = 6;
/// Default maximum generated word length.
pub const DEFAULT_MAX_LEN: usize = 8;
/// Default cap on consecutive rejected candidates.
pub const DEFAULT_MAX_ATTEMPTS: usize = 1_000_000;

/// Parameters shared by training and generation.
///
/// # Invariants
/// - `max_attempts > 0`
/// - `seed < 32768`
///
/// `min_len > max_len` is accepted here and reported by generation instead,
/// so a misconfigured run still trains and dumps its dictionaries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationConfig {
	/// Training and exclusion words shorter than this are skipped.
	pub min_source_len: usize,
	/// Inclusive lower bound on generated word length.
	pub min_len: usize,
	/// Inclusive upper bound on generated word length.
	pub max_len: usize,
	/// Output dictionary size at which generation stops.
	pub target_count: usize,
	/// Consecutive rejected candidates tolerated before giving up.
	pub max_attempts: usize,
	/// Initial generator value.
	pub seed: u32,
}

impl Default for GenerationConfig {
	fn default() -> Self {
		Self {
			min_source_len: DEFAULT_MIN_SOURCE_LEN,
			min_len: DEFAULT_MIN_LEN,
			max_len: DEFAULT_MAX_LEN,
			target_count: DEFAULT_TARGET_COUNT,
			max_attempts: DEFAULT_MAX_ATTEMPTS,
			seed: DEFAULT_SEED,
		}
	}
}

impl GenerationConfig {
	/// Returns a builder initialised with [`GenerationConfig::default`].
	#[must_use]
	pub fn builder() -> GenerationConfigBuilder {
		GenerationConfigBuilder::default()
	}

	/// Validates the invariants required by [`crate::GenerationContext`].
	pub fn validate(&self) -> Result<()> {
		if self.max_attempts == 0 {
			return Err(GibberError::InvalidConfig("max_attempts must be greater than zero".into()));
		}
		if self.seed >= RANGE {
			return Err(GibberError::InvalidConfig(format!(
				"seed ({}) must be below {RANGE}",
				self.seed
			)));
		}
		Ok(())
	}

	/// True when a word of `len` bytes fits the length bounds.
	pub fn accepts_len(&self, len: usize) -> bool {
		(self.min_len..=self.max_len).contains(&len)
	}
}

/// Builder for [`GenerationConfig`].
#[derive(Debug, Default, Clone)]
pub struct GenerationConfigBuilder {
	cfg: GenerationConfig,
}

impl GenerationConfigBuilder {
	/// Creates a builder with [`GenerationConfig::default`] settings.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the minimum source word length.
	#[must_use]
	pub fn min_source_len(mut self, value: usize) -> Self {
		self.cfg.min_source_len = value;
		self
	}

	/// Sets the minimum generated length.
	#[must_use]
	pub fn min_len(mut self, value: usize) -> Self {
		self.cfg.min_len = value;
		self
	}

	/// Sets the maximum generated length.
	#[must_use]
	pub fn max_len(mut self, value: usize) -> Self {
		self.cfg.max_len = value;
		self
	}

	/// Sets the target number of generated words.
	#[must_use]
	pub fn target_count(mut self, value: usize) -> Self {
		self.cfg.target_count = value;
		self
	}

	/// Sets the retry cap.
	#[must_use]
	pub fn max_attempts(mut self, value: usize) -> Self {
		self.cfg.max_attempts = value;
		self
	}

	/// Sets the generator seed.
	#[must_use]
	pub fn seed(mut self, value: u32) -> Self {
		self.cfg.seed = value;
		self
	}

	/// Minimum length from a raw command-line number; below 1 means default.
	#[must_use]
	pub fn lenient_min_len(self, raw: i64) -> Self {
		let value = usize::try_from(raw).ok().filter(|v| *v >= 1).unwrap_or(DEFAULT_MIN_LEN);
		self.min_len(value)
	}

	/// Maximum length from a raw command-line number; below the current
	/// minimum means default.
	///
	/// The default is not re-checked against the minimum.
	#[must_use]
	pub fn lenient_max_len(self, raw: i64) -> Self {
		let min_len = self.cfg.min_len;
		let value = usize::try_from(raw).ok().filter(|v| *v >= min_len).unwrap_or(DEFAULT_MAX_LEN);
		self.max_len(value)
	}

	/// Target count from a raw command-line number; below 1 means default.
	#[must_use]
	pub fn lenient_target_count(self, raw: i64) -> Self {
		let value = usize::try_from(raw).ok().filter(|v| *v >= 1).unwrap_or(DEFAULT_TARGET_COUNT);
		self.target_count(value)
	}

	/// Finalises the builder, returning a validated [`GenerationConfig`].
	pub fn build(self) -> Result<GenerationConfig> {
		self.cfg.validate()?;
		Ok(self.cfg)
	}
}
