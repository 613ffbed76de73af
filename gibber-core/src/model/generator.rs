use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::bigram_model::BigramModel;
use super::lcg::Lcg;
use super::state::Window;
use crate::config::GenerationConfig;
use crate::dictionary::{Dictionary, MAX_WORD_LEN};
use crate::error::{GibberError, Result};

/// Dictionaries a candidate must not appear in.
#[derive(Clone, Copy, Debug)]
pub struct Filters<'a> {
	/// Words of the training corpus.
	pub training: &'a Dictionary,
	/// Words explicitly excluded by the user.
	pub exclusions: &'a Dictionary,
}

impl Filters<'_> {
	/// True if `word` is in either dictionary.
	pub fn is_known(&self, word: &str) -> bool {
		self.training.contains(word).is_some() || self.exclusions.contains(word).is_some()
	}
}

/// Counters collected over one call to [`WordGenerator::fill`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationReport {
	/// Words added to the output dictionary.
	pub added: usize,
	/// Candidates drawn, empty ones included.
	pub candidates: usize,
	/// Candidates that terminated before any letter.
	pub empty: usize,
	/// Candidates outside the length bounds.
	pub wrong_length: usize,
	/// Candidates present in the training or exclusion dictionary.
	pub known: usize,
	/// Candidates already generated earlier.
	pub duplicates: usize,
}

/// Walks a [`BigramModel`] with an [`Lcg`] to produce candidate words.
///
/// Every word starts at [`Window::START`] (the boundary state), emits letters
/// while the drawn bytes are letters, and terminates on the first non-letter.
/// The generator value carries over from one word to the next.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WordGenerator {
	rng: Lcg,
}

impl WordGenerator {
	/// Creates a generator seeded at `seed`.
	pub fn new(seed: u32) -> Self {
		Self { rng: Lcg::new(seed) }
	}

	/// Underlying random stream.
	pub fn rng(&self) -> &Lcg {
		&self.rng
	}

	/// Draws the byte following `window` and advances the stream.
	pub fn next_char(&mut self, model: &BigramModel, window: Window) -> u8 {
		let next = model.predict(window, &self.rng);
		trace!("Drew {:?} after {:?} (r={}, k={})", char::from(next), window, self.rng.state().0, self.rng.state().1);
		self.rng.advance();
		next
	}

	/// Generates one candidate word.
	///
	/// Returns an empty string when the first draw is not a letter, and `None`
	/// when the walk runs past [`MAX_WORD_LEN`] letters without terminating.
	pub fn next_candidate(&mut self, model: &BigramModel) -> Option<String> {
		let mut word = String::new();
		let mut window = Window::START;

		loop {
			let next = self.next_char(model, window);
			if !next.is_ascii_alphabetic() {
				return Some(word);
			}
			if word.len() == MAX_WORD_LEN {
				return None;
			}
			word.push(char::from(next));
			window = window.shift(next);
		}
	}

	/// Generates words into `output` until it holds `target` entries.
	///
	/// A candidate is accepted when its length is within the configured
	/// bounds, it is unknown to `filters`, and it is new to `output`.
	///
	/// # Errors
	/// - `DegenerateGeneration` if the bounds are inverted, the model has no
	///   start state, or `max_attempts` candidates in a row are rejected
	/// - `OutOfMemory` if `output` cannot grow
	pub fn fill(
		&mut self,
		model: &BigramModel,
		filters: Filters<'_>,
		output: &mut Dictionary,
		config: &GenerationConfig,
		target: usize,
	) -> Result<GenerationReport> {
		let mut report = GenerationReport::default();
		if output.len() >= target {
			return Ok(report);
		}

		let degenerate = |produced: usize, reason: String| GibberError::DegenerateGeneration {
			produced,
			target,
			reason,
		};
		if config.min_len > config.max_len {
			return Err(degenerate(
				output.len(),
				format!("minimum length {} exceeds maximum length {}", config.min_len, config.max_len),
			));
		}
		if model.state(Window::START).is_none() {
			return Err(degenerate(output.len(), "the transition model has no word starts".into()));
		}

		let mut rejected_in_a_row = 0;
		while output.len() < target {
			if rejected_in_a_row >= config.max_attempts {
				return Err(degenerate(
					output.len(),
					format!("{rejected_in_a_row} consecutive candidates were rejected"),
				));
			}

			report.candidates += 1;
			let Some(word) = self.next_candidate(model) else {
				report.wrong_length += 1;
				rejected_in_a_row += 1;
				continue;
			};

			if word.is_empty() {
				report.empty += 1;
			} else if !config.accepts_len(word.len()) {
				report.wrong_length += 1;
			} else if filters.is_known(&word) {
				debug!("Excluding {word}");
				report.known += 1;
			} else if output.insert(&word)?.is_new() {
				trace!("Accepted {word}");
				report.added += 1;
				rejected_in_a_row = 0;
				continue;
			} else {
				report.duplicates += 1;
			}
			rejected_in_a_row += 1;
		}

		Ok(report)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn model_of(words: &[&str]) -> BigramModel {
		let mut model = BigramModel::new();
		for word in words {
			model.add_word(word).unwrap();
		}
		model
	}

	fn config(min_len: usize, max_len: usize) -> GenerationConfig {
		GenerationConfig::builder()
			.min_len(min_len)
			.max_len(max_len)
			.max_attempts(10_000)
			.build()
			.unwrap()
	}

	#[test]
	fn single_word_model_reproduces_the_word() {
		let model = model_of(&["banana"]);
		let mut generator = WordGenerator::default();
		// Only the "na" state offers a choice: another "n" or the boundary.
		for _ in 0..20 {
			let word = generator.next_candidate(&model).unwrap();
			assert!(word.starts_with("ban") && word.ends_with('a'), "{word}");
			assert!(word.chars().all(|c| "ban".contains(c)));
		}
	}

	#[test]
	fn empty_model_yields_empty_candidates_and_advances() {
		let model = BigramModel::new();
		let mut generator = WordGenerator::default();
		assert_eq!(generator.next_candidate(&model).as_deref(), Some(""));
		assert_eq!(generator.rng().state().1, 1);
	}

	#[test]
	fn candidates_are_deterministic() {
		let model = model_of(&["tomate", "patate", "carotte", "tartine", "manger"]);
		let run = || {
			let mut generator = WordGenerator::new(17);
			(0..50).map(|_| generator.next_candidate(&model)).collect::<Vec<_>>()
		};
		assert_eq!(run(), run());
	}

	#[test]
	fn fill_respects_bounds_and_filters() {
		let words = ["tomate", "patate", "carotte", "tartine", "manger", "potage", "tortue"];
		let model = model_of(&words);
		let mut training = Dictionary::new();
		for word in words {
			training.insert(word).unwrap();
		}
		let mut exclusions = Dictionary::new();
		exclusions.insert("tate").unwrap();
		let filters = Filters { training: &training, exclusions: &exclusions };

		let mut output = Dictionary::new();
		let mut generator = WordGenerator::default();
		let report = generator.fill(&model, filters, &mut output, &config(3, 9), 10).unwrap();

		assert_eq!(output.len(), 10);
		assert_eq!(report.added, 10);
		for word in output.iter() {
			assert!((3..=9).contains(&word.len()), "{word}");
			assert!(!filters.is_known(word), "{word}");
		}
	}

	#[test]
	fn inverted_bounds_are_degenerate() {
		let model = model_of(&["anything"]);
		let (training, exclusions) = (Dictionary::new(), Dictionary::new());
		let filters = Filters { training: &training, exclusions: &exclusions };
		let mut output = Dictionary::new();
		let err = WordGenerator::default()
			.fill(&model, filters, &mut output, &config(20, 3), 5)
			.expect_err("bounds are inverted");
		assert!(matches!(err, GibberError::DegenerateGeneration { produced: 0, target: 5, .. }));
	}

	#[test]
	fn empty_model_is_degenerate() {
		let model = BigramModel::new();
		let (training, exclusions) = (Dictionary::new(), Dictionary::new());
		let filters = Filters { training: &training, exclusions: &exclusions };
		let mut output = Dictionary::new();
		let err = WordGenerator::default()
			.fill(&model, filters, &mut output, &config(1, 8), 1)
			.expect_err("nothing can be generated");
		assert!(matches!(err, GibberError::DegenerateGeneration { .. }));
		assert!(output.is_empty());
	}

	#[test]
	fn exhausted_word_space_hits_retry_cap() {
		// Only "ab" can ever be produced, and it is part of the training set.
		let model = model_of(&["ab"]);
		let mut training = Dictionary::new();
		training.insert("ab").unwrap();
		let exclusions = Dictionary::new();
		let filters = Filters { training: &training, exclusions: &exclusions };

		let mut output = Dictionary::new();
		let cfg = GenerationConfig::builder().min_len(1).max_len(5).max_attempts(50).build().unwrap();
		let err = WordGenerator::default()
			.fill(&model, filters, &mut output, &cfg, 3)
			.expect_err("target is unreachable");
		match err {
			GibberError::DegenerateGeneration { produced, target, reason } => {
				assert_eq!((produced, target), (0, 3));
				assert!(reason.contains("50 consecutive"));
			}
			other => panic!("unexpected error {other}"),
		}
	}

	#[test]
	fn fill_is_a_no_op_when_target_already_reached() {
		let model = BigramModel::new();
		let (training, exclusions) = (Dictionary::new(), Dictionary::new());
		let filters = Filters { training: &training, exclusions: &exclusions };
		let mut output = Dictionary::new();
		output.insert("already").unwrap();
		let mut generator = WordGenerator::default();
		let report = generator.fill(&model, filters, &mut output, &config(1, 8), 1).unwrap();
		assert_eq!(report, GenerationReport::default());
		assert_eq!(generator.rng().state(), (17, 0));
	}
}
