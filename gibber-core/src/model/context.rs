use std::io::Read;
use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::bigram_model::BigramModel;
use super::generator::{Filters, GenerationReport, WordGenerator};
use crate::config::GenerationConfig;
use crate::dictionary::{Dictionary, Insertion};
use crate::error::{GibberError, Result};
use crate::io::open_source;
use crate::tokenizer::Tokenizer;

/// Layout version written at the start of every snapshot.
const SNAPSHOT_VERSION: u32 = 1;

/// Counters collected while reading one source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
	/// Tokens read from the source.
	pub tokens: usize,
	/// Tokens added to the target dictionary.
	pub added: usize,
	/// Tokens already present in the target dictionary.
	pub duplicates: usize,
	/// Tokens shorter than the minimum source length.
	pub too_short: usize,
	/// Tokens the dictionary refused to store.
	pub skipped: usize,
}

/// Borrowed view written by [`GenerationContext::save_snapshot`].
#[derive(Serialize)]
struct SnapshotRef<'a> {
	version: u32,
	training: &'a Dictionary,
	exclusions: &'a Dictionary,
	model: &'a BigramModel,
}

/// Owned counterpart read by [`GenerationContext::load_snapshot`].
#[derive(Deserialize)]
struct Snapshot {
	version: u32,
	training: Dictionary,
	exclusions: Dictionary,
	model: BigramModel,
}

/// Everything one generation run mutates.
///
/// This struct manages:
/// - `training`: unique words of the training corpus
/// - `exclusions`: words that must never be generated
/// - `output`: generated words, in generation order
/// - `model`: transitions learned from `training`
/// - `generator`: the random stream, shared by every generated word
///
/// Independent contexts never share state, so several streams can run side
/// by side.
#[derive(Debug, Clone)]
pub struct GenerationContext {
	config: GenerationConfig,
	training: Dictionary,
	exclusions: Dictionary,
	output: Dictionary,
	model: BigramModel,
	generator: WordGenerator,
}

impl Default for GenerationContext {
	fn default() -> Self {
		Self::new(GenerationConfig::default())
	}
}

impl GenerationContext {
	/// Creates an empty context whose generator starts at `config.seed`.
	pub fn new(config: GenerationConfig) -> Self {
		Self {
			generator: WordGenerator::new(config.seed),
			config,
			training: Dictionary::new(),
			exclusions: Dictionary::new(),
			output: Dictionary::new(),
			model: BigramModel::new(),
		}
	}

	/// Active configuration.
	pub fn config(&self) -> &GenerationConfig {
		&self.config
	}

	/// Training corpus dictionary.
	pub fn training(&self) -> &Dictionary {
		&self.training
	}

	/// Exclusion dictionary.
	pub fn exclusions(&self) -> &Dictionary {
		&self.exclusions
	}

	/// Generated words.
	pub fn output(&self) -> &Dictionary {
		&self.output
	}

	/// Learned transitions.
	pub fn model(&self) -> &BigramModel {
		&self.model
	}

	/// Random stream and candidate walker.
	pub fn generator(&self) -> &WordGenerator {
		&self.generator
	}

	/// Learns one training word.
	///
	/// Words shorter than `min_source_len` are ignored. A word already in the
	/// training dictionary is not folded into the model again, so repeats in
	/// the corpus do not bias the transitions.
	///
	/// Returns true if the word was new.
	pub fn learn_word(&mut self, word: &str) -> Result<bool> {
		if word.len() < self.config.min_source_len {
			return Ok(false);
		}
		match self.training.insert(word)? {
			Insertion::Existing(_) => {
				debug!("Word {word} is duplicated in the training corpus");
				Ok(false)
			}
			Insertion::Added(_) => {
				self.model.add_word(word)?;
				Ok(true)
			}
		}
	}

	/// Adds one word to the exclusion dictionary, subject to `min_source_len`.
	///
	/// Returns true if the word was new.
	pub fn exclude_word(&mut self, word: &str) -> Result<bool> {
		if word.len() < self.config.min_source_len {
			return Ok(false);
		}
		Ok(self.exclusions.insert(word)?.is_new())
	}

	/// Tokenizes `reader` and learns every word.
	pub fn train_from_reader<R: Read>(&mut self, reader: R) -> Result<LoadReport> {
		let min_source_len = self.config.min_source_len;
		Self::load(Tokenizer::new(reader), None, min_source_len, |word| self.learn_word(word))
	}

	/// Tokenizes the file at `path` and learns every word.
	///
	/// # Errors
	/// - `FileOpen` if the file cannot be opened; nothing is learned
	/// - `Io` on a read failure; words read so far stay learned
	/// - `OutOfMemory` if a structure cannot grow
	pub fn train_from_path<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadReport> {
		let path = path.as_ref();
		let tokens = open_source(path)?;
		let min_source_len = self.config.min_source_len;
		let report = Self::load(tokens, Some(path), min_source_len, |word| self.learn_word(word))?;
		info!(
			"Trained on {}: {} tokens, {} new words, {} transition states",
			path.display(),
			report.tokens,
			report.added,
			self.model.len()
		);
		Ok(report)
	}

	/// Tokenizes `reader` into the exclusion dictionary.
	pub fn exclude_from_reader<R: Read>(&mut self, reader: R) -> Result<LoadReport> {
		let min_source_len = self.config.min_source_len;
		Self::load(Tokenizer::new(reader), None, min_source_len, |word| self.exclude_word(word))
	}

	/// Tokenizes the file at `path` into the exclusion dictionary.
	///
	/// Errors as for [`GenerationContext::train_from_path`].
	pub fn exclude_from_path<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadReport> {
		let path = path.as_ref();
		let tokens = open_source(path)?;
		let min_source_len = self.config.min_source_len;
		let report = Self::load(tokens, Some(path), min_source_len, |word| self.exclude_word(word))?;
		info!("Excluded {} new words from {}", report.added, path.display());
		Ok(report)
	}

	/// Drives a tokenizer through `accept`, skipping words the pool refuses.
	fn load<R, F>(tokens: Tokenizer<R>, path: Option<&Path>, min_source_len: usize, mut accept: F) -> Result<LoadReport>
	where
		R: Read,
		F: FnMut(&str) -> Result<bool>,
	{
		let mut report = LoadReport::default();
		for token in tokens {
			let word = token.map_err(|err| GibberError::io(err, path.map(Path::to_path_buf)))?;
			report.tokens += 1;
			if word.len() < min_source_len {
				report.too_short += 1;
				continue;
			}
			match accept(&word) {
				Ok(true) => report.added += 1,
				Ok(false) => report.duplicates += 1,
				Err(err @ (GibberError::WordTooLong { .. } | GibberError::InvalidWord)) => {
					warn!("Skipping word: {err}");
					report.skipped += 1;
				}
				Err(err) => return Err(err),
			}
		}
		Ok(report)
	}

	/// Generates until the output holds `config.target_count` words.
	pub fn generate(&mut self) -> Result<GenerationReport> {
		self.generate_to(self.config.target_count)
	}

	/// Generates until the output holds `target` words.
	///
	/// Words from earlier calls count toward `target`, and the random stream
	/// continues where it stopped.
	///
	/// # Errors
	/// See [`WordGenerator::fill`].
	pub fn generate_to(&mut self, target: usize) -> Result<GenerationReport> {
		let filters = Filters { training: &self.training, exclusions: &self.exclusions };
		let report = self.generator.fill(&self.model, filters, &mut self.output, &self.config, target)?;
		info!(
			"Generated {} words from {} candidates ({} empty, {} wrong length, {} known, {} duplicates)",
			report.added, report.candidates, report.empty, report.wrong_length, report.known, report.duplicates
		);
		Ok(report)
	}

	/// Encodes the training dictionary, exclusion dictionary and model.
	pub fn to_snapshot_bytes(&self) -> Result<Vec<u8>> {
		let snapshot = SnapshotRef {
			version: SNAPSHOT_VERSION,
			training: &self.training,
			exclusions: &self.exclusions,
			model: &self.model,
		};
		Ok(postcard::to_stdvec(&snapshot)?)
	}

	/// Replaces the training dictionary, exclusion dictionary and model with
	/// a decoded snapshot. The output and random stream are kept.
	///
	/// # Errors
	/// Returns `Serialization` for malformed, corrupt or foreign data; the
	/// context is unchanged in that case.
	pub fn restore_snapshot_bytes(&mut self, bytes: &[u8]) -> Result<()> {
		let snapshot: Snapshot = postcard::from_bytes(bytes)?;
		if snapshot.version != SNAPSHOT_VERSION {
			return Err(GibberError::Serialization(format!(
				"unsupported snapshot version {}",
				snapshot.version
			)));
		}
		snapshot.training.check_integrity()?;
		snapshot.exclusions.check_integrity()?;
		snapshot.model.check_integrity()?;

		self.training = snapshot.training;
		self.exclusions = snapshot.exclusions;
		self.model = snapshot.model;
		Ok(())
	}

	/// Writes a snapshot to `path`.
	pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let path = path.as_ref();
		let bytes = self.to_snapshot_bytes()?;
		std::fs::write(path, bytes).map_err(|err| GibberError::file_open(err, path))?;
		info!("Saved snapshot of {} training words to {}", self.training.len(), path.display());
		Ok(())
	}

	/// Restores a snapshot from `path`.
	pub fn load_snapshot<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
		let path = path.as_ref();
		let bytes = std::fs::read(path).map_err(|err| GibberError::file_open(err, path))?;
		self.restore_snapshot_bytes(&bytes)?;
		info!("Restored snapshot of {} training words from {}", self.training.len(), path.display());
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;
	use crate::model::state::Window;

	const CORPUS: &str = "Le petit prince demanda au renard comment apprivoiser une rose. \
		Le renard expliqua patiemment que les rites sont importants, que la patience \
		est necessaire, et que chaque rencontre demande beaucoup de temps. Les etoiles \
		brillent, les volcans fument, et le marchand vend des pilules perfectionnees \
		pour apaiser la soif. Le geographe ignore les fleurs ephemeres.";

	fn trained(config: GenerationConfig) -> GenerationContext {
		let mut ctx = GenerationContext::new(config);
		ctx.train_from_reader(CORPUS.as_bytes()).unwrap();
		ctx
	}

	fn small_config() -> GenerationConfig {
		GenerationConfig::builder()
			.min_source_len(3)
			.min_len(4)
			.max_len(9)
			.target_count(40)
			.max_attempts(100_000)
			.build()
			.unwrap()
	}

	#[test]
	fn training_dictionary_deduplicates_words() {
		let config = GenerationConfig::builder().min_source_len(3).build().unwrap();
		let mut ctx = GenerationContext::new(config);
		let report = ctx.train_from_reader(&b"cat dog dog bird"[..]).unwrap();

		assert_eq!(ctx.training().iter().collect::<Vec<_>>(), ["cat", "dog", "bird"]);
		assert_eq!(report, LoadReport { tokens: 4, added: 3, duplicates: 1, too_short: 0, skipped: 0 });
	}

	#[test]
	fn duplicate_words_do_not_bias_the_model() {
		let config = GenerationConfig::builder().min_source_len(3).build().unwrap();
		let mut ctx = GenerationContext::new(config);
		ctx.train_from_reader(&b"cat dog dog bird"[..]).unwrap();

		let start = ctx.model().state(Window::START).unwrap();
		assert_eq!(start.followers(), b"cdb");
		assert_eq!(ctx.model().transitions(), 4 + 4 + 5);
	}

	#[test]
	fn short_words_are_ignored_everywhere() {
		let mut ctx = GenerationContext::default();
		let report = ctx.train_from_reader(&b"tiny"[..]).unwrap();
		assert_eq!(report.too_short, 1);
		assert!(ctx.training().is_empty());
		assert!(ctx.model().is_empty());

		ctx.exclude_from_reader(&b"four fives"[..]).unwrap();
		assert_eq!(ctx.exclusions().iter().collect::<Vec<_>>(), ["fives"]);
	}

	#[test]
	fn over_long_tokens_are_skipped_not_fatal() {
		let config = GenerationConfig::builder().min_source_len(1).build().unwrap();
		let mut ctx = GenerationContext::new(config);
		let input = format!("before {} after", "z".repeat(2000));
		let report = ctx.train_from_reader(input.as_bytes()).unwrap();
		assert_eq!(report.skipped, 1);
		assert_eq!(ctx.training().iter().collect::<Vec<_>>(), ["before", "after"]);
	}

	#[test]
	fn generated_words_obey_bounds_and_exclusions() {
		let mut ctx = trained(small_config());
		ctx.exclude_from_reader(&b"renard prince patience"[..]).unwrap();
		let report = ctx.generate().unwrap();

		assert_eq!(report.added, 40);
		assert_eq!(ctx.output().len(), 40);
		for word in ctx.output().iter() {
			assert!((4..=9).contains(&word.len()), "{word}");
			assert!(ctx.training().contains(word).is_none(), "{word}");
			assert!(ctx.exclusions().contains(word).is_none(), "{word}");
		}
		let unique: HashSet<&str> = ctx.output().iter().collect();
		assert_eq!(unique.len(), 40);
	}

	#[test]
	fn independent_contexts_produce_identical_output() {
		let mut first = trained(small_config());
		let mut second = trained(small_config());
		first.generate().unwrap();
		second.generate().unwrap();
		assert!(first.output().iter().eq(second.output().iter()));
		assert_eq!(first.generator(), second.generator());
	}

	#[test]
	fn generation_resumes_toward_a_larger_target() {
		let mut ctx = trained(small_config());
		ctx.generate_to(10).unwrap();
		let first: Vec<String> = ctx.output().iter().map(str::to_owned).collect();
		ctx.generate_to(25).unwrap();

		assert_eq!(ctx.output().len(), 25);
		assert!(ctx.output().iter().take(10).eq(first.iter().map(String::as_str)));

		let mut straight = trained(small_config());
		straight.generate_to(25).unwrap();
		assert!(straight.output().iter().eq(ctx.output().iter()));
	}

	#[test]
	fn too_short_corpus_reports_degenerate_generation() {
		let mut ctx = GenerationContext::default();
		ctx.train_from_reader(&b"hi"[..]).unwrap();
		let err = ctx.generate().expect_err("model is empty");
		assert!(matches!(err, GibberError::DegenerateGeneration { produced: 0, .. }));
		assert!(ctx.output().is_empty());
	}

	#[test]
	fn inverted_bounds_report_degenerate_generation() {
		let config = GenerationConfig::builder().min_len(20).max_len(3).build().unwrap();
		let mut ctx = trained(config);
		assert!(matches!(ctx.generate(), Err(GibberError::DegenerateGeneration { .. })));
	}

	#[test]
	fn snapshot_round_trip_preserves_generation() {
		let mut source = trained(small_config());
		source.exclude_from_reader(&b"volcans etoiles"[..]).unwrap();
		let bytes = source.to_snapshot_bytes().unwrap();

		let mut restored = GenerationContext::new(small_config());
		restored.restore_snapshot_bytes(&bytes).unwrap();
		assert_eq!(restored.training(), source.training());
		assert_eq!(restored.exclusions(), source.exclusions());
		assert_eq!(restored.model(), source.model());

		source.generate().unwrap();
		restored.generate().unwrap();
		assert!(source.output().iter().eq(restored.output().iter()));
	}

	#[test]
	fn garbage_snapshot_leaves_context_untouched() {
		let mut ctx = trained(small_config());
		let before = ctx.training().len();
		let err = ctx.restore_snapshot_bytes(b"\x07not a snapshot").unwrap_err();
		assert!(matches!(err, GibberError::Serialization(_)));
		assert_eq!(ctx.training().len(), before);
	}

	#[test]
	fn snapshot_files_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("model.bin");
		let ctx = trained(small_config());
		ctx.save_snapshot(&path).unwrap();

		let mut restored = GenerationContext::new(small_config());
		restored.load_snapshot(&path).unwrap();
		assert_eq!(restored.training(), ctx.training());

		let err = restored.load_snapshot(dir.path().join("absent.bin")).unwrap_err();
		assert!(matches!(err, GibberError::FileOpen { .. }));
	}

	#[test]
	fn missing_training_file_is_file_open_error() {
		let mut ctx = GenerationContext::default();
		let err = ctx.train_from_path("/no/such/corpus.txt").unwrap_err();
		assert!(matches!(err, GibberError::FileOpen { .. }));
		assert!(ctx.training().is_empty());
	}
}
