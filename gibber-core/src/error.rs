//! Error type shared by every stage of the generator.

use std::path::PathBuf;

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T, E = GibberError> = std::result::Result<T, E>;

/// Failures raised while loading sources, growing storage or generating words.
///
/// Stage-local variants (`FileOpen`, `MissingArgument`, `WordTooLong`) are
/// meant to be logged and skipped by the caller. `OutOfMemory` is fatal.
#[derive(Debug, Error)]
pub enum GibberError {
	/// A source or destination file could not be opened.
	#[error("cannot open file {path:?}: {source}")]
	FileOpen {
		/// Path that failed to open.
		path: PathBuf,
		/// Underlying IO error.
		source: std::io::Error,
	},

	/// Read or write failure on an already opened stream.
	#[error("io error while processing {path:?}: {source}")]
	Io {
		/// Path associated with the stream, if any.
		path: Option<PathBuf>,
		/// Underlying IO error.
		source: std::io::Error,
	},

	/// A flag that expects a value was given without one.
	#[error("argument missing for -{flag} flag")]
	MissingArgument {
		/// Flag letter as typed on the command line.
		flag: char,
	},

	/// A growable buffer could not reserve more space.
	#[error("out of memory while growing {what}")]
	OutOfMemory {
		/// Name of the structure that failed to grow.
		what: &'static str,
	},

	/// Word exceeds the storable length.
	#[error("word of {len} bytes exceeds the {max} byte limit")]
	WordTooLong {
		/// Length of the rejected word.
		len: usize,
		/// Maximum accepted length.
		max: usize,
	},

	/// Word contains the pool terminator and cannot be stored.
	#[error("word contains a NUL byte")]
	InvalidWord,

	/// The generation target can never be reached with this model and configuration.
	#[error("generation stopped at {produced} of {target} words: {reason}")]
	DegenerateGeneration {
		/// Words present in the output dictionary when generation gave up.
		produced: usize,
		/// Requested output dictionary size.
		target: usize,
		/// Human readable cause.
		reason: String,
	},

	/// Configuration failed validation.
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	/// Snapshot encoding or decoding failure.
	#[error("serialization error: {0}")]
	Serialization(String),
}

impl GibberError {
	/// Wraps an IO error, attaching the path when known.
	pub fn io(source: std::io::Error, path: Option<PathBuf>) -> Self {
		Self::Io { path, source }
	}

	/// Wraps a failed `File::open`/`File::create`.
	pub fn file_open(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
		Self::FileOpen { path: path.into(), source }
	}

	/// Growth failure for the named structure.
	pub fn out_of_memory(what: &'static str) -> Self {
		Self::OutOfMemory { what }
	}

	/// True for errors after which the run cannot safely continue.
	pub fn is_fatal(&self) -> bool {
		matches!(self, Self::OutOfMemory { .. })
	}
}

impl From<postcard::Error> for GibberError {
	fn from(err: postcard::Error) -> Self {
		Self::Serialization(err.to_string())
	}
}
