//! Pronounceable pseudo-word generation library.
//!
//! This crate learns second-order character transitions from a training
//! corpus and walks them to produce new words that sound like the corpus but
//! never appear in it or in a user supplied exclusion list:
//! - Latin-1 aware tokenizing of raw text
//! - Deduplicating, insertion-ordered dictionaries over a string pool
//! - A bigram transition model and a deterministic random stream
//! - Length and dictionary filtering of generated candidates
//!
//! ```no_run
//! use gibber_core::{GenerationConfig, GenerationContext};
//!
//! # fn main() -> gibber_core::Result<()> {
//! let config = GenerationConfig::builder().min_len(5).max_len(9).target_count(100).build()?;
//! let mut ctx = GenerationContext::new(config);
//! ctx.train_from_path("corpus.txt")?;
//! ctx.exclude_from_path("dictionary.txt")?;
//! ctx.generate()?;
//! for word in ctx.output().iter() {
//!     println!("{word}");
//! }
//! # Ok(())
//! # }
//! ```

/// Generation parameters and command-line fallbacks.
pub mod config;

/// Word sets backed by a string pool and a fixed hash index.
pub mod dictionary;

/// Error type and result alias.
pub mod error;

/// File helpers (source opening, word list dumps).
pub mod io;

/// Transition model, random stream, generator and generation context.
pub mod model;

/// Byte stream to word splitting with accent folding.
pub mod tokenizer;

pub use config::GenerationConfig;
pub use dictionary::{Dictionary, EntryId, Insertion};
pub use error::{GibberError, Result};
pub use model::bigram_model::BigramModel;
pub use model::context::{GenerationContext, LoadReport};
pub use model::generator::{GenerationReport, WordGenerator};
pub use model::lcg::Lcg;
pub use tokenizer::Tokenizer;
