//! Top-level module for the word generation system.
//!
//! This module provides:
//! - The character transition model (`BigramModel`)
//! - Its per-window transition lists (`State`, `Window`)
//! - The deterministic random stream (`Lcg`)
//! - Candidate synthesis and filtering (`WordGenerator`)
//! - The owning generation context (`GenerationContext`)

/// Byte marking the start and end of a word inside the model.
pub const BOUNDARY: u8 = b' ';

/// Byte drawn when a window has no recorded followers.
///
/// Not a letter, so drawing it always ends the current word.
pub const SENTINEL: u8 = b'*';

/// Second-order transition table built from training words.
pub mod bigram_model;

/// Owns the dictionaries, model and random stream of one generation run.
///
/// Supports training from readers or files, exclusion loading,
/// generation to a target size and postcard snapshots.
pub mod context;

/// Candidate word synthesis and acceptance filtering.
pub mod generator;

/// Linear-congruential generator with range scaling.
pub mod lcg;

/// Transition list for one two-byte window.
pub mod state;
