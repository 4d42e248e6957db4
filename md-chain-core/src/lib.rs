//! Word-level n-gram Markov text generation.
//!
//! This crate provides:
//! - Markdown cleaning and tokenization of source text (`text`)
//! - Fixed-order transition tables built from a token sequence
//! - Seed resolution and a sampling loop walking the table
//! - Text retrieval from files or URLs for drivers (`io`)
//!
//! The `model` modules never perform I/O; a built table is read-only and can
//! be shared between threads.

/// Transition tables, seeds and generation.
pub mod model;

/// Markdown stripping and tokenization.
///
/// The same rules apply to the corpus and to text seeds.
pub mod text;

/// Retrieval of source text (file or HTTP) and corpus directory helpers.
pub mod io;
