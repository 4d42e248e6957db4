//! Top-level module for the Markov chain.
//!
//! - Fixed-order transition table and its builder (`TransitionTable`)
//! - Seed strategies (`SeedSpec`)
//! - Injectable randomness (`RandomSource`)
//! - The sampling loop (`Generator`)

/// Token, state and transition table types.
///
/// `TransitionTable::build` turns a token sequence into the chain.
pub mod chain;

/// Generation of token sequences from a table.
///
/// Exposes the generator, its parameters, stop reasons and errors.
pub mod generator;

/// Uniform choice abstraction used by seeding and sampling.
pub mod random;

/// Starting-state strategies and their resolution.
pub mod seed;

pub use chain::{ChainError, Order, State, TableStats, Token, TransitionTable};
pub use generator::{GenerateParams, Generation, GenerationError, Generator, StopReason, generate};
pub use random::{RandomSource, ScriptedSource};
pub use seed::SeedSpec;
