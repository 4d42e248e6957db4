use std::fmt;
use std::panic;
use std::thread;

use thiserror::Error;

use crate::model::chain::{Order, State, Token, TransitionTable};
use crate::model::random::RandomSource;
use crate::model::seed::SeedSpec;

/// Why a generation could not start.
///
/// These are returned as values; the message is meant to be shown as is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
	#[error("Cannot generate text from an empty Markov chain.")]
	EmptyChain,
	#[error("Seed text needs to be at least {order} words long for this order Markov chain.")]
	InsufficientSeedLength { order: Order },
	#[error("Invalid seed format.")]
	InvalidSeedFormat,
	#[error("Length must be >= 1, got {0}.")]
	InvalidLength(usize),
}

/// Why the sampling loop ended. Neither case is an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
	/// The output reached the requested length (or the seed already did).
	LengthReached,
	/// The chain reached a state with no recorded transitions.
	UnmodeledState(State),
}

/// A generated token sequence and the reason generation stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generation {
	pub tokens: Vec<Token>,
	pub stop: StopReason,
}

impl Generation {
	/// The tokens joined with single spaces.
	pub fn text(&self) -> String {
		self.tokens.join(" ")
	}

	/// `true` if the chain ran out of model before reaching the requested length.
	pub fn stopped_early(&self) -> bool {
		matches!(self.stop, StopReason::UnmodeledState(_))
	}
}

impl fmt::Display for Generation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.text())
	}
}

/// Generation settings.
///
/// `length` counts every output token, seed included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateParams {
	pub length: usize,
	pub seed: SeedSpec,
}

impl GenerateParams {
	/// Output length used when none is configured.
	pub const DEFAULT_LENGTH: usize = 500;

	pub fn new(length: usize, seed: SeedSpec) -> Self {
		Self { length, seed }
	}
}

impl Default for GenerateParams {
	fn default() -> Self {
		Self { length: Self::DEFAULT_LENGTH, seed: SeedSpec::Absent }
	}
}

/// Walks a transition table to produce text.
///
/// The generator only reads the table. Its order is the table's order, so a
/// table can never be walked with a window of the wrong width.
#[derive(Clone, Copy, Debug)]
pub struct Generator<'a> {
	table: &'a TransitionTable,
}

impl<'a> Generator<'a> {
	pub fn new(table: &'a TransitionTable) -> Self {
		Self { table }
	}

	/// Generates one sequence.
	///
	/// The seed is resolved first and supplies the first `k` tokens. The loop
	/// then runs at most `length - k` steps; each step looks up the last `k`
	/// tokens, picks one of the recorded followers uniformly and appends it.
	/// Reaching a state with no followers ends the run early with
	/// `StopReason::UnmodeledState`. If `length <= k` the output is exactly
	/// the seed and nothing is sampled.
	///
	/// # Errors
	/// - `InvalidLength` if `length == 0`
	/// - any seed resolution error (see [`SeedSpec::resolve`])
	pub fn generate<R>(&self, params: &GenerateParams, rng: &mut R) -> Result<Generation, GenerationError>
	where
		R: RandomSource + ?Sized,
	{
		if params.length == 0 {
			return Err(GenerationError::InvalidLength(params.length));
		}

		let k = self.table.order().get();
		let start = params.seed.resolve(self.table, rng)?;
		log::trace!("generating {} tokens from '{}'", params.length, start);

		let mut output = start.into_tokens();
		let mut stop = StopReason::LengthReached;

		for _ in 0..params.length.saturating_sub(k) {
			let current = &output[output.len() - k..];
			match self.table.transitions(current) {
				Some(next) if !next.is_empty() => {
					let token = next[rng.pick(next.len())].clone();
					output.push(token);
				}
				_ => {
					stop = StopReason::UnmodeledState(State::from(current));
					break;
				}
			}
		}

		if let StopReason::UnmodeledState(state) = &stop {
			log::debug!("stopped after {} tokens, no transition from '{}'", output.len(), state);
		}

		Ok(Generation { tokens: output, stop })
	}

	/// Generates `count` independent sequences in parallel.
	///
	/// Each worker thread reads the shared table and draws from its own
	/// thread-local generator. Results keep the worker order.
	pub fn generate_many(&self, params: &GenerateParams, count: usize) -> Vec<Result<Generation, GenerationError>> {
		thread::scope(|scope| {
			let handles: Vec<_> = (0..count)
				.map(|_| scope.spawn(|| self.generate(params, &mut rand::rng())))
				.collect();

			handles
				.into_iter()
				.map(|handle| handle.join().unwrap_or_else(|cause| panic::resume_unwind(cause)))
				.collect()
		})
	}
}

/// Generates one sequence from `table`; see [`Generator::generate`].
pub fn generate<R>(
	table: &TransitionTable,
	length: usize,
	seed: SeedSpec,
	rng: &mut R,
) -> Result<Generation, GenerationError>
where
	R: RandomSource + ?Sized,
{
	Generator::new(table).generate(&GenerateParams::new(length, seed), rng)
}
