use crate::model::chain::{State, Token, TransitionTable};
use crate::model::generator::GenerationError;
use crate::model::random::RandomSource;
use crate::text::tokenize;

/// How the initial state of a generation is chosen.
///
/// # Variants
/// - `Absent`: pick a state uniformly at random from the table.
/// - `Text(String)`: normalize the text like the corpus and use its last `k` tokens.
/// - `Tokens(Vec<Token>)`: use exactly these `k` tokens.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SeedSpec {
	#[default]
	Absent,
	Text(String),
	Tokens(Vec<Token>),
}

impl SeedSpec {
	/// Parses the seed syntax accepted by the drivers.
	///
	/// - `""` or `"none"` → `Absent`
	/// - `"text:<raw text>"` → `Text`
	/// - `"tokens:<a>,<b>,..."` → `Tokens` (items are trimmed, not normalized)
	///
	/// # Errors
	/// Returns `InvalidSeedFormat` for anything else.
	pub fn parse(input: &str) -> Result<Self, GenerationError> {
		let trimmed = input.trim();
		if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
			return Ok(Self::Absent);
		}
		if let Some(raw) = strip_prefix_ignore_case(trimmed, "text:") {
			return Ok(Self::Text(raw.to_owned()));
		}
		if let Some(list) = strip_prefix_ignore_case(trimmed, "tokens:") {
			return Ok(Self::Tokens(list.split(',').map(|t| t.trim().to_owned()).collect()));
		}
		Err(GenerationError::InvalidSeedFormat)
	}

	/// Resolves the seed into the state generation starts from.
	///
	/// # Errors
	/// - `EmptyChain` if the table has no states (checked first, for every seed kind)
	/// - `InsufficientSeedLength` if a text seed normalizes to fewer than `k` tokens
	/// - `InvalidSeedFormat` if a token seed is not exactly `k` valid tokens
	pub fn resolve<R>(&self, table: &TransitionTable, rng: &mut R) -> Result<State, GenerationError>
	where
		R: RandomSource + ?Sized,
	{
		if table.is_empty() {
			return Err(GenerationError::EmptyChain);
		}

		let k = table.order().get();
		match self {
			SeedSpec::Absent => {
				let index = rng.pick(table.len());
				// Index is below len, cannot miss
				table.state_at(index).cloned().ok_or(GenerationError::EmptyChain)
			}
			SeedSpec::Text(raw) => {
				let words = tokenize(raw);
				if words.len() < k {
					return Err(GenerationError::InsufficientSeedLength { order: table.order() });
				}
				Ok(State::from(&words[words.len() - k..]))
			}
			SeedSpec::Tokens(tokens) if tokens.len() == k && tokens.iter().all(|t| is_token(t)) => {
				Ok(State::new(tokens.clone()))
			}
			SeedSpec::Tokens(_) => Err(GenerationError::InvalidSeedFormat),
		}
	}
}

impl From<&str> for SeedSpec {
	fn from(raw: &str) -> Self {
		SeedSpec::Text(raw.to_owned())
	}
}

impl From<Vec<Token>> for SeedSpec {
	fn from(tokens: Vec<Token>) -> Self {
		SeedSpec::Tokens(tokens)
	}
}

/// A token is a single non-empty word.
fn is_token(candidate: &str) -> bool {
	!candidate.is_empty() && !candidate.chars().any(char::is_whitespace)
}

fn strip_prefix_ignore_case<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
	let head = input.get(..prefix.len())?;
	if head.eq_ignore_ascii_case(prefix) {
		Some(&input[prefix.len()..])
	} else {
		None
	}
}
