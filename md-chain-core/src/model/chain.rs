use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A single normalized word. Equality is exact string equality.
pub type Token = String;

/// Errors raised while configuring a chain.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
	#[error("order must be >= 1, got {0}")]
	InvalidOrder(usize),
}

/// Number of consecutive tokens forming one state (`k`).
///
/// # Invariants
/// - Always >= 1
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Order(usize);

impl Order {
	/// Order used when none is configured.
	pub const DEFAULT: Order = Order(2);

	/// Creates a new order.
	///
	/// # Errors
	/// Returns an error if `k == 0`.
	pub fn new(k: usize) -> Result<Self, ChainError> {
		if k == 0 {
			return Err(ChainError::InvalidOrder(k));
		}
		Ok(Self(k))
	}

	pub fn get(self) -> usize {
		self.0
	}
}

impl Default for Order {
	fn default() -> Self {
		Self::DEFAULT
	}
}

impl TryFrom<usize> for Order {
	type Error = ChainError;

	fn try_from(k: usize) -> Result<Self, Self::Error> {
		Self::new(k)
	}
}

impl fmt::Display for Order {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// An ordered window of `k` consecutive tokens, used as a lookup key.
///
/// Equality, ordering and hashing cover the whole token tuple, so two states
/// whose space-joined forms happen to collide are still distinct. The joined
/// form is only used for display.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct State(Vec<Token>);

impl State {
	pub fn new(tokens: Vec<Token>) -> Self {
		Self(tokens)
	}

	pub fn tokens(&self) -> &[Token] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn into_tokens(self) -> Vec<Token> {
		self.0
	}
}

impl From<&[Token]> for State {
	fn from(tokens: &[Token]) -> Self {
		Self(tokens.to_vec())
	}
}

impl<const N: usize> From<[&str; N]> for State {
	fn from(tokens: [&str; N]) -> Self {
		Self(tokens.iter().map(|t| (*t).to_owned()).collect())
	}
}

// Lets the table be queried with a borrowed window of the output.
impl Borrow<[Token]> for State {
	fn borrow(&self) -> &[Token] {
		&self.0
	}
}

impl fmt::Display for State {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0.join(" "))
	}
}

/// Summary of a table, as reported to drivers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TableStats {
	pub order: Order,
	pub states: usize,
	pub transitions: usize,
}

/// Fixed-order word transition table (the Markov chain).
///
/// Maps every observed `k`-token state to the tokens that followed it in the
/// corpus, in corpus order and **with duplicates**. Sampling uniformly from a
/// list therefore samples proportionally to observed frequency.
///
/// # Invariants
/// - Every state has exactly `order` tokens
/// - Every list holds at least one token
/// - Nothing mutates the table once `build` returns
///
/// Entries are sorted by state once built, so a state can be found by binary
/// search or picked by index, and a seeded random source picks the same
/// random state on every run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionTable {
	order: Order,
	entries: Vec<(State, Vec<Token>)>,
}

impl TransitionTable {
	/// Builds the table from a token sequence.
	///
	/// For every window `tokens[i..i + k]` followed by `tokens[i + k]`, the
	/// following token is appended to the window's list.
	///
	/// A sequence of `k` tokens or fewer yields an empty table. This is not an
	/// error; generating from it reports an empty chain.
	pub fn build(tokens: &[Token], order: Order) -> Self {
		let k = order.get();
		let mut states: BTreeMap<State, Vec<Token>> = BTreeMap::new();

		// Each window is a state plus its following token
		for window in tokens.windows(k + 1) {
			let (state, next) = window.split_at(k);
			states.entry(State::from(state)).or_default().push(next[0].clone());
		}

		// BTreeMap iteration is sorted by state
		let table = Self { order, entries: states.into_iter().collect() };
		log::debug!(
			"built order-{} table: {} states, {} transitions from {} tokens",
			order,
			table.len(),
			table.transition_count(),
			tokens.len()
		);
		table
	}

	pub fn order(&self) -> Order {
		self.order
	}

	/// Number of distinct states.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Total number of recorded transitions, duplicates included.
	pub fn transition_count(&self) -> usize {
		self.entries.iter().map(|(_, next)| next.len()).sum()
	}

	fn find(&self, state: &[Token]) -> Option<usize> {
		self.entries
			.binary_search_by(|(key, _)| key.tokens().cmp(state))
			.ok()
	}

	/// Returns the tokens observed after `state`, or `None` for an unmodeled state.
	pub fn transitions<S>(&self, state: &S) -> Option<&[Token]>
	where
		S: Borrow<[Token]> + ?Sized,
	{
		self.find(state.borrow()).map(|i| self.entries[i].1.as_slice())
	}

	pub fn contains<S>(&self, state: &S) -> bool
	where
		S: Borrow<[Token]> + ?Sized,
	{
		self.find(state.borrow()).is_some()
	}

	/// Returns the `index`-th state in key order, in constant time.
	pub fn state_at(&self, index: usize) -> Option<&State> {
		self.entries.get(index).map(|(state, _)| state)
	}

	/// Iterates over the states in key order.
	pub fn states(&self) -> impl ExactSizeIterator<Item = &State> {
		self.entries.iter().map(|(state, _)| state)
	}

	pub fn stats(&self) -> TableStats {
		TableStats {
			order: self.order,
			states: self.len(),
			transitions: self.transition_count(),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;

	fn tokens(words: &str) -> Vec<Token> {
		words.split_whitespace().map(str::to_owned).collect()
	}

	fn worked_example() -> TransitionTable {
		TransitionTable::build(&tokens("the quick brown fox the quick red fox"), Order::DEFAULT)
	}

	#[test]
	fn order_must_be_positive() {
		assert_eq!(Order::new(0), Err(ChainError::InvalidOrder(0)));
		assert_eq!(Order::new(3).map(Order::get), Ok(3));
		assert_eq!(Order::default().get(), 2);
	}

	#[test]
	fn builds_worked_example() {
		let table = worked_example();

		assert_eq!(table.len(), 5);
		assert_eq!(table.transitions(&State::from(["the", "quick"])), Some(&tokens("brown red")[..]));
		assert_eq!(table.transitions(&State::from(["quick", "brown"])), Some(&tokens("fox")[..]));
		assert_eq!(table.transitions(&State::from(["brown", "fox"])), Some(&tokens("the")[..]));
		assert_eq!(table.transitions(&State::from(["fox", "the"])), Some(&tokens("quick")[..]));
		assert_eq!(table.transitions(&State::from(["quick", "red"])), Some(&tokens("fox")[..]));
		assert_eq!(table.transitions(&State::from(["red", "fox"])), None);
	}

	#[test]
	fn short_corpus_gives_empty_table() {
		for words in ["", "one", "one two"] {
			let table = TransitionTable::build(&tokens(words), Order::DEFAULT);
			assert!(table.is_empty());
			assert_eq!(table.transition_count(), 0);
		}
		assert!(!TransitionTable::build(&tokens("one two three"), Order::DEFAULT).is_empty());
	}

	#[test]
	fn keeps_duplicate_transitions() {
		let table = TransitionTable::build(&tokens("a b x a b x a b y"), Order::DEFAULT);
		assert_eq!(table.transitions(&State::from(["a", "b"])), Some(&tokens("x x y")[..]));
	}

	#[test]
	fn table_matches_window_counts() {
		let corpus = tokens("a b a b b a c a b a b c c a b");
		for k in 1..=4 {
			let table = TransitionTable::build(&corpus, Order::new(k).unwrap());

			let mut expected: HashMap<&[Token], usize> = HashMap::new();
			for window in corpus.windows(k + 1) {
				*expected.entry(&window[..k]).or_insert(0) += 1;
			}

			assert_eq!(table.len(), expected.len(), "order {k}");
			assert_eq!(table.transition_count(), corpus.len() - k);
			for (state, count) in expected {
				assert_eq!(table.transitions(state).map(<[Token]>::len), Some(count));
			}
			assert!(table.states().all(|s| s.len() == k));
		}
	}

	#[test]
	fn build_is_deterministic() {
		let corpus = tokens("to be or not to be that is the question to be");
		let order = Order::new(1).unwrap();
		assert_eq!(TransitionTable::build(&corpus, order), TransitionTable::build(&corpus, order));
	}

	#[test]
	fn states_do_not_collide_on_join() {
		// "a b" + "c" and "a" + "b c" join to the same string
		let corpus = vec!["a b".to_owned(), "c".to_owned(), "x".to_owned(), "a".to_owned(), "b c".to_owned(), "y".to_owned()];
		let table = TransitionTable::build(&corpus, Order::DEFAULT);

		let first = State::new(vec!["a b".to_owned(), "c".to_owned()]);
		let second = State::new(vec!["a".to_owned(), "b c".to_owned()]);
		assert_eq!(first.to_string(), second.to_string());
		assert_eq!(table.transitions(&first), Some(&tokens("x")[..]));
		assert_eq!(table.transitions(&second), Some(&tokens("y")[..]));
	}

	#[test]
	fn indexed_states_follow_key_order() {
		let table = worked_example();
		let ordered: Vec<&State> = table.states().collect();
		for (index, state) in ordered.iter().enumerate() {
			assert_eq!(table.state_at(index), Some(*state));
		}
		assert_eq!(table.state_at(0), Some(&State::from(["brown", "fox"])));
		assert_eq!(table.state_at(table.len()), None);
		assert!(ordered.windows(2).all(|pair| pair[0] < pair[1]));
	}

	#[test]
	fn reports_stats() {
		let stats = worked_example().stats();
		assert_eq!(stats, TableStats { order: Order::DEFAULT, states: 5, transitions: 6 });
	}
}
