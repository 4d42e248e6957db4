use rand::Rng;

/// Source of the uniform choices made while generating.
///
/// Any `rand` generator is a `RandomSource`. Tests and demos can substitute
/// a [`ScriptedSource`] to make every choice predictable.
pub trait RandomSource {
	/// Returns an index in `0..len`. `len` is never 0.
	fn pick(&mut self, len: usize) -> usize;
}

impl<R: Rng + ?Sized> RandomSource for R {
	fn pick(&mut self, len: usize) -> usize {
		self.random_range(0..len)
	}
}

/// Replays a fixed list of indices, cycling when exhausted.
///
/// Each scripted index is reduced modulo the number of candidates, so
/// `ScriptedSource::new(vec![0])` always picks the first candidate.
#[derive(Clone, Debug)]
pub struct ScriptedSource {
	script: Vec<usize>,
	position: usize,
}

impl ScriptedSource {
	pub fn new(script: Vec<usize>) -> Self {
		Self { script, position: 0 }
	}

	/// A source that always picks the first candidate.
	pub fn first() -> Self {
		Self::new(vec![0])
	}

	/// Number of picks made so far.
	pub fn picks(&self) -> usize {
		self.position
	}
}

impl RandomSource for ScriptedSource {
	fn pick(&mut self, len: usize) -> usize {
		let index = if self.script.is_empty() {
			0
		} else {
			self.script[self.position % self.script.len()] % len
		};
		self.position += 1;
		index
	}
}
