use std::sync::LazyLock;

use regex::Regex;

use crate::model::chain::Token;

/// Markdown syntax and punctuation patterns, applied in declaration order.
///
/// Underscores and stars are removed before links so that `[_a_](b)` still
/// matches as a link. Everything left that is neither a word character nor
/// whitespace is removed last.
static MARKDOWN_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
	[
		r"#+\s*",          // headers
		r"\*+",            // emphasis
		r"_+",             // emphasis / underline
		r"\[.*?\]\(.*?\)", // links, text included
		r"`.*?`",          // inline code spans
		r"[^\w\s]",        // punctuation
	]
	.iter()
	// Literal patterns, cannot fail
	.map(|pattern| Regex::new(pattern).expect("invalid markdown pattern"))
	.collect()
});

/// Strips markdown syntax markers and punctuation, then lowercases.
///
/// Returns an empty string for empty input.
pub fn clean_text(raw: &str) -> String {
	if raw.is_empty() {
		return String::new();
	}

	let mut text = raw.to_owned();
	for pattern in MARKDOWN_PATTERNS.iter() {
		text = pattern.replace_all(&text, "").into_owned();
	}
	text.to_lowercase()
}

/// Cleans `raw` with [`clean_text`] and splits it into tokens.
///
/// Runs of whitespace (spaces, tabs, newlines) separate tokens, so the
/// result never contains an empty token.
pub fn tokenize(raw: &str) -> Vec<Token> {
	clean_text(raw)
		.split_whitespace()
		.map(str::to_owned)
		.collect()
}
