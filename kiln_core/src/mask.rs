use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

/// Matches a `{{ … }}` expression span, non-greedy, across newlines.
static EXPRESSION_PATTERN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?s)\{\{.*?\}\}").unwrap());

/// Matches a `{% … %}` statement span, non-greedy, across newlines.
static STATEMENT_PATTERN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?s)\{%.*?%\}").unwrap());

/// Records each masking substitution as (token, original bytes) in insertion
/// order. Tokens are UUIDs, which contain neither braces nor percent signs,
/// so a token can never be matched again by either syntax pattern.
#[derive(Debug, Default)]
pub struct MaskTable {
	entries: Vec<(String, String)>,
}

impl MaskTable {
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Replace every template-syntax span in `body` with a fresh unique token so
/// the markdown renderer cannot escape or rewrite the span, returning the
/// masked text and the table needed to reverse the substitution.
///
/// The expression pass runs first and the statement pass runs over its
/// output, both extending the same table. A body with no template syntax
/// comes back unchanged with an empty table.
pub fn mask(body: &str) -> (String, MaskTable) {
	let mut table = MaskTable::default();
	let masked = mask_pattern(&EXPRESSION_PATTERN, body, &mut table);
	let masked = mask_pattern(&STATEMENT_PATTERN, &masked, &mut table);

	(masked, table)
}

/// Reverse [`mask`]: replace every token occurrence with its recorded bytes.
///
/// The table is walked in reverse insertion order: a statement span masked
/// in the second pass can contain an expression token from the first pass,
/// and expanding outer tokens first guarantees the inner tokens are present
/// in the text by the time their turn comes.
pub fn restore(masked: &str, table: &MaskTable) -> String {
	let mut restored = masked.to_string();
	for (token, original) in table.entries.iter().rev() {
		restored = restored.replace(token.as_str(), original);
	}

	restored
}

fn mask_pattern(pattern: &Regex, input: &str, table: &mut MaskTable) -> String {
	let mut output = String::with_capacity(input.len());
	let mut last = 0;
	for found in pattern.find_iter(input) {
		let token = Uuid::new_v4().to_string();
		output.push_str(&input[last..found.start()]);
		output.push_str(&token);
		table.entries.push((token, found.as_str().to_string()));
		last = found.end();
	}
	output.push_str(&input[last..]);

	output
}
