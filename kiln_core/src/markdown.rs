use std::path::Path;

use pulldown_cmark::CodeBlockKind;
use pulldown_cmark::Event;
use pulldown_cmark::Options;
use pulldown_cmark::Parser;
use pulldown_cmark::Tag;
use pulldown_cmark::TagEnd;
use syntect::highlighting::Theme;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::KilnError;
use crate::KilnResult;
use crate::config::CodeFormatting;

/// Bundled theme used when the configured style name is unknown.
const FALLBACK_STYLE: &str = "InspiredGitHub";

/// Converts masked markdown bodies to HTML, replacing every code block with
/// syntax-highlighted markup.
///
/// Loading the bundled syntax and theme sets dominates construction cost, so
/// one renderer is built per build and reused for every file.
pub struct MarkupRenderer {
	syntaxes: SyntaxSet,
	themes: ThemeSet,
}

impl MarkupRenderer {
	pub fn new() -> Self {
		Self {
			syntaxes: SyntaxSet::load_defaults_newlines(),
			themes: ThemeSet::load_defaults(),
		}
	}

	/// A renderer over explicit sets, for exercising highlight failures.
	#[cfg(test)]
	pub(crate) fn with_sets(syntaxes: SyntaxSet, themes: ThemeSet) -> Self {
		Self { syntaxes, themes }
	}

	/// Convert a masked markdown body to HTML.
	///
	/// The conversion runs with tables, footnotes, strikethrough, and
	/// definition lists enabled. Code blocks (fenced or indented) are
	/// intercepted: tabs are expanded to the configured width, the fence's
	/// language tag resolves to a syntax definition (plain text when absent
	/// or unrecognized), and the block is replaced with highlighted HTML in
	/// the configured style. A highlight failure does not stop the walk:
	/// the failed block degrades to an escaped `<pre><code>` and the failure
	/// is recorded; once the conversion completes, any recorded failures
	/// fail the render as one aggregated error naming each block.
	pub fn render(
		&self,
		path: &Path,
		body: &str,
		formatting: &CodeFormatting,
	) -> KilnResult<String> {
		let theme = self.theme(&formatting.chroma_style);
		let mut failures: Vec<String> = Vec::new();
		let mut block: Option<String> = None;
		let mut language = String::new();
		let mut block_index = 0usize;
		let mut events = Vec::new();

		for event in Parser::new_ext(body, extension_options()) {
			match event {
				Event::Start(Tag::CodeBlock(kind)) => {
					language = match kind {
						CodeBlockKind::Fenced(info) => fence_language(&info),
						CodeBlockKind::Indented => String::new(),
					};
					block = Some(String::new());
				}
				Event::Text(text) if block.is_some() => {
					if let Some(code) = block.as_mut() {
						code.push_str(&text);
					}
				}
				Event::End(TagEnd::CodeBlock) => {
					let code = block.take().unwrap_or_default();
					block_index += 1;
					let html = self.highlight(
						&code,
						&language,
						formatting,
						theme,
						block_index,
						&mut failures,
					);
					events.push(Event::Html(html.into()));
				}
				other => events.push(other),
			}
		}

		let mut html = String::with_capacity(body.len() * 2);
		pulldown_cmark::html::push_html(&mut html, events.into_iter());

		if failures.is_empty() {
			Ok(html)
		} else {
			Err(KilnError::Highlight {
				path: path.display().to_string(),
				details: failures.join("; "),
			})
		}
	}

	/// Highlight one code block, recording a failure instead of aborting.
	pub(crate) fn highlight(
		&self,
		code: &str,
		language: &str,
		formatting: &CodeFormatting,
		theme: &Theme,
		block_index: usize,
		failures: &mut Vec<String>,
	) -> String {
		let expanded = expand_tabs(code, formatting.tab_width);
		let syntax = if language.is_empty() {
			None
		} else {
			self.syntaxes.find_syntax_by_token(language)
		};
		let syntax = syntax.unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());

		match highlighted_html_for_string(&expanded, &self.syntaxes, syntax, theme) {
			Ok(html) => html,
			Err(e) => {
				let tag = if language.is_empty() { "text" } else { language };
				failures.push(format!("code block {block_index} (`{tag}`): {e}"));
				format!("<pre><code>{}</code></pre>\n", escape_text(&expanded))
			}
		}
	}

	/// Resolve the configured style name to a bundled theme: exact match
	/// first, then case-insensitive. An unknown name falls back with a
	/// warning rather than failing the build.
	fn theme(&self, style: &str) -> &Theme {
		let themes = &self.themes.themes;
		if let Some(theme) = themes.get(style) {
			return theme;
		}
		if let Some(theme) =
			themes
				.iter()
				.find_map(|(name, theme)| name.eq_ignore_ascii_case(style).then_some(theme))
		{
			return theme;
		}

		tracing::warn!(
			style = %style,
			fallback = FALLBACK_STYLE,
			"unknown highlight style, using fallback"
		);
		themes
			.get(FALLBACK_STYLE)
			.expect("bundled theme set includes the fallback theme")
	}
}

impl Default for MarkupRenderer {
	fn default() -> Self {
		Self::new()
	}
}

fn extension_options() -> Options {
	Options::ENABLE_TABLES
		| Options::ENABLE_FOOTNOTES
		| Options::ENABLE_STRIKETHROUGH
		| Options::ENABLE_DEFINITION_LIST
}

/// First whitespace-delimited word of the fence info string.
fn fence_language(info: &str) -> String {
	info.split_whitespace().next().unwrap_or_default().to_string()
}

fn expand_tabs(code: &str, tab_width: usize) -> String {
	code.replace('\t', &" ".repeat(tab_width))
}

fn escape_text(text: &str) -> String {
	text.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
}
