use std::collections::BTreeMap;
use std::path::Path;

use crate::KilnError;
use crate::KilnResult;

/// Line that opens and closes a front-matter block.
const MARKER: &str = "+++";

/// Front-matter key naming the base template a markdown file extends.
pub const TEMPLATE_KEY: &str = "template";

/// Parsed front matter: the YAML mapping between the `+++` markers. Values
/// stay as tagged variants so callers project the shapes they need
/// (`as_str` for the template name and sort keys) and fail with context when
/// a value has the wrong shape.
pub type FrontMatter = BTreeMap<String, serde_json::Value>;

/// Normalize CRLF line endings to LF so marker detection and every later
/// pipeline stage see a single newline convention.
pub fn normalize_newlines(source: &str) -> String {
	source.replace("\r\n", "\n")
}

/// Split a document into front matter and body.
///
/// A document carries front matter iff its first line is exactly `+++`; the
/// block runs until the next line that is exactly `+++`, and the body is
/// everything after that line, byte-exact. A document without the opening
/// marker, or with an opening marker that is never closed, is returned
/// whole as the body with an empty mapping; neither case is an error. A
/// present but blank block also yields an empty mapping.
pub fn extract<'a>(path: &Path, source: &'a str) -> KilnResult<(FrontMatter, &'a str)> {
	let Some(rest) = open_block(source) else {
		return Ok((FrontMatter::new(), source));
	};
	let Some((block, body)) = close_block(rest) else {
		return Ok((FrontMatter::new(), source));
	};
	if block.trim().is_empty() {
		return Ok((FrontMatter::new(), body));
	}

	let mapping = serde_yaml_ng::from_str(block).map_err(|e| KilnError::FrontMatter {
		path: path.display().to_string(),
		reason: e.to_string(),
	})?;

	Ok((mapping, body))
}

/// Remove and return the `template` key from a front-matter mapping. The key
/// is consumed so it never leaks into the synthesized block set.
pub fn take_template(front_matter: &mut FrontMatter, path: &Path) -> KilnResult<String> {
	let Some(value) = front_matter.remove(TEMPLATE_KEY) else {
		return Err(KilnError::MissingTemplate {
			path: path.display().to_string(),
		});
	};
	let Some(name) = value.as_str() else {
		return Err(KilnError::TemplateField {
			path: path.display().to_string(),
		});
	};

	Ok(name.to_string())
}

/// Strip the opening marker line, returning the text after it, or `None`
/// when the document does not start with a marker line.
fn open_block(source: &str) -> Option<&str> {
	let rest = source.strip_prefix(MARKER)?;
	if rest.is_empty() {
		return Some(rest);
	}
	rest.strip_prefix('\n')
}

/// Find the closing marker line, returning the block before it and the body
/// after it.
fn close_block(rest: &str) -> Option<(&str, &str)> {
	let mut offset = 0;
	loop {
		let line_end = rest[offset..].find('\n').map(|i| offset + i);
		let line = match line_end {
			Some(end) => &rest[offset..end],
			None => &rest[offset..],
		};
		if line == MARKER {
			let block = &rest[..offset];
			let body = match line_end {
				Some(end) => &rest[end + 1..],
				None => "",
			};
			return Some((block, body));
		}
		match line_end {
			Some(end) => offset = end + 1,
			None => return None,
		}
	}
}
