use std::collections::BTreeMap;
use std::path::Path;

use globset::GlobBuilder;
use walkdir::WalkDir;

use crate::KilnError;
use crate::KilnResult;
use crate::config::DataCollectionConfig;
use crate::config::MARKDOWN_EXTENSION;
use crate::config::SiteConfig;
use crate::config::TEMPLATE_EXTENSION;
use crate::front_matter;
use crate::front_matter::FrontMatter;

/// Synthetic front-matter key carrying an entry's eventual output path.
pub const OUTPUT_PATH_KEY: &str = "output_path";

/// The ambient template data: ordered entries per collection, keyed by the
/// collection name templates use.
pub type DataContext = BTreeMap<String, Vec<FrontMatter>>;

/// Aggregate every configured data collection from the content tree.
///
/// Each collection globs the content folder, extracts front matter from
/// every match (the body is discarded and no `template` key is required),
/// tags each entry with its [`OUTPUT_PATH_KEY`], and orders the entries by
/// the configured sort key. The result is exposed to every template render
/// in the build.
pub fn aggregate(config: &SiteConfig) -> KilnResult<DataContext> {
	let mut collections = DataContext::new();
	for (name, collection) in &config.data {
		let entries = collect(name, collection, &config.content_folder)?;
		tracing::debug!(
			collection = %name,
			entries = entries.len(),
			"aggregated data collection"
		);
		collections.insert(name.clone(), entries);
	}

	Ok(collections)
}

fn collect(
	name: &str,
	collection: &DataCollectionConfig,
	content_root: &Path,
) -> KilnResult<Vec<FrontMatter>> {
	let matcher = GlobBuilder::new(&collection.pattern)
		.literal_separator(true)
		.build()
		.map_err(|e| KilnError::DataPattern {
			collection: name.to_string(),
			reason: e.to_string(),
		})?
		.compile_matcher();

	let mut entries = Vec::new();
	for entry in WalkDir::new(content_root).sort_by_file_name() {
		let entry = entry.map_err(|e| KilnError::Io(e.into()))?;
		if !entry.file_type().is_file() {
			continue;
		}
		let Ok(rel) = entry.path().strip_prefix(content_root) else {
			continue;
		};
		if !matcher.is_match(rel) {
			continue;
		}

		let raw = std::fs::read_to_string(entry.path()).map_err(|e| KilnError::DataFile {
			path: entry.path().display().to_string(),
			reason: e.to_string(),
		})?;
		let normalized = front_matter::normalize_newlines(&raw);
		let (mut mapping, _) = front_matter::extract(entry.path(), &normalized)?;
		mapping.insert(
			OUTPUT_PATH_KEY.to_string(),
			serde_json::Value::String(output_path(rel)),
		);
		entries.push(mapping);
	}

	if let Some(key) = &collection.sort_key {
		sort_entries(&mut entries, name, key, collection.sort_ascending)?;
	}

	Ok(entries)
}

/// Output path for a matched source file: `/` plus the content-root-relative
/// path, forward-slashed, with a renderable extension stripped.
fn output_path(rel: &Path) -> String {
	let mut path = rel.to_string_lossy().replace('\\', "/");
	for extension in [MARKDOWN_EXTENSION, TEMPLATE_EXTENSION] {
		if let Some(stripped) = path.strip_suffix(&format!(".{extension}")) {
			path = stripped.to_string();
			break;
		}
	}

	format!("/{path}")
}

/// Order entries lexicographically by a front-matter key. Every entry must
/// carry the key as a string; anything else fails naming the entry.
fn sort_entries(
	entries: &mut [FrontMatter],
	collection: &str,
	key: &str,
	ascending: bool,
) -> KilnResult<()> {
	for entry in entries.iter() {
		if entry.get(key).and_then(serde_json::Value::as_str).is_none() {
			return Err(KilnError::DataSortKey {
				collection: collection.to_string(),
				entry: entry_name(entry),
				key: key.to_string(),
			});
		}
	}

	entries.sort_by(|a, b| {
		let left = a.get(key).and_then(serde_json::Value::as_str).unwrap_or_default();
		let right = b.get(key).and_then(serde_json::Value::as_str).unwrap_or_default();
		if ascending {
			left.cmp(right)
		} else {
			right.cmp(left)
		}
	});

	Ok(())
}

fn entry_name(entry: &FrontMatter) -> String {
	entry
		.get(OUTPUT_PATH_KEY)
		.and_then(serde_json::Value::as_str)
		.unwrap_or("<unknown>")
		.to_string()
}
