use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::KilnError;
use crate::KilnResult;

/// Default highlight style applied to fenced code blocks.
pub const DEFAULT_CHROMA_STYLE: &str = "monokai";

/// Default number of spaces a tab expands to inside highlighted code.
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Extension of files rendered directly through the template engine. The
/// extension is stripped from the output name.
pub const TEMPLATE_EXTENSION: &str = "jinja";

/// Extension of markdown files that run the full render pipeline. The
/// extension is stripped from the output name.
pub const MARKDOWN_EXTENSION: &str = "md";

/// Formatting options for fenced code blocks.
///
/// ```yaml
/// code_formatting:
///   chroma_style: monokai
///   tab_width: 4
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct CodeFormatting {
	/// Name of the highlight style for code blocks. The lookup is
	/// case-insensitive; an unknown name falls back to a bundled default
	/// style with a warning.
	#[serde(default = "default_chroma_style")]
	pub chroma_style: String,
	/// Number of spaces a tab character expands to inside highlighted code.
	#[serde(default = "default_tab_width")]
	pub tab_width: usize,
}

impl Default for CodeFormatting {
	fn default() -> Self {
		Self {
			chroma_style: default_chroma_style(),
			tab_width: default_tab_width(),
		}
	}
}

/// A named data collection: a glob over the content folder whose matches are
/// exposed to every template render as an ordered list of front-matter
/// records.
///
/// ```yaml
/// data:
///   posts:
///     pattern: "blog/*.md"
///     sort_key: date
///     sort_ascending: false
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct DataCollectionConfig {
	/// Glob pattern, relative to the content folder. `*` does not cross
	/// directory separators.
	pub pattern: String,
	/// Front-matter key the collection is ordered by. Every matched file
	/// must carry the key as a string. When absent, the collection keeps
	/// walk order.
	#[serde(default)]
	pub sort_key: Option<String>,
	/// Sort direction when `sort_key` is set. Defaults to `false`
	/// (descending).
	#[serde(default)]
	pub sort_ascending: bool,
}

/// Site configuration loaded from a YAML file.
///
/// ```yaml
/// content_folder: content
/// output_folder: public
/// templates_folder: templates
/// code_formatting:
///   chroma_style: monokai
///   tab_width: 4
/// data:
///   posts:
///     pattern: "blog/*.md"
///     sort_key: date
/// ```
///
/// Relative folders are resolved to absolute paths against the directory
/// containing the config file at load time. A build loads the config fresh
/// every time it runs, so edits take effect on the next rebuild.
#[derive(Clone, Debug, Deserialize)]
pub struct SiteConfig {
	/// Root of the source tree the build walks. Required.
	#[serde(default)]
	pub content_folder: PathBuf,
	/// Root the rendered tree is written to. Removed and recreated on every
	/// build. Required.
	#[serde(default)]
	pub output_folder: PathBuf,
	/// Root the template engine resolves `{% extends %}` targets from.
	/// Defaults to the config file's directory.
	#[serde(default)]
	pub templates_folder: PathBuf,
	/// Code block highlighting options.
	#[serde(default)]
	pub code_formatting: CodeFormatting,
	/// Named data collections keyed by the name templates use.
	#[serde(default)]
	pub data: BTreeMap<String, DataCollectionConfig>,
}

impl SiteConfig {
	/// Load and validate the config file at `path`, resolving relative
	/// folders to absolute paths against the config file's directory.
	pub fn load(path: &Path) -> KilnResult<Self> {
		let path = std::path::absolute(path).map_err(|e| KilnError::ConfigRead {
			path: path.display().to_string(),
			reason: e.to_string(),
		})?;
		let content = std::fs::read_to_string(&path).map_err(|e| KilnError::ConfigRead {
			path: path.display().to_string(),
			reason: e.to_string(),
		})?;
		let mut config: SiteConfig =
			serde_yaml_ng::from_str(&content).map_err(|e| KilnError::ConfigParse {
				path: path.display().to_string(),
				reason: e.to_string(),
			})?;

		if config.content_folder.as_os_str().is_empty() {
			return Err(KilnError::ConfigField("content_folder"));
		}
		if config.output_folder.as_os_str().is_empty() {
			return Err(KilnError::ConfigField("output_folder"));
		}

		let base = path.parent().unwrap_or_else(|| Path::new("."));
		config.content_folder = resolve(base, config.content_folder);
		config.output_folder = resolve(base, config.output_folder);
		config.templates_folder = if config.templates_folder.as_os_str().is_empty() {
			base.to_path_buf()
		} else {
			resolve(base, config.templates_folder)
		};

		Ok(config)
	}
}

fn resolve(base: &Path, folder: PathBuf) -> PathBuf {
	if folder.is_absolute() {
		folder
	} else {
		base.join(folder)
	}
}

fn default_chroma_style() -> String {
	DEFAULT_CHROMA_STYLE.to_string()
}

fn default_tab_width() -> usize {
	DEFAULT_TAB_WIDTH
}
