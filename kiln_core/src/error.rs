use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum KilnError {
	#[error(transparent)]
	#[diagnostic(code(kiln::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to read config file `{path}`: {reason}")]
	#[diagnostic(
		code(kiln::config_read),
		help("check that the path passed to --config exists and is readable")
	)]
	ConfigRead { path: String, reason: String },

	#[error("failed to parse config file `{path}`: {reason}")]
	#[diagnostic(
		code(kiln::config_parse),
		help("the config file must be a YAML mapping with `content_folder` and `output_folder` keys")
	)]
	ConfigParse { path: String, reason: String },

	#[error("{0} is a required parameter in the config file")]
	#[diagnostic(code(kiln::config_field))]
	ConfigField(&'static str),

	#[error("failed to parse front matter in `{path}`: {reason}")]
	#[diagnostic(
		code(kiln::front_matter),
		help("front matter is the YAML mapping between the opening and closing `+++` lines")
	)]
	FrontMatter { path: String, reason: String },

	#[error("missing `template` key in front matter of `{path}`")]
	#[diagnostic(
		code(kiln::missing_template),
		help("add `template: <name>` to the front matter, naming a file in the templates folder")
	)]
	MissingTemplate { path: String },

	#[error("`template` key in front matter of `{path}` must be a string")]
	#[diagnostic(code(kiln::template_field))]
	TemplateField { path: String },

	#[error("failed to render template for `{path}`: {reason}")]
	#[diagnostic(code(kiln::template_render))]
	TemplateRender { path: String, reason: String },

	#[error("syntax highlighting failed for `{path}`: {details}")]
	#[diagnostic(code(kiln::highlight))]
	Highlight { path: String, details: String },

	#[error("invalid glob pattern for data collection `{collection}`: {reason}")]
	#[diagnostic(
		code(kiln::data_pattern),
		help("patterns are relative to the content folder and `*` does not cross directories")
	)]
	DataPattern { collection: String, reason: String },

	#[error("failed to load data file `{path}`: {reason}")]
	#[diagnostic(code(kiln::data_file))]
	DataFile { path: String, reason: String },

	#[error("sort key `{key}` for data collection `{collection}` is missing or not a string in `{entry}`")]
	#[diagnostic(
		code(kiln::data_sort_key),
		help("every file matched by a sorted collection must set the sort key to a string value in its front matter")
	)]
	DataSortKey {
		collection: String,
		entry: String,
		key: String,
	},

	#[error("failed to walk content folder")]
	#[diagnostic(code(kiln::content_walk))]
	ContentWalk(#[source] Box<KilnError>),

	#[error("file watcher failed: {0}")]
	#[diagnostic(code(kiln::watch))]
	Watch(String),

	#[error("preview server failed: {0}")]
	#[diagnostic(code(kiln::serve))]
	Serve(String),
}

impl KilnError {
	/// Wrap an error from processing a single content file into the walk-level
	/// failure the build surfaces.
	pub fn walk(inner: KilnError) -> Self {
		Self::ContentWalk(Box::new(inner))
	}
}

pub type KilnResult<T> = Result<T, KilnError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
