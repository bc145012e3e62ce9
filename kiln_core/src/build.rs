use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use walkdir::WalkDir;

use crate::KilnError;
use crate::KilnResult;
use crate::compose;
use crate::config::MARKDOWN_EXTENSION;
use crate::config::SiteConfig;
use crate::config::TEMPLATE_EXTENSION;
use crate::data;
use crate::front_matter;
use crate::markdown::MarkupRenderer;
use crate::mask;

/// Load the config file at `path` and run a full site build.
///
/// Both the CLI and the file watcher come through here: the config is
/// re-read on every call, so edits to it take effect on the next build.
pub fn build_from_config_file(path: &Path) -> KilnResult<()> {
	let config = SiteConfig::load(path)?;
	build_site(&config)
}

/// Build the site described by `config` from scratch.
///
/// The output folder is removed first so stale pages never survive a
/// rebuild. Every file under the content folder is then processed in
/// sorted order: markdown runs the full render pipeline, template sources
/// render directly against the data collections, and everything else is
/// copied byte for byte.
pub fn build_site(config: &SiteConfig) -> KilnResult<()> {
	let started = Instant::now();
	tracing::info!(
		content = %config.content_folder.display(),
		output = %config.output_folder.display(),
		"building site"
	);

	match fs::remove_dir_all(&config.output_folder) {
		Ok(()) => {}
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
		Err(e) => return Err(KilnError::Io(e)),
	}

	let collections = data::aggregate(config)?;
	let mut builder = SiteBuilder {
		config,
		renderer: MarkupRenderer::new(),
		env: compose::environment(config),
		context: minijinja::Value::from_serialize(&collections),
		written: HashSet::new(),
	};
	let pages = builder.run()?;

	tracing::info!(pages, elapsed = ?started.elapsed(), "site build finished");
	Ok(())
}

struct SiteBuilder<'c> {
	config: &'c SiteConfig,
	renderer: MarkupRenderer,
	env: minijinja::Environment<'static>,
	context: minijinja::Value,
	written: HashSet<PathBuf>,
}

impl SiteBuilder<'_> {
	fn run(&mut self) -> KilnResult<usize> {
		let mut pages = 0;
		for entry in WalkDir::new(&self.config.content_folder).sort_by_file_name() {
			let entry = entry.map_err(|e| KilnError::walk(KilnError::Io(e.into())))?;
			if !entry.file_type().is_file() {
				continue;
			}
			let Ok(rel) = entry.path().strip_prefix(&self.config.content_folder) else {
				continue;
			};
			let rel = rel.to_path_buf();
			self.process(entry.path(), &rel).map_err(KilnError::walk)?;
			pages += 1;
		}

		Ok(pages)
	}

	/// Route one content file to its output, creating parent folders as
	/// needed and flagging when two sources fight over the same target.
	fn process(&mut self, source: &Path, rel: &Path) -> KilnResult<()> {
		let extension = rel.extension().and_then(OsStr::to_str).unwrap_or_default();
		let target = match extension {
			MARKDOWN_EXTENSION | TEMPLATE_EXTENSION => {
				self.config.output_folder.join(rel.with_extension(""))
			}
			_ => self.config.output_folder.join(rel),
		};
		if let Some(parent) = target.parent() {
			fs::create_dir_all(parent)?;
		}
		if !self.written.insert(target.clone()) {
			tracing::warn!(
				source = %source.display(),
				output = %target.display(),
				"output path collision, the later file wins"
			);
		}

		match extension {
			MARKDOWN_EXTENSION => {
				let page = self.render_markdown(source, rel)?;
				fs::write(&target, page)?;
			}
			TEMPLATE_EXTENSION => {
				let page = self.render_template(source, rel)?;
				fs::write(&target, page)?;
			}
			_ => {
				fs::copy(source, &target)?;
			}
		}
		tracing::debug!(path = %rel.display(), "processed content file");

		Ok(())
	}

	/// The full markdown pipeline: front matter off, template syntax
	/// masked, markdown to HTML, template syntax back, then the page is
	/// composed onto its layout and rendered.
	fn render_markdown(&self, source: &Path, rel: &Path) -> KilnResult<String> {
		let raw = fs::read_to_string(source)?;
		let normalized = front_matter::normalize_newlines(&raw);
		let (mut matter, body) = front_matter::extract(source, &normalized)?;
		let template = front_matter::take_template(&mut matter, source)?;

		let (masked, table) = mask::mask(body);
		let html = self
			.renderer
			.render(source, &masked, &self.config.code_formatting)?;
		let restored = mask::restore(&html, &table);

		let synthesized = compose::synthesize(&template, &matter, &restored);
		compose::render_source(
			&self.env,
			&rel.to_string_lossy(),
			&synthesized,
			&self.context,
		)
	}

	/// Template sources in the content tree render as-is against the data
	/// collections, no front matter involved.
	fn render_template(&self, source: &Path, rel: &Path) -> KilnResult<String> {
		let raw = fs::read_to_string(source)?;
		compose::render_source(&self.env, &rel.to_string_lossy(), &raw, &self.context)
	}
}
