use crate::KilnError;
use crate::KilnResult;
use crate::config::SiteConfig;
use crate::front_matter::FrontMatter;

/// Name of the synthesized block that carries the rendered page body.
pub const CONTENT_BLOCK: &str = "content";

/// Build the template engine shared by every render in one build. Templates
/// referenced by `{% extends %}` load from the configured templates folder;
/// undefined variables render empty instead of failing, and trailing
/// newlines survive rendering.
pub fn environment(config: &SiteConfig) -> minijinja::Environment<'static> {
	let mut env = minijinja::Environment::new();
	env.set_loader(minijinja::path_loader(&config.templates_folder));
	env.set_keep_trailing_newline(true);
	env.set_undefined_behavior(minijinja::UndefinedBehavior::Chainable);

	env
}

/// Synthesize the template source that splices a rendered page into its
/// base template: an `extends` directive, one named block per remaining
/// front-matter key, and a `content` block holding the rendered HTML.
/// Synthesis itself cannot fail; the synthesized source is judged when it
/// is parsed and executed.
pub fn synthesize(template: &str, front_matter: &FrontMatter, html: &str) -> String {
	let mut source = format!("{{% extends \"{template}\" %}}\n");
	for (key, value) in front_matter {
		source.push_str(&format!(
			"{{% block {key} %}}{}{{% endblock %}}\n",
			block_display(value)
		));
	}
	source.push_str(&format!(
		"{{% block {CONTENT_BLOCK} %}}{html}{{% endblock %}}\n"
	));

	source
}

/// Execute a template source against the shared data context. `name`
/// identifies the originating content file in engine diagnostics and in the
/// returned error. On failure the full source is dumped through the log so
/// a synthesized template can be inspected.
pub fn render_source(
	env: &minijinja::Environment<'_>,
	name: &str,
	source: &str,
	context: &minijinja::Value,
) -> KilnResult<String> {
	env.render_named_str(name, source, context).map_err(|e| {
		tracing::error!(template = %source, "template source failed to parse or render");
		KilnError::TemplateRender {
			path: name.to_string(),
			reason: e.to_string(),
		}
	})
}

/// Default string form of a front-matter value inside a synthesized block:
/// strings bare, numbers and booleans in display form, null empty,
/// sequences and mappings as compact JSON.
fn block_display(value: &serde_json::Value) -> String {
	match value {
		serde_json::Value::Null => String::new(),
		serde_json::Value::String(text) => text.clone(),
		other => other.to_string(),
	}
}
