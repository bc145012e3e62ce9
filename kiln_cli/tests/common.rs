use std::path::Path;
use std::path::PathBuf;

use assert_cmd::Command;

pub fn kiln_cmd() -> Command {
	let mut cmd = Command::cargo_bin("kiln").unwrap_or_else(|e| panic!("kiln binary: {e}"));
	cmd.env("NO_COLOR", "1");
	cmd
}

/// Write a minimal site (config, one template, one markdown page) under
/// `root` and return the config file path.
pub fn scaffold_site(root: &Path) -> std::io::Result<PathBuf> {
	std::fs::create_dir_all(root.join("content"))?;
	std::fs::create_dir_all(root.join("templates"))?;
	std::fs::write(
		root.join("templates").join("base.jinja"),
		"<html><body>{% block content %}{% endblock %}</body></html>\n",
	)?;
	std::fs::write(
		root.join("content").join("index.md"),
		"+++\ntemplate: base.jinja\ntitle: Home\n+++\n\n# Welcome\n",
	)?;
	let config = root.join("site.yaml");
	std::fs::write(
		&config,
		"content_folder: content\noutput_folder: public\ntemplates_folder: templates\n",
	)?;

	Ok(config)
}
