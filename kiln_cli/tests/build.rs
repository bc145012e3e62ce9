mod common;

use kiln_core::AnyEmptyResult;

#[test]
fn build_renders_the_site() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let config = common::scaffold_site(tmp.path())?;

	let mut cmd = common::kiln_cmd();
	cmd.arg("build")
		.arg("--config")
		.arg(&config)
		.assert()
		.success();

	let html = std::fs::read_to_string(tmp.path().join("public").join("index"))?;
	assert!(html.contains("<h1>Welcome</h1>"));

	Ok(())
}

#[test]
fn build_replaces_previous_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let config = common::scaffold_site(tmp.path())?;

	let mut cmd = common::kiln_cmd();
	cmd.arg("build")
		.arg("--config")
		.arg(&config)
		.assert()
		.success();

	std::fs::remove_file(tmp.path().join("content").join("index.md"))?;
	std::fs::write(
		tmp.path().join("content").join("about.md"),
		"+++\ntemplate: base.jinja\ntitle: About\n+++\n\n# About\n",
	)?;

	let mut cmd = common::kiln_cmd();
	cmd.arg("build")
		.arg("--config")
		.arg(&config)
		.assert()
		.success();

	assert!(!tmp.path().join("public").join("index").exists());
	assert!(tmp.path().join("public").join("about").is_file());

	Ok(())
}

#[test]
fn build_requires_config_flag() {
	let mut cmd = common::kiln_cmd();
	cmd.arg("build")
		.assert()
		.failure()
		.stderr(predicates::str::contains("--config"));
}

#[test]
fn build_reports_missing_config_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::kiln_cmd();
	cmd.arg("build")
		.arg("--config")
		.arg(tmp.path().join("nope.yaml"))
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("failed to read config file"));

	Ok(())
}

#[test]
fn build_reports_the_field_missing_from_the_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("site.yaml"), "content_folder: content\n")?;

	let mut cmd = common::kiln_cmd();
	cmd.arg("build")
		.arg("--config")
		.arg(tmp.path().join("site.yaml"))
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("output_folder"));

	Ok(())
}

#[test]
fn version_names_the_package() {
	let mut cmd = common::kiln_cmd();
	cmd.arg("--version")
		.assert()
		.success()
		.stdout(predicates::str::contains("kiln"));
}
