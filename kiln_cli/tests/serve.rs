mod common;

use clap::Parser;
use kiln_cli::Commands;
use kiln_cli::KilnCli;
use kiln_core::AnyEmptyResult;

#[test]
fn serve_port_flag_is_accepted_by_cli_parser() {
	let cli = KilnCli::parse_from(["kiln", "serve", "--config", "site.yaml"]);
	match cli.command {
		Commands::Serve { port, .. } => assert_eq!(port, 3456),
		_ => panic!("expected Serve command"),
	}

	let cli = KilnCli::parse_from(["kiln", "serve", "--config", "site.yaml", "--port", "4000"]);
	match cli.command {
		Commands::Serve { port, .. } => assert_eq!(port, 4000),
		_ => panic!("expected Serve command"),
	}
}

#[test]
fn serve_requires_config_flag() {
	let mut cmd = common::kiln_cmd();
	cmd.arg("serve")
		.assert()
		.failure()
		.stderr(predicates::str::contains("--config"));
}

#[test]
fn serve_accepted_by_binary() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let config = common::scaffold_site(tmp.path())?;

	// The server loop runs until interrupted, so build, bind, and kill it
	// after a short grace period. Port 0 asks the OS for a free port to keep
	// parallel test runs from colliding.
	let mut cmd = common::kiln_cmd();
	let _ = cmd
		.arg("serve")
		.arg("--config")
		.arg(&config)
		.arg("--port")
		.arg("0")
		.timeout(std::time::Duration::from_secs(3))
		.assert();

	Ok(())
}
