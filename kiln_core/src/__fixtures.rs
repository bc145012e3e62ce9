use std::fs;
use std::io::Read;
use std::io::Write;
use std::net::SocketAddr;
use std::net::TcpStream;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use std::time::Instant;

use crate::serve::handle_request;

/// Minimal config for a fixture site rooted at a tempdir.
pub const SITE_CONFIG: &str =
	"content_folder: content\noutput_folder: public\ntemplates_folder: templates\n";

/// Base template with a `title` and a `content` block.
pub const BASE_TEMPLATE: &str = "<html>\n<head><title>{% block title %}untitled{% endblock \
                                 %}</title></head>\n<body>\n{% block content %}{% endblock \
                                 %}\n</body>\n</html>\n";

/// Write `content` to `path`, creating parent folders first.
pub fn write_file(path: &Path, content: &str) {
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent).unwrap_or_else(|e| panic!("create {}: {e}", parent.display()));
	}
	fs::write(path, content).unwrap_or_else(|e| panic!("write {}: {e}", path.display()));
}

/// Lay out a site skeleton under `root`: the config file, an empty content
/// folder, and the base template. Returns the config path.
pub fn site_scaffold(root: &Path) -> PathBuf {
	let config_path = root.join("site.yaml");
	write_file(&config_path, SITE_CONFIG);
	fs::create_dir_all(root.join("content")).unwrap_or_else(|e| panic!("create content: {e}"));
	write_file(&root.join("templates").join("base.jinja"), BASE_TEMPLATE);

	config_path
}

/// A markdown page extending the base template.
pub fn page(title: &str, body: &str) -> String {
	format!("+++\ntemplate: base.jinja\ntitle: {title}\n+++\n\n{body}\n")
}

/// Read a rendered file out of a fixture site's output folder.
pub fn read_output(root: &Path, rel: &str) -> String {
	let path = root.join("public").join(rel);
	fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

/// Like [`read_output`] but tolerates the file not existing yet, for
/// polling mid-rebuild.
pub fn try_read_output(root: &Path, rel: &str) -> Option<String> {
	fs::read_to_string(root.join("public").join(rel)).ok()
}

/// Poll `check` until it passes or `timeout` elapses.
pub fn wait_for(timeout: Duration, check: impl Fn() -> bool) -> bool {
	let deadline = Instant::now() + timeout;
	while Instant::now() < deadline {
		if check() {
			return true;
		}
		std::thread::sleep(Duration::from_millis(50));
	}

	check()
}

/// Bind a throwaway preview server on an ephemeral port, answering
/// requests from `root` until unblocked.
pub fn spawn_preview(root: PathBuf) -> (Arc<tiny_http::Server>, SocketAddr, JoinHandle<()>) {
	let server = tiny_http::Server::http(("127.0.0.1", 0)).unwrap_or_else(|e| panic!("bind: {e}"));
	let server = Arc::new(server);
	let addr = match server.server_addr() {
		tiny_http::ListenAddr::IP(addr) => addr,
		_ => panic!("expected a tcp listener"),
	};
	let accept = Arc::clone(&server);
	let thread = std::thread::spawn(move || {
		for request in accept.incoming_requests() {
			handle_request(request, &root);
		}
	});

	(server, addr, thread)
}

/// Send one raw HTTP request and return the whole response as text.
pub fn http_request(addr: SocketAddr, request: &str) -> String {
	let mut stream = TcpStream::connect(addr).unwrap_or_else(|e| panic!("connect: {e}"));
	stream
		.write_all(request.as_bytes())
		.unwrap_or_else(|e| panic!("send: {e}"));
	let mut response = String::new();
	stream
		.read_to_string(&mut response)
		.unwrap_or_else(|e| panic!("receive: {e}"));

	response
}

/// A body-less request with a connection-close handshake.
pub fn simple_request(addr: SocketAddr, method: &str, path: &str) -> String {
	http_request(
		addr,
		&format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n"),
	)
}

/// A request carrying a body, for exercising the echo path.
pub fn upload(addr: SocketAddr, method: &str, path: &str, body: &str) -> String {
	http_request(
		addr,
		&format!(
			"{method} {path} HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\nConnection: \
			 close\r\n\r\n{body}",
			body.len()
		),
	)
}
