//! Local preview server: serves the build output over HTTP, echoes
//! request bodies back for form experiments, and keeps a [`WatchSession`]
//! rebuilding the site in the background.

use std::borrow::Cow;
use std::fs;
use std::io::Read;
use std::path::Component;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use tiny_http::Header;
use tiny_http::Method;
use tiny_http::Request;
use tiny_http::Response;
use tiny_http::Server;
use tiny_http::StatusCode;

use crate::KilnError;
use crate::KilnResult;
use crate::config::SiteConfig;
use crate::watch::FatalHook;
use crate::watch::WatchSession;

/// Serve the site's output folder on `127.0.0.1:port`, rebuilding on
/// change, until Ctrl+C or a fatal watcher error.
///
/// The request loop runs on the calling thread. A rebuild failure is
/// surfaced by unblocking the server and returning the error, so a broken
/// edit stops the preview instead of silently serving stale pages.
pub fn serve_site(config_path: &Path, port: u16) -> KilnResult<()> {
	let config = SiteConfig::load(config_path)?;
	let server = Server::http(("127.0.0.1", port)).map_err(|e| KilnError::Serve(e.to_string()))?;
	let server = Arc::new(server);

	let fatal: Arc<Mutex<Option<KilnError>>> = Arc::new(Mutex::new(None));
	let hook_fatal = Arc::clone(&fatal);
	let hook_server = Arc::clone(&server);
	let on_fatal: FatalHook = Arc::new(move |error| {
		hook_fatal
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.replace(error);
		hook_server.unblock();
	});
	let session = WatchSession::start(config_path, on_fatal)?;

	let signal_server = Arc::clone(&server);
	ctrlc::set_handler(move || {
		tracing::info!("shutting down");
		signal_server.unblock();
	})
	.map_err(|e| KilnError::Serve(e.to_string()))?;

	tracing::info!(address = %format!("http://127.0.0.1:{port}"), "preview server listening");
	for request in server.incoming_requests() {
		handle_request(request, &config.output_folder);
	}
	session.close();

	let interrupted = fatal
		.lock()
		.unwrap_or_else(PoisonError::into_inner)
		.take();
	match interrupted {
		Some(error) => Err(error),
		None => Ok(()),
	}
}

/// Answer one request against the output folder.
///
/// GET and HEAD serve static files, PUT and POST echo the request body
/// back, anything else gets a 405. Respond failures are dropped, a client
/// hanging up mid-response is not worth surfacing.
pub(crate) fn handle_request(mut request: Request, root: &Path) {
	match request.method() {
		Method::Get | Method::Head => {
			let url = request.url().to_string();
			serve_static(request, root, &url);
		}
		Method::Put | Method::Post => {
			let mut body = Vec::new();
			if let Err(e) = request.as_reader().read_to_end(&mut body) {
				tracing::warn!(error = %e, "failed to read request body");
				let _ = request
					.respond(Response::from_string("400 Bad Request").with_status_code(StatusCode(400)));
				return;
			}
			let _ = request.respond(Response::from_data(body));
		}
		_ => {
			let _ = request.respond(
				Response::from_string("405 Method Not Allowed").with_status_code(StatusCode(405)),
			);
		}
	}
}

fn serve_static(request: Request, root: &Path, url: &str) {
	// The output tree stores raw names; requests arrive percent-encoded.
	// The `..` check below has to run on decoded components.
	let decoded = urlencoding::decode(url)
		.map(Cow::into_owned)
		.unwrap_or_default();
	let path = decoded.split('?').next().unwrap_or(&decoded);
	let relative = path.trim_matches('/');
	if Path::new(relative)
		.components()
		.any(|component| matches!(component, Component::ParentDir))
	{
		respond_not_found(request);
		return;
	}

	let mut target = root.join(relative);
	if target.is_dir() {
		// Rendered pages lose their source extension, so a folder's index
		// page is usually the bare `index` file.
		let index_html = target.join("index.html");
		target = if index_html.is_file() {
			index_html
		} else {
			target.join("index")
		};
	}

	let Ok(content) = fs::read(&target) else {
		respond_not_found(request);
		return;
	};
	let content_type = guess_content_type(&target);
	let response = Response::from_data(content)
		.with_header(Header::from_bytes("Content-Type", content_type).unwrap());
	let _ = request.respond(response);
}

fn respond_not_found(request: Request) {
	let _ = request.respond(Response::from_string("404 Not Found").with_status_code(StatusCode(404)));
}

/// MIME type from the file extension. Extension-less files are rendered
/// pages, so they count as HTML.
fn guess_content_type(path: &Path) -> &'static str {
	match path.extension().and_then(|e| e.to_str()) {
		None => "text/html; charset=utf-8",
		Some("html" | "htm") => "text/html; charset=utf-8",
		Some("css") => "text/css; charset=utf-8",
		Some("js" | "mjs") => "application/javascript; charset=utf-8",
		Some("json") => "application/json; charset=utf-8",
		Some("xml") => "application/xml; charset=utf-8",
		Some("svg") => "image/svg+xml",
		Some("png") => "image/png",
		Some("jpg" | "jpeg") => "image/jpeg",
		Some("gif") => "image/gif",
		Some("webp") => "image/webp",
		Some("ico") => "image/x-icon",
		Some("woff") => "font/woff",
		Some("woff2") => "font/woff2",
		Some("ttf") => "font/ttf",
		Some("otf") => "font/otf",
		Some("pdf") => "application/pdf",
		Some("txt") => "text/plain; charset=utf-8",
		Some("md") => "text/markdown; charset=utf-8",
		_ => "application/octet-stream",
	}
}
