//! Live rebuild support: one watcher over the content and templates
//! folders, a second over the config file itself. A config change tears
//! down the content watcher, reloads the config, and starts a fresh one
//! pointed at the new folders, so edits to the config take effect without
//! restarting the process.

use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use notify::RecommendedWatcher;
use notify::RecursiveMode;
use notify::Watcher;

use crate::KilnError;
use crate::KilnResult;
use crate::build;
use crate::config::SiteConfig;

/// Invoked from a watcher thread when a rebuild or the watcher itself
/// fails. The session shuts down after calling it.
pub type FatalHook = Arc<dyn Fn(KilnError) + Send + Sync>;

/// How long to keep draining filesystem events after the first one, so a
/// burst from one save triggers one rebuild.
const DEBOUNCE_WINDOW: Duration = Duration::from_millis(200);

enum WatchSignal {
	Change,
	Failure(String),
}

/// A filesystem watcher paired with the thread draining its events.
struct TreeWatcher {
	watcher: RecommendedWatcher,
	thread: JoinHandle<()>,
}

impl TreeWatcher {
	/// Drop the watcher so its channel disconnects, then wait for the
	/// event loop to finish. An in-flight rebuild completes first.
	fn close(self) {
		drop(self.watcher);
		let _ = self.thread.join();
	}
}

/// A running pair of watchers that rebuild the site on change.
///
/// Dropping the session leaks the watcher threads; call
/// [`WatchSession::close`] to shut down cleanly.
pub struct WatchSession {
	content: Arc<Mutex<Option<TreeWatcher>>>,
	config: Option<TreeWatcher>,
	closed: Arc<AtomicBool>,
}

impl WatchSession {
	/// Start watching the folders named by the config file at
	/// `config_path`. Rebuilds run [`build::build_from_config_file`], so
	/// every rebuild picks up the config as it is on disk at that moment.
	pub fn start(config_path: &Path, on_fatal: FatalHook) -> KilnResult<Self> {
		let config_path = std::path::absolute(config_path)?;
		let config = SiteConfig::load(&config_path)?;
		let closed = Arc::new(AtomicBool::new(false));

		let content = spawn_content_watcher(&config_path, &config, &closed, &on_fatal)?;
		let content = Arc::new(Mutex::new(Some(content)));
		let config_watcher =
			spawn_config_watcher(&config_path, Arc::clone(&content), &closed, &on_fatal)?;

		Ok(Self {
			content,
			config: Some(config_watcher),
			closed,
		})
	}

	/// Stop both watchers and wait for their threads. Failures arriving
	/// after this point no longer reach the fatal hook.
	pub fn close(self) {
		self.closed.store(true, Ordering::SeqCst);
		let content = self
			.content
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.take();
		if let Some(watcher) = content {
			watcher.close();
		}
		if let Some(watcher) = self.config {
			watcher.close();
		}
	}
}

/// Block for the next change signal, then drain the debounce window.
/// Returns `None` once the sending watcher has been dropped.
fn next_signal(rx: &mpsc::Receiver<WatchSignal>) -> Option<WatchSignal> {
	let first = rx.recv().ok()?;
	if matches!(first, WatchSignal::Failure(_)) {
		return Some(first);
	}
	loop {
		match rx.recv_timeout(DEBOUNCE_WINDOW) {
			Ok(WatchSignal::Change) => {}
			Ok(failure @ WatchSignal::Failure(_)) => return Some(failure),
			Err(mpsc::RecvTimeoutError::Timeout) => return Some(WatchSignal::Change),
			Err(mpsc::RecvTimeoutError::Disconnected) => return None,
		}
	}
}

fn report_fatal(closed: &AtomicBool, on_fatal: &FatalHook, error: KilnError) {
	if !closed.load(Ordering::SeqCst) {
		on_fatal(error);
	}
}

/// Watch the content and templates folders recursively and rebuild the
/// whole site whenever something inside them changes.
fn spawn_content_watcher(
	config_path: &Path,
	config: &SiteConfig,
	closed: &Arc<AtomicBool>,
	on_fatal: &FatalHook,
) -> KilnResult<TreeWatcher> {
	let (tx, rx) = mpsc::channel();
	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			match res {
				Ok(event) => {
					if matches!(
						event.kind,
						notify::EventKind::Modify(_)
							| notify::EventKind::Create(_)
							| notify::EventKind::Remove(_)
					) {
						let _ = tx.send(WatchSignal::Change);
					}
				}
				Err(e) => {
					let _ = tx.send(WatchSignal::Failure(e.to_string()));
				}
			}
		})
		.map_err(|e| KilnError::Watch(e.to_string()))?;
	watcher
		.watch(&config.content_folder, RecursiveMode::Recursive)
		.map_err(|e| KilnError::Watch(e.to_string()))?;
	if config.templates_folder != config.content_folder {
		watcher
			.watch(&config.templates_folder, RecursiveMode::Recursive)
			.map_err(|e| KilnError::Watch(e.to_string()))?;
	}

	let rebuild_path = config_path.to_path_buf();
	let closed = Arc::clone(closed);
	let on_fatal = Arc::clone(on_fatal);
	let thread = std::thread::spawn(move || {
		loop {
			match next_signal(&rx) {
				Some(WatchSignal::Change) => {}
				Some(WatchSignal::Failure(reason)) => {
					report_fatal(&closed, &on_fatal, KilnError::Watch(reason));
					break;
				}
				None => break,
			}
			tracing::info!("content change detected, rebuilding");
			if let Err(e) = build::build_from_config_file(&rebuild_path) {
				report_fatal(&closed, &on_fatal, e);
				break;
			}
		}
	});

	Ok(TreeWatcher { watcher, thread })
}

/// Watch the config file's folder and, when the config itself changes,
/// swap the content watcher for one reading the fresh folder layout. The
/// old watcher is joined first, so rebuilds never overlap.
fn spawn_config_watcher(
	config_path: &Path,
	content: Arc<Mutex<Option<TreeWatcher>>>,
	closed: &Arc<AtomicBool>,
	on_fatal: &FatalHook,
) -> KilnResult<TreeWatcher> {
	let (tx, rx) = mpsc::channel();
	let target = config_path.to_path_buf();
	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			match res {
				Ok(event) => {
					if matches!(
						event.kind,
						notify::EventKind::Modify(_)
							| notify::EventKind::Create(_)
							| notify::EventKind::Remove(_)
					) && event.paths.iter().any(|path| path == &target)
					{
						let _ = tx.send(WatchSignal::Change);
					}
				}
				Err(e) => {
					let _ = tx.send(WatchSignal::Failure(e.to_string()));
				}
			}
		})
		.map_err(|e| KilnError::Watch(e.to_string()))?;
	let parent = config_path.parent().unwrap_or_else(|| Path::new("."));
	watcher
		.watch(parent, RecursiveMode::NonRecursive)
		.map_err(|e| KilnError::Watch(e.to_string()))?;

	let reload_path = config_path.to_path_buf();
	let closed = Arc::clone(closed);
	let on_fatal = Arc::clone(on_fatal);
	let thread = std::thread::spawn(move || {
		loop {
			match next_signal(&rx) {
				Some(WatchSignal::Change) => {}
				Some(WatchSignal::Failure(reason)) => {
					report_fatal(&closed, &on_fatal, KilnError::Watch(reason));
					break;
				}
				None => break,
			}
			tracing::info!(config = %reload_path.display(), "config changed, restarting watchers");
			if let Err(e) = restart_content_watcher(&reload_path, &content, &closed, &on_fatal) {
				report_fatal(&closed, &on_fatal, e);
				break;
			}
			if let Err(e) = build::build_from_config_file(&reload_path) {
				report_fatal(&closed, &on_fatal, e);
				break;
			}
		}
	});

	Ok(TreeWatcher { watcher, thread })
}

fn restart_content_watcher(
	config_path: &Path,
	content: &Arc<Mutex<Option<TreeWatcher>>>,
	closed: &Arc<AtomicBool>,
	on_fatal: &FatalHook,
) -> KilnResult<()> {
	let previous = content
		.lock()
		.unwrap_or_else(PoisonError::into_inner)
		.take();
	if let Some(watcher) = previous {
		watcher.close();
	}

	let config = SiteConfig::load(config_path)?;
	let replacement = spawn_content_watcher(config_path, &config, closed, on_fatal)?;
	content
		.lock()
		.unwrap_or_else(PoisonError::into_inner)
		.replace(replacement);
	Ok(())
}
