//! Configuration file watcher for hot reload.
//!
//! The parent directory is watched rather than the file itself: editors and
//! deploy tooling usually replace the file by rename, which a watch on the
//! old inode never sees.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::GatewayConfig;

/// Sends a fresh [`GatewayConfig`] whenever the file on disk changes meaningfully.
pub struct ConfigWatcher {
    path: PathBuf,
    current: GatewayConfig,
    update_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for configuration updates.
    ///
    /// `current` is the configuration already in effect; reloads equal to it
    /// are not sent.
    pub fn new(path: &Path, current: &GatewayConfig) -> (Self, mpsc::UnboundedReceiver<GatewayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            current: current.clone(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            mut current,
            update_tx,
        } = self;
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = path.file_name().map(ToOwned::to_owned);
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let touches_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(ToOwned::to_owned) == file_name);
                    if !touches_config || event.kind.is_access() || event.kind.is_remove() {
                        return;
                    }
                    if let Some(next) = reload(&watched, &mut current) {
                        let _ = update_tx.send(next);
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}

/// Re-read `path`. Returns the new configuration only when it differs from `current`.
///
/// A file that fails to load or validate leaves `current` in effect.
fn reload(path: &Path, current: &mut GatewayConfig) -> Option<GatewayConfig> {
    let next = match load_config(path) {
        Ok(next) => next,
        Err(e) => {
            tracing::error!(path = ?path, error = %e, "Failed to reload config, keeping current configuration");
            return None;
        }
    };

    if next == *current {
        tracing::debug!(path = ?path, "Config file touched without changes");
        return None;
    }

    if next.upstream.backend_url != current.upstream.backend_url {
        tracing::info!(
            from = ?current.upstream.backend_url,
            to = ?next.upstream.backend_url,
            "Backend origin changed"
        );
    }
    if next.listener != current.listener {
        tracing::warn!("Listener changes take effect only after a restart");
    }

    *current = next.clone();
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_config(content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("gateway-watch-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn unchanged_file_is_not_resent() {
        let path = temp_config("[upstream]\nbackend_url = \"http://backend.test\"\n");
        let mut current = load_config(&path).unwrap();

        assert!(reload(&path, &mut current).is_none());

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn changed_file_replaces_current() {
        let path = temp_config("[upstream]\nbackend_url = \"http://backend.test\"\n");
        let mut current = load_config(&path).unwrap();

        fs::write(&path, "deployment = \"production\"\n[upstream]\nbackend_url = \"http://backend.test\"\n").unwrap();
        let next = reload(&path, &mut current).unwrap();

        assert!(next.is_production());
        assert_eq!(current, next);

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn invalid_file_keeps_current() {
        let path = temp_config("[upstream]\nbackend_url = \"http://backend.test\"\n");
        let mut current = load_config(&path).unwrap();
        let before = current.clone();

        fs::write(&path, "[listener\nbroken").unwrap();

        assert!(reload(&path, &mut current).is_none());
        assert_eq!(current, before);

        fs::remove_file(path).unwrap();
    }
}
