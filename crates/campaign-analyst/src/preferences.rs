//! Local persisted preferences: theme and notification settings.
//!
//! Read once at startup, rewritten whenever changed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::PreferencesError;
use crate::theme::Theme;

/// Notification toggles shown on the settings page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    /// Alerts for critical campaign changes.
    pub critical_alerts: bool,
    /// Weekly performance summary.
    pub weekly_summary: bool,
    /// Product announcements.
    pub new_feature_updates: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self { critical_alerts: true, weekly_summary: true, new_feature_updates: false }
    }
}

/// Everything persisted for one installation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Preferred theme.
    #[serde(default)]
    pub theme: Theme,
    /// Notification toggles.
    #[serde(default)]
    pub notifications: NotificationPreferences,
}

/// File-backed preferences.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    current: Arc<RwLock<Preferences>>,
}

impl PreferenceStore {
    /// Load preferences from `path`.
    ///
    /// A missing or unreadable file yields defaults; the problem is logged
    /// and the file is rewritten on the next change.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let prefs = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|error| {
                tracing::warn!(path = %path.display(), %error, "Ignoring corrupt preferences file");
                Preferences::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Preferences::default(),
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "Could not read preferences file");
                Preferences::default()
            }
        };

        Self { path, current: Arc::new(RwLock::new(prefs)) }
    }

    /// Current preferences.
    pub async fn get(&self) -> Preferences {
        *self.current.read().await
    }

    /// Replace preferences and persist them.
    pub async fn replace(&self, prefs: Preferences) -> Result<Preferences, PreferencesError> {
        self.update(|p| *p = prefs).await
    }

    /// Modify preferences in place and persist them.
    ///
    /// The in-memory value only changes when the write succeeds.
    pub async fn update<F>(&self, f: F) -> Result<Preferences, PreferencesError>
    where
        F: FnOnce(&mut Preferences),
    {
        let mut guard = self.current.write().await;
        let mut next = *guard;
        f(&mut next);

        write_atomically(&self.path, &serde_json::to_vec_pretty(&next)?).await?;
        *guard = next;

        tracing::debug!(path = %self.path.display(), theme = ?next.theme, "Saved preferences");
        Ok(next)
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::load(dir.path().join("prefs.json")).await;
        let prefs = store.get().await;
        assert_eq!(prefs, Preferences::default());
        assert!(prefs.notifications.critical_alerts);
        assert!(!prefs.notifications.new_feature_updates);
    }

    #[tokio::test]
    async fn test_update_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        let store = PreferenceStore::load(&path).await;
        store.update(|p| p.theme = Theme::Dark).await.unwrap();

        let reloaded = PreferenceStore::load(&path).await;
        assert_eq!(reloaded.get().await.theme, Theme::Dark);
    }

    #[tokio::test]
    async fn test_corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        let store = PreferenceStore::load(&path).await;
        assert_eq!(store.get().await, Preferences::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let prefs: Preferences = serde_json::from_str(r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(prefs.theme, Theme::Dark);
        assert_eq!(prefs.notifications, NotificationPreferences::default());
    }
}
