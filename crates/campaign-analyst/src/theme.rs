//! Visual theme state and the scoped light-presentation override used while
//! capturing a view for export.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// Light or dark presentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark text on white.
    #[default]
    Light,
    /// Light text on slate.
    Dark,
}

impl Theme {
    /// Returns true for the dark theme.
    #[must_use]
    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    /// The other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// CSS class applied to the page root.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Live theme of the view, shared between handlers.
#[derive(Debug, Clone, Default)]
pub struct ThemeState {
    inner: Arc<RwLock<Slot>>,
}

/// The theme plus a counter bumped by every [`ThemeState::set`].
#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    theme: Theme,
    changes: u64,
}

impl ThemeState {
    /// Create state holding `theme`.
    #[must_use]
    pub fn new(theme: Theme) -> Self {
        Self { inner: Arc::new(RwLock::new(Slot { theme, changes: 0 })) }
    }

    fn slot(&self) -> Slot {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current theme.
    #[must_use]
    pub fn current(&self) -> Theme {
        self.slot().theme
    }

    /// Replace the current theme.
    pub fn set(&self, theme: Theme) {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        slot.theme = theme;
        slot.changes = slot.changes.wrapping_add(1);
    }

    /// Force the light theme until the returned guard is dropped.
    ///
    /// The original theme is restored on every exit path, including early
    /// returns and panics in the guarded scope. A [`set`](Self::set) made
    /// while the guard is held wins over the restore.
    #[must_use = "the theme is restored as soon as the guard is dropped"]
    pub fn force_light(&self) -> PresentationGuard {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let original = slot.theme;
        if original.is_dark() {
            tracing::debug!("Switching to light theme for capture");
            slot.theme = Theme::Light;
        }
        let forced_at = slot.changes;
        drop(slot);

        PresentationGuard { state: self.clone(), original, forced_at }
    }

    /// Put `original` back unless the theme was set after `forced_at`.
    fn restore(&self, original: Theme, forced_at: u64) {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if slot.changes == forced_at {
            slot.theme = original;
        } else {
            tracing::debug!(theme = ?slot.theme, "Theme changed during capture, keeping the new value");
        }
    }
}

/// Restores the theme that was active before [`ThemeState::force_light`].
#[derive(Debug)]
pub struct PresentationGuard {
    state: ThemeState,
    original: Theme,
    forced_at: u64,
}

impl PresentationGuard {
    /// The theme that will be restored.
    #[must_use]
    pub const fn original(&self) -> Theme {
        self.original
    }
}

impl Drop for PresentationGuard {
    fn drop(&mut self) {
        if self.original.is_dark() {
            tracing::debug!("Restoring dark theme after capture");
            self.state.restore(self.original, self.forced_at);
        }
    }
}
