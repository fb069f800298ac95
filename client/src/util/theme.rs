//! Theme preference: read once at startup, written on toggle.
//!
//! The stored value under [`STORAGE_KEY`] wins; without one the platform's
//! dark/light signal decides. The store owns its [`PreferenceStore`] so the
//! preference has exactly one writer.

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

use std::fmt;

use super::preferences::{PreferenceStore, PrefsError};

pub const STORAGE_KEY: &str = "theme";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse a stored value. Anything other than `"dark"`/`"light"` is `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    #[must_use]
    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal dark-background detection from a `COLORFGBG` value such as
/// `"15;0"`. The last field is the background colour index; 0-6 and 8 are
/// dark. Absent or unparseable means light.
#[must_use]
pub fn system_prefers_dark(colorfgbg: Option<&str>) -> bool {
    colorfgbg
        .and_then(|raw| raw.rsplit(';').next())
        .and_then(|bg| bg.trim().parse::<u8>().ok())
        .map_or(false, |bg| bg <= 6 || bg == 8)
}

pub struct ThemeStore {
    prefs: Box<dyn PreferenceStore>,
    current: Theme,
}

impl ThemeStore {
    /// Read the stored preference, falling back to `system_prefers_dark`.
    pub fn load(prefs: Box<dyn PreferenceStore>, system_prefers_dark: bool) -> Self {
        let stored = prefs.get(STORAGE_KEY).and_then(|raw| Theme::parse(&raw));
        let current = stored.unwrap_or(if system_prefers_dark { Theme::Dark } else { Theme::Light });
        tracing::debug!(theme = %current, from_storage = stored.is_some(), "theme loaded");
        Self { prefs, current }
    }

    #[must_use]
    pub fn current(&self) -> Theme {
        self.current
    }

    /// Switch to `theme` and persist it.
    ///
    /// # Errors
    ///
    /// Returns a [`PrefsError`] if persisting fails; the in-memory theme is
    /// still updated.
    pub fn set(&mut self, theme: Theme) -> Result<(), PrefsError> {
        self.current = theme;
        self.prefs.set(STORAGE_KEY, theme.as_str())
    }

    /// Flip the theme, persist it, and return the new value.
    ///
    /// # Errors
    ///
    /// See [`ThemeStore::set`].
    pub fn toggle(&mut self) -> Result<Theme, PrefsError> {
        let next = self.current.toggled();
        self.set(next)?;
        Ok(next)
    }
}
