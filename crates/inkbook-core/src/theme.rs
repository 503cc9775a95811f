//! Light and dark UI themes.

use crate::storage::{KeyValueStore, StorageResult, THEME_KEY};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn name(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Parse a stored name; anything unrecognized is the default theme.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "light" => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// CSS custom properties applied to the document root.
    pub fn css_variables(self) -> [(&'static str, &'static str); 5] {
        match self {
            Theme::Dark => [
                ("--background-color", "#0D1B2A"),
                ("--text-color", "#E0E1DD"),
                ("--sidebar-color", "#1B263B"),
                ("--accent-color", "#415A77"),
                ("--canvas-background", "#FFFFFF"),
            ],
            Theme::Light => [
                ("--background-color", "#FFFFFF"),
                ("--text-color", "#000000"),
                ("--sidebar-color", "#E0E1DD"),
                ("--accent-color", "#A9A9A9"),
                ("--canvas-background", "#FFFFFF"),
            ],
        }
    }

    /// The stored theme, stored as a bare name rather than JSON.
    pub async fn load<S: KeyValueStore + ?Sized>(store: &S) -> StorageResult<Self> {
        Ok(store
            .load(THEME_KEY)
            .await?
            .map(|name| Self::from_name(&name))
            .unwrap_or_default())
    }

    pub async fn save<S: KeyValueStore + ?Sized>(self, store: &S) -> StorageResult<()> {
        store.save(THEME_KEY, self.name()).await
    }

    /// Switch theme and persist the choice.
    pub async fn toggle<S: KeyValueStore + ?Sized>(store: &S) -> StorageResult<Self> {
        let next = Self::load(store).await?.toggled();
        next.save(store).await?;
        log::info!("Theme switched to {}", next.name());
        Ok(next)
    }
}
