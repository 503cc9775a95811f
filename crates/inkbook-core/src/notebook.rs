//! Notebooks, pages and paper types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Notebook validation and navigation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotebookError {
    #[error("Notebook name cannot be empty.")]
    EmptyName,
    #[error("Notebook already exists: {0}")]
    Duplicate(String),
    #[error("Notebook not found: {0}")]
    NotFound(String),
    #[error("Page {page} is out of range (notebook has {count} pages)")]
    PageOutOfRange { page: usize, count: usize },
}

/// Background texture bound to a notebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaperType {
    #[default]
    Plain,
    Lined,
    Grid,
    Dotted,
}

impl PaperType {
    pub const ALL: [PaperType; 4] = [
        PaperType::Plain,
        PaperType::Lined,
        PaperType::Grid,
        PaperType::Dotted,
    ];

    /// Storage name, also used for asset lookup.
    pub fn name(self) -> &'static str {
        match self {
            PaperType::Plain => "plain",
            PaperType::Lined => "lined",
            PaperType::Grid => "grid",
            PaperType::Dotted => "dotted",
        }
    }

    /// Relative URL of the background image served next to the web app.
    pub fn asset_path(self) -> String {
        format!("images/{}.png", self.name())
    }
}

impl fmt::Display for PaperType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PaperType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaperType::ALL
            .into_iter()
            .find(|paper| paper.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown paper type: {s}"))
    }
}

impl From<String> for PaperType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            log::warn!("Unknown paper type {:?}, using plain", value);
            PaperType::Plain
        })
    }
}

impl From<PaperType> for String {
    fn from(paper: PaperType) -> Self {
        paper.name().to_string()
    }
}

/// One notebook page: a serialized raster image, empty when untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Page(String);

impl Page {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn from_bitmap(bitmap: impl Into<String>) -> Self {
        Self(bitmap.into())
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }

    /// The stored bitmap, if the page has been drawn on.
    pub fn bitmap(&self) -> Option<&str> {
        if self.is_blank() { None } else { Some(&self.0) }
    }
}

/// A named notebook's pages and paper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notebook {
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(rename = "paperType", default)]
    pub paper_type: PaperType,
}

impl Notebook {
    pub fn new(paper_type: PaperType) -> Self {
        Self {
            pages: Vec::new(),
            paper_type,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Get a page by its 1-based number.
    pub fn page(&self, number: usize) -> Option<&Page> {
        number.checked_sub(1).and_then(|index| self.pages.get(index))
    }

    /// Replace the page at a 1-based number.
    pub fn set_page(&mut self, number: usize, page: Page) -> Result<(), NotebookError> {
        let count = self.pages.len();
        let slot = number
            .checked_sub(1)
            .and_then(|index| self.pages.get_mut(index))
            .ok_or(NotebookError::PageOutOfRange {
                page: number,
                count,
            })?;
        *slot = page;
        Ok(())
    }

    /// Append a blank page and return its 1-based number.
    pub fn add_page(&mut self) -> usize {
        self.pages.push(Page::blank());
        self.pages.len()
    }

    /// Make sure an opened notebook has something to show.
    /// Returns true if a page was added.
    pub fn ensure_first_page(&mut self) -> bool {
        if self.pages.is_empty() {
            self.pages.push(Page::blank());
            true
        } else {
            false
        }
    }
}

/// A user's notebook collection, keyed by notebook name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Notebooks {
    entries: BTreeMap<String, Notebook>,
}

impl Notebooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty notebook. The name is trimmed before validation;
    /// on error the collection is left untouched.
    pub fn create(&mut self, name: &str, paper_type: PaperType) -> Result<String, NotebookError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(NotebookError::EmptyName);
        }
        if self.entries.contains_key(name) {
            return Err(NotebookError::Duplicate(name.to_string()));
        }
        self.entries.insert(name.to_string(), Notebook::new(paper_type));
        Ok(name.to_string())
    }

    pub fn get(&self, name: &str) -> Option<&Notebook> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Notebook> {
        self.entries.get_mut(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the collection to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize a collection from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Sidebar label for a notebook: first character uppercased.
pub fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
