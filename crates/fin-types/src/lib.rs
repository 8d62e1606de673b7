//! Shared types for fin launcher components.
//!
//! This crate provides the result model exchanged with the provider, the
//! provider catalog types, and the UI updates emitted by the session core.
//! All types are serializable for RPC transport.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Deref;
use std::path::PathBuf;

/// What happens when a result is activated.
///
/// Serialized externally tagged (`{"Open": "/path"}`), matching the provider wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Launch the application bundle or executable at the path
    LaunchApplication(PathBuf),
    /// Reveal the path in the file manager
    Open(PathBuf),
    /// Copy text to the clipboard
    Copy(String),
    /// Filesystem entry from the indexing provider
    FsEntry(FsEntry),
    /// Calculator output
    Calculation(f64),
}

/// Kind of an indexed filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum EntryKind {
    File,
    Directory,
    Application,
    Unknown,
}

impl EntryKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
            EntryKind::Application => "application",
            EntryKind::Unknown => "unknown",
        }
    }
}

impl From<&str> for EntryKind {
    fn from(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "file" => EntryKind::File,
            "directory" | "dir" => EntryKind::Directory,
            "application" | "app" => EntryKind::Application,
            _ => EntryKind::Unknown,
        }
    }
}

impl From<String> for EntryKind {
    fn from(value: String) -> Self {
        EntryKind::from(value.as_str())
    }
}

/// Filesystem entry as reported by the indexing provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FsEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
    #[serde(default)]
    pub ctime: i64,
    #[serde(default)]
    pub mtime: i64,
    #[serde(default)]
    pub atime: i64,
}

/// A displayable search result.
///
/// Deserializes from either provider shape: the generic
/// `{title, description, icon, priority, action}` record, or a bare typed
/// record (`{"FsEntry": {..}}` / `{"Calculation": 4.0}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireResult")]
pub struct SearchResult {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub priority: i32,
    pub action: Action,
}

impl SearchResult {
    #[must_use]
    pub fn new(title: impl Into<String>, action: Action) -> Self {
        Self {
            title: title.into(),
            description: None,
            icon: None,
            priority: 0,
            action,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl From<FsEntry> for SearchResult {
    fn from(entry: FsEntry) -> Self {
        Self::new(entry.name.clone(), Action::FsEntry(entry))
    }
}

impl From<f64> for SearchResult {
    fn from(value: f64) -> Self {
        Self::new(value.to_string(), Action::Calculation(value))
    }
}

#[derive(Deserialize)]
struct GenericResult {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    priority: i32,
    action: Action,
}

#[derive(Deserialize)]
enum TypedResult {
    FsEntry(FsEntry),
    Calculation(f64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireResult {
    Generic(GenericResult),
    Typed(TypedResult),
}

impl From<WireResult> for SearchResult {
    fn from(wire: WireResult) -> Self {
        match wire {
            WireResult::Generic(r) => Self {
                title: r.title,
                description: r.description,
                icon: r.icon,
                priority: r.priority,
                action: r.action,
            },
            WireResult::Typed(TypedResult::FsEntry(entry)) => entry.into(),
            WireResult::Typed(TypedResult::Calculation(value)) => value.into(),
        }
    }
}

/// Results ordered by priority, highest first.
///
/// Only constructible through [`ResultSet::sorted`], so the ordering holds for
/// every instance. Ties keep arrival order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<SearchResult>")]
pub struct ResultSet(Vec<SearchResult>);

impl ResultSet {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sorted(mut results: Vec<SearchResult>) -> Self {
        // sort_by is stable
        results.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self(results)
    }
}

impl From<Vec<SearchResult>> for ResultSet {
    fn from(results: Vec<SearchResult>) -> Self {
        Self::sorted(results)
    }
}

impl Deref for ResultSet {
    type Target = [SearchResult];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a SearchResult;
    type IntoIter = std::slice::Iter<'a, SearchResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Provider plugin metadata shown on the settings surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMetadata {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Provider plugin entry from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub metadata: PluginMetadata,
    #[serde(default)]
    pub config: HashMap<String, String>,
}

/// Provider catalog keyed by plugin name
pub type PluginCatalog = HashMap<String, PluginInfo>;

/// Window size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    /// Query field only
    Collapsed,
    /// Query field plus result list
    Expanded,
}

/// Logical window size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    pub size: SizeClass,
    pub width: u32,
    pub height: u32,
}

/// Updates sent from the session core to the window collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiUpdate {
    /// Query text replaced (clear or history recall)
    Query { query: String },

    /// Result list replaced
    Results { results: ResultSet },

    /// Window should take this geometry
    Resize { geometry: Geometry },

    /// Result row gains keyboard focus and is scrolled into view (smooth, nearest edge)
    FocusRow { index: usize },

    /// Query field regains keyboard focus
    FocusInput,

    /// Window should hide
    Hide,

    /// Settings page requested
    OpenSettings,
}
