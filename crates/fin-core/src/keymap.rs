//! Keyboard shortcut parsing and the logical key actions they map to.
//!
//! The core never sees toolkit key events. A front end translates its events
//! into a [`KeyChord`] and asks the [`Keymap`] which [`KeyAction`] it means.

use std::collections::BTreeMap;
use std::fmt;

use tracing::warn;

use crate::config::KeymapConfig;

/// Logical keyboard actions the session understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyAction {
    /// Clear the query, or hide the window if it is already empty
    Clear,
    /// Move the selection down
    Next,
    /// Move the selection up
    Previous,
    /// Recall an older query
    HistoryBack,
    /// Recall a newer query
    HistoryForward,
    /// Dispatch the selected result's action
    Activate,
    /// Show the settings page
    OpenSettings,
}

impl KeyAction {
    pub const ALL: [KeyAction; 7] = [
        KeyAction::Clear,
        KeyAction::Next,
        KeyAction::Previous,
        KeyAction::HistoryBack,
        KeyAction::HistoryForward,
        KeyAction::Activate,
        KeyAction::OpenSettings,
    ];

    /// Config key for this action
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            KeyAction::Clear => "clear",
            KeyAction::Next => "next",
            KeyAction::Previous => "previous",
            KeyAction::HistoryBack => "historyBack",
            KeyAction::HistoryForward => "historyForward",
            KeyAction::Activate => "activate",
            KeyAction::OpenSettings => "openSettings",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == name)
    }

    fn default_shortcuts(self) -> &'static [&'static str] {
        match self {
            KeyAction::Clear => &["Escape", "Ctrl+["],
            KeyAction::Next => &["ArrowDown", "Ctrl+J"],
            KeyAction::Previous => &["ArrowUp", "Ctrl+K"],
            KeyAction::HistoryBack => &["Ctrl+P"],
            KeyAction::HistoryForward => &["Ctrl+N"],
            KeyAction::Activate => &["Enter"],
            KeyAction::OpenSettings => &["Meta+Comma"],
        }
    }
}

impl fmt::Display for KeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-modifier key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// Printable key, letters normalized to lowercase
    Char(char),
}

impl Key {
    /// Parse a key name such as `"ArrowDown"`, `"comma"` or `"j"`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        Some(match lower.as_str() {
            "escape" | "esc" => Key::Escape,
            "enter" | "return" => Key::Enter,
            "tab" => Key::Tab,
            "arrowup" | "up" => Key::ArrowUp,
            "arrowdown" | "down" => Key::ArrowDown,
            "arrowleft" | "left" => Key::ArrowLeft,
            "arrowright" | "right" => Key::ArrowRight,
            "comma" => Key::Char(','),
            "period" => Key::Char('.'),
            "plus" => Key::Char('+'),
            "space" => Key::Char(' '),
            "bracketleft" => Key::Char('['),
            "bracketright" => Key::Char(']'),
            _ => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => return None,
                }
            }
        })
    }
}

/// A key plus the modifiers held with it
// One flag per modifier key, as in the shortcut syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyChord {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyChord {
    #[must_use]
    pub fn new(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
            alt: false,
            meta: false,
        }
    }

    #[must_use]
    pub fn ctrl(key: Key) -> Self {
        Self {
            ctrl: true,
            ..Self::new(key)
        }
    }

    /// Parse a shortcut string such as `"Ctrl+J"` or `"meta + comma"`.
    ///
    /// Returns `None` when there is no key part, more than one key part, or
    /// an unknown key name.
    #[must_use]
    pub fn parse(shortcut: &str) -> Option<Self> {
        let mut ctrl = false;
        let mut shift = false;
        let mut alt = false;
        let mut meta = false;
        let mut key = None;

        for part in shortcut.split('+').map(str::trim) {
            match part.to_lowercase().as_str() {
                "" => return None,
                "ctrl" | "control" => ctrl = true,
                "shift" => shift = true,
                "alt" | "option" => alt = true,
                "meta" | "cmd" | "super" => meta = true,
                _ if key.is_some() => return None,
                _ => key = Some(Key::parse(part)?),
            }
        }

        Some(Self {
            key: key?,
            ctrl,
            shift,
            alt,
            meta,
        })
    }
}

/// Shortcut table resolving chords to actions.
///
/// When two actions claim the same chord, the one listed first in
/// [`KeyAction::ALL`] wins.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: Vec<(KeyChord, KeyAction)>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self::from_config(&KeymapConfig::default())
    }
}

impl Keymap {
    /// Build the keymap from defaults, replacing every action named in `config`.
    #[must_use]
    pub fn from_config(config: &KeymapConfig) -> Self {
        let mut table: BTreeMap<KeyAction, Vec<KeyChord>> = KeyAction::ALL
            .into_iter()
            .map(|action| {
                let chords = action
                    .default_shortcuts()
                    .iter()
                    .filter_map(|s| KeyChord::parse(s))
                    .collect();
                (action, chords)
            })
            .collect();

        for (name, shortcuts) in config.iter() {
            let Some(action) = KeyAction::from_name(name) else {
                warn!("Ignoring keymap entry for unknown action: {name}");
                continue;
            };
            let chords = shortcuts
                .iter()
                .filter_map(|shortcut| {
                    let chord = KeyChord::parse(shortcut);
                    if chord.is_none() {
                        warn!("Ignoring unparseable shortcut for {action}: {shortcut:?}");
                    }
                    chord
                })
                .collect();
            table.insert(action, chords);
        }

        let bindings = table
            .into_iter()
            .flat_map(|(action, chords)| chords.into_iter().map(move |chord| (chord, action)))
            .collect();
        Self { bindings }
    }

    #[must_use]
    pub fn resolve(&self, chord: &KeyChord) -> Option<KeyAction> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound == chord)
            .map(|(_, action)| *action)
    }

    /// Parse `shortcut` and resolve it in one step.
    #[must_use]
    pub fn resolve_str(&self, shortcut: &str) -> Option<KeyAction> {
        self.resolve(&KeyChord::parse(shortcut)?)
    }

    pub fn chords_for(&self, action: KeyAction) -> impl Iterator<Item = &KeyChord> {
        self.bindings
            .iter()
            .filter(move |(_, a)| *a == action)
            .map(|(chord, _)| chord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_keys() {
        assert_eq!(KeyChord::parse("Escape"), Some(KeyChord::new(Key::Escape)));
        assert_eq!(KeyChord::parse("enter"), Some(KeyChord::new(Key::Enter)));
        assert_eq!(
            KeyChord::parse("ArrowDown"),
            Some(KeyChord::new(Key::ArrowDown))
        );
    }

    #[test]
    fn test_parse_modifiers_case_and_whitespace() {
        assert_eq!(KeyChord::parse("Ctrl+J"), Some(KeyChord::ctrl(Key::Char('j'))));
        assert_eq!(
            KeyChord::parse(" control + j "),
            Some(KeyChord::ctrl(Key::Char('j')))
        );

        let chord = KeyChord::parse("Cmd+Shift+Comma").unwrap();
        assert!(chord.meta && chord.shift && !chord.ctrl && !chord.alt);
        assert_eq!(chord.key, Key::Char(','));

        let chord = KeyChord::parse("option+up").unwrap();
        assert!(chord.alt);
        assert_eq!(chord.key, Key::ArrowUp);
    }

    #[test]
    fn test_parse_bracket_chord() {
        assert_eq!(KeyChord::parse("Ctrl+["), Some(KeyChord::ctrl(Key::Char('['))));
        assert_eq!(
            KeyChord::parse("ctrl+bracketleft"),
            Some(KeyChord::ctrl(Key::Char('[')))
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(KeyChord::parse(""), None);
        assert_eq!(KeyChord::parse("Ctrl"), None);
        assert_eq!(KeyChord::parse("Ctrl+"), None);
        assert_eq!(KeyChord::parse("Ctrl+J+K"), None);
        assert_eq!(KeyChord::parse("Hyper+J"), None);
        assert_eq!(KeyChord::parse("PageDown"), None);
    }

    #[test]
    fn test_default_bindings() {
        let keymap = Keymap::default();
        assert_eq!(keymap.resolve_str("Escape"), Some(KeyAction::Clear));
        assert_eq!(keymap.resolve_str("Ctrl+["), Some(KeyAction::Clear));
        assert_eq!(keymap.resolve_str("ArrowDown"), Some(KeyAction::Next));
        assert_eq!(keymap.resolve_str("Ctrl+J"), Some(KeyAction::Next));
        assert_eq!(keymap.resolve_str("ArrowUp"), Some(KeyAction::Previous));
        assert_eq!(keymap.resolve_str("Ctrl+K"), Some(KeyAction::Previous));
        assert_eq!(keymap.resolve_str("Ctrl+P"), Some(KeyAction::HistoryBack));
        assert_eq!(keymap.resolve_str("Ctrl+N"), Some(KeyAction::HistoryForward));
        assert_eq!(keymap.resolve_str("Enter"), Some(KeyAction::Activate));
        assert_eq!(keymap.resolve_str("Meta+Comma"), Some(KeyAction::OpenSettings));
        assert_eq!(keymap.resolve_str("J"), None);
        assert_eq!(keymap.resolve_str("Shift+Enter"), None);
    }

    #[test]
    fn test_config_replaces_action_bindings() {
        let mut overrides = BTreeMap::new();
        overrides.insert("next".to_string(), vec!["Tab".to_string()]);
        let keymap = Keymap::from_config(&KeymapConfig(overrides));

        assert_eq!(keymap.resolve_str("Tab"), Some(KeyAction::Next));
        assert_eq!(keymap.resolve_str("ArrowDown"), None);
        assert_eq!(keymap.resolve_str("Ctrl+J"), None);
        assert_eq!(keymap.resolve_str("ArrowUp"), Some(KeyAction::Previous));
    }

    #[test]
    fn test_config_skips_bad_entries() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            "clear".to_string(),
            vec!["Ctrl+G".to_string(), "Ctrl+Nope".to_string()],
        );
        overrides.insert("explode".to_string(), vec!["Ctrl+X".to_string()]);
        let keymap = Keymap::from_config(&KeymapConfig(overrides));

        assert_eq!(keymap.chords_for(KeyAction::Clear).count(), 1);
        assert_eq!(keymap.resolve_str("Ctrl+G"), Some(KeyAction::Clear));
        assert_eq!(keymap.resolve_str("Ctrl+X"), None);
    }

    #[test]
    fn test_action_names_round_trip() {
        for action in KeyAction::ALL {
            assert_eq!(KeyAction::from_name(action.as_str()), Some(action));
        }
        assert_eq!(KeyAction::from_name("Clear"), None);
    }
}
