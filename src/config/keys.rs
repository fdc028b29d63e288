//! Key label parsing and matching.

use super::types::KeyBindings;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fmt;
use std::str::FromStr;

/// A single parsed key label such as `ctrl+c` or `enter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    /// Whether a terminal key event triggers this binding.
    ///
    /// Shift is ignored for character keys since it is already reflected in the char.
    #[must_use]
    pub fn matches(&self, key: &KeyEvent) -> bool {
        if key.code != self.code {
            return false;
        }
        let mut mods = key.modifiers;
        if matches!(key.code, KeyCode::Char(_)) {
            mods.remove(KeyModifiers::SHIFT);
        }
        mods == self.modifiers
    }
}

/// Error for an unrecognised key label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyParseError(pub String);

impl fmt::Display for KeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognised key label '{}'", self.0)
    }
}

impl std::error::Error for KeyParseError {}

impl FromStr for KeySpec {
    type Err = KeyParseError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let err = || KeyParseError(label.to_string());
        let mut modifiers = KeyModifiers::NONE;
        let mut rest = label;

        // Split on '+' unless the key itself is '+'
        while let Some((prefix, tail)) = rest.split_once('+') {
            if tail.is_empty() {
                break;
            }
            match prefix.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                _ => return Err(err()),
            }
            rest = tail;
        }

        let code = match rest.to_ascii_lowercase().as_str() {
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "space" => KeyCode::Char(' '),
            "tab" => KeyCode::Tab,
            "backspace" => KeyCode::Backspace,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pgup" | "pageup" => KeyCode::PageUp,
            "pgdown" | "pagedown" => KeyCode::PageDown,
            _ => {
                let mut chars = rest.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return Err(err()),
                }
            }
        };

        Ok(Self { code, modifiers })
    }
}

/// Parsed set of labels bound to one action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet {
    specs: Vec<KeySpec>,
    /// First label, shown in hints
    pub hint: String,
}

impl KeySet {
    /// Parse every label, failing on the first bad one.
    pub fn parse(labels: &[String]) -> Result<Self, KeyParseError> {
        let specs = labels
            .iter()
            .map(|l| l.parse())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            specs,
            hint: labels.first().cloned().unwrap_or_default(),
        })
    }

    #[must_use]
    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.specs.iter().any(|s| s.matches(key))
    }
}

/// Every controller action with its parsed key set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    pub quit: KeySet,
    pub search: KeySet,
    pub enter: KeySet,
    pub scan: KeySet,
    pub help: KeySet,
    pub theme: KeySet,
}

impl Keymap {
    pub fn from_bindings(bindings: &KeyBindings) -> Result<Self, KeyParseError> {
        Ok(Self {
            quit: KeySet::parse(&bindings.quit)?,
            search: KeySet::parse(&bindings.search)?,
            enter: KeySet::parse(&bindings.enter)?,
            scan: KeySet::parse(&bindings.scan)?,
            help: KeySet::parse(&bindings.help)?,
            theme: KeySet::parse(&bindings.theme)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_parse_named_and_char_keys() {
        let spec: KeySpec = "enter".parse().unwrap();
        assert_eq!(spec.code, KeyCode::Enter);

        let spec: KeySpec = "ctrl+c".parse().unwrap();
        assert_eq!(spec.code, KeyCode::Char('c'));
        assert_eq!(spec.modifiers, KeyModifiers::CONTROL);

        let spec: KeySpec = "+".parse().unwrap();
        assert_eq!(spec.code, KeyCode::Char('+'));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("hyper+x".parse::<KeySpec>().is_err());
        assert!("nope".parse::<KeySpec>().is_err());
    }

    #[test]
    fn test_shift_ignored_for_chars() {
        let spec: KeySpec = "T".parse().unwrap();
        assert!(spec.matches(&key(KeyCode::Char('T'), KeyModifiers::SHIFT)));
        assert!(!spec.matches(&key(KeyCode::Char('t'), KeyModifiers::NONE)));

        let ctrl: KeySpec = "ctrl+c".parse().unwrap();
        assert!(!ctrl.matches(&key(KeyCode::Char('c'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_key_set_hint() {
        let set = KeySet::parse(&["q".to_string(), "ctrl+c".to_string()]).unwrap();
        assert_eq!(set.hint, "q");
        assert!(set.matches(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn test_keymap_from_default_bindings() {
        let keymap = Keymap::from_bindings(&KeyBindings::default()).unwrap();
        assert!(keymap.enter.matches(&key(KeyCode::Char(' '), KeyModifiers::NONE)));
        assert!(keymap.search.matches(&key(KeyCode::Char('/'), KeyModifiers::NONE)));
        assert_eq!(keymap.help.hint, "?");

        let bad = KeyBindings {
            scan: vec!["meta+r".to_string()],
            ..KeyBindings::default()
        };
        assert!(Keymap::from_bindings(&bad).is_err());
    }
}
