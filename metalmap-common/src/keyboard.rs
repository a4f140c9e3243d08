//! Keyboard shortcuts
//!
//! `Escape` closes the modal. `r` resets the filters unless the user is
//! typing into an editable element.

use serde::{Deserialize, Serialize};

/// Key press as reported by the page
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct KeyPress {
    /// `KeyboardEvent.key`
    pub key: String,
    /// Lowercased tag name of the focused element
    #[serde(default)]
    pub target_tag: Option<String>,
    /// Whether the focused element is content-editable
    #[serde(default)]
    pub content_editable: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn in_element(mut self, tag: impl Into<String>) -> Self {
        self.target_tag = Some(tag.into());
        self
    }

    /// Focus is inside an input, textarea, select or editable element
    pub fn is_typing(&self) -> bool {
        let tag = self.target_tag.as_deref().unwrap_or("").to_lowercase();
        matches!(tag.as_str(), "input" | "textarea" | "select") || self.content_editable
    }
}

/// Action bound to a shortcut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    CloseModal,
    ResetFilters,
}

/// Resolve a key press to an action
pub fn shortcut_for(press: &KeyPress) -> Option<KeyAction> {
    if press.key == "Escape" {
        return Some(KeyAction::CloseModal);
    }
    if !press.is_typing() && press.key.eq_ignore_ascii_case("r") {
        return Some(KeyAction::ResetFilters);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_closes_even_while_typing() {
        assert_eq!(shortcut_for(&KeyPress::new("Escape")), Some(KeyAction::CloseModal));
        assert_eq!(
            shortcut_for(&KeyPress::new("Escape").in_element("input")),
            Some(KeyAction::CloseModal)
        );
    }

    #[test]
    fn test_r_resets_outside_inputs() {
        assert_eq!(shortcut_for(&KeyPress::new("r")), Some(KeyAction::ResetFilters));
        assert_eq!(shortcut_for(&KeyPress::new("R").in_element("div")), Some(KeyAction::ResetFilters));
    }

    #[test]
    fn test_r_ignored_while_typing() {
        for tag in ["input", "TEXTAREA", "select"] {
            assert_eq!(shortcut_for(&KeyPress::new("r").in_element(tag)), None);
        }
        let editable = KeyPress {
            key: "r".to_string(),
            target_tag: Some("div".to_string()),
            content_editable: true,
        };
        assert_eq!(shortcut_for(&editable), None);
    }

    #[test]
    fn test_other_keys_do_nothing() {
        assert_eq!(shortcut_for(&KeyPress::new("x")), None);
        assert_eq!(shortcut_for(&KeyPress::new("Enter")), None);
    }
}
