/*
 * The per-session checkbox state of the theme tree. Toggling a theme through
 * `set_checked_cascading` writes the same flag onto every descendant, which is
 * what the user sees in the tree. Expansion does not depend on that cascade
 * having run; see `taxonomy::expand`.
 */
use super::taxonomy::{Taxonomy, ThemeNode};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    checked: HashMap<String, bool>,
}

impl SelectionState {
    pub fn new() -> Self {
        SelectionState {
            checked: HashMap::new(),
        }
    }

    /// Absent entries read as unchecked.
    pub fn is_checked(&self, theme: &str) -> bool {
        self.checked.get(theme).copied().unwrap_or(false)
    }

    /// Sets a single flag without touching descendants.
    pub fn set_checked(&mut self, theme: &str, checked: bool) {
        self.checked.insert(theme.to_string(), checked);
    }

    /*
     * Sets `theme` and all of its descendants to `checked`.
     * Returns the names that were written, parent first, so the caller can refresh
     * the corresponding check boxes. An unknown theme name leaves the state untouched.
     */
    pub fn set_checked_cascading(
        &mut self,
        taxonomy: &Taxonomy,
        theme: &str,
        checked: bool,
    ) -> Vec<String> {
        let Some(node) = taxonomy.find(theme) else {
            log::warn!("SelectionState: Ignoring toggle of unknown theme '{theme}'.");
            return Vec::new();
        };
        let mut written = Vec::new();
        self.apply_recursive(node, checked, &mut written);
        log::trace!(
            "SelectionState: Set '{theme}' to {checked}, cascaded onto {} themes.",
            written.len()
        );
        written
    }

    fn apply_recursive(&mut self, node: &ThemeNode, checked: bool, written: &mut Vec<String>) {
        self.set_checked(&node.name, checked);
        written.push(node.name.clone());
        for child in &node.children {
            self.apply_recursive(child, checked, written);
        }
    }

    pub fn checked_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .checked
            .iter()
            .filter(|(_, checked)| **checked)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Unchecks everything. Returns the names that were checked before, sorted.
    pub fn clear(&mut self) -> Vec<String> {
        let previously_checked = self.checked_names();
        self.checked.clear();
        previously_checked
    }
}
