//! Session-scoped taxonomy store
use tracing::debug;

use super::{builtin_categories, Category};
use crate::error::{ClassifierError, Result};

/// Categories visible to one user session.
///
/// Built-ins are shared and immutable; custom categories belong to this
/// value and are dropped with it when the session ends.
#[derive(Debug, Clone, Default)]
pub struct TaxonomyStore {
    custom: Vec<Category>,
    freshly_added: bool,
}

impl TaxonomyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed built-in taxonomy
    pub fn list_builtin(&self) -> &'static [Category] {
        builtin_categories()
    }

    /// Categories added this session, oldest first
    pub fn list_custom(&self) -> &[Category] {
        &self.custom
    }

    /// Append a user category.
    ///
    /// Callers validate input first (see `CustomCategoryForm`). Names are not
    /// deduplicated against the built-ins or earlier customs.
    pub fn add_custom(&mut self, name: impl Into<String>, prompts: Vec<String>) {
        let category = Category::new(name, prompts);
        debug!(
            "Adding custom category '{}' with {} prompts",
            category.name,
            category.prompts.len()
        );
        self.custom.push(category);
        self.freshly_added = true;
    }

    /// Built-ins followed by customs
    pub fn merged(&self) -> Vec<Category> {
        self.list_builtin()
            .iter()
            .chain(self.custom.iter())
            .cloned()
            .collect()
    }

    /// Merged category names, in merged order
    pub fn names(&self) -> Vec<String> {
        self.list_builtin()
            .iter()
            .chain(self.custom.iter())
            .map(|c| c.name.clone())
            .collect()
    }

    /// Returns true once after each `add_custom`, then resets.
    pub fn take_freshly_added(&mut self) -> bool {
        std::mem::take(&mut self.freshly_added)
    }

    /// Resolve selected names to full definitions.
    ///
    /// Keeps merged order, and every entry sharing a selected name is returned.
    pub fn select(&self, selected: &[String]) -> Result<Vec<Category>> {
        if selected.is_empty() {
            return Err(ClassifierError::UserInput(
                "please select at least one category".to_string(),
            ));
        }

        let merged = self.merged();
        let unknown: Vec<&str> = selected
            .iter()
            .filter(|name| !merged.iter().any(|c| &c.name == *name))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            return Err(ClassifierError::UserInput(format!(
                "unknown categories: {}",
                unknown.join(", ")
            )));
        }

        Ok(merged
            .into_iter()
            .filter(|c| selected.contains(&c.name))
            .collect())
    }
}
