/// Category taxonomy for video classification
///
/// Built-in Olympic sport groups plus categories a user adds during a session.
/// Each category is a name and the prompts the remote classifier scores against.

pub mod builtin;
pub mod store;

// Re-export main types
pub use builtin::builtin_categories;
pub use store::TaxonomyStore;

use serde::{Deserialize, Serialize};

use crate::error::{ClassifierError, Result};

/// A named semantic bucket with its descriptive prompts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    /// Category name shown in selection lists and sent to the classifier
    pub name: String,
    /// Prompts the classifier matches video content against
    pub prompts: Vec<String>,
}

impl Category {
    pub fn new(name: impl Into<String>, prompts: Vec<String>) -> Self {
        Self {
            name: name.into(),
            prompts,
        }
    }
}

/// Input from the add-category form: a name and a comma-separated prompt list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomCategoryForm {
    pub name: String,
    pub prompts: String,
}

impl CustomCategoryForm {
    pub fn new(name: impl Into<String>, prompts: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompts: prompts.into(),
        }
    }

    /// Validate the form and turn it into a category.
    ///
    /// Prompts are split on commas, trimmed, and empty pieces dropped.
    pub fn parse(&self) -> Result<Category> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ClassifierError::UserInput(
                "please enter both a category name and prompts".to_string(),
            ));
        }

        let prompts = split_prompts(&self.prompts);
        if prompts.is_empty() {
            return Err(ClassifierError::UserInput(
                "please enter both a category name and prompts".to_string(),
            ));
        }

        Ok(Category::new(name, prompts))
    }

    /// Parse the `NAME=prompt,prompt` shorthand used on the command line
    pub fn from_assignment(spec: &str) -> Result<Self> {
        let (name, prompts) = spec.split_once('=').ok_or_else(|| {
            ClassifierError::UserInput(format!(
                "custom category '{}' must look like NAME=prompt one,prompt two",
                spec
            ))
        })?;
        Ok(Self::new(name, prompts))
    }
}

fn split_prompts(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_parse_splits_and_trims_prompts() {
        let form = CustomCategoryForm::new("Skateboarding", "street skating, vert ramp ,park run");
        let category = form.parse().unwrap();

        assert_eq!(category.name, "Skateboarding");
        assert_eq!(
            category.prompts,
            vec!["street skating", "vert ramp", "park run"]
        );
    }

    #[test]
    fn test_form_rejects_empty_input() {
        assert!(CustomCategoryForm::new("", "a,b").parse().unwrap_err().is_user_input());
        assert!(CustomCategoryForm::new("   ", "a,b").parse().unwrap_err().is_user_input());
        assert!(CustomCategoryForm::new("Surfing", "").parse().unwrap_err().is_user_input());
        assert!(CustomCategoryForm::new("Surfing", " , ,").parse().unwrap_err().is_user_input());
    }

    #[test]
    fn test_from_assignment() {
        let form = CustomCategoryForm::from_assignment("Climbing=bouldering,lead climbing").unwrap();
        assert_eq!(form.name, "Climbing");
        assert_eq!(form.parse().unwrap().prompts, vec!["bouldering", "lead climbing"]);

        assert!(CustomCategoryForm::from_assignment("no equals sign").is_err());
    }
}
