//! Shared, editable recipe text.

use crate::recipe::Recipe;
use parking_lot::RwLock;
use std::sync::Arc;

/// The current recipe text, shared between an editor and the frame loop.
///
/// Every tick takes a consistent snapshot, so edits apply from the next frame.
#[derive(Debug, Clone, Default)]
pub struct RecipeRegister(Arc<RwLock<String>>);

impl RecipeRegister {
    /// An empty register.
    pub fn new() -> Self {
        Self::default()
    }

    /// A register holding `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self(Arc::new(RwLock::new(text.into())))
    }

    /// Replace the text.
    pub fn set(&self, text: impl Into<String>) {
        *self.0.write() = text.into();
    }

    /// Replace the text with a serialized recipe.
    pub fn set_recipe(&self, recipe: &Recipe) {
        self.set(recipe.serialize());
    }

    /// Copy of the current text.
    pub fn snapshot(&self) -> String {
        self.0.read().clone()
    }

    /// Parse the current text.
    pub fn recipe(&self) -> Recipe {
        Recipe::parse(&self.0.read())
    }

    /// Whether the text has no steps.
    pub fn is_blank(&self) -> bool {
        self.0.read().trim().is_empty()
    }
}
