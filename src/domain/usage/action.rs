//! Metered action types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An action that consumes daily quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeteredAction {
    /// Opening a recipe's detail view.
    RecipeView,

    /// Running an ingredient or text search.
    Search,

    /// Asking the recipe generator for a new AI recipe.
    RecipeGeneration,
}

impl MeteredAction {
    /// Every metered action, in a stable order.
    pub const ALL: [MeteredAction; 3] = [
        MeteredAction::RecipeView,
        MeteredAction::Search,
        MeteredAction::RecipeGeneration,
    ];

    /// Storage and log name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            MeteredAction::RecipeView => "recipe_view",
            MeteredAction::Search => "search",
            MeteredAction::RecipeGeneration => "recipe_generation",
        }
    }
}

impl fmt::Display for MeteredAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
