use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::repo_types::{Entry, NewEntry};
use crate::error::ApiError;
use crate::nutrition::{macros::round1, Macros, MealType};

#[derive(Debug, Error, PartialEq)]
pub enum RecipeError {
    #[error("Recipe name is required")]
    BlankName,
    #[error("Select at least one entry to group")]
    Empty,
    #[error("Entries must all be logged on the same day")]
    MixedDates,
    #[error("Entry {0} already belongs to a recipe")]
    AlreadyGrouped(Uuid),
    #[error("Entry {0} is a recipe and cannot be nested")]
    NestedRecipe(Uuid),
    #[error("Entry {0} is not a recipe")]
    NotARecipe(Uuid),
}

impl From<RecipeError> for ApiError {
    fn from(e: RecipeError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

/// A validated grouping: the recipe row to insert and the entries that
/// move under it.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupPlan {
    pub recipe: NewEntry,
    pub child_ids: Vec<Uuid>,
}

/// Validates `entries` as recipe ingredients and builds the parent row.
///
/// The recipe takes the summed grams and macros of its children as they are
/// now. Without an explicit `meal` it lands in the first child's meal.
pub fn plan_group(
    name: &str,
    entries: &[Entry],
    meal: Option<MealType>,
    note: Option<String>,
) -> Result<GroupPlan, RecipeError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RecipeError::BlankName);
    }
    let first = entries.first().ok_or(RecipeError::Empty)?;

    for e in entries {
        if e.date != first.date {
            return Err(RecipeError::MixedDates);
        }
        if e.is_recipe {
            return Err(RecipeError::NestedRecipe(e.id));
        }
        if e.parent_entry_id.is_some() {
            return Err(RecipeError::AlreadyGrouped(e.id));
        }
    }

    let macros: Macros = entries.iter().map(|e| e.macros).sum();
    let grams: f64 = entries.iter().map(|e| e.amount_grams).sum();

    Ok(GroupPlan {
        recipe: NewEntry {
            date: first.date,
            meal: meal.unwrap_or(first.meal),
            food_id: None,
            food_name: name.to_string(),
            amount_grams: round1(grams),
            macros: macros.rounded(),
            note: note.filter(|n| !n.trim().is_empty()),
            parent_entry_id: None,
            is_recipe: true,
        },
        child_ids: entries.iter().map(|e| e.id).collect(),
    })
}

/// Ids of the children to release before the recipe row goes away.
pub fn plan_ungroup(recipe: &Entry, children: &[Entry]) -> Result<Vec<Uuid>, RecipeError> {
    if !recipe.is_recipe {
        return Err(RecipeError::NotARecipe(recipe.id));
    }
    Ok(children
        .iter()
        .filter(|c| c.parent_entry_id == Some(recipe.id))
        .map(|c| c.id)
        .collect())
}

/// A top-level entry with any recipe children beneath it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryNode {
    #[serde(flatten)]
    pub entry: Entry,
    pub children: Vec<Entry>,
}

/// Nests children under their recipes, keeping input order at both levels.
/// A child whose parent is not in `entries` is shown at the top level.
pub fn build_tree(entries: Vec<Entry>) -> Vec<EntryNode> {
    let parents: std::collections::HashSet<Uuid> = entries
        .iter()
        .filter(|e| e.is_recipe)
        .map(|e| e.id)
        .collect();

    let (children, top): (Vec<Entry>, Vec<Entry>) = entries
        .into_iter()
        .partition(|e| e.parent_entry_id.is_some_and(|p| parents.contains(&p)));

    let mut nodes: Vec<EntryNode> = top
        .into_iter()
        .map(|entry| EntryNode {
            entry,
            children: Vec::new(),
        })
        .collect();

    for child in children {
        if let Some(node) = nodes
            .iter_mut()
            .find(|n| Some(n.entry.id) == child.parent_entry_id)
        {
            node.children.push(child);
        }
    }
    nodes
}

/// Sum of the top-level entries only; recipe children are already counted
/// in their recipe.
pub fn top_level_totals(nodes: &[EntryNode]) -> Macros {
    nodes.iter().map(|n| n.entry.macros).sum::<Macros>().rounded()
}
