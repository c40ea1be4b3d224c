//! Menu items and their recipes.
//!
//! A recipe line refers to an ingredient by *name* and is resolved through
//! the inventory at read time, so removed ingredients can never leave a
//! dangling reference behind.

use crate::{error::CafeError, inventory::Inventory, money::Money};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    Dish,
    Drink,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dish => "Dish",
            Self::Drink => "Drink",
        }
    }
}

impl TryFrom<&str> for ItemKind {
    type Error = CafeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Dish" => Ok(Self::Dish),
            "Drink" => Ok(Self::Drink),
            other => Err(CafeError::InvalidRecord(format!(
                "invalid menu item kind: {other}"
            ))),
        }
    }
}

/// One `(ingredient, required quantity)` pair of a recipe.
#[derive(Clone, Debug)]
pub struct RecipeLine {
    pub ingredient: String,
    pub quantity: f64,
}

/// A dish or drink on the menu.
///
/// The sale price is never cached: it is the base price plus the recipe cost
/// against *current* ingredient prices, so it moves when the inventory does.
#[derive(Clone, Debug)]
pub struct MenuItem {
    pub name: String,
    pub base_price: Money,
    pub kind: ItemKind,
    pub recipe: Vec<RecipeLine>,
}

impl MenuItem {
    pub fn new(name: String, base_price: Money, kind: ItemKind) -> Self {
        Self {
            name,
            base_price,
            kind,
            recipe: Vec::new(),
        }
    }

    /// Base price plus the live cost of every resolvable recipe line.
    pub fn price(&self, inventory: &Inventory) -> Money {
        self.recipe.iter().fold(self.base_price, |total, line| {
            match inventory.find(&line.ingredient) {
                Some(ingredient) => total + ingredient.price().scale(line.quantity),
                None => total,
            }
        })
    }

    /// Appends a recipe line. Duplicate ingredient lines are the caller's
    /// responsibility.
    pub fn add_line(&mut self, ingredient: &str, quantity: f64) {
        self.recipe.push(RecipeLine {
            ingredient: ingredient.to_string(),
            quantity,
        });
    }

    /// Overwrites the quantity of the first line matching `ingredient`
    /// (case-insensitive). Returns whether a line matched.
    pub fn update_line_quantity(&mut self, ingredient: &str, quantity: f64) -> bool {
        match self
            .recipe
            .iter_mut()
            .find(|line| line.ingredient.eq_ignore_ascii_case(ingredient))
        {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn uses_ingredient(&self, ingredient: &str) -> bool {
        self.recipe
            .iter()
            .any(|line| line.ingredient.eq_ignore_ascii_case(ingredient))
    }
}
