//! Per-user shopping cart.
//!
//! Each cart line owns a private copy of the menu item taken at add time, so
//! line-level ingredient changes never reach the shared menu definition.

use crate::{
    ResultCafe, error::CafeError, inventory::Inventory, menu::MenuItem, money::Money,
};

/// One `(menu item, ordered quantity)` pair held until checkout.
#[derive(Clone, Debug)]
pub struct CartLine {
    pub item: MenuItem,
    pub quantity: u32,
}

/// The cart keeps `total` as the cached sum of line prices, recomputed
/// eagerly after every mutation against live ingredient prices.
#[derive(Clone, Debug, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    total: Money,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts a private copy of `item` in the cart.
    pub fn add_item(&mut self, item: &MenuItem, quantity: u32, inventory: &Inventory) {
        self.lines.push(CartLine {
            item: item.clone(),
            quantity,
        });
        self.recalculate(inventory);
    }

    /// Removes the first line whose item matches `item_name`, if any.
    pub fn remove_item(&mut self, item_name: &str, inventory: &Inventory) {
        if let Some(index) = self.lines.iter().position(|line| line.item.name == item_name) {
            self.lines.remove(index);
            self.recalculate(inventory);
        }
    }

    /// Overrides an ingredient quantity on this cart's copy of the item.
    ///
    /// The new quantity is capped by the ingredient's *current* stock, not by
    /// the recipe's original requirement.
    pub fn modify_line_ingredient(
        &mut self,
        item_name: &str,
        ingredient: &str,
        new_quantity: f64,
        inventory: &Inventory,
    ) -> ResultCafe<()> {
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.item.name == item_name)
            .ok_or_else(|| CafeError::MenuItemNotFound(item_name.to_string()))?;

        if line.item.recipe.len() == 1 && new_quantity == 0.0 {
            return Err(CafeError::CannotRemoveLastIngredient);
        }
        if !line.item.uses_ingredient(ingredient) {
            return Err(CafeError::IngredientNotInRecipe(ingredient.to_string()));
        }

        let stocked = inventory
            .find(ingredient)
            .ok_or_else(|| CafeError::IngredientNotFound(ingredient.to_string()))?;
        if new_quantity > stocked.quantity() {
            return Err(CafeError::InsufficientStock(stocked.name().to_string()));
        }

        line.item.update_line_quantity(ingredient, new_quantity);
        self.recalculate(inventory);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.total = Money::ZERO;
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn recalculate(&mut self, inventory: &Inventory) {
        self.total = self.lines.iter().fold(Money::ZERO, |total, line| {
            total + line.item.price(inventory) * line.quantity
        });
    }
}
