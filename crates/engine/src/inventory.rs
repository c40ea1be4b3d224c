//! The module contains the ingredient stock owned by the cafe.

use crate::{ResultCafe, error::CafeError, money::Money};

/// A stocked ingredient.
///
/// `price` is the purchase price per `unit`; `quantity` is how much is
/// currently on the shelf, expressed in `unit`s. Both are kept non-negative
/// by the setters.
#[derive(Clone, Debug)]
pub struct Ingredient {
    name: String,
    price: Money,
    quantity: f64,
    unit: String,
}

impl Ingredient {
    pub fn new(name: String, price: Money, quantity: f64, unit: String) -> ResultCafe<Self> {
        if price.is_negative() {
            return Err(CafeError::NegativeAmount("price"));
        }
        if quantity < 0.0 {
            return Err(CafeError::NegativeAmount("quantity"));
        }

        Ok(Self {
            name,
            price,
            quantity,
            unit,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn set_price(&mut self, price: Money) -> ResultCafe<()> {
        if price.is_negative() {
            return Err(CafeError::NegativeAmount("price"));
        }
        self.price = price;
        Ok(())
    }

    pub fn set_quantity(&mut self, quantity: f64) -> ResultCafe<()> {
        if quantity < 0.0 {
            return Err(CafeError::NegativeAmount("quantity"));
        }
        self.quantity = quantity;
        Ok(())
    }

    /// Removes `amount` units from the shelf. Callers must have checked the
    /// stock beforehand; the order validation pass does.
    pub(crate) fn consume(&mut self, amount: f64) {
        self.quantity -= amount;
    }
}

/// Holds the ingredients. Names are unique case-insensitively.
#[derive(Debug, Default)]
pub struct Inventory {
    ingredients: Vec<Ingredient>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_ingredients(ingredients: Vec<Ingredient>) -> Self {
        Self { ingredients }
    }

    /// Stocks a new ingredient.
    pub fn add(&mut self, name: &str, price: Money, quantity: f64, unit: &str) -> ResultCafe<()> {
        if self.find(name).is_some() {
            return Err(CafeError::DuplicateIngredient(name.to_string()));
        }

        self.ingredients
            .push(Ingredient::new(name.to_string(), price, quantity, unit.to_string())?);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> ResultCafe<Ingredient> {
        match self
            .ingredients
            .iter()
            .position(|ing| ing.name.eq_ignore_ascii_case(name))
        {
            Some(index) => Ok(self.ingredients.remove(index)),
            None => Err(CafeError::IngredientNotFound(name.to_string())),
        }
    }

    /// Overwrites both the quantity and the price of an ingredient.
    pub fn update(&mut self, name: &str, new_quantity: f64, new_price: Money) -> ResultCafe<()> {
        let ingredient = self
            .find_mut(name)
            .ok_or_else(|| CafeError::IngredientNotFound(name.to_string()))?;

        ingredient.set_quantity(new_quantity)?;
        ingredient.set_price(new_price)?;
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&Ingredient> {
        self.ingredients
            .iter()
            .find(|ing| ing.name.eq_ignore_ascii_case(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Ingredient> {
        self.ingredients
            .iter_mut()
            .find(|ing| ing.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ingredient> {
        self.ingredients.iter()
    }

    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory() -> Inventory {
        let mut inventory = Inventory::new();
        inventory
            .add("Flour", Money::new(200), 10.0, "kg")
            .unwrap();
        inventory
    }

    #[test]
    fn add_and_find_ignore_case() {
        let inventory = inventory();

        assert!(inventory.find("flour").is_some());
        assert!(inventory.find("FLOUR").is_some());
        assert!(inventory.find("Sugar").is_none());
    }

    #[test]
    #[should_panic(expected = "DuplicateIngredient(\"FLOUR\")")]
    fn fail_add_duplicate_ignoring_case() {
        let mut inventory = inventory();
        inventory
            .add("FLOUR", Money::new(100), 1.0, "kg")
            .unwrap();
    }

    #[test]
    #[should_panic(expected = "IngredientNotFound(\"Sugar\")")]
    fn fail_remove_missing() {
        let mut inventory = inventory();
        inventory.remove("Sugar").unwrap();
    }

    #[test]
    fn update_overwrites_both_fields() {
        let mut inventory = inventory();
        inventory.update("flour", 4.5, Money::new(250)).unwrap();

        let flour = inventory.find("Flour").unwrap();
        assert_eq!(flour.quantity(), 4.5);
        assert_eq!(flour.price(), Money::new(250));
    }

    #[test]
    #[should_panic(expected = "NegativeAmount(\"price\")")]
    fn fail_negative_price() {
        let mut inventory = Inventory::new();
        inventory
            .add("Flour", Money::new(-1), 1.0, "kg")
            .unwrap();
    }

    #[test]
    #[should_panic(expected = "NegativeAmount(\"quantity\")")]
    fn fail_negative_quantity_update() {
        let mut inventory = inventory();
        inventory.update("Flour", -1.0, Money::new(200)).unwrap();
    }
}
