//! The aggregate root.
//!
//! `Cafe` owns every collection and is the only place where cross-cutting
//! invariants (name uniqueness, budget non-negativity, order-id allocation)
//! are enforced, and the sole point of file persistence. Construct one per
//! test through the builder; there is no global instance.

use std::path::PathBuf;

use chrono::{Local, Timelike};

use crate::{
    ResultCafe,
    cart::Cart,
    error::CafeError,
    inventory::Inventory,
    menu::{ItemKind, MenuItem},
    money::Money,
    orders::{Order, OrderLine},
    statistics::SaleRecord,
    storage::Storage,
    users::{Admin, MAX_USERNAME_LEN, User},
};

#[derive(Debug)]
pub struct Cafe {
    budget: Money,
    inventory: Inventory,
    menu: Vec<MenuItem>,
    users: Vec<User>,
    admin: Admin,
    next_order_id: u64,
    storage: Storage,
}

impl Cafe {
    /// Return a builder for `Cafe`. Help to build the struct.
    pub fn builder() -> CafeBuilder {
        CafeBuilder::default()
    }

    fn user(&self, username: &str) -> ResultCafe<&User> {
        self.users
            .iter()
            .find(|user| user.username == username)
            .ok_or_else(|| CafeError::UserNotFound(username.to_string()))
    }

    // --- accounts ---

    pub fn register_user(&mut self, username: &str, password: &str) -> ResultCafe<()> {
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(CafeError::UsernameTooLong);
        }
        if self.users.iter().any(|user| user.username == username) {
            return Err(CafeError::UsernameTaken(username.to_string()));
        }
        if !User::validate_password(password) {
            return Err(CafeError::InvalidPassword);
        }

        self.users.push(User::new(username.to_string(), password)?);
        self.storage.save_users(&self.users)?;
        Ok(())
    }

    pub fn login(&self, username: &str, password: &str) -> bool {
        self.users
            .iter()
            .any(|user| user.username == username && user.verify_password(password))
    }

    pub fn admin_login(&self, username: &str, password: &str) -> bool {
        self.admin.authenticate(username, password)
    }

    // --- inventory ---

    /// Buys stock: the cost (price × quantity) must fit in the budget and is
    /// taken out of it.
    pub fn purchase_ingredient(
        &mut self,
        name: &str,
        price: Money,
        quantity: f64,
        unit: &str,
    ) -> ResultCafe<()> {
        let cost = price.scale(quantity);
        if cost > self.budget {
            return Err(CafeError::BudgetExceeded);
        }

        self.inventory.add(name, price, quantity, unit)?;
        self.budget -= cost;
        self.storage.save_inventory(&self.inventory)?;
        self.storage.save_budget(self.budget)?;
        Ok(())
    }

    /// Removal is rejected while any recipe still references the ingredient.
    pub fn remove_ingredient(&mut self, name: &str) -> ResultCafe<()> {
        if self.menu.iter().any(|item| item.uses_ingredient(name)) {
            return Err(CafeError::IngredientInUse(name.to_string()));
        }

        self.inventory.remove(name)?;
        self.storage.save_inventory(&self.inventory)?;
        Ok(())
    }

    /// Overwrites an ingredient's quantity and price, guarded by the same
    /// budget check as a purchase.
    pub fn restock_ingredient(
        &mut self,
        name: &str,
        new_quantity: f64,
        new_price: Money,
    ) -> ResultCafe<()> {
        if new_price.scale(new_quantity) > self.budget {
            return Err(CafeError::BudgetExceeded);
        }

        self.inventory.update(name, new_quantity, new_price)?;
        self.storage.save_inventory(&self.inventory)?;
        Ok(())
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    // --- menu ---

    pub fn add_menu_item(
        &mut self,
        name: &str,
        base_price: Money,
        kind: ItemKind,
    ) -> ResultCafe<()> {
        if self.menu.iter().any(|item| item.name == name) {
            return Err(CafeError::DuplicateMenuItem(name.to_string()));
        }

        self.menu
            .push(MenuItem::new(name.to_string(), base_price, kind));
        self.storage.save_menu(&self.menu)?;
        Ok(())
    }

    pub fn remove_menu_item(&mut self, name: &str) -> ResultCafe<()> {
        match self.menu.iter().position(|item| item.name == name) {
            Some(index) => {
                self.menu.remove(index);
                self.storage.save_menu(&self.menu)?;
                Ok(())
            }
            None => Err(CafeError::MenuItemNotFound(name.to_string())),
        }
    }

    pub fn find_menu_item(&self, name: &str) -> Option<&MenuItem> {
        self.menu.iter().find(|item| item.name == name)
    }

    pub fn menu(&self) -> &[MenuItem] {
        &self.menu
    }

    /// Appends a recipe line, storing the inventory's spelling of the
    /// ingredient name.
    pub fn add_recipe_line(
        &mut self,
        item_name: &str,
        ingredient: &str,
        quantity: f64,
    ) -> ResultCafe<()> {
        let canonical = self
            .inventory
            .find(ingredient)
            .map(|ing| ing.name().to_string())
            .ok_or_else(|| CafeError::IngredientNotFound(ingredient.to_string()))?;

        let item = self
            .menu
            .iter_mut()
            .find(|item| item.name == item_name)
            .ok_or_else(|| CafeError::MenuItemNotFound(item_name.to_string()))?;
        item.add_line(&canonical, quantity);
        self.storage.save_menu(&self.menu)?;
        Ok(())
    }

    pub fn set_base_price(&mut self, item_name: &str, price: Money) -> ResultCafe<()> {
        let item = self
            .menu
            .iter_mut()
            .find(|item| item.name == item_name)
            .ok_or_else(|| CafeError::MenuItemNotFound(item_name.to_string()))?;
        item.base_price = price;
        self.storage.save_menu(&self.menu)?;
        Ok(())
    }

    pub fn update_recipe_quantity(
        &mut self,
        item_name: &str,
        ingredient: &str,
        quantity: f64,
    ) -> ResultCafe<()> {
        let item = self
            .menu
            .iter_mut()
            .find(|item| item.name == item_name)
            .ok_or_else(|| CafeError::MenuItemNotFound(item_name.to_string()))?;
        if !item.update_line_quantity(ingredient, quantity) {
            return Err(CafeError::IngredientNotInRecipe(ingredient.to_string()));
        }
        self.storage.save_menu(&self.menu)?;
        Ok(())
    }

    // --- budget ---

    pub fn budget(&self) -> Money {
        self.budget
    }

    /// Applies `delta` unless the result would be negative; returns whether
    /// it was applied.
    pub fn update_budget(&mut self, delta: Money) -> ResultCafe<bool> {
        if (self.budget + delta).is_negative() {
            return Ok(false);
        }

        self.budget += delta;
        self.storage.save_budget(self.budget)?;
        Ok(true)
    }

    // --- carts ---

    pub fn cart(&self, username: &str) -> ResultCafe<&Cart> {
        Ok(&self.user(username)?.cart)
    }

    pub fn cart_add(&mut self, username: &str, item_name: &str, quantity: u32) -> ResultCafe<()> {
        let item = self
            .find_menu_item(item_name)
            .cloned()
            .ok_or_else(|| CafeError::MenuItemNotFound(item_name.to_string()))?;

        let Cafe {
            users, inventory, ..
        } = self;
        let user = find_user_mut(users, username)?;
        user.cart.add_item(&item, quantity, inventory);
        Ok(())
    }

    pub fn cart_remove(&mut self, username: &str, item_name: &str) -> ResultCafe<()> {
        let Cafe {
            users, inventory, ..
        } = self;
        let user = find_user_mut(users, username)?;
        user.cart.remove_item(item_name, inventory);
        Ok(())
    }

    pub fn cart_modify_ingredient(
        &mut self,
        username: &str,
        item_name: &str,
        ingredient: &str,
        new_quantity: f64,
    ) -> ResultCafe<()> {
        let Cafe {
            users, inventory, ..
        } = self;
        let user = find_user_mut(users, username)?;
        user.cart
            .modify_line_ingredient(item_name, ingredient, new_quantity, inventory)
    }

    pub fn order_history(&self, username: &str) -> ResultCafe<&[Order]> {
        Ok(&self.user(username)?.order_history)
    }

    // --- order processing ---

    /// Turns the user's cart into an order.
    ///
    /// The validation pass is read-only and accumulates the demand per
    /// ingredient across all cart lines, so a shortfall anywhere aborts the
    /// whole order with nothing touched. The commit pass then decrements
    /// stock, prices every line against current ingredient prices and builds
    /// the order in one go; persistence failures after that point surface as
    /// errors instead of rolling anything back.
    pub fn process_order(&mut self, username: &str) -> ResultCafe<Order> {
        let user = self.user(username)?;
        if user.cart.is_empty() {
            return Err(CafeError::EmptyCart);
        }

        // Validation pass.
        let mut demand: Vec<(String, f64)> = Vec::new();
        for line in user.cart.lines() {
            for recipe in &line.item.recipe {
                let ingredient = self
                    .inventory
                    .find(&recipe.ingredient)
                    .ok_or_else(|| CafeError::IngredientNotFound(recipe.ingredient.clone()))?;
                let required = recipe.quantity * f64::from(line.quantity);

                let total = match demand
                    .iter()
                    .position(|(name, _)| name.eq_ignore_ascii_case(ingredient.name()))
                {
                    Some(index) => {
                        demand[index].1 += required;
                        demand[index].1
                    }
                    None => {
                        demand.push((ingredient.name().to_string(), required));
                        required
                    }
                };
                if ingredient.quantity() < total {
                    return Err(CafeError::InsufficientStock(ingredient.name().to_string()));
                }
            }
        }

        // Commit pass, atomic in memory.
        let id = self.next_order_id;
        let placed_at = Local::now().naive_local();
        let placed_at = placed_at
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(placed_at);

        let order = {
            let Cafe {
                users, inventory, ..
            } = self;
            let user = find_user_mut(users, username)?;

            let mut lines = Vec::with_capacity(user.cart.lines().len());
            let mut total = Money::ZERO;
            for cart_line in user.cart.lines() {
                let unit_price = cart_line.item.price(inventory);
                let mut consumed = Vec::with_capacity(cart_line.item.recipe.len());
                for recipe in &cart_line.item.recipe {
                    let amount = recipe.quantity * f64::from(cart_line.quantity);
                    if let Some(ingredient) = inventory.find_mut(&recipe.ingredient) {
                        ingredient.consume(amount);
                        consumed.push((ingredient.name().to_string(), amount));
                    }
                }

                total += unit_price * cart_line.quantity;
                lines.push(OrderLine {
                    item_name: cart_line.item.name.clone(),
                    quantity: cart_line.quantity,
                    unit_price,
                    consumed,
                });
            }

            Order {
                id,
                username: username.to_string(),
                placed_at,
                lines,
                total,
            }
        };
        self.next_order_id += 1;

        // Revenue and bookkeeping. The total is non-negative, so the budget
        // invariant cannot reject it.
        self.update_budget(order.total)?;
        self.storage.append_order(&order)?;

        let user = find_user_mut(&mut self.users, username)?;
        user.order_history.push(order.clone());
        self.storage.append_sale(&SaleRecord {
            date: order.placed_at.date(),
            amount: order.total,
        })?;
        user.cart.clear();
        self.storage.save_inventory(&self.inventory)?;

        Ok(order)
    }

    // --- statistics ---

    /// The raw sales log, one record per order.
    pub fn sales_log(&self) -> ResultCafe<Vec<SaleRecord>> {
        self.storage.load_sales()
    }
}

fn find_user_mut<'a>(users: &'a mut [User], username: &str) -> ResultCafe<&'a mut User> {
    users
        .iter_mut()
        .find(|user| user.username == username)
        .ok_or_else(|| CafeError::UserNotFound(username.to_string()))
}

/// The builder for `Cafe`.
#[derive(Debug)]
pub struct CafeBuilder {
    data_dir: PathBuf,
    initial_budget: Money,
    admin_username: String,
    admin_password: String,
}

impl Default for CafeBuilder {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            initial_budget: Money::new(10_000_00),
            admin_username: String::from("admin"),
            admin_password: String::from("admin123"),
        }
    }
}

impl CafeBuilder {
    /// Directory holding the flat files.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Budget used when `budget.txt` does not exist yet.
    pub fn initial_budget(mut self, budget: Money) -> Self {
        self.initial_budget = budget;
        self
    }

    pub fn admin(mut self, username: &str, password: &str) -> Self {
        self.admin_username = username.to_string();
        self.admin_password = password.to_string();
        self
    }

    /// Construct `Cafe`, loading every data set from the data directory.
    pub fn build(self) -> ResultCafe<Cafe> {
        let storage = Storage::open(self.data_dir)?;
        let admin = Admin::new(&self.admin_username, &self.admin_password)?;

        let budget = storage.load_budget()?.unwrap_or(self.initial_budget);
        let inventory = Inventory::from_ingredients(storage.load_inventory()?);
        let menu = storage.load_menu(&inventory)?;
        let mut users = storage.load_users()?;

        // Replaying the order log restores per-user histories and keeps ids
        // unique across restarts.
        let orders = storage.load_orders()?;
        let next_order_id = orders.iter().map(|order| order.id).max().unwrap_or(0) + 1;
        for order in orders {
            if let Some(user) = users.iter_mut().find(|user| user.username == order.username) {
                user.order_history.push(order);
            }
        }

        Ok(Cafe {
            budget,
            inventory,
            menu,
            users,
            admin,
            next_order_id,
            storage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cafe() -> (TempDir, Cafe) {
        let dir = TempDir::new().unwrap();
        let cafe = Cafe::builder()
            .data_dir(dir.path())
            .initial_budget(Money::new(1_000_000))
            .build()
            .unwrap();
        (dir, cafe)
    }

    // Flour at 2.00/kg, 10 kg in stock; Bread at base 1.00 needing 2 kg.
    fn cafe_with_bread() -> (TempDir, Cafe) {
        let (dir, mut cafe) = cafe();
        cafe.purchase_ingredient("Flour", Money::new(200), 10.0, "kg")
            .unwrap();
        cafe.add_menu_item("Bread", Money::new(100), ItemKind::Dish)
            .unwrap();
        cafe.add_recipe_line("Bread", "Flour", 2.0).unwrap();
        cafe.register_user("mario", "secret1").unwrap();
        (dir, cafe)
    }

    fn flour_stock(cafe: &Cafe) -> f64 {
        cafe.inventory().find("Flour").unwrap().quantity()
    }

    #[test]
    fn bread_price_is_base_plus_recipe() {
        let (_dir, cafe) = cafe_with_bread();
        let bread = cafe.find_menu_item("Bread").unwrap();

        assert_eq!(bread.price(cafe.inventory()), Money::new(500));
    }

    #[test]
    fn order_consumes_stock_and_collects_revenue() {
        let (_dir, mut cafe) = cafe_with_bread();
        cafe.cart_add("mario", "Bread", 3).unwrap();
        assert_eq!(cafe.cart("mario").unwrap().total(), Money::new(1500));

        let budget_before = cafe.budget();
        let order = cafe.process_order("mario").unwrap();

        assert_eq!(order.id, 1);
        assert_eq!(order.total, Money::new(1500));
        assert_eq!(order.lines[0].consumed, vec![(String::from("Flour"), 6.0)]);
        assert_eq!(flour_stock(&cafe), 4.0);
        assert_eq!(cafe.budget(), budget_before + Money::new(1500));
        assert!(cafe.cart("mario").unwrap().is_empty());
        assert_eq!(cafe.order_history("mario").unwrap().len(), 1);
    }

    #[test]
    fn order_total_matches_line_prices() {
        let (_dir, mut cafe) = cafe_with_bread();
        cafe.purchase_ingredient("Milk", Money::new(120), 5.0, "l")
            .unwrap();
        cafe.add_menu_item("Latte", Money::new(150), ItemKind::Drink)
            .unwrap();
        cafe.add_recipe_line("Latte", "Milk", 0.5).unwrap();

        cafe.cart_add("mario", "Bread", 2).unwrap();
        cafe.cart_add("mario", "Latte", 3).unwrap();
        let order = cafe.process_order("mario").unwrap();

        let expected: Money = order
            .lines
            .iter()
            .fold(Money::ZERO, |total, line| {
                total + line.unit_price * line.quantity
            });
        assert_eq!(order.total, expected);
        // Latte: 1.50 + 1.20 × 0.5 = 2.10; total 2×5.00 + 3×2.10.
        assert_eq!(order.total, Money::new(1630));
    }

    #[test]
    fn short_order_leaves_everything_untouched() {
        let (_dir, mut cafe) = cafe_with_bread();
        cafe.cart_add("mario", "Bread", 10).unwrap();
        let budget_before = cafe.budget();

        let err = cafe.process_order("mario").unwrap_err();

        assert!(matches!(err, CafeError::InsufficientStock(ref name) if name == "Flour"));
        assert_eq!(flour_stock(&cafe), 10.0);
        assert_eq!(cafe.budget(), budget_before);
        assert!(cafe.order_history("mario").unwrap().is_empty());
        assert!(!cafe.cart("mario").unwrap().is_empty());
    }

    #[test]
    fn demand_is_aggregated_across_cart_lines() {
        // Each line alone fits in the 10 kg of flour; together they do not.
        let (_dir, mut cafe) = cafe_with_bread();
        cafe.cart_add("mario", "Bread", 3).unwrap();
        cafe.cart_add("mario", "Bread", 3).unwrap();

        let err = cafe.process_order("mario").unwrap_err();

        assert!(matches!(err, CafeError::InsufficientStock(ref name) if name == "Flour"));
        assert_eq!(flour_stock(&cafe), 10.0);
    }

    #[test]
    fn cart_remove_drops_the_line() {
        let (_dir, mut cafe) = cafe_with_bread();
        cafe.cart_add("mario", "Bread", 3).unwrap();

        cafe.cart_remove("mario", "Bread").unwrap();

        assert!(cafe.cart("mario").unwrap().is_empty());
        assert_eq!(cafe.cart("mario").unwrap().total(), Money::ZERO);
    }

    #[test]
    #[should_panic(expected = "EmptyCart")]
    fn fail_ordering_an_empty_cart() {
        let (_dir, mut cafe) = cafe_with_bread();
        cafe.process_order("mario").unwrap();
    }

    #[test]
    fn order_ids_continue_across_restarts() {
        let (dir, mut cafe) = cafe_with_bread();
        cafe.cart_add("mario", "Bread", 1).unwrap();
        assert_eq!(cafe.process_order("mario").unwrap().id, 1);
        drop(cafe);

        let mut cafe = Cafe::builder().data_dir(dir.path()).build().unwrap();
        assert_eq!(cafe.order_history("mario").unwrap().len(), 1);

        cafe.cart_add("mario", "Bread", 1).unwrap();
        assert_eq!(cafe.process_order("mario").unwrap().id, 2);
    }

    #[test]
    fn cart_override_is_consumed_and_menu_stays_intact() {
        let (_dir, mut cafe) = cafe_with_bread();
        cafe.cart_add("mario", "Bread", 3).unwrap();
        cafe.cart_modify_ingredient("mario", "Bread", "Flour", 1.0)
            .unwrap();
        assert_eq!(cafe.cart("mario").unwrap().total(), Money::new(900));

        let order = cafe.process_order("mario").unwrap();

        assert_eq!(order.total, Money::new(900));
        assert_eq!(order.lines[0].consumed, vec![(String::from("Flour"), 3.0)]);
        assert_eq!(flour_stock(&cafe), 7.0);
        // The shared menu definition still needs 2 kg.
        let bread = cafe.find_menu_item("Bread").unwrap();
        assert_eq!(bread.recipe[0].quantity, 2.0);
    }

    #[test]
    fn register_checks_run_in_order() {
        let (_dir, mut cafe) = cafe_with_bread();

        let err = cafe.register_user(&"x".repeat(31), "secret1").unwrap_err();
        assert!(matches!(err, CafeError::UsernameTooLong));

        let err = cafe.register_user("mario", "other12").unwrap_err();
        assert!(matches!(err, CafeError::UsernameTaken(_)));

        let err = cafe.register_user("luigi", "short").unwrap_err();
        assert!(matches!(err, CafeError::InvalidPassword));

        let err = cafe.register_user("luigi", "no spaces1").unwrap_err();
        assert!(matches!(err, CafeError::InvalidPassword));

        cafe.register_user("luigi", "secret2").unwrap();
    }

    #[test]
    fn login_verifies_against_the_stored_hash() {
        let (_dir, cafe) = cafe_with_bread();

        assert!(cafe.login("mario", "secret1"));
        assert!(!cafe.login("mario", "secret2"));
        assert!(!cafe.login("luigi", "secret1"));
        assert!(cafe.admin_login("admin", "admin123"));
        assert!(!cafe.admin_login("admin", "wrong"));
    }

    #[test]
    fn budget_never_goes_negative() {
        let (_dir, mut cafe) = cafe();
        let budget = cafe.budget();

        assert!(!cafe.update_budget(-(budget + Money::new(1))).unwrap());
        assert_eq!(cafe.budget(), budget);

        assert!(cafe.update_budget(-budget).unwrap());
        assert_eq!(cafe.budget(), Money::ZERO);
    }

    #[test]
    fn purchases_are_paid_from_the_budget() {
        let (_dir, mut cafe) = cafe();
        let budget = cafe.budget();

        cafe.purchase_ingredient("Flour", Money::new(200), 10.0, "kg")
            .unwrap();
        assert_eq!(cafe.budget(), budget - Money::new(2000));
    }

    #[test]
    #[should_panic(expected = "BudgetExceeded")]
    fn fail_purchase_beyond_budget() {
        let dir = TempDir::new().unwrap();
        let mut cafe = Cafe::builder()
            .data_dir(dir.path())
            .initial_budget(Money::new(1000))
            .build()
            .unwrap();

        cafe.purchase_ingredient("Saffron", Money::new(90_000), 1.0, "g")
            .unwrap();
    }

    #[test]
    #[should_panic(expected = "IngredientInUse(\"Flour\")")]
    fn fail_removing_a_recipe_ingredient() {
        let (_dir, mut cafe) = cafe_with_bread();
        cafe.remove_ingredient("Flour").unwrap();
    }

    #[test]
    fn unreferenced_ingredients_can_be_removed() {
        let (_dir, mut cafe) = cafe_with_bread();
        cafe.purchase_ingredient("Milk", Money::new(120), 5.0, "l")
            .unwrap();

        cafe.remove_ingredient("milk").unwrap();
        assert!(cafe.inventory().find("Milk").is_none());
    }

    #[test]
    fn state_survives_a_reload() {
        let (dir, mut cafe) = cafe_with_bread();
        cafe.set_base_price("Bread", Money::new(120)).unwrap();
        let budget = cafe.budget();
        drop(cafe);

        let cafe = Cafe::builder().data_dir(dir.path()).build().unwrap();

        assert_eq!(cafe.budget(), budget);
        assert_eq!(flour_stock(&cafe), 10.0);
        let bread = cafe.find_menu_item("Bread").unwrap();
        assert_eq!(bread.base_price, Money::new(120));
        assert_eq!(bread.recipe[0].quantity, 2.0);
        assert!(cafe.login("mario", "secret1"));
    }
}
