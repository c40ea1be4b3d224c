//! Hierarchical console menus driving the cafe's operations.
//!
//! Every domain failure is printed as `Error: ...` and control returns to
//! the innermost menu loop; only real I/O problems on stdin bubble up.

use engine::{Cafe, CafeError, ItemKind, daily_totals, weekly_groups};

use crate::{error::Result, input};

pub fn main_menu(cafe: &mut Cafe) -> Result<()> {
    loop {
        println!("\n=== Welcome to Barista ===");
        println!("1. Admin Login");
        println!("2. User Registration");
        println!("3. User Login");
        println!("0. Exit");

        match input::prompt("Choice: ")?.as_str() {
            "1" => admin_login(cafe)?,
            "2" => register(cafe)?,
            "3" => user_login(cafe)?,
            "0" => {
                println!("Thank you for visiting!");
                return Ok(());
            }
            _ => println!("Invalid choice!"),
        }
    }
}

fn admin_login(cafe: &mut Cafe) -> Result<()> {
    let username = input::prompt("Username: ")?;
    let password = input::prompt_password("Password: ")?;

    if cafe.admin_login(&username, &password) {
        admin_menu(cafe)?;
    } else {
        println!("Invalid credentials!");
    }
    Ok(())
}

fn register(cafe: &mut Cafe) -> Result<()> {
    let username = input::prompt("Enter new username: ")?;
    println!("Password must be at least 6 characters, letters and digits only.");
    let Some(password) = input::prompt_password_twice()? else {
        println!("Registration aborted.");
        return Ok(());
    };

    match cafe.register_user(&username, &password) {
        Ok(()) => println!("Registration successful!"),
        Err(err) => println!("Error: {err}"),
    }
    Ok(())
}

fn user_login(cafe: &mut Cafe) -> Result<()> {
    let username = input::prompt("Username: ")?;
    let password = input::prompt_password("Password: ")?;

    if cafe.login(&username, &password) {
        user_menu(cafe, &username)?;
    } else {
        println!("Invalid credentials!");
    }
    Ok(())
}

fn admin_menu(cafe: &mut Cafe) -> Result<()> {
    loop {
        println!("\n=== Admin Menu ===");
        println!("1. Inventory Management");
        println!("2. Budget Management");
        println!("3. Menu Management");
        println!("4. Statistics");
        println!("0. Logout");

        match input::prompt("Choice: ")?.as_str() {
            "1" => inventory_menu(cafe)?,
            "2" => budget_menu(cafe)?,
            "3" => menu_management_menu(cafe)?,
            "4" => statistics_menu(cafe)?,
            "0" => {
                println!("Logging out...");
                return Ok(());
            }
            _ => println!("Invalid choice!"),
        }
    }
}

fn inventory_menu(cafe: &mut Cafe) -> Result<()> {
    loop {
        println!("\n=== Inventory Management ===");
        println!("1. Add Ingredient");
        println!("2. Remove Ingredient");
        println!("3. Update Ingredient");
        println!("4. View Inventory");
        println!("0. Back");

        match input::prompt("Choice: ")?.as_str() {
            "1" => {
                let name = input::prompt("Name: ")?;
                let price = input::prompt_price("Price: $")?;
                let quantity = input::prompt_quantity("Quantity: ")?;
                let unit = input::prompt("Unit: ")?;

                match cafe.purchase_ingredient(&name, price, quantity, &unit) {
                    Ok(()) => println!("Ingredient added successfully!"),
                    Err(err) => println!("Error: {err}"),
                }
            }
            "2" => {
                let name = input::prompt("Enter ingredient name to remove: ")?;
                match cafe.remove_ingredient(&name) {
                    Ok(()) => println!("Ingredient removed successfully!"),
                    Err(err) => println!("Error: {err}"),
                }
            }
            "3" => {
                let name = input::prompt("Enter ingredient name to update: ")?;
                let price = input::prompt_price("Price: $")?;
                let quantity = input::prompt_quantity("Quantity: ")?;

                match cafe.restock_ingredient(&name, quantity, price) {
                    Ok(()) => println!("Ingredient updated successfully!"),
                    Err(err) => println!("Error: {err}"),
                }
            }
            "4" => {
                println!("\n=== Current Inventory ===");
                for ingredient in cafe.inventory().iter() {
                    println!(
                        "{}: {} {} (Price: ${})",
                        ingredient.name(),
                        ingredient.quantity(),
                        ingredient.unit(),
                        ingredient.price()
                    );
                }
            }
            "0" => return Ok(()),
            _ => println!("Invalid choice!"),
        }
    }
}

fn budget_menu(cafe: &mut Cafe) -> Result<()> {
    loop {
        println!("\n=== Budget Management ===");
        println!("Current Budget: ${}", cafe.budget());
        println!("1. Add Funds");
        println!("2. Withdraw Funds");
        println!("0. Back");

        match input::prompt("Choice: ")?.as_str() {
            "1" => {
                let amount = input::prompt_price("Enter amount to add: $")?;
                match cafe.update_budget(amount) {
                    Ok(true) => println!("Budget updated successfully!"),
                    Ok(false) => println!("Failed to update budget!"),
                    Err(err) => println!("Error: {err}"),
                }
            }
            "2" => {
                let amount = input::prompt_price("Enter amount to withdraw: $")?;
                match cafe.update_budget(-amount) {
                    Ok(true) => println!("Budget updated successfully!"),
                    Ok(false) => println!("Insufficient funds!"),
                    Err(err) => println!("Error: {err}"),
                }
            }
            "0" => return Ok(()),
            _ => println!("Invalid choice!"),
        }
    }
}

fn menu_management_menu(cafe: &mut Cafe) -> Result<()> {
    loop {
        println!("\n=== Menu Management ===");
        println!("1. Add Menu Item");
        println!("2. Remove Menu Item");
        println!("3. Update Menu Item");
        println!("4. View Menu");
        println!("0. Back");

        match input::prompt("Choice: ")?.as_str() {
            "1" => add_menu_item(cafe)?,
            "2" => {
                let name = input::prompt("Enter item name to remove: ")?;
                match cafe.remove_menu_item(&name) {
                    Ok(()) => println!("Menu item removed."),
                    Err(err) => println!("Error: {err}"),
                }
            }
            "3" => update_menu_item(cafe)?,
            "4" => view_menu(cafe, true),
            "0" => return Ok(()),
            _ => println!("Invalid choice!"),
        }
    }
}

fn add_menu_item(cafe: &mut Cafe) -> Result<()> {
    let name = input::prompt("Enter item name: ")?;
    let base_price = input::prompt_price("Enter base price: $")?;
    let kind = match input::prompt("Type (1 for Dish, 2 for Drink): ")?.as_str() {
        "2" => ItemKind::Drink,
        _ => ItemKind::Dish,
    };

    if let Err(err) = cafe.add_menu_item(&name, base_price, kind) {
        println!("Error: {err}");
        return Ok(());
    }

    loop {
        let ingredient = input::prompt("Ingredient name: ")?;
        let quantity = input::prompt_quantity("Quantity needed: ")?;

        match cafe.add_recipe_line(&name, &ingredient, quantity) {
            Ok(()) => {
                if let Some(item) = cafe.find_menu_item(&name) {
                    println!("\nIngredients are below:");
                    for line in &item.recipe {
                        println!("{} - {}", line.ingredient, line.quantity);
                    }
                }
            }
            Err(err) => println!("Error: {err}"),
        }

        if !input::confirm("Add another ingredient? (y/n): ")? {
            return Ok(());
        }
    }
}

fn update_menu_item(cafe: &mut Cafe) -> Result<()> {
    let name = input::prompt("Enter item name to update: ")?;
    if cafe.find_menu_item(&name).is_none() {
        println!("Error: {}", CafeError::MenuItemNotFound(name));
        return Ok(());
    }

    println!("1. Update ingredients");
    println!("2. Update base price");
    match input::prompt("Choice: ")?.as_str() {
        "1" => {
            let ingredient = input::prompt("Enter ingredient name: ")?;
            let quantity = input::prompt_quantity("Enter new quantity: ")?;
            match cafe.update_recipe_quantity(&name, &ingredient, quantity) {
                Ok(()) => println!("Menu item updated."),
                Err(err) => println!("Error: {err}"),
            }
        }
        "2" => {
            let price = input::prompt_price("Enter new base price: $")?;
            match cafe.set_base_price(&name, price) {
                Ok(()) => println!("Menu item updated."),
                Err(err) => println!("Error: {err}"),
            }
        }
        _ => println!("Invalid choice!"),
    }
    Ok(())
}

/// Admins see the base price next to the computed total; users just the
/// live sale price.
fn view_menu(cafe: &Cafe, show_base_price: bool) {
    println!("\n=== Menu ===");
    for item in cafe.menu() {
        println!("\n{}: {}", item.kind.as_str(), item.name);
        if show_base_price {
            println!("Base Price: ${}", item.base_price);
        } else {
            println!("Price: ${}", item.price(cafe.inventory()));
        }

        println!("Ingredients:");
        for line in &item.recipe {
            let unit = cafe
                .inventory()
                .find(&line.ingredient)
                .map(|ing| ing.unit().to_string())
                .unwrap_or_default();
            println!("- {}: {} {}", line.ingredient, line.quantity, unit);
        }

        if show_base_price {
            println!("Total Price: ${}", item.price(cafe.inventory()));
        }
    }
}

fn user_menu(cafe: &mut Cafe, username: &str) -> Result<()> {
    loop {
        println!("\n=== Welcome, {username}! ===");
        println!("1. View Menu");
        println!("2. Place Order");
        println!("3. View Cart");
        println!("4. Modify Cart Item");
        println!("5. View Order History");
        println!("0. Logout");

        match input::prompt("Choice: ")?.as_str() {
            "1" => view_menu(cafe, false),
            "2" => {
                let item = input::prompt("Enter item name: ")?;
                let quantity = input::prompt_u32("Enter quantity: ")?;
                match cafe.cart_add(username, &item, quantity) {
                    Ok(()) => println!("Item added to cart!"),
                    Err(err) => println!("Error: {err}"),
                }
            }
            "3" => view_cart_and_checkout(cafe, username)?,
            "4" => {
                let item = input::prompt("Enter item name to modify: ")?;
                let ingredient = input::prompt("Enter ingredient name to modify: ")?;
                let quantity = input::prompt_quantity("Enter new quantity: ")?;
                match cafe.cart_modify_ingredient(username, &item, &ingredient, quantity) {
                    Ok(()) => println!("Item modified successfully!"),
                    Err(err) => println!("Error: {err}"),
                }
            }
            "5" => view_order_history(cafe, username),
            "0" => {
                println!("Logging out...");
                return Ok(());
            }
            _ => println!("Invalid choice!"),
        }
    }
}

fn view_cart_and_checkout(cafe: &mut Cafe, username: &str) -> Result<()> {
    let empty = match cafe.cart(username) {
        Ok(cart) => {
            println!("\n=== Your Cart ===");
            for line in cart.lines() {
                println!("{} x{}", line.item.name, line.quantity);
                println!("Ingredients:");
                for recipe in &line.item.recipe {
                    let unit = cafe
                        .inventory()
                        .find(&recipe.ingredient)
                        .map(|ing| ing.unit().to_string())
                        .unwrap_or_default();
                    println!("- {}: {} {}", recipe.ingredient, recipe.quantity, unit);
                }
                println!("Price: ${}", line.item.price(cafe.inventory()) * line.quantity);
            }
            println!("Total: ${}", cart.total());
            cart.is_empty()
        }
        Err(err) => {
            println!("Error: {err}");
            return Ok(());
        }
    };

    if !empty && input::confirm("\nProceed to checkout? (y/n): ")? {
        match cafe.process_order(username) {
            Ok(order) => {
                println!("Order placed successfully!");
                println!("Order #{} - Total amount: ${}", order.id, order.total);
            }
            Err(err) => println!("Error: {err}"),
        }
    }
    Ok(())
}

fn view_order_history(cafe: &Cafe, username: &str) {
    match cafe.order_history(username) {
        Ok(orders) => {
            println!("\n=== Order History ===");
            for order in orders {
                println!(
                    "\nOrder #{} - {} - Total: ${}",
                    order.id,
                    order.placed_at_display(),
                    order.total
                );
                for line in &order.lines {
                    println!("\n{} x{}", line.item_name, line.quantity);
                    println!("Used ingredients:");
                    for (name, amount) in &line.consumed {
                        println!("- {name}: {amount}");
                    }
                }
            }
        }
        Err(err) => println!("Error: {err}"),
    }
}

fn statistics_menu(cafe: &Cafe) -> Result<()> {
    loop {
        println!("\n=== Statistics ===");
        println!("1. Daily Sales");
        println!("2. Weekly Sales");
        println!("0. Back");

        match input::prompt("Choice: ")?.as_str() {
            "1" => match cafe.sales_log() {
                Ok(records) if records.is_empty() => println!("No sales data available"),
                Ok(records) => {
                    println!("\n=== Daily Sales ===");
                    for (date, amount) in daily_totals(&records) {
                        println!("{date}: ${amount}");
                    }
                }
                Err(err) => println!("Error: {err}"),
            },
            "2" => match cafe.sales_log() {
                Ok(records) if records.is_empty() => println!("No sales data available"),
                Ok(records) => {
                    println!("\n=== Weekly Sales ===");
                    for group in weekly_groups(&records) {
                        for record in &group.records {
                            println!("{}: ${}", record.date, record.amount);
                        }
                        println!(
                            "\nTotal for week starting {}: ${}\n",
                            group.start, group.total
                        );
                    }
                }
                Err(err) => println!("Error: {err}"),
            },
            "0" => return Ok(()),
            _ => println!("Invalid choice!"),
        }
    }
}
