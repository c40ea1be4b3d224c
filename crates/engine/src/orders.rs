//! Immutable order records.
//!
//! An `Order` is the append-only trace of a completed purchase; nothing in
//! the engine mutates one after [`Cafe::process_order`] built it.
//!
//! [`Cafe::process_order`]: crate::Cafe::process_order

use chrono::NaiveDateTime;

use crate::money::Money;

/// Timestamp format used in `orders.txt` and on the console.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One purchased item with the ingredient amounts it actually consumed.
#[derive(Clone, Debug)]
pub struct OrderLine {
    pub item_name: String,
    pub quantity: u32,
    /// Sale price of a single item at order time.
    pub unit_price: Money,
    /// Total `(ingredient, amount)` consumed by this line, i.e. the recipe
    /// quantity multiplied by the ordered quantity.
    pub consumed: Vec<(String, f64)>,
}

/// A completed purchase.
#[derive(Clone, Debug)]
pub struct Order {
    pub id: u64,
    pub username: String,
    pub placed_at: NaiveDateTime,
    pub lines: Vec<OrderLine>,
    pub total: Money,
}

impl Order {
    /// The `orders.txt` timestamp representation.
    pub fn placed_at_display(&self) -> String {
        self.placed_at.format(TIMESTAMP_FORMAT).to_string()
    }
}
