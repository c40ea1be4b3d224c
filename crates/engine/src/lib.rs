//! Cafe management engine.
//!
//! The whole domain lives here: ingredient inventory, the menu and its
//! recipes, per-user carts, immutable orders, the cash budget and the sales
//! log, all owned by the [`Cafe`] aggregate and persisted to flat
//! `;`-delimited files. The console layer only drives `Cafe`'s operations.

pub use cafe::{Cafe, CafeBuilder};
pub use cart::{Cart, CartLine};
pub use error::CafeError;
pub use inventory::{Ingredient, Inventory};
pub use menu::{ItemKind, MenuItem, RecipeLine};
pub use money::Money;
pub use orders::{Order, OrderLine};
pub use statistics::{SaleRecord, WeekGroup, daily_totals, weekly_groups};
pub use storage::Storage;
pub use users::{Admin, User};

mod cafe;
mod cart;
mod error;
mod inventory;
mod menu;
mod money;
mod orders;
mod statistics;
mod storage;
mod users;

type ResultCafe<T> = Result<T, CafeError>;
