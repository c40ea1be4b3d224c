//! The module contains the errors the cafe engine can produce.
//!
//! Every domain failure surfaces as a [`CafeError`] variant; the console
//! layer prints them and returns to its menu loop. Persistence problems come
//! through the [`Io`] and [`Csv`] variants.
//!
//! [`Io`]: CafeError::Io
//! [`Csv`]: CafeError::Csv
use thiserror::Error;

/// Cafe engine custom errors.
#[derive(Error, Debug)]
pub enum CafeError {
    #[error("ingredient \"{0}\" already exists")]
    DuplicateIngredient(String),
    #[error("menu item \"{0}\" already exists")]
    DuplicateMenuItem(String),
    #[error("username \"{0}\" already exists")]
    UsernameTaken(String),
    #[error("username is too long")]
    UsernameTooLong,
    #[error("password must be at least 6 characters, letters and digits only")]
    InvalidPassword,
    #[error("ingredient \"{0}\" not found")]
    IngredientNotFound(String),
    #[error("menu item \"{0}\" not found")]
    MenuItemNotFound(String),
    #[error("user \"{0}\" not found")]
    UserNotFound(String),
    #[error("{0} cannot be negative")]
    NegativeAmount(&'static str),
    #[error("not enough budget")]
    BudgetExceeded,
    #[error("not enough {0} in stock")]
    InsufficientStock(String),
    #[error("ingredient \"{0}\" is not part of the item")]
    IngredientNotInRecipe(String),
    #[error("cannot remove the only ingredient from an item")]
    CannotRemoveLastIngredient,
    #[error("ingredient \"{0}\" is still used by a menu item")]
    IngredientInUse(String),
    #[error("cart is empty")]
    EmptyCart,
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
