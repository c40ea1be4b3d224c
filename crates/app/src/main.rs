use engine::{Cafe, Money};

use crate::error::AppError;

mod error;
mod input;
mod menus;
mod settings;

fn main() -> Result<(), AppError> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "barista={level},engine={level}",
            level = settings.log.level
        ))
        .init();

    let initial_budget: Money = settings.cafe.initial_budget.parse()?;
    let mut cafe = Cafe::builder()
        .data_dir(&settings.cafe.data_dir)
        .initial_budget(initial_budget)
        .admin(&settings.admin.username, &settings.admin.password)
        .build()?;

    tracing::info!(
        "loaded {} ingredients and {} menu items from {}",
        cafe.inventory().len(),
        cafe.menu().len(),
        settings.cafe.data_dir
    );

    menus::main_menu(&mut cafe)
}
