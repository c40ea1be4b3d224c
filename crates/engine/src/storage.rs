//! Flat-file persistence.
//!
//! Every data set lives in its own `;`-delimited text file under the data
//! directory. Collections (inventory, menu, users, budget) are rewritten in
//! full on mutation; orders and the sales log are append-only. Missing files
//! read as empty sets so a fresh data directory just works.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::{
    ResultCafe,
    error::CafeError,
    inventory::{Ingredient, Inventory},
    menu::{ItemKind, MenuItem},
    money::Money,
    orders::{Order, OrderLine, TIMESTAMP_FORMAT},
    statistics::SaleRecord,
    users::User,
};

const INVENTORY_FILE: &str = "inventory.txt";
const MENU_FILE: &str = "menu.txt";
const MENU_INGREDIENTS_FILE: &str = "menu_ingredients.txt";
const USERS_FILE: &str = "users.txt";
const ORDERS_FILE: &str = "orders.txt";
const ORDER_DETAILS_FILE: &str = "order_details.txt";
const BUDGET_FILE: &str = "budget.txt";
const DAILY_STATS_FILE: &str = "daily_stats.txt";

#[derive(Debug, Serialize, Deserialize)]
struct InventoryRow {
    name: String,
    price: Money,
    quantity: f64,
    unit: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct MenuRow {
    name: String,
    base_price: Money,
    kind: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct UserRow {
    username: String,
    password_hash: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct OrderRow {
    id: u64,
    username: String,
    placed_at: String,
    total: Money,
}

#[derive(Debug, Serialize, Deserialize)]
struct OrderDetailRow {
    order_id: u64,
    item_name: String,
    quantity: u32,
    unit_price: Money,
    /// `ing1:qty1,ing2:qty2,...`
    consumed: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StatRow {
    date: NaiveDate,
    amount: Money,
}

/// Handle on the data directory.
#[derive(Debug)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    /// Opens (and creates if needed) the data directory.
    pub fn open(dir: impl Into<PathBuf>) -> ResultCafe<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    pub fn load_inventory(&self) -> ResultCafe<Vec<Ingredient>> {
        let Some(mut reader) = open_reader(&self.path(INVENTORY_FILE))? else {
            return Ok(Vec::new());
        };

        let mut ingredients = Vec::new();
        for row in reader.deserialize() {
            let row: InventoryRow = row?;
            ingredients.push(Ingredient::new(row.name, row.price, row.quantity, row.unit)?);
        }
        Ok(ingredients)
    }

    pub fn save_inventory(&self, inventory: &Inventory) -> ResultCafe<()> {
        let mut writer = open_writer(&self.path(INVENTORY_FILE))?;
        for ingredient in inventory.iter() {
            writer.serialize(InventoryRow {
                name: ingredient.name().to_string(),
                price: ingredient.price(),
                quantity: ingredient.quantity(),
                unit: ingredient.unit().to_string(),
            })?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Loads `menu.txt` and attaches the recipes from
    /// `menu_ingredients.txt`. Recipe rows naming an unknown item or
    /// ingredient are skipped.
    pub fn load_menu(&self, inventory: &Inventory) -> ResultCafe<Vec<MenuItem>> {
        let mut items = Vec::new();
        if let Some(mut reader) = open_reader(&self.path(MENU_FILE))? {
            for row in reader.deserialize() {
                let row: MenuRow = row?;
                let kind = ItemKind::try_from(row.kind.as_str())?;
                items.push(MenuItem::new(row.name, row.base_price, kind));
            }
        }

        if let Some(mut reader) = open_reader(&self.path(MENU_INGREDIENTS_FILE))? {
            for record in reader.records() {
                let record = record?;
                let Some(item_name) = record.get(0) else {
                    continue;
                };
                let Some(item) = items.iter_mut().find(|item| item.name == item_name) else {
                    continue;
                };

                let mut fields = record.iter().skip(1);
                while let (Some(name), Some(quantity)) = (fields.next(), fields.next()) {
                    if inventory.find(name).is_none() {
                        continue;
                    }
                    let quantity: f64 = quantity.parse().map_err(|_| {
                        CafeError::InvalidRecord(format!("bad recipe quantity: {quantity}"))
                    })?;
                    item.add_line(name, quantity);
                }
            }
        }

        Ok(items)
    }

    /// Rewrites both `menu.txt` and `menu_ingredients.txt` so the two files
    /// stay consistent after removals.
    pub fn save_menu(&self, menu: &[MenuItem]) -> ResultCafe<()> {
        let mut writer = open_writer(&self.path(MENU_FILE))?;
        for item in menu {
            writer.serialize(MenuRow {
                name: item.name.clone(),
                base_price: item.base_price,
                kind: item.kind.as_str().to_string(),
            })?;
        }
        writer.flush()?;

        let mut writer = open_writer(&self.path(MENU_INGREDIENTS_FILE))?;
        for item in menu {
            let mut record = vec![item.name.clone()];
            for line in &item.recipe {
                record.push(line.ingredient.clone());
                record.push(line.quantity.to_string());
            }
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn load_users(&self) -> ResultCafe<Vec<User>> {
        let Some(mut reader) = open_reader(&self.path(USERS_FILE))? else {
            return Ok(Vec::new());
        };

        let mut users = Vec::new();
        for row in reader.deserialize() {
            let row: UserRow = row?;
            users.push(User::from_hash(row.username, row.password_hash));
        }
        Ok(users)
    }

    pub fn save_users(&self, users: &[User]) -> ResultCafe<()> {
        let mut writer = open_writer(&self.path(USERS_FILE))?;
        for user in users {
            writer.serialize(UserRow {
                username: user.username.clone(),
                password_hash: user.password_hash().to_string(),
            })?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn load_budget(&self) -> ResultCafe<Option<Money>> {
        let raw = match fs::read_to_string(self.path(BUDGET_FILE)) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        Ok(Some(raw.parse()?))
    }

    pub fn save_budget(&self, budget: Money) -> ResultCafe<()> {
        fs::write(self.path(BUDGET_FILE), format!("{budget}\n"))?;
        Ok(())
    }

    /// Appends the order header and its line details.
    pub fn append_order(&self, order: &Order) -> ResultCafe<()> {
        let mut writer = open_appender(&self.path(ORDERS_FILE))?;
        writer.serialize(OrderRow {
            id: order.id,
            username: order.username.clone(),
            placed_at: order.placed_at_display(),
            total: order.total,
        })?;
        writer.flush()?;

        let mut writer = open_appender(&self.path(ORDER_DETAILS_FILE))?;
        for line in &order.lines {
            let consumed = line
                .consumed
                .iter()
                .map(|(name, quantity)| format!("{name}:{quantity}"))
                .collect::<Vec<_>>()
                .join(",");
            writer.serialize(OrderDetailRow {
                order_id: order.id,
                item_name: line.item_name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                consumed,
            })?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn load_orders(&self) -> ResultCafe<Vec<Order>> {
        let Some(mut reader) = open_reader(&self.path(ORDERS_FILE))? else {
            return Ok(Vec::new());
        };

        let mut orders = Vec::new();
        for row in reader.deserialize() {
            let row: OrderRow = row?;
            let placed_at = NaiveDateTime::parse_from_str(&row.placed_at, TIMESTAMP_FORMAT)
                .map_err(|_| {
                    CafeError::InvalidRecord(format!("bad order timestamp: {}", row.placed_at))
                })?;
            orders.push(Order {
                id: row.id,
                username: row.username,
                placed_at,
                lines: Vec::new(),
                total: row.total,
            });
        }

        if let Some(mut reader) = open_reader(&self.path(ORDER_DETAILS_FILE))? {
            for row in reader.deserialize() {
                let row: OrderDetailRow = row?;
                let Some(order) = orders.iter_mut().find(|order| order.id == row.order_id)
                else {
                    continue;
                };
                order.lines.push(OrderLine {
                    item_name: row.item_name,
                    quantity: row.quantity,
                    unit_price: row.unit_price,
                    consumed: parse_consumed(&row.consumed)?,
                });
            }
        }

        Ok(orders)
    }

    pub fn append_sale(&self, record: &SaleRecord) -> ResultCafe<()> {
        let mut writer = open_appender(&self.path(DAILY_STATS_FILE))?;
        writer.serialize(StatRow {
            date: record.date,
            amount: record.amount,
        })?;
        writer.flush()?;
        Ok(())
    }

    pub fn load_sales(&self) -> ResultCafe<Vec<SaleRecord>> {
        let Some(mut reader) = open_reader(&self.path(DAILY_STATS_FILE))? else {
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        for row in reader.deserialize() {
            let row: StatRow = row?;
            records.push(SaleRecord {
                date: row.date,
                amount: row.amount,
            });
        }
        Ok(records)
    }
}

fn parse_consumed(raw: &str) -> ResultCafe<Vec<(String, f64)>> {
    let mut consumed = Vec::new();
    for pair in raw.split(',').filter(|pair| !pair.is_empty()) {
        let Some((name, quantity)) = pair.split_once(':') else {
            return Err(CafeError::InvalidRecord(format!(
                "bad consumed ingredient: {pair}"
            )));
        };
        let quantity: f64 = quantity
            .parse()
            .map_err(|_| CafeError::InvalidRecord(format!("bad consumed quantity: {quantity}")))?;
        consumed.push((name.to_string(), quantity));
    }
    Ok(consumed)
}

fn open_reader(path: &Path) -> ResultCafe<Option<csv::Reader<fs::File>>> {
    match ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_path(path)
    {
        Ok(reader) => Ok(Some(reader)),
        Err(err) => {
            if let csv::ErrorKind::Io(io_err) = err.kind()
                && io_err.kind() == io::ErrorKind::NotFound
            {
                Ok(None)
            } else {
                Err(err.into())
            }
        }
    }
}

fn open_writer(path: &Path) -> ResultCafe<csv::Writer<fs::File>> {
    Ok(WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_path(path)?)
}

fn open_appender(path: &Path) -> ResultCafe<csv::Writer<fs::File>> {
    let file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    Ok(WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_writer(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        (dir, storage)
    }

    fn inventory() -> Inventory {
        let mut inventory = Inventory::new();
        inventory
            .add("Flour", Money::new(200), 10.0, "kg")
            .unwrap();
        inventory
            .add("Milk", Money::new(120), 5.0, "l")
            .unwrap();
        inventory
    }

    #[test]
    fn missing_files_read_as_empty() {
        let (_dir, storage) = storage();

        assert!(storage.load_inventory().unwrap().is_empty());
        assert!(storage.load_users().unwrap().is_empty());
        assert!(storage.load_orders().unwrap().is_empty());
        assert!(storage.load_sales().unwrap().is_empty());
        assert!(storage.load_budget().unwrap().is_none());
    }

    #[test]
    fn inventory_survives_a_rewrite() {
        let (_dir, storage) = storage();
        storage.save_inventory(&inventory()).unwrap();

        let loaded = storage.load_inventory().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name(), "Flour");
        assert_eq!(loaded[0].price(), Money::new(200));
        assert_eq!(loaded[0].quantity(), 10.0);
        assert_eq!(loaded[1].unit(), "l");
    }

    #[test]
    fn menu_and_recipes_round_trip() {
        let (_dir, storage) = storage();
        let inventory = inventory();

        let mut latte = MenuItem::new(String::from("Latte"), Money::new(150), ItemKind::Drink);
        latte.add_line("Milk", 0.3);
        let plain = MenuItem::new(String::from("Espresso"), Money::new(120), ItemKind::Drink);
        storage.save_menu(&[latte, plain]).unwrap();

        let loaded = storage.load_menu(&inventory).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].kind, ItemKind::Drink);
        assert_eq!(loaded[0].recipe.len(), 1);
        assert_eq!(loaded[0].recipe[0].ingredient, "Milk");
        assert_eq!(loaded[0].recipe[0].quantity, 0.3);
        assert!(loaded[1].recipe.is_empty());
    }

    #[test]
    fn recipes_for_missing_ingredients_are_dropped() {
        let (_dir, storage) = storage();

        let mut latte = MenuItem::new(String::from("Latte"), Money::new(150), ItemKind::Drink);
        latte.add_line("Milk", 0.3);
        storage.save_menu(&[latte]).unwrap();

        let loaded = storage.load_menu(&Inventory::new()).unwrap();
        assert!(loaded[0].recipe.is_empty());
    }

    #[test]
    fn budget_round_trips() {
        let (_dir, storage) = storage();
        storage.save_budget(Money::new(123_45)).unwrap();

        assert_eq!(storage.load_budget().unwrap(), Some(Money::new(123_45)));
    }

    #[test]
    fn orders_append_and_reload_with_details() {
        let (_dir, storage) = storage();
        let placed_at = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();

        let order = Order {
            id: 1,
            username: String::from("mario"),
            placed_at,
            lines: vec![OrderLine {
                item_name: String::from("Bread"),
                quantity: 3,
                unit_price: Money::new(500),
                consumed: vec![(String::from("Flour"), 6.0)],
            }],
            total: Money::new(1500),
        };
        storage.append_order(&order).unwrap();

        let loaded = storage.load_orders().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, 1);
        assert_eq!(loaded[0].placed_at, placed_at);
        assert_eq!(loaded[0].total, Money::new(1500));
        assert_eq!(loaded[0].lines.len(), 1);
        assert_eq!(loaded[0].lines[0].consumed, vec![(String::from("Flour"), 6.0)]);
    }

    #[test]
    fn sales_append_one_row_per_order() {
        let (_dir, storage) = storage();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        storage
            .append_sale(&SaleRecord {
                date,
                amount: Money::new(1500),
            })
            .unwrap();
        storage
            .append_sale(&SaleRecord {
                date,
                amount: Money::new(500),
            })
            .unwrap();

        let records = storage.load_sales().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].amount, Money::new(1500));
        assert_eq!(records[1].date, date);
    }
}
