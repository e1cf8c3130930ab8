//! Item persistence.
//!
//! The bridge never caches items: every operation goes straight to the store.

mod models;
mod schema;
mod sqlite_item_store;

pub use models::{format_timestamp, Item, ItemMetadata, ItemUpdate, NewItem};
pub use sqlite_item_store::SqliteItemStore;

use anyhow::Result;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ItemStore: Send + Sync {
    /// Inserts a new item with a freshly generated id.
    fn create_item(&self, new_item: NewItem) -> Result<Item>;

    fn get_item(&self, id: &str) -> Result<Option<Item>>;

    /// Returns at most `limit` items, most recently created first.
    fn list_items(&self, limit: usize) -> Result<Vec<Item>>;

    /// Returns the updated item, or `None` if no item has this id.
    fn update_item(&self, id: &str, update: ItemUpdate) -> Result<Option<Item>>;

    /// Returns true if an item was removed.
    fn delete_item(&self, id: &str) -> Result<bool>;

    /// Verifies the backing table is reachable.
    fn health_check(&self) -> Result<()>;
}
