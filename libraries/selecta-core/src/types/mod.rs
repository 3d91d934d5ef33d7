//! Domain types for Selecta

pub mod catalog;
pub mod item;
pub mod manifest;

pub use catalog::CatalogEntry;
pub use item::Item;
pub use manifest::{CategoryGroups, Manifest};
