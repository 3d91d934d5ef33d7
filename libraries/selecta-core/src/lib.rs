//! Selecta Core
//!
//! Domain types, filename conventions and error handling shared by the
//! curation engine and its front ends.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Item`, `Manifest`, `CatalogEntry`
//! - **Item Descriptor Parser**: `Category - Title parte N.ext` names to descriptors
//! - **Error Handling**: Unified `SelectaError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use selecta_core::{parse_descriptor, Item, Manifest};
//!
//! let descriptor = parse_descriptor("0003 - Canal - Receita parte 2.mp4");
//! assert_eq!(descriptor.category, "Canal");
//! assert_eq!(descriptor.part_number, 2);
//!
//! let mut manifest = Manifest::new(1024);
//! manifest.push(Item::from_descriptor(descriptor, "0003 - Canal - Receita parte 2.mp4", 512));
//! assert_eq!(manifest.total_bytes(), 512);
//! ```

#![forbid(unsafe_code)]

pub mod descriptor;
pub mod error;
pub mod types;
pub mod units;

// Re-export commonly used types
pub use descriptor::{format_ordinal_name, parse_descriptor, strip_ordinal_prefix, ItemDescriptor};
pub use error::{Result, SelectaError};
pub use types::{CatalogEntry, CategoryGroups, Item, Manifest};
pub use units::{format_bytes, gib_to_bytes};
