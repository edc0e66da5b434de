//! Pure catalog helpers shared by the storefront and merchant handlers.

pub mod price;
pub mod slug;
pub mod specs;
pub mod tree;

pub use price::{parse_price, PriceError};
pub use slug::slugify;
pub use specs::{build_spec_table, SpecEntry, SpecTableGroup};
pub use tree::{build_category_tree, category_depth, category_path, CategoryGroup, CategoryNode, PathEntry};
