//! HTML parsers for prospektmaschine.de pages
//!
//! - `navigation`: category links in the root page's sidebar
//! - `tile`: flyer tiles on a category page
//! - `node`: the markup primitives both parsers are written against

pub mod navigation;
pub mod node;
pub mod tile;

// Re-export main parsing functions
pub use navigation::{parse_categories, shop_name_from_href};
pub use node::TagNode;
pub use tile::{is_tile_class, parse_validity, ShopNameSource, TileLayout, TileParser};
