//! Catalog domain: the product entity, query composition and statistics.

pub mod product;
pub mod query;
pub mod stats;
