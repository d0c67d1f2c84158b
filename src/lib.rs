pub mod app;
pub mod domain;
pub mod error;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::catalog_service::{CatalogService, DashboardSettings, MutationOutcome, SearchOutcome};
pub use domain::product::{Product, ProductForm};
pub use domain::stats::{AggregateSnapshot, AggregationEngine};
pub use error::{CatalogError, CatalogResult};
pub use storage::{InMemoryProductStore, PgProductStore, ProductStore, StoreError};
