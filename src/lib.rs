// Bookshelf - Personal book catalog kept in a single JSON file

pub mod catalog;
pub mod config;
pub mod filter;
pub mod flatfile;
pub mod models;
pub mod record;
pub mod store;

// Re-export main types for convenience
pub use catalog::{Catalog, Outcome, Rejection, RenamePolicy, SaveStatus};
pub use config::Config;
pub use filter::{CategoryFilter, Query, SortOrder};
pub use models::{ALL_CATEGORIES, Book, DEFAULT_CATEGORY, KNOWN_CATEGORIES, NewBook, Stats, Year};
pub use record::Record;
pub use store::{Loaded, Store};
