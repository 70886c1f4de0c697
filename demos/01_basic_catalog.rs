//! Example 01: Basic Catalog Operations
//!
//! This example adds, queries, edits and deletes books in a catalog file
//! held in a temporary directory.
//!
//! Run with: cargo run --example 01_basic_catalog

use bookshelf::{Book, Catalog, NewBook, Query, SortOrder, Store, Year};
use eyre::Result;

fn main() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let path = temp_dir.path().join("media.json");

    println!("Bookshelf Basic Catalog Example");
    println!("===============================\n");
    println!("Catalog file: {}\n", path.display());

    let mut store: Store<Book> = Store::new(&path);
    println!("Load: {:?}\n", store.load()?);
    let mut catalog = Catalog::new(store);

    println!("1. ADD - Adding three books...");
    for (name, author, year, category) in [
        ("1984", "George Orwell", "1949", "Novel"),
        ("The Republic", "Plato", "380", "Philosophy"),
        ("Leaves of Grass", "Walt Whitman", "1855", "Poetry"),
    ] {
        let outcome = catalog.add(NewBook {
            name: Some(name.to_string()),
            author: Some(author.to_string()),
            date: Some(Year::from(year)),
            category: Some(category.to_string()),
        });
        println!("   {} -> applied: {}", name, outcome.is_applied());
    }

    let rejected = catalog.add(NewBook {
        name: Some("No Author".to_string()),
        ..Default::default()
    });
    println!("   No Author -> rejected: {:?}\n", rejected.rejection());

    println!("2. QUERY - Newest first:");
    for book in catalog.sort_by_date(SortOrder::Descending) {
        println!("   {} ({})", book.name, book.year());
    }

    let poetry = catalog.query(&Query::new().category("Poetry"));
    println!("   Poetry: {:?}\n", poetry.iter().map(|b| &b.name).collect::<Vec<_>>());

    println!("3. EDIT - Correcting a year...");
    let mut revised = catalog.find_by_name("1984").cloned().expect("just added");
    revised.date = Some(Year::from("1948"));
    println!("   applied: {}\n", catalog.update_by_name("1984", revised).is_applied());

    println!("4. DELETE - Removing The Republic...");
    println!("   applied: {}\n", catalog.delete_by_name("The Republic").is_applied());

    println!("5. STATS - {:?}\n", catalog.statistics());

    println!("File contents:\n{}", std::fs::read_to_string(&path)?);

    Ok(())
}
