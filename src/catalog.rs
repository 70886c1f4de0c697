// Book catalog: query and mutation operations over a flat-file store

use crate::filter::{self, CategoryFilter, Query, SortOrder};
use crate::models::{Book, NewBook, Stats};
use crate::record::Record;
use crate::store::Store;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// How an update that changes a book's name is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenamePolicy {
    /// Remove every book with the old name, then append the new one at the end
    #[default]
    Reinsert,
    /// Replace the first book with the old name at its current position
    InPlace,
}

impl std::str::FromStr for RenamePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reinsert" => Ok(RenamePolicy::Reinsert),
            "in-place" | "inplace" => Ok(RenamePolicy::InPlace),
            other => Err(format!("unknown rename policy '{}'", other)),
        }
    }
}

/// Whether the file write after a mutation went through
#[derive(Debug)]
pub enum SaveStatus {
    Saved,
    Failed(eyre::Report),
}

impl SaveStatus {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveStatus::Saved)
    }
}

/// Why a mutation did not take effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Name, author or date was missing on add
    MissingRequiredField,
    /// No book has the requested name
    NotFound,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MissingRequiredField => write!(f, "name, author and date are required"),
            Rejection::NotFound => write!(f, "no book with that name"),
        }
    }
}

/// Result of a catalog mutation
///
/// `Applied` means the in-memory sequence changed. The change only survives
/// the process if `save` is [`SaveStatus::Saved`].
#[derive(Debug)]
pub enum Outcome {
    Applied { save: SaveStatus },
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied { .. })
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Outcome::Rejected(r) => Some(*r),
            Outcome::Applied { .. } => None,
        }
    }

    pub fn save_status(&self) -> Option<&SaveStatus> {
        match self {
            Outcome::Applied { save } => Some(save),
            Outcome::Rejected(_) => None,
        }
    }
}

/// Operations over the books held by a [`Store`]
///
/// The catalog keeps no copy of its own: every call reads the store's
/// current in-memory sequence.
#[derive(Debug)]
pub struct Catalog {
    store: Store<Book>,
    rename_policy: RenamePolicy,
}

impl Catalog {
    pub fn new(store: Store<Book>) -> Self {
        Self::with_rename_policy(store, RenamePolicy::default())
    }

    pub fn with_rename_policy(store: Store<Book>, rename_policy: RenamePolicy) -> Self {
        Self { store, rename_policy }
    }

    pub fn store(&self) -> &Store<Book> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store<Book> {
        &mut self.store
    }

    pub fn into_store(self) -> Store<Book> {
        self.store
    }

    pub fn rename_policy(&self) -> RenamePolicy {
        self.rename_policy
    }

    pub fn set_rename_policy(&mut self, policy: RenamePolicy) {
        self.rename_policy = policy;
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn list_all(&self) -> Vec<Book> {
        self.store.records().to_vec()
    }

    pub fn filter_by_category(&self, category: impl Into<CategoryFilter>) -> Vec<Book> {
        filter::filter_by_category(self.store.records(), &category.into())
    }

    pub fn search_by_name(&self, term: &str) -> Vec<Book> {
        filter::search_by_name(self.store.records(), term)
    }

    /// Sorted copy of all books; the store keeps its order
    pub fn sort_by_date(&self, order: SortOrder) -> Vec<Book> {
        filter::sort_by_year(self.store.records(), order)
    }

    pub fn query(&self, query: &Query) -> Vec<Book> {
        query.apply(self.store.records())
    }

    /// First book with exactly this name
    pub fn find_by_name(&self, name: &str) -> Option<&Book> {
        self.store.records().iter().find(|b| b.has_key(name))
    }

    pub fn statistics(&self) -> Stats {
        Stats::tally(self.store.records())
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Append a book if name, author and date are present
    pub fn add(&mut self, candidate: NewBook) -> Outcome {
        let Some(book) = candidate.into_book() else {
            debug!("Rejected add with missing required field");
            return Outcome::Rejected(Rejection::MissingRequiredField);
        };

        info!(name = %book.name, "Adding book");
        self.store.records_mut().push(book);
        self.persist()
    }

    /// Remove every book with exactly this name
    pub fn delete_by_name(&mut self, name: &str) -> Outcome {
        let records = self.store.records_mut();
        let before = records.len();
        records.retain(|b| !b.has_key(name));
        let removed = before - records.len();

        if removed == 0 {
            debug!(name, "Delete found no matching book");
            return Outcome::Rejected(Rejection::NotFound);
        }

        info!(name, removed, "Deleted books");
        self.persist()
    }

    /// Replace the first book named `old_name` with `updated`
    ///
    /// When the name is unchanged only the first match is replaced, in
    /// place. When it changes, the current [`RenamePolicy`] decides.
    pub fn update_by_name(&mut self, old_name: &str, updated: Book) -> Outcome {
        let Some(index) = self.store.records().iter().position(|b| b.has_key(old_name)) else {
            debug!(name = old_name, "Update found no matching book");
            return Outcome::Rejected(Rejection::NotFound);
        };

        let records = self.store.records_mut();
        if updated.name != old_name && self.rename_policy == RenamePolicy::Reinsert {
            info!(from = old_name, to = %updated.name, "Renaming book by reinsertion");
            records.retain(|b| !b.has_key(old_name));
            records.push(updated);
        } else {
            info!(name = old_name, index, "Updating book in place");
            records[index] = updated;
        }

        self.persist()
    }

    /// Update the first book with the candidate's name, or add it if none
    ///
    /// The name is unchanged on the update path, so only the first match is
    /// replaced and other duplicates are left alone.
    pub fn upsert(&mut self, candidate: NewBook) -> Outcome {
        let Some(book) = candidate.into_book() else {
            debug!("Rejected save with missing required field");
            return Outcome::Rejected(Rejection::MissingRequiredField);
        };

        if self.find_by_name(&book.name).is_some() {
            let name = book.name.clone();
            self.update_by_name(&name, book)
        } else {
            self.add(book.into())
        }
    }

    fn persist(&self) -> Outcome {
        let save = match self.store.save() {
            Ok(()) => SaveStatus::Saved,
            Err(e) => {
                warn!(error = ?e, "Change kept in memory but not saved");
                SaveStatus::Failed(e)
            }
        };
        Outcome::Applied { save }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Year;
    use std::fs;
    use tempfile::TempDir;

    fn names(books: &[Book]) -> Vec<&str> {
        books.iter().map(|b| b.name.as_str()).collect()
    }

    fn catalog_with(temp: &TempDir, books: Vec<Book>) -> Catalog {
        let mut store = Store::new(temp.path().join("media.json"));
        store.set_records(books);
        Catalog::new(store)
    }

    fn scenario() -> Vec<Book> {
        vec![
            Book::new("1984", "George Orwell", "1949").with_category("Novel"),
            Book::new("The Republic", "Plato", "380").with_category("Philosophy"),
        ]
    }

    fn candidate(name: &str, author: &str, date: &str) -> NewBook {
        NewBook {
            name: Some(name.to_string()),
            author: Some(author.to_string()),
            date: Some(Year::from(date)),
            category: Some("Novel".to_string()),
        }
    }

    #[test]
    fn test_scenario_sort_filter_stats() {
        let temp = TempDir::new().unwrap();
        let catalog = catalog_with(&temp, scenario());

        assert_eq!(names(&catalog.sort_by_date(SortOrder::Descending)), ["1984", "The Republic"]);
        assert_eq!(names(&catalog.filter_by_category("Philosophy")), ["The Republic"]);
        assert_eq!(
            catalog.statistics(),
            Stats {
                total: 2,
                novels: 1,
                philosophy: 1,
                poetry: 0,
            }
        );
    }

    #[test]
    fn test_list_all_and_filter_all() {
        let temp = TempDir::new().unwrap();
        let catalog = catalog_with(&temp, scenario());

        assert_eq!(catalog.list_all(), scenario());
        assert_eq!(catalog.filter_by_category("All"), scenario());
        assert_eq!(catalog.search_by_name(""), scenario());
    }

    #[test]
    fn test_sort_does_not_reorder_store() {
        let temp = TempDir::new().unwrap();
        let catalog = catalog_with(&temp, scenario());

        let sorted = catalog.sort_by_date(SortOrder::Ascending);
        assert_eq!(names(&sorted), ["The Republic", "1984"]);
        assert_eq!(names(catalog.store().records()), ["1984", "The Republic"]);
    }

    #[test]
    fn test_add_then_find() {
        let temp = TempDir::new().unwrap();
        let mut catalog = catalog_with(&temp, scenario());

        let new = candidate("Test Driven Development", "Kent Beck", "2003");
        let outcome = catalog.add(new.clone());

        assert!(outcome.is_applied());
        assert!(outcome.save_status().unwrap().is_saved());
        assert_eq!(catalog.store().len(), 3);
        assert_eq!(catalog.find_by_name("Test Driven Development"), new.into_book().as_ref());
        assert_eq!(catalog.list_all().last().unwrap().name, "Test Driven Development");
    }

    #[test]
    fn test_add_persists_immediately() {
        let temp = TempDir::new().unwrap();
        let mut catalog = catalog_with(&temp, Vec::new());

        catalog.add(candidate("Dune", "Frank Herbert", "1965"));

        let fresh: Store<Book> = Store::open(temp.path().join("media.json")).unwrap();
        assert_eq!(names(fresh.records()), ["Dune"]);
    }

    #[test]
    fn test_add_missing_fields_rejected() {
        let temp = TempDir::new().unwrap();
        let mut catalog = catalog_with(&temp, scenario());

        let outcome = catalog.add(NewBook {
            name: Some("X".to_string()),
            ..Default::default()
        });

        assert!(!outcome.is_applied());
        assert_eq!(outcome.rejection(), Some(Rejection::MissingRequiredField));
        assert_eq!(catalog.store().len(), 2);
        assert!(!temp.path().join("media.json").exists());
    }

    #[test]
    fn test_add_allows_duplicate_names() {
        let temp = TempDir::new().unwrap();
        let mut catalog = catalog_with(&temp, scenario());

        assert!(catalog.add(candidate("1984", "Someone Else", "2000")).is_applied());
        assert_eq!(catalog.store().len(), 3);
        assert_eq!(catalog.find_by_name("1984").unwrap().author, "George Orwell");
    }

    #[test]
    fn test_add_save_failure_keeps_memory_change() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("media.json")).unwrap();
        let mut catalog = catalog_with(&temp, scenario());

        let outcome = catalog.add(candidate("Dune", "Frank Herbert", "1965"));

        assert!(outcome.is_applied());
        assert!(matches!(outcome.save_status(), Some(SaveStatus::Failed(_))));
        assert!(catalog.find_by_name("Dune").is_some());
    }

    #[test]
    fn test_delete_then_find() {
        let temp = TempDir::new().unwrap();
        let mut catalog = catalog_with(&temp, scenario());

        assert!(catalog.delete_by_name("1984").is_applied());
        assert!(catalog.find_by_name("1984").is_none());
        assert_eq!(catalog.store().len(), 1);
    }

    #[test]
    fn test_delete_removes_all_duplicates() {
        let temp = TempDir::new().unwrap();
        let mut books = scenario();
        books.push(Book::new("1984", "Another Printing", "1950"));
        let mut catalog = catalog_with(&temp, books);

        assert!(catalog.delete_by_name("1984").is_applied());
        assert_eq!(names(&catalog.list_all()), ["The Republic"]);
    }

    #[test]
    fn test_delete_nonexistent() {
        let temp = TempDir::new().unwrap();
        let mut catalog = catalog_with(&temp, scenario());

        let outcome = catalog.delete_by_name("Missing");
        assert_eq!(outcome.rejection(), Some(Rejection::NotFound));
        assert_eq!(catalog.store().len(), 2);
    }

    #[test]
    fn test_delete_is_exact_match() {
        let temp = TempDir::new().unwrap();
        let mut catalog = catalog_with(&temp, scenario());

        assert!(!catalog.delete_by_name("the republic").is_applied());
        assert!(!catalog.delete_by_name("1984 ").is_applied());
        assert_eq!(catalog.store().len(), 2);
    }

    #[test]
    fn test_find_returns_first_match() {
        let temp = TempDir::new().unwrap();
        let books = vec![
            Book::new("Dup", "First", "1"),
            Book::new("Dup", "Second", "2"),
        ];
        let catalog = catalog_with(&temp, books);

        assert_eq!(catalog.find_by_name("Dup").unwrap().author, "First");
        assert!(catalog.find_by_name("dup").is_none());
    }

    #[test]
    fn test_update_same_name_only_first_duplicate() {
        let temp = TempDir::new().unwrap();
        let books = vec![
            Book::new("Dup", "First", "1").with_category("Novel"),
            Book::new("Other", "Middle", "5"),
            Book::new("Dup", "Second", "2").with_category("Poetry"),
        ];
        let mut catalog = catalog_with(&temp, books);

        let updated = Book::new("Dup", "Revised", "10").with_category("Philosophy");
        assert!(catalog.update_by_name("Dup", updated.clone()).is_applied());

        let all = catalog.list_all();
        assert_eq!(all[0], updated);
        assert_eq!(all[1].name, "Other");
        assert_eq!(all[2], Book::new("Dup", "Second", "2").with_category("Poetry"));
    }

    #[test]
    fn test_update_rename_reinserts_at_end() {
        let temp = TempDir::new().unwrap();
        let books = vec![
            Book::new("Old", "A", "1"),
            Book::new("Middle", "B", "2"),
            Book::new("Old", "C", "3"),
        ];
        let mut catalog = catalog_with(&temp, books);
        assert_eq!(catalog.rename_policy(), RenamePolicy::Reinsert);

        let outcome = catalog.update_by_name("Old", Book::new("New", "A", "1"));
        assert!(outcome.is_applied());
        // Every "Old" is gone and the renamed book is last
        assert_eq!(names(&catalog.list_all()), ["Middle", "New"]);
    }

    #[test]
    fn test_update_rename_in_place() {
        let temp = TempDir::new().unwrap();
        let books = vec![
            Book::new("Old", "A", "1"),
            Book::new("Middle", "B", "2"),
            Book::new("Old", "C", "3"),
        ];
        let mut store = Store::new(temp.path().join("media.json"));
        store.set_records(books);
        let mut catalog = Catalog::with_rename_policy(store, RenamePolicy::InPlace);

        assert!(catalog.update_by_name("Old", Book::new("New", "A", "1")).is_applied());
        assert_eq!(names(&catalog.list_all()), ["New", "Middle", "Old"]);
        assert_eq!(catalog.find_by_name("Old").unwrap().author, "C");
    }

    #[test]
    fn test_update_nonexistent() {
        let temp = TempDir::new().unwrap();
        let mut catalog = catalog_with(&temp, scenario());

        let outcome = catalog.update_by_name("Missing", Book::new("Missing", "X", "1"));
        assert_eq!(outcome.rejection(), Some(Rejection::NotFound));
        assert_eq!(catalog.list_all(), scenario());
    }

    #[test]
    fn test_update_persists() {
        let temp = TempDir::new().unwrap();
        let mut catalog = catalog_with(&temp, scenario());

        let revised = Book::new("1984", "George Orwell", "1948").with_category("Novel");
        catalog.update_by_name("1984", revised.clone());

        let fresh: Store<Book> = Store::open(temp.path().join("media.json")).unwrap();
        assert_eq!(fresh.records()[0], revised);
    }

    #[test]
    fn test_upsert_updates_existing_book() {
        let temp = TempDir::new().unwrap();
        let mut catalog = catalog_with(&temp, scenario());

        let outcome = catalog.upsert(candidate("1984", "Eric Blair", "1948"));

        assert!(outcome.is_applied());
        assert_eq!(names(&catalog.list_all()), ["1984", "The Republic"]);
        let book = catalog.find_by_name("1984").unwrap();
        assert_eq!(book.author, "Eric Blair");
        assert_eq!(book.year(), 1948);

        let fresh: Store<Book> = Store::open(temp.path().join("media.json")).unwrap();
        assert_eq!(fresh.records()[0].author, "Eric Blair");
    }

    #[test]
    fn test_upsert_adds_new_book() {
        let temp = TempDir::new().unwrap();
        let mut catalog = catalog_with(&temp, scenario());

        let outcome = catalog.upsert(candidate("Dune", "Frank Herbert", "1965"));

        assert!(outcome.is_applied());
        assert_eq!(names(&catalog.list_all()), ["1984", "The Republic", "Dune"]);
    }

    #[test]
    fn test_upsert_duplicate_updates_first_only() {
        let temp = TempDir::new().unwrap();
        let books = vec![
            Book::new("Dup", "First", "1"),
            Book::new("Other", "Middle", "5"),
            Book::new("Dup", "Second", "2"),
        ];
        let mut catalog = catalog_with(&temp, books);

        assert!(catalog.upsert(candidate("Dup", "Revised", "10")).is_applied());

        let all = catalog.list_all();
        assert_eq!(names(&all), ["Dup", "Other", "Dup"]);
        assert_eq!(all[0].author, "Revised");
        assert_eq!(all[2].author, "Second");
    }

    #[test]
    fn test_upsert_missing_fields_rejected() {
        let temp = TempDir::new().unwrap();
        let mut catalog = catalog_with(&temp, scenario());

        let outcome = catalog.upsert(NewBook {
            name: Some("1984".to_string()),
            ..Default::default()
        });

        assert_eq!(outcome.rejection(), Some(Rejection::MissingRequiredField));
        assert_eq!(catalog.list_all(), scenario());
    }

    #[test]
    fn test_operations_see_latest_store_state() {
        let temp = TempDir::new().unwrap();
        let mut catalog = catalog_with(&temp, scenario());

        catalog
            .store_mut()
            .set_records(vec![Book::new("Walden", "Thoreau", "1854").with_category("Philosophy")]);

        assert_eq!(names(&catalog.list_all()), ["Walden"]);
        assert_eq!(catalog.statistics().philosophy, 1);
        assert!(catalog.find_by_name("1984").is_none());
    }

    #[test]
    fn test_query_sorted_within_category() {
        let temp = TempDir::new().unwrap();
        let mut books = scenario();
        books.push(Book::new("Animal Farm", "George Orwell", "1945").with_category("Novel"));
        let catalog = catalog_with(&temp, books);

        let query = Query::new().category("Novel").sort(SortOrder::Ascending);
        assert_eq!(names(&catalog.query(&query)), ["Animal Farm", "1984"]);
    }

    #[test]
    fn test_rename_policy_parsing() {
        assert_eq!("reinsert".parse::<RenamePolicy>().unwrap(), RenamePolicy::Reinsert);
        assert_eq!("in-place".parse::<RenamePolicy>().unwrap(), RenamePolicy::InPlace);
        assert!("sideways".parse::<RenamePolicy>().is_err());

        let yaml = serde_yaml::to_string(&RenamePolicy::InPlace).unwrap();
        assert_eq!(yaml.trim(), "in-place");
    }
}
