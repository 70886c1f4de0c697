// Query filtering and ordering over book sequences

use crate::models::{ALL_CATEGORIES, Book};
use std::fmt;
use std::str::FromStr;

/// Category selection for filtering
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Every book, including those without a category
    #[default]
    All,
    /// Books whose stored category equals this exactly (case-sensitive)
    Only(String),
}

impl CategoryFilter {
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => book.in_category(category),
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(s: &str) -> Self {
        if s == ALL_CATEGORIES {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(s.to_string())
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => write!(f, "{}", ALL_CATEGORIES),
            CategoryFilter::Only(category) => write!(f, "{}", category),
        }
    }
}

/// Direction for ordering by year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Newest first
    #[default]
    Descending,
    /// Oldest first
    Ascending,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "desc" | "descending" | "newest" => Ok(SortOrder::Descending),
            "asc" | "ascending" | "oldest" => Ok(SortOrder::Ascending),
            other => Err(format!("unknown sort order '{}'", other)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Descending => write!(f, "newest first"),
            SortOrder::Ascending => write!(f, "oldest first"),
        }
    }
}

/// Keep books in the given category, preserving order
pub fn filter_by_category(books: &[Book], category: &CategoryFilter) -> Vec<Book> {
    books.iter().filter(|b| category.matches(b)).cloned().collect()
}

/// Keep books whose name contains `term`, ignoring case
///
/// An empty term keeps everything.
pub fn search_by_name(books: &[Book], term: &str) -> Vec<Book> {
    if term.is_empty() {
        return books.to_vec();
    }

    let needle = term.to_lowercase();
    books
        .iter()
        .filter(|b| b.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Stable sort by parsed year; unparsable or missing years count as 0
pub fn sort_by_year(books: &[Book], order: SortOrder) -> Vec<Book> {
    let mut sorted = books.to_vec();
    match order {
        SortOrder::Ascending => sorted.sort_by_key(Book::year),
        SortOrder::Descending => sorted.sort_by(|a, b| b.year().cmp(&a.year())),
    }
    sorted
}

/// Combined view: category, then name search, then optional ordering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub category: CategoryFilter,
    pub search: String,
    pub sort: Option<SortOrder>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<CategoryFilter>) -> Self {
        self.category = category.into();
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn sort(mut self, order: SortOrder) -> Self {
        self.sort = Some(order);
        self
    }

    pub fn apply(&self, books: &[Book]) -> Vec<Book> {
        let filtered = filter_by_category(books, &self.category);
        let found = search_by_name(&filtered, &self.search);
        match self.sort {
            Some(order) => sort_by_year(&found, order),
            None => found,
        }
    }
}
