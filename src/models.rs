// Data models for the book catalog

use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category shown for a book that has none stored
pub const DEFAULT_CATEGORY: &str = "Novel";

/// Pseudo-category that matches every book when filtering
pub const ALL_CATEGORIES: &str = "All";

/// Categories counted individually by [`Stats`]
pub const KNOWN_CATEGORIES: [&str; 3] = ["Novel", "Philosophy", "Poetry"];

/// Publication year as it appears in the file
///
/// The file may hold a number, a string, or anything else. The original
/// form is written back unchanged; [`Year::value`] gives the number used
/// for sorting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Year {
    Number(serde_json::Number),
    Text(String),
    /// Any other JSON value; sorts as 0
    Other(serde_json::Value),
}

impl Year {
    /// Numeric year: floats are truncated, out-of-range integers saturate,
    /// and text that does not parse as an integer is 0
    pub fn value(&self) -> i64 {
        match self {
            Year::Number(n) => {
                if let Some(i) = n.as_i64() {
                    i
                } else if n.as_u64().is_some() {
                    i64::MAX
                } else {
                    n.as_f64().map(|f| f.trunc() as i64).unwrap_or(0)
                }
            }
            Year::Text(s) => s.trim().parse().unwrap_or(0),
            Year::Other(_) => 0,
        }
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Year::Number(n) => write!(f, "{}", n),
            Year::Text(s) => write!(f, "{}", s),
            Year::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for Year {
    fn from(n: i64) -> Self {
        Year::Number(n.into())
    }
}

impl From<&str> for Year {
    fn from(s: &str) -> Self {
        Year::Text(s.to_string())
    }
}

impl From<String> for Year {
    fn from(s: String) -> Self {
        Year::Text(s)
    }
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub name: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Year>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Book {
    pub fn new(name: impl Into<String>, author: impl Into<String>, date: impl Into<Year>) -> Self {
        Self {
            name: name.into(),
            author: author.into(),
            date: Some(date.into()),
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Year used for ordering; a missing date counts as 0
    pub fn year(&self) -> i64 {
        self.date.as_ref().map(Year::value).unwrap_or(0)
    }

    /// Category for display, falling back to [`DEFAULT_CATEGORY`]
    ///
    /// Filtering and statistics never use this fallback; they compare the
    /// stored value only.
    pub fn display_category(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }

    /// Whether the stored category equals `category` exactly
    pub fn in_category(&self, category: &str) -> bool {
        self.category.as_deref() == Some(category)
    }
}

impl Record for Book {
    fn key(&self) -> &str {
        &self.name
    }
}

/// Candidate for insertion; any field may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub date: Option<Year>,
    #[serde(default)]
    pub category: Option<String>,
}

impl NewBook {
    /// Convert into a [`Book`] if name, author and date are all present
    ///
    /// Only presence is checked: empty strings are accepted.
    pub fn into_book(self) -> Option<Book> {
        Some(Book {
            name: self.name?,
            author: self.author?,
            date: Some(self.date?),
            category: self.category,
        })
    }
}

impl From<Book> for NewBook {
    fn from(book: Book) -> Self {
        Self {
            name: Some(book.name),
            author: Some(book.author),
            date: book.date,
            category: book.category,
        }
    }
}

/// Aggregate counts for the summary display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total: usize,
    pub novels: usize,
    pub philosophy: usize,
    pub poetry: usize,
}

impl Stats {
    /// Count books overall and per known category
    ///
    /// Books in any other category (or none) add to `total` only.
    pub fn tally(books: &[Book]) -> Self {
        let count = |category: &str| books.iter().filter(|b| b.in_category(category)).count();

        Self {
            total: books.len(),
            novels: count(KNOWN_CATEGORIES[0]),
            philosophy: count(KNOWN_CATEGORIES[1]),
            poetry: count(KNOWN_CATEGORIES[2]),
        }
    }
}
