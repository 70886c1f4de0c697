use bookshelf::{
    Book, Catalog, CategoryFilter, Config, DEFAULT_CATEGORY, Loaded, NewBook, Outcome, Query, Rejection, RenamePolicy,
    SaveStatus, SortOrder, Stats, Store, Year,
};
use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Result, WrapErr, bail, eyre};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "bookshelf")]
#[command(about = "Bookshelf - a personal book catalog kept in a single JSON file")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to the catalog file (overrides the config file)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List books, optionally filtered, searched and sorted
    List {
        /// Only books in this category ("All" for every book)
        #[arg(short, long)]
        category: Option<String>,

        /// Only books whose title contains this text (case-insensitive)
        #[arg(short, long)]
        search: Option<String>,

        /// Order by year: newest or oldest
        #[arg(long)]
        sort: Option<SortOrder>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the first book with this exact title
    Show {
        name: String,

        #[arg(long)]
        json: bool,
    },

    /// Add a book
    Add {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        author: String,

        #[arg(short, long)]
        year: String,

        #[arg(short, long, default_value = DEFAULT_CATEGORY)]
        category: String,
    },

    /// Update the first book with this title, or add it if there is none
    Save {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        author: String,

        #[arg(short, long)]
        year: String,

        #[arg(short, long, default_value = DEFAULT_CATEGORY)]
        category: String,
    },

    /// Edit the first book with this exact title
    Edit {
        /// Current title
        name: String,

        /// New title
        #[arg(long = "name", value_name = "NAME")]
        new_name: Option<String>,

        #[arg(short, long)]
        author: Option<String>,

        #[arg(short, long)]
        year: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        /// How a renamed book is stored: reinsert (moved to the end) or in-place
        #[arg(long)]
        rename_policy: Option<RenamePolicy>,
    },

    /// Delete every book with this exact title
    Delete { name: String },

    /// Show totals per category
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Print the catalog file in use
    Path,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    setup_tracing(cli.verbose, &config.log_level);

    let data_file = config.resolve_data_file(cli.file.clone());
    debug!(file = ?data_file, "Using catalog file");

    match cli.command {
        Commands::Path => {
            println!("{}", data_file.display());
        }

        Commands::List {
            category,
            search,
            sort,
            json,
        } => {
            let mut query = Query::new();
            if let Some(category) = &category {
                query = query.category(category.as_str());
            }
            if let Some(term) = search {
                query = query.search(term);
            }
            if let Some(order) = sort {
                query = query.sort(order);
            }

            let books = open_catalog(&data_file, config.rename_policy)?.query(&query);
            if json {
                println!("{}", serde_json::to_string_pretty(&books)?);
            } else {
                print_table(&books);
                print_summary(&books, &query);
            }
        }

        Commands::Show { name, json } => {
            let catalog = open_catalog(&data_file, config.rename_policy)?;
            let book = catalog
                .find_by_name(&name)
                .ok_or_else(|| eyre!("Book '{}' not found", name))?;
            if json {
                println!("{}", serde_json::to_string_pretty(book)?);
            } else {
                print_book(book);
            }
        }

        Commands::Add {
            name,
            author,
            year,
            category,
        } => {
            let candidate = form_candidate(&name, &author, &year, &category)?;
            let mut catalog = open_catalog(&data_file, config.rename_policy)?;
            finish(catalog.add(candidate), name.trim())?;
            println!("{} Book '{}' added!", "✓".green(), name.trim());
        }

        Commands::Save {
            name,
            author,
            year,
            category,
        } => {
            let candidate = form_candidate(&name, &author, &year, &category)?;
            let mut catalog = open_catalog(&data_file, config.rename_policy)?;

            let name = name.trim();
            let verb = if catalog.find_by_name(name).is_some() { "Updated" } else { "Added" };
            finish(catalog.upsert(candidate), name)?;
            println!("{} {} '{}'", "✓".green(), verb, name);
        }

        Commands::Edit {
            name,
            new_name,
            author,
            year,
            category,
            rename_policy,
        } => {
            let mut catalog = open_catalog(&data_file, rename_policy.unwrap_or(config.rename_policy))?;

            let current = catalog
                .find_by_name(&name)
                .cloned()
                .ok_or_else(|| eyre!("Book '{}' not found", name))?;
            let updated = Book {
                name: replace_field(new_name, current.name, "title")?,
                author: replace_field(author, current.author, "author")?,
                date: match year {
                    Some(y) => Some(Year::from(required(y, "year")?)),
                    None => current.date,
                },
                category: match category {
                    Some(c) => Some(required(c, "category")?),
                    None => current.category,
                },
            };

            let shown = updated.name.clone();
            finish(catalog.update_by_name(&name, updated), &name)?;
            println!("{} Updated '{}'", "✓".green(), shown);
        }

        Commands::Delete { name } => {
            let mut catalog = open_catalog(&data_file, config.rename_policy)?;
            finish(catalog.delete_by_name(&name), &name)?;
            println!("{} Book '{}' deleted!", "✓".green(), name);
        }

        Commands::Stats { json } => {
            let stats = open_catalog(&data_file, config.rename_policy)?.statistics();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_stats(&stats);
            }
        }
    }

    Ok(())
}

/// Load the catalog file; a malformed file stops the command before any write
fn open_catalog(data_file: &Path, rename_policy: RenamePolicy) -> Result<Catalog> {
    let mut store = Store::new(data_file);
    match store
        .load()
        .wrap_err_with(|| format!("{} is not a readable catalog; fix or move it first", data_file.display()))?
    {
        Loaded::Found(count) => info!(count, "Catalog loaded"),
        Loaded::Missing => info!("Starting a new catalog"),
    }

    Ok(Catalog::with_rename_policy(store, rename_policy))
}

/// Build an add/save candidate from form values: trimmed, none blank
fn form_candidate(name: &str, author: &str, year: &str, category: &str) -> Result<NewBook> {
    let (name, author, year) = (name.trim(), author.trim(), year.trim());
    if name.is_empty() || author.is_empty() || year.is_empty() {
        bail!("title, author and year are required");
    }
    let category = match category.trim() {
        "" => DEFAULT_CATEGORY,
        c => c,
    };

    Ok(NewBook {
        name: Some(name.to_string()),
        author: Some(author.to_string()),
        date: Some(Year::from(year)),
        category: Some(category.to_string()),
    })
}

fn setup_tracing(verbose: u8, configured: &str) {
    let level = match verbose {
        0 => configured.parse().unwrap_or(LevelFilter::WARN),
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

/// Turn a mutation outcome into a user-facing error, if it did not stick
fn finish(outcome: Outcome, name: &str) -> Result<()> {
    match outcome {
        Outcome::Applied { save: SaveStatus::Saved } => Ok(()),
        Outcome::Applied {
            save: SaveStatus::Failed(e),
        } => Err(e.wrap_err("the change was not saved")),
        Outcome::Rejected(Rejection::NotFound) => Err(eyre!("Book '{}' not found", name)),
        Outcome::Rejected(r) => Err(eyre!("Failed to add book: {}", r)),
    }
}

fn required(value: String, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{} cannot be empty", field);
    }
    Ok(trimmed.to_string())
}

fn replace_field(value: Option<String>, current: String, field: &str) -> Result<String> {
    match value {
        Some(v) => required(v, field),
        None => Ok(current),
    }
}

fn print_table(books: &[Book]) {
    if books.is_empty() {
        println!("{}", "No books found".dimmed());
        return;
    }

    let rows: Vec<[String; 4]> = books
        .iter()
        .map(|b| {
            [
                b.name.clone(),
                b.author.clone(),
                b.date.as_ref().map(Year::to_string).unwrap_or_default(),
                b.display_category().to_string(),
            ]
        })
        .collect();

    let headers = ["Title", "Author", "Year", "Category"];
    let mut widths = headers.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: [&str; 4]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("{}", line(headers).bold());
    for row in &rows {
        println!("{}", line([&row[0], &row[1], &row[2], &row[3]]));
    }
}

fn print_summary(books: &[Book], query: &Query) {
    let mut parts = vec![format!("{} book{}", books.len(), if books.len() == 1 { "" } else { "s" })];
    if query.category != CategoryFilter::All {
        parts.push(format!("filtered by: {}", query.category));
    }
    if !query.search.is_empty() {
        parts.push(format!("matching '{}'", query.search));
    }
    if let Some(order) = query.sort {
        parts.push(format!("sorted {}", order));
    }
    println!("\n{}", parts.join(", ").dimmed());
}

fn print_book(book: &Book) {
    println!("{}", book.name.bold());
    println!("  {:<9}{}", "Author:", book.author);
    let year = book.date.as_ref().map(Year::to_string).unwrap_or_else(|| "-".to_string());
    println!("  {:<9}{}", "Year:", year);
    println!("  {:<9}{}", "Category:", book.display_category());
}

fn print_stats(stats: &Stats) {
    println!("{}", "Library summary".bold());
    println!("  {:<12}{}", "Total:", stats.total.to_string().cyan());
    println!("  {:<12}{}", "Novels:", stats.novels);
    println!("  {:<12}{}", "Philosophy:", stats.philosophy);
    println!("  {:<12}{}", "Poetry:", stats.poetry);
}
