use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::{error::ErrorKind, FromRow, SqlitePool};
use thiserror::Error;

/// A book record, keyed by its isbn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, FromRow)]
pub struct Book {
    pub isbn: String,
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i64,
    pub publisher: String,
    pub title: String,
    pub year: i64,
}

/// Outcome of a single-row operation.
///
/// Read, update and delete all report a missing row through the same
/// [`Lookup::NotFound`] value, so callers map it to one status uniformly.
#[derive(Debug, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("A book with the isbn '{isbn}' already exists")]
    UniqueViolation { isbn: String },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS books (
    isbn TEXT PRIMARY KEY,
    amazon_url TEXT NOT NULL,
    author TEXT NOT NULL,
    language TEXT NOT NULL,
    pages INTEGER NOT NULL,
    publisher TEXT NOT NULL,
    title TEXT NOT NULL,
    year INTEGER NOT NULL
)";

/// Data access for the books table.
///
/// Every single-row operation decides success purely by the presence of a
/// returned row or the affected row count. There is no prior existence check,
/// so there is no check-then-act window between lookup and mutation.
#[derive(Clone)]
pub struct BookStore {
    pool: SqlitePool,
}

impl BookStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the books table if it does not exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;

        Ok(())
    }

    /// Returns all books. Order is unspecified.
    pub async fn list(&self) -> Result<Vec<Book>, StoreError> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT isbn, amazon_url, author, language, pages, publisher, title, year FROM books",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    pub async fn find_by_isbn(&self, isbn: &str) -> Result<Lookup<Book>, StoreError> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT isbn, amazon_url, author, language, pages, publisher, title, year \
             FROM books WHERE isbn = ?",
        )
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book.map_or(Lookup::NotFound, Lookup::Found))
    }

    /// Inserts a new book and returns the row as persisted.
    pub async fn create(&self, book: &Book) -> Result<Book, StoreError> {
        sqlx::query_as::<_, Book>(
            "INSERT INTO books (isbn, amazon_url, author, language, pages, publisher, title, year) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING isbn, amazon_url, author, language, pages, publisher, title, year",
        )
        .bind(&book.isbn)
        .bind(&book.amazon_url)
        .bind(&book.author)
        .bind(&book.language)
        .bind(book.pages)
        .bind(&book.publisher)
        .bind(&book.title)
        .bind(book.year)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| Self::map_unique_violation(err, &book.isbn))
    }

    /// Overwrites every field of the book currently stored under `isbn`,
    /// returning the row as persisted. All fields are replaced wholesale,
    /// including the isbn itself.
    pub async fn replace(&self, isbn: &str, book: &Book) -> Result<Lookup<Book>, StoreError> {
        let book = sqlx::query_as::<_, Book>(
            "UPDATE books \
             SET isbn = ?, amazon_url = ?, author = ?, language = ?, pages = ?, \
                 publisher = ?, title = ?, year = ? \
             WHERE isbn = ? \
             RETURNING isbn, amazon_url, author, language, pages, publisher, title, year",
        )
        .bind(&book.isbn)
        .bind(&book.amazon_url)
        .bind(&book.author)
        .bind(&book.language)
        .bind(book.pages)
        .bind(&book.publisher)
        .bind(&book.title)
        .bind(book.year)
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Self::map_unique_violation(err, &book.isbn))?;

        Ok(book.map_or(Lookup::NotFound, Lookup::Found))
    }

    pub async fn delete_by_isbn(&self, isbn: &str) -> Result<Lookup<()>, StoreError> {
        let result = sqlx::query("DELETE FROM books WHERE isbn = ?")
            .bind(isbn)
            .execute(&self.pool)
            .await?;

        match result.rows_affected() {
            0 => Ok(Lookup::NotFound),
            _ => Ok(Lookup::Found(())),
        }
    }

    fn map_unique_violation(err: sqlx::Error, isbn: &str) -> StoreError {
        match err.as_database_error() {
            Some(db_err) if matches!(db_err.kind(), ErrorKind::UniqueViolation) => {
                StoreError::UniqueViolation {
                    isbn: isbn.to_string(),
                }
            }
            _ => StoreError::Database(err),
        }
    }
}
