use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::store::Book;

pub mod app;
pub mod create_book;
pub mod delete_book;
pub mod get_book;
pub mod list_books;
pub mod update_book;

/// Request body shape shared by create and update: the book nested under a
/// `book` key, every field required.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BookEnvelope {
    pub book: Book,
}

#[derive(Debug, Deserialize)]
pub struct BookPath {
    pub isbn: String,
}
