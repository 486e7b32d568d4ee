use std::collections::HashMap;
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::books::domain::Book;
use crate::core::domain::Identifiable;
use crate::core::library::{LibraryError, LibraryResult};
use crate::utils::date::serializer;

// BookEntity abstracts a physical copy in the catalog. Its `checked_out` and
// `on_hold` flags are independent: a book checked out to one patron can be on
// hold by others at the same time.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct BookEntity {
    pub book_id: i64,
    pub version: i64,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub checked_out: bool,
    pub on_hold: bool,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl BookEntity {
    // book_id is assigned by the store when the book is added
    pub fn new(title: &str, author: &str, genre: &str) -> Self {
        Self {
            book_id: 0,
            version: 0,
            title: title.to_string(),
            author: author.to_string(),
            genre: genre.to_string(),
            checked_out: false,
            on_hold: false,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    // Text columns compare case-insensitively, flags compare as booleans.
    // An empty predicate matches every book.
    pub fn matches(&self, predicate: &HashMap<String, String>) -> LibraryResult<bool> {
        for (column, value) in predicate {
            let matched = match column.as_str() {
                "title" => self.title.eq_ignore_ascii_case(value.trim()),
                "author" => self.author.eq_ignore_ascii_case(value.trim()),
                "genre" => self.genre.eq_ignore_ascii_case(value.trim()),
                "checked_out" => self.checked_out == parse_flag(column, value)?,
                "on_hold" => self.on_hold == parse_flag(column, value)?,
                _ => {
                    return Err(LibraryError::validation(
                        format!("books cannot be queried by {}", column).as_str(), Some("400".to_string())));
                }
            };
            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn parse_flag(column: &str, value: &str) -> LibraryResult<bool> {
    value.trim().parse::<bool>().map_err(|_| LibraryError::validation(
        format!("{} must be true or false, not {}", column, value).as_str(), Some("400".to_string())))
}

impl Identifiable for BookEntity {
    fn id(&self) -> String {
        self.book_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Book for BookEntity {
    fn book_id(&self) -> i64 {
        self.book_id
    }

    fn title(&self) -> &str {
        self.title.as_str()
    }

    fn is_checked_out(&self) -> bool {
        self.checked_out
    }

    fn is_on_hold(&self) -> bool {
        self.on_hold
    }
}
