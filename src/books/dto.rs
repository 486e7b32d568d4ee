use serde::{Deserialize, Serialize};
use crate::books::domain::Book;
use crate::books::domain::model::BookEntity;
use crate::core::domain::Identifiable;

// BookDto is a data transfer object for Catalog service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDto {
    pub book_id: i64,
    pub version: i64,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub available: bool,
    pub checked_out: bool,
    pub on_hold: bool,
}

impl BookDto {
    pub fn new(title: &str, author: &str, genre: &str) -> BookDto {
        BookDto::from(&BookEntity::new(title, author, genre))
    }
}

impl Identifiable for BookDto {
    fn id(&self) -> String {
        self.book_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Book for BookDto {
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

impl From<&BookEntity> for BookDto {
    fn from(other: &BookEntity) -> Self {
        Self {
            book_id: other.book_id,
            version: other.version,
            title: other.title.to_string(),
            author: other.author.to_string(),
            genre: other.genre.to_string(),
            available: !other.checked_out,
            checked_out: other.checked_out,
            on_hold: other.on_hold,
        }
    }
}
