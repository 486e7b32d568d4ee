use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::books::domain::model::BookEntity;
use crate::hold::domain::model::HoldEntity;
use crate::utils::date::serializer;

// HoldDto is one row of a patron's holds list.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct HoldDto {
    pub hold_id: String,
    pub book_id: i64,
    pub patron_id: i64,
    pub title: String,
    pub author: String,
    pub available: bool,
    #[serde(with = "serializer")]
    pub hold_at: NaiveDateTime,
}

impl HoldDto {
    pub fn from_hold_book(hold: &HoldEntity, book: &BookEntity) -> Self {
        Self {
            hold_id: hold.hold_id.to_string(),
            book_id: hold.book_id,
            patron_id: hold.patron_id,
            title: book.title.to_string(),
            author: book.author.to_string(),
            available: !book.checked_out,
            hold_at: hold.hold_at,
        }
    }
}
