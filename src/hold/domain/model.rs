use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::utils::date::serializer;

// HoldEntity abstracts a patron's reservation on a book. At most one exists
// per (book, patron) pair and it is deleted when the hold is removed.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct HoldEntity {
    pub hold_id: String,
    pub book_id: i64,
    pub patron_id: i64,
    #[serde(with = "serializer")]
    pub hold_at: NaiveDateTime,
}

impl HoldEntity {
    pub fn new(book_id: i64, patron_id: i64) -> Self {
        Self::placed_at(book_id, patron_id, Utc::now().naive_utc())
    }

    pub fn placed_at(book_id: i64, patron_id: i64, hold_at: NaiveDateTime) -> Self {
        Self {
            hold_id: Uuid::new_v4().to_string(),
            book_id,
            patron_id,
            hold_at,
        }
    }
}

impl Identifiable for HoldEntity {
    fn id(&self) -> String {
        self.hold_id.to_string()
    }

    fn version(&self) -> i64 {
        0
    }
}
