use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::books::domain::model::BookEntity;
use crate::checkout::domain::model::CheckoutEntity;
use crate::utils::date::serializer;

// CheckoutDto is one row of a patron's checkouts list, with the due date,
// days overdue and fine derived as of the time it was built.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct CheckoutDto {
    pub checkout_id: String,
    pub book_id: i64,
    pub patron_id: i64,
    pub title: String,
    pub author: String,
    #[serde(with = "serializer")]
    pub checkout_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub due_at: NaiveDateTime,
    pub days_overdue: i64,
    pub fine_cents: i64,
}

impl CheckoutDto {
    pub fn from_checkout_book(checkout: &CheckoutEntity, book: &BookEntity,
                              now: NaiveDateTime, fine_per_day_cents: i64) -> Self {
        Self {
            checkout_id: checkout.checkout_id.to_string(),
            book_id: checkout.book_id,
            patron_id: checkout.patron_id,
            title: book.title.to_string(),
            author: book.author.to_string(),
            checkout_at: checkout.checkout_at,
            due_at: checkout.due_at,
            days_overdue: checkout.days_overdue(now),
            fine_cents: checkout.fine_cents(now, fine_per_day_cents),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;
    use crate::books::domain::model::BookEntity;
    use crate::checkout::domain::model::CheckoutEntity;
    use crate::checkout::dto::CheckoutDto;
    use crate::utils::date::DATE_FMT;

    #[tokio::test]
    async fn test_should_build_checkout() {
        let start = NaiveDateTime::parse_from_str("2023-01-01T09:00:00", DATE_FMT).unwrap();
        let now = NaiveDateTime::parse_from_str("2023-01-20T09:00:00", DATE_FMT).unwrap();
        let book = BookEntity::new("Middlemarch", "George Eliot", "Classics");
        let checkout = CheckoutEntity::checked_out_at(book.book_id, 11, start, 14);
        let dto = CheckoutDto::from_checkout_book(&checkout, &book, now, 25);
        assert_eq!("Middlemarch", dto.title.as_str());
        assert_eq!(5, dto.days_overdue);
        assert_eq!(125, dto.fine_cents);
    }
}
