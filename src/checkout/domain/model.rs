use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::utils::date::{add_days, days_late, serializer};

// CheckoutEntity abstracts an active loan of a book to exactly one patron.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct CheckoutEntity {
    pub checkout_id: String,
    pub book_id: i64,
    pub patron_id: i64,
    #[serde(with = "serializer")]
    pub checkout_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub due_at: NaiveDateTime,
}

impl CheckoutEntity {
    pub fn new(book_id: i64, patron_id: i64, loan_days: i64) -> Self {
        Self::checked_out_at(book_id, patron_id, Utc::now().naive_utc(), loan_days)
    }

    pub fn checked_out_at(book_id: i64, patron_id: i64, checkout_at: NaiveDateTime, loan_days: i64) -> Self {
        Self {
            checkout_id: Uuid::new_v4().to_string(),
            book_id,
            patron_id,
            checkout_at,
            due_at: add_days(checkout_at, loan_days),
        }
    }

    pub fn days_overdue(&self, now: NaiveDateTime) -> i64 {
        days_late(self.due_at, now)
    }

    pub fn fine_cents(&self, now: NaiveDateTime, fine_per_day_cents: i64) -> i64 {
        self.days_overdue(now) * fine_per_day_cents
    }
}

impl Identifiable for CheckoutEntity {
    fn id(&self) -> String {
        self.checkout_id.to_string()
    }

    fn version(&self) -> i64 {
        0
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;
    use crate::checkout::domain::model::CheckoutEntity;
    use crate::utils::date::DATE_FMT;

    fn date(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, DATE_FMT).expect("valid date")
    }

    #[tokio::test]
    async fn test_should_build_checkout() {
        let checkout = CheckoutEntity::new(1, 10, 14);
        assert_eq!(1, checkout.book_id);
        assert_eq!(10, checkout.patron_id);
        assert_eq!(14, (checkout.due_at - checkout.checkout_at).num_days());
    }

    #[tokio::test]
    async fn test_should_compute_overdue_fine() {
        let checkout = CheckoutEntity::checked_out_at(1, 10, date("2023-04-01T10:00:00"), 14);
        assert_eq!(date("2023-04-15T10:00:00"), checkout.due_at);
        assert_eq!(0, checkout.days_overdue(date("2023-04-15T18:00:00")));
        assert_eq!(0, checkout.fine_cents(date("2023-04-10T18:00:00"), 25));
        assert_eq!(3, checkout.days_overdue(date("2023-04-18T08:00:00")));
        assert_eq!(75, checkout.fine_cents(date("2023-04-18T08:00:00"), 25));
    }
}
