use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::patrons::Patron;
use crate::utils::date::serializer;

// PatronEntity abstracts a library member together with the circulation
// counters that must always match the member's active holds and checkouts.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PatronEntity {
    pub patron_id: i64,
    pub version: i64,
    pub first_name: String,
    pub last_name: String,
    pub num_books_out: i64,
    pub num_holds: i64,
    // maintained by billing, never written by circulation
    pub total_fine_cents: i64,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl PatronEntity {
    // patron_id is assigned by the store when the patron is added
    pub fn new(first_name: &str, last_name: &str) -> Self {
        Self {
            patron_id: 0,
            version: 0,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            num_books_out: 0,
            num_holds: 0,
            total_fine_cents: 0,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl Identifiable for PatronEntity {
    fn id(&self) -> String {
        self.patron_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Patron for PatronEntity {
    fn patron_id(&self) -> i64 {
        self.patron_id
    }

    fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    fn num_holds(&self) -> i64 {
        self.num_holds
    }

    fn num_books_out(&self) -> i64 {
        self.num_books_out
    }

    fn fine_cents(&self) -> i64 {
        self.total_fine_cents
    }
}

#[cfg(test)]
mod tests {
    use crate::core::domain::Configuration;
    use crate::patrons::domain::model::PatronEntity;
    use crate::patrons::Patron;

    #[tokio::test]
    async fn test_should_build_patron() {
        let patron = PatronEntity::new("Ada", "Lovelace");
        assert_eq!("Ada Lovelace", patron.full_name());
        assert_eq!(0, patron.num_holds());
        assert_eq!(0, patron.num_books_out());
    }

    #[tokio::test]
    async fn test_should_check_quotas() {
        let config = Configuration::new("test");
        let mut patron = PatronEntity::new("Ada", "Lovelace");
        patron.num_holds = 24;
        patron.num_books_out = 9;
        assert!(!patron.has_reached_hold_quota(&config));
        assert!(!patron.has_reached_checkout_quota(&config));
        patron.num_holds = 25;
        patron.num_books_out = 10;
        assert!(patron.has_reached_hold_quota(&config));
        assert!(patron.has_reached_checkout_quota(&config));
    }
}
