use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::core::library::format_cents;
use crate::patrons::domain::model::PatronEntity;
use crate::patrons::Patron;

// Patron abstracts library member.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PatronDto {
    pub patron_id: i64,
    pub version: i64,
    pub first_name: String,
    pub last_name: String,
    pub num_books_out: i64,
    pub num_holds: i64,
    pub total_fine_cents: i64,
}

impl PatronDto {
    pub fn new(first_name: &str, last_name: &str) -> Self {
        PatronDto::from(&PatronEntity::new(first_name, last_name))
    }
}

impl Identifiable for PatronDto {
    fn id(&self) -> String {
        self.patron_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Patron for PatronDto {
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

impl From<&PatronEntity> for PatronDto {
    fn from(other: &PatronEntity) -> Self {
        Self {
            patron_id: other.patron_id,
            version: other.version,
            first_name: other.first_name.to_string(),
            last_name: other.last_name.to_string(),
            num_books_out: other.num_books_out,
            num_holds: other.num_holds,
            total_fine_cents: other.total_fine_cents,
        }
    }
}

// FineSummaryDto is what a patron sees when asking for their fine.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct FineSummaryDto {
    pub patron_id: i64,
    pub accumulated_cents: i64,
    pub overdue_estimate_cents: i64,
    pub summary: String,
}

impl FineSummaryDto {
    pub fn new(patron: &dyn Patron, overdue_estimate_cents: i64) -> Self {
        let mut summary = format!("Current fine amount for {}: {}.", patron.full_name(), format_cents(patron.fine_cents()));
        if overdue_estimate_cents > 0 {
            summary.push_str(format!(" Books currently overdue add an estimated {} once returned.",
                                     format_cents(overdue_estimate_cents)).as_str());
        } else {
            summary.push_str(" This amount does not include fines for books that are not yet returned.");
        }
        Self {
            patron_id: patron.patron_id(),
            accumulated_cents: patron.fine_cents(),
            overdue_estimate_cents,
            summary,
        }
    }
}
