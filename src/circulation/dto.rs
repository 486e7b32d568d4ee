use std::fmt;
use std::fmt::{Display, Formatter};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use crate::books::domain::model::BookEntity;
use crate::checkout::domain::model::CheckoutEntity;
use crate::core::library::{LibraryError, LibraryResult, parse_id};
use crate::patrons::domain::model::PatronEntity;
use crate::utils::date::DISPLAY_DATE_FMT;

// CirculationAction is the patron action chosen by the caller. It is passed
// explicitly to the dispatch instead of being remembered between requests.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CirculationAction {
    PlaceHold,
    RemoveHold,
    CheckOut,
    Return,
}

impl Display for CirculationAction {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            CirculationAction::PlaceHold => write!(f, "place_hold"),
            CirculationAction::RemoveHold => write!(f, "remove_hold"),
            CirculationAction::CheckOut => write!(f, "check_out"),
            CirculationAction::Return => write!(f, "return"),
        }
    }
}

impl TryFrom<&str> for CirculationAction {
    type Error = LibraryError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "place_hold" | "hold" => Ok(CirculationAction::PlaceHold),
            "remove_hold" | "cancel_hold" => Ok(CirculationAction::RemoveHold),
            "check_out" | "checkout" => Ok(CirculationAction::CheckOut),
            "return" | "check_in" => Ok(CirculationAction::Return),
            _ => Err(LibraryError::validation(
                format!("unknown circulation action {}", s).as_str(), Some("400".to_string()))),
        }
    }
}

// Outcome tags every circulation response. Everything except Success leaves
// the catalog and the ledger untouched.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    NotFound,
    Invalid,
    AlreadyHeld,
    AlreadyCheckedOut,
    NotHeld,
    NotCheckedOut,
    Unavailable,
    QuotaExceeded,
}

impl Outcome {
    // None for store failures, which are not outcomes but errors
    pub fn from_error(err: &LibraryError) -> Option<Outcome> {
        match err {
            LibraryError::NotFound { .. } => Some(Outcome::NotFound),
            LibraryError::Validation { .. } => Some(Outcome::Invalid),
            LibraryError::AlreadyHeld { .. } => Some(Outcome::AlreadyHeld),
            LibraryError::AlreadyCheckedOut { .. } => Some(Outcome::AlreadyCheckedOut),
            LibraryError::NotHeld { .. } => Some(Outcome::NotHeld),
            LibraryError::NotCheckedOut { .. } => Some(Outcome::NotCheckedOut),
            LibraryError::Unavailable { .. } => Some(Outcome::Unavailable),
            LibraryError::QuotaExceeded { .. } => Some(Outcome::QuotaExceeded),
            _ => None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Outcome::Success => StatusCode::OK,
            Outcome::NotFound => StatusCode::NOT_FOUND,
            Outcome::Invalid => StatusCode::BAD_REQUEST,
            Outcome::AlreadyHeld | Outcome::AlreadyCheckedOut |
            Outcome::NotHeld | Outcome::NotCheckedOut | Outcome::Unavailable => StatusCode::CONFLICT,
            Outcome::QuotaExceeded => StatusCode::FORBIDDEN,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct CirculationRequest {
    pub patron_id: String,
    pub book_id: String,
}

impl CirculationRequest {
    pub fn new(patron_id: &str, book_id: &str) -> Self {
        Self {
            patron_id: patron_id.to_string(),
            book_id: book_id.to_string(),
        }
    }

    // (patron_id, book_id)
    pub fn ids(&self) -> LibraryResult<(i64, i64)> {
        let patron_id = parse_id("patron", self.patron_id.as_str())?;
        let book_id = parse_id("book", self.book_id.as_str())?;
        Ok((patron_id, book_id))
    }
}

// CirculationReceiptDto describes a successfully applied action with the
// patron's counters as committed.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct CirculationReceiptDto {
    pub action: CirculationAction,
    pub book_id: i64,
    pub patron_id: i64,
    pub title: String,
    pub num_holds: i64,
    pub num_books_out: i64,
    pub due_at: Option<String>,
    pub released_hold: bool,
}

impl CirculationReceiptDto {
    pub fn new(action: CirculationAction, patron: &PatronEntity, book: &BookEntity) -> Self {
        Self {
            action,
            book_id: book.book_id,
            patron_id: patron.patron_id,
            title: book.title.to_string(),
            num_holds: patron.num_holds,
            num_books_out: patron.num_books_out,
            due_at: None,
            released_hold: false,
        }
    }

    // patron counters are taken before the action and adjusted here so the
    // receipt does not need another read
    pub fn with_counters(mut self, num_holds: i64, num_books_out: i64) -> Self {
        self.num_holds = num_holds;
        self.num_books_out = num_books_out;
        self
    }

    pub fn with_checkout(mut self, checkout: &CheckoutEntity, released_hold: bool) -> Self {
        self.due_at = Some(checkout.due_at.format(DISPLAY_DATE_FMT).to_string());
        self.released_hold = released_hold;
        self
    }

    pub fn summary(&self) -> String {
        match self.action {
            CirculationAction::PlaceHold => {
                format!("{} (ID: {}) placed on hold.", self.title, self.book_id)
            }
            CirculationAction::RemoveHold => {
                format!("Removed hold on {} (ID: {}).", self.title, self.book_id)
            }
            CirculationAction::CheckOut => {
                let mut summary = format!("{} (ID: {}) checked out", self.title, self.book_id);
                if let Some(due_at) = &self.due_at {
                    summary.push_str(format!(", due {}", due_at).as_str());
                }
                summary.push('.');
                if self.released_hold {
                    summary.push_str(" It was removed from your holds list.");
                }
                summary
            }
            CirculationAction::Return => {
                format!("{} (ID: {}) returned.", self.title, self.book_id)
            }
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct CirculationResponse {
    pub action: CirculationAction,
    pub outcome: Outcome,
    pub summary: String,
    pub patron_id: String,
    pub book_id: String,
    pub receipt: Option<CirculationReceiptDto>,
}

impl CirculationResponse {
    pub fn success(req: &CirculationRequest, receipt: CirculationReceiptDto) -> Self {
        Self {
            action: receipt.action,
            outcome: Outcome::Success,
            summary: receipt.summary(),
            patron_id: req.patron_id.to_string(),
            book_id: req.book_id.to_string(),
            receipt: Some(receipt),
        }
    }

    pub fn rejected(action: CirculationAction, req: &CirculationRequest, outcome: Outcome, summary: &str) -> Self {
        Self {
            action,
            outcome,
            summary: summary.to_string(),
            patron_id: req.patron_id.to_string(),
            book_id: req.book_id.to_string(),
            receipt: None,
        }
    }
}
