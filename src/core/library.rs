use std::fmt;
use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum LibraryError {
    Database {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    NotFound {
        message: String,
    },
    // The patron or book changed between the read and the commit of an action,
    // i.e. the optimistic version check failed. The caller may re-run the action.
    Conflict {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    Validation {
        message: String,
        reason_code: Option<String>,
    },
    Serialization {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
    },
    AlreadyHeld {
        message: String,
    },
    NotHeld {
        message: String,
    },
    AlreadyCheckedOut {
        message: String,
    },
    NotCheckedOut {
        message: String,
    },
    // book is checked out to a different patron
    Unavailable {
        message: String,
    },
    QuotaExceeded {
        message: String,
        quota: Quota,
    },
}

impl LibraryError {
    pub fn database(message: &str, reason_code: Option<String>, retryable: bool) -> LibraryError {
        LibraryError::Database { message: message.to_string(), reason_code, retryable }
    }

    pub fn not_found(message: &str) -> LibraryError {
        LibraryError::NotFound { message: message.to_string() }
    }

    pub fn conflict(message: &str, reason_code: Option<String>, retryable: bool) -> LibraryError {
        LibraryError::Conflict { message: message.to_string(), reason_code, retryable }
    }

    pub fn database_or_conflict(message: &str, reason: Option<String>, retryable: bool) -> LibraryError {
        if let Some(ref reason_val) = reason {
            if reason_val.as_str().contains("404") {
                return LibraryError::not_found(
                    format!("not found error {:?} {:?}", message, reason).as_str());
            } else if reason_val.as_str().contains("ConditionalCheckFailed") ||
                reason_val.as_str().contains("TransactionCanceled") {
                return LibraryError::conflict(
                    format!("conditional check failed {:?} {:?}", message, reason).as_str(), reason, true);
            }
        }
        LibraryError::database(
            format!("ddb database error {:?} {:?}", message, reason).as_str(), reason, retryable)
    }

    pub fn validation(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Validation { message: message.to_string(), reason_code }
    }

    pub fn serialization(message: &str) -> LibraryError {
        LibraryError::Serialization { message: message.to_string() }
    }

    pub fn runtime(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Runtime { message: message.to_string(), reason_code }
    }

    pub fn already_held(message: &str) -> LibraryError {
        LibraryError::AlreadyHeld { message: message.to_string() }
    }

    pub fn not_held(message: &str) -> LibraryError {
        LibraryError::NotHeld { message: message.to_string() }
    }

    pub fn already_checked_out(message: &str) -> LibraryError {
        LibraryError::AlreadyCheckedOut { message: message.to_string() }
    }

    pub fn not_checked_out(message: &str) -> LibraryError {
        LibraryError::NotCheckedOut { message: message.to_string() }
    }

    pub fn unavailable(message: &str) -> LibraryError {
        LibraryError::Unavailable { message: message.to_string() }
    }

    pub fn quota_exceeded(message: &str, quota: Quota) -> LibraryError {
        LibraryError::QuotaExceeded { message: message.to_string(), quota }
    }

    pub fn retryable(&self) -> bool {
        match self {
            LibraryError::Database { retryable, .. } => { *retryable }
            LibraryError::Conflict { retryable, .. } => { *retryable }
            _ => { false }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            LibraryError::Database { message, .. } => message,
            LibraryError::NotFound { message } => message,
            LibraryError::Conflict { message, .. } => message,
            LibraryError::Validation { message, .. } => message,
            LibraryError::Serialization { message } => message,
            LibraryError::Runtime { message, .. } => message,
            LibraryError::AlreadyHeld { message } => message,
            LibraryError::NotHeld { message } => message,
            LibraryError::AlreadyCheckedOut { message } => message,
            LibraryError::NotCheckedOut { message } => message,
            LibraryError::Unavailable { message } => message,
            LibraryError::QuotaExceeded { message, .. } => message,
        }
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::serialization(
            format!("serde json parsing {:?}", err).as_str())
    }
}

impl From<String> for LibraryError {
    fn from(err: String) -> Self {
        LibraryError::serialization(
            format!("serde parsing {:?}", err).as_str())
    }
}

impl Display for LibraryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::Database { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            LibraryError::Conflict { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            LibraryError::Validation { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            LibraryError::Runtime { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            LibraryError::QuotaExceeded { message, quota } => {
                write!(f, "{} ({})", message, quota)
            }
            other => {
                write!(f, "{}", other.message())
            }
        }
    }
}

/// A specialized Result type for the library domain.
pub type LibraryResult<T> = Result<T, LibraryError>;

// Per-patron limits checked before a hold or checkout is attempted.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum Quota {
    Holds,
    BooksOut,
}

impl Display for Quota {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Quota::Holds => write!(f, "Holds"),
            Quota::BooksOut => write!(f, "BooksOut"),
        }
    }
}

// Columns a patron can search the catalog by.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum SearchKeyword {
    Title,
    Author,
    Genre,
    Available,
}

impl SearchKeyword {
    pub fn column(&self) -> &'static str {
        match self {
            SearchKeyword::Title => "title",
            SearchKeyword::Author => "author",
            SearchKeyword::Genre => "genre",
            SearchKeyword::Available => "checked_out",
        }
    }
}

impl TryFrom<&str> for SearchKeyword {
    type Error = LibraryError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "title" => Ok(SearchKeyword::Title),
            "author" => Ok(SearchKeyword::Author),
            "genre" => Ok(SearchKeyword::Genre),
            "available" => Ok(SearchKeyword::Available),
            _ => Err(LibraryError::validation(
                format!("unknown search keyword {}", s).as_str(), Some("400".to_string()))),
        }
    }
}

impl Display for SearchKeyword {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            SearchKeyword::Title => write!(f, "Title"),
            SearchKeyword::Author => write!(f, "Author"),
            SearchKeyword::Genre => write!(f, "Genre"),
            SearchKeyword::Available => write!(f, "Available"),
        }
    }
}

// Parses a caller supplied book or patron identifier.
pub fn parse_id(kind: &str, raw: &str) -> LibraryResult<i64> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(LibraryError::validation(
            format!("{} id {:?} is not a valid number", kind, raw).as_str(), Some("400".to_string()))),
    }
}

pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use crate::core::library::{format_cents, LibraryError, parse_id, Quota, SearchKeyword};

    #[tokio::test]
    async fn test_should_create_database_error() {
        assert!(matches!(LibraryError::database("test", None, false), LibraryError::Database{ message: _, reason_code: _, retryable: _ }));
    }

    #[tokio::test]
    async fn test_should_create_circulation_errors() {
        assert!(matches!(LibraryError::already_held("test"), LibraryError::AlreadyHeld{ message: _ }));
        assert!(matches!(LibraryError::not_held("test"), LibraryError::NotHeld{ message: _ }));
        assert!(matches!(LibraryError::already_checked_out("test"), LibraryError::AlreadyCheckedOut{ message: _ }));
        assert!(matches!(LibraryError::not_checked_out("test"), LibraryError::NotCheckedOut{ message: _ }));
        assert!(matches!(LibraryError::unavailable("test"), LibraryError::Unavailable{ message: _ }));
        assert!(matches!(LibraryError::quota_exceeded("test", Quota::Holds), LibraryError::QuotaExceeded{ message: _, quota: Quota::Holds }));
    }

    #[tokio::test]
    async fn test_should_create_database_or_conflict_error() {
        assert!(matches!(LibraryError::database_or_conflict("test", Some("404".to_string()), false), LibraryError::NotFound{ message: _ }));
        assert!(matches!(LibraryError::database_or_conflict("test", Some("TransactionCanceledException".to_string()), false), LibraryError::Conflict{ message: _, reason_code: _, retryable: true }));
        assert!(matches!(LibraryError::database_or_conflict("test", Some("500".to_string()), true), LibraryError::Database{ message: _, reason_code: _, retryable: true }));
        assert!(matches!(LibraryError::database_or_conflict("test", None, false), LibraryError::Database{ message: _, reason_code: _, retryable: false }));
    }

    #[tokio::test]
    async fn test_should_create_retryable_error() {
        assert_eq!(false, LibraryError::database("test", None, false).retryable());
        assert_eq!(true, LibraryError::conflict("test", None, true).retryable());
        assert_eq!(false, LibraryError::not_found("test").retryable());
        assert_eq!(false, LibraryError::validation("test", None).retryable());
        assert_eq!(false, LibraryError::already_held("test").retryable());
    }

    #[tokio::test]
    async fn test_should_parse_ids() {
        assert_eq!(12, parse_id("book", "12").expect("should parse"));
        assert_eq!(12, parse_id("book", " 12 ").expect("should parse"));
        assert!(matches!(parse_id("book", "twelve"), Err(LibraryError::Validation { .. })));
        assert!(matches!(parse_id("patron", ""), Err(LibraryError::Validation { .. })));
        assert!(matches!(parse_id("patron", "-3"), Err(LibraryError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_should_parse_search_keyword() {
        let keywords = vec![
            SearchKeyword::Title,
            SearchKeyword::Author,
            SearchKeyword::Genre,
            SearchKeyword::Available,
        ];
        for keyword in keywords {
            let str = keyword.to_string();
            let parsed = SearchKeyword::try_from(str.as_str()).expect("should parse keyword");
            assert_eq!(keyword, parsed);
        }
        assert!(SearchKeyword::try_from("isbn").is_err());
    }

    #[tokio::test]
    async fn test_should_format_cents() {
        assert_eq!("$0.00", format_cents(0));
        assert_eq!("$1.75", format_cents(175));
        assert_eq!("$12.05", format_cents(1205));
        assert_eq!("-$0.50", format_cents(-50));
    }
}
